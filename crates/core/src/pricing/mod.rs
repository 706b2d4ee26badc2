pub mod composer;
pub mod engine;
pub mod matcher;
pub mod rate;
pub mod repository;
pub mod scale;

pub use composer::{
    compose, price, select_conditions, ConditionSelection, PriceComposer, TierLookup,
};
pub use engine::{DeterministicPricingEngine, PricingEngine};
pub use matcher::{check_candidate, find_best_match, KeyField, Rejection};
pub use rate::apply_rate;
pub use repository::{ConditionQuery, ConditionRepository};
pub use scale::{resolve_rate, validate_tiers, ResolvedRate};
