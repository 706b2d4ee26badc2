pub mod condition;
pub mod context;
pub mod outcome;
