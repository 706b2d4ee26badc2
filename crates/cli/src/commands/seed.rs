use crate::commands::{build_runtime, load_config, CommandResult};
use netprice_db::fixtures::SeededCondition;
use netprice_db::{connect_with_config, migrations, DemoAgreementDataset};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seed_result = DemoAgreementDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoAgreementDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<SeedOutput, (&'static str, String, u8)> =
            if !verification.all_present {
                let failed_checks = failed_check_labels(&verification.checks);
                Err(("seed_verification", verification_failure_message(&failed_checks), 6u8))
            } else {
                Ok(SeedOutput {
                    conditions: seed_result.conditions_seeded,
                    tiers: seed_result.tiers_seeded,
                })
            };

        pool.close().await;
        run_result
    });

    match result {
        Ok(output) => {
            let descriptions: Vec<String> = output
                .conditions
                .iter()
                .map(|c| format!("  - {} {}: {}", c.condition_type, c.id, c.description))
                .collect();
            let message = format!(
                "demo agreement loaded for tenant `{}` ({} conditions, {} scale tiers):\n{}",
                DemoAgreementDataset::TENANT_ID,
                output.conditions.len(),
                output.tiers,
                descriptions.join("\n")
            );
            CommandResult::success("seed", message)
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

struct SeedOutput {
    conditions: Vec<SeededCondition>,
    tiers: i64,
}

fn failed_check_labels<'a>(checks: &[(&'a str, bool)]) -> Vec<&'a str> {
    checks.iter().filter_map(|(check, passed)| (!passed).then_some(*check)).collect()
}

fn verification_failure_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}
