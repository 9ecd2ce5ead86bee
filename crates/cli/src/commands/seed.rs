use crate::commands::{self, CommandResult, ErrorClass};
use farmlink_db::{migrations, DemoCatalog};

pub fn run() -> CommandResult {
    let config = match commands::require_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let result = commands::with_pool(&config, |pool| async move {
        migrations::run_pending(&pool)
            .await
            .map_err(|error| (ErrorClass::Migration, error.to_string()))?;

        let seed_result = DemoCatalog::load(&pool)
            .await
            .map_err(|error| (ErrorClass::SeedExecution, error.to_string()))?;

        let verification = DemoCatalog::verify(&pool)
            .await
            .map_err(|error| (ErrorClass::SeedVerification, error.to_string()))?;
        if !verification.all_present {
            return Err((
                ErrorClass::SeedVerification,
                verification_failure_message(&verification.checks),
            ));
        }

        let categories: Vec<String> = seed_result
            .categories
            .iter()
            .map(|info| format!("{} ({})", info.category, info.count))
            .collect();
        Ok(format!(
            "demo catalog loaded: {} products across categories {}",
            seed_result.products_seeded,
            categories.join(", ")
        ))
    });

    match result {
        Ok(message) => CommandResult::success("seed", message),
        Err((class, message)) => CommandResult::failure("seed", class, message),
    }
}

fn verification_failure_message(checks: &[(&'static str, bool)]) -> String {
    let failed_checks = checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect::<Vec<_>>();

    if failed_checks.is_empty() {
        "some seed data failed to load".to_string()
    } else {
        format!("seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::verification_failure_message;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let checks = [
            ("seed-products-present", true),
            ("seed-unlocated-product-present", false),
            ("seed-rice-category-present", false),
        ];

        assert_eq!(
            verification_failure_message(&checks),
            "seed verification failed for checks: seed-unlocated-product-present, seed-rice-category-present"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        let checks = [("seed-products-present", true)];
        assert_eq!(verification_failure_message(&checks), "some seed data failed to load");
    }
}
