use crate::commands::{self, CommandResult, ErrorClass};
use farmlink_db::migrations;

pub fn run() -> CommandResult {
    let config = match commands::require_config("migrate") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let result = commands::with_pool(&config, |pool| async move {
        migrations::run_pending(&pool)
            .await
            .map_err(|error| (ErrorClass::Migration, error.to_string()))
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err((class, message)) => CommandResult::failure("migrate", class, message),
    }
}
