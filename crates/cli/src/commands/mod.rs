pub mod browse;
pub mod config;
pub mod doctor;
pub mod migrate;
pub mod seed;

use std::future::Future;

use serde::Serialize;

use farmlink_core::config::{AppConfig, LoadOptions};
use farmlink_db::{connect_with_settings, DbPool};

/// Outcome of one CLI command: a JSON payload for stdout plus the process
/// exit code.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

/// Failure classes shared across commands. Each maps to a stable exit code
/// so scripts can branch without parsing the JSON payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    ConfigValidation,
    InvalidLocation,
    InvalidRequest,
    RuntimeInit,
    DbConnectivity,
    CatalogQuery,
    Migration,
    SeedExecution,
    SeedVerification,
}

impl ErrorClass {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::ConfigValidation | Self::InvalidLocation | Self::InvalidRequest => 2,
            Self::RuntimeInit => 3,
            Self::DbConnectivity | Self::CatalogQuery => 4,
            Self::Migration | Self::SeedExecution => 5,
            Self::SeedVerification => 6,
        }
    }
}

#[derive(Debug, Serialize)]
struct CommandOutcome<'a> {
    command: &'a str,
    status: &'a str,
    error_class: Option<ErrorClass>,
    message: &'a str,
}

impl CommandResult {
    pub fn success(command: &str, message: impl AsRef<str>) -> Self {
        let outcome = CommandOutcome {
            command,
            status: "ok",
            error_class: None,
            message: message.as_ref(),
        };
        Self { exit_code: 0, output: serialize_outcome(&outcome) }
    }

    pub fn failure(command: &str, error_class: ErrorClass, message: impl AsRef<str>) -> Self {
        let outcome = CommandOutcome {
            command,
            status: "error",
            error_class: Some(error_class),
            message: message.as_ref(),
        };
        Self { exit_code: error_class.exit_code(), output: serialize_outcome(&outcome) }
    }
}

fn serialize_outcome(outcome: &CommandOutcome<'_>) -> String {
    serde_json::to_string(outcome).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads and validates configuration, mapping failure straight to the
/// command's error payload.
pub(crate) fn require_config(command: &'static str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            ErrorClass::ConfigValidation,
            format!("configuration issue: {error}"),
        )
    })
}

/// Stands up a current-thread runtime, connects with the configured pool
/// settings, runs the command body, and closes the pool afterwards.
pub(crate) fn with_pool<T, F, Fut>(config: &AppConfig, body: F) -> Result<T, (ErrorClass, String)>
where
    F: FnOnce(DbPool) -> Fut,
    Fut: Future<Output = Result<T, (ErrorClass, String)>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| {
            (ErrorClass::RuntimeInit, format!("failed to initialize async runtime: {error}"))
        })?;

    runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| (ErrorClass::DbConnectivity, error.to_string()))?;

        let result = body(pool.clone()).await;
        pool.close().await;
        result
    })
}
