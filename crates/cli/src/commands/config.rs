use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use farmlink_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct Field {
    key: &'static str,
    env_key: Option<&'static str>,
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let file_path = detect_config_path();
    let file_doc = file_path.as_deref().and_then(load_config_file_doc);

    let fields = [
        Field {
            key: "database.url",
            env_key: Some("FARMLINK_DATABASE_URL"),
            value: config.database.url,
        },
        Field {
            key: "database.max_connections",
            env_key: Some("FARMLINK_DB_MAX_CONNECTIONS"),
            value: config.database.max_connections.to_string(),
        },
        Field {
            key: "database.timeout_secs",
            env_key: Some("FARMLINK_DB_TIMEOUT_SECS"),
            value: config.database.timeout_secs.to_string(),
        },
        Field {
            key: "catalog.page_size",
            env_key: Some("FARMLINK_PAGE_SIZE"),
            value: config.catalog.page_size.to_string(),
        },
        Field {
            key: "catalog.default_longitude",
            env_key: None,
            value: config.catalog.default_longitude.to_string(),
        },
        Field {
            key: "catalog.default_latitude",
            env_key: None,
            value: config.catalog.default_latitude.to_string(),
        },
        Field {
            key: "logging.level",
            env_key: Some("FARMLINK_LOG_LEVEL"),
            value: config.logging.level,
        },
        Field {
            key: "logging.format",
            env_key: Some("FARMLINK_LOG_FORMAT"),
            value: format!("{:?}", config.logging.format),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields {
        let source = resolve_source(&field, file_doc.as_ref(), file_path.as_deref());
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os("FARMLINK_CONFIG") {
        return Some(PathBuf::from(explicit));
    }

    ["farmlink.toml", "config/farmlink.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

fn load_config_file_doc(path: &Path) -> Option<Value> {
    fs::read_to_string(path).ok()?.parse::<Value>().ok()
}

fn resolve_source(field: &Field, file_doc: Option<&Value>, file_path: Option<&Path>) -> String {
    if let Some(env_key) = field.env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if file_doc.is_some_and(|doc| file_sets_key(doc, field.key)) {
        let display = file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({display})");
    }

    "default".to_string()
}

fn file_sets_key(doc: &Value, key_path: &str) -> bool {
    key_path
        .split('.')
        .try_fold(doc, |current, key| current.get(key))
        .is_some()
}
