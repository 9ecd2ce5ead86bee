use farmlink_core::config::{AppConfig, LoadOptions};
use farmlink_core::domain::coordinate::Coordinate;
use farmlink_db::SqlProductStore;
use serde::Serialize;

use crate::commands::{self, ErrorClass};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_default_location(&config));
            checks.push(check_database_readiness(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "default_location",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "database_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_default_location(config: &AppConfig) -> DoctorCheck {
    match Coordinate::new(config.catalog.default_longitude, config.catalog.default_latitude) {
        Ok(_) => DoctorCheck {
            name: "default_location",
            status: CheckStatus::Pass,
            details: format!(
                "fallback buyer location ({}, {}) is a valid coordinate",
                config.catalog.default_longitude, config.catalog.default_latitude
            ),
        },
        Err(error) => DoctorCheck {
            name: "default_location",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

/// Connects and checks that the products table is reachable, which also
/// proves migrations have been applied at least once.
fn check_database_readiness(config: &AppConfig) -> DoctorCheck {
    let result = commands::with_pool(config, |pool| async move {
        let store = SqlProductStore::new(pool);
        match store.count_all().await {
            Ok(count) => Ok(format!("products table reachable ({count} rows)")),
            Err(error) => Err((
                ErrorClass::DbConnectivity,
                format!("products table not reachable, run `farmlink migrate` ({error})"),
            )),
        }
    });

    match result {
        Ok(details) => {
            DoctorCheck { name: "database_readiness", status: CheckStatus::Pass, details }
        }
        Err((_, details)) => {
            DoctorCheck { name: "database_readiness", status: CheckStatus::Fail, details }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::{render_human, CheckStatus, DoctorCheck, DoctorReport};

    #[test]
    fn human_rendering_marks_each_check() {
        let report = DoctorReport {
            overall_status: CheckStatus::Fail,
            summary: "doctor: one or more readiness checks failed".to_string(),
            checks: vec![
                DoctorCheck {
                    name: "config_validation",
                    status: CheckStatus::Pass,
                    details: "configuration loaded and validated".to_string(),
                },
                DoctorCheck {
                    name: "database_readiness",
                    status: CheckStatus::Fail,
                    details: "failed to connect to database".to_string(),
                },
            ],
        };

        let rendered = render_human(&report);
        assert!(rendered.contains("- [ok] config_validation"));
        assert!(rendered.contains("- [fail] database_readiness"));
    }
}
