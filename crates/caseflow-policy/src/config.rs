//! # SLA Configuration
//!
//! YAML-loadable SLA windows. The deployed values encode regulatory
//! windows that vary by jurisdiction, so they ship as configuration with
//! the baseline deployment values as defaults.
//!
//! ```yaml
//! high_priority_days: 3
//! medium_priority_days: 7
//! low_priority_days: 15
//! cert_in_hours: 6
//! dpb_hours: 72
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};

use caseflow_core::EngineError;

use crate::sla::SlaPolicy;

/// The SLA window configuration document.
///
/// Fields omitted from the file fall back to the baseline values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlaConfig {
    /// DSR resolution window for HIGH priority, in days.
    #[serde(default = "default_high_days")]
    pub high_priority_days: i64,
    /// DSR resolution window for MEDIUM priority, in days.
    #[serde(default = "default_medium_days")]
    pub medium_priority_days: i64,
    /// DSR resolution window for LOW priority, in days.
    #[serde(default = "default_low_days")]
    pub low_priority_days: i64,
    /// CERT-In reporting window, in hours.
    #[serde(default = "default_cert_in_hours")]
    pub cert_in_hours: i64,
    /// DPB reporting window, in hours.
    #[serde(default = "default_dpb_hours")]
    pub dpb_hours: i64,
}

fn default_high_days() -> i64 {
    3
}
fn default_medium_days() -> i64 {
    7
}
fn default_low_days() -> i64 {
    15
}
fn default_cert_in_hours() -> i64 {
    6
}
fn default_dpb_hours() -> i64 {
    72
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            high_priority_days: default_high_days(),
            medium_priority_days: default_medium_days(),
            low_priority_days: default_low_days(),
            cert_in_hours: default_cert_in_hours(),
            dpb_hours: default_dpb_hours(),
        }
    }
}

impl SlaConfig {
    /// Parse a configuration document from YAML.
    pub fn from_yaml(source: &str) -> Result<Self, EngineError> {
        serde_yaml::from_str(source)
            .map_err(|e| EngineError::validation(format!("invalid SLA config: {e}")))
    }

    /// Validate the windows and convert into an [`SlaPolicy`].
    ///
    /// Every window must be strictly positive — a zero or negative window
    /// would mark cases overdue at creation.
    pub fn into_policy(self) -> Result<SlaPolicy, EngineError> {
        let windows = [
            ("high_priority_days", self.high_priority_days),
            ("medium_priority_days", self.medium_priority_days),
            ("low_priority_days", self.low_priority_days),
            ("cert_in_hours", self.cert_in_hours),
            ("dpb_hours", self.dpb_hours),
        ];
        for (name, value) in windows {
            if value <= 0 {
                return Err(EngineError::validation(format!(
                    "SLA window {name} must be strictly positive, got {value}"
                )));
            }
        }
        Ok(SlaPolicy {
            dsr_high: Duration::days(self.high_priority_days),
            dsr_medium: Duration::days(self.medium_priority_days),
            dsr_low: Duration::days(self.low_priority_days),
            cert_in: Duration::hours(self.cert_in_hours),
            dpb: Duration::hours(self.dpb_hours),
        })
    }
}
