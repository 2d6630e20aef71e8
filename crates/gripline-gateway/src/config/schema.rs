use std::time::Duration;

use serde::Deserialize;
use gripline_core::error::{GriplineError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub inspect: InspectSection,

    #[serde(default)]
    pub router: RouterSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GriplineError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.inspect.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    /// Address of the operational endpoints (health, readiness, metrics).
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.trim().is_empty() {
            return Err(GriplineError::BadConfig("gateway.listen must not be empty".into()));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:9090".into()
}

/// What to substitute when the inspection authority cannot be consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Do not proxy.
    #[default]
    Closed,
    /// Proxy without a sharing key.
    Open,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InspectSection {
    /// When false every request gets the "no inspection" result.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_inspect_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub failure_mode: FailureMode,
}

impl Default for InspectSection {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: default_inspect_timeout_ms(),
            failure_mode: FailureMode::Closed,
        }
    }
}

impl InspectSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(GriplineError::BadConfig(
                "inspect.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_true() -> bool {
    true
}
fn default_inspect_timeout_ms() -> u64 {
    8000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterSection {
    /// Share one origin fetch between concurrent requests with the same sharing key.
    #[serde(default = "default_true")]
    pub coalescing: bool,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self { coalescing: true }
    }
}
