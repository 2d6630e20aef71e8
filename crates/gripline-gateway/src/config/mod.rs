//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use gripline_core::error::{GriplineError, Result};

pub use schema::{FailureMode, GatewayConfig, GatewaySection, InspectSection, RouterSection};

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| GriplineError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| GriplineError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
