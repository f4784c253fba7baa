// src/config/validate.rs

use crate::config::model::{RawSettings, Settings};
use crate::errors::{BridgeError, Result};
use crate::types::parse_duration;

impl TryFrom<RawSettings> for Settings {
    type Error = BridgeError;

    fn try_from(raw: RawSettings) -> std::result::Result<Self, Self::Error> {
        validate_interpreter(&raw)?;
        validate_exchange(&raw)?;
        validate_supervisor(&raw)?;

        let timeout = match raw.supervisor.timeout.as_deref() {
            Some(s) => Some(parse_duration(s).map_err(|e| {
                BridgeError::Config(format!("[supervisor].timeout: {e}"))
            })?),
            None => None,
        };

        Ok(Settings::new_unchecked(raw, timeout))
    }
}

fn validate_interpreter(raw: &RawSettings) -> Result<()> {
    if raw.interpreter.program.trim().is_empty() {
        return Err(BridgeError::Config(
            "[interpreter].program must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_exchange(raw: &RawSettings) -> Result<()> {
    let prefix = &raw.exchange.prefix;
    if prefix.is_empty() || prefix.contains(['/', '\\']) {
        return Err(BridgeError::Config(format!(
            "[exchange].prefix must be a non-empty file name fragment (got '{}')",
            prefix
        )));
    }

    if let Some(dir) = &raw.exchange.dir {
        if !dir.is_dir() {
            return Err(BridgeError::Config(format!(
                "[exchange].dir {:?} does not exist or is not a directory",
                dir
            )));
        }
    }
    Ok(())
}

fn validate_supervisor(raw: &RawSettings) -> Result<()> {
    if raw.supervisor.output_tail_lines == 0 {
        return Err(BridgeError::Config(
            "[supervisor].output_tail_lines must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
