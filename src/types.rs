// src/types.rs

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

/// A tree-shaped structured mapping: string keys to nested maps, sequences
/// and scalars. Used for step `config`, `params`, `state` and everything the
/// interpreter hands back.
pub type Document = Map<String, Value>;

/// Where the interpreter's merged stdout/stderr ends up on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputForward {
    /// One `info!` event per line, target `taskbridge::child`.
    #[default]
    Log,
    /// Raw copy to the host's stderr.
    Stderr,
    /// Drained and dropped (the tail is still kept for error reports).
    Discard,
}

impl FromStr for OutputForward {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "log" => Ok(OutputForward::Log),
            "stderr" => Ok(OutputForward::Stderr),
            "discard" => Ok(OutputForward::Discard),
            other => Err(format!(
                "invalid forward_output: {other} (expected \"log\", \"stderr\" or \"discard\")"
            )),
        }
    }
}

/// Parse a duration like `"500ms"`, `"30s"`, `"5m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_parse_with_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 30s "), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn durations_reject_missing_or_unknown_units() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("3d").is_err());
        assert!(parse_duration("s").is_err());
    }

    #[test]
    fn durations_reject_overflowing_values() {
        assert!(parse_duration("6000000000000000000h").is_err());
        assert!(parse_duration("400000000000000000m").is_err());
        assert_eq!(
            parse_duration("18446744073709551615s"),
            Ok(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn output_forward_from_str() {
        assert_eq!("LOG".parse::<OutputForward>(), Ok(OutputForward::Log));
        assert_eq!("stderr".parse::<OutputForward>(), Ok(OutputForward::Stderr));
        assert!("stdout".parse::<OutputForward>().is_err());
    }
}
