//! Reminder configuration.
//!
//! # Invariants
//! - `1 <= high_priority_days <= deadline_window_days`.
//! - `meeting_lookahead_days >= 1`.
//! - `utc_offset_minutes` lies strictly within one day of UTC.

use chrono::FixedOffset;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Tunables for the reminder sweep. Missing JSON fields take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReminderConfig {
    /// Projects due within this many days get a deadline reminder.
    pub deadline_window_days: u32,
    /// Deadline reminders at or below this many days are `high` priority.
    pub high_priority_days: u32,
    /// Meetings on the calendar day this many days ahead get a reminder.
    pub meeting_lookahead_days: u32,
    /// Offset used to resolve calendar-day boundaries.
    pub utc_offset_minutes: i32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            deadline_window_days: 3,
            high_priority_days: 1,
            meeting_lookahead_days: 1,
            utc_offset_minutes: 0,
        }
    }
}

impl ReminderConfig {
    /// Parses and validates JSON configuration.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deadline_window_days == 0 {
            return Err(ConfigError::Invalid(
                "deadline_window_days must be at least 1".to_string(),
            ));
        }
        if self.high_priority_days == 0 || self.high_priority_days > self.deadline_window_days {
            return Err(ConfigError::Invalid(format!(
                "high_priority_days must be within 1..={}",
                self.deadline_window_days
            )));
        }
        if self.meeting_lookahead_days == 0 {
            return Err(ConfigError::Invalid(
                "meeting_lookahead_days must be at least 1".to_string(),
            ));
        }
        if self.utc_offset_minutes.unsigned_abs() >= MINUTES_PER_DAY.unsigned_abs() {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes `{}` is out of range",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Returns the calendar offset, or `None` when out of range.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, message: String },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "failed to read config `{path}`: {message}"),
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Io { .. } | Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ReminderConfig};

    #[test]
    fn empty_json_uses_defaults() {
        let config = ReminderConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ReminderConfig::default());
        assert_eq!(config.deadline_window_days, 3);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config =
            ReminderConfig::from_json_str(r#"{"utc_offset_minutes": 480, "deadline_window_days": 5}"#)
                .unwrap();
        assert_eq!(config.utc_offset_minutes, 480);
        assert_eq!(config.deadline_window_days, 5);
        assert_eq!(config.high_priority_days, 1);
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 480 * 60);
    }

    #[test]
    fn rejects_high_priority_outside_window() {
        let err = ReminderConfig::from_json_str(
            r#"{"deadline_window_days": 2, "high_priority_days": 3}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_fields_and_bad_offsets() {
        assert!(matches!(
            ReminderConfig::from_json_str(r#"{"window": 3}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ReminderConfig::from_json_str(r#"{"utc_offset_minutes": 1440}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ReminderConfig::from_json_str(r#"{"utc_offset_minutes": -2147483648}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(ReminderConfig::from_json_str(r#"{"utc_offset_minutes": -1439}"#).is_ok());
    }
}
