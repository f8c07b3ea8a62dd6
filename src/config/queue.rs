//! Live queue configuration

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::error::ValidationError;

/// Queue configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// How often queue subscriptions re-read the store, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// How long a call shows as active, in seconds
    #[serde(default = "default_call_window")]
    pub call_window_secs: i64,

    /// Business day offset from UTC, in minutes (IST = 330)
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,

    /// Extra labels per department, as
    /// `Admissions=Admission|Enquiries;Visa=Visas`
    pub department_aliases: Option<String>,
}

impl QueueConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn call_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.call_window_secs)
    }

    pub fn utc_offset_secs(&self) -> i32 {
        self.utc_offset_minutes * 60
    }

    /// Parses `department_aliases` into department → aliases.
    pub fn alias_map(&self) -> Result<HashMap<String, Vec<String>>, ValidationError> {
        let mut map = HashMap::new();
        let Some(raw) = self.department_aliases.as_deref() else {
            return Ok(map);
        };

        for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (department, aliases) = entry
                .split_once('=')
                .ok_or_else(|| ValidationError::InvalidDepartmentAlias(entry.to_string()))?;
            let department = department.trim();
            let aliases: Vec<String> = aliases
                .split('|')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
            if department.is_empty() || aliases.is_empty() {
                return Err(ValidationError::InvalidDepartmentAlias(entry.to_string()));
            }
            map.entry(department.to_string())
                .or_insert_with(Vec::new)
                .extend(aliases);
        }
        Ok(map)
    }

    /// Validate queue configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(500..=300_000).contains(&self.poll_interval_ms) {
            return Err(ValidationError::InvalidPollInterval);
        }
        if !(1..=3600).contains(&self.call_window_secs) {
            return Err(ValidationError::InvalidCallWindow);
        }
        if self.utc_offset_minutes.abs() > 14 * 60 {
            return Err(ValidationError::InvalidUtcOffset);
        }
        self.alias_map()?;
        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            call_window_secs: default_call_window(),
            utc_offset_minutes: default_utc_offset(),
            department_aliases: None,
        }
    }
}

fn default_poll_interval() -> u64 {
    5_000
}

fn default_call_window() -> i64 {
    60
}

fn default_utc_offset() -> i32 {
    330
}
