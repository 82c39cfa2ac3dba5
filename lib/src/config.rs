// lib/src/config.rs

use std::path::Path;

use models::errors::{HospitalError, HospitalResult};
use models::medical::Department;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: String,
    pub end: String,
}

impl Default for WorkingHours {
    fn default() -> Self {
        WorkingHours {
            start: "08:00".to_string(),
            end: "18:00".to_string(),
        }
    }
}

/// Process-wide settings. Constructed once and handed to `Hospital`;
/// services read the wait-model constants from here instead of
/// hard-coding them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HospitalConfig {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub currency: String,
    pub departments: Vec<Department>,
    /// Linear wait model: `waiting_count * per_patient + buffer`.
    pub wait_minutes_per_patient: u32,
    pub wait_buffer_minutes: u32,
    /// Floor applied when estimates are recomputed on the tick.
    pub min_wait_minutes: u32,
    /// Queue notification ring size.
    pub notification_capacity: usize,
    /// Fixed delay used by the simulated sync/export tasks.
    pub sync_delay_ms: u64,
    /// Period of the wait-estimate refresh task.
    pub refresh_interval_ms: u64,
    pub working_hours: WorkingHours,
}

impl Default for HospitalConfig {
    fn default() -> Self {
        HospitalConfig {
            name: "Lagos Island General Hospital".to_string(),
            address: "1 Hospital Road, Lagos".to_string(),
            phone: "+234-800-000-0000".to_string(),
            currency: "NGN".to_string(),
            departments: Department::ALL.to_vec(),
            wait_minutes_per_patient: 15,
            wait_buffer_minutes: 10,
            min_wait_minutes: 5,
            notification_capacity: 50,
            sync_delay_ms: 1000,
            refresh_interval_ms: 5000,
            working_hours: WorkingHours::default(),
        }
    }
}

impl HospitalConfig {
    /// Loads settings from a TOML file; missing keys fall back to the
    /// defaults above.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> HospitalResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw).map_err(|e| {
            HospitalError::ConfigError(format!(
                "failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_carry_the_wait_model_constants() {
        let config = HospitalConfig::default();
        assert_eq!(config.wait_minutes_per_patient, 15);
        assert_eq!(config.wait_buffer_minutes, 10);
        assert_eq!(config.departments.len(), 6);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"Test Clinic\"\nwait_buffer_minutes = 0").unwrap();
        let config = HospitalConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.name, "Test Clinic");
        assert_eq!(config.wait_buffer_minutes, 0);
        assert_eq!(config.wait_minutes_per_patient, 15);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = [unclosed").unwrap();
        let err = HospitalConfig::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, HospitalError::ConfigError(_)));
    }
}
