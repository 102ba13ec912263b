use carecal_core::shift::HolidayQuota;
use figment::{Figment, providers::{Format, Toml, Env}};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug)]
pub struct Config {
    /// Location of the JSON document
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default)]
    pub shift: ShiftConfig,
}

/// Roster and holiday quotas for the shift planner
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct ShiftConfig {
    /// Staff names in grid order
    pub staff: Vec<String>,
    /// Statutory holidays per staff member and month
    pub legal_holidays: u32,
    /// Extra holidays per staff member and month
    pub legal_out_holidays: u32,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        let quota = HolidayQuota::default();
        Self {
            staff: vec!["Staff A".to_string(), "Staff B".to_string(), "Staff C".to_string()],
            legal_holidays: quota.legal,
            legal_out_holidays: quota.legal_out,
        }
    }
}

impl ShiftConfig {
    pub fn quota(&self) -> HolidayQuota {
        HolidayQuota {
            legal: self.legal_holidays,
            legal_out: self.legal_out_holidays,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            shift: ShiftConfig::default(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/db.json")
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("carecal.toml"))
            .merge(Env::prefixed("CARECAL_").split("__"))
            .extract()
    }
}
