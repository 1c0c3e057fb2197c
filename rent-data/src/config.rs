//! Ledger configuration read from a TOML file.
//!
//! ```toml
//! database_url = "rent.db"
//! default_period = "current_quarter"
//!
//! [profile]
//! regime = "individual_entrepreneur"
//! sole_proprietor_scheme = "income_minus_expenses"
//! ```
//!
//! `RENT_LEDGER_DB` overrides `database_url`. Command-line flags override
//! both. [`LedgerConfig::select_period`] applies the period flags on top of
//! `default_period`.

use std::env;
use std::path::Path;

use chrono::NaiveDate;
use clap::ValueEnum;
use rent_core::calculations::{ReportPeriod, TaxRuleError};
use rent_core::db::DbConfig;
use rent_core::{LandlordProfile, TaxRegime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DATABASE_ENV_VAR: &str = "RENT_LEDGER_DB";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Regime(#[from] TaxRuleError),

    #[error("a custom period needs both --from and --to")]
    IncompleteCustomPeriod,

    #[error("--from and --to only apply to --period custom")]
    DatesWithPreset,
}

/// Period names accepted by `--period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeriodPreset {
    CurrentMonth,
    LastMonth,
    CurrentQuarter,
    CurrentYear,
    Custom,
}

impl PeriodPreset {
    /// The fixed period named, or `None` for `custom`.
    fn period(self) -> Option<ReportPeriod> {
        match self {
            Self::CurrentMonth => Some(ReportPeriod::CurrentMonth),
            Self::LastMonth => Some(ReportPeriod::LastMonth),
            Self::CurrentQuarter => Some(ReportPeriod::CurrentQuarter),
            Self::CurrentYear => Some(ReportPeriod::CurrentYear),
            Self::Custom => None,
        }
    }
}

fn default_profile() -> LandlordProfile {
    TaxRegime::SelfEmployed.into()
}

fn default_period() -> ReportPeriod {
    ReportPeriod::CurrentMonth
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_profile")]
    pub profile: LandlordProfile,
    #[serde(default = "default_period")]
    pub default_period: ReportPeriod,
    /// SQLite file path or URL. Without one, data comes from CSV files only.
    #[serde(default)]
    pub database_url: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            default_period: default_period(),
            database_url: None,
        }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Reads `path`, then applies the environment override.
    ///
    /// A missing file is not an error when `required` is false; the
    /// defaults are used instead.
    pub fn load(
        path: &Path,
        required: bool,
    ) -> Result<Self, ConfigError> {
        let config = match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents)?,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        Ok(config.with_database_override(env::var(DATABASE_ENV_VAR).ok()))
    }

    /// Replaces `database_url` when `url` is set and not blank.
    pub fn with_database_override(
        mut self,
        url: Option<String>,
    ) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.database_url = Some(url);
        }
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Regime`] when the profile names an unknown
    /// regime or sub-choice.
    pub fn regime(&self) -> Result<TaxRegime, ConfigError> {
        Ok(TaxRegime::from_profile(&self.profile)?)
    }

    pub fn db_config(&self) -> Option<DbConfig> {
        self.database_url.as_deref().map(DbConfig::sqlite)
    }

    /// Resolves the `--period`, `--from` and `--to` flags.
    ///
    /// * No flags: `default_period`.
    /// * `--from` and `--to`, with or without `--period custom`: a custom
    ///   period.
    /// * A preset alone: that preset.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::IncompleteCustomPeriod`] when a custom period lacks
    ///   either date.
    /// * [`ConfigError::DatesWithPreset`] when a preset is combined with
    ///   dates.
    pub fn select_period(
        &self,
        preset: Option<PeriodPreset>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<ReportPeriod, ConfigError> {
        let fixed = preset.and_then(PeriodPreset::period);
        match (preset, fixed, from, to) {
            (None, _, None, None) => Ok(self.default_period),
            (_, Some(period), None, None) => Ok(period),
            (_, Some(_), _, _) => Err(ConfigError::DatesWithPreset),
            (_, None, Some(start), Some(end)) => Ok(ReportPeriod::Custom { start, end }),
            (_, None, _, _) => Err(ConfigError::IncompleteCustomPeriod),
        }
    }
}
