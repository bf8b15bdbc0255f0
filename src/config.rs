use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};
use crate::month::YearMonth;

/// file looked up next to the working directory, without extension
pub const CONFIG_FILE: &str = "installments";

/// prefix of environment overrides, e.g. `TRACKER_ROLLOVER_DAY=5`
pub const ENV_PREFIX: &str = "TRACKER";

/// tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// zone in which "the current month" is read
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// day of month from which the monthly rollover may run
    #[serde(default = "default_rollover_day")]
    pub rollover_day: u32,
    /// default horizon for upcoming-installment projections
    #[serde(default = "default_projection_months")]
    pub projection_months: u32,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_timezone() -> Tz {
    chrono_tz::America::Sao_Paulo
}

fn default_rollover_day() -> u32 {
    1
}

fn default_projection_months() -> u32 {
    3
}

fn default_currency_symbol() -> String {
    "R$".to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            rollover_day: default_rollover_day(),
            projection_months: default_projection_months(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl TrackerConfig {
    /// defaults in another zone
    pub fn in_timezone(timezone: Tz) -> Self {
        Self {
            timezone,
            ..Self::default()
        }
    }

    pub fn with_rollover_day(mut self, day: u32) -> Self {
        self.rollover_day = day;
        self
    }

    pub fn with_projection_months(mut self, months: u32) -> Self {
        self.projection_months = months;
        self
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// load from `.env`, `installments.toml` and `TRACKER_*` variables, in
    /// increasing order of precedence
    pub fn load() -> Result<Self> {
        // a missing .env is fine
        let _ = dotenvy::dotenv();

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(CONFIG_FILE).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let loaded: TrackerConfig = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// parse a TOML document; absent keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from_str(source, ::config::FileFormat::Toml))
            .build()?;

        let loaded: TrackerConfig = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=28).contains(&self.rollover_day) {
            return Err(TrackerError::InvalidConfiguration {
                message: format!("rollover_day must be between 1 and 28, got {}", self.rollover_day),
            });
        }
        if self.projection_months == 0 {
            return Err(TrackerError::InvalidConfiguration {
                message: "projection_months must be positive".to_string(),
            });
        }
        if self.currency_symbol.trim().is_empty() {
            return Err(TrackerError::InvalidConfiguration {
                message: "currency_symbol must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// provider instant in the configured zone
    pub fn local_now(&self, time: &SafeTimeProvider) -> DateTime<Tz> {
        time.now().with_timezone(&self.timezone)
    }

    /// calendar month of the provider instant in the configured zone
    pub fn current_month(&self, time: &SafeTimeProvider) -> YearMonth {
        YearMonth::from(self.local_now(time))
    }

    /// local day of month
    pub fn local_day(&self, time: &SafeTimeProvider) -> u32 {
        self.local_now(time).day()
    }
}
