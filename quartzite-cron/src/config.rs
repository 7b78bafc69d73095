//! Engine configuration loaded from the environment, dotenv files or TOML.

use crate::error::{CronError, CronResult};
use crate::expression::CronExpression;
use crate::field::MIN_YEAR;
use crate::search::DEFAULT_SEARCH_YEAR_LIMIT;
use crate::zone::Zone;
use quartzite_log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable naming the default zone.
pub const TIME_ZONE_VAR: &str = "QUARTZITE_TIME_ZONE";

/// Environment variable naming the search year cap.
pub const SEARCH_YEAR_LIMIT_VAR: &str = "QUARTZITE_SEARCH_YEAR_LIMIT";

/// Defaults applied to expressions built through [`CronConfig::parse_expression`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CronConfig {
    /// `UTC`, `LOCAL`, an offset like `+05:30`, or an IANA name. `None` means the system zone.
    pub time_zone: Option<String>,
    /// Last year the forward search may reach.
    pub search_year_limit: i32,
}

impl Default for CronConfig {
    fn default() -> Self {
        Self {
            time_zone: None,
            search_year_limit: DEFAULT_SEARCH_YEAR_LIMIT,
        }
    }
}

impl CronConfig {
    /// Read `QUARTZITE_TIME_ZONE` and `QUARTZITE_SEARCH_YEAR_LIMIT` from the process environment.
    pub fn from_env() -> CronResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the same variables from a dotenv file without touching the process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> CronResult<Self> {
        let mut vars = HashMap::new();
        let iter = dotenvy::from_path_iter(path.as_ref())
            .map_err(|e| CronError::Config(format!("Failed to read env file: {}", e)))?;
        for item in iter {
            let (key, value) = item.map_err(|e| CronError::Config(format!("Invalid env file: {}", e)))?;
            vars.insert(key, value);
        }
        Self::from_lookup(|key: &str| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CronResult<Self> {
        let mut config = Self::default();
        if let Some(zone) = lookup(TIME_ZONE_VAR).filter(|v| !v.trim().is_empty()) {
            config.time_zone = Some(zone.trim().to_string());
        }
        if let Some(limit) = lookup(SEARCH_YEAR_LIMIT_VAR) {
            config.search_year_limit = limit.trim().parse().map_err(|_| {
                CronError::Config(format!("{} must be a year, got '{}'", SEARCH_YEAR_LIMIT_VAR, limit))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> CronResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CronError::Config(format!("TOML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load_file(path: impl AsRef<Path>) -> CronResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!("loaded cron config from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> CronResult<()> {
        if self.search_year_limit < MIN_YEAR as i32 {
            return Err(CronError::Config(format!(
                "search_year_limit must be at least {}, got {}",
                MIN_YEAR, self.search_year_limit
            )));
        }
        self.zone().map(|_| ())
    }

    /// The configured zone, or the system zone when none is set.
    pub fn zone(&self) -> CronResult<Zone> {
        match &self.time_zone {
            Some(name) => name.parse(),
            None => Ok(Zone::Local),
        }
    }

    /// Parse `expression` with this configuration's zone and search cap.
    pub fn parse_expression(&self, expression: &str) -> CronResult<CronExpression> {
        let zone = self.zone()?;
        Ok(CronExpression::parse(expression)?
            .with_time_zone(zone)
            .with_search_year_limit(self.search_year_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CronConfig::default();
        assert_eq!(config.time_zone, None);
        assert_eq!(config.search_year_limit, 2999);
        assert_eq!(config.zone().unwrap(), Zone::Local);
    }

    #[test]
    fn test_from_lookup() {
        let config = CronConfig::from_lookup(vars(&[
            (TIME_ZONE_VAR, " Europe/Paris "),
            (SEARCH_YEAR_LIMIT_VAR, "2200"),
        ]))
        .unwrap();
        assert_eq!(config.time_zone.as_deref(), Some("Europe/Paris"));
        assert_eq!(config.search_year_limit, 2200);
        assert_eq!(config.zone().unwrap(), Zone::Named(chrono_tz::Europe::Paris));
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        assert!(CronConfig::from_lookup(vars(&[(SEARCH_YEAR_LIMIT_VAR, "soon")])).is_err());
        assert!(CronConfig::from_lookup(vars(&[(SEARCH_YEAR_LIMIT_VAR, "1900")])).is_err());
        let err = CronConfig::from_lookup(vars(&[(TIME_ZONE_VAR, "Nowhere/Special")])).unwrap_err();
        assert!(matches!(err, CronError::InvalidTimeZone(_)));
    }

    #[test]
    fn test_from_toml_str() {
        let config = CronConfig::from_toml_str(
            r#"
            time_zone = "UTC"
            search_year_limit = 2100
        "#,
        )
        .unwrap();
        assert_eq!(config.zone().unwrap(), Zone::Utc);
        assert_eq!(config.search_year_limit, 2100);

        let partial = CronConfig::from_toml_str("time_zone = \"+02:00\"").unwrap();
        assert_eq!(partial.search_year_limit, 2999);

        assert!(CronConfig::from_toml_str("search_year_limit = \"never\"").is_err());
    }

    #[test]
    fn test_load_file_and_env_file() {
        let dir = std::env::temp_dir();

        let toml_path = dir.join(format!("quartzite-config-{}.toml", std::process::id()));
        fs::write(&toml_path, "time_zone = \"Asia/Tokyo\"\n").unwrap();
        let config = CronConfig::load_file(&toml_path).unwrap();
        assert_eq!(config.zone().unwrap(), Zone::Named(chrono_tz::Asia::Tokyo));
        fs::remove_file(&toml_path).unwrap();

        let env_path = dir.join(format!("quartzite-config-{}.env", std::process::id()));
        let mut file = fs::File::create(&env_path).unwrap();
        writeln!(file, "# cron defaults").unwrap();
        writeln!(file, "{}=UTC", TIME_ZONE_VAR).unwrap();
        writeln!(file, "{}=2500", SEARCH_YEAR_LIMIT_VAR).unwrap();
        drop(file);
        let config = CronConfig::from_env_file(&env_path).unwrap();
        assert_eq!(config.zone().unwrap(), Zone::Utc);
        assert_eq!(config.search_year_limit, 2500);
        fs::remove_file(&env_path).unwrap();

        assert!(matches!(
            CronConfig::load_file(dir.join("quartzite-missing.toml")),
            Err(CronError::Io(_))
        ));
    }

    #[test]
    fn test_parse_expression_applies_config() {
        let config = CronConfig {
            time_zone: Some("UTC".to_string()),
            search_year_limit: 2050,
        };
        let expr = config.parse_expression("0 0 12 * * ?").unwrap();
        assert_eq!(expr.time_zone(), Zone::Utc);
        assert_eq!(expr.search_year_limit(), 2050);

        let err = config.parse_expression("0 0 12 * * *").unwrap_err();
        assert!(matches!(err, CronError::InvalidExpression(_)));
    }
}
