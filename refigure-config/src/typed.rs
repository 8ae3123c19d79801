//! Typed accessors over raw string lookups
//!
//! Every typed read goes through [`ConfigResolver::lookup`], which yields a
//! [`Lookup`]: found, not found, or present but unparseable. Strict accessors
//! turn the last two into errors; silent accessors turn them into `None`.

use crate::error::{ConfigError, ConfigResult};
use crate::resolver::ConfigResolver;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

/// Outcome of a typed lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The key had a value that converted cleanly
    Found(T),
    /// No source had a non-empty value for the key
    NotFound,
    /// The key had a value that did not convert
    Invalid { raw: String, reason: String },
}

impl<T> Lookup<T> {
    /// Silent projection
    pub fn ok(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Invalid { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl<T: ConfigValue> Lookup<T> {
    /// Strict projection: absence and bad input are both parse failures
    pub fn into_result(self, key: &str, message: Option<&str>) -> ConfigResult<T> {
        match self {
            Lookup::Found(value) => Ok(value),
            Lookup::NotFound => Err(ConfigError::ParseFailure {
                key: key.to_string(),
                value: String::new(),
                target: T::TYPE_NAME,
                message: message.unwrap_or("no value configured").to_string(),
            }),
            Lookup::Invalid { raw, reason } => Err(ConfigError::ParseFailure {
                key: key.to_string(),
                value: raw,
                target: T::TYPE_NAME,
                message: message.map(str::to_string).unwrap_or(reason),
            }),
        }
    }
}

/// Types a raw configuration string converts into
pub trait ConfigValue: Sized {
    /// Name used in error messages
    const TYPE_NAME: &'static str;

    fn parse_value(raw: &str) -> Result<Self, String>;
}

impl ConfigValue for String {
    const TYPE_NAME: &'static str = "string";

    fn parse_value(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl ConfigValue for i32 {
    const TYPE_NAME: &'static str = "32-bit integer";

    fn parse_value(raw: &str) -> Result<Self, String> {
        raw.trim().parse().map_err(|e: std::num::ParseIntError| e.to_string())
    }
}

impl ConfigValue for i64 {
    const TYPE_NAME: &'static str = "64-bit integer";

    fn parse_value(raw: &str) -> Result<Self, String> {
        raw.trim().parse().map_err(|e: std::num::ParseIntError| e.to_string())
    }
}

impl ConfigValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn parse_value(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err("expected 'true' or 'false'".to_string())
        }
    }
}

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl ConfigValue for NaiveDateTime {
    const TYPE_NAME: &'static str = "date-time";

    fn parse_value(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(with_offset.naive_utc());
        }
        for format in DATE_TIME_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(parsed);
            }
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| "expected RFC 3339, 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD'".to_string())
    }
}

impl ConfigResolver {
    /// Typed lookup of `key` with the usual local-over-global precedence
    pub fn lookup<T: ConfigValue>(&self, key: &str) -> ConfigResult<Lookup<T>> {
        let raw = self.get(key)?;
        if raw.is_empty() {
            return Ok(Lookup::NotFound);
        }
        Ok(match T::parse_value(&raw) {
            Ok(value) => Lookup::Found(value),
            Err(reason) => Lookup::Invalid { raw, reason },
        })
    }

    /// Raw value of `key`; with a message, absence becomes [`ConfigError::MissingKey`]
    pub fn get_string(&self, key: &str, exception_message: Option<&str>) -> ConfigResult<String> {
        let value = self.get(key)?;
        match exception_message {
            Some(message) if value.is_empty() => Err(ConfigError::MissingKey {
                key: key.to_string(),
                message: message.to_string(),
            }),
            _ => Ok(value),
        }
    }

    pub fn get_int(&self, key: &str) -> ConfigResult<i32> {
        self.lookup::<i32>(key)?.into_result(key, None)
    }

    pub fn get_long(&self, key: &str) -> ConfigResult<i64> {
        self.lookup::<i64>(key)?.into_result(key, None)
    }

    pub fn get_bool(&self, key: &str) -> ConfigResult<bool> {
        self.lookup::<bool>(key)?.into_result(key, None)
    }

    /// Date-time value of `key`; `exception_message` replaces the parse error text
    pub fn get_date_time(
        &self,
        key: &str,
        exception_message: Option<&str>,
    ) -> ConfigResult<NaiveDateTime> {
        self.lookup::<NaiveDateTime>(key)?
            .into_result(key, exception_message)
    }

    /// Typed value of `key`, or `None` for any failure
    pub fn get_silent<T: ConfigValue>(&self, key: &str) -> Option<T> {
        match self.lookup::<T>(key) {
            Ok(Lookup::Invalid { raw, reason }) => {
                debug!(key, raw = %raw, reason = %reason, "Ignoring unparseable config value");
                None
            }
            Ok(lookup) => lookup.ok(),
            Err(e) => {
                debug!(key, error = %e, "Ignoring config lookup failure");
                None
            }
        }
    }

    pub fn get_int_silent(&self, key: &str) -> Option<i32> {
        self.get_silent(key)
    }

    pub fn get_bool_silent(&self, key: &str) -> Option<bool> {
        self.get_silent(key)
    }

    pub fn get_date_time_silent(&self, key: &str) -> Option<NaiveDateTime> {
        self.get_silent(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFileSystem;
    use crate::options::{InitializeOptions, ResolverOptions};
    use chrono::NaiveDate;
    use std::sync::Arc;

    const GLOBAL: &str = r#"<configuration><appSettings>
  <add key="Port" value="8080"/>
  <add key="Tests.GetAsBoolSilent_False" value="False"/>
  <add key="Deadline" value="2024-03-01 17:30:00"/>
  <add key="Big" value="9000000000"/>
</appSettings></configuration>"#;

    const LOCAL: &str = r#"<configuration><appSettings>
  <add key="Tests.GetAsBoolSilent_True" value="true"/>
  <add key="Tests.NotABool" value="notabool"/>
  <add key="Port" value=" 9090 "/>
  <add key="BadDate" value="yesterday"/>
</appSettings></configuration>"#;

    fn resolver() -> ConfigResolver {
        let fs = Arc::new(InMemoryFileSystem::new());
        fs.add_file("/cfg/global.config", GLOBAL);
        fs.add_file("/cfg/local.config", LOCAL);
        let options = ResolverOptions::default()
            .with_dev_environment(true)
            .with_global_path("/cfg/global.config")
            .with_local_path("/cfg/local.config");
        ConfigResolver::with_file_system(options, fs).unwrap()
    }

    #[test]
    fn test_bool_silent() {
        let resolver = resolver();
        assert_eq!(resolver.get_bool_silent("Tests.GetAsBoolSilent_True"), Some(true));
        assert_eq!(resolver.get_bool_silent("Tests.GetAsBoolSilent_False"), Some(false));
        assert_eq!(resolver.get_bool_silent("Tests.GetAsBoolSilent_DoesNotExist"), None);
        assert_eq!(resolver.get_bool_silent("Tests.NotABool"), None);
    }

    #[test]
    fn test_int_accessors() {
        let resolver = resolver();
        assert_eq!(resolver.get_int("Port").unwrap(), 9090);
        assert_eq!(resolver.get_int_silent("Port"), Some(9090));
        assert_eq!(resolver.get_int_silent("Missing"), None);
        assert_eq!(resolver.get_int_silent("Tests.NotABool"), None);
        assert_eq!(resolver.get_long("Big").unwrap(), 9_000_000_000);
        assert!(matches!(resolver.get_int("Big"), Err(ConfigError::ParseFailure { .. })));
        assert!(matches!(resolver.get_int("Missing"), Err(ConfigError::ParseFailure { .. })));
    }

    #[test]
    fn test_get_string_required() {
        let resolver = resolver();
        assert_eq!(resolver.get_string("Missing", None).unwrap(), "");
        match resolver.get_string("Missing", Some("Missing must be set")) {
            Err(ConfigError::MissingKey { key, message }) => {
                assert_eq!(key, "Missing");
                assert_eq!(message, "Missing must be set");
            }
            other => panic!("expected MissingKey, got {:?}", other),
        }
        assert_eq!(resolver.get_string("Port", Some("unused")).unwrap(), " 9090 ");
    }

    #[test]
    fn test_date_time_accessors() {
        let resolver = resolver();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        assert_eq!(resolver.get_date_time("Deadline", None).unwrap(), expected);
        assert_eq!(resolver.get_date_time_silent("Deadline"), Some(expected));
        assert_eq!(resolver.get_date_time_silent("BadDate"), None);

        match resolver.get_date_time("BadDate", Some("BadDate must be a date")) {
            Err(ConfigError::ParseFailure { value, message, .. }) => {
                assert_eq!(value, "yesterday");
                assert_eq!(message, "BadDate must be a date");
            }
            other => panic!("expected ParseFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_projections() {
        let resolver = resolver();
        assert_eq!(
            resolver.lookup::<bool>("Tests.GetAsBoolSilent_True").unwrap(),
            Lookup::Found(true)
        );
        assert_eq!(resolver.lookup::<bool>("Missing").unwrap(), Lookup::NotFound);
        assert!(matches!(
            resolver.lookup::<bool>("Tests.NotABool").unwrap(),
            Lookup::Invalid { ref raw, .. } if raw == "notabool"
        ));
    }

    #[test]
    fn test_silent_swallows_initialization_errors() {
        let fs = Arc::new(InMemoryFileSystem::new());
        let options = ResolverOptions::default().with_auto_initialize(false);
        let resolver = ConfigResolver::with_file_system(options, fs).unwrap();
        assert_eq!(resolver.get_bool_silent("Anything"), None);
        assert!(resolver.get_bool("Anything").is_err());
        assert!(resolver
            .initialize(InitializeOptions::production().with_global_path("/none.config"))
            .is_err());
    }

    #[test]
    fn test_value_parsers() {
        assert_eq!(bool::parse_value(" TRUE "), Ok(true));
        assert!(bool::parse_value("1").is_err());
        assert_eq!(i32::parse_value("-42"), Ok(-42));
        assert!(i32::parse_value("4.2").is_err());

        let rfc = NaiveDateTime::parse_value("2024-03-01T17:30:00+02:00").unwrap();
        let march_first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(rfc, march_first.and_hms_opt(15, 30, 0).unwrap());
        let date_only = NaiveDateTime::parse_value("2024-03-01").unwrap();
        assert_eq!(date_only, march_first.and_hms_opt(0, 0, 0).unwrap());
        let fractional = NaiveDateTime::parse_value("2024-03-01T17:30:00.250").unwrap();
        assert_eq!(fractional.and_utc().timestamp_subsec_millis(), 250);
    }
}
