//! Scope paths: structured addresses of document regions
//!
//! A scope path such as `/configuration/appSettings/paths/` names the element
//! chain under which entries are searched. It is kept as validated segments and
//! never spliced into a query string, so neither the scope nor the key can
//! change the shape of a lookup.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between scope segments; every textual scope path ends with it
pub const PATH_SEPARATOR: char = '/';

/// App settings section
pub const APP_SETTINGS: &str = "/configuration/appSettings/";

/// Connection strings subsection
pub const CONNECTION_STRINGS: &str = "/configuration/appSettings/connectionStrings/";

/// File system paths subsection
pub const PATHS: &str = "/configuration/appSettings/paths/";

/// Message broker subsection
pub const RABBIT_MQ: &str = "/configuration/appSettings/rabbitMQ/";

/// Message broker management subsection
pub const RABBIT_MQ_MANAGEMENT: &str = "/configuration/appSettings/rabbitMQ/management/";

const RESERVED: &[char] = &['[', ']', '@', '\'', '"', '*', '\\', '|', '(', ')', '=', ','];

/// Validated element chain, root element first
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScopePath {
    segments: Vec<String>,
}

impl ScopePath {
    /// Parse the textual form `/root/child/.../`
    pub fn parse(path: &str) -> ConfigResult<Self> {
        let inner = path
            .strip_prefix(PATH_SEPARATOR)
            .and_then(|rest| rest.strip_suffix(PATH_SEPARATOR))
            .ok_or_else(|| {
                ConfigError::InvalidScopePath(format!(
                    "'{}' must start and end with '{}'",
                    path, PATH_SEPARATOR
                ))
            })?;
        Self::from_segments(inner.split(PATH_SEPARATOR))
    }

    /// Build from individual element names
    pub fn from_segments<I, S>(segments: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(ConfigError::InvalidScopePath(
                "a scope path needs at least the root element".to_string(),
            ));
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { segments })
    }

    /// Scope one level below this one
    pub fn child(&self, name: &str) -> ConfigResult<Self> {
        validate_segment(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Element names, root first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Name of the document's root element
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn app_settings() -> Self {
        Self::well_known(&["configuration", "appSettings"])
    }

    pub fn connection_strings() -> Self {
        Self::well_known(&["configuration", "appSettings", "connectionStrings"])
    }

    pub fn paths() -> Self {
        Self::well_known(&["configuration", "appSettings", "paths"])
    }

    pub fn rabbit_mq() -> Self {
        Self::well_known(&["configuration", "appSettings", "rabbitMQ"])
    }

    pub fn rabbit_mq_management() -> Self {
        Self::well_known(&["configuration", "appSettings", "rabbitMQ", "management"])
    }

    fn well_known(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn validate_segment(segment: &str) -> ConfigResult<()> {
    if segment.is_empty() {
        return Err(ConfigError::InvalidScopePath(
            "empty segment".to_string(),
        ));
    }
    if let Some(bad) = segment
        .chars()
        .find(|c| *c == PATH_SEPARATOR || c.is_whitespace() || RESERVED.contains(c))
    {
        return Err(ConfigError::InvalidScopePath(format!(
            "segment '{}' contains reserved character '{}'",
            segment, bad
        )));
    }
    Ok(())
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}{}", PATH_SEPARATOR, segment)?;
        }
        write!(f, "{}", PATH_SEPARATOR)
    }
}

impl FromStr for ScopePath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ScopePath {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ScopePath> for String {
    fn from(scope: ScopePath) -> Self {
        scope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_display() {
        let scope = ScopePath::parse("/configuration/appSettings/paths/").unwrap();
        assert_eq!(scope.segments(), &["configuration", "appSettings", "paths"]);
        assert_eq!(scope.root(), "configuration");
        assert_eq!(scope.to_string(), PATHS);
        assert_eq!(scope, ScopePath::paths());
    }

    #[test]
    fn test_well_known_scopes_match_constants() {
        assert_eq!(ScopePath::app_settings().to_string(), APP_SETTINGS);
        assert_eq!(ScopePath::connection_strings().to_string(), CONNECTION_STRINGS);
        assert_eq!(ScopePath::rabbit_mq().to_string(), RABBIT_MQ);
        assert_eq!(ScopePath::rabbit_mq_management().to_string(), RABBIT_MQ_MANAGEMENT);
        for text in [APP_SETTINGS, CONNECTION_STRINGS, PATHS, RABBIT_MQ, RABBIT_MQ_MANAGEMENT] {
            assert!(text.ends_with(PATH_SEPARATOR));
            assert!(ScopePath::parse(text).is_ok());
        }
    }

    #[test]
    fn test_rejects_malformed_paths() {
        assert!(ScopePath::parse("/configuration/appSettings").is_err());
        assert!(ScopePath::parse("configuration/appSettings/").is_err());
        assert!(ScopePath::parse("/").is_err());
        assert!(ScopePath::parse("//").is_err());
        assert!(ScopePath::parse("/configuration//paths/").is_err());
        assert!(ScopePath::parse("/configuration/add[@key='x']/").is_err());
        assert!(ScopePath::parse("/config uration/").is_err());
    }

    #[test]
    fn test_child() {
        let scope = ScopePath::rabbit_mq().child("management").unwrap();
        assert_eq!(scope, ScopePath::rabbit_mq_management());
        assert!(ScopePath::rabbit_mq().child("a/b").is_err());
    }

    #[test]
    fn test_from_str() {
        let scope: ScopePath = "/root/".parse().unwrap();
        assert_eq!(scope.segments(), &["root"]);
    }
}
