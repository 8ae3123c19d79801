//! Option validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable option sets
pub trait Validatable {
    /// Validate the options
    fn validate(&self) -> ConfigResult<()>;

    /// Get the section name for error reporting
    fn section_name(&self) -> &'static str;

    /// Helper to create a section-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::InvalidOptions(format!("{}: {}", self.section_name(), message.into()))
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, section: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidOptions(format!(
            "{}: {} cannot be empty",
            section, field_name
        )));
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, section: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::InvalidOptions(format!(
            "{}: {} must be greater than 0, got {}",
            section, field_name, value
        )));
    }
    Ok(())
}

/// Validate a bare file or directory name (no separators)
pub fn validate_file_name(value: &str, field_name: &str, section: &str) -> ConfigResult<()> {
    validate_required_string(value, field_name, section)?;
    if value.contains('/') || value.contains('\\') {
        return Err(ConfigError::InvalidOptions(format!(
            "{}: {} must be a bare name, got '{}'",
            section, field_name, value
        )));
    }
    Ok(())
}
