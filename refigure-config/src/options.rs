//! Resolver options and their loading
//!
//! These settings control where configuration documents are looked for and
//! how entries inside them are shaped. They are plain data with defaults that
//! match the conventional layout, so most callers use `ResolverOptions::default()`
//! and override a field or two.

use crate::error::ConfigResult;
use crate::validation::{
    validate_file_name, validate_positive, validate_required_string, Validatable,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default for whether the process is assumed to run in a dev environment
pub const DEFAULT_DEV_ENVIRONMENT: bool = true;

/// Default directory name looked for by the upward search
pub const DEFAULT_BASE_DIRECTORY_NAME: &str = "Base";

/// Default subdirectory of the base directory holding debug config files
pub const DEFAULT_CONFIG_DIRECTORY_NAME: &str = "CONFIG";

/// Default sibling of the base directory used by the dev path helpers
pub const DEFAULT_SOLUTION_DIRECTORY_NAME: &str = "Automation";

/// Default number of directory levels inspected by the upward search
pub const DEFAULT_MAX_SEARCH_DEPTH: usize = 5;

/// Suffix appended to the entry name for the debug global config file
pub const GLOBAL_CONFIG_SUFFIX: &str = ".config";

/// Suffix appended to the entry name for the local config file
pub const LOCAL_CONFIG_SUFFIX: &str = ".local.config";

/// A well-known global config file name with its probing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownFile {
    /// File name, relative to the search directory
    pub name: String,

    /// Lower numbers are probed first
    pub order: u32,
}

impl WellKnownFile {
    pub fn new(name: impl Into<String>, order: u32) -> Self {
        Self {
            name: name.into(),
            order,
        }
    }
}

/// Shape of an entry element: `<add key="..." value="..."/>` by default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryFormat {
    /// Tag name of entry elements
    pub tag: String,

    /// Attribute holding the key
    pub key_attribute: String,

    /// Attribute holding the value
    pub value_attribute: String,
}

impl Default for EntryFormat {
    fn default() -> Self {
        Self {
            tag: "add".to_string(),
            key_attribute: "key".to_string(),
            value_attribute: "value".to_string(),
        }
    }
}

impl Validatable for EntryFormat {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.tag, "tag", self.section_name())?;
        validate_required_string(&self.key_attribute, "key_attribute", self.section_name())?;
        validate_required_string(&self.value_attribute, "value_attribute", self.section_name())?;
        if self.key_attribute == self.value_attribute {
            return Err(self.validation_error("key and value attributes must differ"));
        }
        Ok(())
    }

    fn section_name(&self) -> &'static str {
        "entry"
    }
}

/// Arguments of an explicit `initialize`/`reinitialize` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitializeOptions {
    /// Whether the local override document is loaded and consulted
    pub dev_environment: bool,

    /// Explicit global document path; must exist when given
    pub global_path: Option<PathBuf>,

    /// Explicit local document path; must exist when given
    pub local_path: Option<PathBuf>,
}

impl InitializeOptions {
    /// Dev environment with conventional file discovery
    pub fn dev() -> Self {
        Self {
            dev_environment: true,
            global_path: None,
            local_path: None,
        }
    }

    /// Deployment environment with conventional file discovery
    pub fn production() -> Self {
        Self {
            dev_environment: false,
            global_path: None,
            local_path: None,
        }
    }

    pub fn with_global_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_path = Some(path.into());
        self
    }

    pub fn with_local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }
}

impl Default for InitializeOptions {
    fn default() -> Self {
        Self {
            dev_environment: DEFAULT_DEV_ENVIRONMENT,
            global_path: None,
            local_path: None,
        }
    }
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Initialize with the defaults below the first time a document is needed
    pub auto_initialize: bool,

    /// Dev flag used by auto-initialization
    pub dev_environment: bool,

    /// Explicit global path used by auto-initialization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_path: Option<PathBuf>,

    /// Explicit local path used by auto-initialization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,

    /// Directory probed for well-known file names (process working directory when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_dir: Option<PathBuf>,

    /// Start of the upward search (directory of the running executable when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    /// Stem of debug config file names (file name of the running executable when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_name: Option<String>,

    /// Well-known global config file names
    pub global_file_names: Vec<WellKnownFile>,

    /// Directory name looked for by the upward search
    pub base_directory_name: String,

    /// Subdirectory of the base directory holding debug config files
    pub config_directory_name: String,

    /// Sibling of the base directory used by the dev path helpers
    pub solution_directory_name: String,

    /// Number of directory levels inspected by the upward search
    pub max_search_depth: usize,

    /// Shape of entry elements
    pub entry: EntryFormat,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            auto_initialize: true,
            dev_environment: DEFAULT_DEV_ENVIRONMENT,
            global_path: None,
            local_path: None,
            search_dir: None,
            base_dir: None,
            entry_name: None,
            global_file_names: vec![
                WellKnownFile::new("AutomationBase.config", 1),
                WellKnownFile::new("Automation.config", 2),
            ],
            base_directory_name: DEFAULT_BASE_DIRECTORY_NAME.to_string(),
            config_directory_name: DEFAULT_CONFIG_DIRECTORY_NAME.to_string(),
            solution_directory_name: DEFAULT_SOLUTION_DIRECTORY_NAME.to_string(),
            max_search_depth: DEFAULT_MAX_SEARCH_DEPTH,
            entry: EntryFormat::default(),
        }
    }
}

impl ResolverOptions {
    /// Load options from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse options from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let options: ResolverOptions = serde_yaml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Arguments used when the store initializes itself on first access
    pub fn initialize_options(&self) -> InitializeOptions {
        InitializeOptions {
            dev_environment: self.dev_environment,
            global_path: self.global_path.clone(),
            local_path: self.local_path.clone(),
        }
    }

    /// Well-known global file names in probing order
    pub fn ordered_global_file_names(&self) -> Vec<&str> {
        let mut files: Vec<&WellKnownFile> = self.global_file_names.iter().collect();
        files.sort_by_key(|file| file.order);
        files.into_iter().map(|file| file.name.as_str()).collect()
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_entry_name(mut self, name: impl Into<String>) -> Self {
        self.entry_name = Some(name.into());
        self
    }

    pub fn with_auto_initialize(mut self, enabled: bool) -> Self {
        self.auto_initialize = enabled;
        self
    }

    pub fn with_dev_environment(mut self, dev: bool) -> Self {
        self.dev_environment = dev;
        self
    }

    pub fn with_global_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_path = Some(path.into());
        self
    }

    pub fn with_local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }
}

impl Validatable for ResolverOptions {
    fn validate(&self) -> ConfigResult<()> {
        if self.global_file_names.is_empty() {
            return Err(self.validation_error("at least one global file name must be configured"));
        }
        for file in &self.global_file_names {
            validate_required_string(&file.name, "global_file_names.name", self.section_name())?;
        }

        validate_file_name(&self.base_directory_name, "base_directory_name", self.section_name())?;
        validate_file_name(
            &self.config_directory_name,
            "config_directory_name",
            self.section_name(),
        )?;
        validate_file_name(
            &self.solution_directory_name,
            "solution_directory_name",
            self.section_name(),
        )?;
        validate_positive(self.max_search_depth, "max_search_depth", self.section_name())?;

        if let Some(ref name) = self.entry_name {
            validate_file_name(name, "entry_name", self.section_name())?;
        }

        self.entry.validate()
    }

    fn section_name(&self) -> &'static str {
        "resolver"
    }
}
