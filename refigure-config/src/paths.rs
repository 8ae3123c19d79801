//! Locating configuration files on disk

use crate::error::{ConfigError, ConfigResult};
use crate::fs::FileSystem;
use crate::options::{ResolverOptions, GLOBAL_CONFIG_SUFFIX, LOCAL_CONFIG_SUFFIX};
use once_cell::sync::OnceCell;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Resolves global and local document paths from explicit paths, well-known
/// file names, or the upward search for the base directory
#[derive(Debug)]
pub struct PathResolver {
    options: ResolverOptions,
    fs: Arc<dyn FileSystem>,
    base_directory: OnceCell<PathBuf>,
}

impl PathResolver {
    pub fn new(options: ResolverOptions, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            options,
            fs,
            base_directory: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Path of the global document
    pub fn resolve_global_path(
        &self,
        explicit: Option<&Path>,
        dev_environment: bool,
    ) -> ConfigResult<PathBuf> {
        if let Some(path) = explicit {
            return self.require_existing(path);
        }

        let search_dir = self.search_dir()?;
        let candidates: Vec<PathBuf> = self
            .options
            .ordered_global_file_names()
            .into_iter()
            .map(|name| search_dir.join(name))
            .collect();

        if let Some(found) = candidates.iter().find(|path| self.fs.file_exists(path)) {
            debug!(path = %found.display(), "Using well-known global config file");
            return Ok(found.clone());
        }

        if !dev_environment {
            let path = candidates.into_iter().next().unwrap_or(search_dir);
            return Err(ConfigError::ConfigFileNotFound { path });
        }

        self.debug_global_path()
    }

    /// Path of the local document; only meaningful in a dev environment
    pub fn resolve_local_path(
        &self,
        explicit: Option<&Path>,
        dev_environment: bool,
    ) -> ConfigResult<PathBuf> {
        if !dev_environment {
            return Err(ConfigError::OperationNotAllowed {
                operation: "resolve local config path",
            });
        }

        if let Some(path) = explicit {
            return self.require_existing(path);
        }

        let beside = self.search_dir()?.join(self.local_file_name()?);
        if self.fs.file_exists(&beside) {
            return Ok(beside);
        }

        self.debug_local_path()
    }

    /// `<base>/CONFIG/<entry>.config`
    pub fn debug_global_path(&self) -> ConfigResult<PathBuf> {
        Ok(self.debug_config_dir()?.join(self.global_file_name()?))
    }

    /// `<base>/CONFIG/<entry>.local.config`
    pub fn debug_local_path(&self) -> ConfigResult<PathBuf> {
        Ok(self.debug_config_dir()?.join(self.local_file_name()?))
    }

    /// The conventional base directory, found by walking up from the base dir
    ///
    /// The first successful search is cached for the lifetime of the resolver.
    pub fn base_directory(&self) -> ConfigResult<PathBuf> {
        self.base_directory
            .get_or_try_init(|| self.search_base_directory())
            .cloned()
    }

    fn search_base_directory(&self) -> ConfigResult<PathBuf> {
        let start = self.base_dir()?;
        let name = self.options.base_directory_name.as_str();
        let levels = self.options.max_search_depth;

        for dir in start.ancestors().take(levels) {
            let subdirectories = match self.fs.list_subdirectories(dir) {
                Ok(subdirectories) => subdirectories,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                    continue;
                }
            };
            if let Some(found) = subdirectories
                .into_iter()
                .find(|sub| sub.file_name() == Some(OsStr::new(name)))
            {
                debug!(path = %found.display(), "Located base directory");
                return Ok(found);
            }
        }

        Err(ConfigError::DirectoryNotFound {
            name: name.to_string(),
            start,
            levels,
        })
    }

    fn debug_config_dir(&self) -> ConfigResult<PathBuf> {
        Ok(self.base_directory()?.join(&self.options.config_directory_name))
    }

    fn require_existing(&self, path: &Path) -> ConfigResult<PathBuf> {
        if self.fs.file_exists(path) {
            Ok(path.to_path_buf())
        } else {
            Err(ConfigError::ConfigFileNotFound {
                path: path.to_path_buf(),
            })
        }
    }

    fn search_dir(&self) -> ConfigResult<PathBuf> {
        match self.options.search_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    fn base_dir(&self) -> ConfigResult<PathBuf> {
        if let Some(ref dir) = self.options.base_dir {
            return Ok(dir.clone());
        }
        let exe = std::env::current_exe()?;
        exe.parent().map(Path::to_path_buf).ok_or_else(|| {
            ConfigError::InvalidOptions(format!(
                "executable {} has no parent directory",
                exe.display()
            ))
        })
    }

    fn entry_name(&self) -> ConfigResult<String> {
        if let Some(ref name) = self.options.entry_name {
            return Ok(name.clone());
        }
        let exe = std::env::current_exe()?;
        exe.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ConfigError::InvalidOptions(format!(
                    "could not determine entry name from {}",
                    exe.display()
                ))
            })
    }

    fn global_file_name(&self) -> ConfigResult<String> {
        Ok(format!("{}{}", self.entry_name()?, GLOBAL_CONFIG_SUFFIX))
    }

    fn local_file_name(&self) -> ConfigResult<String> {
        Ok(format!("{}{}", self.entry_name()?, LOCAL_CONFIG_SUFFIX))
    }
}
