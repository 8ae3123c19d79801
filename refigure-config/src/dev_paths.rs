//! Developer-environment directory helpers
//!
//! The base directory found by the upward search anchors a small family of
//! conventional locations inside a source checkout. Those are only
//! meaningful on a developer machine, so they require the dev environment.
//! Generated-code locations hang off the system temp directory instead and
//! are always available.

use crate::error::{ConfigError, ConfigResult};
use crate::resolver::ConfigResolver;
use std::path::PathBuf;

/// Paths-scope key naming the generated code folder under the temp directory
pub const GEN_CODE_FOLDER_KEY: &str = "RepoGenCodeFolder";

/// Key naming the package directory under the repository directory
pub const NUGET_PACKAGES_DIRECTORY_KEY: &str = "NugetPackagesDirectoryName";

impl ConfigResolver {
    /// Directory located by the upward search (`Base` by default)
    pub fn base_directory(&self) -> ConfigResult<PathBuf> {
        self.require_dev("base directory")?;
        self.store.path_resolver().base_directory()
    }

    /// Parent of the base directory
    pub fn repository_directory(&self) -> ConfigResult<PathBuf> {
        let base = self.base_directory()?;
        base.parent().map(PathBuf::from).ok_or_else(|| ConfigError::DirectoryNotFound {
            name: "repository".to_string(),
            start: base.clone(),
            levels: 1,
        })
    }

    /// `<repository>/Automation` by default
    pub fn solution_directory(&self) -> ConfigResult<PathBuf> {
        Ok(self
            .repository_directory()?
            .join(&self.options().solution_directory_name))
    }

    pub fn dll_directory(&self) -> ConfigResult<PathBuf> {
        Ok(self.solution_directory()?.join("DLL"))
    }

    /// `<repository>/<NugetPackagesDirectoryName>`
    pub fn nuget_packages_directory(&self) -> ConfigResult<PathBuf> {
        let repository = self.repository_directory()?;
        Ok(repository.join(self.get(NUGET_PACKAGES_DIRECTORY_KEY)?))
    }

    /// `<temp>/<RepoGenCodeFolder>`
    pub fn gen_code_directory(&self) -> ConfigResult<PathBuf> {
        Ok(std::env::temp_dir().join(self.get_path(GEN_CODE_FOLDER_KEY)?))
    }

    pub fn codegen_dto_path(&self, control_subtype: &str, assembly: &str) -> ConfigResult<PathBuf> {
        Ok(self
            .gen_code_directory()?
            .join(assembly)
            .join(control_subtype)
            .join("DTO"))
    }

    pub fn codegen_mapping_path(
        &self,
        control_subtype: &str,
        assembly: &str,
    ) -> ConfigResult<PathBuf> {
        Ok(self
            .gen_code_directory()?
            .join(assembly)
            .join(control_subtype)
            .join("Mapping"))
    }

    pub fn binaries_path(&self, assembly: &str) -> ConfigResult<PathBuf> {
        Ok(self.gen_code_directory()?.join(assembly).join("bin"))
    }

    fn require_dev(&self, operation: &'static str) -> ConfigResult<()> {
        if self.in_dev_environment()? {
            Ok(())
        } else {
            Err(ConfigError::OperationNotAllowed { operation })
        }
    }
}
