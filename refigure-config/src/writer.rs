//! Best-effort write-back of single values to the global document

use crate::document::{ConfigurationSource, WriteOutcome};
use crate::error::{ConfigError, ConfigResult};
use crate::resolver::ConfigResolver;
use crate::scope::ScopePath;
use tracing::info;

impl ConfigResolver {
    /// Set `key` in the global document and persist it
    ///
    /// Updates the element an unscoped read of `key` would find, or appends a
    /// new entry to the app settings section.
    pub fn set_global(&self, key: &str, value: &str) -> ConfigResult<WriteOutcome> {
        let format = self.options().entry.clone();
        self.write_global(key, |source| {
            source.upsert_anywhere(key, value, &format, &ScopePath::app_settings())
        })
    }

    /// Set `key` under `scope` in the global document and persist it
    pub fn set_global_scoped(
        &self,
        key: &str,
        value: &str,
        scope: &ScopePath,
    ) -> ConfigResult<WriteOutcome> {
        let query = self.query(key, scope);
        self.write_global(key, |source| source.upsert_scoped(&query, value))
    }

    fn write_global<F>(&self, key: &str, edit: F) -> ConfigResult<WriteOutcome>
    where
        F: FnOnce(&mut ConfigurationSource) -> ConfigResult<WriteOutcome>,
    {
        let _guard = self.write_lock.lock();
        let sources = self.sources()?;
        let path = sources.global().path().to_path_buf();
        let fs = self.store.file_system();

        // Fresh read: the write handle is independent of the cached read-only tree
        let content = fs
            .read_to_string(&path)
            .map_err(|e| ConfigError::write_failure(&path, e))?;
        let mut document = ConfigurationSource::parse(&path, &content, false)
            .map_err(|e| ConfigError::write_failure(&path, e))?;

        let outcome = edit(&mut document)?;
        let xml = document.to_xml()?;
        fs.write(&path, &xml)
            .map_err(|e| ConfigError::write_failure(&path, e))?;

        info!(key, path = %path.display(), ?outcome, "Persisted global config value");
        self.store.replace_global(document)?;
        Ok(outcome)
    }
}
