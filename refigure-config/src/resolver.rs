//! The resolver context and raw string lookups
//!
//! [`ConfigResolver`] is the explicit replacement for process-wide
//! configuration state: construct one at startup and hand references to the
//! code that reads settings. Raw lookups never fail for a missing key; they
//! return an empty string or `None`. Only file, parse, and initialization
//! problems are errors at this layer.
//!
//! # Precedence
//!
//! ```text
//! dev environment:   local ──(empty)──> global ──(empty)──> ""
//! otherwise:                            global ──(empty)──> ""
//! ```

use crate::document::ConfigurationSource;
use crate::error::{ConfigError, ConfigResult};
use crate::fs::{FileSystem, StdFileSystem};
use crate::lookup::{AnywhereMatch, EntryQuery};
use crate::options::{InitializeOptions, ResolverOptions};
use crate::scope::ScopePath;
use crate::store::{DocumentStore, LoadedSources};
use crate::validation::Validatable;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolves configuration values from the local and global documents
#[derive(Debug)]
pub struct ConfigResolver {
    pub(crate) store: DocumentStore,
    /// Serializes writes with each other and with source replacement
    pub(crate) write_lock: Mutex<()>,
}

impl ConfigResolver {
    /// Create a resolver over the real filesystem
    pub fn new(options: ResolverOptions) -> ConfigResult<Self> {
        Self::with_file_system(options, Arc::new(StdFileSystem))
    }

    /// Create a resolver over a custom filesystem
    pub fn with_file_system(
        options: ResolverOptions,
        fs: Arc<dyn FileSystem>,
    ) -> ConfigResult<Self> {
        options.validate()?;
        Ok(Self {
            store: DocumentStore::new(options, fs),
            write_lock: Mutex::new(()),
        })
    }

    pub fn options(&self) -> &ResolverOptions {
        self.store.path_resolver().options()
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Load the documents; ignored when already initialized
    pub fn initialize(&self, init: InitializeOptions) -> ConfigResult<()> {
        self.store.initialize(&init).map(|_| ())
    }

    pub fn uninitialize(&self) {
        let _guard = self.write_lock.lock();
        self.store.uninitialize();
    }

    /// Switch to different sources at runtime
    pub fn reinitialize(&self, init: InitializeOptions) -> ConfigResult<()> {
        let _guard = self.write_lock.lock();
        self.store.reinitialize(&init)
    }

    pub fn is_initialized(&self) -> bool {
        self.store.is_initialized()
    }

    pub fn set_auto_initialize(&self, enabled: bool) {
        self.store.set_auto_initialize(enabled);
    }

    /// Whether the local source is loaded and consulted
    pub fn in_dev_environment(&self) -> ConfigResult<bool> {
        Ok(self.sources()?.dev_environment())
    }

    /// Origin of the loaded global document
    pub fn global_path(&self) -> ConfigResult<PathBuf> {
        Ok(self.sources()?.global().path().to_path_buf())
    }

    /// Origin of the loaded local document, if any
    pub fn local_path(&self) -> ConfigResult<Option<PathBuf>> {
        Ok(self
            .sources()?
            .local()
            .map(|source| source.path().to_path_buf()))
    }

    /// Value of `key` anywhere in the documents, local first in dev; empty when absent
    pub fn get(&self, key: &str) -> ConfigResult<String> {
        let sources = self.sources()?;
        let format = &self.options().entry;

        for source in sources.in_precedence_order() {
            let found = source.find_anywhere(key, format);
            if found.multiplicity > 1 {
                debug!(
                    key,
                    multiplicity = found.multiplicity,
                    path = %source.path().display(),
                    "Key appears more than once, using first in document order"
                );
            }
            if let Some(value) = found.non_empty() {
                return Ok(value.to_string());
            }
        }
        Ok(String::new())
    }

    /// Unscoped match in each loaded document, local first
    pub fn find_anywhere(&self, key: &str) -> ConfigResult<Vec<(PathBuf, AnywhereMatch)>> {
        let sources = self.sources()?;
        let format = &self.options().entry;
        Ok(sources
            .in_precedence_order()
            .map(|source| (source.path().to_path_buf(), source.find_anywhere(key, format)))
            .collect())
    }

    /// Value of `key` under `scope`, local first in dev; empty when absent
    pub fn get_scoped(&self, key: &str, scope: &ScopePath) -> ConfigResult<String> {
        Ok(self.try_get_scoped(key, scope)?.unwrap_or_default())
    }

    /// Value of `key` under `scope`, local first in dev
    pub fn try_get_scoped(&self, key: &str, scope: &ScopePath) -> ConfigResult<Option<String>> {
        let sources = self.sources()?;
        let query = self.query(key, scope);
        let found = sources
            .in_precedence_order()
            .find_map(|source| non_empty_scoped(source, &query));
        Ok(found)
    }

    /// Value of `key` under `scope` in the local document only
    pub fn get_local(&self, key: &str, scope: &ScopePath) -> ConfigResult<String> {
        Ok(self.try_get_local(key, scope)?.unwrap_or_default())
    }

    pub fn try_get_local(&self, key: &str, scope: &ScopePath) -> ConfigResult<Option<String>> {
        let sources = self.sources()?;
        let local = sources.local().ok_or(ConfigError::OperationNotAllowed {
            operation: "read local config",
        })?;
        Ok(non_empty_scoped(local, &self.query(key, scope)))
    }

    /// Value of `key` under `scope` in the global document only
    pub fn get_global(&self, key: &str, scope: &ScopePath) -> ConfigResult<String> {
        Ok(self.try_get_global(key, scope)?.unwrap_or_default())
    }

    pub fn try_get_global(&self, key: &str, scope: &ScopePath) -> ConfigResult<Option<String>> {
        let sources = self.sources()?;
        Ok(non_empty_scoped(sources.global(), &self.query(key, scope)))
    }

    pub fn get_connection_string(&self, key: &str) -> ConfigResult<String> {
        self.get_scoped(key, &ScopePath::connection_strings())
    }

    pub fn try_get_connection_string(&self, key: &str) -> ConfigResult<Option<String>> {
        self.try_get_scoped(key, &ScopePath::connection_strings())
    }

    pub fn get_path(&self, key: &str) -> ConfigResult<String> {
        self.get_scoped(key, &ScopePath::paths())
    }

    pub fn try_get_path(&self, key: &str) -> ConfigResult<Option<String>> {
        self.try_get_scoped(key, &ScopePath::paths())
    }

    pub(crate) fn sources(&self) -> ConfigResult<Arc<LoadedSources>> {
        self.store.ensure_initialized()
    }

    pub(crate) fn query(&self, key: &str, scope: &ScopePath) -> EntryQuery {
        EntryQuery::new(scope.clone(), key).with_format(self.options().entry.clone())
    }
}

fn non_empty_scoped(source: &ConfigurationSource, query: &EntryQuery) -> Option<String> {
    source
        .find_scoped(query)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
