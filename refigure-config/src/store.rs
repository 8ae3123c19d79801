//! Lazily initialized holder of the global and local documents

use crate::document::ConfigurationSource;
use crate::error::{ConfigError, ConfigResult};
use crate::fs::FileSystem;
use crate::options::{InitializeOptions, ResolverOptions};
use crate::paths::PathResolver;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// The documents of one successful initialization
#[derive(Debug, Clone)]
pub struct LoadedSources {
    dev_environment: bool,
    global: Arc<ConfigurationSource>,
    local: Option<Arc<ConfigurationSource>>,
}

impl LoadedSources {
    pub fn dev_environment(&self) -> bool {
        self.dev_environment
    }

    pub fn global(&self) -> &ConfigurationSource {
        &self.global
    }

    /// Present exactly when `dev_environment` is set
    pub fn local(&self) -> Option<&ConfigurationSource> {
        self.local.as_deref()
    }

    /// Local source first when in a dev environment, then global
    pub fn in_precedence_order(&self) -> impl Iterator<Item = &ConfigurationSource> {
        self.local().into_iter().chain(std::iter::once(self.global()))
    }

    fn with_global(&self, global: ConfigurationSource) -> Self {
        Self {
            dev_environment: self.dev_environment,
            global: Arc::new(global),
            local: self.local.clone(),
        }
    }
}

/// Holds at most one [`LoadedSources`] snapshot behind one-time initialization
///
/// Initialization runs under the write lock after re-checking the state, so
/// concurrent first accesses load the documents exactly once. Readers take a
/// cheap `Arc` snapshot and never hold the lock while searching.
#[derive(Debug)]
pub struct DocumentStore {
    resolver: PathResolver,
    fs: Arc<dyn FileSystem>,
    auto_initialize: AtomicBool,
    state: RwLock<Option<Arc<LoadedSources>>>,
}

impl DocumentStore {
    pub fn new(options: ResolverOptions, fs: Arc<dyn FileSystem>) -> Self {
        let auto_initialize = AtomicBool::new(options.auto_initialize);
        Self {
            resolver: PathResolver::new(options, fs.clone()),
            fs,
            auto_initialize,
            state: RwLock::new(None),
        }
    }

    pub fn path_resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn auto_initialize(&self) -> bool {
        self.auto_initialize.load(Ordering::Acquire)
    }

    pub fn set_auto_initialize(&self, enabled: bool) {
        self.auto_initialize.store(enabled, Ordering::Release);
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().is_some()
    }

    /// Current snapshot without triggering initialization
    pub fn snapshot(&self) -> Option<Arc<LoadedSources>> {
        self.state.read().clone()
    }

    /// Load the documents unless already initialized
    ///
    /// Returns `false` when the store was already initialized; the arguments
    /// of such a call are ignored. Use [`DocumentStore::reinitialize`] to
    /// switch sources.
    pub fn initialize(&self, init: &InitializeOptions) -> ConfigResult<bool> {
        let mut state = self.state.write();
        if state.is_some() {
            debug!(?init, "Configuration already initialized, ignoring initialize call");
            return Ok(false);
        }
        *state = Some(Arc::new(self.load(init)?));
        Ok(true)
    }

    /// Discard both documents; a no-op when not initialized
    pub fn uninitialize(&self) {
        if self.state.write().take().is_some() {
            debug!("Configuration uninitialized");
        }
    }

    /// Replace the documents in one step
    ///
    /// On failure the store is left uninitialized.
    pub fn reinitialize(&self, init: &InitializeOptions) -> ConfigResult<()> {
        let mut state = self.state.write();
        *state = None;
        *state = Some(Arc::new(self.load(init)?));
        Ok(())
    }

    /// Snapshot of the loaded documents, initializing with the configured
    /// defaults first when auto-initialization is enabled
    pub fn ensure_initialized(&self) -> ConfigResult<Arc<LoadedSources>> {
        if let Some(sources) = self.snapshot() {
            return Ok(sources);
        }
        if !self.auto_initialize() {
            return Err(ConfigError::NotInitialized);
        }

        let init = self.resolver.options().initialize_options();
        let mut state = self.state.write();
        if let Some(ref sources) = *state {
            return Ok(sources.clone());
        }
        let sources = Arc::new(self.load(&init)?);
        *state = Some(sources.clone());
        Ok(sources)
    }

    /// Swap in a new global document, keeping the local one
    pub(crate) fn replace_global(&self, global: ConfigurationSource) -> ConfigResult<()> {
        let mut state = self.state.write();
        let current = state.as_ref().ok_or(ConfigError::NotInitialized)?;
        *state = Some(Arc::new(current.with_global(global)));
        Ok(())
    }

    fn load(&self, init: &InitializeOptions) -> ConfigResult<LoadedSources> {
        let dev_environment = init.dev_environment;

        let global_path = self
            .resolver
            .resolve_global_path(init.global_path.as_deref(), dev_environment)?;
        let global = ConfigurationSource::load(self.fs.as_ref(), &global_path, false)?;

        let local = if dev_environment {
            let local_path = self
                .resolver
                .resolve_local_path(init.local_path.as_deref(), dev_environment)?;
            Some(Arc::new(ConfigurationSource::load(
                self.fs.as_ref(),
                &local_path,
                true,
            )?))
        } else {
            None
        };

        info!(
            global = %global.path().display(),
            local = ?local.as_ref().map(|source| source.path().display().to_string()),
            dev_environment,
            "Configuration initialized"
        );

        Ok(LoadedSources {
            dev_environment,
            global: Arc::new(global),
            local,
        })
    }
}
