//! Layered XML configuration resolution
//!
//! Settings live in up to two XML documents: a global (deployment) document
//! that is always required, and a local (developer machine) document that is
//! only consulted in a dev environment, where it takes precedence.
//!
//! ```xml
//! <configuration>
//!   <appSettings>
//!     <add key="Mode" value="release"/>
//!     <connectionStrings>
//!       <add key="Main" value="Server=db;Database=main"/>
//!     </connectionStrings>
//!     <paths>
//!       <add key="Logs" value="/var/log/app"/>
//!     </paths>
//!   </appSettings>
//! </configuration>
//! ```
//!
//! ```ignore
//! use refigure_config::{ConfigResolver, InitializeOptions, ResolverOptions};
//!
//! let resolver = ConfigResolver::new(ResolverOptions::default())?;
//! resolver.initialize(InitializeOptions::production().with_global_path("app.config"))?;
//!
//! let mode = resolver.get_string("Mode", None)?;
//! let db = resolver.get_connection_string("Main")?;
//! let verbose = resolver.get_bool_silent("Verbose").unwrap_or(false);
//! ```

pub mod dev_paths;
pub mod document;
pub mod error;
pub mod fs;
pub mod lookup;
pub mod options;
pub mod paths;
pub mod resolver;
pub mod scope;
pub mod store;
pub mod typed;
pub mod validation;
pub mod writer;

// Re-export main types
pub use document::{ConfigurationSource, WriteOutcome};
pub use error::{ConfigError, ConfigResult};
pub use fs::{FileSystem, InMemoryFileSystem, StdFileSystem};
pub use lookup::{AnywhereMatch, EntryQuery};
pub use options::{EntryFormat, InitializeOptions, ResolverOptions, WellKnownFile};
pub use paths::PathResolver;
pub use resolver::ConfigResolver;
pub use scope::ScopePath;
pub use store::{DocumentStore, LoadedSources};
pub use typed::{ConfigValue, Lookup};
pub use validation::Validatable;
