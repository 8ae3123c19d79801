//! Integration tests for refigure-config

use proptest::prelude::*;
use refigure_config::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const GLOBAL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <appSettings>
    <add key="Tests.GlobalOnly" value="global"/>
    <add key="Tests.Both" value="global-both"/>
    <add key="Tests.GetAsBoolSilent_False" value="false"/>
    <connectionStrings>
      <add key="Main" value="Server=prod;Database=main"/>
    </connectionStrings>
    <paths>
      <add key="Logs" value="/var/log/app"/>
    </paths>
  </appSettings>
</configuration>"#;

const LOCAL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <appSettings>
    <add key="Tests.A" value="true"/>
    <add key="Tests.C" value="notabool"/>
    <add key="Tests.Both" value="local-both"/>
    <connectionStrings>
      <add key="Main" value="Server=localhost;Database=main"/>
    </connectionStrings>
  </appSettings>
</configuration>"#;

/// A developer checkout: `<root>/repo/Base/CONFIG/app.config` plus a binary directory
struct Checkout {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl Checkout {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        let config_dir = root.join("repo").join("Base").join("CONFIG");
        fs::create_dir_all(&config_dir).unwrap();
        fs::create_dir_all(root.join("repo").join("Tools").join("bin")).unwrap();
        fs::create_dir_all(root.join("work")).unwrap();
        fs::write(config_dir.join("app.config"), GLOBAL).unwrap();
        fs::write(config_dir.join("app.local.config"), LOCAL).unwrap();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    fn options(&self) -> ResolverOptions {
        ResolverOptions::default()
            .with_search_dir(self.root.join("work"))
            .with_base_dir(self.root.join("repo").join("Tools").join("bin"))
            .with_entry_name("app")
    }

    fn global_path(&self) -> PathBuf {
        self.root.join("repo").join("Base").join("CONFIG").join("app.config")
    }

    fn local_path(&self) -> PathBuf {
        self.root.join("repo").join("Base").join("CONFIG").join("app.local.config")
    }
}

#[test]
fn test_dev_environment_discovers_debug_files() {
    let checkout = Checkout::new();
    let resolver = ConfigResolver::new(checkout.options()).unwrap();

    assert_eq!(resolver.get("Tests.Both").unwrap(), "local-both");
    assert_eq!(resolver.get("Tests.GlobalOnly").unwrap(), "global");
    assert_eq!(resolver.global_path().unwrap(), checkout.global_path());
    assert_eq!(resolver.local_path().unwrap(), Some(checkout.local_path()));
}

#[test]
fn test_bool_silent_examples() {
    let checkout = Checkout::new();
    let resolver = ConfigResolver::new(checkout.options()).unwrap();

    assert_eq!(resolver.get_bool_silent("Tests.A"), Some(true));
    assert_eq!(resolver.get_bool_silent("Tests.B"), None);
    assert_eq!(resolver.get_bool_silent("Tests.C"), None);
    assert_eq!(resolver.get_bool_silent("Tests.GetAsBoolSilent_False"), Some(false));
}

#[test]
fn test_well_known_file_outside_dev() {
    let checkout = Checkout::new();
    fs::write(checkout.root.join("work").join("Automation.config"), GLOBAL).unwrap();

    let resolver = ConfigResolver::new(checkout.options().with_dev_environment(false)).unwrap();
    assert_eq!(resolver.get("Tests.Both").unwrap(), "global-both");
    assert_eq!(resolver.get("Tests.A").unwrap(), "");
    assert_eq!(
        resolver.global_path().unwrap(),
        checkout.root.join("work").join("Automation.config")
    );
}

#[test]
fn test_missing_well_known_file_outside_dev() {
    let checkout = Checkout::new();
    let resolver = ConfigResolver::new(checkout.options()).unwrap();

    let result = resolver.initialize(InitializeOptions::production());
    assert!(matches!(result, Err(ConfigError::ConfigFileNotFound { .. })));
    assert!(!resolver.is_initialized());
}

#[test]
fn test_base_directory_out_of_reach() {
    let checkout = Checkout::new();
    let mut options = checkout.options();
    options.max_search_depth = 2;
    let resolver = ConfigResolver::new(options).unwrap();

    assert!(matches!(
        resolver.initialize(InitializeOptions::dev()),
        Err(ConfigError::DirectoryNotFound { .. })
    ));
}

#[test]
fn test_reinitialize_switches_environment() {
    let checkout = Checkout::new();
    let resolver = ConfigResolver::new(checkout.options().with_auto_initialize(false)).unwrap();

    resolver.initialize(InitializeOptions::dev()).unwrap();
    assert_eq!(resolver.get_connection_string("Main").unwrap(), "Server=localhost;Database=main");

    resolver
        .reinitialize(InitializeOptions::production().with_global_path(checkout.global_path()))
        .unwrap();
    assert_eq!(resolver.get_connection_string("Main").unwrap(), "Server=prod;Database=main");
    assert!(!resolver.in_dev_environment().unwrap());
}

#[test]
fn test_set_global_round_trip_on_disk() {
    let checkout = Checkout::new();
    let resolver = ConfigResolver::new(checkout.options()).unwrap();

    assert_eq!(resolver.set_global("Tests.New", "fresh").unwrap(), WriteOutcome::Appended);
    assert_eq!(resolver.get_string("Tests.New", None).unwrap(), "fresh");
    assert_eq!(
        resolver.set_global("Tests.GlobalOnly", "changed").unwrap(),
        WriteOutcome::Updated
    );
    assert_eq!(resolver.get_string("Tests.GlobalOnly", None).unwrap(), "changed");

    let on_disk = fs::read_to_string(checkout.global_path()).unwrap();
    assert!(on_disk.contains("Tests.New"));
    assert!(on_disk.contains("changed"));

    // The local file is never written
    assert_eq!(fs::read_to_string(checkout.local_path()).unwrap(), LOCAL);

    // A fresh resolver sees the persisted values
    let reloaded = ConfigResolver::new(checkout.options()).unwrap();
    assert_eq!(reloaded.get("Tests.New").unwrap(), "fresh");
    assert_eq!(reloaded.get_path("Logs").unwrap(), "/var/log/app");
}

#[test]
fn test_options_from_yaml_file() {
    let checkout = Checkout::new();
    let yaml_path = checkout.root.join("refigure.yaml");
    let yaml = format!(
        "dev_environment: false\nauto_initialize: true\nglobal_path: {:?}\n",
        checkout.global_path().display().to_string()
    );
    fs::write(&yaml_path, yaml).unwrap();

    let options = ResolverOptions::from_yaml_file(&yaml_path).unwrap();
    let resolver = ConfigResolver::new(options).unwrap();
    assert_eq!(resolver.get("Tests.Both").unwrap(), "global-both");
    assert_eq!(resolver.local_path().unwrap(), None);
}

fn memory_resolver(
    dev: bool,
    global: &str,
    local: &str,
) -> (Arc<InMemoryFileSystem>, ConfigResolver) {
    let fs = Arc::new(InMemoryFileSystem::new());
    fs.add_file("/cfg/global.config", global);
    fs.add_file("/cfg/local.config", local);
    let options = ResolverOptions::default()
        .with_dev_environment(dev)
        .with_global_path("/cfg/global.config")
        .with_local_path("/cfg/local.config");
    let resolver = ConfigResolver::with_file_system(options, fs.clone()).unwrap();
    (fs, resolver)
}

fn document(entries: &[(&str, &str)]) -> String {
    let mut xml = String::from("<configuration><appSettings>");
    for (key, value) in entries {
        xml.push_str(&format!("<add key=\"{}\" value=\"{}\"/>", key, value));
    }
    xml.push_str("</appSettings></configuration>");
    xml
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9._]{0,16}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9/_-]{1,16}"
}

proptest! {
    #[test]
    fn prop_absent_keys_are_empty_and_silent(key in key_strategy()) {
        let (_fs, resolver) = memory_resolver(true, &document(&[]), &document(&[]));
        prop_assert_eq!(resolver.get_string(&key, None).unwrap(), "");
        prop_assert_eq!(resolver.get_int_silent(&key), None);
        prop_assert_eq!(resolver.get_bool_silent(&key), None);
        prop_assert_eq!(resolver.get_date_time_silent(&key), None);
    }

    #[test]
    fn prop_global_only_falls_through_in_dev(key in key_strategy(), value in value_strategy()) {
        let global = document(&[(key.as_str(), value.as_str())]);
        let (_fs, resolver) = memory_resolver(true, &global, &document(&[]));
        prop_assert_eq!(resolver.get(&key).unwrap(), value);
    }

    #[test]
    fn prop_local_wins_in_dev(
        key in key_strategy(),
        local in value_strategy(),
        global in value_strategy(),
    ) {
        let global_doc = document(&[(key.as_str(), global.as_str())]);
        let local_doc = document(&[(key.as_str(), local.as_str())]);
        let (_fs, resolver) = memory_resolver(true, &global_doc, &local_doc);
        prop_assert_eq!(resolver.get(&key).unwrap(), local.clone());
        prop_assert_eq!(resolver.get_scoped(&key, &ScopePath::app_settings()).unwrap(), local);
    }

    #[test]
    fn prop_local_untouched_outside_dev(key in key_strategy(), value in value_strategy()) {
        let global = document(&[(key.as_str(), value.as_str())]);
        let local = document(&[(key.as_str(), "local")]);
        let (fs, resolver) = memory_resolver(false, &global, &local);
        prop_assert_eq!(resolver.get(&key).unwrap(), value);
        prop_assert_eq!(fs.read_count(Path::new("/cfg/local.config")), 0);
    }

    #[test]
    fn prop_set_global_round_trip(
        key in key_strategy(),
        initial in value_strategy(),
        value in value_strategy(),
        present in any::<bool>(),
    ) {
        let entries: Vec<(&str, &str)> = if present {
            vec![(key.as_str(), initial.as_str())]
        } else {
            vec![]
        };
        let (_fs, resolver) = memory_resolver(false, &document(&entries), &document(&[]));
        let expected = if present { WriteOutcome::Updated } else { WriteOutcome::Appended };
        prop_assert_eq!(resolver.set_global(&key, &value).unwrap(), expected);
        prop_assert_eq!(resolver.get_string(&key, None).unwrap(), value);
    }

    #[test]
    fn prop_initialize_twice_is_noop(key in key_strategy()) {
        let (fs, resolver) = memory_resolver(true, &document(&[]), &document(&[]));
        let init = InitializeOptions::dev()
            .with_global_path("/cfg/global.config")
            .with_local_path("/cfg/local.config");
        resolver.initialize(init.clone()).unwrap();
        resolver.initialize(init).unwrap();
        let _ = resolver.get(&key).unwrap();
        prop_assert_eq!(fs.read_count(Path::new("/cfg/global.config")), 1);
        prop_assert_eq!(fs.read_count(Path::new("/cfg/local.config")), 1);
    }
}
