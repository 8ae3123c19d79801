use anyhow::{Context, Result};
use clap::Parser;
use refigure_config::{ConfigResolver, InitializeOptions, ResolverOptions, ScopePath};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands};

/// Initialize tracing on stderr so values printed on stdout stay clean
fn init_tracing(log_level: Option<&String>) {
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', falling back to 'warn'", level);
            EnvFilter::new("warn")
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // Use try_init to avoid panic if global subscriber already set
    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        debug!("Global tracing subscriber already initialized, skipping");
    }
}

fn load_options(path: Option<&PathBuf>) -> Result<ResolverOptions> {
    match path {
        Some(path) => ResolverOptions::from_yaml_file(path)
            .with_context(|| format!("Failed to load resolver options from {}", path.display())),
        None => Ok(ResolverOptions::default()),
    }
}

/// Initialization arguments: command-line flags override the options file
fn initialize_options(cli: &Cli, options: &ResolverOptions) -> InitializeOptions {
    let mut init = options.initialize_options();
    if cli.production {
        init.dev_environment = false;
    }
    if let Some(ref global) = cli.global {
        init.global_path = Some(global.clone());
    }
    if let Some(ref local) = cli.local {
        init.local_path = Some(local.clone());
    }
    init
}

fn parse_scope(scope: &str) -> Result<ScopePath> {
    ScopePath::parse(scope).with_context(|| format!("Invalid scope '{}'", scope))
}

#[derive(Serialize)]
struct Location {
    dev_environment: bool,
    global: PathBuf,
    local: Option<PathBuf>,
}

fn run(cli: &Cli, resolver: &ConfigResolver) -> Result<()> {
    match &cli.command {
        Commands::Get {
            key,
            scope,
            required,
        } => {
            let value = match scope {
                Some(scope) => {
                    let value = resolver.get_scoped(key, &parse_scope(scope)?)?;
                    match required {
                        Some(message) if value.is_empty() => anyhow::bail!("{}", message),
                        _ => value,
                    }
                }
                None => resolver.get_string(key, required.as_deref())?,
            };
            println!("{}", value);
        }
        Commands::GetInt { key } => println!("{}", resolver.get_int(key)?),
        Commands::GetBool { key } => println!("{}", resolver.get_bool(key)?),
        Commands::ConnectionString { key } => println!("{}", resolver.get_connection_string(key)?),
        Commands::Path { key } => println!("{}", resolver.get_path(key)?),
        Commands::Set { key, value, scope } => {
            let outcome = match scope {
                Some(scope) => resolver.set_global_scoped(key, value, &parse_scope(scope)?)?,
                None => resolver.set_global(key, value)?,
            };
            println!(
                "{:?} '{}' in {}",
                outcome,
                key,
                resolver.global_path()?.display()
            );
        }
        Commands::Locate { json } => {
            let location = Location {
                dev_environment: resolver.in_dev_environment()?,
                global: resolver.global_path()?,
                local: resolver.local_path()?,
            };
            if *json {
                println!("{}", serde_json::to_string_pretty(&location)?);
            } else {
                println!("dev environment: {}", location.dev_environment);
                println!("global: {}", location.global.display());
                match location.local {
                    Some(local) => println!("local:  {}", local.display()),
                    None => println!("local:  (not loaded)"),
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_ref());

    let options = load_options(cli.options.as_ref())?;
    let init = initialize_options(&cli, &options);
    let resolver = ConfigResolver::new(options).context("Invalid resolver options")?;
    resolver
        .initialize(init)
        .context("Failed to load configuration documents")?;

    run(&cli, &resolver)
}
