use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{CollectionSettings, DatabaseSettings, LogSettings, ServerSettings, Settings};

/// The file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `GETTYIO__DATABASE__HOST`.
pub const ENV_PREFIX: &str = "GETTYIO";

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file, then
/// `GETTYIO__*` environment variables. The default `config.toml` may be
/// absent; an explicitly requested file must exist.
pub fn load_config(path: Option<&Path>) -> Result<settings::Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Loads the configuration from an in-memory TOML document, without the
/// environment layer.
pub fn load_config_from_str(toml: &str) -> Result<settings::Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<settings::Settings, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<settings::Settings>()?;
    settings.validate()?;
    tracing::debug!(?settings, "Configuration loaded.");
    Ok(settings)
}
