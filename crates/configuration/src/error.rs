use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source (TOML file, in-memory document or `GETTYIO__*` variable) could
    /// not be read, or its values do not fit `Settings`.
    #[error("Failed to load settings from file, string or environment: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid setting: {0}")]
    ValidationError(String),
}
