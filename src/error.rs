use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration option {key}={value} (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("No config section owns key '{0}'")]
    SectionNotFound(String),

    #[error("Config file update failed validation and was rolled back: {source}")]
    PersistFailed {
        #[source]
        source: Box<ConfigError>,
    },

    #[error("Computed defaults form a dependency cycle involving '{0}'")]
    DependencyCycle(String),

    #[error("Malformed config file line {line}: {text}")]
    IniParse { line: usize, text: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
