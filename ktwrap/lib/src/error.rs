use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by ktwrap operations.
#[derive(Debug, Error)]
pub enum KtWrapError {
    #[error("Failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file `{path}`: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load the Java grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("Failed to parse `{path}`")]
    ParseFailed { path: PathBuf },

    #[error("Invalid configuration in `{path}`: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Source root `{path}` does not exist")]
    MissingSourceRoot { path: PathBuf },

    /// A primitive keyword outside the fixed mapping table.
    #[error("Unrecognized primitive type `{name}`")]
    UnknownPrimitive { name: String },

    #[error("Type `{fqn}` was not found in any source root")]
    TypeNotFound { fqn: String },

    #[error("Template method `{method}` was not found on `{class}`")]
    TemplateNotFound { class: String, method: String },

    /// Raised only when strict transcription is enabled.
    #[error("Cannot transcribe {kind} statement in `{method}`: {text}")]
    UntranscribableStatement {
        method: String,
        kind: String,
        text: String,
    },

    #[error("No declarations were generated for `{target}`")]
    NoDeclarations { target: String },
}
