//! `ktwrap.toml`.
//!
//! ```toml
//! source_roots = ["vendor/meta/src/main/java", "vendor/client/src/main/java"]
//! classpath_listing = "vendor/classes.txt"
//! output_dir = "src/main/kotlin"
//!
//! [[builders]]
//! file = "Objects"
//! package = "org.bots.objects"
//! namespace = "org.telegram.telegrambots.meta.api.objects"
//!
//! [[builders]]
//! file = "Methods"
//! package = "org.bots.methods"
//! namespace = "org.telegram.telegrambots.meta.api.methods"
//! base = "org.telegram.telegrambots.meta.api.methods.botapimethods.PartialBotApiMethod"
//! style = "api_call"
//! receiver = "org.telegram.telegrambots.meta.generics.TelegramClient"
//!
//! [[suspend_wrappers]]
//! file = "TelegramClientExtensions"
//! package = "org.bots.client"
//! source = "org.telegram.telegrambots.meta.generics.TelegramClient"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::codegen::{BuilderStyle, ClientSettings, Vocabulary};
use crate::error::KtWrapError;
use crate::kotlin::ClassName;

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_indent() -> usize {
    4
}

fn default_execute() -> String {
    "executeAsync".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Probed in order during name resolution.
    pub source_roots: Vec<PathBuf>,
    /// Compiled class entries (`a/b/C$D.class`) defining builder candidates.
    #[serde(default)]
    pub classpath_listing: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Spaces per indentation level in generated files.
    #[serde(default = "default_indent")]
    pub indent: usize,
    #[serde(default)]
    pub strict_transcription: bool,
    #[serde(default)]
    pub builders: Vec<BuilderTarget>,
    #[serde(default)]
    pub suspend_wrappers: Vec<SourceTarget>,
    #[serde(default)]
    pub blocking_bridges: Vec<SourceTarget>,
    #[serde(default)]
    pub multipart_client: Option<ClientTarget>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    #[default]
    Object,
    ApiCall,
}

/// One file of builder functions.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuilderTarget {
    pub file: String,
    pub package: String,
    /// Package prefix candidates must live under.
    pub namespace: String,
    /// FQN candidates must be assignable to.
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub style: StyleKind,
    /// FQN of the extension receiver, for `api_call`.
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default = "default_execute")]
    pub execute: String,
    /// Accept a file with no functions instead of failing.
    #[serde(default)]
    pub allow_empty: bool,
}

impl BuilderTarget {
    /// The emitter style. Validation guarantees `api_call` targets carry a
    /// receiver and a base.
    pub fn builder_style(&self) -> BuilderStyle {
        match (self.style, &self.receiver, &self.base) {
            (StyleKind::ApiCall, Some(receiver), Some(base)) => BuilderStyle::ApiCall {
                receiver: ClassName::best_guess(receiver),
                execute: self.execute.clone(),
                base: base.clone(),
            },
            _ => BuilderStyle::Object,
        }
    }
}

/// A file generated from one source type.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceTarget {
    pub file: String,
    pub package: String,
    /// FQN of the Java type to wrap.
    pub source: String,
    #[serde(default)]
    pub allow_empty: bool,
}

/// The multipart client file. Unset names keep the Telegram defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientTarget {
    pub file: String,
    pub package: String,
    pub source: String,
    /// Package of `Part`, `HttpExecutor` and the abstract base; defaults to
    /// `package`.
    #[serde(default)]
    pub core_package: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub base_class: Option<String>,
    #[serde(default)]
    pub api_method: Option<String>,
    #[serde(default)]
    pub telegram_url: Option<String>,
    #[serde(default)]
    pub remote_file: Option<String>,
    #[serde(default)]
    pub api_exception: Option<String>,
    #[serde(default)]
    pub multipart_builder: Option<String>,
    #[serde(default)]
    pub builder_var: Option<String>,
    #[serde(default)]
    pub ignored_calls: Option<Vec<String>>,
    #[serde(default)]
    pub ignored_types: Option<Vec<String>>,
}

impl ClientTarget {
    pub fn settings(&self, strict: bool) -> ClientSettings {
        let defaults = ClientSettings::default();
        let core_package = self.core_package.clone().unwrap_or_else(|| self.package.clone());
        let vocabulary = Vocabulary {
            part_package: core_package.clone(),
            ignored_calls: self
                .ignored_calls
                .clone()
                .unwrap_or(defaults.vocabulary.ignored_calls),
            ignored_types: self
                .ignored_types
                .clone()
                .unwrap_or(defaults.vocabulary.ignored_types),
            ..defaults.vocabulary
        };
        ClientSettings {
            name: self.file.clone(),
            source: self.source.clone(),
            template: self.template.clone().unwrap_or(defaults.template),
            core_package,
            base_class: self.base_class.clone().unwrap_or(defaults.base_class),
            api_method: self.api_method.clone().unwrap_or(defaults.api_method),
            telegram_url: self.telegram_url.clone().unwrap_or(defaults.telegram_url),
            remote_file: self.remote_file.clone().unwrap_or(defaults.remote_file),
            api_exception: self.api_exception.clone().unwrap_or(defaults.api_exception),
            multipart_builder: self
                .multipart_builder
                .clone()
                .unwrap_or(defaults.multipart_builder),
            builder_var: self.builder_var.clone().unwrap_or(defaults.builder_var),
            vocabulary,
            strict,
        }
    }
}

impl Config {
    /// Reads and validates a config file.
    ///
    /// ## Errors
    /// Returns [`KtWrapError::Io`] if the file cannot be read,
    /// [`KtWrapError::Config`] if it is not valid TOML for this schema and
    /// [`KtWrapError::ConfigError`] if it fails validation.
    pub fn load(path: &Path) -> Result<Self, KtWrapError> {
        let text = fs::read_to_string(path).map_err(|e| KtWrapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut config: Config = toml::from_str(&text).map_err(|e| KtWrapError::Config {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { base.join(p) };
        self.source_roots = self.source_roots.iter().map(|r| resolve(r.as_path())).collect();
        self.classpath_listing = self.classpath_listing.as_deref().map(resolve);
        self.output_dir = resolve(self.output_dir.as_path());
    }

    /// Checks constraints serde cannot express.
    ///
    /// ## Errors
    /// Returns [`KtWrapError::ConfigError`] naming the first violation.
    pub fn validate(&self) -> Result<(), KtWrapError> {
        if self.source_roots.is_empty() {
            return Err(KtWrapError::ConfigError("`source_roots` must not be empty".to_string()));
        }
        if self.indent == 0 {
            return Err(KtWrapError::ConfigError("`indent` must be at least 1".to_string()));
        }
        for target in &self.builders {
            if target.style == StyleKind::ApiCall && (target.receiver.is_none() || target.base.is_none()) {
                return Err(KtWrapError::ConfigError(format!(
                    "builder target `{}` uses `api_call` and needs both `receiver` and `base`",
                    target.file
                )));
            }
        }

        let mut files: Vec<(&str, &str)> = self
            .builders
            .iter()
            .map(|t| (t.package.as_str(), t.file.as_str()))
            .chain(self.suspend_wrappers.iter().map(|t| (t.package.as_str(), t.file.as_str())))
            .chain(self.blocking_bridges.iter().map(|t| (t.package.as_str(), t.file.as_str())))
            .chain(self.multipart_client.iter().map(|t| (t.package.as_str(), t.file.as_str())))
            .collect();
        files.sort_unstable();
        if let Some(pair) = files.windows(2).find(|w| w[0] == w[1]) {
            return Err(KtWrapError::ConfigError(format!(
                "file `{}.{}` is produced by more than one target",
                pair[0].0, pair[0].1
            )));
        }
        Ok(())
    }

    /// Names of every configured output file, in generation order.
    pub fn target_files(&self) -> Vec<&str> {
        self.builders
            .iter()
            .map(|t| t.file.as_str())
            .chain(self.suspend_wrappers.iter().map(|t| t.file.as_str()))
            .chain(self.blocking_bridges.iter().map(|t| t.file.as_str()))
            .chain(self.multipart_client.iter().map(|t| t.file.as_str()))
            .collect()
    }
}
