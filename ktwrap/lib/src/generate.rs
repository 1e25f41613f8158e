//! The generation pipeline: index sources, run every configured target,
//! write the files.

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::catalog::{ClasspathListing, TypeCatalog};
use crate::codegen::{AsyncWrapperEmitter, BuilderEmitter, BuilderStyle, ClientEmitter};
use crate::config::{BuilderTarget, ClientTarget, Config, SourceTarget};
use crate::error::KtWrapError;
use crate::kotlin::KotlinFile;
use crate::members::{MemberModel, NonNullCache};
use crate::output;
use crate::source_index::SourceIndex;
use crate::type_mapper::TypeMapper;

const HEADER: &str = "This code was automatically generated by ktwrap. Do not edit manually.";
const SUPPRESS: &[&str] = &["unused", "RedundantVisibilityModifier", "DEPRECATION"];
const AWAIT: &str = "kotlinx.coroutines.future.await";

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// The target's `file` name.
    pub target: String,
    pub path: PathBuf,
    /// Top-level functions, or member functions for class targets.
    pub declarations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub files: Vec<FileReport>,
    pub dry_run: bool,
}

impl GenerationReport {
    pub fn total_declarations(&self) -> usize {
        self.files.iter().map(|f| f.declarations).sum()
    }
}

/// Shared state for one run.
struct Session<'c> {
    config: &'c Config,
    index: SourceIndex,
    listing: Option<ClasspathListing>,
    mapper: TypeMapper,
    cache: NonNullCache,
}

#[derive(Debug, Clone, Default)]
pub struct Generator {
    dry_run: bool,
    only: Option<String>,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print files instead of writing them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run only the target producing this file.
    pub fn only(mut self, file: Option<String>) -> Self {
        self.only = file;
        self
    }

    /// Runs every selected target of `config`.
    ///
    /// ## Errors
    /// Returns [`KtWrapError::ConfigError`] for an unknown `only` target,
    /// [`KtWrapError::NoDeclarations`] when a target that must produce
    /// output produces none, and propagates indexing, emission and write
    /// failures.
    #[instrument(skip_all, fields(dry_run = self.dry_run))]
    pub fn run(&self, config: &Config) -> Result<GenerationReport, KtWrapError> {
        if let Some(only) = &self.only
            && !config.target_files().contains(&only.as_str())
        {
            return Err(KtWrapError::ConfigError(format!("no target produces file `{only}`")));
        }

        let session = Session {
            config,
            index: SourceIndex::load(&config.source_roots)?,
            listing: config
                .classpath_listing
                .as_deref()
                .map(ClasspathListing::load)
                .transpose()?,
            mapper: TypeMapper::new(),
            cache: NonNullCache::new(),
        };

        let mut generated = Vec::new();
        for target in config.builders.iter().filter(|t| self.selected(&t.file)) {
            generated.push(session.builders(target)?);
        }
        for target in config.suspend_wrappers.iter().filter(|t| self.selected(&t.file)) {
            generated.push(session.suspend_wrappers(target)?);
        }
        for target in config.blocking_bridges.iter().filter(|t| self.selected(&t.file)) {
            generated.push(session.blocking_bridge(target)?);
        }
        if let Some(target) = config.multipart_client.as_ref().filter(|t| self.selected(&t.file)) {
            generated.push(session.client(target)?);
        }

        let (files, counts): (Vec<KotlinFile>, Vec<usize>) = generated.into_iter().unzip();
        let paths = output::write_files(&files, &config.output_dir, self.dry_run)?;
        let report = GenerationReport {
            files: files
                .iter()
                .zip(paths)
                .zip(counts)
                .map(|((file, path), declarations)| FileReport {
                    target: file.name.clone(),
                    path,
                    declarations,
                })
                .collect(),
            dry_run: self.dry_run,
        };
        info!(
            files = report.files.len(),
            declarations = report.total_declarations(),
            "Generation finished"
        );
        Ok(report)
    }

    fn selected(&self, file: &str) -> bool {
        self.only.as_deref().is_none_or(|only| only == file)
    }
}

impl Session<'_> {
    fn new_file(&self, package: &str, name: &str) -> KotlinFile {
        let mut file = KotlinFile::new(package, name);
        file.header = Some(HEADER.to_string());
        file.suppress = SUPPRESS.iter().map(|s| s.to_string()).collect();
        file.indent = " ".repeat(self.config.indent);
        file
    }

    fn builders(&self, target: &BuilderTarget) -> Result<(KotlinFile, usize), KtWrapError> {
        let classes = TypeCatalog::scan(
            &self.index,
            self.listing.as_ref(),
            &target.namespace,
            target.base.as_deref(),
        )?;
        let style = target.builder_style();
        let emitter = BuilderEmitter::new(&self.mapper);

        let mut file = self.new_file(&target.package, &target.file);
        let mut count = 0;
        for class in &classes {
            let model = MemberModel::build(class, &self.mapper, &self.cache);
            for function in emitter.emit(class, &model, &style) {
                file.add_function(function);
                count += 1;
            }
        }
        if matches!(style, BuilderStyle::ApiCall { .. }) {
            file.add_member_import(AWAIT);
        }
        ensure_output(&target.file, count, target.allow_empty)?;
        info!(target = %target.file, classes = classes.len(), functions = count, "Generated builders");
        Ok((file, count))
    }

    fn suspend_wrappers(&self, target: &SourceTarget) -> Result<(KotlinFile, usize), KtWrapError> {
        let functions = AsyncWrapperEmitter::new(&self.index, &self.mapper).suspend_wrappers(&target.source)?;
        let count = functions.len();
        ensure_output(&target.file, count, target.allow_empty)?;

        let mut file = self.new_file(&target.package, &target.file);
        file.add_member_import(AWAIT);
        for function in functions {
            file.add_function(function);
        }
        info!(target = %target.file, source = %target.source, functions = count, "Generated suspend wrappers");
        Ok((file, count))
    }

    fn blocking_bridge(&self, target: &SourceTarget) -> Result<(KotlinFile, usize), KtWrapError> {
        let bridge = AsyncWrapperEmitter::new(&self.index, &self.mapper).blocking_bridge(&target.source)?;
        let count = bridge.functions.len();
        ensure_output(&target.file, count, target.allow_empty)?;

        let mut file = self.new_file(&target.package, &target.file);
        file.add_type(bridge);
        info!(target = %target.file, source = %target.source, functions = count, "Generated blocking bridge");
        Ok((file, count))
    }

    fn client(&self, target: &ClientTarget) -> Result<(KotlinFile, usize), KtWrapError> {
        let settings = target.settings(self.config.strict_transcription);
        let client = ClientEmitter::new(&self.index, &self.mapper, &self.cache).emit(&settings)?;
        let count = client.functions.len();

        let mut file = self.new_file(&target.package, &target.file);
        file.add_type(client);
        info!(target = %target.file, source = %target.source, functions = count, "Generated multipart client");
        Ok((file, count))
    }
}

fn ensure_output(target: &str, count: usize, allow_empty: bool) -> Result<(), KtWrapError> {
    if count == 0 && !allow_empty {
        return Err(KtWrapError::NoDeclarations {
            target: target.to_string(),
        });
    }
    Ok(())
}
