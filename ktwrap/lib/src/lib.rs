//! Kotlin wrapper generation for a Java API library.
//!
//! The library's sources are parsed and indexed ([`source_index`]), the
//! classes a compiled jar would expose are reconstructed ([`catalog`]),
//! their setters grouped into properties ([`members`]) and Kotlin
//! declarations emitted ([`codegen`]) into files ([`kotlin`], [`output`]).
//! [`generate::Generator`] runs the whole pipeline for a [`config::Config`].
//!
//! ## Modules
//!
//! - [`java`] - Java parsing into an owned AST
//! - [`source_index`] - Multi-root type index and name resolution
//! - [`catalog`] - Class descriptors and candidate scanning
//! - [`type_mapper`] - Java to Kotlin type mapping
//! - [`members`] - Property groups, requiredness and overload combinations
//! - [`codegen`] - Builders, suspend wrappers, transcription and the client class
//! - [`kotlin`] - Kotlin source model and writer
//! - [`output`] - Atomic file writing
//! - [`config`] - `ktwrap.toml`
//! - [`error`] - Error types

pub mod catalog;
pub mod codegen;
pub mod config;
pub mod error;
pub mod generate;
pub mod java;
pub mod kotlin;
pub mod members;
pub mod output;
pub mod source_index;
pub mod type_mapper;

pub use catalog::{ClassDescriptor, ClasspathListing, TypeCatalog};
pub use config::Config;
pub use error::KtWrapError;
pub use generate::{FileReport, GenerationReport, Generator};
pub use members::{MemberModel, NonNullCache};
pub use source_index::SourceIndex;
pub use type_mapper::TypeMapper;
