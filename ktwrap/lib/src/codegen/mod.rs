//! Kotlin declaration emitters.
//!
//! ## Submodules
//!
//! - [`builders`] - Object builders and API-call extension functions
//! - [`suspend`] - Suspend wrappers over future-returning methods and the blocking bridge
//! - [`transcriber`] - Multipart template transcription
//! - [`client`] - The multipart client class hosting transcribed methods
//!
//! Every emitter returns [`FunSpec`](crate::kotlin::FunSpec)s or a
//! [`TypeSpec`](crate::kotlin::TypeSpec); file assembly and imports belong
//! to [`crate::generate`].

pub mod builders;
pub mod client;
pub mod suspend;
pub mod transcriber;

pub use builders::{BuilderEmitter, BuilderStyle};
pub use client::{ClientEmitter, ClientSettings};
pub use suspend::AsyncWrapperEmitter;
pub use transcriber::{StatementTranscriber, TranscriptionContext, Vocabulary};

/// `SendMessage` → `sendMessage`.
pub(crate) fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
