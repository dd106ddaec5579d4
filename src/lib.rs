//! # talkie-dict
//!
//! Compiles Talkie speech datastream declarations, as found in Arduino
//! sketches and C headers, into:
//!
//! - canonical C header text, one block per named datastream, and
//! - a binary dictionary: a data file with every datastream's bytes plus a
//!   text index of `name:length:offset` lines.
pub mod talkie;

// Re-export the main types for convenience
pub use talkie::{
    compile, order_sources, order_sources_by, CompileOutput, Compiler,
    extract::BlockExtractor,
    format::declaration::DeclarationParser,
    normalize::Normalizer,
    options::CompileOptions,
    pack::DictionaryPacker,
    types::error::{DeclarationFault, Result, TalkieError},
    types::models::{
        Declaration, DictionaryArtifact, FileSummary, Histogram, IndexRecord, NameRegistry,
        NormalizedFile, PackFailure, PackReport, PackStats, RawBlock, RawDeclaration, SourceFile,
        StandardizeSummary,
    },
};
