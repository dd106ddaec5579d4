//! Core data structures for the datastream compilation pipeline.
//!
//! This module defines the values that flow between the stages:
//! - Raw declaration blocks recovered from source text
//! - Parsed declarations (strict and lenient forms)
//! - Name registries used for first-occurrence deduplication
//! - Index records and the final dictionary artifact

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::error::{Result, TalkieError};
use crate::talkie::utils;

/// One input handed to the pipeline by the driver.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Identifier used in diagnostics and summaries (usually a path).
    pub origin: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }
}

/// A complete declaration reassembled by the block extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// The declaration text with its source lines joined.
    pub text: String,
    /// 1-based line on which the declaration started.
    pub line: usize,
}

/// A named speech datastream with decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The identifier as written in the source, e.g. `spFAILURE`.
    pub identifier: String,
    /// Registry key: identifier without its prefix, lower-cased, e.g. `failure`.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A declaration whose grammar has been validated but whose byte tokens
/// are still raw text.
///
/// The packer works on this form so that it can skip entries whose tokens
/// fail to decode instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeclaration {
    pub identifier: String,
    pub name: String,
    pub tokens: Vec<String>,
}

impl RawDeclaration {
    /// Decode every token to a byte. The first token that is not a hex
    /// byte literal fails the whole declaration.
    pub fn decode(&self) -> Result<Declaration> {
        let bytes = self
            .tokens
            .iter()
            .map(|token| {
                utils::decode_hex_byte(token).ok_or_else(|| TalkieError::MalformedByteToken {
                    name: self.name.clone(),
                    token: token.clone(),
                })
            })
            .collect::<Result<Vec<u8>>>()?;

        Ok(Declaration {
            identifier: self.identifier.clone(),
            name: self.name.clone(),
            bytes,
        })
    }
}

impl From<Declaration> for RawDeclaration {
    fn from(declaration: Declaration) -> Self {
        let tokens = declaration
            .bytes
            .iter()
            .map(|b| format!("0x{:02X}", b))
            .collect();
        Self {
            identifier: declaration.identifier,
            name: declaration.name,
            tokens,
        }
    }
}

/// A set of seen names for first-occurrence deduplication.
///
/// Membership is case-insensitive. The spelling under which a name was first
/// registered is kept for diagnostics.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    seen: HashMap<String, String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`. Returns `false` if it was already present or empty.
    pub fn insert(&mut self, name: &str) -> bool {
        self.insert_spelled(name, name)
    }

    /// Registers `name`, remembering `spelling` as the form to report.
    pub fn insert_spelled(&mut self, name: &str, spelling: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let key = name.to_lowercase();
        if self.seen.contains_key(&key) {
            return false;
        }
        self.seen.insert(key, spelling.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains_key(&name.to_lowercase())
    }

    /// The spelling `name` was first registered under, if any.
    pub fn first_spelling(&self, name: &str) -> Option<&str> {
        self.seen.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// One line of the dictionary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub name: String,
    pub length: u32,
    /// Byte offset of this entry in the data blob.
    pub offset: u32,
}

impl fmt::Display for IndexRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.length, self.offset)
    }
}

/// The packed dictionary: a data blob plus the index describing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryArtifact {
    pub data: Vec<u8>,
    pub index: Vec<IndexRecord>,
}

impl DictionaryArtifact {
    /// Renders the index file contents, one `name:length:offset\n` line per entry.
    pub fn index_text(&self) -> String {
        self.index.iter().map(|record| format!("{}\n", record)).collect()
    }
}

/// Count of datastreams per byte length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    buckets: BTreeMap<usize, usize>,
}

impl Histogram {
    pub fn record(&mut self, length: usize) {
        *self.buckets.entry(length).or_insert(0) += 1;
    }

    pub fn count(&self, length: usize) -> usize {
        self.buckets.get(&length).copied().unwrap_or(0)
    }

    /// `(length, count)` pairs in ascending length order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.buckets.iter().map(|(len, count)| (*len, *count))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Totals accumulated while packing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackStats {
    /// Declarations written to the dictionary.
    pub words: usize,
    /// Declarations dropped because their name was already registered.
    pub duplicates: usize,
    pub data_bytes: u64,
    pub index_bytes: u64,
    pub histogram: Histogram,
}

/// A declaration the packer left out, with enough context to fix the input.
#[derive(Debug)]
pub struct PackFailure {
    pub name: String,
    pub origin: String,
    pub tokens: Vec<String>,
    pub error: TalkieError,
}

/// Everything produced by a packing run.
#[derive(Debug, Default)]
pub struct PackReport {
    pub artifact: DictionaryArtifact,
    pub stats: PackStats,
    pub failures: Vec<PackFailure>,
}

/// Canonical output and counters for one normalized source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedFile {
    pub text: String,
    /// Declarations dropped because their name already appeared in this file.
    pub duplicates: usize,
    pub words: usize,
    pub bytes: usize,
    /// The retained declarations, in arrival order.
    pub declarations: Vec<Declaration>,
}

/// One row of the standardize summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub origin: String,
    pub output: String,
    pub duplicates: usize,
    pub words: usize,
    pub bytes: usize,
}

/// Per-file rows plus cross-file totals for a standardize run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardizeSummary {
    pub files: Vec<FileSummary>,
    /// Names seen in any file, counted once.
    pub global_words: usize,
    /// Bytes of the first occurrence of each globally unique name.
    pub global_bytes: usize,
}
