//! Serialization of declarations into the binary dictionary.
//!
//! Output layout:
//!
//! ```text
//! data file:   bytes(a) ‖ bytes(b) ‖ bytes(c) ...      (no header, no padding)
//! index file:  a:<len(a)>:0\n
//!              b:<len(b)>:<len(a)>\n
//!              c:<len(c)>:<len(a)+len(b)>\n ...
//! ```
//!
//! Entries are ordered by ascending lower-cased name. Across all inputs the
//! first declaration of a name wins. An entry whose bytes fail to decode is
//! left out of both files and reported; packing continues.

use std::collections::btree_map::{BTreeMap, Entry};

use log::{info, warn};

use super::types::error::{Result, TalkieError};
use super::types::models::{IndexRecord, PackFailure, PackReport, RawDeclaration};

#[derive(Debug)]
struct PendingEntry {
    origin: String,
    declaration: RawDeclaration,
}

/// Collects declarations from every input and packs them once all are in.
#[derive(Debug, Default)]
pub struct DictionaryPacker {
    entries: BTreeMap<String, PendingEntry>,
    duplicates: usize,
}

impl DictionaryPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration read from `origin`.
    ///
    /// Returns `false` if a declaration with the same name (ignoring case)
    /// was already added; the new one is dropped.
    pub fn insert(&mut self, origin: &str, declaration: impl Into<RawDeclaration>) -> bool {
        let declaration = declaration.into();
        match self.entries.entry(declaration.name.to_lowercase()) {
            Entry::Occupied(existing) => {
                warn!(
                    "{}: {} already defined in {}; keeping the first",
                    origin,
                    declaration.identifier,
                    existing.get().origin
                );
                self.duplicates += 1;
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingEntry {
                    origin: origin.to_string(),
                    declaration,
                });
                true
            }
        }
    }

    /// Number of distinct names collected.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declarations dropped as duplicates so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Decode and serialize every collected declaration in name order.
    pub fn pack(self) -> PackReport {
        let mut report = PackReport::default();
        report.stats.duplicates = self.duplicates;

        for (name, entry) in self.entries {
            let offset = report.artifact.data.len();
            let outcome = entry
                .declaration
                .decode()
                .and_then(|decoded| index_record(&name, decoded.bytes.len(), offset).map(|r| (r, decoded.bytes)));

            match outcome {
                Ok((record, bytes)) => {
                    let line_len = record.to_string().len() + 1;
                    report.stats.words += 1;
                    report.stats.data_bytes += bytes.len() as u64;
                    report.stats.index_bytes += line_len as u64;
                    report.stats.histogram.record(bytes.len());
                    report.artifact.data.extend_from_slice(&bytes);
                    report.artifact.index.push(record);
                }
                Err(error) => {
                    warn!(
                        "{}: skipping {}: {} (tokens: {})",
                        entry.origin,
                        name,
                        error,
                        entry.declaration.tokens.join(",")
                    );
                    report.failures.push(PackFailure {
                        name,
                        origin: entry.origin,
                        tokens: entry.declaration.tokens,
                        error,
                    });
                }
            }
        }

        info!(
            "Packed {} words: {} data bytes, {} index bytes, {} skipped",
            report.stats.words,
            report.stats.data_bytes,
            report.stats.index_bytes,
            report.failures.len()
        );
        report
    }
}

fn index_record(name: &str, length: usize, offset: usize) -> Result<IndexRecord> {
    let overflow = || TalkieError::IndexOverflow { name: name.to_string() };
    let length = u32::try_from(length).map_err(|_| overflow())?;
    let offset = u32::try_from(offset).map_err(|_| overflow())?;
    Ok(IndexRecord {
        name: name.to_string(),
        length,
        offset,
    })
}

/// Pack declarations from a single anonymous input in one call.
pub fn pack<I, D>(declarations: I) -> PackReport
where
    I: IntoIterator<Item = D>,
    D: Into<RawDeclaration>,
{
    let mut packer = DictionaryPacker::new();
    for declaration in declarations {
        packer.insert("<input>", declaration);
    }
    packer.pack()
}
