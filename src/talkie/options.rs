//! Tunable constants of the compilation pipeline.

use encoding_rs::Encoding;

use super::types::error::{Result, TalkieError};
use super::utils;

/// Settings shared by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Maximum number of byte literals per line of canonical output.
    pub wrap_width: usize,
    /// Storage qualifier ending a declarator. Lines containing it start
    /// (or are) declarations.
    pub storage_qualifier: String,
    /// Accepted element type keywords.
    pub type_keywords: Vec<String>,
    /// Prefix removed from identifiers to form registry names.
    pub name_prefix: String,
    /// Sources whose identifier contains this are packed first.
    pub first_marker: String,
    /// Sources whose identifier contains this are packed last.
    pub final_marker: String,
    /// Encoding label used to decode source bytes.
    pub encoding: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            wrap_width: 24,
            storage_qualifier: "PROGMEM".to_string(),
            type_keywords: vec!["byte".to_string(), "uint8_t".to_string()],
            name_prefix: "sp".to_string(),
            first_marker: "_us_".to_string(),
            final_marker: "_uk_".to_string(),
            encoding: "utf-8".to_string(),
        }
    }
}

impl CompileOptions {
    /// Checks option values that would make a stage misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.wrap_width == 0 {
            return Err(TalkieError::InvalidOption("wrap width must be at least 1".to_string()));
        }
        if self.storage_qualifier.trim().is_empty() || self.storage_qualifier.contains(char::is_whitespace) {
            return Err(TalkieError::InvalidOption(format!(
                "storage qualifier must be a single word, got {:?}",
                self.storage_qualifier
            )));
        }
        if self.type_keywords.is_empty() {
            return Err(TalkieError::InvalidOption("at least one type keyword is required".to_string()));
        }
        self.resolved_encoding()?;
        Ok(())
    }

    pub fn resolved_encoding(&self) -> Result<&'static Encoding> {
        utils::resolve_encoding(&self.encoding)
    }

    pub fn is_type_keyword(&self, word: &str) -> bool {
        self.type_keywords.iter().any(|k| k == word)
    }

    /// Registry name for an identifier: prefix removed (case-insensitively,
    /// when present) and lower-cased.
    pub fn registry_name(&self, identifier: &str) -> String {
        let prefix_len = self.name_prefix.len();
        let stripped = match identifier.get(..prefix_len) {
            Some(head) if prefix_len > 0 && head.eq_ignore_ascii_case(&self.name_prefix) => &identifier[prefix_len..],
            _ => identifier,
        };
        stripped.to_lowercase()
    }
}
