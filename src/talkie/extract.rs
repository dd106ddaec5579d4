//! Recovery of complete declarations from loosely formatted source text.
//!
//! Sources wrap declarations over many lines, comment some of them out and
//! mix in unrelated code. [`BlockExtractor`] walks the lines once and yields
//! every declaration it can reassemble as a single [`RawBlock`].
//!
//! Line classification, applied to each trimmed line:
//!
//! ```text
//! ""                          skipped
//! "// ... PROGMEM ..."        comment marker removed, remainder re-classified
//! "// ..."                    skipped
//! "... PROGMEM ... };"        complete declaration on one line
//! "... PROGMEM ..."           starts a declaration (replaces any partial one)
//! "0x.. };"                   appended, declaration complete
//! "0x.."                      appended
//! "};"                        appended, declaration complete (canonical form)
//! anything else               skipped
//! ```

use std::iter::Enumerate;
use std::str::Lines;

use log::{debug, trace, warn};

use super::options::CompileOptions;
use super::types::error::{Result, TalkieError};
use super::types::models::RawBlock;

const LINE_COMMENT: &str = "//";
const HEX_PREFIX: &str = "0x";
const CLOSING: &str = "};";

/// Extractor state between lines.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExtractState {
    Idle,
    /// A declaration has started but its closing token has not been seen.
    Accumulating { text: String, line: usize },
}

/// Iterator over the declarations found in one source.
///
/// Yields `Result<RawBlock>`. The only error is byte data outside of any
/// declaration; it ends the iteration and rejects the source as a whole.
/// Declarations left open, whether cut off by a new start line or by the end
/// of input, are discarded with a warning.
pub struct BlockExtractor<'a> {
    origin: &'a str,
    marker: &'a str,
    lines: Enumerate<Lines<'a>>,
    state: ExtractState,
    finished: bool,
}

impl<'a> BlockExtractor<'a> {
    pub fn new(origin: &'a str, text: &'a str, options: &'a CompileOptions) -> Self {
        Self {
            origin,
            marker: &options.storage_qualifier,
            lines: text.lines().enumerate(),
            state: ExtractState::Idle,
            finished: false,
        }
    }

    /// Advance the state machine by one trimmed line.
    fn step(&self, state: ExtractState, line: &str, line_no: usize) -> Result<(ExtractState, Option<RawBlock>)> {
        if line.is_empty() {
            return Ok((state, None));
        }

        if let Some(uncommented) = line.strip_prefix(LINE_COMMENT) {
            if line.contains(self.marker) {
                trace!("{}:{}: re-reading commented declaration", self.origin, line_no);
                return self.step(state, uncommented.trim(), line_no);
            }
            return Ok((state, None));
        }

        if line.contains(self.marker) {
            if line.ends_with(CLOSING) {
                let block = RawBlock { text: line.to_string(), line: line_no };
                return Ok((state, Some(block)));
            }
            if let ExtractState::Accumulating { line: open_line, .. } = &state {
                warn!(
                    "{}:{}: declaration opened at line {} was never closed; discarding it",
                    self.origin, line_no, open_line
                );
            }
            debug!("{}:{}: declaration started", self.origin, line_no);
            return Ok((ExtractState::Accumulating { text: line.to_string(), line: line_no }, None));
        }

        let is_continuation = line.starts_with(HEX_PREFIX);
        let is_bare_close = line == CLOSING;
        if !is_continuation && !is_bare_close {
            return Ok((state, None));
        }

        match state {
            ExtractState::Accumulating { mut text, line: open_line } => {
                text.push(' ');
                text.push_str(line);
                if line.ends_with(CLOSING) {
                    Ok((ExtractState::Idle, Some(RawBlock { text, line: open_line })))
                } else {
                    Ok((ExtractState::Accumulating { text, line: open_line }, None))
                }
            }
            ExtractState::Idle if is_continuation => Err(TalkieError::MalformedInput {
                origin: self.origin.to_string(),
                line: line_no,
                reason: "byte data outside of any declaration".to_string(),
            }),
            ExtractState::Idle => Ok((ExtractState::Idle, None)),
        }
    }
}

impl<'a> Iterator for BlockExtractor<'a> {
    type Item = Result<RawBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while let Some((index, raw_line)) = self.lines.next() {
            let state = std::mem::replace(&mut self.state, ExtractState::Idle);
            match self.step(state, raw_line.trim(), index + 1) {
                Ok((next_state, emitted)) => {
                    self.state = next_state;
                    if emitted.is_some() {
                        return emitted.map(Ok);
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }

        self.finished = true;
        if let ExtractState::Accumulating { line, .. } = std::mem::replace(&mut self.state, ExtractState::Idle) {
            warn!(
                "{}:{}: declaration is never closed before end of input; discarding it",
                self.origin, line
            );
        }
        None
    }
}

/// Collect every declaration block of a source, failing on the first error.
pub fn extract_blocks(origin: &str, text: &str, options: &CompileOptions) -> Result<Vec<RawBlock>> {
    BlockExtractor::new(origin, text, options).collect()
}
