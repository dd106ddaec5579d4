//! Human-readable summaries of a compilation run.

use std::fmt;

use super::types::models::{Histogram, PackStats, StandardizeSummary};

/// Histogram output is flushed to a new line once it grows past this width.
const HISTOGRAM_LINE_WIDTH: usize = 100;

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut line = String::new();
        for (length, count) in self.iter() {
            line.push_str(&format!("  [{:5}: {:2}]", length, count));
            if line.len() > HISTOGRAM_LINE_WIDTH {
                writeln!(f, "{}", line)?;
                line.clear();
            }
        }
        if !line.is_empty() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl fmt::Display for StandardizeSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "  {:<29}  {:<27}  {:>4}  {:>5}  {:>6}", "Input File", "Output File", "Dups", "Words", "Bytes")?;
        writeln!(
            f,
            "  {:<29}  {:<27}  {:>4}  {:>5}  {:>6}",
            "-".repeat(29),
            "-".repeat(27),
            "-".repeat(4),
            "-".repeat(5),
            "-".repeat(6)
        )?;

        let (mut dups, mut words, mut bytes) = (0, 0, 0);
        for row in &self.files {
            writeln!(
                f,
                "  {:<29}  {:<27}  {:>4}  {:>5}  {:>6}",
                row.origin, row.output, row.duplicates, row.words, row.bytes
            )?;
            dups += row.duplicates;
            words += row.words;
            bytes += row.bytes;
        }

        writeln!(
            f,
            "  {:<29}  {:<27}  {:>4}  {:>5}  {:>6}",
            "",
            "",
            "-".repeat(4),
            "-".repeat(5),
            "-".repeat(6)
        )?;
        writeln!(f, "  {:<29}  {:<27}  {:>4}  {:>5}  {:>6}", "", "", dups, words, bytes)?;
        write!(
            f,
            "Processed {} files, {} globally unique words ({} bytes).",
            self.files.len(),
            self.global_words,
            self.global_bytes
        )
    }
}

impl fmt::Display for PackStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Histogram of word bytestream lengths:")?;
        writeln!(f)?;
        write!(f, "{}", self.histogram)?;
        writeln!(f)?;
        write!(
            f,
            "{} words, {} duplicates dropped, {} data bytes, {} index bytes.",
            self.words, self.duplicates, self.data_bytes, self.index_bytes
        )
    }
}
