//! The datastream compilation pipeline.
//!
//! ```text
//! source text ──► extract::BlockExtractor ──► format::declaration ──► normalize::Normalizer ──► canonical text
//!                                                        │
//!                                                        └──────────► pack::DictionaryPacker ──► data + index
//! ```

pub mod extract;
pub mod format;
pub mod normalize;
pub mod options;
pub mod output;
pub mod pack;
pub mod report;
pub mod types;
pub mod utils;

use log::info;

use extract::BlockExtractor;
use format::declaration::DeclarationParser;
use normalize::Normalizer;
use options::CompileOptions;
use pack::DictionaryPacker;
pub use types::error::{DeclarationFault, Result, TalkieError};
use types::models::*;

/// Drives sources through every stage of the pipeline.
///
/// Extraction and parse failures are returned to the caller and leave the
/// compiler unchanged for that source; packing never fails.
#[derive(Debug)]
pub struct Compiler {
    options: CompileOptions,
    normalizer: Normalizer,
    packer: DictionaryPacker,
    files: Vec<FileSummary>,
}

impl Compiler {
    /// # Errors
    /// Returns `InvalidOption` if `options` does not validate.
    pub fn new(options: CompileOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            normalizer: Normalizer::new(&options),
            packer: DictionaryPacker::new(),
            files: Vec::new(),
            options,
        })
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Decode raw source bytes using the configured encoding.
    pub fn decode_source(&self, bytes: &[u8]) -> Result<String> {
        Ok(utils::decode_source(bytes, self.options.resolved_encoding()?))
    }

    /// Extract and strictly parse every declaration of a source.
    pub fn parse_source(&self, origin: &str, text: &str) -> Result<Vec<Declaration>> {
        let parser = DeclarationParser::new(&self.options);
        BlockExtractor::new(origin, text, &self.options)
            .map(|block| {
                let block = block?;
                parser.parse(&block.text).map_err(|e| e.at(origin, block.line))
            })
            .collect()
    }

    /// Parse a source and render its canonical form.
    ///
    /// `output` names the destination in the summary table.
    pub fn standardize(&mut self, origin: &str, output: &str, text: &str) -> Result<NormalizedFile> {
        let declarations = self.parse_source(origin, text)?;
        let file = self.normalizer.normalize_file(origin, declarations);
        info!(
            "Standardized {}: {} words, {} bytes, {} duplicates",
            origin, file.words, file.bytes, file.duplicates
        );
        self.files.push(FileSummary {
            origin: origin.to_string(),
            output: output.to_string(),
            duplicates: file.duplicates,
            words: file.words,
            bytes: file.bytes,
        });
        Ok(file)
    }

    /// Hand a normalized source's declarations to the packer.
    pub fn forward(&mut self, origin: &str, file: &NormalizedFile) {
        for declaration in &file.declarations {
            self.packer.insert(origin, declaration.clone());
        }
    }

    /// Load a canonical source straight into the packer.
    ///
    /// Byte tokens are not validated here; undecodable entries are reported
    /// by [`Compiler::finish`] instead. Returns the number of declarations read.
    pub fn load_canonical(&mut self, origin: &str, text: &str) -> Result<usize> {
        let parser = DeclarationParser::new(&self.options);
        let declarations = BlockExtractor::new(origin, text, &self.options)
            .map(|block| {
                let block = block?;
                parser.parse_raw(&block.text).map_err(|e| e.at(origin, block.line))
            })
            .collect::<Result<Vec<_>>>()?;

        let count = declarations.len();
        for declaration in declarations {
            self.packer.insert(origin, declaration);
        }
        info!("Loaded {} words from {}", count, origin);
        Ok(count)
    }

    /// Summary rows for every source standardized so far.
    pub fn standardize_summary(&self) -> StandardizeSummary {
        StandardizeSummary {
            files: self.files.clone(),
            global_words: self.normalizer.global_words(),
            global_bytes: self.normalizer.global_bytes(),
        }
    }

    /// Pack everything collected.
    pub fn finish(self) -> PackReport {
        self.packer.pack()
    }
}

/// Reorder sources for packing: identifiers containing the first marker,
/// then the rest, then those containing the final marker.
///
/// Relative order inside each group is preserved. Since the packer keeps the
/// first declaration of a name, this decides which variant of a shared word
/// ends up in the dictionary.
pub fn order_sources<T: AsRef<str>>(sources: Vec<T>, options: &CompileOptions) -> Vec<T> {
    order_sources_by(sources, options, |source| source.as_ref())
}

/// [`order_sources`] for items whose identifier is extracted by `key`.
pub fn order_sources_by<T, F>(sources: Vec<T>, options: &CompileOptions, key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let (mut first, mut middle, mut last) = (Vec::new(), Vec::new(), Vec::new());
    for source in sources {
        let id = key(&source);
        if !options.first_marker.is_empty() && id.contains(options.first_marker.as_str()) {
            first.push(source);
        } else if !options.final_marker.is_empty() && id.contains(options.final_marker.as_str()) {
            last.push(source);
        } else {
            middle.push(source);
        }
    }
    first.append(&mut middle);
    first.append(&mut last);
    first
}

/// Everything produced by [`compile`].
#[derive(Debug)]
pub struct CompileOutput {
    /// Canonical output per source, in input order.
    pub files: Vec<(String, NormalizedFile)>,
    pub summary: StandardizeSummary,
    pub report: PackReport,
}

/// Run the whole pipeline over in-memory sources.
///
/// Sources are standardized in the given order and packed in
/// [`order_sources`] order. The first extraction or parse error aborts the run.
pub fn compile(sources: &[SourceFile], options: CompileOptions) -> Result<CompileOutput> {
    let mut compiler = Compiler::new(options)?;

    let mut files = Vec::with_capacity(sources.len());
    for source in sources {
        let file = compiler.standardize(&source.origin, &source.origin, &source.text)?;
        files.push((source.origin.clone(), file));
    }

    let pack_order = order_sources_by(files.iter().collect(), compiler.options(), |(origin, _)| origin.as_str());
    for (origin, file) in pack_order {
        compiler.forward(origin, file);
    }

    let summary = compiler.standardize_summary();
    Ok(CompileOutput {
        files,
        summary,
        report: compiler.finish(),
    })
}
