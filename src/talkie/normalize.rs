//! Canonical re-emission of parsed declarations.
//!
//! Within one source the first declaration of a name wins; later ones are
//! counted and dropped. A global registry tracks names across every source
//! for reporting only: a name defined in two sources is still emitted into
//! both outputs.

use log::{debug, warn};

use super::format::canonical;
use super::options::CompileOptions;
use super::types::models::{Declaration, NameRegistry, NormalizedFile};

#[derive(Debug, Clone)]
pub struct Normalizer {
    qualifier: String,
    wrap_width: usize,
    global: NameRegistry,
    global_bytes: usize,
}

impl Normalizer {
    pub fn new(options: &CompileOptions) -> Self {
        Self {
            qualifier: options.storage_qualifier.clone(),
            wrap_width: options.wrap_width,
            global: NameRegistry::new(),
            global_bytes: 0,
        }
    }

    /// Normalize one source's declarations with a fresh per-file registry.
    pub fn normalize_file<I>(&mut self, origin: &str, declarations: I) -> NormalizedFile
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut registry = NameRegistry::new();
        self.normalize(origin, declarations, &mut registry)
    }

    /// Emit canonical text for every declaration whose name is not yet in
    /// `registry`, in arrival order.
    pub fn normalize<I>(&mut self, origin: &str, declarations: I, registry: &mut NameRegistry) -> NormalizedFile
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut file = NormalizedFile::default();

        for declaration in declarations {
            if !registry.insert_spelled(&declaration.name, &declaration.identifier) {
                warn!(
                    "{}: duplicate declaration {} dropped (first defined as {})",
                    origin,
                    declaration.identifier,
                    registry.first_spelling(&declaration.name).unwrap_or("?")
                );
                file.duplicates += 1;
                continue;
            }

            if self.global.insert(&declaration.name) {
                self.global_bytes += declaration.bytes.len();
            }

            file.words += 1;
            file.bytes += declaration.bytes.len();
            canonical::write_declaration(&mut file.text, &declaration, &self.qualifier, self.wrap_width);
            file.declarations.push(declaration);
        }

        debug!(
            "{}: {} words, {} bytes, {} duplicates",
            origin, file.words, file.bytes, file.duplicates
        );
        file
    }

    /// Names seen in any normalized source so far.
    pub fn global_words(&self) -> usize {
        self.global.len()
    }

    /// Bytes of the first occurrence of every globally unique name.
    pub fn global_bytes(&self) -> usize {
        self.global_bytes
    }
}
