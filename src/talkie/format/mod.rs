//! Declaration text handling.
//!
//! # Module Organization
//!
//! - [`lexer`]: Splits declaration text into tokens
//! - [`declaration`]: Matches the token stream against the declaration grammar
//! - [`canonical`]: Renders declarations in canonical form
//!
//! ```text
//! "const byte spA[] PROGMEM = {0x0A,0x0B};"
//!        │ lexer::tokenize()
//!        ▼
//! [Word(const) Word(byte) Word(spA) [ ] Word(PROGMEM) = { ... } ;]
//!        │ DeclarationParser::parse()
//!        ▼
//! Declaration { identifier: "spA", name: "a", bytes: [0x0A, 0x0B] }
//!        │ canonical::render()
//!        ▼
//! "const byte spA [] PROGMEM = {\n  0x0A,0x0B\n};\n"
//! ```

pub mod canonical;
pub mod declaration;
pub mod lexer;
