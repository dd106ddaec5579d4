//! Canonical textual form of a declaration.
//!
//! ```text
//! const byte spFAILURE [] PROGMEM = {
//!   0x0C,0x4D,...,0x11,
//!   0x2A
//! };
//! ```

use crate::talkie::types::models::Declaration;

/// Element type written in canonical output regardless of the input keyword.
pub const CANONICAL_TYPE: &str = "byte";

/// Render one declaration, wrapping the byte list at `wrap_width` items per line.
pub fn render(declaration: &Declaration, qualifier: &str, wrap_width: usize) -> String {
    let mut out = String::new();
    write_declaration(&mut out, declaration, qualifier, wrap_width);
    out
}

/// Append the canonical form of `declaration` to `out`.
pub fn write_declaration(out: &mut String, declaration: &Declaration, qualifier: &str, wrap_width: usize) {
    out.push_str(&format!(
        "const {} {} [] {} = {{\n",
        CANONICAL_TYPE, declaration.identifier, qualifier
    ));

    let chunks: Vec<&[u8]> = declaration.bytes.chunks(wrap_width.max(1)).collect();
    for (i, chunk) in chunks.iter().enumerate() {
        let line = chunk
            .iter()
            .map(|b| format!("0x{:02X}", b))
            .collect::<Vec<_>>()
            .join(",");
        let separator = if i + 1 < chunks.len() { "," } else { "" };
        out.push_str(&format!("  {}{}\n", line, separator));
    }

    out.push_str("};\n");
}
