//! Grammar matching for a single reassembled declaration.
//!
//! Accepted shape, over the token stream produced by [`lexer::tokenize`]:
//!
//! ```text
//! [const] <type> <identifier> [] [<qualifier>] = { 0xHH, 0xHH, ... [,] } ;
//! ```
//!
//! `spNAME[]` and `spNAME []` tokenize identically, so both spellings of the
//! array suffix are accepted.

use log::trace;

use super::lexer::{self, Token};
use crate::talkie::options::CompileOptions;
use crate::talkie::types::error::{DeclarationFault, Result, TalkieError};
use crate::talkie::types::models::{Declaration, RawDeclaration};
use crate::talkie::utils;

const CONST_KEYWORD: &str = "const";

/// Parses declaration strings using the configured keywords and prefix.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationParser<'a> {
    options: &'a CompileOptions,
}

impl<'a> DeclarationParser<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Self { options }
    }

    /// Parse a declaration and decode its bytes.
    ///
    /// # Errors
    /// - `MalformedDeclaration` if the grammar is violated
    /// - `MalformedByteToken` if any byte is not a `0xH`/`0xHH` literal
    pub fn parse(&self, raw: &str) -> Result<Declaration> {
        let declaration = self.parse_raw(raw)?;
        if let Some(bad) = declaration.tokens.iter().find(|t| !utils::is_byte_literal(t)) {
            return Err(TalkieError::MalformedByteToken {
                name: declaration.name.clone(),
                token: bad.clone(),
            });
        }
        declaration.decode()
    }

    /// Parse a declaration, validating its structure but leaving byte
    /// tokens undecoded. Malformed items are kept as raw text and only fail
    /// on [`RawDeclaration::decode`].
    pub fn parse_raw(&self, raw: &str) -> Result<RawDeclaration> {
        let tokens = lexer::tokenize(raw);
        let equals = tokens
            .iter()
            .position(|t| *t == Token::Equals)
            .ok_or(DeclarationFault::MissingAssignment)?;
        let (head, body) = (&tokens[..equals], &tokens[equals + 1..]);

        let identifier = self.match_declarator(head)?;
        let name = self.options.registry_name(identifier);
        if name.is_empty() {
            return Err(DeclarationFault::EmptyName { identifier: identifier.to_string() }.into());
        }

        let tokens = match_initializer(body)?;
        if tokens.is_empty() {
            return Err(DeclarationFault::EmptyBody { identifier: identifier.to_string() }.into());
        }
        trace!("Parsed declaration {} ({} bytes)", identifier, tokens.len());

        Ok(RawDeclaration {
            identifier: identifier.to_string(),
            name,
            tokens,
        })
    }

    /// Match everything left of `=` and return the identifier.
    fn match_declarator<'t>(&self, head: &[Token<'t>]) -> std::result::Result<&'t str, DeclarationFault> {
        let qualifier = self.options.storage_qualifier.as_str();
        let is_qualifier = |t: &Token<'_>| matches!(t, Token::Word(w) if *w == qualifier);

        let head = match head.split_last() {
            Some((last, rest)) if is_qualifier(last) => rest,
            Some((last, _)) if head.iter().any(is_qualifier) => {
                return Err(DeclarationFault::ExpectedQualifier {
                    expected: qualifier.to_string(),
                    found: last.to_string(),
                });
            }
            _ => head,
        };

        let head = match head {
            [Token::Word(CONST_KEYWORD), rest @ ..] => rest,
            _ => head,
        };

        let rest = match head {
            [Token::Word(keyword), rest @ ..] if self.options.is_type_keyword(keyword) => rest,
            [first, ..] => return Err(DeclarationFault::ExpectedTypeKeyword { found: first.to_string() }),
            [] => return Err(DeclarationFault::ExpectedTypeKeyword { found: String::new() }),
        };

        match rest {
            [Token::Word(identifier), Token::OpenBracket, Token::CloseBracket] => Ok(*identifier),
            _ => Err(DeclarationFault::MalformedArraySuffix { found: lexer::render(rest) }),
        }
    }
}

/// Match `{ item, item, ... };` and return the raw item texts.
///
/// Items are not checked here: a piece that is not a single word is kept as
/// its rendered text so that decoding rejects it later.
fn match_initializer(body: &[Token<'_>]) -> Result<Vec<String>> {
    let inner = match body {
        [Token::OpenBrace, inner @ .., Token::CloseBrace, Token::Semicolon] => inner,
        _ => {
            return Err(DeclarationFault::MalformedBody(format!(
                "expected '{{ ... }};' after '=', found {:?}",
                lexer::render(body)
            ))
            .into());
        }
    };

    let pieces: Vec<&[Token<'_>]> = inner.split(|t| *t == Token::Comma).collect();
    let last = pieces.len() - 1;

    let items = pieces
        .into_iter()
        .enumerate()
        .filter_map(|(i, piece)| match piece {
            [Token::Word(word)] => Some(word.to_string()),
            [] if i == last => None,
            _ => Some(lexer::render(piece)),
        })
        .collect();
    Ok(items)
}
