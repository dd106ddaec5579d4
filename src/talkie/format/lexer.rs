//! Tokenizer for declaration text.

use std::fmt;

/// A lexical unit of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A run of ASCII letters, digits and underscores: keywords,
    /// identifiers and byte literals alike.
    Word(&'a str),
    OpenBracket,
    CloseBracket,
    Equals,
    OpenBrace,
    CloseBrace,
    Comma,
    Semicolon,
    /// Any other non-whitespace character.
    Other(char),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::OpenBracket => f.write_str("["),
            Token::CloseBracket => f.write_str("]"),
            Token::Equals => f.write_str("="),
            Token::OpenBrace => f.write_str("{"),
            Token::CloseBrace => f.write_str("}"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Other(c) => write!(f, "{}", c),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split declaration text into tokens. Whitespace only separates tokens.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '[' => Token::OpenBracket,
            ']' => Token::CloseBracket,
            '=' => Token::Equals,
            '{' => Token::OpenBrace,
            '}' => Token::CloseBrace,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            c if is_word_char(c) => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !is_word_char(next) {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                Token::Word(&text[start..end])
            }
            other => Token::Other(other),
        };
        tokens.push(token);
    }

    tokens
}

/// Render tokens back to text for diagnostics.
pub fn render(tokens: &[Token<'_>]) -> String {
    tokens.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}
