//! Token types produced by the lexer.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Span;

/// Token categories. The names are stable and are what `Display` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    // Character tokens
    OParen,
    CParen,
    Colon,
    Indent,
    Dedent,

    // Literals
    Identifier,
    String,

    // Keywords
    Import,

    Eof,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::OParen => "OPAREN",
            TokenKind::CParen => "CPAREN",
            TokenKind::Colon => "COLON",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String => "STRING",
            TokenKind::Import => "IMPORT",
            TokenKind::Eof => "EOF",
        }
    }

    /// Looks up a reserved word. Built-in node names are deliberately absent: they lex as
    /// plain identifiers and are told apart by the validator.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        match text {
            "import" => Some(TokenKind::Import),
            _ => None,
        }
    }

    /// Whether the token only encodes block structure.
    pub fn is_structural(&self) -> bool {
        matches!(self, TokenKind::Indent | TokenKind::Dedent)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lexical token. Built only by the lexer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text of the token. The leading tabs for INDENT and DEDENT, empty for EOF.
    pub lexeme: String,
    /// Decoded value, present for STRING and IDENTIFIER tokens.
    pub literal: Option<String>,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column of the first character within the line.
    pub column: usize,
    pub span: Span,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        literal: Option<String>,
        line: usize,
        column: usize,
        span: Span,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal,
            line,
            column,
            span,
        }
    }

    /// The literal if there is one, otherwise the lexeme.
    pub fn text(&self) -> &str {
        self.literal.as_deref().unwrap_or(&self.lexeme)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.line, self.column, self.kind)?;
        if !self.lexeme.is_empty() && !self.kind.is_structural() {
            write!(f, " {}", self.lexeme)?;
        }
        if let Some(literal) = &self.literal {
            write!(f, " {:?}", literal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_only_knows_import() {
        assert_eq!(TokenKind::keyword("import"), Some(TokenKind::Import));
        assert_eq!(TokenKind::keyword("include"), None);
        assert_eq!(TokenKind::keyword("selector"), None);
    }

    #[test]
    fn display_includes_position_kind_and_literal() {
        let token = Token::new(
            TokenKind::String,
            "\"IDLING\"",
            Some("IDLING".into()),
            3,
            7,
            Span::new(20, 28),
        );
        assert_eq!(token.to_string(), "3:7 STRING \"IDLING\" \"IDLING\"");
        assert_eq!(token.text(), "IDLING");
    }

    #[test]
    fn kinds_serialize_with_stable_names() {
        let json = serde_json::to_string(&TokenKind::OParen).unwrap();
        assert_eq!(json, "\"OPAREN\"");
        assert_eq!(TokenKind::Eof.to_string(), "EOF");

        let all = [
            TokenKind::OParen,
            TokenKind::CParen,
            TokenKind::Colon,
            TokenKind::Indent,
            TokenKind::Dedent,
            TokenKind::Identifier,
            TokenKind::String,
            TokenKind::Import,
            TokenKind::Eof,
        ];
        for kind in all {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
