//! Indentation-aware lexer.
//!
//! Source text is scanned line by line. Leading tabs are measured against an indent stack
//! and turned into INDENT/DEDENT tokens; the rest of the line is split into colons,
//! parentheses, strings and identifiers. Lexical errors go to the diagnostic sink and the
//! offending character is skipped. The token stream always ends with a single EOF and
//! open indent levels are left open at end of input.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Span, Token, TokenKind};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Phase};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$?]*").expect("identifier pattern is a valid regex")
});

/// Tokenize `source`, reporting lexical errors into `sink`.
pub fn tokenize(source: &str, sink: &mut dyn DiagnosticSink) -> Vec<Token> {
    Lexer::new(source).tokenize(sink)
}

/// Single-use lexer over one source unit.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    indent_stack: Vec<usize>,
    /// Current line without its terminator.
    line: &'a str,
    /// 1-based number of the current line.
    line_num: usize,
    /// Byte offset of the current line within `source`.
    line_offset: usize,
    /// Byte index in `line` where the token being scanned starts.
    start: usize,
    /// Byte index in `line` of the next unread character.
    current: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            indent_stack: vec![0],
            line: "",
            line_num: 0,
            line_offset: 0,
            start: 0,
            current: 0,
        }
    }

    /// Consume the lexer and produce the full token stream, EOF included.
    pub fn tokenize(mut self, sink: &mut dyn DiagnosticSink) -> Vec<Token> {
        let source = self.source;
        let mut offset = 0;

        for (index, raw) in source.split('\n').enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            self.line = line;
            self.line_num = index + 1;
            self.line_offset = offset;
            self.start = 0;
            self.current = 0;
            offset += raw.len() + 1;

            if is_blank_or_comment(line) {
                continue;
            }

            self.scan_indent(sink);
            loop {
                self.start = self.current;
                let Some(c) = self.advance() else {
                    break;
                };
                self.scan_char(c, sink);
            }
        }

        self.start = self.line.len();
        self.current = self.line.len();
        self.tokens.push(Token::new(
            TokenKind::Eof,
            "",
            None,
            self.line_num.max(1),
            self.column(self.start),
            Span::new(source.len(), source.len()),
        ));

        tracing::debug!(
            tokens = self.tokens.len(),
            open_levels = self.indent_stack.len() - 1,
            "lexed source"
        );
        for token in &self.tokens {
            tracing::trace!(%token);
        }
        self.tokens
    }

    // ------------------------------------------------------------------------
    // Indentation
    // ------------------------------------------------------------------------

    fn scan_indent(&mut self, sink: &mut dyn DiagnosticSink) {
        let indent = self.line.bytes().take_while(|&b| b == b'\t').count();
        self.start = 0;
        self.current = indent;
        let top = self.indent_top();

        if indent > top {
            self.indent_stack.push(indent);
            self.add_token(TokenKind::Indent, None);
            if indent > top + 1 {
                sink.emit(self.error(format!(
                    "unexpected indentation level {} (expected at most {}).",
                    indent,
                    top + 1
                )));
            }
        } else if indent < top {
            while indent < self.indent_top() {
                self.indent_stack.pop();
                self.add_token(TokenKind::Dedent, None);
            }
            let expected = self.indent_top();
            if indent != expected {
                sink.emit(self.error(format!(
                    "unexpected indentation level {} (expected {}).",
                    indent, expected
                )));
            }
        }
    }

    fn indent_top(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    fn scan_char(&mut self, c: char, sink: &mut dyn DiagnosticSink) {
        match c {
            ':' => self.add_token(TokenKind::Colon, None),
            '(' => self.add_token(TokenKind::OParen, None),
            ')' => self.add_token(TokenKind::CParen, None),
            '"' => self.scan_string(sink),
            // Trailing comment
            '#' => self.current = self.line.len(),
            ' ' | '\t' => {}
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),
            other => sink.emit(self.error(format!("invalid character '{}' encountered.", other))),
        }
    }

    fn scan_string(&mut self, sink: &mut dyn DiagnosticSink) {
        match self.line[self.current..].find('"') {
            Some(len) => {
                let content = &self.line[self.current..self.current + len];
                self.current += len + 1;
                self.add_token(TokenKind::String, Some(content.to_string()));
            }
            None => {
                self.current = self.line.len();
                sink.emit(self.error("unterminated string."));
            }
        }
    }

    fn scan_identifier(&mut self) {
        if let Some(found) = IDENTIFIER.find(&self.line[self.start..]) {
            self.current = self.start + found.end();
        }
        let text = &self.line[self.start..self.current];
        match TokenKind::keyword(text) {
            Some(keyword) => self.add_token(keyword, None),
            None => self.add_token(TokenKind::Identifier, Some(text.to_string())),
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn advance(&mut self) -> Option<char> {
        let c = self.line[self.current..].chars().next()?;
        self.current += c.len_utf8();
        Some(c)
    }

    fn add_token(&mut self, kind: TokenKind, literal: Option<String>) {
        let token = Token::new(
            kind,
            &self.line[self.start..self.current],
            literal,
            self.line_num,
            self.column(self.start),
            self.span(),
        );
        self.tokens.push(token);
    }

    fn column(&self, byte_index: usize) -> usize {
        self.line[..byte_index].chars().count() + 1
    }

    fn span(&self) -> Span {
        Span::new(
            self.line_offset + self.start,
            self.line_offset + self.current,
        )
    }

    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(
            Phase::Lex,
            message,
            self.line_num,
            self.column(self.start),
            self.span(),
        )
    }
}

/// Blank and comment-only lines take no part in indentation tracking.
fn is_blank_or_comment(line: &str) -> bool {
    let content = line.trim_start_matches([' ', '\t']);
    content.is_empty() || content.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let tokens = tokenize(source, &mut diagnostics);
        (tokens, diagnostics)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).0.into_iter().map(|t| t.kind).collect()
    }

    use TokenKind::*;

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![Eof]);
    }

    #[test]
    fn task_with_attribute() {
        let (tokens, diagnostics) = lex("setBehaviorState behavior:\"IDLING\"");
        assert!(diagnostics.is_empty());
        let summary: Vec<_> = tokens
            .iter()
            .map(|t| (t.kind, t.lexeme.as_str(), t.column))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Identifier, "setBehaviorState", 1),
                (Identifier, "behavior", 18),
                (Colon, ":", 26),
                (String, "\"IDLING\"", 27),
                (Eof, "", 35),
            ]
        );
        assert_eq!(tokens[3].literal.as_deref(), Some("IDLING"));
    }

    #[test]
    fn identifiers_may_contain_question_mark_and_dollar() {
        let (tokens, _) = lex("isCurrentBehavior? a$b");
        assert_eq!(tokens[0].literal.as_deref(), Some("isCurrentBehavior?"));
        assert_eq!(tokens[1].literal.as_deref(), Some("a$b"));
    }

    #[test]
    fn import_is_a_keyword_without_literal() {
        let (tokens, _) = lex("import hooplah:\"com.rager.behavior.atomic\"");
        assert_eq!(tokens[0].kind, Import);
        assert_eq!(tokens[0].literal, None);
        assert_eq!(tokens[1].kind, Identifier);
    }

    #[test]
    fn indentation_produces_structural_tokens() {
        let source = "root\n\tselector\n\t\ta\n\tb\n";
        assert_eq!(
            kinds(source),
            vec![
                Identifier, Indent, Identifier, Indent, Identifier, Dedent, Identifier, Eof
            ]
        );
    }

    #[test]
    fn multiple_dedents_in_one_line() {
        let source = "root\n\ta\n\t\tb\n\t\t\tc\nd";
        let k = kinds(source);
        assert_eq!(k.iter().filter(|&&k| k == Dedent).count(), 3);
        assert_eq!(&k[k.len() - 5..], &[Dedent, Dedent, Dedent, Identifier, Eof]);
    }

    #[test]
    fn open_levels_are_not_closed_at_eof() {
        let k = kinds("root\n\ta\n\t\tb");
        assert_eq!(k.iter().filter(|&&k| k == Indent).count(), 2);
        assert!(!k.contains(&Dedent));
        assert_eq!(k.last(), Some(&Eof));
    }

    #[test]
    fn comment_and_blank_lines_are_transparent() {
        let with = "root\n\ta\n\n# top comment\n\t\t\t# deep comment\n   \n\tb\n";
        let without = "root\n\ta\n\tb\n";
        let (tokens, diagnostics) = lex(with);
        assert!(diagnostics.is_empty());
        let a: Vec<_> = tokens.iter().map(|t| (t.kind, t.text().to_string())).collect();
        let b: Vec<_> = lex(without)
            .0
            .iter()
            .map(|t| (t.kind, t.text().to_string()))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn trailing_comment_ends_the_line() {
        let (tokens, diagnostics) = lex("sequence # run in order (really)");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn spaces_are_not_indentation() {
        assert_eq!(kinds("root\n    a"), vec![Identifier, Identifier, Eof]);
    }

    #[test]
    fn dedent_to_unknown_level_is_reported() {
        let (tokens, diagnostics) = lex("root\n\t\ta\n\tb");
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].message.contains("expected at most 1"));
        assert_eq!(diagnostics[0].line, 2);
        assert!(diagnostics[1].message.contains("unexpected indentation level 1"));
        assert_eq!(diagnostics[1].line, 3);
        let k: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(k, vec![Identifier, Indent, Identifier, Dedent, Identifier, Eof]);
    }

    #[test]
    fn unterminated_string_is_reported_and_skipped() {
        let (tokens, diagnostics) = lex("a key:\"open\nb");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "unterminated string.");
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 7));
        let k: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(k, vec![Identifier, Identifier, Colon, Identifier, Eof]);
    }

    #[test]
    fn invalid_characters_are_skipped() {
        let (tokens, diagnostics) = lex("a count:5 {b}");
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "invalid character '5' encountered.",
                "invalid character '{' encountered.",
                "invalid character '}' encountered.",
            ]
        );
        assert_eq!(diagnostics[0].column, 9);
        let k: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(k, vec![Identifier, Identifier, Colon, Identifier, Eof]);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let (tokens, diagnostics) = lex("root\r\n\ta\r\n");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[2].literal.as_deref(), Some("a"));
    }

    #[test]
    fn spans_point_into_the_source() {
        let source = "root\n\t(guard) task";
        let (tokens, _) = lex(source);
        for token in tokens.iter().filter(|t| t.kind == Identifier) {
            assert_eq!(&source[token.span.start..token.span.end], token.lexeme);
        }
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[2].column, 2);
    }
}
