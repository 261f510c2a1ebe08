//! Recursive descent parser for btree scripts.
//!
//! ```text
//! file           := (import_stmt | structural | guardable_task)*
//! import_stmt    := IMPORT IDENTIFIER COLON STRING
//! structural     := INDENT | DEDENT
//! guardable_task := guard* task
//! guard          := OPAREN task CPAREN
//! task           := IDENTIFIER (IDENTIFIER COLON STRING)*
//! ```
//!
//! Tasks are hung under an insertion point taken from an explicit stack of open
//! ancestors: INDENT pushes the task parsed last, DEDENT pops. The first task parsed
//! becomes the root. Every routine returns a `Result`; on failure the driver reports the
//! diagnostic and resumes at the first token of the following line, so a malformed line
//! adds nothing to the tree and later lines parse normally.

use serde::Serialize;

use super::{Span, Token, TokenKind};
use crate::ast::{ImportMap, NodeId, TaskNode, TaskTree};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Phase};

type ParseResult<T> = Result<T, Diagnostic>;

/// Everything a parse produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseOutput {
    pub tree: TaskTree,
    pub imports: ImportMap,
}

/// Renders the imports, a blank line, then the tree as canonical source.
impl std::fmt::Display for ParseOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, class_path) in &self.imports {
            writeln!(f, "import {}:\"{}\"", name, class_path)?;
        }
        if !self.imports.is_empty() && !self.tree.is_empty() {
            writeln!(f)?;
        }
        write!(f, "{}", self.tree)
    }
}

/// Parse a token stream, reporting parse errors into `sink`.
pub fn parse(tokens: &[Token], sink: &mut dyn DiagnosticSink) -> ParseOutput {
    Parser::new(tokens).parse(sink)
}

/// A task that parsed cleanly but is not in the tree yet.
struct PendingTask {
    node: TaskNode,
    guards: Vec<TaskNode>,
}

/// Single-use parser over one token stream.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    indent_level: usize,
    imports: ImportMap,
    tree: TaskTree,
    /// Open ancestors. `None` entries stand for levels opened before any task existed.
    ancestors: Vec<Option<NodeId>>,
    /// Task committed most recently; cleared when a line fails.
    last_task: Option<NodeId>,
    /// Stands in for a missing trailing EOF token.
    eof: Token,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        let eof = match tokens.last() {
            Some(last) => Token::new(
                TokenKind::Eof,
                "",
                None,
                last.line,
                last.column,
                Span::new(last.span.end, last.span.end),
            ),
            None => Token::new(TokenKind::Eof, "", None, 1, 1, Span::default()),
        };
        Self {
            tokens,
            pos: 0,
            indent_level: 0,
            imports: ImportMap::new(),
            tree: TaskTree::new(),
            ancestors: Vec::new(),
            last_task: None,
            eof,
        }
    }

    /// Drive the parse to EOF.
    pub fn parse(mut self, sink: &mut dyn DiagnosticSink) -> ParseOutput {
        while !self.is_at_end() {
            let start_line = self.current().line;
            let kind = self.current().kind;
            let result = match kind {
                TokenKind::Import => self.parse_import(),
                TokenKind::Indent | TokenKind::Dedent => {
                    self.parse_indent_level();
                    Ok(())
                }
                _ => self
                    .parse_guardable_task()
                    .map(|task| self.commit(task)),
            };

            if let Err(diagnostic) = result {
                tracing::debug!(line = start_line, "abandoning malformed line");
                sink.emit(diagnostic);
                self.last_task = None;
                self.synchronize(start_line);
            }
        }

        tracing::debug!(
            nodes = self.tree.len(),
            imports = self.imports.len(),
            open_levels = self.indent_level,
            "parsed token stream"
        );
        ParseOutput {
            tree: self.tree,
            imports: self.imports,
        }
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    fn parse_import(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::Import, "\"import\"")?;
        let name = self.expect(TokenKind::Identifier, "import name")?;
        self.expect(TokenKind::Colon, "\":\" after import name")?;
        let class_path = self.expect(TokenKind::String, "class path string")?;

        if self.imports.contains_key(name.text()) {
            return Err(Diagnostic::at_token(
                Phase::Parse,
                format!("redefinition of import \"{}\".", name.text()),
                &name,
            ));
        }
        self.imports
            .insert(name.text().to_string(), class_path.text().to_string());
        Ok(())
    }

    /// Consume a burst of DEDENTs, then at most one INDENT.
    fn parse_indent_level(&mut self) {
        while self.check(TokenKind::Dedent) {
            self.advance();
            self.indent_level = self.indent_level.saturating_sub(1);
            self.ancestors.pop();
        }
        if self.check(TokenKind::Indent) {
            self.advance();
            self.indent_level += 1;
            let point = self.last_task.or_else(|| self.insertion_point());
            self.ancestors.push(point);
        }
    }

    fn parse_guardable_task(&mut self) -> ParseResult<PendingTask> {
        let mut guards = Vec::new();
        while self.check(TokenKind::OParen) {
            guards.push(self.parse_guard()?);
        }
        let node = self.parse_task()?;
        Ok(PendingTask { node, guards })
    }

    fn parse_guard(&mut self) -> ParseResult<TaskNode> {
        self.expect(TokenKind::OParen, "\"(\" to open a guard")?;
        let task = self.parse_task()?;
        self.expect(TokenKind::CParen, "\")\" to close the guard")?;
        Ok(task)
    }

    fn parse_task(&mut self) -> ParseResult<TaskNode> {
        let name = self.expect(TokenKind::Identifier, "task name")?;
        let mut node = TaskNode::new(name);

        while self.check(TokenKind::Identifier) && self.check_next(TokenKind::Colon) {
            let (attr, value) = self.parse_attr_value_pair()?;
            if node.attributes.contains_key(attr.text()) {
                return Err(Diagnostic::at_token(
                    Phase::Parse,
                    format!("duplicate attribute \"{}\".", attr.text()),
                    &attr,
                ));
            }
            node.attributes
                .insert(attr.text().to_string(), value.text().to_string());
        }
        Ok(node)
    }

    fn parse_attr_value_pair(&mut self) -> ParseResult<(Token, Token)> {
        let attr = self.expect(TokenKind::Identifier, "attribute name")?;
        self.expect(TokenKind::Colon, "\":\" after attribute name")?;
        let value = self.expect(
            TokenKind::String,
            &format!("string value for attribute \"{}\"", attr.text()),
        )?;
        Ok((attr, value))
    }

    // ------------------------------------------------------------------------
    // Tree building
    // ------------------------------------------------------------------------

    fn insertion_point(&self) -> Option<NodeId> {
        self.ancestors
            .last()
            .copied()
            .flatten()
            .or_else(|| self.tree.root())
    }

    fn commit(&mut self, task: PendingTask) {
        let PendingTask { node, guards } = task;
        let id = self.tree.alloc(node);
        for guard in guards {
            let guard = self.tree.alloc(guard);
            self.tree.attach_guard(id, guard);
        }
        match self.insertion_point() {
            Some(parent) => self.tree.append_child(parent, id),
            None => self.tree.set_root(id),
        }
        self.last_task = Some(id);
    }

    // ------------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------------

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn check_next(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.pos + 1)
            .is_some_and(|token| token.kind == kind)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let found = self.current();
        Err(Diagnostic::at_token(
            Phase::Parse,
            format!("expected {}, found {}.", what, describe(found)),
            found,
        ))
    }

    /// Skip to the first token on a line after `line`.
    fn synchronize(&mut self, line: usize) {
        while !self.is_at_end() && self.current().line <= line {
            self.advance();
        }
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Identifier => format!("identifier \"{}\"", token.text()),
        TokenKind::String => format!("string \"{}\"", token.text()),
        TokenKind::Import => "\"import\"".to_string(),
        TokenKind::Indent => "an indent".to_string(),
        TokenKind::Dedent => "a dedent".to_string(),
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::OParen | TokenKind::CParen | TokenKind::Colon => {
            format!("\"{}\"", token.lexeme)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tokenize;

    fn parse_source(source: &str) -> (ParseOutput, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let tokens = tokenize(source, &mut diagnostics);
        let output = parse(&tokens, &mut diagnostics);
        (output, diagnostics)
    }

    fn names<'a>(tree: &'a TaskTree, ids: &[NodeId]) -> Vec<&'a str> {
        ids.iter().map(|&id| tree.node(id).name.as_str()).collect()
    }

    #[test]
    fn empty_input_has_no_root() {
        let (output, diagnostics) = parse_source("");
        assert!(diagnostics.is_empty());
        assert!(output.tree.root().is_none());
        assert!(output.imports.is_empty());
    }

    #[test]
    fn first_task_becomes_root() {
        let (output, diagnostics) = parse_source("root\n\tselector\n");
        assert!(diagnostics.is_empty());
        let root = output.tree.root_node().unwrap();
        assert_eq!(root.name, "root");
        assert_eq!(root.parent, None);
        assert_eq!(names(&output.tree, &root.children), vec!["selector"]);
    }

    #[test]
    fn dedent_returns_to_outer_parent() {
        let source = "root\n\tselector\n\t\ta\n\t\tb\n\tsequence\n\t\tc\n";
        let (output, diagnostics) = parse_source(source);
        assert!(diagnostics.is_empty());
        let tree = &output.tree;
        let root = tree.root().unwrap();
        assert_eq!(names(tree, &tree.node(root).children), vec!["selector", "sequence"]);
        let sequence = tree.find("sequence").unwrap();
        assert_eq!(names(tree, &tree.node(sequence).children), vec!["c"]);
        let selector = tree.find("selector").unwrap();
        assert_eq!(names(tree, &tree.node(selector).children), vec!["a", "b"]);
    }

    #[test]
    fn later_top_level_tasks_hang_under_the_root() {
        let (output, _) = parse_source("root\n\ta\nother\n");
        let tree = &output.tree;
        let root = tree.root().unwrap();
        assert_eq!(names(tree, &tree.node(root).children), vec!["a", "other"]);
    }

    #[test]
    fn guards_are_owned_by_their_task() {
        let (output, diagnostics) =
            parse_source("root\n\t(isCurrentBehavior? behavior:\"IDLING\") (ready?) sequence\n");
        assert!(diagnostics.is_empty());
        let tree = &output.tree;
        let root = tree.root().unwrap();
        assert_eq!(names(tree, &tree.node(root).children), vec!["sequence"]);
        let sequence = tree.find("sequence").unwrap();
        let guards = &tree.node(sequence).guards;
        assert_eq!(names(tree, guards), vec!["isCurrentBehavior?", "ready?"]);
        let first = tree.node(guards[0]);
        assert_eq!(first.attributes.get("behavior").map(String::as_str), Some("IDLING"));
        assert_eq!(first.parent, Some(sequence));
    }

    #[test]
    fn missing_string_drops_line_but_keeps_next() {
        let source = "root\n\ta crump:\n\tb\n";
        let (output, diagnostics) = parse_source(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "expected string value for attribute \"crump\", found identifier \"b\"."
        );
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (3, 2));
        let tree = &output.tree;
        assert!(tree.find("a").is_none());
        let root = tree.root().unwrap();
        assert_eq!(names(tree, &tree.node(root).children), vec!["b"]);
    }

    #[test]
    fn unclosed_guard_is_reported() {
        let (output, diagnostics) = parse_source("root\n\t(ready? sequence\n\tnext\n");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("expected \")\" to close the guard"));
        assert_eq!(diagnostics[0].line, 2);
        assert!(output.tree.find("ready?").is_none());
        assert!(output.tree.find("next").is_some());
    }

    #[test]
    fn children_of_a_failed_line_attach_to_the_enclosing_task() {
        let source = "root\n\tbad :\n\t\tchild\n\tsibling\n";
        let (output, diagnostics) = parse_source(source);
        assert_eq!(diagnostics.len(), 1);
        let tree = &output.tree;
        let root = tree.root().unwrap();
        assert_eq!(
            names(tree, &tree.node(root).children),
            vec!["bad", "child", "sibling"]
        );
    }

    #[test]
    fn stray_token_at_line_start_is_reported() {
        let (output, diagnostics) = parse_source("root\n\t\"oops\" task\n\tnext\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "expected task name, found string \"oops\"."
        );
        assert_eq!(output.tree.len(), 2);
    }

    #[test]
    fn import_errors_do_not_swallow_the_next_line() {
        let source = "import a:\"x\"\nimport a:\"y\"\nimport b \"z\"\nroot\n";
        let (output, diagnostics) = parse_source(source);
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "redefinition of import \"a\".",
                "expected \":\" after import name, found string \"z\".",
            ]
        );
        assert_eq!(output.imports.get("a").map(String::as_str), Some("x"));
        assert!(!output.imports.contains_key("b"));
        assert_eq!(output.tree.root_node().map(|n| n.name.as_str()), Some("root"));
    }

    #[test]
    fn eof_with_open_levels_is_tolerated() {
        let (output, diagnostics) = parse_source("root\n\ta\n\t\tb\n\t\t\tc");
        assert!(diagnostics.is_empty());
        let c = output.tree.find("c").unwrap();
        assert_eq!(output.tree.parent(c).map(|n| n.name.as_str()), Some("b"));
    }

    #[test]
    fn works_without_trailing_eof_token() {
        let mut diagnostics = Vec::new();
        let mut tokens = tokenize("root\n\ta", &mut diagnostics);
        tokens.pop();
        let output = parse(&tokens, &mut diagnostics);
        assert_eq!(output.tree.len(), 2);
    }
}
