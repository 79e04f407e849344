//! Recursive descent parser for Thrift IDL
//!
//! Builds a [`SyntaxTree`] from tokens. Never fails: malformed input yields
//! best-effort nodes plus [`SyntaxError`]s, and scanning resumes at the next
//! line that opens a top-level declaration or starts with a closing brace.
//!
//! The token stream is cut into units (see [`LineScan::is_unit_start`]) and
//! each unit is parsed on its own: nothing, not even lookahead, crosses into
//! the next unit. A trailing annotation block after a closing brace must
//! therefore start on the closing line.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use tokio_util::sync::CancellationToken;

use super::annotations::parse_annotations;
use super::errors::{ErrorCode, SyntaxError};
use super::lexer::{Lexer, Token};
use super::lines::{LineScan, scan_lines};
use super::syntax_kind::SyntaxKind;
use crate::base::{LineIndex, LineRange, Span};
use crate::syntax::{
    Annotation, CommentStyle, Node, NodeData, NodeId, Requiredness, SyntaxTree,
};

/// Parse result containing the tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub tree: SyntaxTree,
    pub errors: Vec<SyntaxError>,
    /// The parse stopped early on a cancellation request; the tree is
    /// provisional and must not be cached.
    pub cancelled: bool,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn into_tree(self) -> SyntaxTree {
        self.tree
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }
}

/// Result of a bounded parse: the declarations found in `lines`.
///
/// The nodes hang off a scratch document root so they can be grafted into
/// a full tree; their positions are absolute document positions.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub lines: LineRange,
    pub tree: SyntaxTree,
    pub errors: Vec<SyntaxError>,
}

impl Fragment {
    /// Top-level nodes, in document order
    pub fn nodes(&self) -> &[NodeId] {
        self.tree.body()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes().len()
    }
}

/// Parse a whole document.
pub fn parse(text: &str) -> Parse {
    let index = LineIndex::new(text);
    let scan = scan_lines(text, &index);
    parse_scanned(text, &index, &scan, None)
}

/// Parse a whole document, checking `cancel` between top-level declarations.
pub fn parse_cancellable(text: &str, cancel: &CancellationToken) -> Parse {
    let index = LineIndex::new(text);
    let scan = scan_lines(text, &index);
    parse_scanned(text, &index, &scan, Some(cancel))
}

/// Full parse over a precomputed line scan of `text`
pub(crate) fn parse_scanned(
    text: &str,
    index: &LineIndex,
    scan: &LineScan,
    cancel: Option<&CancellationToken>,
) -> Parse {
    let mut parser = Parser::new(text, index, Lexer::new(text), TextSize::from(0), cancel);
    parser.split_units(scan, LineRange::new(0, index.last_line()));
    parser.parse_body();
    let range = Span::new(
        index.position(text, TextSize::from(0)),
        index.position(text, TextSize::of(text)),
    );
    parser.finish(range)
}

/// Parse only the declarations inside `start_line..=end_line`.
///
/// Bounds are clamped to the document. Callers widen the range first (see
/// [`analyze_affected_region`](super::analyze_affected_region)) so no
/// declaration is cut in half.
pub fn parse_range(text: &str, start_line: usize, end_line: usize) -> Fragment {
    let index = LineIndex::new(text);
    let scan = scan_lines(text, &index);
    parse_range_scanned(text, &index, &scan, LineRange::new(start_line, end_line))
}

/// Bounded parse over a precomputed line scan of the whole of `text`
pub(crate) fn parse_range_scanned(
    text: &str,
    index: &LineIndex,
    scan: &LineScan,
    lines: LineRange,
) -> Fragment {
    let lines = lines.clamp_to(index.line_count());
    let bytes = index.byte_range(lines);
    let slice = &text[bytes];
    let mut parser = Parser::new(
        text,
        index,
        Lexer::with_offset(slice, bytes.start()),
        bytes.start(),
        None,
    );
    parser.split_units(scan, lines);
    parser.parse_body();
    let parse = parser.finish(lines.to_span());
    Fragment {
        lines,
        tree: parse.tree,
        errors: parse.errors,
    }
}

/// The parser state
struct Parser<'a> {
    text: &'a str,
    index: &'a LineIndex,
    tokens: Vec<Token<'a>>,
    /// Parallel to `tokens`: the token is the first one on its line
    line_leading: Vec<bool>,
    pos: usize,
    /// Tokens at or past `limit` belong to a later unit and are invisible
    limit: usize,
    /// Token index where each unit ends, in order
    unit_ends: Vec<usize>,
    tree: SyntaxTree,
    body: Vec<NodeId>,
    errors: Vec<SyntaxError>,
    /// Byte offset just past the last consumed token
    last_end: TextSize,
    cancel: Option<&'a CancellationToken>,
    cancelled: bool,
}

impl<'a> Parser<'a> {
    fn new(
        text: &'a str,
        index: &'a LineIndex,
        lexer: Lexer<'a>,
        base: TextSize,
        cancel: Option<&'a CancellationToken>,
    ) -> Self {
        let mut parser = Self {
            text,
            index,
            tokens: Vec::new(),
            line_leading: Vec::new(),
            pos: 0,
            limit: 0,
            unit_ends: Vec::new(),
            tree: SyntaxTree::new(),
            body: Vec::new(),
            errors: Vec::new(),
            last_end: base,
            cancel,
            cancelled: false,
        };
        parser.load_tokens(lexer);
        parser.limit = parser.tokens.len();
        parser.unit_ends = vec![parser.tokens.len()];
        parser
    }

    /// Cut the token stream at every unit start inside `lines`.
    fn split_units(&mut self, scan: &LineScan, lines: LineRange) {
        let mut ends: Vec<usize> = scan
            .unit_starts(lines)
            .map(|line| {
                let offset = self.index.line_start(line);
                self.tokens.partition_point(|token| token.offset < offset)
            })
            .collect();
        ends.push(self.tokens.len());
        self.unit_ends = ends;
    }

    /// Keep significant tokens and comments; report lexical errors up front.
    fn load_tokens(&mut self, lexer: Lexer<'a>) {
        let mut previous_line = None;
        for token in lexer {
            match token.kind {
                SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE => continue,
                SyntaxKind::ERROR => {
                    self.error_at(
                        token.offset,
                        token.end(),
                        format!("unexpected character `{}`", token.text),
                        ErrorCode::E0101,
                    );
                    continue;
                }
                SyntaxKind::BLOCK_COMMENT if token.is_unterminated_comment() => {
                    self.error_at(
                        token.offset,
                        token.end(),
                        "unterminated block comment",
                        ErrorCode::E0103,
                    );
                }
                SyntaxKind::STRING if token.is_unterminated_string() => {
                    self.error_at(
                        token.offset,
                        token.end(),
                        "unterminated string literal",
                        ErrorCode::E0102,
                    );
                }
                _ => {}
            }
            let line = self.index.line_of(token.offset);
            self.line_leading.push(previous_line != Some(line));
            previous_line = Some(self.index.line_of(token.last_byte()));
            self.tokens.push(token);
        }
    }

    fn finish(mut self, range: Span) -> Parse {
        let root = self.tree.root();
        *self.tree.body_mut() = std::mem::take(&mut self.body);
        self.tree.set_document_range(range);
        self.tree.reparent(root, None);
        Parse {
            tree: self.tree,
            errors: self.errors,
            cancelled: self.cancelled,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    /// Tokens of the current unit and of the units before it
    fn visible(&self) -> &[Token<'a>] {
        &self.tokens[..self.limit]
    }

    fn current(&self) -> Option<&Token<'a>> {
        self.visible().get(self.pos)
    }

    fn current_kind(&self) -> Option<SyntaxKind> {
        self.current().map(|t| t.kind)
    }

    fn nth_kind(&self, n: usize) -> Option<SyntaxKind> {
        self.visible().get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        self.current_kind().is_some_and(|k| kinds.contains(&k))
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.limit
    }

    fn at_comment(&self) -> bool {
        self.current_kind().is_some_and(SyntaxKind::is_comment)
    }

    /// At a declaration keyword that starts its line: a safe resume point
    fn at_declaration_start(&self) -> bool {
        self.current_kind()
            .is_some_and(SyntaxKind::is_declaration_keyword)
            && self.line_leading.get(self.pos).copied().unwrap_or(false)
    }

    fn at_line_start(&self) -> bool {
        self.line_leading.get(self.pos).copied().unwrap_or(false)
    }

    fn current_offset(&self) -> TextSize {
        self.current().map(|t| t.offset).unwrap_or(self.last_end)
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.current().cloned()?;
        self.last_end = token.end();
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_separator(&mut self) {
        if !self.eat(SyntaxKind::COMMA) {
            self.eat(SyntaxKind::SEMICOLON);
        }
    }

    fn skip_comments(&mut self) {
        while self.at_comment() {
            self.bump();
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn span(&self, start: TextSize, end: TextSize) -> Span {
        Span::new(
            self.index.position(self.text, start),
            self.index.position(self.text, end.max(start)),
        )
    }

    fn error_at(
        &mut self,
        start: TextSize,
        end: TextSize,
        message: impl Into<String>,
        code: ErrorCode,
    ) {
        let range = self.span(start, end);
        self.errors.push(SyntaxError::new(message, range, code));
    }

    /// Error covering the current token (or an empty span at end of input)
    fn error_here(&mut self, message: impl Into<String>, code: ErrorCode) {
        let (start, end) = match self.current() {
            Some(token) => (token.offset, token.end()),
            None => (self.last_end, self.last_end),
        };
        self.error_at(start, end, message, code);
    }

    fn unterminated(&mut self, what: &str, open: TextSize, close: &str) {
        let range = self.span(open, open + TextSize::from(1));
        self.errors.push(
            SyntaxError::new(format!("unterminated {what}"), range, ErrorCode::E0201)
                .with_hint(format!("add a closing `{close}`")),
        );
    }

    /// Skip to the next line that opens a declaration, starts with a closing
    /// brace or a comment. Always consumes at least one token.
    fn recover_top_level(&mut self) {
        let start = self.current_offset();
        let text = self.current().map(|t| t.text.to_string()).unwrap_or_default();
        self.bump();
        while !self.at_eof() {
            if self.at_line_start()
                && (self.at_declaration_start()
                    || self.at(SyntaxKind::R_BRACE)
                    || self.at_comment())
            {
                break;
            }
            self.bump();
        }
        let end = self.last_end;
        self.error_at(
            start,
            end,
            format!("unexpected `{text}` at top level"),
            ErrorCode::E0203,
        );
    }

    /// Skip one token inside a block
    fn skip_unexpected(&mut self, context: &str) {
        let text = self.current().map(|t| t.text.to_string()).unwrap_or_default();
        self.error_here(format!("unexpected `{text}` in {context}"), ErrorCode::E0203);
        self.bump();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn alloc(
        &mut self,
        data: NodeData,
        start: TextSize,
        name: Option<(SmolStr, Span)>,
        annotations: Vec<Annotation>,
    ) -> NodeId {
        let mut node = Node::new(data, self.span(start, self.last_end));
        if let Some((name, range)) = name {
            node.name = Some(name);
            node.name_range = Some(range);
        }
        node.annotations = annotations;
        self.tree.alloc(node)
    }

    /// Consume an identifier, or report a missing name without consuming.
    fn expect_name(&mut self, what: &str) -> Option<(SmolStr, Span)> {
        if self.at(SyntaxKind::IDENT) {
            let token = self.bump()?;
            return Some((SmolStr::new(token.text), self.span(token.offset, token.end())));
        }
        self.error_here(format!("expected {what} name"), ErrorCode::E0301);
        None
    }

    /// Consume a `( ... )` annotation block at the current token.
    fn parse_annotation_block(&mut self) -> Vec<Annotation> {
        let Some(open) = self.current().cloned() else {
            return Vec::new();
        };
        let mut depth = 0usize;
        let mut close = None;
        for (idx, token) in self.visible().iter().enumerate().skip(self.pos) {
            match token.kind {
                SyntaxKind::L_PAREN => depth += 1,
                SyntaxKind::R_PAREN => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(idx);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(close) = close else {
            self.unterminated("annotation", open.offset, ")");
            self.bump();
            return Vec::new();
        };
        let close_end = self.tokens[close].end();
        let line_start = self.index.line_start(self.index.line_of(open.offset));
        let parsed = parse_annotations(
            &self.text[TextRange::new(open.offset, close_end)],
            usize::from(open.offset - line_start),
        );
        while self.pos <= close {
            self.bump();
        }
        parsed.annotations
    }

    fn parse_trailing_annotations(&mut self) -> Vec<Annotation> {
        let mut annotations = Vec::new();
        while self.at(SyntaxKind::L_PAREN) {
            annotations.extend(self.parse_annotation_block());
        }
        annotations
    }

    // =========================================================================
    // Top level
    // =========================================================================

    fn cancelled(&mut self) -> bool {
        if !self.cancelled && self.cancel.is_some_and(CancellationToken::is_cancelled) {
            self.cancelled = true;
        }
        self.cancelled
    }

    fn parse_body(&mut self) {
        for end in std::mem::take(&mut self.unit_ends) {
            self.limit = end;
            while !self.at_eof() {
                if self.cancelled() {
                    return;
                }
                if let Some(id) = self.parse_top_level() {
                    self.body.push(id);
                }
            }
        }
    }

    fn parse_top_level(&mut self) -> Option<NodeId> {
        let kind = self.current_kind()?;
        match kind {
            SyntaxKind::L_PAREN => return self.parse_orphan_annotation(),
            SyntaxKind::R_BRACE => {
                self.error_here("unmatched `}`", ErrorCode::E0202);
                self.bump();
                return None;
            }
            _ if !kind.is_comment() && !kind.is_declaration_keyword() => {
                self.recover_top_level();
                return None;
            }
            _ => {}
        }
        let keyword = self.bump()?;
        let id = match kind {
            SyntaxKind::INCLUDE_KW | SyntaxKind::CPP_INCLUDE_KW => self.parse_include(keyword),
            SyntaxKind::NAMESPACE_KW => self.parse_namespace(keyword),
            SyntaxKind::CONST_KW => self.parse_const(keyword),
            SyntaxKind::TYPEDEF_KW => self.parse_typedef(keyword),
            SyntaxKind::ENUM_KW | SyntaxKind::SENUM_KW => self.parse_enum(keyword),
            SyntaxKind::SERVICE_KW => self.parse_service(keyword),
            SyntaxKind::STRUCT_KW | SyntaxKind::UNION_KW | SyntaxKind::EXCEPTION_KW => {
                self.parse_struct_like(keyword)
            }
            _ => self.parse_comment(keyword),
        };
        Some(id)
    }

    fn parse_comment(&mut self, token: Token<'a>) -> NodeId {
        let style = match token.kind {
            SyntaxKind::LINE_COMMENT => CommentStyle::Line,
            SyntaxKind::HASH_COMMENT => CommentStyle::Hash,
            _ => CommentStyle::Block,
        };
        let data = NodeData::Comment {
            text: token.text.to_string(),
            style,
        };
        self.alloc(data, token.offset, None, Vec::new())
    }

    fn parse_orphan_annotation(&mut self) -> Option<NodeId> {
        let start = self.current_offset();
        let mut annotations = self.parse_annotation_block().into_iter();
        let annotation = annotations.next()?;
        self.error_at(
            start,
            self.last_end,
            "annotation does not follow a declaration",
            ErrorCode::E0303,
        );
        Some(self.alloc(NodeData::Annotation(annotation), start, None, Vec::new()))
    }

    fn parse_include(&mut self, keyword: Token<'a>) -> NodeId {
        let cpp = keyword.kind == SyntaxKind::CPP_INCLUDE_KW;
        let path = if self.at(SyntaxKind::STRING) {
            self.bump()
                .map(|t| SmolStr::new(unquote(t.text)))
                .unwrap_or_default()
        } else {
            self.error_here("expected include path string", ErrorCode::E0304);
            SmolStr::default()
        };
        self.eat_separator();
        self.alloc(NodeData::Include { path, cpp }, keyword.offset, None, Vec::new())
    }

    fn parse_namespace(&mut self, keyword: Token<'a>) -> NodeId {
        let scope = if self.at_any(&[SyntaxKind::IDENT, SyntaxKind::STAR]) {
            self.bump().map(|t| SmolStr::new(t.text)).unwrap_or_default()
        } else {
            self.error_here("expected namespace scope", ErrorCode::E0301);
            SmolStr::default()
        };
        let name = self.expect_name("namespace");
        self.eat_separator();
        let annotations = self.parse_trailing_annotations();
        self.alloc(NodeData::Namespace { scope }, keyword.offset, name, annotations)
    }

    fn parse_const(&mut self, keyword: Token<'a>) -> NodeId {
        let value_type = self.parse_type().unwrap_or_else(|| {
            self.error_here("expected const type", ErrorCode::E0302);
            SmolStr::default()
        });
        let name = self.expect_name("const");
        let value = if self.eat(SyntaxKind::EQ) {
            self.parse_const_value().unwrap_or_else(|| {
                self.error_here("expected const value", ErrorCode::E0304);
                String::new()
            })
        } else {
            self.error_here("expected `=` and a value", ErrorCode::E0304);
            String::new()
        };
        let end = self.last_end;
        self.eat_separator();
        let node = self.alloc(
            NodeData::Const { value_type, value },
            keyword.offset,
            name,
            Vec::new(),
        );
        self.trim_end(node, keyword.offset, end)
    }

    fn parse_typedef(&mut self, keyword: Token<'a>) -> NodeId {
        let target_type = self.parse_type().unwrap_or_else(|| {
            self.error_here("expected aliased type", ErrorCode::E0302);
            SmolStr::default()
        });
        let mut annotations = self.parse_trailing_annotations();
        let name = self.expect_name("typedef");
        annotations.extend(self.parse_trailing_annotations());
        let end = self.last_end;
        self.eat_separator();
        let node = self.alloc(NodeData::Typedef { target_type }, keyword.offset, name, annotations);
        self.trim_end(node, keyword.offset, end)
    }

    /// Exclude a trailing separator from a node's range.
    fn trim_end(&mut self, id: NodeId, start: TextSize, end: TextSize) -> NodeId {
        let range = self.span(start, end);
        if let Some(node) = self.tree.get_mut(id) {
            node.range = range;
        }
        id
    }

    // =========================================================================
    // Types and values
    // =========================================================================

    /// `base_type | Ident | list<T> | set<T> | map<K, V>`, normalized
    fn parse_type(&mut self) -> Option<SmolStr> {
        if !self.at(SyntaxKind::IDENT) {
            return None;
        }
        let token = self.bump()?;
        if !matches!(token.text, "list" | "set" | "map") || !self.at(SyntaxKind::L_ANGLE) {
            return Some(SmolStr::new(token.text));
        }
        let open = self.current_offset();
        self.bump();
        let mut args = Vec::new();
        loop {
            match self.parse_type() {
                Some(arg) => args.push(arg),
                None => {
                    self.error_here("expected type argument", ErrorCode::E0302);
                    break;
                }
            }
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        if !self.eat(SyntaxKind::R_ANGLE) {
            self.unterminated("type arguments", open, ">");
        }
        Some(SmolStr::new(format!("{}<{}>", token.text, args.join(", "))))
    }

    /// Literal, identifier, list `[...]` or map `{...}`; whitespace collapsed.
    fn parse_const_value(&mut self) -> Option<String> {
        let kind = self.current_kind()?;
        match kind {
            SyntaxKind::INTEGER | SyntaxKind::DOUBLE | SyntaxKind::STRING | SyntaxKind::IDENT => {
                self.bump().map(|t| t.text.to_string())
            }
            SyntaxKind::L_BRACKET | SyntaxKind::L_BRACE => {
                let start = self.current_offset();
                let close = if kind == SyntaxKind::L_BRACE { "}" } else { "]" };
                let mut depth = 0usize;
                while let Some(kind) = self.current_kind() {
                    if depth > 0 && self.at_declaration_start() {
                        self.unterminated("constant value", start, close);
                        break;
                    }
                    self.bump();
                    if kind.is_opener() {
                        depth += 1;
                    } else if kind.is_closer() {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            break;
                        }
                    }
                }
                Some(collapse_whitespace(&self.text[TextRange::new(start, self.last_end)]))
            }
            _ => None,
        }
    }

    // =========================================================================
    // Fields
    // =========================================================================

    fn at_field_start(&self) -> bool {
        self.at_any(&[
            SyntaxKind::INTEGER,
            SyntaxKind::REQUIRED_KW,
            SyntaxKind::OPTIONAL_KW,
            SyntaxKind::IDENT,
        ])
    }

    /// `[id:] [required|optional] type name [= default] [(annotations)] [,|;]`
    fn parse_field(&mut self) -> Option<NodeId> {
        let start = self.current_offset();
        let first = self.pos;
        let mut field_id = None;
        if self.at(SyntaxKind::INTEGER) && self.nth_kind(1) == Some(SyntaxKind::COLON) {
            field_id = self.bump().and_then(|t| parse_int(t.text));
            self.bump();
        }
        let requiredness = if self.eat(SyntaxKind::REQUIRED_KW) {
            Requiredness::Required
        } else if self.eat(SyntaxKind::OPTIONAL_KW) {
            Requiredness::Optional
        } else {
            Requiredness::Default
        };
        let field_type = self.parse_type().unwrap_or_else(|| {
            self.error_here("expected field type", ErrorCode::E0302);
            SmolStr::default()
        });
        let mut annotations = self.parse_trailing_annotations();
        let name = self.expect_name("field");
        let default_value = if self.eat(SyntaxKind::EQ) {
            let value = self.parse_const_value();
            if value.is_none() {
                self.error_here("expected default value", ErrorCode::E0304);
            }
            value
        } else {
            None
        };
        annotations.extend(self.parse_trailing_annotations());
        let data = NodeData::Field {
            field_id,
            requiredness,
            field_type,
            default_value,
        };
        if self.pos == first {
            self.bump();
            return None;
        }
        let id = self.alloc(data, start, name, annotations);
        self.eat_separator();
        Some(id)
    }

    /// Fields up to `close` (exclusive of the separator); returns whether the
    /// list was closed.
    fn parse_field_list(&mut self, close: SyntaxKind, context: &str) -> (Vec<NodeId>, bool) {
        let mut fields = Vec::new();
        loop {
            self.skip_comments();
            if self.at_eof() {
                return (fields, false);
            }
            if self.eat(close) {
                return (fields, true);
            }
            if self.at_declaration_start() {
                return (fields, false);
            }
            if close != SyntaxKind::R_BRACE && self.at(SyntaxKind::R_BRACE) {
                return (fields, false);
            }
            if self.at_field_start() {
                fields.extend(self.parse_field());
            } else {
                self.skip_unexpected(context);
            }
        }
    }

    // =========================================================================
    // Declarations with bodies
    // =========================================================================

    fn parse_struct_like(&mut self, keyword: Token<'a>) -> NodeId {
        let what = match keyword.kind {
            SyntaxKind::UNION_KW => "union",
            SyntaxKind::EXCEPTION_KW => "exception",
            _ => "struct",
        };
        let name = self.expect_name(what);
        if self.at(SyntaxKind::IDENT) && self.current().is_some_and(|t| t.text == "xsd_all") {
            self.bump();
        }
        let mut fields = Vec::new();
        if self.at(SyntaxKind::L_BRACE) {
            let open = self.current_offset();
            self.bump();
            let (parsed, closed) = self.parse_field_list(SyntaxKind::R_BRACE, what);
            fields = parsed;
            if !closed {
                self.unterminated(&format!("{what} body"), open, "}");
            }
        } else {
            self.error_here(format!("expected `{{` after {what} name"), ErrorCode::E0203);
        }
        let annotations = self.parse_trailing_annotations();
        let data = match keyword.kind {
            SyntaxKind::UNION_KW => NodeData::Union { fields },
            SyntaxKind::EXCEPTION_KW => NodeData::Exception { fields },
            _ => NodeData::Struct { fields },
        };
        self.alloc(data, keyword.offset, name, annotations)
    }

    fn parse_enum(&mut self, keyword: Token<'a>) -> NodeId {
        let string_enum = keyword.kind == SyntaxKind::SENUM_KW;
        let name = self.expect_name("enum");
        let mut members = Vec::new();
        if self.at(SyntaxKind::L_BRACE) {
            let open = self.current_offset();
            self.bump();
            let mut closed = false;
            loop {
                self.skip_comments();
                if self.at_eof() || self.at_declaration_start() {
                    break;
                }
                if self.eat(SyntaxKind::R_BRACE) {
                    closed = true;
                    break;
                }
                let member_kind = if string_enum {
                    SyntaxKind::STRING
                } else {
                    SyntaxKind::IDENT
                };
                if !self.at(member_kind) {
                    self.skip_unexpected("enum");
                } else if let Some(token) = self.bump() {
                    members.push(self.parse_enum_member(token));
                }
            }
            if !closed {
                self.unterminated("enum body", open, "}");
            }
        } else {
            self.error_here("expected `{` after enum name", ErrorCode::E0203);
        }
        let annotations = self.parse_trailing_annotations();
        self.alloc(
            NodeData::Enum {
                members,
                string_enum,
            },
            keyword.offset,
            name,
            annotations,
        )
    }

    fn parse_enum_member(&mut self, token: Token<'a>) -> NodeId {
        let name = SmolStr::new(unquote(token.text));
        let name_range = self.span(token.offset, token.end());
        let value = if self.eat(SyntaxKind::EQ) {
            if self.at_any(&[SyntaxKind::INTEGER, SyntaxKind::IDENT]) {
                self.bump().map(|t| t.text.to_string())
            } else {
                self.error_here("expected enum value", ErrorCode::E0304);
                None
            }
        } else {
            None
        };
        let annotations = self.parse_trailing_annotations();
        let id = self.alloc(
            NodeData::EnumMember { value },
            token.offset,
            Some((name, name_range)),
            annotations,
        );
        self.eat_separator();
        id
    }

    fn parse_service(&mut self, keyword: Token<'a>) -> NodeId {
        let name = self.expect_name("service");
        let extends = if self.eat(SyntaxKind::EXTENDS_KW) {
            self.expect_name("base service").map(|(base, _)| base)
        } else {
            None
        };
        let mut functions = Vec::new();
        if self.at(SyntaxKind::L_BRACE) {
            let open = self.current_offset();
            self.bump();
            let mut closed = false;
            loop {
                self.skip_comments();
                if self.at_eof() || self.at_declaration_start() {
                    break;
                }
                if self.eat(SyntaxKind::R_BRACE) {
                    closed = true;
                    break;
                }
                if self.at_any(&[SyntaxKind::ONEWAY_KW, SyntaxKind::VOID_KW, SyntaxKind::IDENT]) {
                    functions.push(self.parse_function());
                } else {
                    self.skip_unexpected("service");
                }
            }
            if !closed {
                self.unterminated("service body", open, "}");
            }
        } else {
            self.error_here("expected `{` after service name", ErrorCode::E0203);
        }
        let annotations = self.parse_trailing_annotations();
        self.alloc(
            NodeData::Service { extends, functions },
            keyword.offset,
            name,
            annotations,
        )
    }

    /// `[oneway] (void | type) name (args) [throws (fields)] [(annotations)]`
    fn parse_function(&mut self) -> NodeId {
        let start = self.current_offset();
        let oneway = self.eat(SyntaxKind::ONEWAY_KW);
        let return_type = if self.eat(SyntaxKind::VOID_KW) {
            SmolStr::new_static("void")
        } else {
            self.parse_type().unwrap_or_else(|| {
                self.error_here("expected return type", ErrorCode::E0302);
                SmolStr::default()
            })
        };
        let name = self.expect_name("function");
        let mut arguments = Vec::new();
        if self.at(SyntaxKind::L_PAREN) {
            let open = self.current_offset();
            self.bump();
            let (parsed, closed) = self.parse_field_list(SyntaxKind::R_PAREN, "argument list");
            arguments = parsed;
            if !closed {
                self.unterminated("argument list", open, ")");
            }
        } else {
            self.error_here("expected `(` after function name", ErrorCode::E0203);
        }
        let mut throws = Vec::new();
        if self.eat(SyntaxKind::THROWS_KW) {
            if self.at(SyntaxKind::L_PAREN) {
                let open = self.current_offset();
                self.bump();
                let (parsed, closed) = self.parse_field_list(SyntaxKind::R_PAREN, "throws list");
                throws = parsed;
                if !closed {
                    self.unterminated("throws list", open, ")");
                }
            } else {
                self.error_here("expected `(` after throws", ErrorCode::E0203);
            }
        }
        let annotations = self.parse_trailing_annotations();
        let data = NodeData::Function {
            return_type,
            oneway,
            arguments,
            throws,
        };
        let id = self.alloc(data, start, name, annotations);
        self.eat_separator();
        id
    }
}

fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0] {
        &text[1..text.len() - 1]
    } else {
        text.trim_start_matches(['"', '\''])
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let value = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    Some(if negative { -value } else { value })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
