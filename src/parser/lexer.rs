//! Logos-based lexer for Thrift IDL
//!
//! Fast tokenization using the logos crate.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token with its kind, text, and absolute byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }

    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text))
    }

    /// Offset of the token's last byte; the start for an empty token
    pub fn last_byte(&self) -> TextSize {
        self.end().checked_sub(TextSize::from(1)).map_or(self.offset, |last| last.max(self.offset))
    }

    /// Block comment that reached end of input without `*/`
    pub fn is_unterminated_comment(&self) -> bool {
        self.kind == SyntaxKind::BLOCK_COMMENT && (self.text.len() < 4 || !self.text.ends_with("*/"))
    }

    /// String literal without its closing quote
    pub fn is_unterminated_string(&self) -> bool {
        if self.kind != SyntaxKind::STRING {
            return false;
        }
        let bytes = self.text.as_bytes();
        if bytes.len() < 2 || bytes[0] != bytes[bytes.len() - 1] {
            return true;
        }
        // An odd run of backslashes escapes the final quote.
        let escapes = bytes[1..bytes.len() - 1]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        escapes % 2 == 1
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: TextSize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_offset(input, TextSize::from(0))
    }

    /// Lex a slice of a larger document; token offsets are shifted by `base`
    /// so they stay absolute.
    pub fn with_offset(input: &'a str, base: TextSize) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: base,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = self.offset;
        self.offset += TextSize::of(text);

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Consume a block comment body. Unterminated comments run to end of input.
fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) {
    match lex.remainder().find("*/") {
        Some(idx) => lex.bump(idx + 2),
        None => lex.bump(lex.remainder().len()),
    }
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\x0C]+")]
    Whitespace,

    #[token("\n")]
    Newline,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"#[^\n]*")]
    HashComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.]*")]
    Ident,

    #[regex(r"[+-]?[0-9]+")]
    #[regex(r"[+-]?0[xX][0-9a-fA-F]+")]
    Integer,

    #[regex(r"[+-]?[0-9]*\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[+-]?[0-9]+[eE][+-]?[0-9]+")]
    Double,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    #[regex(r#"'([^'\\\n]|\\[^\n])*'"#)]
    String,

    #[regex(r#""([^"\\\n]|\\[^\n])*"#)]
    #[regex(r#"'([^'\\\n]|\\[^\n])*"#)]
    UnterminatedString,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token("=")]
    Eq,

    #[token("*")]
    Star,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("include")]
    IncludeKw,

    #[token("cpp_include")]
    CppIncludeKw,

    #[token("namespace")]
    NamespaceKw,

    #[token("const")]
    ConstKw,

    #[token("typedef")]
    TypedefKw,

    #[token("enum")]
    EnumKw,

    #[token("senum")]
    SenumKw,

    #[token("struct")]
    StructKw,

    #[token("union")]
    UnionKw,

    #[token("exception")]
    ExceptionKw,

    #[token("service")]
    ServiceKw,

    #[token("extends")]
    ExtendsKw,

    #[token("required")]
    RequiredKw,

    #[token("optional")]
    OptionalKw,

    #[token("oneway")]
    OnewayKw,

    #[token("void")]
    VoidKw,

    #[token("throws")]
    ThrowsKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            Whitespace => SyntaxKind::WHITESPACE,
            Newline => SyntaxKind::NEWLINE,
            LineComment => SyntaxKind::LINE_COMMENT,
            HashComment => SyntaxKind::HASH_COMMENT,
            BlockComment => SyntaxKind::BLOCK_COMMENT,
            Ident => SyntaxKind::IDENT,
            Integer => SyntaxKind::INTEGER,
            Double => SyntaxKind::DOUBLE,
            String | UnterminatedString => SyntaxKind::STRING,
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            LAngle => SyntaxKind::L_ANGLE,
            RAngle => SyntaxKind::R_ANGLE,
            Comma => SyntaxKind::COMMA,
            Semicolon => SyntaxKind::SEMICOLON,
            Colon => SyntaxKind::COLON,
            Eq => SyntaxKind::EQ,
            Star => SyntaxKind::STAR,
            IncludeKw => SyntaxKind::INCLUDE_KW,
            CppIncludeKw => SyntaxKind::CPP_INCLUDE_KW,
            NamespaceKw => SyntaxKind::NAMESPACE_KW,
            ConstKw => SyntaxKind::CONST_KW,
            TypedefKw => SyntaxKind::TYPEDEF_KW,
            EnumKw => SyntaxKind::ENUM_KW,
            SenumKw => SyntaxKind::SENUM_KW,
            StructKw => SyntaxKind::STRUCT_KW,
            UnionKw => SyntaxKind::UNION_KW,
            ExceptionKw => SyntaxKind::EXCEPTION_KW,
            ServiceKw => SyntaxKind::SERVICE_KW,
            ExtendsKw => SyntaxKind::EXTENDS_KW,
            RequiredKw => SyntaxKind::REQUIRED_KW,
            OptionalKw => SyntaxKind::OPTIONAL_KW,
            OnewayKw => SyntaxKind::ONEWAY_KW,
            VoidKw => SyntaxKind::VOID_KW,
            ThrowsKw => SyntaxKind::THROWS_KW,
        }
    }
}
