//! Token kinds produced by the lexer
//!
//! This enum defines every token the Thrift lexer can emit. Node kinds live
//! in [`crate::syntax::NodeKind`]; the parser builds an arena tree rather than
//! a lossless CST, so token and node kinds are kept apart.

/// All token kinds in Thrift IDL
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments)
    // =========================================================================
    WHITESPACE = 0,
    NEWLINE,
    LINE_COMMENT,  // // comment
    HASH_COMMENT,  // # comment
    BLOCK_COMMENT, // /* comment */

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,   // identifier, may contain dots: foo.bar
    INTEGER, // 42, -1, 0x1F
    DOUBLE,  // 3.14, 1e10
    STRING,  // "hello" or 'hello'

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,   // {
    R_BRACE,   // }
    L_BRACKET, // [
    R_BRACKET, // ]
    L_PAREN,   // (
    R_PAREN,   // )
    L_ANGLE,   // <
    R_ANGLE,   // >
    COMMA,     // ,
    SEMICOLON, // ;
    COLON,     // :
    EQ,        // =
    STAR,      // *

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    INCLUDE_KW,
    CPP_INCLUDE_KW,
    NAMESPACE_KW,
    CONST_KW,
    TYPEDEF_KW,
    ENUM_KW,
    SENUM_KW,
    STRUCT_KW,
    UNION_KW,
    EXCEPTION_KW,
    SERVICE_KW,
    EXTENDS_KW,
    REQUIRED_KW,
    OPTIONAL_KW,
    ONEWAY_KW,
    VOID_KW,
    THROWS_KW,

    // =========================================================================
    // SPECIAL
    // =========================================================================
    ERROR,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE
                | Self::NEWLINE
                | Self::LINE_COMMENT
                | Self::HASH_COMMENT
                | Self::BLOCK_COMMENT
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            Self::LINE_COMMENT | Self::HASH_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::INCLUDE_KW as u16) && (self as u16) <= (Self::THROWS_KW as u16)
    }

    /// Keywords that open a top-level declaration
    pub fn is_declaration_keyword(self) -> bool {
        matches!(
            self,
            Self::INCLUDE_KW
                | Self::CPP_INCLUDE_KW
                | Self::NAMESPACE_KW
                | Self::CONST_KW
                | Self::TYPEDEF_KW
                | Self::ENUM_KW
                | Self::SENUM_KW
                | Self::STRUCT_KW
                | Self::UNION_KW
                | Self::EXCEPTION_KW
                | Self::SERVICE_KW
        )
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::STAR as u16)
    }

    /// Opening bracket of any flavor
    pub fn is_opener(self) -> bool {
        matches!(self, Self::L_BRACE | Self::L_BRACKET | Self::L_PAREN)
    }

    /// Closing bracket of any flavor
    pub fn is_closer(self) -> bool {
        matches!(self, Self::R_BRACE | Self::R_BRACKET | Self::R_PAREN)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IDENT | Self::INTEGER | Self::DOUBLE | Self::STRING
        )
    }
}
