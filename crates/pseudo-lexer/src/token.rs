//! Token types for the pseudocode lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the language and
//! [`Token`], which pairs a kind with a source [`Span`].

use pseudo_types::ast::PrimitiveType;
use pseudo_types::Span;
use std::fmt;

/// Every reserved word, in source spelling.
///
/// Keywords are upper-case and case-sensitive: `if` is an identifier.
pub const ALL_KEYWORDS: &[&str] = &[
    // Declarations
    "DECLARE", "CONSTANT", "TYPE", "ENDTYPE", "ARRAY", "OF",
    // Selection
    "IF", "THEN", "ELSE", "ENDIF", "CASE", "OTHERWISE", "ENDCASE",
    // Loops
    "WHILE", "DO", "ENDWHILE", "REPEAT", "UNTIL", "FOR", "TO", "STEP", "NEXT",
    // Routines
    "PROCEDURE", "ENDPROCEDURE", "FUNCTION", "ENDFUNCTION", "RETURNS", "RETURN",
    "CALL", "BYREF", "BYVAL", "BREAK", "CONTINUE",
    // I/O
    "OUTPUT", "PRINT", "INPUT", "READ", "OPENFILE", "READFILE", "WRITEFILE",
    "CLOSEFILE", "WRITE", "APPEND",
    // Operators & literals
    "AND", "OR", "NOT", "MOD", "DIV", "TRUE", "FALSE",
    // Data types
    "INTEGER", "REAL", "BOOLEAN", "CHAR", "STRING", "DATE",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────
    IntegerLit(i64),
    RealLit(f64),
    CharLit(char),
    StringLit(String),
    /// `dd/mm/yyyy`
    DateLit { day: u32, month: u32, year: i32 },
    True,
    False,

    Identifier(String),
    /// `INTEGER`, `REAL`, ... as one kind carrying the primitive.
    DataType(PrimitiveType),

    // ── Keywords ──────────────────────────────────────────────
    Declare,
    Constant,
    Type,
    EndType,
    Array,
    Of,
    If,
    Then,
    Else,
    EndIf,
    Case,
    Otherwise,
    EndCase,
    While,
    Do,
    EndWhile,
    Repeat,
    Until,
    For,
    To,
    Step,
    Next,
    Procedure,
    EndProcedure,
    Function,
    EndFunction,
    Returns,
    Return,
    Call,
    ByRef,
    ByVal,
    Break,
    Continue,
    Output,
    Print,
    Input,
    Read,
    OpenFile,
    ReadFile,
    WriteFile,
    CloseFile,
    Write,
    Append,
    And,
    Or,
    Not,
    Mod,
    Div,

    // ── Operators ─────────────────────────────────────────────
    /// `<-`
    Assign,
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Plus,
    Minus,
    Star,
    Slash,
    /// `^`
    Caret,
    /// `&`
    Ampersand,

    // ── Punctuation ───────────────────────────────────────────
    Dot,
    Comma,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,

    Newline,
    Eof,
}

impl TokenKind {
    /// Look up a keyword by its exact source spelling.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        if let Some(p) = PrimitiveType::from_keyword(s) {
            return Some(TokenKind::DataType(p));
        }
        let kind = match s {
            "DECLARE" => TokenKind::Declare,
            "CONSTANT" => TokenKind::Constant,
            "TYPE" => TokenKind::Type,
            "ENDTYPE" => TokenKind::EndType,
            "ARRAY" => TokenKind::Array,
            "OF" => TokenKind::Of,
            "IF" => TokenKind::If,
            "THEN" => TokenKind::Then,
            "ELSE" => TokenKind::Else,
            "ENDIF" => TokenKind::EndIf,
            "CASE" => TokenKind::Case,
            "OTHERWISE" => TokenKind::Otherwise,
            "ENDCASE" => TokenKind::EndCase,
            "WHILE" => TokenKind::While,
            "DO" => TokenKind::Do,
            "ENDWHILE" => TokenKind::EndWhile,
            "REPEAT" => TokenKind::Repeat,
            "UNTIL" => TokenKind::Until,
            "FOR" => TokenKind::For,
            "TO" => TokenKind::To,
            "STEP" => TokenKind::Step,
            "NEXT" => TokenKind::Next,
            "PROCEDURE" => TokenKind::Procedure,
            "ENDPROCEDURE" => TokenKind::EndProcedure,
            "FUNCTION" => TokenKind::Function,
            "ENDFUNCTION" => TokenKind::EndFunction,
            "RETURNS" => TokenKind::Returns,
            "RETURN" => TokenKind::Return,
            "CALL" => TokenKind::Call,
            "BYREF" => TokenKind::ByRef,
            "BYVAL" => TokenKind::ByVal,
            "BREAK" => TokenKind::Break,
            "CONTINUE" => TokenKind::Continue,
            "OUTPUT" => TokenKind::Output,
            "PRINT" => TokenKind::Print,
            "INPUT" => TokenKind::Input,
            "READ" => TokenKind::Read,
            "OPENFILE" => TokenKind::OpenFile,
            "READFILE" => TokenKind::ReadFile,
            "WRITEFILE" => TokenKind::WriteFile,
            "CLOSEFILE" => TokenKind::CloseFile,
            "WRITE" => TokenKind::Write,
            "APPEND" => TokenKind::Append,
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "MOD" => TokenKind::Mod,
            "DIV" => TokenKind::Div,
            "TRUE" => TokenKind::True,
            "FALSE" => TokenKind::False,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        !matches!(
            self,
            TokenKind::IntegerLit(_)
                | TokenKind::RealLit(_)
                | TokenKind::CharLit(_)
                | TokenKind::StringLit(_)
                | TokenKind::DateLit { .. }
                | TokenKind::Identifier(_)
                | TokenKind::Assign
                | TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::LessEq
                | TokenKind::GreaterEq
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Caret
                | TokenKind::Ampersand
                | TokenKind::Dot
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::Newline
                | TokenKind::Eof
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::IntegerLit(n) => return write!(f, "{n}"),
            TokenKind::RealLit(n) => return write!(f, "{n}"),
            TokenKind::CharLit(c) => return write!(f, "'{c}'"),
            TokenKind::StringLit(s) => return write!(f, "\"{s}\""),
            TokenKind::DateLit { day, month, year } => {
                return write!(f, "{day:02}/{month:02}/{year:04}")
            }
            TokenKind::Identifier(name) => return f.write_str(name),
            TokenKind::DataType(p) => return write!(f, "{p}"),
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Declare => "DECLARE",
            TokenKind::Constant => "CONSTANT",
            TokenKind::Type => "TYPE",
            TokenKind::EndType => "ENDTYPE",
            TokenKind::Array => "ARRAY",
            TokenKind::Of => "OF",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::Else => "ELSE",
            TokenKind::EndIf => "ENDIF",
            TokenKind::Case => "CASE",
            TokenKind::Otherwise => "OTHERWISE",
            TokenKind::EndCase => "ENDCASE",
            TokenKind::While => "WHILE",
            TokenKind::Do => "DO",
            TokenKind::EndWhile => "ENDWHILE",
            TokenKind::Repeat => "REPEAT",
            TokenKind::Until => "UNTIL",
            TokenKind::For => "FOR",
            TokenKind::To => "TO",
            TokenKind::Step => "STEP",
            TokenKind::Next => "NEXT",
            TokenKind::Procedure => "PROCEDURE",
            TokenKind::EndProcedure => "ENDPROCEDURE",
            TokenKind::Function => "FUNCTION",
            TokenKind::EndFunction => "ENDFUNCTION",
            TokenKind::Returns => "RETURNS",
            TokenKind::Return => "RETURN",
            TokenKind::Call => "CALL",
            TokenKind::ByRef => "BYREF",
            TokenKind::ByVal => "BYVAL",
            TokenKind::Break => "BREAK",
            TokenKind::Continue => "CONTINUE",
            TokenKind::Output => "OUTPUT",
            TokenKind::Print => "PRINT",
            TokenKind::Input => "INPUT",
            TokenKind::Read => "READ",
            TokenKind::OpenFile => "OPENFILE",
            TokenKind::ReadFile => "READFILE",
            TokenKind::WriteFile => "WRITEFILE",
            TokenKind::CloseFile => "CLOSEFILE",
            TokenKind::Write => "WRITE",
            TokenKind::Append => "APPEND",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Mod => "MOD",
            TokenKind::Div => "DIV",
            TokenKind::Assign => "<-",
            TokenKind::Eq => "=",
            TokenKind::NotEq => "<>",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::LessEq => "<=",
            TokenKind::GreaterEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Caret => "^",
            TokenKind::Ampersand => "&",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}
