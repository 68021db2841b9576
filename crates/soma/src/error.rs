//! Error taxonomy for the lexer, parser and VM.
//!
//! Two-level split: [`VmError`] is the rich, internal error used for
//! `?`-propagation inside the crate, and [`Diagnostic`] is the single-line,
//! stderr-renderable projection a host actually prints. `ErrorKind` supplies
//! the `<ErrorKind>` tag via `strum::Display`/`EnumString`.

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

/// Source location of a token or instruction, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub line: u32,
    pub col: u32,
}

impl Span {
    #[must_use]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// The error-kind taxonomy (spec.md §7), used as the `<ErrorKind>` tag in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    LexError,
    ParseError,
    UndefinedPath,
    NotExecutable,
    #[strum(serialize = "ALUnderflow")]
    AlUnderflow,
    TypeError,
    ExtensionError,
    HostError,
}

/// Lex-time failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedEscape,
    InvalidEscape(String),
    InvalidCodepoint(u32),
    UnexpectedChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LexErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            LexErrorKind::UnterminatedEscape => write!(f, "unterminated \\HEX\\ escape"),
            LexErrorKind::InvalidEscape(s) => write!(f, "invalid escape sequence '{s}'"),
            LexErrorKind::InvalidCodepoint(cp) => write!(f, "invalid Unicode codepoint U+{cp:X}"),
            LexErrorKind::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
        }
    }
}

/// Parse-time failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnmatchedBlockOpen,
    UnmatchedBlockClose,
    UnexpectedEof,
    InvalidSetTarget(String),
    InvalidExecTarget(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::UnmatchedBlockOpen => write!(f, "unmatched '{{'"),
            ParseErrorKind::UnmatchedBlockClose => write!(f, "unmatched '}}'"),
            ParseErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            ParseErrorKind::InvalidSetTarget(p) => write!(f, "invalid setter target '{p}'"),
            ParseErrorKind::InvalidExecTarget(p) => write!(f, "invalid executor target '{p}'"),
        }
    }
}

/// Extension-loader failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    Unknown(String),
    RejectedPath { extension: String, path: String },
    Unavailable { extension: String, reason: String },
}

impl fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "unknown extension '{name}'"),
            Self::RejectedPath { extension, path } => {
                write!(f, "extension '{extension}' may not register path '{path}'")
            }
            Self::Unavailable { extension, reason } => {
                write!(f, "extension '{extension}' unavailable: {reason}")
            }
        }
    }
}

/// The rich, internal error type threaded through `RunResult`.
///
/// Every variant but host-raised failures (which never reach this type - see
/// `spec.md` §7's dual-return discipline) is fatal: the VM stops executing and
/// the CLI renders a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    Lex(LexError),
    Parse(ParseError),
    UndefinedPath { path: String, span: Option<Span> },
    NotExecutable { path: String, value_kind: &'static str, span: Option<Span> },
    AlUnderflow { primitive: &'static str, span: Option<Span> },
    Type { primitive: &'static str, expected: &'static str, got: &'static str, span: Option<Span> },
    Extension(ExtensionError),
    RecursionLimit { limit: usize },
}

pub type RunResult<T> = Result<T, VmError>;

impl VmError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lex(_) => ErrorKind::LexError,
            Self::Parse(_) => ErrorKind::ParseError,
            Self::UndefinedPath { .. } => ErrorKind::UndefinedPath,
            Self::NotExecutable { .. } => ErrorKind::NotExecutable,
            Self::AlUnderflow { .. } => ErrorKind::AlUnderflow,
            Self::Type { .. } => ErrorKind::TypeError,
            Self::Extension(_) => ErrorKind::ExtensionError,
            Self::RecursionLimit { .. } => ErrorKind::TypeError,
        }
    }

    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex(e) => Some(e.span),
            Self::Parse(e) => Some(e.span),
            Self::UndefinedPath { span, .. }
            | Self::NotExecutable { span, .. }
            | Self::AlUnderflow { span, .. }
            | Self::Type { span, .. } => *span,
            Self::Extension(_) | Self::RecursionLimit { .. } => None,
        }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
            Self::UndefinedPath { path, .. } => write!(f, "undefined path '{path}'"),
            Self::NotExecutable { path, value_kind, .. } => {
                write!(f, "'{path}' holds a {value_kind}, which is not executable")
            }
            Self::AlUnderflow { primitive, .. } => {
                write!(f, "'{primitive}' needs more values than the accumulator list holds")
            }
            Self::Type { primitive, expected, got, .. } => {
                write!(f, "'{primitive}' expected {expected}, got {got}")
            }
            Self::Extension(e) => write!(f, "{e}"),
            Self::RecursionLimit { limit } => write!(f, "block invocation depth exceeded {limit}"),
        }
    }
}

impl std::error::Error for VmError {}

/// Single-line, stderr-renderable projection of a [`VmError`], per `spec.md` §7:
/// `<ErrorKind>: <detail> at <line>:<col>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub detail: String,
    pub span: Option<Span>,
}

impl From<&VmError> for Diagnostic {
    fn from(err: &VmError) -> Self {
        Self { kind: err.kind(), detail: err.to_string(), span: err.span() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{}: {} at {span}", self.kind, self.detail),
            None => write!(f, "{}: {}", self.kind, self.detail),
        }
    }
}
