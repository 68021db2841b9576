//! Source text → token stream.
//!
//! Hand-rolled recursive-descent-style scanner over `&str`, in the shape of a
//! small stack-language tokenizer (`Token { text/kind, line, column }`, a
//! `pos: usize` cursor) rather than a borrowed general-purpose parser - SOMA's
//! grammar is small and regular enough not to need one.

use crate::error::{LexError, LexErrorKind, Span};

/// One lexed path, already split on `.`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Path {
    pub segments: Vec<String>,
}

impl Path {
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    #[must_use]
    pub fn is_register_rooted(&self) -> bool {
        self.segments.first().is_some_and(|s| s == "_")
    }

    #[must_use]
    pub fn is_bare_register(&self) -> bool {
        self.segments.len() == 1 && self.segments[0] == "_"
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Comment(String),
    Str(String),
    Int(i64),
    Nil,
    Void,
    True,
    False,
    /// A plain path token: `a.b.c`. Evaluates to `PushPathValue`.
    PathValue(Path),
    /// A path token with a trailing dot: `a.b.c.`. Evaluates to `PushCellRef`.
    PathRef(Path),
    /// `!path` - binds the top of the AL into the addressed cell.
    Set(Path),
    /// `!_.` - the context-passing idiom: rebind the Register root.
    SetRegisterRoot,
    /// `>path` - executes or pushes the addressed cell's value.
    Exec(Path),
    BlockOpen,
    BlockClose,
    /// Bare `^` - execute the Block on top of the AL.
    ExecTop,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Characters that may never appear inside a path segment: they are
/// structural sigils (setter, executor, block delimiters, path separator,
/// string delimiters) reserved by the grammar. Every other non-whitespace,
/// non-digit-leading character is available as a one-char "operator segment"
/// (`+`, `-`, `*`, `/`, `%`, `<`, `=`, `^`, ...) - see DESIGN.md's "operator
/// naming" note for why multi-char symbolic segments (`==`, `!=`, `>=`,
/// `<=`) are not supported: their first character would collide with a
/// reserved sigil. `^` is deliberately *not* reserved: bare `^` is caught by
/// its own dispatch arm in `tokenize` before path-lexing ever runs, which
/// leaves `^` free to double as the one-char Store path `!^`/`>^` name that
/// the `^` builtin is registered under (SPEC_FULL §4.3's uniform-dispatch
/// design - `chain`'s generated code execs `^` by path like any other
/// rebindable control-flow primitive).
const RESERVED: &[char] = &['!', '>', '{', '}', '.', '(', ')'];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_operator_char(c: char) -> bool {
    !c.is_whitespace() && !RESERVED.contains(&c) && !c.is_ascii_alphanumeric() && c != '#'
}

pub struct Lexer<'a> {
    src: &'a [u8],
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Self { src: src.as_bytes(), chars: src.chars().collect(), pos: 0, line: 1, col: 1 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.col)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Tokenizes the whole source, always terminating with `TokenKind::Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.span();
            let Some(c) = self.peek() else {
                tokens.push(Token { kind: TokenKind::Eof, span: start });
                break;
            };
            let kind = match c {
                ')' => self.lex_comment(),
                '(' => self.lex_string()?,
                '{' => {
                    self.advance();
                    TokenKind::BlockOpen
                }
                '}' => {
                    self.advance();
                    TokenKind::BlockClose
                }
                '!' => {
                    self.advance();
                    self.lex_set()?
                }
                '>' => {
                    self.advance();
                    self.lex_exec()?
                }
                '^' if !self.peek_at(1).is_some_and(is_operator_char) => {
                    self.advance();
                    TokenKind::ExecTop
                }
                '-' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => self.lex_int(),
                _ if c.is_ascii_digit() => self.lex_int(),
                _ if is_ident_start(c) || c == '#' || is_operator_char(c) => self.lex_bare_path()?,
                _ => {
                    self.advance();
                    return Err(LexError { kind: LexErrorKind::UnexpectedChar(c), span: start });
                }
            };
            tokens.push(Token { kind, span: start });
        }
        Ok(tokens)
    }

    fn lex_comment(&mut self) -> TokenKind {
        self.advance(); // ')'
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        TokenKind::Comment(text)
    }

    /// String literal: `(` ... `)`, with `\HEX\` escapes and unescaped `)` closing.
    /// A literal `(` inside the string is just a character - nesting is not recognised.
    fn lex_string(&mut self) -> Result<TokenKind, LexError> {
        let start = self.span();
        self.advance(); // '('
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(LexError { kind: LexErrorKind::UnterminatedString, span: start }),
                Some(')') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    let esc_start = self.span();
                    self.advance();
                    let mut hex = String::new();
                    while matches!(self.peek(), Some(h) if h.is_ascii_hexdigit()) {
                        hex.push(self.advance().expect("checked by match guard"));
                    }
                    if hex.is_empty() || self.peek() != Some('\\') {
                        return Err(LexError { kind: LexErrorKind::UnterminatedEscape, span: esc_start });
                    }
                    self.advance(); // closing '\'
                    let code = u32::from_str_radix(&hex, 16)
                        .map_err(|_| LexError { kind: LexErrorKind::InvalidEscape(hex.clone()), span: esc_start })?;
                    let ch = char::from_u32(code)
                        .ok_or(LexError { kind: LexErrorKind::InvalidCodepoint(code), span: esc_start })?;
                    out.push(ch);
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
        Ok(TokenKind::Str(out))
    }

    fn lex_int(&mut self) -> TokenKind {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(self.advance().expect("checked by match guard"));
        }
        // Overflow wraps per the documented fixed-width Int policy (SPEC_FULL §3.1).
        let value = text.parse::<i64>().unwrap_or_else(|_| {
            let magnitude: u64 = text.trim_start_matches('-').parse().unwrap_or(u64::MAX);
            if text.starts_with('-') { (magnitude as i64).wrapping_neg() } else { magnitude as i64 }
        });
        TokenKind::Int(value)
    }

    fn lex_segment(&mut self) -> String {
        let mut seg = String::new();
        if self.peek() == Some('#') {
            seg.push('#');
            self.advance();
        }
        if matches!(self.peek(), Some(c) if is_operator_char(c)) && seg.is_empty() {
            seg.push(self.advance().expect("checked by match guard"));
            return seg;
        }
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            seg.push(self.advance().expect("checked by match guard"));
        }
        seg
    }

    /// Lexes a dot-separated path starting at the current position.
    /// Returns `(segments, trailing_dot)`.
    fn lex_path_segments(&mut self) -> (Vec<String>, bool) {
        let mut segments = vec![self.lex_segment()];
        loop {
            if self.peek() == Some('.') {
                if self.peek_at(1).is_some_and(|c| is_ident_start(c) || c == '#' || is_operator_char(c)) {
                    self.advance();
                    segments.push(self.lex_segment());
                    continue;
                }
                self.advance(); // consume trailing '.'
                return (segments, true);
            }
            return (segments, false);
        }
    }

    fn lex_bare_path(&mut self) -> Result<TokenKind, LexError> {
        let (segments, trailing_dot) = self.lex_path_segments();
        let path = self.resolve_reserved_word(&segments);
        if let Some(kind) = path {
            return Ok(kind);
        }
        let path = Path::new(segments);
        Ok(if trailing_dot { TokenKind::PathRef(path) } else { TokenKind::PathValue(path) })
    }

    fn resolve_reserved_word(&self, segments: &[String]) -> Option<TokenKind> {
        if segments.len() != 1 {
            return None;
        }
        match segments[0].as_str() {
            "Nil" => Some(TokenKind::Nil),
            "Void" => Some(TokenKind::Void),
            "True" => Some(TokenKind::True),
            "False" => Some(TokenKind::False),
            _ => None,
        }
    }

    fn lex_set(&mut self) -> Result<TokenKind, LexError> {
        let (segments, trailing_dot) = self.lex_path_segments();
        if trailing_dot {
            if segments.len() == 1 && segments[0] == "_" {
                return Ok(TokenKind::SetRegisterRoot);
            }
            let span = self.span();
            return Err(LexError { kind: LexErrorKind::InvalidEscape(format!("!{}.", segments.join("."))), span });
        }
        Ok(TokenKind::Set(Path::new(segments)))
    }

    fn lex_exec(&mut self) -> Result<TokenKind, LexError> {
        let (segments, trailing_dot) = self.lex_path_segments();
        if trailing_dot {
            let span = self.span();
            return Err(LexError { kind: LexErrorKind::InvalidEscape(format!(">{}.", segments.join("."))), span });
        }
        Ok(TokenKind::Exec(Path::new(segments)))
    }
}
