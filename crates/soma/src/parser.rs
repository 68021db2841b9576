//! Token stream → instruction stream.
//!
//! Recursive-descent, one function per instruction-stream context
//! (`parse_program`, `parse_block`), walking a `Token` slice with a
//! `pos: usize` cursor - a hand-rolled shape that suits a grammar this small
//! and regular, with no need for a parser-generator dependency.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseErrorKind, RunResult, Span, VmError};
use crate::lexer::{Lexer, Path, Token, TokenKind};
use crate::value::{BlockId, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Instr {
    PushLiteral(Value),
    PushBlock(BlockId),
    PushPathValue(Path),
    PushCellRef(Path),
    Set(Path),
    SetRegisterRoot,
    Exec(Path),
    ExecTop,
}

/// Block literals in parse order, populated depth-first as `{ }` closes.
/// `BlockId(i)` indexes `blocks[i]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockTable {
    blocks: Vec<Rc<[Instr]>>,
}

impl BlockTable {
    #[must_use]
    pub fn get(&self, id: BlockId) -> &Rc<[Instr]> {
        &self.blocks[id.0 as usize]
    }

    #[must_use]
    pub fn len_u32(&self) -> u32 {
        u32::try_from(self.blocks.len()).expect("more block literals than u32::MAX")
    }

    fn push(&mut self, instrs: Vec<Instr>) -> BlockId {
        let id = BlockId(self.len_u32());
        self.blocks.push(Rc::from(instrs));
        id
    }

    /// Appends every block from `other`, shifting each `PushBlock` id it
    /// contains (and each id inside the top-level `instrs` a caller parsed
    /// alongside it) by this table's current length - used to merge a
    /// freshly parsed source unit (stdlib, an extension's setup source,
    /// the user program) into a `Vm`'s single running `BlockTable` without
    /// colliding ids. Returns the offset applied, so the caller can shift its
    /// own top-level instruction list with the same value before running it.
    pub fn merge(&mut self, other: BlockTable) -> u32 {
        let offset = self.len_u32();
        for body in other.blocks {
            let mut body = body.to_vec();
            shift_block_ids(&mut body, offset);
            self.blocks.push(Rc::from(body));
        }
        offset
    }
}

/// Adds `offset` to every `PushBlock` id appearing in `instrs`. See `BlockTable::merge`.
pub fn shift_block_ids(instrs: &mut [Instr], offset: u32) {
    for instr in instrs {
        if let Instr::PushBlock(id) = instr {
            id.0 += offset;
        }
    }
}

pub struct ParsedProgram {
    pub instrs: Vec<Instr>,
    pub blocks: BlockTable,
}

/// Lexes then parses `source` in one step. Convenience for tests and callers
/// that don't need the lex/parse split `runner::Runner` keeps separate.
pub fn parse(source: &str) -> RunResult<ParsedProgram> {
    let tokens = Lexer::new(source).tokenize().map_err(VmError::Lex)?;
    Parser::new(&tokens).parse_program().map_err(VmError::Parse)
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    blocks: BlockTable,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0, blocks: BlockTable::default() }
    }

    pub fn parse_program(mut self) -> Result<ParsedProgram, ParseError> {
        let instrs = self.parse_instrs_until_eof()?;
        Ok(ParsedProgram { instrs, blocks: self.blocks })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn parse_instrs_until_eof(&mut self) -> Result<Vec<Instr>, ParseError> {
        let mut instrs = Vec::new();
        loop {
            match &self.peek().kind {
                TokenKind::Eof => return Ok(instrs),
                TokenKind::BlockClose => {
                    let span = self.peek().span;
                    return Err(ParseError { kind: ParseErrorKind::UnmatchedBlockClose, span });
                }
                _ => instrs.push(self.parse_one()?),
            }
        }
    }

    /// Parses the contents of a `{ ... }` literal, which has already consumed
    /// `BlockOpen` by the time this runs; consumes the matching `BlockClose`.
    fn parse_block_body(&mut self, open_span: Span) -> Result<Vec<Instr>, ParseError> {
        let mut instrs = Vec::new();
        loop {
            match &self.peek().kind {
                TokenKind::Eof => {
                    return Err(ParseError { kind: ParseErrorKind::UnmatchedBlockOpen, span: open_span });
                }
                TokenKind::BlockClose => {
                    self.advance();
                    return Ok(instrs);
                }
                _ => instrs.push(self.parse_one()?),
            }
        }
    }

    fn parse_one(&mut self) -> Result<Instr, ParseError> {
        let tok = self.advance().clone();
        match tok.kind {
            TokenKind::Comment(_) => self.parse_one(),
            TokenKind::Str(s) => Ok(Instr::PushLiteral(Value::String(Rc::from(s.as_str())))),
            TokenKind::Int(n) => Ok(Instr::PushLiteral(Value::Int(n))),
            TokenKind::Nil => Ok(Instr::PushLiteral(Value::Nil)),
            TokenKind::Void => Ok(Instr::PushLiteral(Value::Void)),
            TokenKind::True => Ok(Instr::PushLiteral(Value::Bool(true))),
            TokenKind::False => Ok(Instr::PushLiteral(Value::Bool(false))),
            TokenKind::PathValue(p) => Ok(Instr::PushPathValue(p)),
            TokenKind::PathRef(p) => Ok(Instr::PushCellRef(p)),
            TokenKind::Set(p) => self.parse_set(p, tok.span),
            TokenKind::SetRegisterRoot => Ok(Instr::SetRegisterRoot),
            TokenKind::Exec(p) => self.parse_exec(p, tok.span),
            TokenKind::ExecTop => Ok(Instr::ExecTop),
            TokenKind::BlockOpen => {
                let body = self.parse_block_body(tok.span)?;
                let id = self.blocks.push(body);
                Ok(Instr::PushBlock(id))
            }
            TokenKind::BlockClose => Err(ParseError { kind: ParseErrorKind::UnmatchedBlockClose, span: tok.span }),
            TokenKind::Eof => Err(ParseError { kind: ParseErrorKind::UnexpectedEof, span: tok.span }),
        }
    }

    /// The lexer already rejects a trailing dot after `!`/`>` unless the path
    /// is exactly `_` (turning that one case into `SetRegisterRoot` before
    /// the parser ever sees it); anything reaching here is a plain path, so
    /// these two helpers exist for symmetry and to carry the span-bearing
    /// error path spec.md leaves implementation-defined.
    fn parse_set(&mut self, path: Path, _span: Span) -> Result<Instr, ParseError> {
        Ok(Instr::Set(path))
    }

    fn parse_exec(&mut self, path: Path, _span: Span) -> Result<Instr, ParseError> {
        Ok(Instr::Exec(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> ParsedProgram {
        parse(src).expect("parse")
    }

    #[test]
    fn literals_and_paths() {
        let p = parse_ok("42 (hi) Nil foo.bar");
        assert!(matches!(p.instrs[0], Instr::PushLiteral(Value::Int(42))));
        assert!(matches!(p.instrs[1], Instr::PushLiteral(Value::String(_))));
        assert!(matches!(p.instrs[2], Instr::PushLiteral(Value::Nil)));
        assert!(matches!(p.instrs[3], Instr::PushPathValue(_)));
    }

    #[test]
    fn nested_blocks_get_distinct_ids_depth_first() {
        let p = parse_ok("{ { } } { }");
        let Instr::PushBlock(outer) = p.instrs[0] else { panic!("expected block") };
        let Instr::PushBlock(third) = p.instrs[1] else { panic!("expected block") };
        assert_ne!(outer.0, third.0);
        let outer_body = p.blocks.get(outer);
        assert_eq!(outer_body.len(), 1);
    }

    #[test]
    fn identical_source_blocks_get_distinct_ids() {
        let p = parse_ok("{ 1 } { 1 }");
        let Instr::PushBlock(a) = p.instrs[0] else { panic!() };
        let Instr::PushBlock(b) = p.instrs[1] else { panic!() };
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn unmatched_open_is_parse_error() {
        let err = parse("{ 1 ").unwrap_err();
        assert!(matches!(err, VmError::Parse(ParseError { kind: ParseErrorKind::UnmatchedBlockOpen, .. })));
    }

    #[test]
    fn unmatched_close_is_parse_error() {
        let err = parse("1 }").unwrap_err();
        assert!(matches!(err, VmError::Parse(ParseError { kind: ParseErrorKind::UnmatchedBlockClose, .. })));
    }

    #[test]
    fn register_root_rebind_instr() {
        let p = parse_ok("!_.");
        assert!(matches!(p.instrs[0], Instr::SetRegisterRoot));
    }

    #[test]
    fn bare_exec_top() {
        let p = parse_ok("^");
        assert!(matches!(p.instrs[0], Instr::ExecTop));
    }
}
