//! JavaScript minification: a single-pass tokenizer that tracks two
//! explicit stacks — curly-brace blocks and round-bracket groups — each
//! classified by the role it plays, so that semicolons, redundant braces,
//! and whitespace can be dropped without losing statement boundaries.

use crate::common::{is_whitespace, skip_whitespace_comments};
use crate::error::{MinifyError, MinifyResult};
use std::collections::HashSet;

fn is_ident_delim(b: u8) -> bool {
    matches!(
        b,
        b'\'' | b'"'
            | b'`'
            | b'%'
            | b'<'
            | b'>'
            | b'+'
            | b'*'
            | b'/'
            | b'-'
            | b'='
            | b','
            | b'('
            | b')'
            | b'{'
            | b'}'
            | b'['
            | b']'
            | b'!'
            | b'~'
            | b';'
            | b'|'
            | b'&'
            | b'^'
            | b':'
            | b'?'
            | b' '
            | b'\t'
            | b'\r'
            | b'\n'
    )
}

fn in_nl_left(b: u8) -> bool {
    matches!(
        b,
        b'.' | b'(' | b'[' | b'{' | b';' | b'=' | b'*' | b'-' | b'+' | b'^' | b'!' | b'~' | b'?'
            | b':' | b',' | b'>' | b'<' | b'/' | b'|' | b'&'
    )
}

fn in_nl_right(b: u8) -> bool {
    matches!(
        b,
        b')' | b']' | b'}' | b'.' | b';' | b'=' | b'*' | b'^' | b'?' | b':' | b',' | b'>' | b'<'
            | b'|' | b'&'
    )
}

fn in_plain_set(b: u8) -> bool {
    matches!(
        b,
        b'.' | b'(' | b')' | b'[' | b']' | b'{' | b'}' | b',' | b'=' | b'*' | b';' | b'?' | b'!'
            | b':' | b'>' | b'<' | b'-' | b'+' | b'\'' | b'"' | b'/' | b'|' | b'&'
    )
}

fn ascii_ieq_bytes(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_ascii_lowercase() == y.to_ascii_lowercase())
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum CurlyKind {
    Unknown,
    Do,
    TryFinally,
    Standalone,
    FuncBody,
    FuncBodyStandalone,
    ConditionBody,
    StringInterpolation,
    ArrowFuncBody,
    /// A `switch(...)`/`catch(...)` (or bindingless `catch`) body. Unlike
    /// `if`/`while`/`for`, these always require a literal `{...}` block —
    /// an empty body can't collapse to `;` and a single-statement body
    /// can't drop its braces.
    RequiredBlock,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum RoundKind {
    DoWhile,
    PrefixedCondition,
    Unknown,
    CatchSwitch,
    Param,
    ParamStandalone,
    ParamArrowFuncSingle,
}

struct CurlyFrame {
    kind: CurlyKind,
    do_pending: u32,
    open_offset: usize,
}

struct RoundFrame {
    kind: RoundKind,
    open_offset: usize,
}

/// Minifies a JavaScript source text.
pub fn minify_js(js: &str) -> MinifyResult {
    let mut state = State::new(js.as_bytes());
    state.run()?;
    Ok(String::from_utf8(state.out).expect("output reuses valid UTF-8 input bytes"))
}

struct State<'a> {
    input: &'a [u8],
    len: usize,
    pos: usize,
    out: Vec<u8>,
    curly: Vec<CurlyFrame>,
    round: Vec<RoundFrame>,
    last_closed_curly: Option<CurlyKind>,
    last_closed_round: Option<RoundKind>,
    /// Positions (in the original input) of `}` bytes that close a
    /// condition body whose braces were elided because the body turned
    /// out to be a single statement; the main loop silently swallows
    /// them when it reaches that position.
    suppressed_closes: HashSet<usize>,
}

impl<'a> State<'a> {
    fn new(input: &'a [u8]) -> Self {
        State {
            input,
            len: input.len(),
            pos: 0,
            out: Vec::with_capacity(input.len()),
            curly: vec![CurlyFrame {
                kind: CurlyKind::Standalone,
                do_pending: 0,
                open_offset: 0,
            }],
            round: vec![RoundFrame {
                kind: RoundKind::Unknown,
                open_offset: 0,
            }],
            last_closed_curly: None,
            last_closed_round: None,
            suppressed_closes: HashSet::new(),
        }
    }

    fn word_len(&self, start: usize) -> usize {
        let mut i = start;
        while i < self.len && !is_ident_delim(self.input[i]) {
            i += 1;
        }
        i - start
    }

    fn looks_like_close_script(&self) -> bool {
        self.pos + 7 <= self.len && ascii_ieq_bytes(&self.input[self.pos..self.pos + 7], b"/script")
    }

    fn push_separator(&mut self, contained_newline: bool, last: Option<u8>, next: u8) {
        let l = match last {
            Some(l) => l,
            None => return,
        };
        if contained_newline {
            if in_nl_left(l) || in_nl_right(next) {
                return;
            }
            self.out.push(b'\n');
        } else {
            if l == b'<' && self.looks_like_close_script() {
                self.out.push(b' ');
                return;
            }
            if in_plain_set(l) || in_plain_set(next) {
                return;
            }
            self.out.push(b' ');
        }
    }

    fn collapse_trivia(&mut self) -> Result<(), MinifyError> {
        let r = skip_whitespace_comments(self.input, self.pos, true, Some(&mut self.out))?;
        self.pos = r.next;
        if self.pos < self.len {
            let next = self.input[self.pos];
            let last = self.out.last().copied();
            self.push_separator(r.contained_newline, last, next);
        }
        Ok(())
    }

    fn push_punct(&mut self, b: u8) {
        if (b == b'+' && self.out.last() == Some(&b'+')) || (b == b'-' && self.out.last() == Some(&b'-')) {
            self.out.push(b' ');
        }
        self.out.push(b);
    }

    /// Skips past whitespace/comments and any `}` already known to be a
    /// suppressed (elided) brace, returning the position of the next byte
    /// that will genuinely remain in the output stream.
    fn peek_past_suppressed(&self, mut pos: usize) -> Result<usize, MinifyError> {
        loop {
            let r = skip_whitespace_comments(self.input, pos, true, None)?;
            pos = r.next;
            if pos < self.len && self.input[pos] == b'}' && self.suppressed_closes.contains(&pos) {
                pos += 1;
                continue;
            }
            return Ok(pos);
        }
    }

    fn peek_empty_brace_at(&self, brace_pos: usize) -> Result<Option<usize>, MinifyError> {
        let r = skip_whitespace_comments(self.input, brace_pos + 1, true, None)?;
        if r.skipped_all_comments && self.input.get(r.next) == Some(&b'}') {
            Ok(Some(r.next + 1))
        } else {
            Ok(None)
        }
    }

    /// Read-only scan from `open_pos` (a `{`) to its matching `}`, deciding
    /// whether the body amounts to a single statement (zero or one
    /// top-level `;`, with nothing but trivia following that `;`). Returns
    /// the matching `}`'s offset when it qualifies.
    fn peek_single_statement_brace(&self, open_pos: usize) -> Option<usize> {
        let mut i = open_pos + 1;
        let mut depth: i32 = 0;
        let mut semicolons = 0u32;
        let mut trailing_clean = true;
        loop {
            if i >= self.len {
                return None;
            }
            let c = self.input[i];
            if c == b'/' && self.input.get(i + 1) == Some(&b'/') {
                while i < self.len && self.input[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            if c == b'/' && self.input.get(i + 1) == Some(&b'*') {
                i += 2;
                while i + 1 < self.len && !(self.input[i] == b'*' && self.input[i + 1] == b'/') {
                    i += 1;
                }
                if i + 1 >= self.len {
                    return None;
                }
                i += 2;
                continue;
            }
            if c == b'"' || c == b'\'' || c == b'`' {
                let quote = c;
                i += 1;
                let mut active_backslash = false;
                loop {
                    if i >= self.len {
                        return None;
                    }
                    let cc = self.input[i];
                    if cc == quote && !active_backslash {
                        i += 1;
                        break;
                    }
                    active_backslash = cc == b'\\' && !active_backslash;
                    i += 1;
                }
                continue;
            }
            match c {
                b'{' | b'(' | b'[' => {
                    depth += 1;
                    i += 1;
                }
                b'}' => {
                    if depth == 0 {
                        return if semicolons <= 1 && (semicolons == 0 || trailing_clean) {
                            Some(i)
                        } else {
                            None
                        };
                    }
                    depth -= 1;
                    i += 1;
                }
                b')' | b']' => {
                    if depth == 0 {
                        return None;
                    }
                    depth -= 1;
                    i += 1;
                }
                b';' if depth == 0 => {
                    semicolons += 1;
                    if semicolons > 1 {
                        return None;
                    }
                    trailing_clean = true;
                    i += 1;
                }
                other if depth == 0 && semicolons == 1 && !is_whitespace(other) => {
                    trailing_clean = false;
                    i += 1;
                }
                _ => {
                    i += 1;
                }
            }
        }
    }

    fn open_condition_body_nonempty(&mut self) -> Result<(), MinifyError> {
        if let Some(close_pos) = self.peek_single_statement_brace(self.pos) {
            self.pos += 1;
            self.suppressed_closes.insert(close_pos);
            return Ok(());
        }
        let off = self.pos;
        self.out.push(b'{');
        self.pos += 1;
        self.curly.push(CurlyFrame {
            kind: CurlyKind::ConditionBody,
            do_pending: 0,
            open_offset: off,
        });
        Ok(())
    }

    fn open_condition_body(&mut self) -> Result<(), MinifyError> {
        if let Some(after_close) = self.peek_empty_brace_at(self.pos)? {
            self.pos = after_close;
            self.out.push(b';');
            return Ok(());
        }
        self.open_condition_body_nonempty()
    }

    fn peek_single_arrow_param(&self) -> Result<bool, MinifyError> {
        let r1 = skip_whitespace_comments(self.input, self.pos + 1, true, None)?;
        let id_start = r1.next;
        if id_start >= self.len || self.input[id_start] == b'.' {
            return Ok(false);
        }
        let idlen = self.word_len(id_start);
        if idlen == 0 {
            return Ok(false);
        }
        let r2 = skip_whitespace_comments(self.input, id_start + idlen, true, None)?;
        if self.input.get(r2.next) != Some(&b')') {
            return Ok(false);
        }
        let r3 = skip_whitespace_comments(self.input, r2.next + 1, true, None)?;
        Ok(self.input.get(r3.next) == Some(&b'=') && self.input.get(r3.next + 1) == Some(&b'>'))
    }

    fn handle_word(&mut self) -> Result<(), MinifyError> {
        let start = self.pos;
        let wlen = self.word_len(start);
        let word_owned: Vec<u8> = self.input[start..start + wlen].to_vec();
        let word: &[u8] = &word_owned;

        let peek = skip_whitespace_comments(self.input, start + wlen, true, None)?;
        if self.input.get(peek.next) == Some(&b':') {
            self.out.extend_from_slice(word);
            self.pos = start + wlen;
            return Ok(());
        }

        let prev_closed = self.last_closed_curly.take();

        match word {
            b"switch" | b"catch" => self.kw_switch_catch(word)?,
            b"do" => self.kw_do()?,
            b"try" | b"finally" => self.kw_try_finally(word)?,
            b"function" => self.kw_function()?,
            b"while" => self.kw_while(prev_closed)?,
            b"if" | b"for" => self.kw_if_for(word)?,
            b"else" => self.kw_else()?,
            b"true" => self.kw_bool(true),
            b"false" => self.kw_bool(false),
            _ => {
                self.out.extend_from_slice(word);
                self.pos = start + wlen;
            }
        }
        Ok(())
    }

    fn kw_bool(&mut self, value: bool) {
        if self.out.last() == Some(&b' ') {
            self.out.pop();
        }
        self.out.push(b'!');
        self.out.push(if value { b'0' } else { b'1' });
        self.pos += if value { 4 } else { 5 };
    }

    fn expect_and_push_round(&mut self, kind: RoundKind, err: &str) -> Result<(), MinifyError> {
        self.collapse_trivia()?;
        if self.input.get(self.pos) != Some(&b'(') {
            return Err(MinifyError::new(err.to_string(), self.pos));
        }
        let off = self.pos;
        self.out.push(b'(');
        self.pos += 1;
        self.round.push(RoundFrame { kind, open_offset: off });
        Ok(())
    }

    fn kw_switch_catch(&mut self, word: &[u8]) -> Result<(), MinifyError> {
        self.out.extend_from_slice(word);
        self.pos += word.len();
        let peek = skip_whitespace_comments(self.input, self.pos, true, None)?;
        match self.input.get(peek.next) {
            Some(b'(') => self.expect_and_push_round(
                RoundKind::CatchSwitch,
                "Expected ( or { in line %d, column %d",
            ),
            Some(b'{') => {
                self.collapse_trivia()?;
                self.open_required_block()
            }
            _ => Err(MinifyError::new(
                "Expected ( or { in line %d, column %d",
                peek.next,
            )),
        }
    }

    /// Opens a literal `{...}` block that can never be brace-elided, for
    /// `switch`/`catch` bodies.
    fn open_required_block(&mut self) -> Result<(), MinifyError> {
        if self.input.get(self.pos) != Some(&b'{') {
            return Err(MinifyError::new("Expected { in line %d, column %d", self.pos));
        }
        let off = self.pos;
        self.out.push(b'{');
        self.pos += 1;
        self.curly.push(CurlyFrame {
            kind: CurlyKind::RequiredBlock,
            do_pending: 0,
            open_offset: off,
        });
        Ok(())
    }

    fn kw_do(&mut self) -> Result<(), MinifyError> {
        self.out.extend_from_slice(b"do");
        self.pos += 2;
        let peek = skip_whitespace_comments(self.input, self.pos, true, None)?;
        if self.input.get(peek.next) == Some(&b'{') {
            if let Some(after_close) = self.peek_empty_brace_at(peek.next)? {
                self.pos = after_close;
                self.out.push(b';');
                if let Some(top) = self.curly.last_mut() {
                    top.do_pending += 1;
                }
                return Ok(());
            }
            self.collapse_trivia()?;
            let off = self.pos;
            self.out.push(b'{');
            self.pos += 1;
            self.curly.push(CurlyFrame {
                kind: CurlyKind::Do,
                do_pending: 0,
                open_offset: off,
            });
            return Ok(());
        }
        self.collapse_trivia()?;
        if let Some(top) = self.curly.last_mut() {
            top.do_pending += 1;
        }
        Ok(())
    }

    fn kw_try_finally(&mut self, word: &[u8]) -> Result<(), MinifyError> {
        self.out.extend_from_slice(word);
        self.pos += word.len();
        self.collapse_trivia()?;
        if self.input.get(self.pos) != Some(&b'{') {
            return Err(MinifyError::new("Expected { in line %d, column %d", self.pos));
        }
        let off = self.pos;
        self.out.push(b'{');
        self.pos += 1;
        self.curly.push(CurlyFrame {
            kind: CurlyKind::TryFinally,
            do_pending: 0,
            open_offset: off,
        });
        Ok(())
    }

    fn kw_function(&mut self) -> Result<(), MinifyError> {
        let last = self.out.last().copied();
        let standalone = last.is_none() || matches!(last, Some(b';') | Some(b'}') | Some(b'{'));
        self.out.extend_from_slice(b"function");
        self.pos += 8;
        self.collapse_trivia()?;
        if self.input.get(self.pos) == Some(&b'*') {
            self.out.push(b'*');
            self.pos += 1;
            self.collapse_trivia()?;
        }
        if let Some(&b) = self.input.get(self.pos) {
            if !is_ident_delim(b) {
                let wlen = self.word_len(self.pos);
                self.out.extend_from_slice(&self.input[self.pos..self.pos + wlen]);
                self.pos += wlen;
                self.collapse_trivia()?;
            }
        }
        if self.input.get(self.pos) != Some(&b'(') {
            return Err(MinifyError::new("Expected ( in line %d, column %d", self.pos));
        }
        let off = self.pos;
        self.out.push(b'(');
        self.pos += 1;
        self.round.push(RoundFrame {
            kind: if standalone {
                RoundKind::ParamStandalone
            } else {
                RoundKind::Param
            },
            open_offset: off,
        });
        Ok(())
    }

    fn kw_while(&mut self, prev_closed: Option<CurlyKind>) -> Result<(), MinifyError> {
        self.out.extend_from_slice(b"while");
        self.pos += 5;
        self.collapse_trivia()?;
        if self.input.get(self.pos) != Some(&b'(') {
            return Err(MinifyError::new("Expected ( in line %d, column %d", self.pos));
        }
        let off = self.pos;
        self.out.push(b'(');
        self.pos += 1;
        let do_pending_top = self.curly.last().map(|f| f.do_pending).unwrap_or(0);
        let kind = if prev_closed == Some(CurlyKind::Do) || do_pending_top > 0 {
            if do_pending_top > 0 {
                if let Some(top) = self.curly.last_mut() {
                    top.do_pending -= 1;
                }
            }
            RoundKind::DoWhile
        } else {
            RoundKind::PrefixedCondition
        };
        self.round.push(RoundFrame { kind, open_offset: off });
        Ok(())
    }

    fn kw_if_for(&mut self, word: &[u8]) -> Result<(), MinifyError> {
        self.out.extend_from_slice(word);
        self.pos += word.len();
        self.expect_and_push_round(RoundKind::PrefixedCondition, "Expected ( in line %d, column %d")
    }

    fn kw_else(&mut self) -> Result<(), MinifyError> {
        self.out.extend_from_slice(b"else");
        self.pos += 4;
        let peek = skip_whitespace_comments(self.input, self.pos, true, None)?;
        if self.input.get(peek.next) != Some(&b'{') {
            self.collapse_trivia()?;
            return Ok(());
        }
        let brace_pos = peek.next;
        if let Some(after_close) = self.peek_empty_brace_at(brace_pos)? {
            self.pos = after_close;
            self.out.push(b';');
            loop {
                let r = skip_whitespace_comments(self.input, self.pos, true, Some(&mut self.out))?;
                self.pos = r.next;
                if self.input.get(self.pos) == Some(&b';') {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            return Ok(());
        }
        if let Some(close_pos) = self.peek_single_statement_brace(brace_pos) {
            let inner = skip_whitespace_comments(self.input, brace_pos + 1, true, Some(&mut self.out))?;
            self.pos = inner.next;
            self.suppressed_closes.insert(close_pos);
            if self.pos < self.len {
                let next = self.input[self.pos];
                let last = self.out.last().copied();
                self.push_separator(inner.contained_newline, last, next);
            }
            return Ok(());
        }
        self.collapse_trivia()?;
        let off = self.pos;
        self.out.push(b'{');
        self.pos += 1;
        self.curly.push(CurlyFrame {
            kind: CurlyKind::ConditionBody,
            do_pending: 0,
            open_offset: off,
        });
        Ok(())
    }

    fn handle_open_curly(&mut self) -> Result<(), MinifyError> {
        let last = self.out.last().copied();
        let is_condition_context =
            last == Some(b')') && self.last_closed_round == Some(RoundKind::PrefixedCondition);
        if is_condition_context {
            return self.open_condition_body();
        }
        if last == Some(b')') && self.last_closed_round == Some(RoundKind::CatchSwitch) {
            return self.open_required_block();
        }

        let last2 = if self.out.len() >= 2 {
            Some(self.out[self.out.len() - 2])
        } else {
            None
        };
        let is_arrow = last == Some(b'>') && last2 == Some(b'=');

        let kind = if is_arrow {
            CurlyKind::ArrowFuncBody
        } else if last == Some(b')') {
            match self.last_closed_round {
                Some(RoundKind::Param) => CurlyKind::FuncBody,
                Some(RoundKind::ParamStandalone) => CurlyKind::FuncBodyStandalone,
                _ => CurlyKind::Unknown,
            }
        } else if matches!(last, Some(b'}') | Some(b';') | Some(b'{') | Some(b'\n') | None) {
            CurlyKind::Standalone
        } else {
            CurlyKind::Unknown
        };

        let off = self.pos;
        self.out.push(b'{');
        self.pos += 1;
        self.curly.push(CurlyFrame {
            kind,
            do_pending: 0,
            open_offset: off,
        });
        Ok(())
    }

    fn handle_close_curly(&mut self) -> Result<(), MinifyError> {
        if self.curly.len() <= 1 {
            return Err(MinifyError::new("Unexpected } in line %d, column %d", self.pos));
        }
        if self.curly.last().unwrap().do_pending > 0 {
            return Err(MinifyError::new(
                "Unclosed do block before } in line %d, column %d",
                self.pos,
            ));
        }
        let frame = self.curly.pop().unwrap();
        self.pos += 1;
        self.last_closed_curly = Some(frame.kind);
        self.out.push(b'}');
        if frame.kind == CurlyKind::StringInterpolation {
            let start = self.pos;
            self.scan_string_body(b'`', start)?;
        }
        Ok(())
    }

    fn handle_open_round(&mut self) -> Result<(), MinifyError> {
        let is_arrow_single = self.peek_single_arrow_param()?;
        let off = self.pos;
        if !is_arrow_single {
            self.out.push(b'(');
        }
        self.pos += 1;
        self.round.push(RoundFrame {
            kind: if is_arrow_single {
                RoundKind::ParamArrowFuncSingle
            } else {
                RoundKind::Unknown
            },
            open_offset: off,
        });
        Ok(())
    }

    fn handle_close_round(&mut self) -> Result<(), MinifyError> {
        if self.round.len() <= 1 {
            return Err(MinifyError::new("Unexpected ) in line %d, column %d", self.pos));
        }
        let frame = self.round.pop().unwrap();
        self.last_closed_round = Some(frame.kind);
        self.pos += 1;
        if frame.kind != RoundKind::ParamArrowFuncSingle {
            self.out.push(b')');
        }
        Ok(())
    }

    fn handle_semicolon(&mut self) -> Result<(), MinifyError> {
        if self.out.is_empty() {
            self.pos += 1;
            return Ok(());
        }
        if self.round.last().map(|f| f.kind) == Some(RoundKind::PrefixedCondition) {
            self.out.push(b';');
            self.pos += 1;
            return Ok(());
        }
        let prev = self.out.last().copied();
        self.pos += 1;
        loop {
            let r = skip_whitespace_comments(self.input, self.pos, true, None)?;
            if self.input.get(r.next) == Some(&b';') {
                self.pos = r.next + 1;
            } else {
                self.pos = r.next;
                break;
            }
        }
        let real_next_pos = self.peek_past_suppressed(self.pos)?;
        let next = self.input.get(real_next_pos).copied();

        let closing_prefixed_cond =
            prev == Some(b')') && self.last_closed_round == Some(RoundKind::PrefixedCondition);
        let cond_a = (next.is_none() || next == Some(b'}')) && !closing_prefixed_cond;
        let cond_b = prev == Some(b'}')
            && matches!(
                self.last_closed_curly,
                Some(CurlyKind::FuncBodyStandalone) | Some(CurlyKind::Standalone)
            );
        let cond_c = prev == Some(b')') && self.last_closed_round == Some(RoundKind::DoWhile);

        if !(cond_a || cond_b || cond_c) {
            self.out.push(b';');
        }
        Ok(())
    }

    fn is_regex_start(&self) -> bool {
        match self.out.last() {
            None => true,
            Some(&last) => {
                if matches!(
                    last,
                    b'^' | b'!'
                        | b'&'
                        | b'|'
                        | b'('
                        | b'['
                        | b'{'
                        | b'>'
                        | b'<'
                        | b'+'
                        | b'-'
                        | b'*'
                        | b'%'
                        | b':'
                        | b'?'
                        | b'~'
                        | b','
                        | b';'
                        | b'='
                ) {
                    return true;
                }
                self.out.len() >= 2 && self.out[self.out.len() - 2] == b'<' && last == b' '
            }
        }
    }

    fn handle_slash(&mut self) -> Result<(), MinifyError> {
        if self.is_regex_start() {
            self.scan_regex()
        } else {
            self.push_punct(b'/');
            self.pos += 1;
            Ok(())
        }
    }

    fn scan_regex(&mut self) -> Result<(), MinifyError> {
        let start = self.pos;
        self.out.push(b'/');
        self.pos += 1;
        let mut active_backslash = false;
        let mut in_class = false;
        loop {
            if self.pos >= self.len {
                return Err(MinifyError::new(
                    "Unclosed regular expression starting in line %d, column %d",
                    start,
                ));
            }
            let c = self.input[self.pos];
            if c == b'\n' {
                return Err(MinifyError::new(
                    "Unexpected line break in regular expression starting in line %d, column %d",
                    start,
                ));
            }
            if c == b'/' && !active_backslash && !in_class {
                self.out.push(c);
                self.pos += 1;
                let flag_start = self.pos;
                let mut flag_end = flag_start;
                while flag_end < self.len && self.input[flag_end].is_ascii_alphabetic() {
                    flag_end += 1;
                }
                self.out.extend_from_slice(&self.input[flag_start..flag_end]);
                self.pos = flag_end;
                return Ok(());
            }
            if !active_backslash {
                if c == b'[' {
                    in_class = true;
                } else if c == b']' {
                    in_class = false;
                }
            }
            active_backslash = c == b'\\' && !active_backslash;
            self.out.push(c);
            self.pos += 1;
        }
    }

    fn maybe_escape_close_script(&mut self) {
        let n = self.out.len();
        if n >= 8 && ascii_ieq_bytes(&self.out[n - 8..], b"</script") {
            self.out.insert(n - 7, b'\\');
        }
    }

    fn handle_string(&mut self, quote: u8) -> Result<(), MinifyError> {
        let start = self.pos;
        self.out.push(quote);
        self.pos += 1;
        self.scan_string_body(quote, start)
    }

    fn scan_string_body(&mut self, quote: u8, start: usize) -> Result<(), MinifyError> {
        let mut active_backslash = false;
        loop {
            if self.pos >= self.len {
                return Err(MinifyError::new(
                    "Unclosed string starting in line %d, column %d",
                    start,
                ));
            }
            let c = self.input[self.pos];
            if c == quote && !active_backslash {
                self.out.push(c);
                self.pos += 1;
                self.maybe_escape_close_script();
                return self.maybe_merge_concatenated_string(quote);
            }
            if quote == b'`' && c == b'$' && !active_backslash && self.input.get(self.pos + 1) == Some(&b'{') {
                self.out.push(b'$');
                self.out.push(b'{');
                let off = self.pos;
                self.pos += 2;
                self.curly.push(CurlyFrame {
                    kind: CurlyKind::StringInterpolation,
                    do_pending: 0,
                    open_offset: off,
                });
                return Ok(());
            }
            if c == b'\n' {
                if active_backslash {
                    self.out.pop();
                    self.pos += 1;
                    active_backslash = false;
                    self.maybe_escape_close_script();
                    continue;
                } else if quote != b'`' {
                    return Err(MinifyError::new(
                        "Unescaped line break in string starting in line %d, column %d",
                        start,
                    ));
                }
            }
            active_backslash = c == b'\\' && !active_backslash;
            self.out.push(c);
            self.pos += 1;
            self.maybe_escape_close_script();
        }
    }

    fn maybe_merge_concatenated_string(&mut self, quote: u8) -> Result<(), MinifyError> {
        let r1 = skip_whitespace_comments(self.input, self.pos, true, None)?;
        if !r1.skipped_all_comments || self.input.get(r1.next) != Some(&b'+') {
            return Ok(());
        }
        let r2 = skip_whitespace_comments(self.input, r1.next + 1, true, None)?;
        if !r2.skipped_all_comments || self.input.get(r2.next) != Some(&quote) {
            return Ok(());
        }
        self.out.pop();
        self.pos = r2.next + 1;
        let start = self.pos;
        self.scan_string_body(quote, start)
    }

    fn run(&mut self) -> Result<(), MinifyError> {
        loop {
            if self.pos >= self.len {
                if self.round.len() > 1 {
                    let off = self.round.last().unwrap().open_offset;
                    return Err(MinifyError::new(
                        "Unexpected end of document, expected ) in line %d, column %d",
                        off,
                    ));
                }
                if self.curly.len() > 1 {
                    let off = self.curly.last().unwrap().open_offset;
                    return Err(MinifyError::new(
                        "Unexpected end of document, expected } in line %d, column %d",
                        off,
                    ));
                }
                return Ok(());
            }
            let ch = self.input[self.pos];

            if ch == b'}' && self.suppressed_closes.remove(&self.pos) {
                self.pos += 1;
                continue;
            }

            if is_whitespace(ch)
                || (ch == b'/' && matches!(self.input.get(self.pos + 1), Some(b'/') | Some(b'*')))
            {
                self.collapse_trivia()?;
                continue;
            }

            if !is_ident_delim(ch) {
                self.handle_word()?;
                continue;
            }

            match ch {
                b'{' => self.handle_open_curly()?,
                b'}' => self.handle_close_curly()?,
                b'(' => self.handle_open_round()?,
                b')' => self.handle_close_round()?,
                b';' => self.handle_semicolon()?,
                b'"' | b'\'' => self.handle_string(ch)?,
                b'`' => self.handle_string(b'`')?,
                b'/' => self.handle_slash()?,
                other => {
                    self.push_punct(other);
                    self.pos += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn if_else_strips_single_statement_braces() {
        let js = "if (x) { y = true ; } else { y = false ; }";
        assert_eq!(minify_js(js).unwrap(), "if(x)y=!0;else y=!1");
    }

    #[test]
    fn regex_vs_division_disambiguation() {
        let js = "a = b / c ; d = /ab+/.test(e)";
        assert_eq!(minify_js(js).unwrap(), "a=b/c;d=/ab+/.test(e)");
    }

    #[test]
    fn function_declaration_and_return_true() {
        let js = "function f(){ return true; }";
        assert_eq!(minify_js(js).unwrap(), "function f(){return!0}");
    }

    #[test]
    fn object_key_named_true_is_not_replaced() {
        let js = "x = { true: 1 }";
        assert_eq!(minify_js(js).unwrap(), "x={true:1}");
    }

    #[test]
    fn string_concatenation_merges() {
        let js = r#"x = "a" + "b" + "c""#;
        assert_eq!(minify_js(js).unwrap(), r#"x="abc""#);
    }

    #[test]
    fn escapes_close_script_in_strings() {
        let js = r#"x = "</script>""#;
        let out = minify_js(js).unwrap();
        assert!(out.contains("<\\/script>"));
    }

    #[test]
    fn arrow_single_param_drops_parens() {
        let js = "const f = (x) => x + 1;";
        assert_eq!(minify_js(js).unwrap(), "const f=x=>x+1");
    }

    #[test]
    fn do_while_loop() {
        let js = "do { x++ ; } while (x < 10);";
        assert_eq!(minify_js(js).unwrap(), "do{x++;}while(x<10)");
    }

    #[test]
    fn empty_if_body_becomes_semicolon() {
        let js = "if (x) {}";
        assert_eq!(minify_js(js).unwrap(), "if(x);");
    }

    #[test]
    fn switch_with_case_body_keeps_its_braces() {
        let js = "switch(x){case 1:a();break;}";
        assert_eq!(minify_js(js).unwrap(), "switch(x){case 1:a();break}");
    }

    #[test]
    fn empty_switch_body_does_not_collapse_to_semicolon() {
        // Unlike `if(x){}` -> `if(x);`, `switch(x){}` is not the same
        // construct as `switch(x);`, which isn't even valid JS.
        assert_eq!(minify_js("switch(x){}").unwrap(), "switch(x){}");
    }

    #[test]
    fn empty_catch_body_does_not_collapse_to_semicolon() {
        assert_eq!(minify_js("catch(e){}").unwrap(), "catch(e){}");
    }

    #[test]
    fn single_statement_catch_body_keeps_its_braces() {
        let js = "catch(e){console.log(e);}";
        assert_eq!(minify_js(js).unwrap(), "catch(e){console.log(e)}");
    }

    #[test]
    fn plus_plus_separator_is_preserved() {
        let js = "a = b+ +c";
        let out = minify_js(js).unwrap();
        assert!(!out.contains("++"));
    }

    #[test]
    fn template_literal_interpolation() {
        let js = "x = `a${b}c`";
        assert_eq!(minify_js(js).unwrap(), "x=`a${b}c`");
    }

    #[test]
    fn preserves_bang_comment() {
        let js = "/*! header */x=1;";
        assert_eq!(minify_js(js).unwrap(), "/*! header */x=1;");
    }

    #[test]
    fn unclosed_curly_errors_at_opener() {
        let js = "function f(){ return 1;";
        let err = minify_js(js).unwrap_err();
        assert_eq!(err.offset, 13);
    }

    #[test]
    fn unexpected_close_curly() {
        let js = "x = 1; }";
        let err = minify_js(js).unwrap_err();
        assert!(err.template.starts_with("Unexpected }"));
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(minify_js("").unwrap(), "");
        assert_eq!(minify_js("   \n\t").unwrap(), "");
    }

    #[test]
    fn is_idempotent() {
        let js = "if (a) { b = true; } else { c = false; } while (d) { e++ ; }";
        let once = minify_js(js).unwrap();
        let twice = minify_js(&once).unwrap();
        assert_eq!(once, twice);
    }
}
