//! CSS minification: a single-pass tokenizer over the CSS grammar that
//! strips comments and syntactically inert whitespace while tracking just
//! enough structure (the current [`SyntaxBlock`] plus a brace-nesting
//! counter) to know which whitespace-elision table applies.

use crate::common::{is_whitespace, skip_whitespace_comments};
use crate::error::{MinifyError, MinifyResult};
use phf::phf_set;

static NESTABLE_AT_RULES: phf::Set<&'static str> = phf_set! {
    "@media",
    "@layer",
    "@container",
    "@keyframes",
};

fn is_nestable_at_rule(name: &[u8]) -> bool {
    std::str::from_utf8(name)
        .ok()
        .map(|s| {
            let lower = s.to_ascii_lowercase();
            NESTABLE_AT_RULES.contains(lower.as_str())
        })
        .unwrap_or(false)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SyntaxBlock {
    RuleStart,
    Qrule,
    QruleRound,
    QruleSquare,
    Atrule,
    AtruleRound,
    AtruleSquare,
    Style,
}

/// Minifies a CSS stylesheet (or a standalone declaration list, such as an
/// inline `style` attribute value).
pub fn minify_css(css: &str) -> MinifyResult {
    let input = css.as_bytes();
    let len = input.len();
    let mut out: Vec<u8> = Vec::with_capacity(len);
    let mut block = SyntaxBlock::RuleStart;
    let mut nesting_level: i32 = 0;

    let mut atrule_start: usize = 0;
    let mut atrule_len: usize = 0;

    let mut i = skip_whitespace_comments(input, 0, false, Some(&mut out))?.next;

    loop {
        if i >= len {
            return match block {
                SyntaxBlock::RuleStart => {
                    Ok(String::from_utf8(out).expect("output reuses valid UTF-8 input bytes"))
                }
                SyntaxBlock::Style => Err(MinifyError::new(
                    "Unexpected end of document, expected } (started in line %d, column %d)",
                    len,
                )),
                SyntaxBlock::Qrule | SyntaxBlock::QruleRound | SyntaxBlock::QruleSquare => {
                    Err(MinifyError::new(
                        "Unexpected end of document, expected {…} (started in line %d, column %d)",
                        len,
                    ))
                }
                SyntaxBlock::Atrule | SyntaxBlock::AtruleRound | SyntaxBlock::AtruleSquare => {
                    Err(MinifyError::new(
                        "Unexpected end of document, expected ; or {…} (started in line %d, column %d)",
                        len,
                    ))
                }
            };
        }

        let ch = input[i];

        // A run of `}` always pops back to the top of the grammar: nested
        // at-rule bodies and qualified-rule declaration blocks never carry
        // their own context back out of a close brace (see Design Notes).
        if ch == b'}' {
            loop {
                if nesting_level == 0 {
                    return Err(MinifyError::new(
                        format!("Unexpected }} in line %d, column %d"),
                        i,
                    ));
                }
                out.push(b'}');
                nesting_level -= 1;
                i = skip_whitespace_comments(input, i + 1, false, Some(&mut out))?.next;
                if i >= len || input[i] != b'}' {
                    break;
                }
            }
            block = SyntaxBlock::RuleStart;
            continue;
        }

        if block == SyntaxBlock::RuleStart {
            if matches!(ch, b'{' | b'}' | b'"' | b'\'') {
                return Err(MinifyError::new(
                    format!("Unexpected {} in line %d, column %d", ch as char),
                    i,
                ));
            }
            out.push(ch);
            if ch == b'@' {
                block = SyntaxBlock::Atrule;
                atrule_start = i;
                i += 1;
                while i < len && input[i].is_ascii_alphanumeric() {
                    out.push(input[i]);
                    i += 1;
                }
                atrule_len = i - atrule_start;
            } else {
                block = SyntaxBlock::Qrule;
                i += 1;
            }
            continue;
        }

        // `url(...)`: detected whenever `(` is immediately preceded by the
        // three literal bytes `url`, regardless of surrounding context.
        if ch == b'(' && i >= 3 && &input[i - 3..i] == b"url" {
            i = parse_url(input, i, &mut out)?;
            continue;
        }

        if ch == b'"' || ch == b'\'' {
            i = copy_string(input, i, &mut out)?;
            continue;
        }

        if ch == b';' && block != SyntaxBlock::Qrule {
            loop {
                i = skip_whitespace_comments(input, i + 1, false, Some(&mut out))?.next;
                if i >= len || input[i] != b';' {
                    break;
                }
            }
            if i >= len || input[i] != b'}' {
                out.push(b';');
            }
            if block == SyntaxBlock::Atrule {
                block = SyntaxBlock::RuleStart;
            }
            continue;
        }

        if ch == b'{' {
            nesting_level += 1;
            if block == SyntaxBlock::Style {
                return Err(MinifyError::new(
                    "Unexpected { in line %d, column %d",
                    i,
                ));
            }
            out.push(b'{');
            i = skip_whitespace_comments(input, i + 1, false, Some(&mut out))?.next;
            block = match block {
                SyntaxBlock::Qrule => SyntaxBlock::Style,
                SyntaxBlock::Atrule => {
                    if is_nestable_at_rule(&input[atrule_start..atrule_start + atrule_len]) {
                        SyntaxBlock::RuleStart
                    } else {
                        SyntaxBlock::Style
                    }
                }
                other => other,
            };
            continue;
        }

        if ch == b'0'
            && i + 1 < len
            && input[i + 1] == b'.'
            && (i == 0 || !input[i - 1].is_ascii_digit())
        {
            i += 1;
            continue;
        }

        match (block, ch) {
            (SyntaxBlock::Atrule, b'(') => {
                block = SyntaxBlock::AtruleRound;
                out.push(b'(');
                i += 1;
                continue;
            }
            (SyntaxBlock::Atrule, b'[') => {
                block = SyntaxBlock::AtruleSquare;
                out.push(b'[');
                i += 1;
                continue;
            }
            (SyntaxBlock::AtruleRound, b')') => {
                block = SyntaxBlock::Atrule;
                out.push(b')');
                i += 1;
                continue;
            }
            (SyntaxBlock::AtruleSquare, b']') => {
                block = SyntaxBlock::Atrule;
                out.push(b']');
                i += 1;
                continue;
            }
            (SyntaxBlock::Qrule, b'(') => {
                block = SyntaxBlock::QruleRound;
                out.push(b'(');
                i += 1;
                continue;
            }
            (SyntaxBlock::Qrule, b'[') => {
                block = SyntaxBlock::QruleSquare;
                out.push(b'[');
                i += 1;
                continue;
            }
            (SyntaxBlock::QruleRound, b')') => {
                block = SyntaxBlock::Qrule;
                out.push(b')');
                i += 1;
                continue;
            }
            (SyntaxBlock::QruleSquare, b']') => {
                block = SyntaxBlock::Qrule;
                out.push(b']');
                i += 1;
                continue;
            }
            _ => {}
        }

        if is_whitespace(ch) || (ch == b'/' && i + 1 < len && input[i + 1] == b'*') {
            let ws_start = i;
            i = skip_whitespace_comments(input, i, false, Some(&mut out))?.next;
            if i >= len {
                continue;
            }
            let last = out.last().copied();
            let next = input[i];
            let add_space = elide(block, last, next, atrule_start, atrule_len, ws_start);
            if add_space {
                out.push(b' ');
            }
            continue;
        }

        out.push(ch);
        i += 1;
    }
}

/// Whether a single space must be kept between the character last emitted
/// (`last`) and the upcoming input character (`next`) after a collapsed
/// whitespace/comment run, per the context-sensitive elision tables.
fn elide(
    block: SyntaxBlock,
    last: Option<u8>,
    next: u8,
    atrule_start: usize,
    atrule_len: usize,
    ws_start: usize,
) -> bool {
    let last = match last {
        Some(c) => c,
        None => return false,
    };
    match block {
        SyntaxBlock::Style => {
            !matches!(last, b'{' | b':' | b',') && !matches!(next, b'}' | b':' | b',' | b';' | b'!')
        }
        SyntaxBlock::Qrule => {
            !matches!(last, b'~' | b'>' | b'+' | b',' | b']')
                && !matches!(next, b'~' | b'>' | b'+' | b',' | b'[' | b'{')
        }
        SyntaxBlock::Atrule => {
            let adjacent_to_name = next == b'(' && ws_start == atrule_start + atrule_len;
            !adjacent_to_name
                && !matches!(last, b',' | b')' | b'(')
                && !matches!(next, b',' | b')' | b';' | b'{')
        }
        SyntaxBlock::AtruleRound | SyntaxBlock::QruleRound => {
            !matches!(last, b'(' | b',' | b'<' | b'>' | b':')
                && !matches!(next, b')' | b',' | b'<' | b'>' | b':')
        }
        SyntaxBlock::AtruleSquare | SyntaxBlock::QruleSquare => {
            !matches!(last, b'[' | b'=' | b',')
                && !matches!(next, b']' | b'=' | b',' | b'*' | b'$' | b'^' | b'-' | b'~' | b'|')
        }
        SyntaxBlock::RuleStart => false,
    }
}

/// Copies a `"…"`/`'…'` string literal, honoring a toggling "active
/// backslash" so `\\"` terminates the string but `\"` does not.
fn copy_string(input: &[u8], start: usize, out: &mut Vec<u8>) -> Result<usize, MinifyError> {
    let quote = input[start];
    out.push(quote);
    let mut i = start + 1;
    let mut active_backslash = false;
    loop {
        if i >= input.len() {
            return Err(MinifyError::new(
                "Unclosed string starting in line %d, column %d",
                start,
            ));
        }
        let c = input[i];
        if c == quote && !active_backslash {
            out.push(c);
            return Ok(i + 1);
        }
        active_backslash = c == b'\\' && !active_backslash;
        out.push(c);
        i += 1;
    }
}

/// Copies a `url(…)` term: whitespace immediately inside the parens is
/// trimmed, an internal quoted URL is handled like any other string, and
/// whitespace inside an unquoted URL is rejected.
fn parse_url(input: &[u8], open_paren: usize, out: &mut Vec<u8>) -> Result<usize, MinifyError> {
    let len = input.len();
    out.push(b'(');
    let mut i = open_paren + 1;
    while i < len && is_whitespace(input[i]) {
        i += 1;
    }
    if i < len && (input[i] == b'"' || input[i] == b'\'') {
        i = copy_string(input, i, out)?;
        while i < len && is_whitespace(input[i]) {
            i += 1;
        }
        if i >= len || input[i] != b')' {
            return Err(MinifyError::new("Expected ) in line %d, column %d", i.min(len)));
        }
    } else {
        let mut active_backslash = false;
        while i < len && !is_whitespace(input[i]) && !(input[i] == b')' && !active_backslash) {
            active_backslash = input[i] == b'\\' && !active_backslash;
            out.push(input[i]);
            i += 1;
        }
        if i < len && is_whitespace(input[i]) {
            let ws_offset = i;
            while i < len && is_whitespace(input[i]) {
                i += 1;
            }
            if i >= len {
                return Err(MinifyError::new(
                    "Unclosed url(…) starting in line %d, column %d",
                    open_paren,
                ));
            }
            if input[i] != b')' {
                return Err(MinifyError::new(
                    "Illegal white-space in URL in line %d, column %d",
                    ws_offset,
                ));
            }
        } else if i >= len {
            return Err(MinifyError::new(
                "Unclosed url(…) starting in line %d, column %d",
                open_paren,
            ));
        }
    }
    out.push(b')');
    Ok(i + 1)
}
