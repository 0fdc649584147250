//! JSON minification: a strict incremental validator that copies only the
//! bytes that survive minification (structural punctuation, string
//! contents, numbers, and literals) while rejecting anything that isn't
//! well-formed JSON.

use crate::error::{MinifyError, MinifyResult};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// Minifies a JSON document, validating it as it goes.
pub fn minify_json(json: &str) -> MinifyResult {
    let input = json.as_bytes();
    let len = input.len();
    let mut out: Vec<u8> = Vec::with_capacity(len);
    let mut stack: Vec<Container> = Vec::new();

    let mut i = skip_ws(input, 0);
    if i >= len {
        // Empty (or pure-whitespace) input minifies to empty output, same as
        // the other four formats, even though it isn't a valid JSON document.
        return Ok(String::new());
    }

    loop {
        i = parse_value(input, i, &mut out, &mut stack)?;
        i = skip_ws(input, i);
        if i >= len {
            break;
        }
        return Err(MinifyError::new(
            format!(
                "Unexpected {} after top-level value in line %d, column %d",
                input[i] as char
            ),
            i,
        ));
    }

    if let Some(c) = stack.last() {
        let expected = match c {
            Container::Object => "}",
            Container::Array => "]",
        };
        return Err(MinifyError::new(
            format!("Unexpected end of document, expected {expected} in line %d, column %d"),
            len,
        ));
    }

    Ok(String::from_utf8(out).expect("output reuses valid UTF-8 input bytes"))
}

fn skip_ws(input: &[u8], mut pos: usize) -> usize {
    while pos < input.len() && matches!(input[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}

/// Parses one JSON value at `pos`, using `stack` only to track container
/// nesting for the duration of object/array bodies (it does not persist
/// across this call — the caller discovers unclosed containers once input
/// runs out).
fn parse_value(
    input: &[u8],
    pos: usize,
    out: &mut Vec<u8>,
    stack: &mut Vec<Container>,
) -> Result<usize, MinifyError> {
    let len = input.len();
    if pos >= len {
        return Err(MinifyError::new(
            "Unexpected end of document, expected a value in line %d, column %d",
            pos,
        ));
    }
    match input[pos] {
        b'{' => parse_container(input, pos, out, stack, Container::Object),
        b'[' => parse_container(input, pos, out, stack, Container::Array),
        b'"' => {
            let end = copy_string(input, pos, out)?;
            Ok(end)
        }
        b't' => expect_literal(input, pos, b"true", out),
        b'f' => expect_literal(input, pos, b"false", out),
        b'n' => expect_literal(input, pos, b"null", out),
        b'-' | b'0'..=b'9' => copy_number(input, pos, out),
        other => Err(MinifyError::new(
            format!("Unexpected {} in line %d, column %d", other as char),
            pos,
        )),
    }
}

fn expect_literal(
    input: &[u8],
    pos: usize,
    literal: &[u8],
    out: &mut Vec<u8>,
) -> Result<usize, MinifyError> {
    if input.len() >= pos + literal.len() && &input[pos..pos + literal.len()] == literal {
        out.extend_from_slice(literal);
        Ok(pos + literal.len())
    } else {
        Err(MinifyError::new(
            format!(
                "Invalid literal, expected {} in line %d, column %d",
                String::from_utf8_lossy(literal)
            ),
            pos,
        ))
    }
}

fn parse_container(
    input: &[u8],
    pos: usize,
    out: &mut Vec<u8>,
    stack: &mut Vec<Container>,
    kind: Container,
) -> Result<usize, MinifyError> {
    let len = input.len();
    let (open, close) = match kind {
        Container::Object => (b'{', b'}'),
        Container::Array => (b'[', b']'),
    };
    debug_assert_eq!(input[pos], open);
    out.push(open);
    stack.push(kind);
    let mut i = skip_ws(input, pos + 1);

    if i < len && input[i] == close {
        out.push(close);
        stack.pop();
        return Ok(i + 1);
    }
    if i >= len {
        return Err(MinifyError::new(
            format!(
                "Unexpected end of document, expected {} in line %d, column %d",
                close as char
            ),
            len,
        ));
    }

    loop {
        if kind == Container::Object {
            if input[i] != b'"' {
                return Err(MinifyError::new(
                    format!("Expected a string key in line %d, column %d"),
                    i,
                ));
            }
            i = copy_string(input, i, out)?;
            i = skip_ws(input, i);
            if i >= len || input[i] != b':' {
                return Err(MinifyError::new(
                    "Expected : in line %d, column %d",
                    i.min(len),
                ));
            }
            out.push(b':');
            i = skip_ws(input, i + 1);
        }

        i = parse_value(input, i, out, stack)?;
        i = skip_ws(input, i);

        if i >= len {
            return Err(MinifyError::new(
                format!(
                    "Unexpected end of document, expected {} in line %d, column %d",
                    close as char
                ),
                len,
            ));
        }
        match input[i] {
            b',' => {
                out.push(b',');
                i = skip_ws(input, i + 1);
                continue;
            }
            c if c == close => {
                out.push(close);
                stack.pop();
                return Ok(i + 1);
            }
            other => {
                return Err(MinifyError::new(
                    format!("Unexpected {} in line %d, column %d", other as char),
                    i,
                ));
            }
        }
    }
}

fn copy_string(input: &[u8], start: usize, out: &mut Vec<u8>) -> Result<usize, MinifyError> {
    let len = input.len();
    debug_assert_eq!(input[start], b'"');
    out.push(b'"');
    let mut i = start + 1;
    loop {
        if i >= len {
            return Err(MinifyError::new(
                "Unclosed string starting in line %d, column %d",
                start,
            ));
        }
        let c = input[i];
        match c {
            b'"' => {
                out.push(b'"');
                return Ok(i + 1);
            }
            b'\\' => {
                if i + 1 >= len {
                    return Err(MinifyError::new(
                        "Unclosed string starting in line %d, column %d",
                        start,
                    ));
                }
                let esc = input[i + 1];
                match esc {
                    b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {
                        out.push(b'\\');
                        out.push(esc);
                        i += 2;
                    }
                    b'u' => {
                        if i + 6 > len || !input[i + 2..i + 6].iter().all(u8::is_ascii_hexdigit) {
                            return Err(MinifyError::new(
                                "Invalid \\u escape in line %d, column %d",
                                i,
                            ));
                        }
                        out.extend_from_slice(&input[i..i + 6]);
                        i += 6;
                    }
                    _ => {
                        return Err(MinifyError::new(
                            format!("Invalid escape \\{} in line %d, column %d", esc as char),
                            i,
                        ));
                    }
                }
            }
            0x00..=0x1F => {
                return Err(MinifyError::new(
                    "Unescaped control character in string in line %d, column %d",
                    i,
                ));
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
}

fn copy_number(input: &[u8], start: usize, out: &mut Vec<u8>) -> Result<usize, MinifyError> {
    let len = input.len();
    let mut i = start;
    if input[i] == b'-' {
        out.push(b'-');
        i += 1;
    }
    let int_start = i;
    if i < len && input[i] == b'0' {
        out.push(b'0');
        i += 1;
    } else if i < len && input[i].is_ascii_digit() {
        while i < len && input[i].is_ascii_digit() {
            out.push(input[i]);
            i += 1;
        }
    } else {
        return Err(MinifyError::new(
            "Invalid number in line %d, column %d",
            start,
        ));
    }
    let _ = int_start;

    if i < len && input[i] == b'.' {
        let frac_start = i;
        out.push(b'.');
        i += 1;
        let digits_start = i;
        while i < len && input[i].is_ascii_digit() {
            out.push(input[i]);
            i += 1;
        }
        if i == digits_start {
            return Err(MinifyError::new(
                "Invalid number, expected digits after . in line %d, column %d",
                frac_start,
            ));
        }
    }

    if i < len && matches!(input[i], b'e' | b'E') {
        let exp_start = i;
        out.push(input[i]);
        i += 1;
        if i < len && matches!(input[i], b'+' | b'-') {
            out.push(input[i]);
            i += 1;
        }
        let digits_start = i;
        while i < len && input[i].is_ascii_digit() {
            out.push(input[i]);
            i += 1;
        }
        if i == digits_start {
            return Err(MinifyError::new(
                "Invalid number, expected digits in exponent in line %d, column %d",
                exp_start,
            ));
        }
    }

    Ok(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_whitespace_between_tokens() {
        let json = r#"{ "a" : 1 , "b" : [ 1, 2, 3 ] }"#;
        assert_eq!(minify_json(json).unwrap(), r#"{"a":1,"b":[1,2,3]}"#);
    }

    #[test]
    fn preserves_whitespace_inside_strings() {
        let json = r#"{"a": "b   c"}"#;
        assert_eq!(minify_json(json).unwrap(), r#"{"a":"b   c"}"#);
    }

    #[test]
    fn rejects_trailing_comma() {
        let json = r#"[1, 2, ]"#;
        assert!(minify_json(json).is_err());
    }

    #[test]
    fn rejects_unquoted_keys() {
        let json = r#"{a: 1}"#;
        assert!(minify_json(json).is_err());
    }

    #[test]
    fn rejects_unescaped_control_character() {
        let json = "\"a\nb\"";
        assert!(minify_json(json).is_err());
    }

    #[test]
    fn accepts_unicode_escape() {
        let json = r#""é""#;
        assert_eq!(minify_json(json).unwrap(), r#""é""#);
    }

    #[test]
    fn rejects_leading_zero_in_number() {
        assert!(minify_json("01").is_err());
    }

    #[test]
    fn accepts_negative_and_exponent_numbers() {
        assert_eq!(minify_json("-1.5e+10").unwrap(), "-1.5e+10");
    }

    #[test]
    fn rejects_unclosed_object() {
        let err = minify_json(r#"{"a":1"#).unwrap_err();
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn rejects_trailing_garbage_after_value() {
        assert!(minify_json("1 2").is_err());
    }

    #[test]
    fn empty_object_and_array() {
        assert_eq!(minify_json("{}").unwrap(), "{}");
        assert_eq!(minify_json("[ ]").unwrap(), "[]");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(minify_json("").unwrap(), "");
        assert_eq!(minify_json("   \n\t").unwrap(), "");
    }

    #[test]
    fn is_idempotent() {
        let json = r#" { "x" : [1,2, { "y": true, "z": null }] } "#;
        let once = minify_json(json).unwrap();
        let twice = minify_json(&once).unwrap();
        assert_eq!(once, twice);
    }
}
