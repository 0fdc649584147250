//! The XML/HTML minifier: a single tokenizer over `Content`/`Tag`/
//! `Doctype` syntactic states, shared between both formats except where
//! they explicitly diverge — tag-name case sensitivity, the XML-only
//! `<a></a>` → `<a/>` empty-element rewrite, and `<![CDATA[ … ]]>`
//! handling.

use crate::common::ascii_ieq;
use crate::error::{MinifyError, MinifyResult};
use crate::inline::{minify_inline_body, script_type_from_attr, ChildMinifier};
use memchr::{memchr, memmem};

/// Minifies an XML document (case-sensitive tag names, CDATA-aware,
/// empty elements collapsed to the self-closing form).
pub fn minify_xml(input: &str) -> MinifyResult {
    Sgml::new(input, true).run()
}

/// Minifies an HTML document (case-insensitive tag names, `<pre>`
/// preserved verbatim, unquoted attribute values where safe).
pub fn minify_html(input: &str) -> MinifyResult {
    Sgml::new(input, false).run()
}

fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_tag_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b':' || b == b'_'
}

fn is_tag_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_' | b'.')
}

fn is_attr_delim(b: u8) -> bool {
    matches!(
        b,
        b'"' | b'\'' | b' ' | b'\t' | b'\r' | b'\n' | b'<' | b'>' | b'=' | b'/'
    )
}

fn ascii_ieq_bytes(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_ascii_lowercase() == y.to_ascii_lowercase())
}

/// Trims leading/trailing whitespace from a text run and collapses every
/// internal whitespace run to a single space — the shared content-text
/// rule for both formats (spec's "text-content whitespace collapses to
/// single spaces" testable property covers XML text content too, not
/// just HTML).
fn push_collapsed_text(out: &mut Vec<u8>, bytes: &[u8]) {
    let n = bytes.len();
    let mut i = 0;
    while i < n && is_ws(bytes[i]) {
        i += 1;
    }
    let mut pending_space = false;
    while i < n {
        if is_ws(bytes[i]) {
            pending_space = true;
            while i < n && is_ws(bytes[i]) {
                i += 1;
            }
        } else {
            if pending_space {
                out.push(b' ');
                pending_space = false;
            }
            out.push(bytes[i]);
            i += 1;
        }
    }
}

struct Sgml<'a> {
    input: &'a str,
    bytes: &'a [u8],
    len: usize,
    pos: usize,
    is_xml: bool,
    out: Vec<u8>,
    pre_depth: u32,
}

impl<'a> Sgml<'a> {
    fn new(input: &'a str, is_xml: bool) -> Self {
        Sgml {
            input,
            bytes: input.as_bytes(),
            len: input.len(),
            pos: 0,
            is_xml,
            out: Vec::with_capacity(input.len()),
            pre_depth: 0,
        }
    }

    fn run(mut self) -> MinifyResult {
        while self.pos < self.len {
            if self.bytes[self.pos] == b'<' {
                self.handle_markup()?;
            } else {
                self.handle_content_run();
            }
        }
        Ok(String::from_utf8(self.out).expect("output reuses valid UTF-8 input bytes"))
    }

    fn handle_content_run(&mut self) {
        let start = self.pos;
        match memchr(b'<', &self.bytes[self.pos..]) {
            Some(rel) => self.pos += rel,
            None => self.pos = self.len,
        }
        let text = &self.bytes[start..self.pos];
        if self.pre_depth > 0 {
            self.out.extend_from_slice(text);
        } else {
            push_collapsed_text(&mut self.out, text);
        }
    }

    fn skip_tag_ws(&mut self) -> bool {
        let start = self.pos;
        while self.pos < self.len && is_ws(self.bytes[self.pos]) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn handle_markup(&mut self) -> Result<(), MinifyError> {
        if self.bytes[self.pos..].starts_with(b"<!--") {
            return self.handle_comment();
        }
        if self.is_xml && self.bytes[self.pos..].starts_with(b"<![CDATA[") {
            return self.handle_cdata();
        }
        if self.pos + 9 <= self.len && ascii_ieq_bytes(&self.bytes[self.pos + 1..self.pos + 9], b"!DOCTYPE") {
            return self.handle_doctype();
        }
        if self.is_xml && self.bytes.get(self.pos + 1) == Some(&b'?') {
            return self.handle_processing_instruction();
        }
        match self.bytes.get(self.pos + 1).copied() {
            Some(b'/') => {
                self.pos += 2;
                self.parse_closing_tag()
            }
            Some(c) if is_tag_name_start(c) => {
                self.pos += 1;
                self.handle_opening_tag()
            }
            _ => Err(MinifyError::new("Invalid tag start in line %d, column %d", self.pos)),
        }
    }

    fn handle_comment(&mut self) -> Result<(), MinifyError> {
        let start = self.pos;
        let search_from = self.pos + 4;
        match memmem::find(&self.bytes[search_from..], b"-->") {
            Some(rel) => {
                self.pos = search_from + rel + 3;
                Ok(())
            }
            None => Err(MinifyError::new(
                "Unclosed comment starting in line %d, column %d",
                start,
            )),
        }
    }

    fn handle_cdata(&mut self) -> Result<(), MinifyError> {
        let start = self.pos;
        let search_from = self.pos + 9;
        match memmem::find(&self.bytes[search_from..], b"]]>") {
            Some(rel) => {
                let end = search_from + rel + 3;
                self.out.extend_from_slice(&self.bytes[start..end]);
                self.pos = end;
                Ok(())
            }
            None => Err(MinifyError::new(
                "Unclosed CDATA section starting in line %d, column %d",
                start,
            )),
        }
    }

    fn handle_doctype(&mut self) -> Result<(), MinifyError> {
        let start = self.pos;
        let mut i = self.pos + 9;
        let mut quote: Option<u8> = None;
        loop {
            if i >= self.len {
                return Err(MinifyError::new(
                    "Unexpected end of document, expected > in line %d, column %d",
                    start,
                ));
            }
            let b = self.bytes[i];
            match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                }
                None => {
                    if b == b'"' || b == b'\'' {
                        quote = Some(b);
                    } else if b == b'>' {
                        i += 1;
                        break;
                    }
                }
            }
            i += 1;
        }
        self.out.extend_from_slice(&self.bytes[start..i]);
        self.pos = i;
        Ok(())
    }

    fn handle_processing_instruction(&mut self) -> Result<(), MinifyError> {
        let start = self.pos;
        let search_from = self.pos + 2;
        match memmem::find(&self.bytes[search_from..], b"?>") {
            Some(rel) => {
                let end = search_from + rel + 2;
                self.out.extend_from_slice(&self.bytes[start..end]);
                self.pos = end;
                Ok(())
            }
            None => Err(MinifyError::new(
                "Unexpected end of document, expected ?> in line %d, column %d",
                start,
            )),
        }
    }

    fn parse_closing_tag(&mut self) -> Result<(), MinifyError> {
        let name_start = self.pos;
        if !(self.pos < self.len && is_tag_name_start(self.bytes[self.pos])) {
            return Err(MinifyError::new("Invalid closing tag in line %d, column %d", self.pos));
        }
        self.pos += 1;
        while self.pos < self.len && is_tag_name_char(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let name_bytes = &self.bytes[name_start..self.pos];
        self.skip_tag_ws();
        if self.bytes.get(self.pos) != Some(&b'>') {
            return Err(MinifyError::new("Invalid closing tag in line %d, column %d", self.pos));
        }
        if self.name_eq(name_bytes, b"pre") && self.pre_depth > 0 {
            self.pre_depth -= 1;
        }
        self.out.push(b'<');
        self.out.push(b'/');
        self.out.extend_from_slice(name_bytes);
        self.out.push(b'>');
        self.pos += 1;
        Ok(())
    }

    fn handle_opening_tag(&mut self) -> Result<(), MinifyError> {
        let name_start = self.pos;
        self.pos += 1;
        while self.pos < self.len && is_tag_name_char(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let name_bytes = self.bytes[name_start..self.pos].to_vec();
        self.out.push(b'<');
        self.out.extend_from_slice(&name_bytes);

        let (self_closing, type_value) = self.parse_tag_attrs()?;
        if self.name_eq(&name_bytes, b"pre") && !self_closing {
            self.pre_depth += 1;
        }

        if self_closing {
            self.out.push(b'/');
            self.out.push(b'>');
            self.pos += 1;
            return Ok(());
        }

        if self.is_xml {
            if let Some(after) = self.peek_matching_empty_close(self.pos + 1, &name_bytes) {
                self.out.push(b'/');
                self.out.push(b'>');
                self.pos = after;
                return Ok(());
            }
        }

        self.out.push(b'>');
        self.pos += 1;

        if self.name_eq(&name_bytes, b"script") || self.name_eq(&name_bytes, b"style") {
            self.handle_inline_body(&name_bytes, type_value.as_deref())?;
        }
        Ok(())
    }

    fn peek_matching_empty_close(&self, pos: usize, name: &[u8]) -> Option<usize> {
        if self.bytes.get(pos) != Some(&b'<') || self.bytes.get(pos + 1) != Some(&b'/') {
            return None;
        }
        let name_start = pos + 2;
        let name_end = name_start + name.len();
        if name_end > self.len || &self.bytes[name_start..name_end] != name {
            return None;
        }
        let mut i = name_end;
        while i < self.len && is_ws(self.bytes[i]) {
            i += 1;
        }
        if self.bytes.get(i) == Some(&b'>') {
            Some(i + 1)
        } else {
            None
        }
    }

    /// Parses attributes up to (but not including) the final `>`. Returns
    /// whether the tag was self-closing and, if present, the raw `type`
    /// attribute's decoded value (only meaningful for `<script>`).
    fn parse_tag_attrs(&mut self) -> Result<(bool, Option<String>), MinifyError> {
        let mut type_value = None;
        loop {
            let had_ws = self.skip_tag_ws();
            if self.pos >= self.len {
                return Err(MinifyError::new(
                    "Unexpected end of document, expected > in line %d, column %d",
                    self.pos,
                ));
            }
            match self.bytes[self.pos] {
                b'>' => return Ok((false, type_value)),
                b'/' => {
                    if self.bytes.get(self.pos + 1) == Some(&b'>') {
                        self.pos += 1;
                        return Ok((true, type_value));
                    }
                    return Err(MinifyError::new("Expected > after / in line %d, column %d", self.pos));
                }
                _ => {
                    if had_ws {
                        self.out.push(b' ');
                    }
                    let name_start = self.pos;
                    while self.pos < self.len && !is_attr_delim(self.bytes[self.pos]) {
                        self.pos += 1;
                    }
                    if self.pos == name_start {
                        return Err(MinifyError::new("Invalid attribute in line %d, column %d", self.pos));
                    }
                    let name = self.input[name_start..self.pos].to_string();
                    self.out.extend_from_slice(name.as_bytes());

                    self.skip_tag_ws();
                    if self.bytes.get(self.pos) == Some(&b'=') {
                        self.pos += 1;
                        self.out.push(b'=');
                        self.skip_tag_ws();
                        let value = self.parse_attr_value()?;
                        if ascii_ieq(&name, "type") {
                            type_value = Some(value);
                        }
                    }
                }
            }
        }
    }

    fn parse_attr_value(&mut self) -> Result<String, MinifyError> {
        if self.pos >= self.len {
            return Err(MinifyError::new(
                "Unexpected end of document, expected attribute value in line %d, column %d",
                self.pos,
            ));
        }
        let b = self.bytes[self.pos];
        if b == b'"' || b == b'\'' {
            let quote = b;
            let start = self.pos;
            self.pos += 1;
            let val_start = self.pos;
            loop {
                if self.pos >= self.len {
                    return Err(MinifyError::new(
                        "Unclosed attribute value starting in line %d, column %d",
                        start,
                    ));
                }
                if self.bytes[self.pos] == quote {
                    break;
                }
                self.pos += 1;
            }
            let raw_value = &self.input[val_start..self.pos];
            self.pos += 1;
            if self.is_xml {
                self.out.push(quote);
                self.out.extend_from_slice(raw_value.as_bytes());
                self.out.push(quote);
            } else {
                let safe_unquoted = !raw_value.is_empty()
                    && raw_value
                        .bytes()
                        .all(|c| !matches!(c, b' ' | b'\t' | b'\r' | b'\n' | b'=' | b'"' | b'\'' | b'/'));
                if safe_unquoted {
                    self.out.extend_from_slice(raw_value.as_bytes());
                } else {
                    self.out.push(quote);
                    self.out.extend_from_slice(raw_value.as_bytes());
                    self.out.push(quote);
                }
            }
            Ok(raw_value.to_string())
        } else {
            let start = self.pos;
            while self.pos < self.len
                && !matches!(self.bytes[self.pos], b' ' | b'\t' | b'\r' | b'\n' | b'>' | b'"' | b'\'' | b'=')
            {
                self.pos += 1;
            }
            let raw = self.input[start..self.pos].to_string();
            self.out.extend_from_slice(raw.as_bytes());
            Ok(raw)
        }
    }

    fn handle_inline_body(&mut self, tag_name: &[u8], type_value: Option<&str>) -> Result<(), MinifyError> {
        let child = if ascii_ieq_bytes(tag_name, b"style") {
            ChildMinifier::Css
        } else {
            script_type_from_attr(type_value)
        };

        let body_start = self.pos;
        let body_end = self.find_inline_body_end(body_start, tag_name)?;
        let body = &self.input[body_start..body_end];

        let minified = minify_inline_body(body, child, self.is_xml)
            .map_err(|err| MinifyError::new(err.template, body_start + err.offset))?;
        self.out.extend_from_slice(minified.as_bytes());

        self.pos = body_end;
        self.copy_closing_delimiter_tag(tag_name)
    }

    fn find_inline_body_end(&self, start: usize, tag_name: &[u8]) -> Result<usize, MinifyError> {
        let mut i = start;
        loop {
            match memchr(b'<', &self.bytes[i..]) {
                Some(rel) => {
                    let at = i + rel;
                    if self.is_xml && self.bytes[at..].starts_with(b"<![CDATA[") {
                        let search_from = at + 9;
                        match memmem::find(&self.bytes[search_from..], b"]]>") {
                            Some(r) => {
                                i = search_from + r + 3;
                                continue;
                            }
                            None => {
                                return Err(MinifyError::new(
                                    "Unclosed CDATA section starting in line %d, column %d",
                                    at,
                                ))
                            }
                        }
                    }
                    if self.is_closing_delim(at, tag_name) {
                        return Ok(at);
                    }
                    i = at + 1;
                }
                None => {
                    return Err(MinifyError::new(
                        "Unexpected end of document, expected closing tag in line %d, column %d",
                        start,
                    ))
                }
            }
        }
    }

    fn is_closing_delim(&self, at: usize, tag_name: &[u8]) -> bool {
        if self.bytes.get(at + 1) != Some(&b'/') {
            return false;
        }
        let name_start = at + 2;
        let name_end = name_start + tag_name.len();
        if name_end > self.len {
            return false;
        }
        let candidate = &self.bytes[name_start..name_end];
        let matches_name = self.name_eq(candidate, tag_name);
        matches_name && !self.bytes.get(name_end).map(|&b| is_tag_name_char(b)).unwrap_or(false)
    }

    /// Tag-name comparison: exact-byte for XML, ASCII case-insensitive for
    /// HTML.
    fn name_eq(&self, a: &[u8], b: &[u8]) -> bool {
        if self.is_xml {
            a == b
        } else {
            ascii_ieq_bytes(a, b)
        }
    }

    fn copy_closing_delimiter_tag(&mut self, tag_name: &[u8]) -> Result<(), MinifyError> {
        self.pos += 2 + tag_name.len();
        self.skip_tag_ws();
        if self.bytes.get(self.pos) != Some(&b'>') {
            return Err(MinifyError::new("Invalid closing tag in line %d, column %d", self.pos));
        }
        self.out.push(b'<');
        self.out.push(b'/');
        self.out.extend_from_slice(tag_name);
        self.out.push(b'>');
        self.pos += 1;
        Ok(())
    }
}
