//! XML/HTML named and numeric character reference handling: decoding
//! entities to UTF-8 text and re-encoding text back into a safe XML body
//! (entity-escaping or CDATA-wrapping, whichever is shorter).

use crate::error::MinifyError;
use phf::phf_map;

/// Named entities recognized by the XML decoder (exactly the five XML
/// predefined entities).
static XML_NAMED: phf::Map<&'static str, char> = phf_map! {
    "lt" => '<',
    "gt" => '>',
    "amp" => '&',
    "apos" => '\'',
    "quot" => '"',
};

/// HTML's decoder accepts the XML five plus two additional named forms
/// that show up in attribute-value and script-type decoding.
static HTML_NAMED: phf::Map<&'static str, char> = phf_map! {
    "lt" => '<',
    "gt" => '>',
    "amp" => '&',
    "apos" => '\'',
    "quot" => '"',
    "plus" => '+',
    "sol" => '/',
};

/// A single decoded character reference: how many source bytes it consumed
/// (starting at the `&`) and the character it decoded to.
pub struct DecodedEntity {
    pub consumed: usize,
    pub ch: char,
}

/// Decodes one entity starting at `input[pos]` (which must be `&`).
/// Returns `None` if `input[pos]` is not the start of a recognized entity
/// (the caller should then treat `&` as a literal byte — lenient, matching
/// how real documents often contain bare ampersands).
pub fn decode_entity(input: &[u8], pos: usize, is_xml: bool) -> Result<Option<DecodedEntity>, MinifyError> {
    debug_assert_eq!(input[pos], b'&');
    let len = input.len();
    let rest = &input[pos + 1..];

    if rest.first() == Some(&b'#') {
        let (hex, digits_start) = if rest.get(1) == Some(&b'x') || rest.get(1) == Some(&b'X') {
            (true, pos + 3)
        } else {
            (false, pos + 2)
        };
        let mut i = digits_start;
        while i < len && input[i] != b';' {
            i += 1;
        }
        if i >= len {
            return Err(MinifyError::new(
                "Unclosed character reference starting in line %d, column %d",
                pos,
            ));
        }
        let digits = &input[digits_start..i];
        if digits.is_empty() {
            return Err(MinifyError::new(
                "Invalid character reference in line %d, column %d",
                pos,
            ));
        }
        let text = std::str::from_utf8(digits).map_err(|_| {
            MinifyError::new("Invalid character reference in line %d, column %d", pos)
        })?;
        let radix = if hex { 16 } else { 10 };
        let cp = u32::from_str_radix(text, radix).map_err(|_| {
            MinifyError::new("Invalid character reference in line %d, column %d", pos)
        })?;
        if cp > 0x7FFF_FFFF {
            return Err(MinifyError::new(
                "Character reference out of range in line %d, column %d",
                pos,
            ));
        }
        let ch = char::from_u32(cp).ok_or_else(|| {
            MinifyError::new(
                "Character reference does not name a Unicode scalar value in line %d, column %d",
                pos,
            )
        })?;
        return Ok(Some(DecodedEntity {
            consumed: i + 1 - pos,
            ch,
        }));
    }

    let mut i = pos + 1;
    while i < len && input[i] != b';' && i - pos <= 10 {
        i += 1;
    }
    if i < len && input[i] == b';' {
        let name = std::str::from_utf8(&input[pos + 1..i]).unwrap_or("");
        let table = if is_xml { &XML_NAMED } else { &HTML_NAMED };
        if let Some(&ch) = table.get(name) {
            return Ok(Some(DecodedEntity {
                consumed: i + 1 - pos,
                ch,
            }));
        }
    }
    Ok(None)
}

/// Decodes every entity and `<![CDATA[ … ]]>` wrapper (XML only) in `body`,
/// returning the decoded text plus a forward mapping from each decoded
/// byte-offset boundary to the corresponding original offset, used to
/// translate a child minifier's error position back to the outer document.
pub struct DecodeMap {
    /// Parallel to decoded-string byte offsets: `boundaries[i] = (decoded_offset, original_offset)`
    /// recorded at every point the decoded and original streams diverge.
    boundaries: Vec<(usize, usize)>,
    original_len: usize,
}

impl DecodeMap {
    /// Maps a byte offset in the decoded string back to the original body.
    pub fn translate(&self, decoded_offset: usize) -> usize {
        let mut original = decoded_offset;
        for &(d, o) in &self.boundaries {
            if d <= decoded_offset {
                original = o + (decoded_offset - d);
            } else {
                break;
            }
        }
        original.min(self.original_len)
    }
}

pub fn xml_decode(body: &str) -> Result<(String, DecodeMap), MinifyError> {
    let input = body.as_bytes();
    let len = input.len();
    let mut out = String::with_capacity(len);
    let mut boundaries = Vec::new();
    let mut i = 0;

    while i < len {
        if input[i] == b'&' {
            if let Some(entity) = decode_entity(input, i, true)? {
                boundaries.push((out.len(), i));
                out.push(entity.ch);
                i += entity.consumed;
                boundaries.push((out.len(), i));
                continue;
            }
            out.push('&');
            i += 1;
            continue;
        }
        if input[i..].starts_with(b"<![CDATA[") {
            let start = i;
            i += 9;
            let rel = find_subslice(&input[i..], b"]]>").ok_or_else(|| {
                MinifyError::new("Unclosed CDATA section starting in line %d, column %d", start)
            })?;
            let inner = &body[i..i + rel];
            boundaries.push((out.len(), i));
            out.push_str(inner);
            i += rel + 3;
            boundaries.push((out.len(), i));
            continue;
        }
        let ch_len = utf8_len(input[i]);
        out.push_str(&body[i..i + ch_len]);
        i += ch_len;
    }

    Ok((
        out,
        DecodeMap {
            boundaries,
            original_len: len,
        },
    ))
}

fn utf8_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    memchr::memmem::find(haystack, needle)
}

/// Re-encodes minified text for splicing back into an XML document,
/// choosing whichever of entity-escaping or CDATA-wrapping is shorter.
pub fn xml_encode(text: &str) -> String {
    let escaped = escape(text);
    let cdata = wrap_cdata(text);
    if cdata.len() < escaped.len() {
        cdata
    } else {
        escaped
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            other => out.push(other),
        }
    }
    out
}

fn wrap_cdata(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 12);
    out.push_str("<![CDATA[");
    let mut rest = text;
    while let Some(idx) = rest.find("]]>") {
        out.push_str(&rest[..idx]);
        out.push_str("]]]]><![CDATA[>");
        rest = &rest[idx + 3..];
    }
    out.push_str(rest);
    out.push_str("]]>");
    out
}
