//! Helpers shared by the CSS and JavaScript minifiers: the whitespace/
//! comment skipper and an ASCII case-insensitive comparator.

use crate::error::MinifyError;

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// ASCII-only case-insensitive equality. Never reaches for locale-aware
/// comparison — HTML/XML tag and attribute names are ASCII by grammar.
#[inline]
pub fn ascii_ieq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes()
            .zip(b.bytes())
            .all(|(x, y)| x.to_ascii_lowercase() == y.to_ascii_lowercase())
}

/// Result of skipping a whitespace/comment run.
pub struct SkipResult {
    pub next: usize,
    /// True iff no `/*! … */` preserved comment was encountered in the run.
    pub skipped_all_comments: bool,
    /// True iff the run contained at least one `\n`, either as raw
    /// whitespace or inside a skipped comment. JavaScript's whitespace
    /// elision rules (spec 4.3.6) branch on this.
    pub contained_newline: bool,
}

/// Advances `pos` over whitespace and comments. `allow_line_comments`
/// enables JavaScript's `// …` comments in addition to `/* … */`. Any
/// `/*! … */` block comment is copied verbatim into `out` when `out` is
/// `Some`; otherwise it is discarded like any other comment.
pub fn skip_whitespace_comments(
    input: &[u8],
    mut pos: usize,
    allow_line_comments: bool,
    mut out: Option<&mut Vec<u8>>,
) -> Result<SkipResult, MinifyError> {
    let len = input.len();
    let mut skipped_all_comments = true;
    let mut contained_newline = false;

    loop {
        while pos < len && is_whitespace(input[pos]) {
            if input[pos] == b'\n' {
                contained_newline = true;
            }
            pos += 1;
        }
        if pos + 1 < len && input[pos] == b'/' && input[pos + 1] == b'*' {
            let start = pos;
            let preserved = pos + 2 < len && input[pos + 2] == b'!';
            pos += 2;
            while pos + 1 < len && !(input[pos] == b'*' && input[pos + 1] == b'/') {
                if input[pos] == b'\n' {
                    contained_newline = true;
                }
                pos += 1;
            }
            if pos + 1 >= len {
                return Err(MinifyError::new(
                    "Unclosed multi-line comment starting in line %d, column %d",
                    start,
                ));
            }
            pos += 2;
            if preserved {
                skipped_all_comments = false;
                if let Some(ref mut buf) = out {
                    buf.extend_from_slice(&input[start..pos]);
                }
            }
            continue;
        }
        if allow_line_comments && pos + 1 < len && input[pos] == b'/' && input[pos + 1] == b'/' {
            pos += 2;
            while pos < len && input[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }
        break;
    }

    Ok(SkipResult {
        next: pos,
        skipped_all_comments,
        contained_newline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_plain_block_comment() {
        let input = b"/* hi */rest";
        let r = skip_whitespace_comments(input, 0, false, None).unwrap();
        assert_eq!(&input[r.next..], b"rest");
        assert!(r.skipped_all_comments);
    }

    #[test]
    fn preserves_bang_comment_when_requested() {
        let input = b"/*! keep */rest";
        let mut buf = Vec::new();
        let r = skip_whitespace_comments(input, 0, false, Some(&mut buf)).unwrap();
        assert_eq!(&input[r.next..], b"rest");
        assert!(!r.skipped_all_comments);
        assert_eq!(buf, b"/*! keep */");
    }

    #[test]
    fn line_comments_only_when_allowed() {
        let input = b"// a comment\nrest";
        let r = skip_whitespace_comments(input, 0, true, None).unwrap();
        assert_eq!(&input[r.next..], b"rest");

        // Without allow_line_comments, `//` is not a comment starter at all:
        // the scan stops right before it (it isn't whitespace either).
        let r2 = skip_whitespace_comments(input, 0, false, None).unwrap();
        assert_eq!(r2.next, 0);
    }

    #[test]
    fn unclosed_comment_errors_at_start() {
        let input = b"/* never closes";
        let err = skip_whitespace_comments(input, 0, false, None).unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn contained_newline_is_reported() {
        let with_nl = skip_whitespace_comments(b" \n rest", 0, false, None).unwrap();
        assert!(with_nl.contained_newline);
        let without_nl = skip_whitespace_comments(b"   rest", 0, false, None).unwrap();
        assert!(!without_nl.contained_newline);
    }

    #[test]
    fn ascii_ieq_ignores_case() {
        assert!(ascii_ieq("Script", "SCRIPT"));
        assert!(!ascii_ieq("script", "scripts"));
    }
}
