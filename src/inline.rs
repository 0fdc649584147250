//! The inline script/style body pipeline: decode a tag's inner text (for
//! XML, via entities and CDATA; for HTML, verbatim), hand it to the
//! matching child minifier, and splice the re-encoded result back in.

use crate::css::minify_css;
use crate::entities::{xml_decode, xml_encode};
use crate::error::MinifyError;
use crate::js::minify_js;
use crate::json::minify_json;

/// Which minifier (if any) applies to an inline `<script>`/`<style>` body.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChildMinifier {
    Javascript,
    Json,
    Css,
    None,
}

/// Maps an HTML `<script type="…">` attribute value to the minifier that
/// should run over its body. No `type` attribute at all defaults to
/// `Javascript`, matching every plain `<script>` tag.
pub fn script_type_from_attr(type_value: Option<&str>) -> ChildMinifier {
    match type_value {
        None => ChildMinifier::Javascript,
        Some(v) => match v {
            "application/json+ld" | "importmap" => ChildMinifier::Json,
            "module" | "text/javascript" => ChildMinifier::Javascript,
            _ => ChildMinifier::None,
        },
    }
}

/// Runs the inline-body pipeline over `body`, the raw bytes of a
/// `<script>`/`<style>` element's content exactly as they appear between
/// `>` and the closing delimiter. Any error's offset is relative to the
/// start of `body` — the caller (the XML/HTML tokenizer) is responsible
/// for adding the body's start offset in the outer document.
pub fn minify_inline_body(
    body: &str,
    child: ChildMinifier,
    is_xml: bool,
) -> Result<String, MinifyError> {
    if child == ChildMinifier::None {
        return Ok(body.to_string());
    }

    if !is_xml {
        return run_child(child, body);
    }

    let (decoded, map) = xml_decode(body)?;
    let minified = run_child(child, &decoded).map_err(|err| {
        MinifyError::new(err.template.clone(), map.translate(err.offset))
    })?;
    Ok(xml_encode(&minified))
}

fn run_child(child: ChildMinifier, text: &str) -> Result<String, MinifyError> {
    match child {
        ChildMinifier::Javascript => minify_js(text),
        ChildMinifier::Json => minify_json(text),
        ChildMinifier::Css => minify_css(text),
        ChildMinifier::None => Ok(text.to_string()),
    }
}
