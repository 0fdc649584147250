//! Property tests checking `minify(minify(x)) == minify(x)` for each
//! format, per spec.md Section 8. Inputs are built from small corpora of
//! well-formed fragments for each format's grammar rather than arbitrary
//! Unicode, since the latter would almost always just produce a parse
//! error instead of exercising the minifier.

use minilex::{minify_css, minify_html, minify_js, minify_json, minify_xml};
use proptest::prelude::*;

const CSS_RULES: &[&str] = &[
    "a{color:red}",
    ".b , .c{margin:0 1px 2px 3px}",
    "#d::before{content:\"x\"}",
    "@media (min-width:10px){.e{color:blue}}",
    "a[href^=\"http\"]{text-decoration:underline}",
];

const JS_STATEMENTS: &[&str] = &[
    "var x = 1;",
    "function f(a, b) { return a + b; }",
    "if (x) { y = true; } else { y = false; }",
    "for (let i = 0; i < 10; i++) { console.log(i); }",
    "const g = (x) => x * 2;",
    "let s = \"a\" + \"b\";",
    "do { x--; } while (x > 0);",
];

const XML_FRAGMENTS: &[&str] = &[
    "<a>1</a>",
    "<b x=\"1\"><c/></b>",
    "<d></d>",
    "<e><!-- note --><f>g</f></e>",
    "<h><![CDATA[<raw> & text]]></h>",
];

// HTML doesn't recognize CDATA sections (that's XML-only), so its corpus
// drops the one fragment above that uses one.
const HTML_FRAGMENTS: &[&str] = &[
    "<a>1</a>",
    "<b x=\"1\"><c></c></b>",
    "<d></d>",
    "<e><!-- note --><f>g</f></e>",
];

fn css_stylesheet() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(CSS_RULES), 1..5)
        .prop_map(|rules| rules.join(""))
}

fn js_program() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(JS_STATEMENTS), 1..6)
        .prop_map(|stmts| stmts.join("\n"))
}

fn xml_document() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(XML_FRAGMENTS), 1..5)
        .prop_map(|frags| format!("<root>{}</root>", frags.join("")))
}

fn html_document() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(HTML_FRAGMENTS), 1..5)
        .prop_map(|frags| format!("<root>{}</root>", frags.join("")))
}

// A small recursive JSON value generator, text-rendered with ad hoc
// whitespace so the minifier actually has work to do.
fn json_value() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("null".to_string()),
        Just("true".to_string()),
        Just("false".to_string()),
        (-1000i64..1000).prop_map(|n| n.to_string()),
        "[a-zA-Z0-9 ]{0,8}".prop_map(|s| format!("\"{s}\"")),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(|items| format!(" [ {} ] ", items.join(" , "))),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..4).prop_map(|pairs| {
                let body = pairs
                    .into_iter()
                    .map(|(k, v)| format!("\"{k}\" : {v}"))
                    .collect::<Vec<_>>()
                    .join(" , ");
                format!(" {{ {body} }} ")
            }),
        ]
    })
}

proptest! {
    #[test]
    fn css_is_idempotent(input in css_stylesheet()) {
        let once = minify_css(&input).unwrap();
        let twice = minify_css(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn js_is_idempotent(input in js_program()) {
        let once = minify_js(&input).unwrap();
        let twice = minify_js(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn xml_is_idempotent(input in xml_document()) {
        let once = minify_xml(&input).unwrap();
        let twice = minify_xml(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn html_is_idempotent(input in html_document()) {
        let once = minify_html(&input).unwrap();
        let twice = minify_html(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn json_is_idempotent(input in json_value()) {
        let once = minify_json(&input).unwrap();
        let twice = minify_json(&once).unwrap();
        prop_assert_eq!(once, twice);
    }
}
