use minilex::minify_xml;

#[test]
fn empty_element_pair_becomes_self_closing() {
    assert_eq!(minify_xml("<a></a>").unwrap(), "<a/>");
    assert_eq!(minify_xml("<book><title></title></book>").unwrap(), "<book><title/></book>");
}

#[test]
fn tag_names_are_case_sensitive() {
    // The empty-element self-closing rewrite only fires on an exact,
    // case-sensitive name match in XML.
    assert_eq!(minify_xml("<A></A>").unwrap(), "<A/>");
    assert_eq!(minify_xml("<A></a>").unwrap(), "<A></a>");
}

#[test]
fn pre_script_and_style_recognition_is_case_sensitive_in_xml() {
    // `<Pre>`, `<Script>` and `<Style>` are ordinary, unrelated element
    // names under XML's case-sensitive tag-name rule: none of them may
    // trigger HTML's `pre` whitespace preservation or the `script`/
    // `style` inline-body pipeline.
    assert_eq!(minify_xml("<Pre>  a  b  </Pre>").unwrap(), "<Pre>a b</Pre>");
    assert_eq!(
        minify_xml("<Script>x = 1 + 1;</Script>").unwrap(),
        "<Script>x = 1 + 1;</Script>"
    );
    assert_eq!(
        minify_xml("<Style>a  {  color : red ;  }</Style>").unwrap(),
        "<Style>a { color : red ; }</Style>"
    );
}

#[test]
fn attribute_quoting_is_always_preserved() {
    let xml = r#"<book id="42" title='A title'/>"#;
    assert_eq!(minify_xml(xml).unwrap(), xml);
}

#[test]
fn cdata_sections_are_copied_verbatim() {
    let xml = "<a><![CDATA[<b> & raw text ]]></a>";
    assert_eq!(minify_xml(xml).unwrap(), xml);
}

#[test]
fn processing_instructions_survive() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?><root/>"#;
    assert_eq!(minify_xml(xml).unwrap(), xml);
}

#[test]
fn inter_element_whitespace_collapses() {
    let xml = "<root>\n  <a>1</a>\n  <b>2</b>\n</root>";
    assert_eq!(minify_xml(xml).unwrap(), "<root><a>1</a><b>2</b></root>");
}

#[test]
fn inline_style_element_is_minified_through_css() {
    let xml = "<svg><style>.a { fill : red ; }</style></svg>";
    assert_eq!(minify_xml(xml).unwrap(), "<svg><style>.a{fill:red}</style></svg>");
}

#[test]
fn inline_script_entities_are_decoded_then_reencoded() {
    let xml = "<script>x = 1 &amp;&amp; 2;</script>";
    assert_eq!(minify_xml(xml).unwrap(), "<script>x=1&amp;&amp;2</script>");
}

#[test]
fn unclosed_comment_errors_at_its_start() {
    let err = minify_xml("<a><!-- never closes</a>").unwrap_err();
    assert_eq!(err.offset, 3);
}

#[test]
fn empty_input_is_empty_output() {
    assert_eq!(minify_xml("").unwrap(), "");
}

#[test]
fn is_idempotent() {
    let xml = "<root>\n  <a>1</a>\n  <b></b>\n</root>";
    let once = minify_xml(xml).unwrap();
    let twice = minify_xml(&once).unwrap();
    assert_eq!(once, twice);
}
