use minilex::minify_json;

#[test]
fn strips_whitespace_between_tokens() {
    let json = r#"{ "a" : 1 , "b" : [ true, false, null ] }"#;
    assert_eq!(minify_json(json).unwrap(), r#"{"a":1,"b":[true,false,null]}"#);
}

#[test]
fn nested_containers_round_trip() {
    let json = r#"{"a":{"b":[1,2,{"c":"d"}]}}"#;
    assert_eq!(minify_json(json).unwrap(), json);
}

#[test]
fn rejects_a_trailing_comma() {
    assert!(minify_json(r#"[1, 2, ]"#).is_err());
}

#[test]
fn rejects_unquoted_object_keys() {
    assert!(minify_json(r#"{a: 1}"#).is_err());
}

#[test]
fn rejects_a_missing_colon() {
    let err = minify_json(r#"{"a" 1}"#).unwrap_err();
    assert!(err.template.contains("Expected :"));
}

#[test]
fn rejects_garbage_after_the_top_level_value() {
    assert!(minify_json("1 2").is_err());
}

#[test]
fn accepts_escape_sequences_and_unicode_escapes() {
    let json = r#""line\nbreak é""#;
    assert_eq!(minify_json(json).unwrap(), json);
}

#[test]
fn rejects_an_invalid_escape() {
    assert!(minify_json(r#""\q""#).is_err());
}

#[test]
fn numbers_are_copied_verbatim() {
    for n in ["0", "-1", "1.5", "1e10", "1.5e-10", "-0.5"] {
        assert_eq!(minify_json(n).unwrap(), n);
    }
}

#[test]
fn rejects_leading_zero_numbers() {
    assert!(minify_json("01").is_err());
}

#[test]
fn unclosed_array_errors_at_end_of_document() {
    let err = minify_json("[1,2").unwrap_err();
    assert_eq!(err.offset, 4);
}

#[test]
fn empty_and_whitespace_only_input_is_empty_output() {
    assert_eq!(minify_json("").unwrap(), "");
    assert_eq!(minify_json("   \n").unwrap(), "");
}

#[test]
fn is_idempotent() {
    let json = r#" { "x" : [1, 2, { "y" : true, "z" : null }] } "#;
    let once = minify_json(json).unwrap();
    let twice = minify_json(&once).unwrap();
    assert_eq!(once, twice);
}
