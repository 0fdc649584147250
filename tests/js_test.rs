use minilex::minify_js;

#[test]
fn if_else_collapses_single_statement_bodies() {
    let js = "if (x) { y = true ; } else { y = false ; }";
    assert_eq!(minify_js(js).unwrap(), "if(x)y=!0;else y=!1");
}

#[test]
fn comments_are_dropped() {
    let js = "// comment\nvar x = 5; /* block */";
    assert_eq!(minify_js(js).unwrap(), "var x=5");
}

#[test]
fn strings_are_preserved_verbatim() {
    let js = r#"var s = "hello world"; var t = 'test';"#;
    assert_eq!(minify_js(js).unwrap(), r#"var s="hello world";var t='test'"#);
}

#[test]
fn division_vs_regex_disambiguation() {
    assert_eq!(minify_js("let result = a / b;").unwrap(), "let result=a/b");
    assert_eq!(minify_js("let pattern = /test/g;").unwrap(), "let pattern=/test/g");
    assert_eq!(minify_js("(a + b) / c").unwrap(), "(a+b)/c");
}

#[test]
fn template_literal_with_interpolation_is_preserved() {
    let js = r#"const msg = `Hello ${name}`;"#;
    assert_eq!(minify_js(js).unwrap(), r#"const msg=`Hello ${name}`"#);
}

#[test]
fn true_false_become_bang_digit() {
    let js = "function f(){ return true; }";
    assert_eq!(minify_js(js).unwrap(), "function f(){return!0}");
}

#[test]
fn do_while_keeps_its_trailing_semicolon_context() {
    let js = "do { x++ ; } while (x < 10);";
    assert_eq!(minify_js(js).unwrap(), "do{x++;}while(x<10)");
}

#[test]
fn switch_body_is_never_brace_elided() {
    // switch/catch require a literal block body, unlike if/while/for, so
    // neither an empty body nor a single-statement body may drop its
    // braces the way a condition body can.
    assert_eq!(
        minify_js("switch(x){case 1:a();break;}").unwrap(),
        "switch(x){case 1:a();break}"
    );
    assert_eq!(minify_js("switch(x){}").unwrap(), "switch(x){}");
}

#[test]
fn catch_body_is_never_brace_elided() {
    assert_eq!(minify_js("catch(e){}").unwrap(), "catch(e){}");
    assert_eq!(
        minify_js("catch(e){console.log(e);}").unwrap(),
        "catch(e){console.log(e)}"
    );
}

#[test]
fn arrow_function_single_bare_param_drops_parens() {
    assert_eq!(minify_js("const f = (x) => x + 1;").unwrap(), "const f=x=>x+1");
    // A default value or rest param is not eligible for the elision.
    assert_eq!(
        minify_js("const f = (x = 1) => x;").unwrap(),
        "const f=(x=1)=>x"
    );
}

#[test]
fn close_script_inside_a_string_is_escaped() {
    let js = r#"x = "</script>";"#;
    let out = minify_js(js).unwrap();
    assert!(out.contains("<\\/script>"));
    assert!(!out.contains("</script>"));
}

#[test]
fn adjacent_string_literals_are_concatenated() {
    let js = r#"x = "a" + "b" + "c";"#;
    assert_eq!(minify_js(js).unwrap(), r#"x="abc""#);
}

#[test]
fn unclosed_function_body_errors_at_the_opening_brace() {
    let js = "function f() {\n  return 1;";
    let err = minify_js(js).unwrap_err();
    assert!(err.template.contains("expected }"));
}

#[test]
fn empty_and_whitespace_only_input_is_empty_output() {
    assert_eq!(minify_js("").unwrap(), "");
    assert_eq!(minify_js("  \n\t ").unwrap(), "");
}

#[test]
fn is_idempotent_over_a_mixed_sample() {
    let js = "function f(x){ if (x) { return true; } else { return false; } }";
    let once = minify_js(js).unwrap();
    let twice = minify_js(&once).unwrap();
    assert_eq!(once, twice);
}
