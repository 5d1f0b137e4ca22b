use crate::Selector;

#[test]
fn test_basic_class_name_selector() {
    let selector = Selector::from("classname:android.widget.Button");
    assert_eq!(
        selector,
        Selector::ClassName("android.widget.Button".to_string())
    );
}

#[test]
fn test_resource_id_keeps_inner_colons() {
    let selector = Selector::from("resourceid:android:id/button1");
    assert_eq!(
        selector,
        Selector::ResourceId("android:id/button1".to_string())
    );
    assert_eq!(Selector::from("id:android:id/button1"), selector);
}

#[test]
fn test_and_selector() {
    let selector = Selector::from("package:android && textcontains:isn't responding.");
    match selector {
        Selector::And(parts) => {
            assert_eq!(parts.len(), 2);
            assert_eq!(parts[0], Selector::PackageName("android".to_string()));
            assert_eq!(
                parts[1],
                Selector::TextContains("isn't responding.".to_string())
            );
        }
        other => panic!("Expected And selector, got: {other:?}"),
    }
}

#[test]
fn test_builder_flattens_nested_and() {
    let built = Selector::class_name("android.widget.Button")
        .and(Selector::package_name("com.android.browser"))
        .and(Selector::text("Continue"));
    match &built {
        Selector::And(parts) => assert_eq!(parts.len(), 3),
        other => panic!("Expected flat And selector, got: {other:?}"),
    }
    assert_eq!(
        Selector::from("classname:android.widget.Button && package:com.android.browser && text:Continue"),
        built
    );
}

#[test]
fn test_display_parses_back() {
    let selector = Selector::text("OK").and(Selector::enabled(true));
    assert_eq!(selector.to_string(), "text:OK && enabled:true");
    assert_eq!(Selector::from(selector.to_string().as_str()), selector);
}

#[test]
fn test_has_selector_with_group() {
    let selector = Selector::from("classname:android.app.Dialog && has:(text:OK && enabled:true)");
    let expected = Selector::class_name("android.app.Dialog").and(Selector::has(
        Selector::text("OK").and(Selector::enabled(true)),
    ));
    assert_eq!(selector, expected);
    assert_eq!(
        expected.to_string(),
        "classname:android.app.Dialog && has:(text:OK && enabled:true)"
    );
}

#[test]
fn test_invalid_selectors() {
    assert!(!Selector::from("").is_valid());
    assert!(!Selector::from("Continue").is_valid());
    assert!(!Selector::from("colour:red").is_valid());
    assert!(!Selector::from("enabled:maybe").is_valid());
    assert!(!Selector::from("text:OK &&").is_valid());
    assert!(!Selector::from("(text:OK").is_valid());
    assert!(!Selector::from("text:OK)").is_valid());
    assert!(Selector::from("text:OK && enabled:false").is_valid());
}

#[test]
fn test_display_quotes_values_with_operators() {
    for value in ["Save && exit", "Close :)", "(beta", "say \"hi\"", r"C:\temp", " padded "] {
        let selector = Selector::text(value);
        assert_eq!(
            Selector::from(selector.to_string().as_str()),
            selector,
            "round trip failed for {value:?} via {selector}"
        );
    }
    assert_eq!(Selector::text("Save && exit").to_string(), r#"text:"Save && exit""#);
    assert_eq!(Selector::text(r#"say "hi""#).to_string(), r#"text:"say \"hi\"""#);
    assert_eq!(Selector::text("OK").to_string(), "text:OK");
}

#[test]
fn test_quoted_values_inside_and_and_has() {
    let selector = Selector::text_contains("Close :)")
        .and(Selector::has(
            Selector::text("Save && exit").and(Selector::enabled(true)),
        ))
        .and(Selector::resource_id("id/(main)"));
    let rendered = selector.to_string();
    assert_eq!(
        rendered,
        r#"textcontains:"Close :)" && has:(text:"Save && exit" && enabled:true) && resourceid:"id/(main)""#
    );
    assert_eq!(Selector::from(rendered.as_str()), selector);
}

#[test]
fn test_quoted_value_errors() {
    assert!(!Selector::from(r#"text:"Save && exit"#).is_valid());
    assert!(!Selector::from(r#"text:"OK" trailing"#).is_valid());
    assert_eq!(
        Selector::from(r#"text:"OK" && enabled:true"#),
        Selector::text("OK").and(Selector::enabled(true))
    );
}
