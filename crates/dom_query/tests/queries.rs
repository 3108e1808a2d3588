use dom_query::{
    AttributeQuery, DomQuery, ElementQuery, QueryError, parse_html, query_attribute, query_element,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn finds_element_and_reads_attributes() {
    init_logging();
    let doc = parse_html(r#"<div id="a" title="hello"></div>"#).unwrap();

    let div = query_element(&doc, &ElementQuery::new("#a")).unwrap();
    assert_eq!(div.tag_name(), "div");
    assert_eq!(div.attribute("id"), Some("a"));

    assert_eq!(
        query_attribute(&doc, &AttributeQuery::new("#a", "title")),
        Ok("hello")
    );

    let err = query_attribute(&doc, &AttributeQuery::new("#a", "missing")).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"The element <div id="a" title="hello"> does not have missing as an attribute"#
    );
}

#[test]
fn missing_element_reports_selector_and_scope() {
    init_logging();
    let doc = parse_html("<p>nothing to see</p>").unwrap();
    let err = query_element(&doc, &ElementQuery::new("#missing")).unwrap_err();
    assert!(matches!(&err, QueryError::ElementNotFound { selector, .. } if selector == "#missing"));
    assert_eq!(
        err.to_string(),
        "DOM Element with selector '#missing' not found in #document"
    );
}

#[test]
fn single_match_is_returned_for_each_selector() {
    init_logging();
    let doc = parse_html(
        r#"<main>
             <h1 class="title">Heading</h1>
             <ul id="items"><li data-k="1">one</li><li data-k="2" class="last">two</li></ul>
             <footer lang="en-GB">end</footer>
           </main>"#,
    )
    .unwrap();

    for (selector, tag) in [
        ("h1.title", "h1"),
        ("#items", "ul"),
        ("li[data-k='2']", "li"),
        ("ul > .last", "li"),
        ("[lang|=en]", "footer"),
        ("h1 ~ footer", "footer"),
    ] {
        let found = query_element(&doc, &ElementQuery::new(selector)).unwrap();
        assert_eq!(found.tag_name(), tag, "selector {selector}");
    }
}

#[test]
fn zero_matches_always_fail() {
    init_logging();
    let doc = parse_html("<section><p class='x'></p></section>").unwrap();
    for selector in ["article", ".y", "p > section", "[data-none]", "section + p"] {
        let err = query_element(&doc, &ElementQuery::new(selector)).unwrap_err();
        assert!(
            matches!(err, QueryError::ElementNotFound { .. }),
            "selector {selector}: {err}"
        );
    }
}

#[test]
fn omitted_scope_is_the_document() {
    init_logging();
    let doc = parse_html("<span id='s'></span>").unwrap();
    let implicit = query_element(&doc, &ElementQuery::new("#s")).unwrap();
    let explicit = query_element(&doc, &ElementQuery::new("#s").within(doc.root())).unwrap();
    assert_eq!(implicit, explicit);

    let implicit_err = query_element(&doc, &ElementQuery::new("#t")).unwrap_err();
    let explicit_err =
        query_element(&doc, &ElementQuery::new("#t").within(doc.root())).unwrap_err();
    assert_eq!(implicit_err, explicit_err);
}

#[test]
fn present_empty_and_absent_attributes() {
    init_logging();
    let doc = parse_html(r#"<input id="f" data-x="5" data-y="">"#).unwrap();
    assert_eq!(doc.query_attribute("#f", "data-x"), Ok("5"));
    assert_eq!(doc.query_attribute("#f", "data-y"), Ok(""));
    assert!(matches!(
        doc.query_attribute("#f", "data-z"),
        Err(QueryError::AttributeNotFound { attribute, .. }) if attribute == "data-z"
    ));
}

#[test]
fn first_match_in_document_order_wins() {
    init_logging();
    let doc = parse_html("<ol><li id='one'><li id='two'></ol><li id='three'>").unwrap();
    assert_eq!(doc.query_attribute("li", "id"), Ok("one"));
}

#[test]
fn element_scope_limits_candidates_but_not_context() {
    init_logging();
    let doc = parse_html(
        r#"<section id="s"><div class="c"><p id="inside"></p></div></section><p id="outside"></p>"#,
    )
    .unwrap();
    let scope = doc.query_element("div.c").unwrap().id();

    let found = query_element(&doc, &ElementQuery::new("section p").within(scope)).unwrap();
    assert_eq!(found.attribute("id"), Some("inside"));

    let itself = query_element(&doc, &ElementQuery::new("div").within(scope)).unwrap_err();
    assert_eq!(
        itself.to_string(),
        r#"DOM Element with selector 'div' not found in <div class="c">"#
    );

    assert!(matches!(
        query_element(&doc, &ElementQuery::new("#outside").within(scope)),
        Err(QueryError::ElementNotFound { .. })
    ));
    assert_eq!(
        query_attribute(&doc, &AttributeQuery::new("p", "id").within(scope)),
        Ok("inside")
    );
}

#[test]
fn foreign_and_text_scopes_are_undefined() {
    init_logging();
    let doc = parse_html("<p id='p'>words</p>").unwrap();
    let other = parse_html("<p id='p'>words</p>").unwrap();
    let foreign = other.query_element("#p").unwrap().id();

    let err = query_element(&doc, &ElementQuery::new("p").within(foreign)).unwrap_err();
    assert_eq!(err.to_string(), "The scope '#detached' is undefined");

    let para = doc.query_element("#p").unwrap().id();
    let text = doc.children(para).next().unwrap();
    let err = query_element(&doc, &ElementQuery::new("p").within(text)).unwrap_err();
    assert!(matches!(err, QueryError::ScopeUndefined { .. }));

    let err = query_attribute(&doc, &AttributeQuery::new("p", "id").within(text)).unwrap_err();
    assert!(matches!(err, QueryError::ScopeUndefined { .. }));
}

#[test]
fn invalid_selectors_surface_parse_errors() {
    init_logging();
    let doc = parse_html("<div></div>").unwrap();
    for selector in ["", "div[", "a >", "p:hover", "#", "#1", ".2", r#"[a=x"y]"#, "p::nope"] {
        let err = query_element(&doc, &ElementQuery::new(selector)).unwrap_err();
        assert!(
            matches!(err, QueryError::Selector(_)),
            "selector {selector:?}: {err}"
        );
    }
}

#[test]
fn scope_is_checked_before_selector() {
    init_logging();
    let doc = parse_html("<p>x</p>").unwrap();
    let other = parse_html("<p>x</p>").unwrap();
    let err = query_element(&doc, &ElementQuery::new("div[").within(other.root())).unwrap_err();
    assert!(matches!(err, QueryError::ScopeUndefined { .. }));
}

#[test]
fn namespaced_attributes_use_qualified_names() {
    init_logging();
    let doc = parse_html(r##"<svg id="s" xml:lang="en"><use id="u" xlink:href="#a"></use></svg>"##)
        .unwrap();
    assert_eq!(doc.query_attribute("#u", "xlink:href"), Ok("#a"));
    assert_eq!(doc.query_attribute("#s", "xml:lang"), Ok("en"));

    let err = doc.query_attribute("#u", "href").unwrap_err();
    assert_eq!(
        err.to_string(),
        r##"The element <use id="u" xlink:href="#a"> does not have href as an attribute"##
    );
}

#[test]
fn structural_selectors_resolve_or_report_not_found() {
    init_logging();
    let doc = parse_html(
        "<ul><li id='a'>1</li><li id='b'>2</li><li id='c'></li></ul><p id='p'>text</p>",
    )
    .unwrap();
    for (selector, id) in [
        ("li:nth-child(2)", "b"),
        ("li:nth-last-child(1)", "c"),
        ("li:nth-child(odd):not(:first-child)", "c"),
        ("li:last-of-type", "c"),
        ("li:empty", "c"),
        ("p:only-of-type", "p"),
    ] {
        assert_eq!(doc.query_attribute(selector, "id"), Ok(id), "selector {selector}");
    }

    for selector in ["p::before", "li:after", "li:nth-child(4)", "p:empty"] {
        let err = doc.query_element(selector).unwrap_err();
        assert!(
            matches!(err, QueryError::ElementNotFound { .. }),
            "selector {selector}: {err}"
        );
    }
}
