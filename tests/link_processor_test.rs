use proptest::prelude::*;
use url::Url;
use vidcrawl::config::CrawlConfig;
use vidcrawl::crawl_engine::{filter_link, process_page_links};
use vidcrawl::utils::{matches_url_shape, normalize_link};

fn config_with_pattern(pattern: &str) -> CrawlConfig {
    CrawlConfig::builder()
        .seed_url("http://example.com/")
        .depth(2)
        .include_pattern(pattern)
        .build()
        .expect("valid config")
}

#[test]
fn root_relative_link_gets_page_origin() {
    let page = Url::parse("http://example.com/watch").unwrap();
    assert_eq!(
        normalize_link(&page, "/watch?v=abc").as_deref(),
        Some("http://example.com/watch?v=abc")
    );
}

#[test]
fn absolute_link_passes_through_unchanged() {
    let page = Url::parse("http://example.com/watch").unwrap();
    assert_eq!(
        normalize_link(&page, "https://other.org/a?b=c#d").as_deref(),
        Some("https://other.org/a?b=c#d")
    );
}

#[test]
fn inclusion_regex_rejects_urls_of_valid_shape() {
    let config = config_with_pattern(r"^http://example\.com/.*$");
    let page = Url::parse("http://example.com/").unwrap();

    assert!(matches_url_shape("http://other.com/x"));
    assert_eq!(filter_link(&page, "http://other.com/x", &config), None);
    assert_eq!(
        filter_link(&page, "/x", &config).as_deref(),
        Some("http://example.com/x")
    );
}

#[test]
fn shapeless_links_are_dropped() {
    let config = config_with_pattern("^.*$");
    let page = Url::parse("http://example.com/").unwrap();

    assert_eq!(filter_link(&page, "mailto:a@example.com", &config), None);
    assert_eq!(filter_link(&page, "#top", &config), None);
    assert_eq!(filter_link(&page, "", &config), None);
}

#[test]
fn encoded_ampersands_are_decoded() {
    let config = config_with_pattern("^.*$");
    let page = Url::parse("http://example.com/").unwrap();
    assert_eq!(
        filter_link(&page, "/watch?v=abc&amp;list=xyz", &config).as_deref(),
        Some("http://example.com/watch?v=abc&list=xyz")
    );
}

#[test]
fn numeric_and_named_references_are_decoded() {
    let config = config_with_pattern("^.*$");
    let page = Url::parse("http://example.com/").unwrap();
    assert_eq!(
        filter_link(&page, "/watch?v=abc&#38;t=4&#x26;list=x&quot;y", &config).as_deref(),
        Some("http://example.com/watch?v=abc&t=4&list=x\"y")
    );
}

#[test]
fn page_links_with_mixed_references_resolve_to_one_url() {
    let config = config_with_pattern(r"^http://example\.com/");
    let body = r#"<a href='/x?a=1&amp;b=2&#38;c=3'>x</a><a href="/x?a=1&b=2&#x26;c=3">again</a>"#;

    let report = process_page_links("http://example.com/", body, &config);
    assert_eq!(report.found, 2);
    assert_eq!(report.accepted, vec!["http://example.com/x?a=1&b=2&c=3"]);
}

#[test]
fn page_links_are_distinct_and_in_document_order() {
    let config = config_with_pattern(r"^http://example\.com/");
    let body = r##"<html><body>
        <a href="/b">b</a>
        <a href="http://external.com/c">c</a>
        <a href="/a">a</a>
        <a href="/b">b again</a>
        <a href="#frag">fragment</a>
    </body></html>"##;

    let report = process_page_links("http://example.com/start", body, &config);
    assert_eq!(report.found, 5);
    assert_eq!(
        report.accepted,
        vec!["http://example.com/b", "http://example.com/a"]
    );
}

#[test]
fn unparseable_page_url_yields_nothing() {
    let config = config_with_pattern("^.*$");
    let report = process_page_links("not a url", r#"<a href="/x">x</a>"#, &config);
    assert!(report.accepted.is_empty());
}

proptest! {
    #[test]
    fn root_relative_paths_resolve_onto_the_page_origin(path in "(/[a-z0-9]{1,8}){1,4}") {
        let page = Url::parse("http://example.com:8080/deep/page").unwrap();
        let normalized = normalize_link(&page, &path).unwrap();
        prop_assert_eq!(normalized, format!("http://example.com:8080{path}"));
    }

    #[test]
    fn accepted_links_always_have_url_shape(raw in "\\PC{0,40}") {
        let config = config_with_pattern("^.*$");
        let page = Url::parse("http://example.com/").unwrap();
        if let Some(accepted) = filter_link(&page, &raw, &config) {
            prop_assert!(matches_url_shape(&accepted));
        }
    }
}
