//! HTTP collaborators against a mock server

use mockito::{Matcher, Server};
use std::time::Duration;
use url::Url;

use vidcrawl::config::{CrawlConfig, MetadataSourceConfig};
use vidcrawl::crawl_engine::{FetchError, Fetcher, HttpFetcher};
use vidcrawl::youtube::{MetadataError, VideoApiClient};
use vidcrawl::{ShutdownHandle, crawl_to_writer};

fn fetcher() -> HttpFetcher {
    HttpFetcher::new("vidcrawl-test", Duration::from_secs(5), 1024).unwrap()
}

#[tokio::test]
async fn fetches_a_page_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/page")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<a href=\"/next\">next</a>")
        .create_async()
        .await;

    let page = fetcher()
        .fetch(&format!("{}/page", server.url()))
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert!(page.body.contains("/next"));
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/gone")
        .with_status(404)
        .create_async()
        .await;

    let result = fetcher().fetch(&format!("{}/gone", server.url())).await;
    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/big")
        .with_status(200)
        .with_body("x".repeat(4096))
        .create_async()
        .await;

    let result = fetcher().fetch(&format!("{}/big", server.url())).await;
    assert!(matches!(result, Err(FetchError::BodyTooLarge { limit: 1024, .. })));
}

#[tokio::test]
async fn invalid_url_is_rejected_without_a_request() {
    let result = fetcher().fetch("not a url").await;
    assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
}

#[tokio::test]
async fn api_client_resolves_watch_urls() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/videos")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("part".into(), "snippet,statistics".into()),
            Matcher::UrlEncoded("id".into(), "abc".into()),
            Matcher::UrlEncoded("key".into(), "test-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "kind": "youtube#videoListResponse",
                "etag": "e",
                "items": [{
                    "id": "abc",
                    "snippet": {
                        "publishedAt": "2017-01-01T00:00:00Z",
                        "channelId": "UC1",
                        "title": "A video",
                        "description": "d",
                        "channelTitle": "Channel",
                        "tags": ["one", "two"],
                        "categoryId": "10"
                    },
                    "statistics": {
                        "viewCount": "42",
                        "likeCount": "7",
                        "dislikeCount": "1",
                        "favoriteCount": "0",
                        "commentCount": "3"
                    }
                }]
            }"#,
        )
        .create_async()
        .await;

    let client =
        VideoApiClient::with_endpoint("test-key", server.url(), Duration::from_secs(5)).unwrap();
    let url = Url::parse("https://www.youtube.com/watch?v=abc").unwrap();
    let video = client.lookup_url(&url).await.unwrap().expect("video found");

    assert_eq!(video.id, "abc");
    assert_eq!(video.snippet.title, "A video");
    assert_eq!(video.snippet.tags, vec!["one", "two"]);
    assert_eq!(video.statistics.view_count, "42");
    mock.assert_async().await;
}

#[tokio::test]
async fn api_client_skips_urls_without_video_id() {
    let mut server = Server::new_async().await;
    let mock = server.mock("GET", Matcher::Any).expect(0).create_async().await;

    let client =
        VideoApiClient::with_endpoint("test-key", server.url(), Duration::from_secs(5)).unwrap();
    let url = Url::parse("https://www.youtube.com/feed/trending").unwrap();
    assert!(client.lookup_url(&url).await.unwrap().is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn api_client_reports_error_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("quota exceeded")
        .create_async()
        .await;

    let client =
        VideoApiClient::with_endpoint("test-key", server.url(), Duration::from_secs(5)).unwrap();
    let result = client.list("abc").await;
    assert!(matches!(
        result,
        Err(MetadataError::Status { status: 403, ref message }) if message == "quota exceeded"
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn crawl_streams_videos_as_json_lines() {
    let mut server = Server::new_async().await;
    let base = server.url();

    server
        .mock("GET", "/")
        .with_status(200)
        .with_body(r#"<a href="/watch?v=abc">video</a><a href="https://elsewhere.example/">out</a>"#)
        .create_async()
        .await;
    server
        .mock("GET", "/watch")
        .match_query(Matcher::UrlEncoded("v".into(), "abc".into()))
        .with_status(200)
        .with_body(r#"<html><head><meta name="title" content="Mock video"></head><body></body></html>"#)
        .create_async()
        .await;

    let config = CrawlConfig::builder()
        .seed_url(format!("{base}/"))
        .depth(2)
        .include_pattern(format!("^{}", regex::escape(&base)))
        .concurrency(2)
        .metadata_source(MetadataSourceConfig::PageScrape)
        .build()
        .unwrap();

    let (writer, mut reader) = tokio::io::duplex(64 * 1024);
    let (summary, written) = tokio::time::timeout(
        Duration::from_secs(15),
        crawl_to_writer(config, writer, ShutdownHandle::new()),
    )
    .await
    .expect("crawl terminates")
    .unwrap();

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(written, 1);

    let mut output = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut reader, &mut output)
        .await
        .unwrap();
    let record: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
    assert_eq!(record["id"], "abc");
    assert_eq!(record["snippet"]["title"], "Mock video");
}
