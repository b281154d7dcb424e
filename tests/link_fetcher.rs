use channelmind::fetch::{HttpLinkFetcher, LinkFetcher, FETCH_FAILED_DESCRIPTION};
use channelmind::model::NO_DESCRIPTION;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpLinkFetcher {
    HttpLinkFetcher::new(Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_fetch_reads_title_and_description() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lissabon"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head>
                <title> Lissabon Reiseführer </title>
                <meta name="description" content="Die besten Tipps für Portugal">
            </head><body></body></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;

    let url = format!("{}/lissabon", server.uri());
    let meta = fetcher().fetch(&url).await;

    assert_eq!(meta.url, url);
    assert_eq!(meta.title, "Lissabon Reiseführer");
    assert_eq!(meta.description, "Die besten Tipps für Portugal");
    assert_eq!(meta.domain, server.address().to_string());
}

#[tokio::test]
async fn test_fetch_falls_back_to_open_graph() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/og"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><meta property="og:title" content="Inter Font"></head></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;

    let meta = fetcher().fetch(&format!("{}/og", server.uri())).await;
    assert_eq!(meta.title, "Inter Font");
    assert_eq!(meta.description, NO_DESCRIPTION);
}

#[tokio::test]
async fn test_non_ok_status_yields_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let meta = fetcher().fetch(&format!("{}/missing", server.uri())).await;
    assert_eq!(meta.title, format!("Link zu {}", server.address()));
    assert_eq!(meta.description, FETCH_FAILED_DESCRIPTION);
}

#[tokio::test]
async fn test_unreachable_host_yields_fallback() {
    // nothing listens on port 9 locally
    let meta = fetcher().fetch("http://127.0.0.1:9/seite").await;
    assert_eq!(meta.title, "Link zu 127.0.0.1:9");
    assert_eq!(meta.description, FETCH_FAILED_DESCRIPTION);
    assert_eq!(meta.domain, "127.0.0.1:9");
}
