use std::time::Duration;

use groundcheck_scout::{HttpScraper, PageScraper};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article_html() -> String {
    let paragraph = "<p>The sky appears blue because molecules in the atmosphere scatter \
        short wavelengths of sunlight far more strongly than long ones, an effect known \
        as Rayleigh scattering that was first described in the nineteenth century.</p>";
    format!(
        "<html><head><title>Why is the sky blue?</title></head><body>\
         <nav><a href=\"/\">Home</a><a href=\"/about\">About</a></nav>\
         <article><h1>Why is the sky blue?</h1>{}</article>\
         <footer>Copyright</footer></body></html>",
        paragraph.repeat(6)
    )
}

fn scraper() -> HttpScraper {
    HttpScraper::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn extracts_article_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sky"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(article_html(), "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let text = scraper().scrape(&format!("{}/sky", server.uri())).await.unwrap();
    assert!(text.contains("Rayleigh scattering"));
    assert!(!text.contains("<p>"));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = scraper().scrape(&format!("{}/missing", server.uri())).await.unwrap_err();
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn binary_content_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;

    let err = scraper().scrape(&format!("{}/report.pdf", server.uri())).await.unwrap_err();
    assert!(err.to_string().contains("Unsupported content type"));
}

#[tokio::test]
async fn non_html_text_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("a,b,c\n1,2,3", "text/csv"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notes.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("just some notes", "text/plain"),
        )
        .mount(&server)
        .await;

    for page in ["data.csv", "notes.txt"] {
        let err = scraper()
            .scrape(&format!("{}/{page}", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported content type"), "{page}: {err}");
    }
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    let body = format!("<html><body><p>{}</p></body></html>", "x".repeat(7 * 1024 * 1024));
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(&server)
        .await;

    let err = scraper().scrape(&format!("{}/huge", server.uri())).await.unwrap_err();
    assert!(err.to_string().contains("size cap"));
}

#[tokio::test]
async fn only_http_schemes_are_fetched() {
    let err = scraper().scrape("file:///etc/passwd").await.unwrap_err();
    assert!(err.to_string().contains("Only http/https"));
}

#[tokio::test]
async fn empty_body_yields_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;

    let text = scraper().scrape(&server.uri()).await.unwrap();
    assert!(text.is_empty());
}
