use axum::http::Method;
use axum::http::StatusCode;
use serde_json::json;

use crate::tests::helper;
use crate::tests::helper::Click;

#[tokio::test]
async fn test_create_redirect_and_stats() {
    let mut app = helper::setup_test_app();

    let (status_code, short_url, _) = helper::maybe_create_short_url_with_expiry(
        &mut app,
        "https://openai.com",
        Some("gpt"),
        Some(json!(60)),
    )
    .await;
    assert_eq!(StatusCode::CREATED, status_code);

    let short_url = short_url.unwrap();
    assert_eq!("gpt", short_url.shortcode);
    assert_eq!("http://localhost:5000/gpt", short_url.short_url);
    assert_eq!("https://openai.com", short_url.long_url);
    assert_eq!(0, short_url.clicks);

    let (status_code, location, _) = helper::root_with_headers(
        &mut app,
        Method::GET,
        "gpt",
        Some("https://chat.example.com/"),
        Some("Mozilla/5.0"),
    )
    .await;
    assert_eq!(StatusCode::FOUND, status_code);
    assert_eq!(Some("https://openai.com".to_string()), location);

    let (status_code, short_url, _) = helper::short_url_stats(&mut app, "gpt").await;
    assert_eq!(StatusCode::OK, status_code);

    let short_url = short_url.unwrap();
    assert_eq!(1, short_url.clicks);
    assert_eq!(
        Some(vec![Click {
            source: "https://chat.example.com/".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
        }]),
        short_url.click_logs
    );

    let (_, short_urls) = helper::list_short_urls(&mut app).await;
    let short_urls = short_urls.unwrap();
    assert_eq!(1, short_urls.len());
    assert_eq!(1, short_urls[0].clicks);
}
