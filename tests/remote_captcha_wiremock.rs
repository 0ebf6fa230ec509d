use std::io::Write;
use std::path::PathBuf;

use paywatch::captcha::{CaptchaError, CaptchaResolver, RemoteResolver};
use paywatch::config::CaptchaServiceConfig;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DECODE_PATH: &str = "/create.json";

fn service_config(server: &MockServer) -> CaptchaServiceConfig {
    CaptchaServiceConfig {
        endpoint: format!("{}{}", server.uri(), DECODE_PATH),
        account: "svc-user".to_string(),
        password: "svc-pass".to_string(),
        type_code: "3040".to_string(),
    }
}

fn write_captcha_image(dir: &TempDir) -> PathBuf {
    let image = dir.path().join("captcha.png");
    let mut file = std::fs::File::create(&image).unwrap();
    file.write_all(b"not-really-a-png").unwrap();
    image
}

#[tokio::test]
async fn uploads_image_and_returns_decoded_answer() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let image = write_captcha_image(&dir);

    Mock::given(method("POST"))
        .and(path(DECODE_PATH))
        .and(body_string_contains("username=svc-user"))
        .and(body_string_contains("password=svc-pass"))
        .and(body_string_contains("typeid=3040"))
        .and(body_string_contains("image="))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"result": "ab12"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resolver = RemoteResolver::new(&service_config(&server)).unwrap();
    let answer = resolver.resolve(&image).await.unwrap();

    assert_eq!(answer.as_deref(), Some("ab12"));
}

#[tokio::test]
async fn zero_balance_aborts_resolution() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let image = write_captcha_image(&dir);

    Mock::given(method("POST"))
        .and(path(DECODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"error_code": 1001, "error": "no credit left"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let resolver = RemoteResolver::new(&service_config(&server)).unwrap();
    let err = resolver.resolve(&image).await.unwrap_err();

    assert!(matches!(err, CaptchaError::BalanceExhausted));
}

#[tokio::test]
async fn service_rejection_carries_its_message() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let image = write_captcha_image(&dir);

    Mock::given(method("POST"))
        .and(path(DECODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"error_code": 2, "error": "unreadable image"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let resolver = RemoteResolver::new(&service_config(&server)).unwrap();
    let err = resolver.resolve(&image).await.unwrap_err();

    match err {
        CaptchaError::Rejected(message) => assert_eq!(message, "unreadable image"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_answer_is_treated_as_unresolved() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let image = write_captcha_image(&dir);

    Mock::given(method("POST"))
        .and(path(DECODE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"result": ""}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let resolver = RemoteResolver::new(&service_config(&server)).unwrap();
    let answer = resolver.resolve(&image).await.unwrap();

    assert!(answer.is_none());
}

#[tokio::test]
async fn missing_image_file_is_an_image_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let resolver = RemoteResolver::new(&service_config(&server)).unwrap();
    let err = resolver
        .resolve(&dir.path().join("does-not-exist.png"))
        .await
        .unwrap_err();

    assert!(matches!(err, CaptchaError::Image(_)));
}
