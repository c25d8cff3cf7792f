mod common;

use std::time::Duration;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;

use common::{MockGithub, build_app, new_test_state};
use toplangs_backend::features::card::renderer::{DEFAULT_BACKGROUND, render_lang_card};
use toplangs_backend::features::langs::LangShare;

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, Bytes) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("request");
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, content_type, body)
}

/// 轮询直到缓存命中（后台任务完成），或超时失败。
async fn poll_until_ready(app: &Router, uri: &str) -> (String, Bytes) {
    for _ in 0..100 {
        let (status, content_type, body) = get(app, uri).await;
        match status {
            StatusCode::ACCEPTED => {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            StatusCode::OK => {
                return (content_type.expect("content-type"), body);
            }
            other => panic!("unexpected status while polling: {other}"),
        }
    }
    panic!("card never became ready: {uri}");
}

#[tokio::test]
async fn first_request_is_accepted_then_cached_card_is_served() {
    let mock = MockGithub::new();
    mock.add_user_repo("octocat", "octocat/big", false, false, &[("B", 700)]);
    mock.add_user_repo("octocat", "octocat/small", false, false, &[("A", 300)]);
    let base_url = mock.serve().await;

    let app = build_app(new_test_state(&base_url));

    // 冷启动：未命中缓存，立即 202 且无响应体
    let (status, _, body) = get(&app, "/api/v1/card?name=octocat").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.is_empty());

    // 后台任务完成后，同一用户稳定拿到 200 + SVG
    let (content_type, body) = poll_until_ready(&app, "/api/v1/card?name=octocat").await;
    assert!(content_type.starts_with("image/svg+xml"));

    // 缓存的 markup 与渲染器对同样输入的直接产出逐字节一致
    let expected = render_lang_card(
        &[
            LangShare {
                name: "B".to_string(),
                percent: 0.7,
            },
            LangShare {
                name: "A".to_string(),
                percent: 0.3,
            },
        ],
        DEFAULT_BACKGROUND,
    );
    assert_eq!(body, Bytes::from(expected));
}

#[tokio::test]
async fn custom_background_is_used_for_the_rendered_card() {
    let mock = MockGithub::new();
    mock.add_user_repo("mona", "mona/repo", false, false, &[("Rust", 10)]);
    let base_url = mock.serve().await;

    let app = build_app(new_test_state(&base_url));
    let uri = "/api/v1/card?name=mona&background=%23112233";

    let (status, _, _) = get(&app, uri).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, body) = poll_until_ready(&app, uri).await;
    let svg = String::from_utf8(body.to_vec()).expect("utf8 svg");
    assert!(svg.contains("fill='#112233'"));
}

#[tokio::test]
async fn unknown_subject_keeps_polling_accepted() {
    let mock = MockGithub::new();
    let base_url = mock.serve().await;

    let app = build_app(new_test_state(&base_url));

    // 上游 404：后台任务失败但不对外暴露，轮询始终是 202
    for _ in 0..5 {
        let (status, _, body) = get(&app, "/api/v1/card?name=ghost").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(body.is_empty());
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn zero_language_subject_gets_a_valid_empty_card() {
    let mock = MockGithub::new();
    // 仅有一个 fork 仓库且请求方排除 fork：全部仓库被跳过
    mock.add_user_repo("empty", "empty/forked", false, true, &[("Rust", 100)]);
    let base_url = mock.serve().await;

    let app = build_app(new_test_state(&base_url));
    let uri = "/api/v1/card?name=empty&include_forks=false";

    let (status, _, _) = get(&app, uri).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, body) = poll_until_ready(&app, uri).await;
    let expected = render_lang_card(&[], DEFAULT_BACKGROUND);
    assert_eq!(body, Bytes::from(expected));
}

#[tokio::test]
async fn invalid_parameters_are_rejected_with_422() {
    let mock = MockGithub::new();
    let base_url = mock.serve().await;
    let app = build_app(new_test_state(&base_url));

    let (status, content_type, _) = get(&app, "/api/v1/card?name=octocat&count=0").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));

    let (status, _, _) = get(&app, "/api/v1/card?name=octocat&background=red").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, _) = get(&app, "/api/v1/card?name=bad%20name").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
