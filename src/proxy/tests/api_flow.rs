use axum::http::{Method, StatusCode};
use serde_json::json;

use super::{post_json, send, test_app, test_app_with, FakeProvider, FAKE_MODEL};
use crate::proxy::upstream::UpstreamError;
use crate::test_utils::{test_app_config, TEST_FREE_TOKEN, TEST_MASTER_KEY, TEST_PRO_TOKEN};

fn blog_request() -> serde_json::Value {
    json!({"type": "blog", "prompt": "Ten tips for remote teams"})
}

#[tokio::test]
async fn generate_wraps_provider_output() {
    let app = test_app();
    let res = post_json(&app.router, "/api/generate", Some(TEST_FREE_TOKEN), blog_request()).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body,
        json!({
            "content": "Generated text",
            "usage": {"prompt_tokens": 12, "completion_tokens": 30, "total_tokens": 42},
            "model": FAKE_MODEL
        })
    );
    assert_eq!(res.header("x-quota-limit"), Some("2"));
    assert_eq!(res.header("x-quota-remaining"), Some("1"));

    let calls = app.provider.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].system.contains("blog writer"));
    assert_eq!(calls[0].user, "Ten tips for remote teams");
}

#[tokio::test]
async fn rewrite_and_translate_pass_through() {
    let app = test_app();

    let rewrite = post_json(
        &app.router,
        "/api/rewrite",
        Some(TEST_PRO_TOKEN),
        json!({"text": "we done good this quarter", "style": "formal"}),
    )
    .await;
    assert_eq!(rewrite.status, StatusCode::OK);
    assert_eq!(rewrite.body["content"], "Generated text");

    let translate = post_json(
        &app.router,
        "/api/translate",
        Some(TEST_PRO_TOKEN),
        json!({"text": "Bonjour", "source_lang": "auto", "target_lang": "de"}),
    )
    .await;
    assert_eq!(translate.status, StatusCode::OK);
    assert_eq!(translate.body["usage"]["total_tokens"], 42);

    let calls = app.provider.calls();
    assert!(calls[0].system.contains("formal, professional tone"));
    assert_eq!(calls[1].user, "Translate to de:\n\nBonjour");
}

#[tokio::test]
async fn requests_without_valid_token_are_unauthorized() {
    let app = test_app();
    let router = &app.router;

    let missing = post_json(router, "/api/generate", None, blog_request()).await;
    let unknown = post_json(router, "/api/generate", Some("wf-nope"), blog_request()).await;
    let usage = send(router, Method::GET, "/api/usage", Some("wf-nope"), None).await;

    for res in [&missing, &unknown, &usage] {
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.error_type(), "unauthorized");
    }
    assert!(app.provider.calls().is_empty());
}

#[tokio::test]
async fn free_token_is_rejected_at_ceiling() {
    let app = test_app();
    for _ in 0..2 {
        let res = post_json(&app.router, "/api/generate", Some(TEST_FREE_TOKEN), blog_request()).await;
        assert_eq!(res.status, StatusCode::OK);
    }

    let rejected =
        post_json(&app.router, "/api/generate", Some(TEST_FREE_TOKEN), blog_request()).await;
    assert_eq!(rejected.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(rejected.error_type(), "rate_limited");
    assert_eq!(rejected.header("x-quota-remaining"), Some("0"));
    assert_eq!(app.provider.calls().len(), 2);

    // Other tokens keep their own counters.
    let pro = post_json(&app.router, "/api/generate", Some(TEST_PRO_TOKEN), blog_request()).await;
    assert_eq!(pro.status, StatusCode::OK);
}

#[tokio::test]
async fn master_key_is_never_rate_limited() {
    let app = test_app();
    for _ in 0..10 {
        let res = post_json(&app.router, "/api/generate", Some(TEST_MASTER_KEY), blog_request()).await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.header("x-quota-limit").is_none());
    }
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests() {
    let app = test_app();
    let router = &app.router;

    let bad_type = post_json(
        router,
        "/api/generate",
        Some(TEST_MASTER_KEY),
        json!({"type": "poem", "prompt": "roses"}),
    )
    .await;
    let short_text = post_json(
        router,
        "/api/rewrite",
        Some(TEST_MASTER_KEY),
        json!({"text": "a"}),
    )
    .await;
    let missing_field = post_json(
        router,
        "/api/translate",
        Some(TEST_MASTER_KEY),
        json!({"target_lang": "en"}),
    )
    .await;

    for res in [&bad_type, &short_text, &missing_field] {
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.error_type(), "bad_request");
    }
    assert!(app.provider.calls().is_empty());
}

#[tokio::test]
async fn rejected_body_still_counts_against_quota() {
    let app = test_app();
    let res = post_json(
        &app.router,
        "/api/generate",
        Some(TEST_FREE_TOKEN),
        json!({"type": "blog"}),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let usage = app.tokens.usage(TEST_FREE_TOKEN).expect("usage");
    assert_eq!(usage.used_today, 1);
}

#[tokio::test]
async fn provider_failures_map_to_gateway_errors() {
    let cases: [(fn() -> UpstreamError, StatusCode, &str); 3] = [
        (
            || UpstreamError::RateLimited,
            StatusCode::TOO_MANY_REQUESTS,
            "upstream_rate_limited",
        ),
        (
            || UpstreamError::Timeout,
            StatusCode::GATEWAY_TIMEOUT,
            "upstream_error",
        ),
        (
            || UpstreamError::Status {
                status: 500,
                message: "internal detail".to_string(),
            },
            StatusCode::BAD_GATEWAY,
            "upstream_error",
        ),
    ];

    for (make_error, status, kind) in cases {
        let app = test_app_with(&test_app_config(), FakeProvider::failing(make_error));
        let res = post_json(&app.router, "/api/generate", Some(TEST_PRO_TOKEN), blog_request()).await;
        assert_eq!(res.status, status);
        assert_eq!(res.error_type(), kind);
        assert!(!res.body.to_string().contains("internal detail"));
    }
}

#[tokio::test]
async fn usage_reports_without_charging() {
    let app = test_app();
    post_json(&app.router, "/api/generate", Some(TEST_FREE_TOKEN), blog_request()).await;

    for _ in 0..3 {
        let res = send(&app.router, Method::GET, "/api/usage", Some(TEST_FREE_TOKEN), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["tier"], "free");
        assert_eq!(res.body["used_today"], 1);
        assert_eq!(res.body["daily_limit"], 2);
        assert_eq!(res.body["remaining"], 1);
    }

    let admin = send(&app.router, Method::GET, "/api/usage", Some(TEST_MASTER_KEY), None).await;
    assert_eq!(admin.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn successful_calls_accumulate_token_usage() {
    let app = test_app();
    post_json(&app.router, "/api/generate", Some(TEST_PRO_TOKEN), blog_request()).await;
    post_json(&app.router, "/api/generate", Some(TEST_PRO_TOKEN), blog_request()).await;

    let record = app.tokens.get(TEST_PRO_TOKEN).expect("record");
    assert_eq!(record.total_requests, 2);
    assert_eq!(record.total_tokens_used, 84);
    assert!(record.last_used_at.is_some());
}

#[tokio::test]
async fn burst_limit_rejects_without_consuming_quota() {
    let mut config = test_app_config();
    config.quota.burst_limit_per_minute = 1;
    let app = test_app_with(&config, FakeProvider::replying("ok"));

    let first = post_json(&app.router, "/api/generate", Some(TEST_PRO_TOKEN), blog_request()).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = post_json(&app.router, "/api/generate", Some(TEST_PRO_TOKEN), blog_request()).await;
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(second.header("retry-after").is_some());
    assert_eq!(app.tokens.usage(TEST_PRO_TOKEN).expect("usage").used_today, 1);

    let admin = post_json(&app.router, "/api/generate", Some(TEST_MASTER_KEY), blog_request()).await;
    assert_eq!(admin.status, StatusCode::OK);
}

#[tokio::test]
async fn admin_routes_require_master_key() {
    let app = test_app();
    let res = send(&app.router, Method::GET, "/api/admin/tokens", Some(TEST_PRO_TOKEN), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app.router, Method::GET, "/api/admin/tokens", Some(TEST_MASTER_KEY), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn admin_token_lifecycle() {
    let app = test_app();
    let router = &app.router;

    let created = post_json(
        router,
        "/api/admin/tokens",
        Some(TEST_MASTER_KEY),
        json!({"tier": "business", "label": "Acme"}),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let token = created.body["token"].as_str().expect("token").to_string();
    assert!(token.starts_with("wf_"));
    assert_eq!(created.body["tier"], "business");

    let used = post_json(router, "/api/generate", Some(&token), blog_request()).await;
    assert_eq!(used.status, StatusCode::OK);
    assert_eq!(used.header("x-quota-limit"), Some("5000"));

    let duplicate = post_json(
        router,
        "/api/admin/tokens",
        Some(TEST_MASTER_KEY),
        json!({"token": token}),
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let path = format!("/api/admin/tokens/{}", token);
    let deleted = send(router, Method::DELETE, &path, Some(TEST_MASTER_KEY), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let revoked = post_json(router, "/api/generate", Some(&token), blog_request()).await;
    assert_eq!(revoked.status, StatusCode::UNAUTHORIZED);

    let missing = send(router, Method::DELETE, &path, Some(TEST_MASTER_KEY), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_reset_restores_exhausted_token() {
    let app = test_app();
    for _ in 0..3 {
        post_json(&app.router, "/api/generate", Some(TEST_FREE_TOKEN), blog_request()).await;
    }

    let path = format!("/api/admin/tokens/{}/reset", TEST_FREE_TOKEN);
    let reset = send(&app.router, Method::POST, &path, Some(TEST_MASTER_KEY), None).await;
    assert_eq!(reset.status, StatusCode::OK);
    assert_eq!(reset.body["daily_count"], 0);

    let res = post_json(&app.router, "/api/generate", Some(TEST_FREE_TOKEN), blog_request()).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn public_routes_need_no_token() {
    let app = test_app();

    let health = send(&app.router, Method::GET, "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
    assert_eq!(health.body["version"], env!("CARGO_PKG_VERSION"));

    let docs = send(&app.router, Method::GET, "/docs", None, None).await;
    assert_eq!(docs.status, StatusCode::OK);
    assert!(docs.body.as_str().unwrap_or_default().contains("swagger-ui"));

    let openapi = send(&app.router, Method::GET, "/openapi.json", None, None).await;
    assert_eq!(openapi.body["info"]["title"], "WriteFlow API");
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let app = test_app();
    let res = send(&app.router, Method::GET, "/api/nothing", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error_type(), "not_found");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = test_app();
    let res = send(&app.router, Method::GET, "/api/health", None, None).await;
    let id = res.header("x-request-id").expect("request id");
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn static_frontend_is_served_when_present() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), "<h1>WriteFlow</h1>").expect("index");
    std::fs::write(dir.path().join("app.js"), "console.log('wf');").expect("asset");

    let mut config = test_app_config();
    config.proxy.static_dir = Some(dir.path().to_string_lossy().into_owned());
    let app = test_app_with(&config, FakeProvider::replying("ok"));

    let index = send(&app.router, Method::GET, "/", None, None).await;
    assert_eq!(index.status, StatusCode::OK);
    assert_eq!(index.body, "<h1>WriteFlow</h1>");

    let asset = send(&app.router, Method::GET, "/static/app.js", None, None).await;
    assert_eq!(asset.status, StatusCode::OK);

    let health = send(&app.router, Method::GET, "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
}

#[tokio::test]
async fn quota_rejection_gives_back_burst_slot() {
    let mut config = test_app_config();
    config.quota.burst_limit_per_minute = 3;
    let app = test_app_with(&config, FakeProvider::replying("ok"));
    let rewrite = || json!({"text": "tidy this sentence"});

    for _ in 0..2 {
        let res = post_json(&app.router, "/api/rewrite", Some(TEST_FREE_TOKEN), rewrite()).await;
        assert_eq!(res.status, StatusCode::OK);
    }
    let exhausted = post_json(&app.router, "/api/rewrite", Some(TEST_FREE_TOKEN), rewrite()).await;
    assert_eq!(exhausted.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(exhausted.header("retry-after").is_none());

    // Two accepted calls sit in the window, so one slot is still free.
    assert!(app.burst.check(TEST_FREE_TOKEN).is_ok());
    assert!(app.burst.check(TEST_FREE_TOKEN).is_err());
}

#[tokio::test]
async fn docs_page_is_html() {
    let app = test_app();
    let res = send(&app.router, Method::GET, "/docs", None, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res
        .header("content-type")
        .unwrap_or_default()
        .starts_with("text/html"));
    let page = res.body.as_str().unwrap_or_default();
    assert!(page.contains("dom_id: \"#swagger-ui\""));
    assert!(page.contains("/openapi.json"));
}
