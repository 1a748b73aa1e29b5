mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    dev::ServiceResponse,
    http::{Method, StatusCode},
    test, App,
};
use serde_json::{json, Value};

use common::{anon_key, app_config, bot_record, FakeDeployer, JWT_SECRET};
use meetbot::{configure, AppConfig, AppState, BotDeployer, DeployError};

const DEPLOY_PATH: &str = "/functions/v1/deploy-recall-bot";

async fn call(
    config: AppConfig,
    deployer: Arc<dyn BotDeployer>,
    req: test::TestRequest,
) -> ServiceResponse {
    let app = test::init_service(
        App::new().configure(configure(Arc::new(config), Arc::new(AppState::new(deployer)))),
    )
    .await;
    test::call_service(&app, req.to_request()).await
}

fn deploy_request(body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(DEPLOY_PATH)
        .insert_header(("Authorization", "Bearer anon-key"))
        .set_json(body)
}

fn assert_cors(resp: &ServiceResponse) {
    let headers = resp.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(
        headers.get("access-control-allow-methods").unwrap(),
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    let allowed = headers
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(allowed.contains("Authorization"));
}

fn assert_json(resp: &ServiceResponse) {
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
}

#[actix_web::test]
async fn deploys_bot_and_shapes_response() {
    let deployer = FakeDeployer::joining("abc");

    let resp = call(
        app_config(None),
        deployer.clone(),
        deploy_request(json!({ "meeting_url": "https://x" })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);
    assert_json(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "success": true, "bot_id": "abc", "status": "joining", "meeting_url": "https://x" })
    );
    assert_eq!(deployer.calls(), vec!["https://x".to_string()]);
}

#[actix_web::test]
async fn empty_status_changes_default_to_created() {
    let deployer = FakeDeployer::new(|url| Ok(bot_record("bot-1", &[], url)));

    let resp = call(
        app_config(None),
        deployer,
        deploy_request(json!({ "meeting_url": "https://zoom.us/j/1" })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "created");
}

#[actix_web::test]
async fn missing_meeting_url_is_rejected_without_upstream_call() {
    for payload in [
        json!({}),
        json!({ "meeting_url": "" }),
        json!({ "meeting_url": null }),
        json!({ "meeting_url": "   " }),
    ] {
        let deployer = FakeDeployer::joining("never");

        let resp = call(app_config(None), deployer.clone(), deploy_request(payload)).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_cors(&resp);
        assert_json(&resp);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "meeting_url is required");
        assert!(deployer.calls().is_empty());
    }
}

#[actix_web::test]
async fn malformed_body_is_a_server_error() {
    let deployer = FakeDeployer::joining("never");
    let req = test::TestRequest::post()
        .uri(DEPLOY_PATH)
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{meeting_url:");

    let resp = call(app_config(None), deployer.clone(), req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&resp);
    assert_json(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    assert!(deployer.calls().is_empty());
}

#[actix_web::test]
async fn meeting_url_is_forwarded_as_sent() {
    let deployer = FakeDeployer::joining("abc");

    let resp = call(
        app_config(None),
        deployer.clone(),
        deploy_request(json!({ "meeting_url": " https://zoom.us/j/123 " })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(deployer.calls(), vec![" https://zoom.us/j/123 ".to_string()]);
}

#[actix_web::test]
async fn upstream_error_maps_to_500_with_status_and_body() {
    let deployer = FakeDeployer::failing(|| DeployError::Upstream {
        status: 503,
        body: "rate limited".to_string(),
    });

    let resp = call(
        app_config(None),
        deployer.clone(),
        deploy_request(json!({ "meeting_url": "https://x" })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&resp);
    assert_json(&resp);
    let body: Value = test::read_body_json(resp).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("503"));
    assert!(error.contains("rate limited"));
    assert_eq!(deployer.calls().len(), 1);
}

#[actix_web::test]
async fn transport_failure_maps_to_500() {
    let deployer =
        FakeDeployer::failing(|| DeployError::Transport("error sending request".to_string()));

    let resp = call(
        app_config(None),
        deployer,
        deploy_request(json!({ "meeting_url": "https://x" })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "error sending request");
}

#[actix_web::test]
async fn upstream_timeout_maps_to_504() {
    let deployer = FakeDeployer::failing(|| DeployError::UpstreamTimeout(Duration::from_secs(30)));

    let resp = call(
        app_config(None),
        deployer,
        deploy_request(json!({ "meeting_url": "https://x" })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_cors(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Recall API timed out after 30s");
}

#[actix_web::test]
async fn preflight_is_empty_and_permissive() {
    let deployer = FakeDeployer::joining("never");
    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri(DEPLOY_PATH);

    // Gate is on, pre-flight still passes without credentials
    let resp = call(app_config(Some(JWT_SECRET)), deployer.clone(), req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);
    let body = test::read_body(resp).await;
    assert!(body.is_empty());
    assert!(deployer.calls().is_empty());
}

#[actix_web::test]
async fn same_url_twice_creates_two_bots() {
    let deployer = FakeDeployer::joining("abc");
    let app = test::init_service(App::new().configure(configure(
        Arc::new(app_config(None)),
        Arc::new(AppState::new(deployer.clone())),
    )))
    .await;

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            deploy_request(json!({ "meeting_url": "https://x" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(deployer.calls().len(), 2);
}

#[actix_web::test]
async fn gate_rejects_missing_or_forged_token() {
    for header in [None, Some("Bearer not-a-jwt".to_string()), Some(format!("Bearer {}", anon_key("wrong-secret-wrong-secret-wrong-secret")))] {
        let deployer = FakeDeployer::joining("never");
        let mut req = test::TestRequest::post()
            .uri(DEPLOY_PATH)
            .set_json(json!({ "meeting_url": "https://x" }));
        if let Some(header) = header {
            req = req.insert_header(("Authorization", header));
        }

        let resp = call(app_config(Some(JWT_SECRET)), deployer.clone(), req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_cors(&resp);
        assert_json(&resp);
        assert!(deployer.calls().is_empty());
    }
}

#[actix_web::test]
async fn gate_admits_project_anon_key() {
    let deployer = FakeDeployer::joining("abc");
    let req = test::TestRequest::post()
        .uri(DEPLOY_PATH)
        .insert_header(("Authorization", format!("Bearer {}", anon_key(JWT_SECRET))))
        .set_json(json!({ "meeting_url": "https://x" }));

    let resp = call(app_config(Some(JWT_SECRET)), deployer.clone(), req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(deployer.calls().len(), 1);
}

#[actix_web::test]
async fn health_check() {
    let resp = call(
        app_config(None),
        FakeDeployer::joining("never"),
        test::TestRequest::get().uri("/health"),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn api_reference_is_served() {
    let resp = call(
        app_config(Some(JWT_SECRET)),
        FakeDeployer::joining("never"),
        test::TestRequest::get().uri("/scalar"),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let page = std::str::from_utf8(&body).unwrap();
    assert!(page.contains("deploy-recall-bot"));
}
