//! 端到端 API 流程测试 (内存数据库)
//!
//! 走完整路由栈：注册 → 播种时段 → 下单 → 商家取消 → 时段释放。

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::Service;

use mesa_server::{Config, ServerState};

async fn test_router() -> Router {
    let config = Config::from_env();
    let state = ServerState::in_memory(config).await.unwrap();
    mesa_server::api::router(state)
}

async fn call(router: &mut Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.call(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    json_request("POST", uri, token, body)
}

fn put_json(uri: &str, token: &str, body: Value) -> Request<Body> {
    json_request("PUT", uri, Some(token), body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// 注册管理员并创建绑定餐厅，返回 (token, restaurant_key)
async fn register_admin(router: &mut Router) -> (String, String) {
    let (status, body) = call(
        router,
        post_json(
            "/api/auth/register",
            None,
            json!({
                "username": "maria",
                "email": "maria@trattoria.example",
                "password": "correcthorse",
                "role": "admin",
                "restaurant": {
                    "name": "Trattoria Uno",
                    "latitude": 45.07,
                    "longitude": 7.68,
                    "description": "Piedmontese kitchen",
                    "hours_open": "12:00-23:00",
                    "phone": "+39 011 000000"
                }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin register failed: {body}");

    let token = body["token"].as_str().unwrap().to_string();
    let restaurant_id = body["user"]["restaurant_id"].as_str().unwrap();
    let key = restaurant_id
        .strip_prefix("restaurant:")
        .unwrap_or(restaurant_id)
        .to_string();
    (token, key)
}

async fn register_customer(router: &mut Router, name: &str) -> String {
    let (status, body) = call(
        router,
        post_json(
            "/api/auth/register",
            None,
            json!({
                "username": name,
                "email": format!("{name}@example.com"),
                "password": "correcthorse",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "customer register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn booking_flow_claims_and_releases_slot() {
    let mut router = test_router().await;
    let (admin_token, restaurant) = register_admin(&mut router).await;

    // 管理员播种时段
    let (status, slot) = call(
        &mut router,
        put_json(
            &format!("/api/restaurants/{restaurant}/slots/18:00"),
            &admin_token,
            json!({"date": "01-06-2024", "available": true, "capacity": 4}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "slot upsert failed: {slot}");
    assert_eq!(slot["available"], json!(true));

    // 顾客下单
    let alice = register_customer(&mut router, "alice").await;
    let (status, reservation) = call(
        &mut router,
        post_json(
            "/api/reservations",
            Some(&alice),
            json!({
                "restaurant_id": restaurant,
                "date": "01-06-2024",
                "label": "18:00",
                "guests": 2
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "booking failed: {reservation}");
    assert_eq!(reservation["status"], json!("pending"));
    let reservation_id = reservation["id"].as_str().unwrap().to_string();

    // 时段已被占用
    let (status, slots) = call(
        &mut router,
        get(
            &format!("/api/restaurants/{restaurant}/slots?date=01-06-2024"),
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots[0]["available"], json!(false));

    // 第二位顾客下单同一时段 → 409
    let bob = register_customer(&mut router, "bob").await;
    let (status, body) = call(
        &mut router,
        post_json(
            "/api/reservations",
            Some(&bob),
            json!({
                "restaurant_id": restaurant,
                "date": "01-06-2024",
                "label": "18:00",
                "guests": 2
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "expected conflict: {body}");
    assert_eq!(body["code"], json!("E0004"));

    // 商家取消 → 时段释放
    let key = reservation_id
        .strip_prefix("reservation:")
        .unwrap_or(&reservation_id);
    let (status, updated) = call(
        &mut router,
        put_json(
            &format!("/api/reservations/{key}/status"),
            &admin_token,
            json!({"status": "canceled"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "cancel failed: {updated}");
    assert_eq!(updated["status"], json!("canceled"));

    let (status, check) = call(
        &mut router,
        get(
            &format!("/api/restaurants/{restaurant}/slots/18:00?date=01-06-2024"),
            Some(&bob),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["available"], json!(true));
}

#[tokio::test]
async fn over_capacity_booking_is_unprocessable() {
    let mut router = test_router().await;
    let (admin_token, restaurant) = register_admin(&mut router).await;

    call(
        &mut router,
        put_json(
            &format!("/api/restaurants/{restaurant}/slots/18:00"),
            &admin_token,
            json!({"date": "01-06-2024", "available": true, "capacity": 4}),
        ),
    )
    .await;

    let alice = register_customer(&mut router, "alice").await;
    let (status, body) = call(
        &mut router,
        post_json(
            "/api/reservations",
            Some(&alice),
            json!({
                "restaurant_id": restaurant,
                "date": "01-06-2024",
                "label": "18:00",
                "guests": 6
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert_eq!(body["code"], json!("E0005"));
}

#[tokio::test]
async fn protected_routes_require_token() {
    let mut router = test_router().await;

    let (status, _) = call(&mut router, get("/api/reservations/mine", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 健康检查不需要认证
    let (status, body) = call(&mut router, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn admin_cannot_touch_another_restaurant() {
    let mut router = test_router().await;
    let (_token_a, restaurant_a) = register_admin(&mut router).await;

    // 第二家店的管理员
    let (status, body) = call(
        &mut router,
        post_json(
            "/api/auth/register",
            None,
            json!({
                "username": "luigi",
                "email": "luigi@osteria.example",
                "password": "correcthorse",
                "role": "admin",
                "restaurant": {
                    "name": "Osteria Due",
                    "latitude": 45.0,
                    "longitude": 7.6,
                    "description": "",
                    "hours_open": "18:00-24:00",
                    "phone": ""
                }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let token_b = body["token"].as_str().unwrap().to_string();

    let (status, body) = call(
        &mut router,
        put_json(
            &format!("/api/restaurants/{restaurant_a}/slots/18:00"),
            &token_b,
            json!({"date": "01-06-2024", "available": true, "capacity": 4}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    assert_eq!(body["code"], json!("E2001"));
}

#[tokio::test]
async fn admin_registration_cannot_claim_existing_restaurant() {
    let mut router = test_router().await;
    let (_victim_token, victim) = register_admin(&mut router).await;

    // 管理员注册只能随注册创建新店，指向已有餐厅的绑定被拒绝
    let (status, body) = call(
        &mut router,
        post_json(
            "/api/auth/register",
            None,
            json!({
                "username": "mallory",
                "email": "mallory@example.com",
                "password": "correcthorse",
                "role": "admin",
                "restaurant_id": format!("restaurant:{victim}")
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], json!("E0002"));
}

#[tokio::test]
async fn customer_cancels_own_reservation() {
    let mut router = test_router().await;
    let (admin_token, restaurant) = register_admin(&mut router).await;

    call(
        &mut router,
        put_json(
            &format!("/api/restaurants/{restaurant}/slots/18:00"),
            &admin_token,
            json!({"date": "01-06-2024", "available": true, "capacity": 4}),
        ),
    )
    .await;

    let alice = register_customer(&mut router, "alice").await;
    let (_, reservation) = call(
        &mut router,
        post_json(
            "/api/reservations",
            Some(&alice),
            json!({
                "restaurant_id": restaurant,
                "date": "01-06-2024",
                "label": "18:00",
                "guests": 2
            }),
        ),
    )
    .await;
    let id = reservation["id"].as_str().unwrap().to_string();
    let key = id.strip_prefix("reservation:").unwrap_or(&id).to_string();

    // 别人不能撤这单
    let bob = register_customer(&mut router, "bob").await;
    let (status, _) = call(
        &mut router,
        json_request(
            "DELETE",
            &format!("/api/reservations/{key}"),
            Some(&bob),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 本人撤单成功，列表清空
    let (status, _) = call(
        &mut router,
        json_request(
            "DELETE",
            &format!("/api/reservations/{key}"),
            Some(&alice),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, mine) = call(&mut router, get("/api/reservations/mine", Some(&alice))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 0);
}
