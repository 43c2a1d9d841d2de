use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use procura_auth::{JwtClaims, UserType};
use procura_core::UserId;
use reqwest::StatusCode;
use serde_json::json;

const SECRET: &str = "test-secret";

const CATALOG: &str = r#"
shop: Связной
categories:
  - id: 224
    name: Смартфоны
goods:
  - id: 4216292
    category: 224
    model: apple/iphone/xs-max
    name: Смартфон Apple iPhone XS Max 512GB (золотистый)
    price: 110000
    price_rrc: 116990
    quantity: 5
    parameters:
      "Диагональ (дюйм)": 6.5
      "Цвет": золотистый
  - id: 4216313
    category: 224
    model: apple/iphone/xr
    name: Смартфон Apple iPhone XR 256GB (красный)
    price: 65000
    price_rrc: 69990
    quantity: 2
"#;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = procura_api::app::build_app(SECRET.to_string());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, token: &str, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn import(&self, token: &str, yaml: &str) -> reqwest::Response {
        self.client
            .post(self.url("/partner/update"))
            .bearer_auth(token)
            .header("content-type", "application/yaml")
            .body(yaml.to_string())
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(user_type: UserType, is_staff: bool) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        user_type,
        is_staff,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn first_offer_id(srv: &TestServer, token: &str, name_prefix: &str) -> String {
    let res = srv.get(token, "/products").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["product"]["name"].as_str().unwrap().starts_with(name_prefix))
        .map(|o| o["id"].as_str().unwrap().to_string())
        .expect("offer not listed")
}

async fn new_contact(srv: &TestServer, token: &str) -> String {
    let res = srv
        .post(
            token,
            "/contacts",
            json!({ "city": "Москва", "street": "Тверская", "house": "7", "phone": "+79990000000" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/basket")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv.get("not-a-jwt", "/basket").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        user_type: UserType::Buyer,
        is_staff: false,
        issued_at: now - ChronoDuration::hours(2),
        expires_at: now - ChronoDuration::hours(1),
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let res = srv.get(&token, "/whoami").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn principal_is_derived_from_token() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(UserType::Shop, true);

    let res = srv.get(&token, "/whoami").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["type"], "shop");
    assert_eq!(body["is_staff"], true);
}

#[tokio::test]
async fn checkout_lifecycle_import_basket_confirm_status() {
    let srv = TestServer::spawn().await;
    let supplier = mint_jwt(UserType::Shop, false);
    let buyer = mint_jwt(UserType::Buyer, false);

    // Supplier publishes a catalog.
    let res = srv.import(&supplier, CATALOG).await;
    assert_eq!(res.status(), StatusCode::OK);
    let summary: serde_json::Value = res.json().await.unwrap();
    assert_eq!(summary["created_shop"], true);
    assert_eq!(summary["goods"], 2);

    let xs = first_offer_id(&srv, &buyer, "Смартфон Apple iPhone XS").await;
    let contact = new_contact(&srv, &buyer).await;

    // Buyer fills the basket.
    let res = srv
        .post(&buyer, "/basket/items", json!({ "stock_record_id": xs, "quantity": 3 }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let basket: serde_json::Value = res.json().await.unwrap();
    assert_eq!(basket["total"], "330000.00");

    // Confirm.
    let res = srv
        .post(&buyer, "/orders/confirm", json!({ "contact_id": contact }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let order: serde_json::Value = res.json().await.unwrap();
    assert_eq!(order["status"], "new");
    assert_eq!(order["items"][0]["unit_price"], "110000.00");
    assert!(order["confirmed_at"].is_string());
    assert!(order["created_at"].as_str().unwrap() <= order["confirmed_at"].as_str().unwrap());
    let order_id = order["id"].as_str().unwrap().to_string();

    // Stock went down, basket is fresh.
    let res = srv.get(&buyer, "/products").await;
    let offers: serde_json::Value = res.json().await.unwrap();
    let listed = offers["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["id"] == xs.as_str())
        .unwrap()
        .clone();
    assert_eq!(listed["quantity"], 2);

    let res = srv.get(&buyer, "/basket").await;
    let basket: serde_json::Value = res.json().await.unwrap();
    assert!(basket["lines"].as_array().unwrap().is_empty());

    // Buyer may not move the order; the supplier may.
    let path = format!("/orders/{order_id}/status");
    let res = srv.post(&buyer, &path, json!({ "status": "confirmed" })).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "forbidden");

    let res = srv.post(&supplier, &path, json!({ "status": "teleported" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .post(&supplier, &path, json!({ "status": "confirmed", "expected_status": "new" }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .post(&supplier, &path, json!({ "status": "assembled", "expected_status": "new" }))
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // History shows the placed order.
    let res = srv.get(&buyer, "/orders").await;
    let history: serde_json::Value = res.json().await.unwrap();
    assert_eq!(history["items"].as_array().unwrap().len(), 1);
    assert_eq!(history["items"][0]["status"], "confirmed");
}

#[tokio::test]
async fn shortfall_is_a_conflict_naming_the_product() {
    let srv = TestServer::spawn().await;
    let supplier = mint_jwt(UserType::Shop, false);
    let buyer = mint_jwt(UserType::Buyer, false);
    assert_eq!(srv.import(&supplier, CATALOG).await.status(), StatusCode::OK);

    let xr = first_offer_id(&srv, &buyer, "Смартфон Apple iPhone XR").await;
    let contact = new_contact(&srv, &buyer).await;
    srv.post(&buyer, "/basket/items", json!({ "stock_record_id": xr, "quantity": 3 }))
        .await;

    let res = srv
        .post(&buyer, "/orders/confirm", json!({ "contact_id": contact }))
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "insufficient_stock");
    assert!(err["message"].as_str().unwrap().contains("iPhone XR"));
}

#[tokio::test]
async fn buyers_cannot_import_catalogs() {
    let srv = TestServer::spawn().await;
    let buyer = mint_jwt(UserType::Buyer, false);

    let res = srv.import(&buyer, CATALOG).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_catalog_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let supplier = mint_jwt(UserType::Shop, false);

    let res = srv.import(&supplier, "shop: [unterminated").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "invalid_input");
}

#[tokio::test]
async fn removing_a_basket_line_twice_is_not_found() {
    let srv = TestServer::spawn().await;
    let supplier = mint_jwt(UserType::Shop, false);
    let buyer = mint_jwt(UserType::Buyer, false);
    assert_eq!(srv.import(&supplier, CATALOG).await.status(), StatusCode::OK);
    let xs = first_offer_id(&srv, &buyer, "Смартфон Apple iPhone XS").await;

    let res = srv
        .post(&buyer, "/basket/items", json!({ "stock_record_id": xs }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let basket: serde_json::Value = srv.get(&buyer, "/basket").await.json().await.unwrap();
    assert_eq!(basket["lines"][0]["quantity"], 1);

    let path = srv.url(&format!("/basket/items/{xs}"));
    let res = srv.client.delete(&path).bearer_auth(&buyer).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = srv.client.delete(&path).bearer_auth(&buyer).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv
        .client
        .delete(srv.url("/basket/items/garbage"))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contacts_are_private_to_their_owner() {
    let srv = TestServer::spawn().await;
    let alice = mint_jwt(UserType::Buyer, false);
    let bob = mint_jwt(UserType::Buyer, false);
    let contact = new_contact(&srv, &alice).await;

    let res = srv
        .client
        .delete(srv.url(&format!("/contacts/{contact}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv.get(&alice, "/contacts").await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["city"], "Москва");
}

#[tokio::test]
async fn closed_shop_disappears_from_listing() {
    let srv = TestServer::spawn().await;
    let supplier = mint_jwt(UserType::Shop, false);
    let buyer = mint_jwt(UserType::Buyer, false);
    assert_eq!(srv.import(&supplier, CATALOG).await.status(), StatusCode::OK);

    let res = srv.post(&supplier, "/partner/state", json!({ "state": false })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let shop: serde_json::Value = res.json().await.unwrap();
    assert_eq!(shop["state"], false);

    let res = srv.get(&buyer, "/products").await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn profile_registration_round_trip() {
    let srv = TestServer::spawn().await;
    let buyer = mint_jwt(UserType::Buyer, false);

    let res = srv.get(&buyer, "/users/profile").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv
        .post(&buyer, "/users/profile", json!({ "email": "buyer@example.com", "first_name": "Анна" }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.get(&buyer, "/users/profile").await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["email"], "buyer@example.com");
    assert_eq!(body["type"], "buyer");

    let res = srv.post(&buyer, "/users/profile", json!({ "email": "nope" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
