use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

use makechange_api::app::{build_app, AppServices};
use makechange_auth::{Hs256JwtValidator, Permission, StaticPolicy};
use makechange_currency::CurrencyTable;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    pdp: Arc<StaticPolicy>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(StaticPolicy::standard()).await
    }

    async fn spawn_with(policy: StaticPolicy) -> Self {
        // Same router as prod, with the in-process PDP, bound to an ephemeral port.
        let pdp = Arc::new(policy);
        let services = AppServices::new(CurrencyTable::standard().unwrap(), pdp.clone());
        let app = build_app(Arc::new(Hs256JwtValidator::new(JWT_SECRET)), Arc::new(services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, pdp, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, sub: &str, roles: &[&str]) -> String {
    mint_jwt_at(secret, sub, roles, Utc::now())
}

fn mint_jwt_at(secret: &str, sub: &str, roles: &[&str], issued: chrono::DateTime<Utc>) -> String {
    let claims = json!({
        "sub": sub,
        "email": format!("{sub}@example.com"),
        "name": "Test Cashier",
        "roles": roles,
        "iat": issued.timestamp(),
        "exp": (issued + ChronoDuration::minutes(10)).timestamp(),
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn make_change(srv: &TestServer, token: &str, body: Value) -> (StatusCode, Value) {
    let res = reqwest::Client::new()
        .post(srv.url("/makechange"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/whoami", "/roles", "/permit/roles"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
    }

    let res = client
        .post(srv.url("/makechange"))
        .json(&json!({ "amount": 13.67, "currency": "USD" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Unauthorized", "permitted": false }));
}

#[tokio::test]
async fn tokens_with_wrong_secret_or_expired_are_rejected() {
    let srv = TestServer::spawn().await;
    let body = json!({ "amount": 1, "currency": "USD" });

    let forged = mint_jwt("other-secret", "u-forged", &[]);
    assert_eq!(make_change(&srv, &forged, body.clone()).await.0, StatusCode::UNAUTHORIZED);

    let stale = mint_jwt_at(JWT_SECRET, "u-stale", &[], Utc::now() - ChronoDuration::hours(2));
    assert_eq!(make_change(&srv, &stale, body).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_is_derived_from_token() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, "u-who", &["admin"]);

    let res = reqwest::Client::new()
        .get(srv.url("/whoami"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], "u-who");
    assert_eq!(body["email"], "u-who@example.com");
    assert_eq!(body["name"], "Test Cashier");
    assert_eq!(body["roles"], json!(["admin"]));
}

#[tokio::test]
async fn session_roles_report_token_roles() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, "u-roles", &["cashier", "admin"]);

    let res = reqwest::Client::new()
        .get(srv.url("/roles"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "sessionRoles": ["cashier", "admin"],
            "jwtRoles": ["cashier", "admin"],
            "hasAccessToken": true,
        })
    );
}

#[tokio::test]
async fn make_change_usd_for_new_user() {
    let srv = TestServer::spawn().await;
    // No roles in the token: permission comes from the lazily assigned member role.
    let token = mint_jwt(JWT_SECRET, "u-usd", &[]);

    let (status, body) = make_change(&srv, &token, json!({ "amount": 13.67, "currency": "USD", "country": "US" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "permitted": true,
            "message": "We can make change for $13.67 with: 1 ten dollar bills, 3 one dollar bills, 2 quarters, 1 dimes, 1 nickels, 2 pennies",
            "changeResults": [
                "1 ten dollar bills",
                "3 one dollar bills",
                "2 quarters",
                "1 dimes",
                "1 nickels",
                "2 pennies"
            ],
            "currencySymbol": "$",
            "formattedAmount": "13.67",
        })
    );
    assert!(srv.pdp.is_synced("u-usd"));
    assert_eq!(srv.pdp.country_of("u-usd").as_deref(), Some("US"));
}

#[tokio::test]
async fn make_change_yen_and_shekels() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, "u-intl", &[]);

    let (status, body) = make_change(&srv, &token, json!({ "amount": 1500, "currency": "JPY" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changeResults"], json!(["1 1000 yen notes", "1 500 yen"]));
    assert_eq!(body["formattedAmount"], "1500");
    assert_eq!(body["message"], "We can make change for ¥1500 with: 1 1000 yen notes, 1 500 yen");

    let (status, body) = make_change(&srv, &token, json!({ "amount": "12.50", "currency": "ILS" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changeResults"], json!(["1 ten shekels", "1 two shekels", "1 fifty agorot"]));
    assert_eq!(body["currencySymbol"], "₪");
    assert_eq!(body["formattedAmount"], "12.50");
}

#[tokio::test]
async fn zero_amount_needs_no_change() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, "u-zero", &[]);

    let (status, body) = make_change(&srv, &token, json!({ "amount": 0, "currency": "USD" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No change needed for $0.00");
    assert_eq!(body["changeResults"], json!([]));
    assert_eq!(body["formattedAmount"], "0.00");
}

#[tokio::test]
async fn unrepresentable_remainder_is_reported() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, "u-aud", &[]);

    let (status, body) = make_change(&srv, &token, json!({ "amount": 0.07, "currency": "AUD" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changeResults"], json!(["1 five cents"]));
    assert_eq!(body["remainderMinorUnits"], 2);
}

#[tokio::test]
async fn denied_when_policy_grants_nothing() {
    let srv = TestServer::spawn_with(StaticPolicy::new()).await;
    let token = mint_jwt(JWT_SECRET, "u-denied", &["cashier"]);

    let (status, body) = make_change(&srv, &token, json!({ "amount": 5, "currency": "USD" })).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Not authorized to make change", "permitted": false }));
}

#[tokio::test]
async fn token_role_without_matching_permission_is_denied() {
    let policy = StaticPolicy::new().grant("cashier", Permission::for_action("change", "view"));
    let srv = TestServer::spawn_with(policy).await;
    let token = mint_jwt(JWT_SECRET, "u-view", &["cashier"]);

    let (status, _) = make_change(&srv, &token, json!({ "amount": 5, "currency": "USD" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_parameters_are_rejected_before_authorization() {
    let srv = TestServer::spawn_with(StaticPolicy::new()).await;
    let token = mint_jwt(JWT_SECRET, "u-missing", &[]);
    let expected = json!({ "error": "Missing required parameters", "permitted": false });

    for body in [
        json!({ "currency": "USD" }),
        json!({ "amount": 10 }),
        json!({ "amount": null, "currency": "USD" }),
        json!({ "amount": 10, "currency": "" }),
    ] {
        let (status, got) = make_change(&srv, &token, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(got, expected);
    }
    assert!(!srv.pdp.is_synced("u-missing"));
}

#[tokio::test]
async fn invalid_currency_and_amount_are_permitted_errors() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, "u-invalid", &[]);

    let (status, body) = make_change(&srv, &token, json!({ "amount": 10, "currency": "XYZ" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid currency", "permitted": true }));

    for amount in [json!(-5), json!("ten"), json!(true)] {
        let (status, body) = make_change(&srv, &token, json!({ "amount": amount, "currency": "USD" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid amount", "permitted": true }));
    }
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, "u-malformed", &[]);

    let res = reqwest::Client::new()
        .post(srv.url("/makechange"))
        .bearer_auth(token)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["permitted"], false);
}

#[tokio::test]
async fn lazy_sync_enrolls_once() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, "u-lazy", &[]);
    let client = reqwest::Client::new();

    let (status, _) = make_change(&srv, &token, json!({ "amount": 1, "currency": "CAD", "country": "CA" })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = make_change(&srv, &token, json!({ "amount": 2, "currency": "GBP", "country": "GB" })).await;
    assert_eq!(status, StatusCode::OK);

    // First request's country stuck; the second did not re-sync.
    assert_eq!(srv.pdp.country_of("u-lazy").as_deref(), Some("CA"));

    let res = client
        .get(srv.url("/permit/roles"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "roles": [{ "role": "member", "tenant": "default", "permissions": ["change:make"] }],
        })
    );
}

#[tokio::test]
async fn permit_check_endpoint() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt(JWT_SECRET, "u-admin", &["admin"]);
    let nobody = mint_jwt(JWT_SECRET, "u-nobody", &[]);

    let check = |token: String, body: Value| {
        let client = client.clone();
        let url = srv.url("/permit/check");
        async move {
            let res = client.post(url).bearer_auth(token).json(&body).send().await.unwrap();
            let status = res.status();
            (status, res.json::<Value>().await.unwrap())
        }
    };

    let (status, body) = check(admin.clone(), json!({ "action": "make", "resource": "change" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "permitted": true }));

    let (status, body) = check(nobody, json!({ "action": "make", "resource": "change" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "permitted": false }));

    let (status, body) = check(admin, json!({ "action": "make" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing required parameters", "permitted": false }));
}

#[tokio::test]
async fn explicit_sync_assigns_member_role() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(JWT_SECRET, "u-sync", &[]);

    let res = client
        .post(srv.url("/permit/sync"))
        .bearer_auth(&token)
        .json(&json!({ "country": "IL" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "success": true }));
    assert_eq!(srv.pdp.country_of("u-sync").as_deref(), Some("IL"));

    // Without a body.
    let res = client
        .post(srv.url("/permit/sync"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url("/permit/roles"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["roles"][0]["role"], "member");
}

#[tokio::test]
async fn keyless_user_cannot_sync_or_list_roles() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let claims = json!({
        "sub": "",
        "roles": [],
        "iat": Utc::now().timestamp(),
        "exp": (Utc::now() + ChronoDuration::minutes(10)).timestamp(),
    });
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let res = client
        .post(srv.url("/permit/sync"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "error": "Failed to sync user with Permit.io", "success": false })
    );

    let res = client
        .get(srv.url("/permit/roles"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["roles"], json!([]));

    let (status, body) = make_change(&srv, &token, json!({ "amount": 1, "currency": "USD" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["permitted"], false);
}
