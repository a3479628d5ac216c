//! HTTP-Szenarien gegen den vollstaendigen Router (In-Memory SQLite)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use warenhaus_api::{app, AppState, RateLimitKonfig, RateLimiter, RestServerKonfig};
use warenhaus_auth::{PasswortHasher, TokenService};
use warenhaus_core::{Rolle, Umgebung};
use warenhaus_db::{models::KontoUpdate, KontoRepository, ProduktRepository, SqliteDb};
use warenhaus_observability::HealthState;

const PASSWORT: &str = "Geheim123!";

struct TestApp {
    router: Router,
    db: Arc<SqliteDb>,
    tokens: Arc<TokenService>,
}

async fn test_app_mit_limit(max_anfragen: u32) -> TestApp {
    test_app_mit_rate_limit(RateLimitKonfig {
        fenster: Duration::from_secs(900),
        max_anfragen,
        proxy_vertrauen: false,
    })
    .await
}

async fn test_app_mit_rate_limit(rate_limit: RateLimitKonfig) -> TestApp {
    let db = Arc::new(SqliteDb::in_memory().await.expect("In-Memory DB"));
    let konten: Arc<dyn KontoRepository> = db.clone();
    let produkte: Arc<dyn ProduktRepository> = db.clone();
    let hasher = Arc::new(PasswortHasher::neu(4).unwrap());
    let tokens = Arc::new(TokenService::neu("test-geheimnis", 3600).unwrap());

    let state = AppState::neu(konten, produkte, hasher, tokens.clone(), Umgebung::Test);
    let limiter = RateLimiter::neu(rate_limit);
    let router = app(
        state,
        &RestServerKonfig::default(),
        limiter,
        HealthState::neu(Umgebung::Test),
    );

    TestApp { router, db, tokens }
}

async fn test_app() -> TestApp {
    test_app_mit_limit(1000).await
}

impl TestApp {
    async fn anfrage(
        &self,
        methode: Method,
        pfad: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(methode).uri(pfad);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Registriert ein Konto und gibt (ID, Token) zurueck
    async fn registrieren(&self, name: &str, email: &str) -> (Uuid, String) {
        let (status, json) = self
            .anfrage(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": PASSWORT })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        let id = json["data"]["user"]["id"].as_str().unwrap().parse().unwrap();
        let token = json["data"]["accessToken"].as_str().unwrap().to_string();
        (id, token)
    }

    async fn zum_admin_machen(&self, id: Uuid) {
        KontoRepository::update(
            &*self.db,
            id,
            KontoUpdate {
                role: Some(Rolle::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    /// Token mit Ausstellungszeit in der Vergangenheit
    fn alter_token(&self, id: Uuid) -> String {
        self.tokens
            .ausstellen_zum(id, Utc::now() - chrono::Duration::seconds(30))
            .unwrap()
            .token
    }

    async fn produkt_anlegen(&self, token: &str, title: &str, price: f64) -> String {
        let (status, json) = self
            .anfrage(
                Method::POST,
                "/api/products",
                Some(token),
                Some(json!({ "title": title, "price": price, "stock": 3 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["product"]["id"].as_str().unwrap().to_string()
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registrierung_liefert_token_ohne_passwort() {
    let t = test_app().await;

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Alice",
                "email": "Alice@Example.com",
                "password": PASSWORT,
                "role": "admin"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "Registration successful.");
    assert_eq!(json["data"]["expiresIn"], "1h");
    let user = &json["data"]["user"];
    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["role"], "user");
    assert!(user.get("passwordHash").is_none());
    assert!(user.get("password").is_none());
    assert!(json["data"]["accessToken"].as_str().is_some());
}

#[tokio::test]
async fn doppelte_registrierung_ist_konflikt() {
    let t = test_app().await;
    t.registrieren("Alice", "alice@example.com").await;

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Alice", "email": "ALICE@example.com", "password": PASSWORT })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "User already exists with this email.");
}

#[tokio::test]
async fn schwaches_passwort_wird_abgelehnt() {
    let t = test_app().await;

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Bob", "email": "bob@example.com", "password": "einfach" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn login_mit_falschem_passwort_oder_unbekannter_email() {
    let t = test_app().await;
    t.registrieren("Alice", "alice@example.com").await;

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "Falsch123!" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid email or password.");

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "niemand@example.com", "password": PASSWORT })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid email or password.");
}

#[tokio::test]
async fn login_vermerkt_letzte_anmeldung() {
    let t = test_app().await;
    t.registrieren("Alice", "alice@example.com").await;

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": PASSWORT })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Login successful.");
    assert!(json["data"]["user"]["lastLoginAt"].is_string());
}

#[tokio::test]
async fn ohne_token_kein_zugriff() {
    let t = test_app().await;

    let (status, json) = t.anfrage(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Access denied. No token provided.");

    let (status, _) = t
        .anfrage(Method::GET, "/api/auth/me", Some("kein.gueltiger.token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_liefert_eigenes_konto() {
    let t = test_app().await;
    let (id, token) = t.registrieren("Alice", "alice@example.com").await;

    let (status, json) = t.anfrage(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["user"]["id"], id.to_string());

    let (status, json) = t
        .anfrage(Method::POST, "/api/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Logout successful.");
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn passwortwechsel_macht_alte_token_ungueltig() {
    let t = test_app().await;
    let (id, _) = t.registrieren("Alice", "alice@example.com").await;
    let alt = t.alter_token(id);

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/auth/change-password",
            Some(&alt),
            Some(json!({ "currentPassword": PASSWORT, "newPassword": "Neues456?" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(
        json["message"],
        "Password changed successfully. Please log in again."
    );

    let (status, json) = t.anfrage(Method::GET, "/api/auth/me", Some(&alt), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        json["message"],
        "Password was changed. Please log in again."
    );

    let (status, _) = t
        .anfrage(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "Neues456?" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn passwortwechsel_mit_falschem_aktuellen_passwort() {
    let t = test_app().await;
    let (_, token) = t.registrieren("Alice", "alice@example.com").await;

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": "Falsch123!", "newPassword": "Neues456?" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Current password is incorrect.");
}

#[tokio::test]
async fn logout_all_widerruft_bisherige_token() {
    let t = test_app().await;
    let (id, _) = t.registrieren("Alice", "alice@example.com").await;
    let alt = t.alter_token(id);

    let (status, json) = t
        .anfrage(Method::POST, "/api/auth/logout-all", Some(&alt), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Logged out from all devices.");

    let (status, _) = t.anfrage(Method::GET, "/api/auth/me", Some(&alt), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Profil
// ---------------------------------------------------------------------------

#[tokio::test]
async fn profil_update_ignoriert_rolle() {
    let t = test_app().await;
    let (_, token) = t.registrieren("Alice", "alice@example.com").await;

    let (status, json) = t
        .anfrage(
            Method::PUT,
            "/api/users/profile",
            Some(&token),
            Some(json!({ "name": "Alicia", "role": "admin" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["message"], "Profile updated");
    assert_eq!(json["data"]["user"]["name"], "Alicia");
    assert_eq!(json["data"]["user"]["role"], "user");
}

#[tokio::test]
async fn profil_update_nur_mit_gesperrten_feldern() {
    let t = test_app().await;
    let (_, token) = t.registrieren("Alice", "alice@example.com").await;

    let (status, json) = t
        .anfrage(
            Method::PUT,
            "/api/users/profile",
            Some(&token),
            Some(json!({ "role": "admin", "isActive": false })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["message"], "No valid fields to update.");
}

#[tokio::test]
async fn deaktiviertes_konto_kann_sich_nicht_anmelden() {
    let t = test_app().await;
    let (_, token) = t.registrieren("Alice", "alice@example.com").await;

    let (status, json) = t
        .anfrage(Method::DELETE, "/api/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Account deactivated");

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": PASSWORT })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Account has been deactivated.");

    let (status, _) = t
        .anfrage(Method::GET, "/api/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Produkte
// ---------------------------------------------------------------------------

#[tokio::test]
async fn produkt_anlegen_ohne_titel_oder_preis() {
    let t = test_app().await;
    let (_, token) = t.registrieren("Alice", "alice@example.com").await;

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/products",
            Some(&token),
            Some(json!({ "description": "ohne Titel" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["message"], "Title and price are required.");
}

#[tokio::test]
async fn produkt_anlegen_braucht_anmeldung() {
    let t = test_app().await;

    let (status, _) = t
        .anfrage(
            Method::POST,
            "/api/products",
            None,
            Some(json!({ "title": "Tee", "price": 3.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn produktliste_mit_seiten_und_ersteller() {
    let t = test_app().await;
    let (id, token) = t.registrieren("Alice", "alice@example.com").await;
    t.produkt_anlegen(&token, "Gruener Tee", 7.5).await;
    t.produkt_anlegen(&token, "Schwarzer Tee", 5.0).await;
    t.produkt_anlegen(&token, "Kaffee", 9.0).await;

    let (status, json) = t
        .anfrage(Method::GET, "/api/products?limit=2&sort=price_asc", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let produkte = json["data"]["products"].as_array().unwrap();
    assert_eq!(produkte.len(), 2);
    assert_eq!(produkte[0]["title"], "Schwarzer Tee");
    assert_eq!(produkte[0]["createdBy"]["id"], id.to_string());
    assert_eq!(produkte[0]["createdBy"]["name"], "Alice");
    assert_eq!(
        json["data"]["pagination"],
        json!({ "total": 3, "page": 1, "pages": 2, "limit": 2 })
    );

    let (_, json) = t
        .anfrage(Method::GET, "/api/products?search=tee", None, None)
        .await;
    assert_eq!(json["data"]["pagination"]["total"], 2);
}

#[tokio::test]
async fn fremdes_produkt_ist_verboten_fuer_admin_erlaubt() {
    let t = test_app().await;
    let (_, alice) = t.registrieren("Alice", "alice@example.com").await;
    let (_, bob) = t.registrieren("Bob", "bob@example.com").await;
    let (admin_id, admin) = t.registrieren("Admin", "admin@example.com").await;
    t.zum_admin_machen(admin_id).await;

    let produkt = t.produkt_anlegen(&alice, "Tee", 4.0).await;
    let pfad = format!("/api/products/{produkt}");

    let (status, json) = t
        .anfrage(Method::PUT, &pfad, Some(&bob), Some(json!({ "price": 1.0 })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Forbidden");

    let (status, _) = t.anfrage(Method::DELETE, &pfad, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = t
        .anfrage(Method::PUT, &pfad, Some(&admin), Some(json!({ "price": 2.5 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["product"]["price"], 2.5);
    assert_eq!(json["data"]["product"]["createdBy"]["name"], "Alice");
}

#[tokio::test]
async fn zeitstempel_bleiben_beim_erneuten_laden_gleich() {
    let t = test_app().await;
    let (_, alice) = t.registrieren("Alice", "alice@example.com").await;

    let (status, angelegt) = t
        .anfrage(
            Method::POST,
            "/api/products",
            Some(&alice),
            Some(json!({ "title": "Tee", "price": 4.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let produkt = &angelegt["data"]["product"];
    let id = produkt["id"].as_str().unwrap();

    let (status, geladen) = t
        .anfrage(Method::GET, &format!("/api/products/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(geladen["data"]["product"]["createdAt"], produkt["createdAt"]);
    assert_eq!(geladen["data"]["product"]["updatedAt"], produkt["updatedAt"]);
}

#[tokio::test]
async fn negativer_preis_beim_update() {
    let t = test_app().await;
    let (_, token) = t.registrieren("Alice", "alice@example.com").await;
    let produkt = t.produkt_anlegen(&token, "Tee", 4.0).await;

    let (status, json) = t
        .anfrage(
            Method::PUT,
            &format!("/api/products/{produkt}"),
            Some(&token),
            Some(json!({ "price": -5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn geloeschtes_produkt_ist_nicht_mehr_sichtbar() {
    let t = test_app().await;
    let (_, token) = t.registrieren("Alice", "alice@example.com").await;
    let produkt = t.produkt_anlegen(&token, "Tee", 4.0).await;
    let pfad = format!("/api/products/{produkt}");

    let (status, json) = t.anfrage(Method::DELETE, &pfad, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Product deleted");

    let (status, json) = t.anfrage(Method::GET, &pfad, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Product not found");

    let (status, _) = t.anfrage(Method::DELETE, &pfad, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = t.anfrage(Method::GET, "/api/products", None, None).await;
    assert_eq!(json["data"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn ungueltige_id_ist_nicht_gefunden() {
    let t = test_app().await;

    let (status, json) = t
        .anfrage(Method::GET, "/api/products/keine-uuid", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Resource not found (invalid id).");
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routen_nur_fuer_admins() {
    let t = test_app().await;
    let (_, token) = t.registrieren("Alice", "alice@example.com").await;

    let (status, json) = t
        .anfrage(Method::GET, "/api/admin/users", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Access denied. Admin privileges required.");

    let (status, _) = t.anfrage(Method::GET, "/api/admin/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_kann_sich_nicht_selbst_loeschen() {
    let t = test_app().await;
    let (admin_id, admin) = t.registrieren("Admin", "admin@example.com").await;
    t.zum_admin_machen(admin_id).await;

    let (status, json) = t
        .anfrage(
            Method::DELETE,
            &format!("/api/admin/users/{admin_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "You cannot delete your own account");
}

#[tokio::test]
async fn admin_verwaltet_konten() {
    let t = test_app().await;
    let (admin_id, admin) = t.registrieren("Admin", "admin@example.com").await;
    t.zum_admin_machen(admin_id).await;
    let (bob_id, _) = t.registrieren("Bob", "bob@example.com").await;
    let bob_pfad = format!("/api/admin/users/{bob_id}");

    let (status, json) = t
        .anfrage(Method::GET, "/api/admin/users", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Users retrieved");
    let konten = json["data"]["users"].as_array().unwrap();
    assert_eq!(konten.len(), 2);
    assert_eq!(konten[0]["email"], "bob@example.com");

    let (status, json) = t
        .anfrage(
            Method::PUT,
            &bob_pfad,
            Some(&admin),
            Some(json!({ "name": "Robert", "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["user"]["name"], "Robert");
    assert_eq!(json["data"]["user"]["role"], "user");

    let (status, json) = t.anfrage(Method::DELETE, &bob_pfad, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "User account deactivated");

    let (status, json) = t.anfrage(Method::GET, &bob_pfad, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "User not found");

    let (status, json) = t
        .anfrage(
            Method::GET,
            &format!("{bob_pfad}?includeDeleted=true"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["user"]["isActive"], false);

    let (_, json) = t
        .anfrage(Method::GET, "/api/admin/users", Some(&admin), None)
        .await;
    assert_eq!(json["data"]["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_reaktiviert_deaktiviertes_konto() {
    let t = test_app().await;
    let (admin_id, admin) = t.registrieren("Admin", "admin@example.com").await;
    t.zum_admin_machen(admin_id).await;
    let (bob_id, _) = t.registrieren("Bob", "bob@example.com").await;
    let bob_pfad = format!("/api/admin/users/{bob_id}");

    let (status, _) = t.anfrage(Method::DELETE, &bob_pfad, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = t
        .anfrage(
            Method::PUT,
            &bob_pfad,
            Some(&admin),
            Some(json!({ "isActive": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["message"], "User updated");
    assert_eq!(json["data"]["user"]["isActive"], true);

    let (status, _) = t.anfrage(Method::GET, &bob_pfad, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t
        .anfrage(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "bob@example.com", "password": PASSWORT })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_produktrouten() {
    let t = test_app().await;
    let (_, alice) = t.registrieren("Alice", "alice@example.com").await;
    let (admin_id, admin) = t.registrieren("Admin", "admin@example.com").await;
    t.zum_admin_machen(admin_id).await;
    let produkt = t.produkt_anlegen(&alice, "Tee", 4.0).await;

    let (status, _) = t
        .anfrage(
            Method::POST,
            "/api/admin/products",
            Some(&admin),
            Some(json!({ "title": "Kaffee", "price": 8 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = t
        .anfrage(
            Method::DELETE,
            &format!("/api/admin/products/{produkt}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t
        .anfrage(
            Method::POST,
            "/api/admin/products",
            Some(&alice),
            Some(json!({ "title": "Kaffee", "price": 8 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Querschnitt
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unbekannte_route_liefert_json_404() {
    let t = test_app().await;

    let (status, json) = t
        .anfrage(Method::GET, "/api/unbekannt?x=1", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Route /api/unbekannt?x=1 not found");
}

#[tokio::test]
async fn falsche_methode_liefert_json_405() {
    let t = test_app().await;
    let (_, alice) = t.registrieren("Alice", "alice@example.com").await;
    let produkt = t.produkt_anlegen(&alice, "Tee", 4.0).await;

    let (status, json) = t
        .anfrage(
            Method::PATCH,
            &format!("/api/products/{produkt}"),
            None,
            Some(json!({ "price": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["status"], "error");
    assert_eq!(
        json["message"],
        format!("Method PATCH not allowed for /api/products/{produkt}")
    );
}

#[tokio::test]
async fn kaputtes_json_ist_validierungsfehler() {
    let t = test_app().await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ kein json"))
        .unwrap();
    let response = t.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn zu_grosser_body_wird_abgelehnt() {
    let t = test_app().await;
    let gross = "x".repeat(20 * 1024);

    let (status, json) = t
        .anfrage(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": gross, "email": "a@example.com", "password": PASSWORT })),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["message"], "Request body too large.");
}

#[tokio::test]
async fn rate_limit_greift_nach_max_anfragen() {
    let t = test_app_mit_limit(2).await;

    for _ in 0..2 {
        let (status, _) = t.anfrage(Method::GET, "/api/products", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let req = Request::get("/api/products").body(Body::empty()).unwrap();
    let response = t.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
}

fn anfrage_von(socket: SocketAddr, weitergeleitet: &str) -> Request<Body> {
    let mut req = Request::get("/api/products")
        .header("x-forwarded-for", weitergeleitet)
        .body(Body::empty())
        .unwrap();
    req.extensions_mut().insert(ConnectInfo(socket));
    req
}

#[tokio::test]
async fn rate_limit_laesst_sich_nicht_mit_proxy_headern_umgehen() {
    let t = test_app_mit_limit(2).await;
    let socket = SocketAddr::from(([198, 51, 100, 9], 40000));

    let mut statuscodes = Vec::new();
    for i in 0..5 {
        let req = anfrage_von(socket, &format!("203.0.113.{i}"));
        let response = t.router.clone().oneshot(req).await.unwrap();
        statuscodes.push(response.status());
    }
    assert_eq!(&statuscodes[..2], &[StatusCode::OK, StatusCode::OK]);
    assert!(statuscodes[2..]
        .iter()
        .all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn rate_limit_hinter_vertrautem_proxy_pro_weitergeleiteter_ip() {
    let t = test_app_mit_rate_limit(RateLimitKonfig {
        fenster: Duration::from_secs(900),
        max_anfragen: 1,
        proxy_vertrauen: true,
    })
    .await;
    let proxy = SocketAddr::from(([10, 0, 0, 1], 8080));

    let response = t.router.clone().oneshot(anfrage_von(proxy, "203.0.113.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = t.router.clone().oneshot(anfrage_von(proxy, "203.0.113.2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = t.router.clone().oneshot(anfrage_von(proxy, "203.0.113.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn health_meldet_umgebung() {
    let t = test_app().await;

    let (status, json) = t.anfrage(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "running");
    assert_eq!(json["data"]["env"], "test");
    assert_eq!(json["data"]["dbConnected"], true);
}
