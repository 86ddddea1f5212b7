#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

use imobportal::config::{Config, ProperfyConfig};
use imobportal::properfy::{PropertyApi, PropertyApiError};
use imobportal::tickets::TicketStore;

pub const ADMIN_EMAIL: &str = "admin@test.com";
pub const PASSWORD: &str = "password123";

/// How the fake property API fails, when it does.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Timeout,
    Status(u16),
}

/// Canned property API: answers each path with a fixed body.
/// Unknown paths answer 404.
#[derive(Default)]
pub struct FakeApi {
    responses: HashMap<String, Value>,
    failure: Option<Failure>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), body);
        self
    }

    pub fn failing(failure: Failure) -> Self {
        Self {
            responses: HashMap::new(),
            failure: Some(failure),
        }
    }
}

#[async_trait]
impl PropertyApi for FakeApi {
    async fn get_json(&self, path: &str) -> Result<Value, PropertyApiError> {
        match self.failure {
            Some(Failure::Timeout) => Err(PropertyApiError::Timeout(format!("{path}: timed out"))),
            Some(Failure::Status(status)) => Err(PropertyApiError::Status {
                path: path.to_string(),
                status,
            }),
            None => self
                .responses
                .get(path)
                .cloned()
                .ok_or_else(|| PropertyApiError::Status {
                    path: path.to_string(),
                    status: 404,
                }),
        }
    }
}

/// A running test server with its own database and ticket file.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: SqlitePool,
    pub client: Client,
    pub dir: PathBuf,
    pub tickets_path: PathBuf,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit the registration form.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/register"))
            .form(&[("username", username), ("email", email), ("password", password)])
            .send()
            .await
            .expect("register request failed")
    }

    /// Submit the login form, returning the response.
    pub async fn login_response(&self, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("login request failed")
    }

    /// Log in and return the session cookie value.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let resp = self.login_response(email, password).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "login did not redirect");
        cookie_value(&resp, "access_token").expect("login set no session cookie")
    }

    /// Register the first account (which becomes super admin) and log in.
    pub async fn bootstrap(&self) -> String {
        let resp = self.register("admin", ADMIN_EMAIL, PASSWORD).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "bootstrap register failed");
        self.login(ADMIN_EMAIL, PASSWORD).await
    }

    /// Register a regular account and return its session.
    pub async fn regular_user(&self, username: &str, email: &str) -> String {
        let resp = self.register(username, email, PASSWORD).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "register failed");
        self.login(email, PASSWORD).await
    }

    /// GET with an optional session cookie.
    pub async fn get(&self, path: &str, session: Option<&str>) -> Response {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = session {
            req = req.header("Cookie", format!("access_token={token}"));
        }
        req.send().await.expect("get request failed")
    }

    /// GET a JSON endpoint with a session, returning (body, status).
    pub async fn get_json(&self, path: &str, session: &str) -> (Value, StatusCode) {
        let resp = self.get(path, Some(session)).await;
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST a form with a session cookie.
    pub async fn post_form(&self, path: &str, session: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header("Cookie", format!("access_token={session}"))
            .form(form)
            .send()
            .await
            .expect("post request failed")
    }

    /// Render a page with a pending flash cookie attached.
    pub async fn follow_with_flash(&self, resp: &Response, session: Option<&str>) -> String {
        let location = location(resp);
        let mut cookies = Vec::new();
        if let Some(token) = session {
            cookies.push(format!("access_token={token}"));
        }
        if let Some(flash) = cookie_value(resp, "flash") {
            cookies.push(format!("flash={flash}"));
        }
        self.client
            .get(self.url(&location))
            .header("Cookie", cookies.join("; "))
            .send()
            .await
            .expect("follow request failed")
            .text()
            .await
            .expect("page body")
    }
}

/// Value of a cookie set by the response, if any.
pub fn cookie_value(resp: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix(&prefix))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .find(|v| !v.is_empty())
}

/// Redirect target of the response.
pub fn location(resp: &Response) -> String {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(FakeApi::new()).await
}

/// Spawn a test app backed by `api` (a fake or a real client), a fresh SQLite file and an empty board.
pub async fn spawn_app_with(api: impl PropertyApi + 'static) -> TestApp {
    let dir = std::env::temp_dir().join(format!("portal_test_{}", Uuid::now_v7().simple()));
    std::fs::create_dir_all(&dir).expect("Failed to create test directory");
    let db_path = dir.join("portal.db");
    let tickets_path = dir.join("tickets.json");

    let connect_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .expect("Failed to open test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: format!("sqlite://{}", db_path.display()),
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        log_level: "warn".to_string(),
        max_body_size: 1_048_576,
        secure_cookies: false,
        session_hours: 1,
        tickets_path: tickets_path.clone(),
        bootstrap_admin: None,
        properfy: ProperfyConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            token: "test-token".to_string(),
            timeout_secs: 1,
        },
    };

    let tickets = TicketStore::open(&tickets_path)
        .await
        .expect("Failed to open ticket store");

    let app = imobportal::build_app(pool.clone(), config, Arc::new(api), tickets);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        dir,
        tickets_path,
    }
}

/// Close the pool and remove the test directory.
pub async fn cleanup(app: TestApp) {
    app.pool.close().await;
    let _ = std::fs::remove_dir_all(&app.dir);
}
