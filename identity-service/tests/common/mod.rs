use std::net::SocketAddr;
use std::sync::Arc;

use auth::Authenticator;
use auth::HashingCost;
use auth::PasswordHasher;
use auth::SigningKey;
use auth::TokenIssuer;
use auth::TokenVerifier;
use chrono::Utc;
use identity_service::domain::authentication::models::RegisterCommand;
use identity_service::domain::authentication::ports::AuthServicePort;
use identity_service::domain::authentication::service::AuthService;
use identity_service::domain::user::models::Handle;
use identity_service::domain::user::models::Role;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserRepository;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TEST_TTL_SECONDS: i64 = 3600;
pub const ADMIN_HANDLE: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-pass";

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryUserRepository>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::new());
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&repository),
            Arc::new(test_authenticator()),
            6,
        ));

        // Administrators cannot self-register, seed one directly
        auth_service
            .register(
                RegisterCommand::new(
                    Handle::new(ADMIN_HANDLE.to_string()).unwrap(),
                    ADMIN_PASSWORD.to_string(),
                    Role::new(Role::ADMIN.to_string()).unwrap(),
                ),
                Utc::now(),
            )
            .await
            .expect("Failed to seed admin user");

        let router = create_router(auth_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            repository,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Register a user and return the response body
    pub async fn register(&self, handle: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&serde_json::json!({ "handle": handle, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the response
    pub async fn login(&self, handle: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&serde_json::json!({ "handle": handle, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and extract the access token, panicking on failure
    pub async fn token_for(&self, handle: &str, password: &str) -> String {
        let response = self.login(handle, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("token missing from login response")
            .to_string()
    }
}

/// Authenticator with a cheap hashing cost so tests stay fast
pub fn test_authenticator() -> Authenticator {
    let key = SigningKey::new(TEST_SECRET).unwrap();
    let hasher = PasswordHasher::with_cost(HashingCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();

    Authenticator::new(
        hasher,
        TokenIssuer::new(key.clone(), TEST_TTL_SECONDS).unwrap(),
        TokenVerifier::new(key),
    )
    .unwrap()
}
