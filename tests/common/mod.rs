#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use noteful_api::config::AppConfig;
use noteful_api::database::Repositories;
use noteful_api::state::AppState;

pub const PASSWORD: &str = "password123";

/// A server running on its own port with a fresh in-memory store.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let state = AppState::new(AppConfig::testing(), Repositories::memory())?;
        let app = noteful_api::app(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(&body)
    }

    pub fn put(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(&body)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    pub async fn register(&self, username: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/users"))
            .json(&json!({ "username": username, "password": PASSWORD, "fullname": "Test User" }))
            .send()
            .await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    /// Register `username` and return a bearer token for it.
    pub async fn signup(&self, username: &str) -> Result<String> {
        let res = self.register(username).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body: Value = self.login(username, PASSWORD).await?.json().await?;
        body["authToken"]
            .as_str()
            .map(str::to_string)
            .context("login response has no authToken")
    }

    /// Create a resource and return its JSON representation.
    pub async fn create(&self, path: &str, token: &str, body: Value) -> Result<Value> {
        let res = self.post(path, token, body).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create {} failed: {}", path, res.status());
        Ok(res.json().await?)
    }
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap_or_default().to_string()
}
