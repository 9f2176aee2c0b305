use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use todo_share_api::auth::Claims;
use todo_share_api::database::MemoryStore;
use todo_share_api::media::LocalMediaStore;
use todo_share_api::observer::{EventDispatcher, TopicHub, DEFAULT_SINK_TIMEOUT};
use todo_share_api::{app, AppState};

pub const JWT_SECRET: &str = "integration-secret";

/// Router served in-process on a free port, backed by the in-memory store
pub struct TestServer {
    pub base_url: String,
    pub media_root: PathBuf,
    pub hub: Arc<TopicHub>,
    client: reqwest::Client,
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub token: String,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let media_root = std::env::temp_dir().join(format!("todo-share-it-{}", Uuid::new_v4().simple()));

        let hub = Arc::new(TopicHub::new(64));
        let events = EventDispatcher::spawn(hub.clone(), 64, DEFAULT_SINK_TIMEOUT);
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(LocalMediaStore::new(media_root.clone(), "/media")),
            events,
            JWT_SECRET,
            None,
        );

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            base_url,
            media_root,
            hub,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a user and mint a token for it
    pub async fn register(&self, name: &str) -> Result<TestUser> {
        let res = self
            .client
            .post(self.url("/api/users/register"))
            .json(&json!({ "display_name": name }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        let body: Value = res.json().await?;
        let id: Uuid = serde_json::from_value(body["data"]["id"].clone())?;

        Ok(TestUser {
            id,
            name: name.to_string(),
            token: token_for(id, name, JWT_SECRET),
        })
    }

    pub fn request(&self, method: Method, user: &TestUser, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path)).bearer_auth(&user.token)
    }

    pub fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Create a list and return its JSON
    pub async fn create_list(&self, owner: &TestUser, title: &str) -> Result<Value> {
        let res = self
            .request(Method::POST, owner, "/api/todo/list")
            .json(&json!({ "title": title }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create list failed: {}", res.status());
        data(res).await
    }

    pub async fn share(&self, owner: &TestUser, list_id: &str, with: &TestUser, permission: &str) -> Result<StatusCode> {
        let res = self
            .request(Method::POST, owner, &format!("/api/todo/share/{}", list_id))
            .json(&json!({ "user_id": with.id, "permission": permission }))
            .send()
            .await?;
        Ok(res.status())
    }

    /// Add an item through the multipart endpoint
    pub async fn add_item(&self, user: &TestUser, list: &Value, fields: &[(&str, &str)]) -> Result<reqwest::Response> {
        let mut form = reqwest::multipart::Form::new().text("version", list["version"].to_string());
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }
        let path = format!("/api/todo/item/{}", str_field(list, "id"));
        Ok(self.request(Method::POST, user, &path).multipart(form).send().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

pub fn token_for(user_id: Uuid, name: &str, secret: &str) -> String {
    let claims = Claims::new(user_id, name, chrono::Duration::hours(1));
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).expect("token encoding")
}

/// The `data` member of a success envelope
pub async fn data(res: reqwest::Response) -> Result<Value> {
    let body: Value = res.json().await?;
    anyhow::ensure!(body["success"] == true, "not a success envelope: {}", body);
    Ok(body["data"].clone())
}

pub fn str_field<'a>(value: &'a Value, field: &str) -> &'a str {
    value[field].as_str().unwrap_or_default()
}

pub fn item_names(list: &Value) -> Vec<String> {
    list["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
