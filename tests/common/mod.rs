#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{header, redirect, Client, Response, StatusCode};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // In-memory store so runs never touch a real database
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_faculty-appraisal"));
        cmd.env("PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("SESSION_SECRET", "integration-test-secret")
            .env_remove("DATABASE_URL")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// A browser-like client: keeps the session cookie, never follows redirects
pub struct Browser {
    pub base_url: String,
    client: Client,
}

impl Browser {
    pub async fn new() -> Result<Self> {
        let server = ensure_server().await?;
        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            base_url: server.base_url.clone(),
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_text(&self, path: &str) -> Result<String> {
        Ok(self.get(path).await?.text().await?)
    }

    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> Result<Response> {
        Ok(self.client.post(self.url(path)).form(form).send().await?)
    }

    /// Register a fresh account and sign in with it
    pub async fn sign_up(&self, name: &str) -> Result<String> {
        let email = format!("{}-{}@example.edu", name.to_lowercase(), uuid::Uuid::new_v4().simple());
        let res = self
            .post(
                "/users/register",
                &[("name", name), ("email", email.as_str()), ("password", "pass1234"), ("password2", "pass1234")],
            )
            .await?;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "registration did not redirect");
        assert_eq!(location(&res), "/users/login");

        let res = self
            .post("/users/login", &[("email", email.as_str()), ("password", "pass1234")])
            .await?;
        assert_eq!(location(&res), "/", "login failed for {}", email);
        Ok(email)
    }

    /// Select an academic year for this session
    pub async fn select_year(&self, year: &str) -> Result<Response> {
        self.post("/", &[("academic_year", year)]).await
    }
}

pub fn location(res: &Response) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Record ids behind every `{prefix}/edit/<id>` link on a page
pub fn edit_ids(html: &str, prefix: &str) -> Vec<String> {
    let needle = format!(r#"href="{}/edit/"#, prefix);
    html.split(needle.as_str())
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}
