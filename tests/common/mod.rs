//! Shared fixtures for integration tests
//!
//! A canned-response HTTP server over a raw TCP listener, so tests control
//! status codes, stalls (to trigger client read timeouts) and truncated
//! bodies precisely, plus a fully wired orchestrator harness on temp
//! directories.

use plugdepot::core::retry::RetryPolicy;
use plugdepot::plugin::api::{HostRuntime, PluginRuntime};
use plugdepot::update::api::{ArtifactFetcher, ManifestClient, RepositoryStore, UpdateOrchestrator};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One scripted response behaviour.
#[derive(Debug, Clone)]
pub enum Respond {
    /// 200 with the given body.
    Ok { body: Vec<u8> },
    /// Non-2xx status with a short body.
    Status { status: u16, body: String },
    /// Accept the request, then go silent long enough for the client's read
    /// timeout to fire, and drop the connection.
    Stall { duration: Duration },
    /// Claim a longer Content-Length than the body written, then drop.
    Truncated { claimed_len: usize, body: Vec<u8> },
}

/// Minimal scripted HTTP server.
///
/// Responses are queued per path; the last queued behaviour for a path keeps
/// replaying, so one `Ok` entry serves any number of repeat fetches.
pub struct FixtureServer {
    addr: SocketAddr,
    routes: Arc<Mutex<HashMap<String, VecDeque<Respond>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FixtureServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fixture server");
        let addr = listener.local_addr().expect("local addr");
        let routes: Arc<Mutex<HashMap<String, VecDeque<Respond>>>> = Arc::default();
        let requests: Arc<Mutex<Vec<String>>> = Arc::default();

        let accept_routes = Arc::clone(&routes);
        let accept_requests = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = Arc::clone(&accept_routes);
                let requests = Arc::clone(&accept_requests);
                tokio::spawn(handle_connection(stream, routes, requests));
            }
        });

        Self {
            addr,
            routes,
            requests,
        }
    }

    /// Repository base URL pointing at this server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Queue a behaviour for `path`. The last entry keeps replaying.
    pub fn enqueue(&self, path: &str, respond: Respond) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(respond);
    }

    /// Paths of all requests received so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.requests().iter().filter(|p| *p == path).count()
    }
}

async fn handle_connection(
    mut stream: tokio::net::TcpStream,
    routes: Arc<Mutex<HashMap<String, VecDeque<Respond>>>>,
    requests: Arc<Mutex<Vec<String>>>,
) {
    // Read until the end of the request headers.
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => return,
        }
    }

    let head = String::from_utf8_lossy(&buf);
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("")
        .to_string();
    requests.lock().unwrap().push(path.clone());

    let behaviour = {
        let mut routes = routes.lock().unwrap();
        match routes.get_mut(&path) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };

    match behaviour {
        Some(Respond::Ok { body }) => {
            let _ = write_response(&mut stream, 200, "OK", body.len(), &body).await;
        }
        Some(Respond::Status { status, body }) => {
            let bytes = body.into_bytes();
            let _ = write_response(&mut stream, status, "Error", bytes.len(), &bytes).await;
        }
        Some(Respond::Stall { duration }) => {
            tokio::time::sleep(duration).await;
        }
        Some(Respond::Truncated { claimed_len, body }) => {
            let _ = write_response(&mut stream, 200, "OK", claimed_len, &body).await;
        }
        None => {
            let _ = write_response(&mut stream, 404, "Not Found", 0, b"").await;
        }
    }
}

async fn write_response(
    stream: &mut tokio::net::TcpStream,
    status: u16,
    reason: &str,
    content_length: usize,
    body: &[u8],
) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status, reason, content_length
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body).await?;
    stream.flush().await
}

/// Retry policy with delays shrunk for tests; still three attempts, still
/// linear backoff.
pub fn test_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(50),
    }
}

/// Read timeout used by test fetchers; stalls must sleep longer than this.
pub const TEST_READ_TIMEOUT: Duration = Duration::from_millis(300);

/// A stall comfortably longer than `TEST_READ_TIMEOUT`.
pub fn stall() -> Respond {
    Respond::Stall {
        duration: Duration::from_secs(2),
    }
}

/// Fully wired update stack on temp directories, pointed at a fixture server.
pub struct Harness {
    pub dir: tempfile::TempDir,
    pub server: FixtureServer,
    pub runtime: Arc<HostRuntime>,
    pub repository: Arc<RepositoryStore>,
    pub orchestrator: Arc<UpdateOrchestrator>,
    pub fetcher: ArtifactFetcher,
}

impl Harness {
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let server = FixtureServer::start().await;

        let repository = Arc::new(RepositoryStore::open(dir.path()).expect("repository store"));
        repository
            .set_repository_url(&server.base_url())
            .expect("set repository url");

        let fetcher = ArtifactFetcher::with_timeouts(
            test_policy(),
            Duration::from_secs(1),
            TEST_READ_TIMEOUT,
        )
        .expect("fetcher");
        let runtime = Arc::new(HostRuntime::new());
        let orchestrator = Arc::new(UpdateOrchestrator::new(
            runtime.clone(),
            ManifestClient::new(Arc::clone(&repository), fetcher.clone()),
            fetcher.clone(),
            dir.path().join("plugins"),
        ));

        Self {
            dir,
            server,
            runtime,
            repository,
            orchestrator,
            fetcher,
        }
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.dir.path().join("plugins")
    }

    /// JSON artifact accepted by the host runtime.
    pub fn artifact_bytes(id: &str, version: &str) -> Vec<u8> {
        serde_json::json!({ "id": id, "version": version })
            .to_string()
            .into_bytes()
    }

    pub fn sha512_hex(data: &[u8]) -> String {
        use sha2::{Digest, Sha512};
        hex::encode(Sha512::digest(data))
    }

    /// Serve a one-plugin manifest plus its artifact with a valid checksum.
    pub fn serve_plugin(&self, id: &str, version: &str) -> Vec<u8> {
        let artifact = Self::artifact_bytes(id, version);
        let manifest = serde_json::json!({
            "plugins": [{
                "id": id,
                "version": version,
                "jarUrl": self.server.url(&format!("/{}.jar", id)),
                "sha512": Self::sha512_hex(&artifact),
            }]
        });
        self.server.enqueue(
            "/plugins.json",
            Respond::Ok {
                body: manifest.to_string().into_bytes(),
            },
        );
        self.server.enqueue(
            &format!("/{}.jar", id),
            Respond::Ok {
                body: artifact.clone(),
            },
        );
        artifact
    }

    /// Install `id`@`version` directly through the runtime, bypassing the
    /// network path, to set up "already installed" scenarios.
    pub async fn preinstall(&self, id: &str, version: &str) {
        let plugins_dir = self.plugins_dir();
        tokio::fs::create_dir_all(&plugins_dir).await.expect("plugins dir");
        let path = plugins_dir.join(format!("{}.jar", id));
        tokio::fs::write(&path, Self::artifact_bytes(id, version))
            .await
            .expect("write artifact");
        self.runtime.load(&path).await.expect("load artifact");
        self.runtime.start(id).await.expect("start plugin");
    }
}
