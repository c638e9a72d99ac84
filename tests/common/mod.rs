//! Purpose: In-process fake of the repository folder-location web service.
//! Role: Shared by remote and CLI integration tests; serves canned responses over loopback.
//! Invariants: The listener is bound before the server thread starts, so no readiness wait.
//! Invariants: The server shuts down and its thread is joined on drop.
#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Clone)]
struct Canned {
    status: u16,
    body: String,
}

#[derive(Clone, Default)]
struct AppState {
    responses: Arc<HashMap<String, Canned>>,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

#[derive(Default)]
pub struct FakeRepositoryBuilder {
    responses: HashMap<String, Canned>,
}

impl FakeRepositoryBuilder {
    pub fn location(mut self, logical_id: &str, base_folder: &str, folder_path: &[&str]) -> Self {
        let body = json!({ "baseFolder": base_folder, "folderPath": folder_path });
        self.responses.insert(
            logical_id.to_string(),
            Canned {
                status: 200,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn raw(mut self, logical_id: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            logical_id.to_string(),
            Canned {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn json(self, logical_id: &str, status: u16, body: Value) -> Self {
        self.raw(logical_id, status, &body.to_string())
    }

    pub fn start(self) -> TestResult<FakeRepository> {
        let state = AppState {
            responses: Arc::new(self.responses),
            ..AppState::default()
        };
        let app = Router::new()
            .route(
                "/InfoShareWS/publicationoutputs/:logical_id/folderlocation",
                get(folder_location),
            )
            .with_state(state.clone());

        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .expect("tokio runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("serve");
            });
        });

        Ok(FakeRepository {
            base_url: format!("http://{addr}/InfoShareWS/"),
            state,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }
}

pub struct FakeRepository {
    pub base_url: String,
    state: AppState,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl FakeRepository {
    pub fn builder() -> FakeRepositoryBuilder {
        FakeRepositoryBuilder::default()
    }

    /// The two locations used throughout the examples: GUID-1 and GUID-2.
    pub fn with_examples() -> FakeRepositoryBuilder {
        Self::builder()
            .location("GUID-1", "Data", &["Folder1", "Folder2"])
            .location("GUID-2", "UserGuides", &[])
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.state
            .seen
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.state
            .auth
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl Drop for FakeRepository {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn folder_location(
    State(state): State<AppState>,
    Path(logical_id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state
        .seen
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .push(logical_id.clone());
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state
        .auth
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .push(auth);

    let (status, body) = match state.responses.get(&logical_id) {
        Some(canned) => (canned.status, canned.body.clone()),
        None => (
            404,
            json!({
                "error": {
                    "kind": "NotFound",
                    "message": format!("no publication output {logical_id}")
                }
            })
            .to_string(),
        ),
    };
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

/// A loopback url nothing is listening on.
pub fn closed_base_url() -> TestResult<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/InfoShareWS/"))
}
