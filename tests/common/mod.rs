#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio::sync::Notify;

use chess3d::chess_core::{CellName, Handle};
use chess3d::{Game, MoveProvider, ProviderError, RemoteMove};

pub fn cell(s: &str) -> CellName {
    s.parse().unwrap()
}

pub fn reply(from: &str, to: &str) -> Result<RemoteMove, ProviderError> {
    Ok(RemoteMove::new(cell(from), cell(to)))
}

/// Provider that answers from a fixed script, optionally waiting for a
/// signal before each answer.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<RemoteMove, ProviderError>>>,
    requests: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<RemoteMove, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    pub fn gated(replies: Vec<Result<RemoteMove, ProviderError>>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(replies)
        }
    }

    /// FENs received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl MoveProvider for ScriptedProvider {
    async fn request_move(&self, fen: &str) -> Result<RemoteMove, ProviderError> {
        self.requests.lock().unwrap().push(fen.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ProviderError::Http("script exhausted".into())))
    }
}

pub async fn handle_at<P: MoveProvider>(game: &Game<P>, name: &str) -> Handle {
    let target = cell(name);
    game.inspect(|s| s.registry().find_by_cell(target).map(|p| p.handle()))
        .await
        .unwrap_or_else(|| panic!("no piece on {name}"))
}

/// Select the piece on `from` and choose `to`.
pub async fn play<P: MoveProvider>(game: &Game<P>, from: &str, to: &str) -> chess3d::MoveOutcome {
    let handle = handle_at(game, from).await;
    game.on_select(handle).await.unwrap();
    game.choose_destination(cell(to)).await.unwrap()
}

#[derive(Clone)]
pub struct FakeMoveService {
    status: StatusCode,
    body: String,
    delay: Duration,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeMoveService {
    pub fn new(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
            requests: Arc::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Serve on an ephemeral local port; returns the endpoint URL.
    pub async fn spawn(self) -> String {
        let app = Router::new().route("/v1", post(answer)).with_state(self);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }
}

async fn answer(State(service): State<FakeMoveService>, Json(body): Json<Value>) -> (StatusCode, String) {
    service.requests.lock().unwrap().push(body);
    if !service.delay.is_zero() {
        tokio::time::sleep(service.delay).await;
    }
    (service.status, service.body.clone())
}
