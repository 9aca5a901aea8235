//! Local UCI engine provider (async I/O over a child process)

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::reply::{parse_uci_move, RemoteMove};

struct EngineIo {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl EngineIo {
    async fn send(&mut self, cmd: &str) -> Result<(), ProviderError> {
        debug!(cmd, "UCI <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| ProviderError::Engine(format!("Failed to write to engine: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| ProviderError::Engine(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, ProviderError> {
        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| ProviderError::Engine(format!("Failed to read from engine: {e}")))?;
        if read == 0 {
            return Err(ProviderError::Engine("engine closed its output".into()));
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "UCI >");
        Ok(trimmed)
    }

    async fn wait_for(&mut self, expected: &str) -> Result<(), ProviderError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }
}

/// Engine process speaking UCI; one search at a time.
pub struct UciEngineProvider {
    io: Mutex<EngineIo>,
    depth: u32,
}

impl UciEngineProvider {
    /// Spawn the engine and complete the UCI handshake.
    pub async fn spawn(path: &str, depth: u32) -> Result<Self, ProviderError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProviderError::Engine(format!("Failed to spawn engine at {path}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| ProviderError::Engine("engine stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| ProviderError::Engine("engine stdout unavailable".into()))?;

        let mut io = EngineIo { process, stdin, stdout: BufReader::new(stdout) };
        io.send("uci").await?;
        io.wait_for("uciok").await?;
        io.send("setoption name Threads value 1").await?;
        io.send("isready").await?;
        io.wait_for("readyok").await?;
        info!(path, depth, "UCI engine ready");

        Ok(Self { io: Mutex::new(io), depth })
    }

    pub async fn request_move(&self, fen: &str) -> Result<RemoteMove, ProviderError> {
        let mut io = self.io.lock().await;
        io.send(&format!("position fen {fen}")).await?;
        io.send(&format!("go depth {}", self.depth)).await?;

        loop {
            let line = io.read_line().await?;
            if line.starts_with("bestmove") {
                return parse_bestmove(&line);
            }
        }
    }

    /// Send `quit` and wait for the process to exit.
    pub async fn quit(&mut self) {
        let io = self.io.get_mut();
        let _ = io.send("quit").await;
        let _ = io.process.wait().await;
    }
}

/// Parse `bestmove e2e4 [ponder e7e5]`; `(none)` means no legal move.
fn parse_bestmove(line: &str) -> Result<RemoteMove, ProviderError> {
    let token = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ProviderError::Malformed(format!("bestmove without a move: {line:?}")))?;
    if token == "(none)" || token == "0000" {
        return Err(ProviderError::Engine("engine has no move in this position".into()));
    }
    parse_uci_move(token).ok_or_else(|| ProviderError::Malformed(format!("bad bestmove {token:?}")))
}
