//! Move service reply parsing.
//!
//! Services disagree on the reply shape, so every form seen in practice is
//! accepted: an object with `from`/`to`, an object carrying a long-algebraic
//! move string, a JSON string, or a bare text body.

use chess_core::{CellName, PieceKind};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::ProviderError;

/// Keys that may carry a long-algebraic move inside an object reply.
const MOVE_KEYS: [&str; 4] = ["bestMove", "bestmove", "move", "lan"];

/// A move proposed by a provider, not yet checked for legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemoteMove {
    pub from: CellName,
    pub to: CellName,
    /// Provider's own castling flag; the oracle decides for real.
    pub is_castling: bool,
    pub promotion: Option<PieceKind>,
}

impl RemoteMove {
    pub fn new(from: CellName, to: CellName) -> Self {
        Self { from, to, is_castling: false, promotion: None }
    }
}

/// Parse a move in long algebraic form (`e2e4`, `e7e8q`).
pub fn parse_uci_move(text: &str) -> Option<RemoteMove> {
    let uci_re = Regex::new(r"^([a-hA-H][1-8])([a-hA-H][1-8])([qrbnQRBN])?$").ok()?;
    let caps = uci_re.captures(text.trim())?;
    let from: CellName = caps.get(1)?.as_str().parse().ok()?;
    let to: CellName = caps.get(2)?.as_str().parse().ok()?;
    let promotion = caps
        .get(3)
        .and_then(|m| m.as_str().chars().next())
        .and_then(PieceKind::from_promotion_char);
    Some(RemoteMove { from, to, is_castling: false, promotion })
}

/// Interpret a decoded JSON reply.
pub fn parse_reply(value: &Value) -> Result<RemoteMove, ProviderError> {
    match value {
        Value::String(text) => parse_uci_move(text)
            .ok_or_else(|| ProviderError::Malformed(format!("unrecognised move string {text:?}"))),
        Value::Object(map) => {
            let from = map.get("from").and_then(|v| v.as_str());
            let to = map.get("to").and_then(|v| v.as_str());
            if let (Some(from), Some(to)) = (from, to) {
                return parse_from_to(value, from, to);
            }

            MOVE_KEYS
                .iter()
                .filter_map(|key| map.get(*key).and_then(|v| v.as_str()))
                .find_map(parse_uci_move)
                .map(|mv| RemoteMove { is_castling: castling_flag(value), ..mv })
                .ok_or_else(|| ProviderError::Malformed("reply object has no usable move".into()))
        }
        other => Err(ProviderError::Malformed(format!("unexpected reply {other}"))),
    }
}

/// Interpret a raw response body: JSON when it decodes, bare text otherwise.
pub fn parse_body(body: &str) -> Result<RemoteMove, ProviderError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ProviderError::Malformed("empty reply".into()));
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => parse_reply(&value),
        Err(_) => parse_uci_move(body)
            .ok_or_else(|| ProviderError::Malformed(format!("unrecognised reply body {body:?}"))),
    }
}

fn parse_from_to(value: &Value, from: &str, to: &str) -> Result<RemoteMove, ProviderError> {
    let from: CellName = from
        .parse()
        .map_err(|_| ProviderError::Malformed(format!("bad 'from' cell {from:?}")))?;
    let to: CellName = to
        .parse()
        .map_err(|_| ProviderError::Malformed(format!("bad 'to' cell {to:?}")))?;

    let promotion = value
        .get("promotion")
        .and_then(|v| v.as_str())
        .and_then(|s| s.chars().next())
        .and_then(PieceKind::from_promotion_char);

    Ok(RemoteMove { from, to, is_castling: castling_flag(value), promotion })
}

fn castling_flag(value: &Value) -> bool {
    ["castling", "isCastling"]
        .iter()
        .any(|key| value.get(*key).and_then(|v| v.as_bool()).unwrap_or(false))
}
