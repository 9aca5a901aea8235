/// HTTP move provider against an in-process fake move service.
mod common;

use std::time::Duration;

use axum::http::StatusCode;
use chess3d::chess_core::fen::STANDARD_START_FEN;
use chess3d::game_session::RecordingSink;
use chess3d::move_service::{HttpMoveProvider, ProviderKind};
use chess3d::{Game, MoveOutcome, PieceColor, PieceKind, ProviderConfig, ProviderError, TurnPhase};
use common::{cell, play, FakeMoveService};

fn config_for(url: String) -> ProviderConfig {
    ProviderConfig {
        kind: ProviderKind::Http,
        service_url: url,
        ..ProviderConfig::default()
    }
}

async fn provider_for(service: FakeMoveService) -> HttpMoveProvider {
    let url = service.spawn().await;
    HttpMoveProvider::new(&config_for(url)).unwrap()
}

#[tokio::test]
async fn test_request_body_carries_fen_and_depth() {
    let service = FakeMoveService::new(StatusCode::OK, r#"{"from":"e2","to":"e4"}"#);
    let requests = service.requests.clone();
    let provider = provider_for(service).await;

    let mv = provider.request_move(STANDARD_START_FEN).await.unwrap();
    assert_eq!((mv.from, mv.to), (cell("e2"), cell("e4")));

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["fen"], STANDARD_START_FEN);
    assert_eq!(requests[0]["depth"], 10);
}

#[tokio::test]
async fn test_structured_reply_with_promotion() {
    let body = r#"{"text":"Move b7 → b8 (b8=Q)","from":"b7","to":"b8","promotion":"q","isCastling":false}"#;
    let provider = provider_for(FakeMoveService::new(StatusCode::OK, body)).await;

    let mv = provider.request_move(STANDARD_START_FEN).await.unwrap();
    assert_eq!(mv.to, cell("b8"));
    assert_eq!(mv.promotion, Some(PieceKind::Queen));
    assert!(!mv.is_castling);
}

#[tokio::test]
async fn test_bare_and_quoted_string_replies() {
    let provider = provider_for(FakeMoveService::new(StatusCode::OK, "e7e5")).await;
    assert_eq!(provider.request_move(STANDARD_START_FEN).await.unwrap().to, cell("e5"));

    let provider = provider_for(FakeMoveService::new(StatusCode::OK, "\"g8f6\"")).await;
    assert_eq!(provider.request_move(STANDARD_START_FEN).await.unwrap().from, cell("g8"));

    let provider = provider_for(FakeMoveService::new(StatusCode::OK, r#"{"bestMove":"c7c5"}"#)).await;
    assert_eq!(provider.request_move(STANDARD_START_FEN).await.unwrap().to, cell("c5"));
}

#[tokio::test]
async fn test_error_status_is_unavailable() {
    let provider = provider_for(FakeMoveService::new(StatusCode::SERVICE_UNAVAILABLE, "busy")).await;
    assert_eq!(
        provider.request_move(STANDARD_START_FEN).await,
        Err(ProviderError::Status(503))
    );
}

#[tokio::test]
async fn test_malformed_reply() {
    let provider = provider_for(FakeMoveService::new(StatusCode::OK, r#"{"error":"no move"}"#)).await;
    assert!(matches!(
        provider.request_move(STANDARD_START_FEN).await,
        Err(ProviderError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_request_timeout() {
    let service = FakeMoveService::new(StatusCode::OK, "e7e5").with_delay(Duration::from_secs(5));
    let url = service.spawn().await;
    let config = ProviderConfig {
        timeout: Duration::from_millis(200),
        ..config_for(url)
    };
    let provider = HttpMoveProvider::new(&config).unwrap();

    assert_eq!(
        provider.request_move(STANDARD_START_FEN).await,
        Err(ProviderError::Timeout)
    );
}

#[tokio::test]
async fn test_unreachable_service() {
    // nothing listens on port 9 locally
    let provider = HttpMoveProvider::new(&config_for("http://127.0.0.1:9/v1".into())).unwrap();
    assert!(matches!(
        provider.request_move(STANDARD_START_FEN).await,
        Err(ProviderError::Http(_))
    ));
}

#[tokio::test]
async fn test_game_against_http_service() {
    let url = FakeMoveService::new(StatusCode::OK, r#"{"move":"e7e5"}"#).spawn().await;
    let provider = HttpMoveProvider::new(&config_for(url)).unwrap();
    let game = Game::new(provider, RecordingSink::new());
    game.start_standard().await.unwrap();

    let outcome = play(&game, "e2", "e4").await;
    let MoveOutcome::Played { opponent, .. } = outcome else {
        panic!("move should be played");
    };
    assert_eq!(opponent.unwrap().san, "e5");
    assert_eq!(
        game.inspect(|s| s.phase()).await,
        TurnPhase::AwaitingSelection(PieceColor::White)
    );
}
