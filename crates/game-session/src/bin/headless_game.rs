//! Console game: type moves like `e2e4` and the configured provider answers.
//! Pawns promote to a queen. Render instructions go to the log.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use chess_core::CellName;
use game_session::{Game, GameEvent, MoveOutcome, SelectOutcome, TracingSink, TurnPhase};
use move_service::{parse_uci_move, Provider, ProviderConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ProviderConfig::from_env()?;
    let provider = Provider::from_config(&config)
        .await
        .context("Failed to create move provider")?;

    let game = Game::new(provider, TracingSink);
    game.subscribe(|event: &GameEvent| match event {
        GameEvent::MoveApplied { record } => println!("{}. {} {}", (record.ply + 1) / 2, record.color, record.san),
        GameEvent::Check { color } => println!("{color} is in check"),
        GameEvent::GameOver { reason, winner } => match winner {
            Some(color) => println!("{reason}, {color} wins"),
            None => println!("{reason}"),
        },
        GameEvent::OpponentUnavailable { reason } => println!("opponent unavailable: {reason} (type 'retry')"),
        _ => {}
    })
    .await;
    game.start_standard().await?;

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        match input {
            "" => continue,
            "quit" | "exit" => break,
            "fen" => println!("{}", game.inspect(|s| s.fen()).await),
            "pgn" => println!("{}", game.inspect(|s| s.history().movetext()).await),
            "reset" => {
                game.reset().await;
                game.start_standard().await?;
            }
            "retry" => {
                if let Err(e) = game.retry_opponent().await {
                    println!("{e}");
                }
            }
            _ => {
                if let Err(e) = play(&game, input).await {
                    println!("{e:#}");
                }
            }
        }

        if let TurnPhase::Terminal(reason) = game.inspect(|s| s.phase()).await {
            println!("game over: {reason}; 'reset' or 'quit'");
        }
    }

    game.into_provider().shutdown().await;
    Ok(())
}

async fn play(game: &Game<Provider>, input: &str) -> anyhow::Result<()> {
    let Some(mv) = parse_uci_move(input) else {
        bail!("expected a move like e2e4");
    };

    let handle = game
        .inspect(|s| s.registry().find_by_cell(mv.from).map(|p| p.handle()))
        .await
        .with_context(|| format!("no piece on {}", mv.from))?;

    match game.on_select(handle).await? {
        SelectOutcome::Selected { destinations, .. } if destinations.contains(&mv.to) => {}
        SelectOutcome::Selected { destinations, .. } => {
            let list: Vec<String> = destinations.iter().map(CellName::to_string).collect();
            bail!("{} cannot go to {}; legal: {}", mv.from, mv.to, list.join(" "));
        }
        SelectOutcome::Ignored(reason) => bail!("selection ignored: {reason:?}"),
    }

    if let MoveOutcome::Ignored(reason) = game.choose_destination(mv.to).await? {
        bail!("move ignored: {reason:?}");
    }
    Ok(())
}
