use anyhow::{Context, Result};
use clap::Parser;
use shared::protocol::{GameCommand, GameView};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

mod client;

use client::GameClient;

#[derive(Parser, Debug)]
#[command(about = "Play Sound-Clash from the terminal")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    First,
    Second,
    Quit,
}

fn parse_selection(input: &str) -> Option<Selection> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "a" => Some(Selection::First),
        "2" | "b" => Some(Selection::Second),
        "q" | "quit" => Some(Selection::Quit),
        _ => None,
    }
}

fn wants_another_game(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();
    let args = Args::parse();

    let client = GameClient::new(args.server_url);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut view = client
        .view()
        .await
        .context("could not load the current game")?;

    loop {
        if view.game_over {
            print_champion(&view);
            println!("Play again? [y/N]");
            match lines.next_line().await? {
                Some(answer) if wants_another_game(&answer) => {
                    view = client.send(&GameCommand::Restart).await?;
                    continue;
                }
                _ => return Ok(()),
            }
        }

        let Some(pairing) = view.pairing.clone() else {
            view = client.view().await?;
            continue;
        };
        println!();
        println!("Round {} of {}", view.round, view.total_rounds);
        if pairing.rematch {
            println!("(rematch: the artist pool has been recycled)");
        }
        println!("  [1] {}", pairing.challenger_a.name);
        println!("  [2] {}", pairing.challenger_b.name);

        let Some(selection) = prompt(&mut lines).await? else {
            return Ok(());
        };
        let pick = match selection {
            Selection::First => &pairing.challenger_a,
            Selection::Second => &pairing.challenger_b,
            Selection::Quit => return Ok(()),
        };
        view = match client.send(&view.choice(pick)).await {
            Ok(next) => next,
            Err(error) => {
                warn!(%error, "choice was not accepted; reloading game");
                client.view().await?
            }
        };
    }
}

/// Reads until a valid selection. `None` means stdin closed.
async fn prompt(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<Selection>> {
    loop {
        println!("Who is more popular? (1/2, q to quit)");
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        match parse_selection(&line) {
            Some(selection) => return Ok(Some(selection)),
            None => println!("Please answer 1, 2 or q."),
        }
    }
}

fn print_champion(view: &GameView) {
    match view.champion.as_ref() {
        Some(champion) => println!("🏆 The final champion is: {}! 🏆", champion.name),
        None => println!("The game is over."),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
