//! Server-rendered game page.
//!
//! The browser only ever sees `/`; the two forms post back and get
//! redirected there.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use shared::{
    domain::{Artist, ArtistId, GameId},
    error::{ErrorCode, GameError},
    protocol::{GameCommand, GameView},
};
use tracing::{info, warn};

use crate::{api::status_for, app_state::AppState};

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceForm {
    game_id: GameId,
    round: u32,
    artist_id: ArtistId,
}

/// GET /
pub(crate) async fn index(State(state): State<Arc<AppState>>) -> Response {
    match state.current_view().await {
        Ok(view) => Html(game_page(&view)).into_response(),
        Err(err) => failure(err),
    }
}

/// POST /choose
pub(crate) async fn choose(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ChoiceForm>,
) -> Response {
    let command = GameCommand::ChoiceMade {
        game_id: form.game_id,
        round: form.round,
        artist_id: form.artist_id,
    };
    match state.dispatch(command).await {
        Ok(_) => Redirect::to("/").into_response(),
        // A resubmitted or outdated form; the fresh page shows where the game is.
        Err(err) if err.code() == ErrorCode::Conflict => {
            info!(%err, "ignoring outdated choice");
            Redirect::to("/").into_response()
        }
        Err(err) => failure(err),
    }
}

/// POST /restart
pub(crate) async fn restart(State(state): State<Arc<AppState>>) -> Response {
    match state.dispatch(GameCommand::Restart).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => failure(err),
    }
}

fn failure(err: GameError) -> Response {
    let status = status_for(err.code());
    warn!(%err, %status, "rendering error page");
    (status, Html(error_page(&err.to_string()))).into_response()
}

const STYLE: &str = r#"
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            text-align: center;
            margin: 0;
            padding: 30px;
        }
        h1 { color: #1db954; }
        .round { color: #888; font-size: 20px; margin-bottom: 20px; }
        .arena { display: flex; justify-content: center; gap: 40px; }
        .card {
            background-color: #2a2a2a;
            border: 1px solid #3a3a3a;
            border-radius: 8px;
            padding: 16px;
            width: 300px;
        }
        .card img {
            width: 300px;
            height: 300px;
            object-fit: cover;
            border-radius: 4px;
        }
        .card h2 { font-size: 22px; }
        button {
            background-color: #1db954;
            color: #fff;
            border: none;
            border-radius: 20px;
            padding: 10px 24px;
            font-size: 16px;
            cursor: pointer;
        }
        .note { color: #f0ad4e; }
        .error { color: #ff6b6b; font-size: 18px; }
"#;

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sound-Clash</title>
    <style>{STYLE}</style>
</head>
<body>
    <h1>⚔️ Sound-Clash ⚔️</h1>
{body}
</body>
</html>
"#
    )
}

pub(crate) fn game_page(view: &GameView) -> String {
    if view.game_over {
        let champion = view
            .champion
            .as_ref()
            .map(|artist| escape(&artist.name))
            .unwrap_or_default();
        let portrait = view
            .champion
            .as_ref()
            .map(|artist| {
                format!(
                    r#"<div class="card" style="margin: 0 auto;"><img src="{}" alt="{}"></div>"#,
                    escape(&artist.image_url),
                    escape(&artist.name)
                )
            })
            .unwrap_or_default();
        return layout(&format!(
            r#"    <h2>🏆 The final champion is: {champion}! 🏆</h2>
    {portrait}
    <form method="post" action="/restart"><p><button type="submit">Play again</button></p></form>"#
        ));
    }

    let Some(pairing) = view.pairing.as_ref() else {
        return error_page("No round is in progress.");
    };
    let note = if pairing.rematch {
        r#"    <p class="note">Every artist has had a turn, so earlier challengers are back for a rematch.</p>
"#
    } else {
        ""
    };
    layout(&format!(
        r#"    <div class="round">Round {round} of {total}</div>
{note}    <div class="arena">
{a}
{b}
    </div>"#,
        round = view.round,
        total = view.total_rounds,
        a = card(view, &pairing.challenger_a),
        b = card(view, &pairing.challenger_b),
    ))
}

fn card(view: &GameView, artist: &Artist) -> String {
    let name = escape(&artist.name);
    format!(
        r#"        <div class="card">
            <img src="{image}" alt="{name}">
            <h2>{name}</h2>
            <form method="post" action="/choose">
                <input type="hidden" name="game_id" value="{game_id}">
                <input type="hidden" name="round" value="{round}">
                <input type="hidden" name="artist_id" value="{artist_id}">
                <button type="submit">Choose: {name}</button>
            </form>
        </div>"#,
        image = escape(&artist.image_url),
        game_id = view.game_id,
        round = view.round,
        artist_id = escape(artist.id.as_str()),
    )
}

pub(crate) fn error_page(message: &str) -> String {
    layout(&format!(
        r#"    <p class="error">{}</p>
    <form method="post" action="/restart"><button type="submit">Try again</button></form>"#,
        escape(message)
    ))
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/pages_tests.rs"]
mod tests;
