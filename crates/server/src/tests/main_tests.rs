use super::*;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
};
use catalog::{CatalogQuery, ProviderError};
use game_core::GameRules;
use shared::{
    domain::{Artist, ArtistId, GameId},
    error::{ApiError, ErrorCode},
    protocol::{GameCommand, GameView},
};
use tower::ServiceExt;

struct StaticProvider {
    artists: Vec<Artist>,
    fail: bool,
}

#[async_trait]
impl ArtistProvider for StaticProvider {
    async fn fetch_artists(&self, _query: &CatalogQuery) -> Result<Vec<Artist>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Status {
                status: 503,
                body: "down for maintenance".into(),
            });
        }
        Ok(self.artists.clone())
    }
}

fn app_with(count: usize, fail: bool) -> Router {
    let artists = (0..count)
        .map(|i| {
            Artist::new(
                format!("artist-{i}"),
                format!("Artist {i}"),
                format!("https://img/{i}.jpg"),
            )
        })
        .collect();
    let state = AppState::new(
        Arc::new(StaticProvider { artists, fail }),
        CatalogQuery::default(),
        GameRules::default(),
    );
    build_router(Arc::new(state))
}

fn test_app() -> Router {
    app_with(50, false)
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

async fn text_body(response: axum::response::Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

async fn fetch_view(app: &Router) -> GameView {
    let request = Request::get("/api/game")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

async fn send(app: &Router, command: &GameCommand) -> axum::response::Response {
    let request = Request::post("/api/game/events")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(command).expect("encode")))
        .expect("request");
    app.clone().oneshot(request).await.expect("response")
}

fn pick_a(view: &GameView) -> GameCommand {
    let pairing = view.pairing.as_ref().expect("pairing");
    view.choice(&pairing.challenger_a)
}

#[tokio::test]
async fn healthz_reports_ok() {
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text_body(response).await, "ok");
}

#[tokio::test]
async fn first_visit_deals_round_one() {
    let app = test_app();
    let view = fetch_view(&app).await;
    assert_eq!(view.round, 1);
    assert_eq!(view.total_rounds, 30);
    assert!(!view.game_over);
    assert!(view.pairing.is_some());

    let again = fetch_view(&app).await;
    assert_eq!(again.game_id, view.game_id);
    assert_eq!(again.pairing, view.pairing);
}

#[tokio::test]
async fn choice_advances_and_duplicate_is_a_conflict() {
    let app = test_app();
    let view = fetch_view(&app).await;
    let command = pick_a(&view);

    let response = send(&app, &command).await;
    assert_eq!(response.status(), StatusCode::OK);
    let next: GameView = json_body(response).await;
    assert_eq!(next.round, 2);
    assert_eq!(
        next.champion.as_ref().map(|artist| &artist.id),
        view.pairing.as_ref().map(|p| &p.challenger_a.id)
    );

    let response = send(&app, &command).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(fetch_view(&app).await.round, 2);
}

#[tokio::test]
async fn choosing_an_outsider_is_rejected() {
    let app = test_app();
    let view = fetch_view(&app).await;
    let command = GameCommand::ChoiceMade {
        game_id: view.game_id.clone(),
        round: view.round,
        artist_id: ArtistId::new("nobody"),
    };

    let response = send(&app, &command).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn choice_before_any_game_is_stale() {
    let command = GameCommand::ChoiceMade {
        game_id: GameId::random(),
        round: 1,
        artist_id: ArtistId::new("artist-1"),
    };
    let response = send(&test_app(), &command).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn full_game_finishes_and_restart_deals_a_new_one() {
    let app = test_app();
    let mut view = fetch_view(&app).await;
    let first_champion = view.pairing.clone().expect("pairing").challenger_a;
    for _ in 0..30 {
        view = json_body(send(&app, &pick_a(&view)).await).await;
    }
    assert!(view.game_over);
    assert_eq!(view.champion, Some(first_champion));

    let response = send(&app, &GameCommand::Restart).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fresh: GameView = json_body(response).await;
    assert_eq!(fresh.round, 1);
    assert!(!fresh.game_over);
    assert!(fresh.champion.is_none());
    assert_ne!(fresh.game_id, view.game_id);
}

#[tokio::test]
async fn provider_failure_is_a_bad_gateway() {
    let request = Request::get("/api/game")
        .body(Body::empty())
        .expect("request");
    let response = app_with(50, true).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::ProviderUnavailable);
    assert!(err.message.contains("down for maintenance"));
}

#[tokio::test]
async fn too_few_artists_is_service_unavailable() {
    let request = Request::get("/api/game")
        .body(Body::empty())
        .expect("request");
    let response = app_with(10, false).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::InsufficientData);
}

#[tokio::test]
async fn html_page_renders_the_current_round() {
    let app = test_app();
    let view = fetch_view(&app).await;
    let pairing = view.pairing.expect("pairing");

    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = text_body(response).await;
    assert!(html.contains("Round 1 of 30"));
    assert!(html.contains(&format!("Choose: {}", pairing.challenger_a.name)));
    assert!(html.contains(&format!("Choose: {}", pairing.challenger_b.name)));
}

#[tokio::test]
async fn html_error_page_uses_the_error_status() {
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app_with(0, false).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let html = text_body(response).await;
    assert!(html.contains("Try again"));
}

#[tokio::test]
async fn choice_form_redirects_back_to_the_page() {
    let app = test_app();
    let view = fetch_view(&app).await;
    let pairing = view.pairing.clone().expect("pairing");
    let form = format!(
        "game_id={}&round={}&artist_id={}",
        view.game_id,
        view.round,
        pairing.challenger_b.id
    );

    for _ in 0..2 {
        let request = Request::post("/choose")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.clone()))
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers().get(header::LOCATION).expect("location");
        assert_eq!(location.to_str().expect("ascii"), "/");
    }

    let next = fetch_view(&app).await;
    assert_eq!(next.round, 2);
    assert_eq!(next.champion, Some(pairing.challenger_b));
}

#[tokio::test]
async fn restart_form_redirects_with_a_new_game() {
    let app = test_app();
    let view = fetch_view(&app).await;

    let request = Request::post("/restart")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_ne!(fetch_view(&app).await.game_id, view.game_id);
}

#[tokio::test]
async fn oversized_bodies_are_refused() {
    let request = Request::post("/api/game/events")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(vec![b' '; MAX_BODY_BYTES + 1]))
        .expect("request");
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[test]
fn file_catalog_needs_a_path() {
    let settings = Settings {
        catalog_source: CatalogSource::File,
        ..Settings::default()
    };
    assert!(build_provider(&settings).is_err());

    let settings = Settings {
        catalog_source: CatalogSource::File,
        artists_file: Some("artists.json".into()),
        ..Settings::default()
    };
    assert!(build_provider(&settings).is_ok());
}
