// Serie A Standings Dashboard - Web Server
// JSON API over the read-only standings store + embedded single-page UI

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use seriea_dashboard::{
    points_snapshot, position_chart, standings_table, PointsSnapshot, PositionChart, QueryError,
    StandingsStore, TableRow,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Shared application state.
/// The store is immutable after startup, so handlers share it lock-free.
#[derive(Clone)]
struct AppState {
    store: Arc<StandingsStore>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn err(data: T, message: String) -> Self {
        Self {
            success: false,
            data,
            error: Some(message),
        }
    }
}

/// Season metadata for the selector widgets
#[derive(Serialize)]
struct SeasonSummary {
    season: String,
    last_matchday: u32,
    teams: Vec<String>,
}

/// Table + points chart for one (season, matchday)
#[derive(Serialize)]
struct StandingsResponse {
    season: String,
    matchday: u32,
    table: Vec<TableRow>,
    points: PointsSnapshot,
}

#[derive(Deserialize)]
struct PositionsParams {
    /// Comma-separated team names; absent = all teams, empty = none
    teams: Option<String>,
}

/// Map a query error onto the HTTP surface.
/// Unknown season/team is 404, a bad matchday is 400; both carry a
/// user-visible message in the envelope and never kill the process.
fn error_status(err: &QueryError) -> StatusCode {
    match err {
        QueryError::SeasonNotFound(_) | QueryError::TeamNotFound(_) => StatusCode::NOT_FOUND,
        QueryError::MatchdayOutOfRange { .. } => StatusCode::BAD_REQUEST,
        QueryError::EmptySelection => StatusCode::OK,
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/seasons - All seasons with length and roster
async fn get_seasons(State(state): State<AppState>) -> impl IntoResponse {
    let summaries: Vec<SeasonSummary> = state
        .store
        .seasons()
        .into_iter()
        .filter_map(|season| {
            state.store.season(season).map(|data| SeasonSummary {
                season: season.to_string(),
                last_matchday: data.last_matchday(),
                teams: data.teams().into_iter().map(String::from).collect(),
            })
        })
        .collect();

    Json(ApiResponse::ok(summaries))
}

/// GET /api/standings/:season/:matchday - League table at one matchday
async fn get_standings(
    State(state): State<AppState>,
    Path((season, matchday)): Path<(String, u32)>,
) -> impl IntoResponse {
    match state.store.standings(&season, matchday) {
        Ok(records) => {
            let response = StandingsResponse {
                season,
                matchday,
                table: standings_table(&records),
                points: points_snapshot(&records),
            };
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => {
            eprintln!("Error getting standings for {} matchday {}: {}", season, matchday, e);
            let empty = StandingsResponse {
                season,
                matchday,
                table: Vec::new(),
                points: points_snapshot(&[]),
            };
            (
                error_status(&e),
                Json(ApiResponse::err(empty, e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/history/:season/:team - One team's season
async fn get_team_history(
    State(state): State<AppState>,
    Path((season, team)): Path<(String, String)>,
) -> impl IntoResponse {
    // Decode URL-encoded team name (e.g. "Hellas%20Verona")
    let decoded_team = urlencoding::decode(&team)
        .unwrap_or_else(|_| team.clone().into())
        .into_owned();

    match state.store.team_history(&season, &decoded_team) {
        Ok(history) => {
            let chart = position_chart(std::slice::from_ref(&history));
            (StatusCode::OK, Json(ApiResponse::ok(chart))).into_response()
        }
        Err(e) => {
            eprintln!("Error getting history for {} in {}: {}", decoded_team, season, e);
            (
                error_status(&e),
                Json(ApiResponse::err(empty_chart(), e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/positions/:season?teams=a,b - Position-over-time chart
async fn get_positions(
    State(state): State<AppState>,
    Path(season): Path<String>,
    Query(params): Query<PositionsParams>,
) -> impl IntoResponse {
    // No teams param = chart every team; teams= (empty) = show nothing
    let teams: Vec<String> = match &params.teams {
        None => match state.store.season(&season) {
            Some(data) => data.teams().into_iter().map(String::from).collect(),
            None => {
                let e = QueryError::SeasonNotFound(season);
                return (
                    error_status(&e),
                    Json(ApiResponse::err(empty_chart(), e.to_string())),
                )
                    .into_response();
            }
        },
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
    };

    match state.store.team_histories(&season, &teams) {
        Ok(histories) => {
            let chart = position_chart(&histories);
            (StatusCode::OK, Json(ApiResponse::ok(chart))).into_response()
        }
        // An empty multi-select means "show nothing", not a failure
        Err(QueryError::EmptySelection) => {
            (StatusCode::OK, Json(ApiResponse::ok(empty_chart()))).into_response()
        }
        Err(e) => {
            eprintln!("Error building position chart for {}: {}", season, e);
            (
                error_status(&e),
                Json(ApiResponse::err(empty_chart(), e.to_string())),
            )
                .into_response()
        }
    }
}

fn empty_chart() -> PositionChart {
    position_chart(&[])
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("⚽ Serie A Standings Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "standings.db".to_string());
    let db_path = std::path::Path::new(&db_path);

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: cargo run -- import <standings.csv> {:?}", db_path);
        eprintln!("   to import standings first.");
        std::process::exit(1);
    }

    // Load everything into memory once; serving never touches SQLite again
    let store = match StandingsStore::open(db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Failed to load standings: {:#}", e);
            std::process::exit(1);
        }
    };
    println!("✓ Loaded {} standings rows from {:?}", store.record_count(), db_path);
    println!("✓ Seasons: {}", store.seasons().join(", "));

    let state = AppState {
        store: Arc::new(store),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/seasons", get(get_seasons))
        .route("/standings/:season/:matchday", get(get_standings))
        .route("/history/:season/:team", get(get_team_history))
        .route("/positions/:season", get(get_positions))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/seasons");
    println!("   UI:  http://localhost:3000");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
