//! Single binary web server: REST API over the tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, REQUIRED_VALIDATIONS, EVENT_BUS_CAPACITY.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_tournament_web::{
    EngineError, ErrorKind, Event, EventBus, EventId, MatchId, MemoryStore, RegistrationBook,
    RegistrationId, ServerConfig, TournamentEngine,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

struct AppState {
    engine: TournamentEngine,
    registrations: Arc<RegistrationBook>,
}

type State = Data<AppState>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateEventBody {
    name: String,
    #[serde(default = "default_format")]
    format: String,
    #[serde(default = "default_max_teams")]
    max_teams: usize,
}

fn default_format() -> String {
    "1v1".to_string()
}

fn default_max_teams() -> usize {
    16
}

#[derive(Deserialize)]
struct RegisterBody {
    team_name: String,
    roster: Vec<String>,
}

#[derive(Deserialize)]
struct AcceptBody {
    accepted_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ScoreBody {
    score_a: i64,
    score_b: i64,
}

#[derive(Deserialize)]
struct ValidateBody {
    validator_id: String,
}

/// Path segment: event id (e.g. /api/events/{id})
#[derive(Deserialize)]
struct EventPath {
    id: EventId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct RegistrationPath {
    id: RegistrationId,
}

fn error_response(e: &EngineError) -> HttpResponse {
    let kind = e.kind();
    let mut builder = match kind {
        ErrorKind::Validation => HttpResponse::BadRequest(),
        ErrorKind::State | ErrorKind::Conflict => HttpResponse::Conflict(),
        ErrorKind::NotFound => HttpResponse::NotFound(),
        ErrorKind::InsufficientTeams => HttpResponse::UnprocessableEntity(),
        ErrorKind::Internal => HttpResponse::InternalServerError(),
    };
    builder.json(serde_json::json!({ "kind": kind, "error": e.to_string() }))
}

fn respond<T: Serialize>(result: bracket_tournament_web::Result<T>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-tournament-web",
    })
}

#[post("/api/events")]
async fn api_create_event(state: State, body: Json<CreateEventBody>) -> HttpResponse {
    respond(
        state
            .engine
            .create_event(&body.name, &body.format, body.max_teams),
    )
}

#[get("/api/events")]
async fn api_list_events(state: State) -> HttpResponse {
    respond(state.engine.list_events())
}

#[get("/api/events/{id}")]
async fn api_get_event(state: State, path: Path<EventPath>) -> HttpResponse {
    respond(state.engine.get_event(path.id))
}

#[post("/api/events/{id}/open")]
async fn api_open_registration(state: State, path: Path<EventPath>) -> HttpResponse {
    respond(state.engine.open_registration(path.id))
}

#[post("/api/events/{id}/close")]
async fn api_close_registration(state: State, path: Path<EventPath>) -> HttpResponse {
    respond(state.engine.close_registration(path.id))
}

#[post("/api/events/{id}/cancel")]
async fn api_cancel_event(state: State, path: Path<EventPath>) -> HttpResponse {
    respond(state.engine.cancel_event(path.id))
}

/// Register a team (event must be open, roster size must match the format).
#[post("/api/events/{id}/registrations")]
async fn api_register_team(
    state: State,
    path: Path<EventPath>,
    body: Json<RegisterBody>,
) -> HttpResponse {
    let body = body.into_inner();
    respond(state.engine.get_event(path.id).and_then(|event| {
        state
            .registrations
            .register(&event, &body.team_name, body.roster)
    }))
}

/// Bulk import registrations from a CSV body (header: team_name,players,accepted_at).
#[post("/api/events/{id}/registrations/import")]
async fn api_import_registrations(state: State, path: Path<EventPath>, body: String) -> HttpResponse {
    respond(
        state
            .engine
            .get_event(path.id)
            .and_then(|event| state.registrations.import_csv(&event, body.as_bytes())),
    )
}

/// Owning event of a registration, for review.
fn registration_event(state: &State, id: RegistrationId) -> bracket_tournament_web::Result<Event> {
    let reg = state.registrations.get(id)?;
    state.engine.get_event(reg.event_id)
}

#[post("/api/registrations/{id}/accept")]
async fn api_accept_registration(
    state: State,
    path: Path<RegistrationPath>,
    body: Option<Json<AcceptBody>>,
) -> HttpResponse {
    let at = body
        .and_then(|b| b.accepted_at)
        .unwrap_or_else(Utc::now);
    respond(
        registration_event(&state, path.id)
            .and_then(|event| state.registrations.accept(&event, path.id, at)),
    )
}

#[post("/api/registrations/{id}/reject")]
async fn api_reject_registration(state: State, path: Path<RegistrationPath>) -> HttpResponse {
    respond(
        registration_event(&state, path.id)
            .and_then(|event| state.registrations.reject(&event, path.id)),
    )
}

#[post("/api/events/{id}/bracket")]
async fn api_generate_bracket(state: State, path: Path<EventPath>) -> HttpResponse {
    respond(state.engine.generate_bracket(path.id))
}

#[get("/api/events/{id}/bracket")]
async fn api_get_bracket(state: State, path: Path<EventPath>) -> HttpResponse {
    respond(state.engine.get_bracket(path.id))
}

#[get("/api/matches/{id}")]
async fn api_get_match(state: State, path: Path<MatchPath>) -> HttpResponse {
    respond(state.engine.get_match(path.id))
}

#[post("/api/matches/{id}/start")]
async fn api_start_match(state: State, path: Path<MatchPath>) -> HttpResponse {
    respond(state.engine.start_match(path.id))
}

#[put("/api/matches/{id}/score")]
async fn api_submit_score(state: State, path: Path<MatchPath>, body: Json<ScoreBody>) -> HttpResponse {
    respond(state.engine.submit_score(path.id, body.score_a, body.score_b))
}

#[post("/api/matches/{id}/submit")]
async fn api_submit_result(state: State, path: Path<MatchPath>) -> HttpResponse {
    respond(state.engine.submit_result(path.id))
}

#[post("/api/matches/{id}/validate")]
async fn api_validate_result(
    state: State,
    path: Path<MatchPath>,
    body: Json<ValidateBody>,
) -> HttpResponse {
    respond(state.engine.validate_result(path.id, &body.validator_id))
}

#[post("/api/matches/{id}/cancel")]
async fn api_cancel_match(state: State, path: Path<MatchPath>) -> HttpResponse {
    respond(state.engine.cancel_match(path.id))
}

/// Retry the advancement of a finished match (no-op if already applied).
#[post("/api/matches/{id}/advance")]
async fn api_retry_advancement(state: State, path: Path<MatchPath>) -> HttpResponse {
    respond(state.engine.retry_advancement(path.id))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!(
        "Starting server at http://{}:{} (required validations: {})",
        config.host,
        config.port,
        config.engine.required_validations
    );

    let bus = EventBus::new(config.event_bus_capacity);
    let registrations = Arc::new(RegistrationBook::new());
    let engine = TournamentEngine::new(
        Arc::new(MemoryStore::new()),
        registrations.clone(),
        Arc::new(bus.clone()),
        config.engine,
    );
    let state = Data::new(AppState {
        engine,
        registrations,
    });

    // Default broadcast consumer: log every lifecycle event.
    let mut rx = bus.subscribe();
    actix_web::rt::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => log::info!("lifecycle {} {}", event.tag(), event.entity_id()),
                Err(RecvError::Lagged(n)) => log::warn!("Lifecycle logger lagged, {n} event(s) skipped"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_event)
            .service(api_list_events)
            .service(api_get_event)
            .service(api_open_registration)
            .service(api_close_registration)
            .service(api_cancel_event)
            .service(api_register_team)
            .service(api_import_registrations)
            .service(api_accept_registration)
            .service(api_reject_registration)
            .service(api_generate_bracket)
            .service(api_get_bracket)
            .service(api_get_match)
            .service(api_start_match)
            .service(api_submit_score)
            .service(api_submit_result)
            .service(api_validate_result)
            .service(api_cancel_match)
            .service(api_retry_advancement)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
