//! Route handlers.
//!
//! Most routes pass PostgREST rows straight through as JSON; only the
//! voting-allies route does any work of its own.

use super::{AppError, AppState};
use crate::alignment::calculate_allies;
use crate::store::postgrest::{OFFICIALS_VIEW, VOTES_TABLE};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

const PEOPLE_TABLE: &str = "people";
const COMMITTEES_TABLE: &str = "committees";
const OFFICIAL_COMMITTEES_TABLE: &str = "official_committees";
const PERSON_METRICS_TABLE: &str = "person_metrics";

/// Number of officials dropped from an allies ranking because their votes
/// could not be read.
pub const SKIPPED_HEADER: &str = "x-skipped-officials";

const RECENT_VOTES_LIMIT: usize = 10;

type Rows = Json<Vec<Value>>;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "InfluencePower API is running",
    }))
}

pub async fn list_officials(State(state): State<AppState>) -> Result<Rows, AppError> {
    let rows = state.db.from(OFFICIALS_VIEW).select("*").execute().await?;
    Ok(Json(rows))
}

pub async fn get_official(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let rows = state
        .db
        .from(OFFICIALS_VIEW)
        .select("*")
        .eq("person_id", id)
        .execute()
        .await?;
    first_row(rows, "Official not found").map(Json)
}

pub async fn create_official(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let row = object_payload(payload)?;
    let created = state.db.insert(PEOPLE_TABLE, &row).await?;
    Ok((StatusCode::CREATED, Json(first_or(created, row))))
}

pub async fn update_official(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let row = object_payload(payload)?;
    let updated = state
        .db
        .update(PEOPLE_TABLE, "id", &id.to_string(), &row)
        .await?;
    Ok(Json(first_or(updated, row)))
}

pub async fn delete_official(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .db
        .delete(PEOPLE_TABLE, "id", &id.to_string())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn officials_by_party(
    State(state): State<AppState>,
    Path(party): Path<String>,
) -> Result<Rows, AppError> {
    let rows = state
        .db
        .from(OFFICIALS_VIEW)
        .select("*")
        .eq("party_affiliation", party)
        .execute()
        .await?;
    Ok(Json(rows))
}

pub async fn officials_by_ward(
    State(state): State<AppState>,
    Path(ward): Path<String>,
) -> Result<Rows, AppError> {
    let ward = parse_ward(&ward)?;
    let rows = state
        .db
        .from(OFFICIALS_VIEW)
        .select("*")
        .eq("district_number", ward)
        .execute()
        .await?;
    Ok(Json(rows))
}

pub async fn voting_records(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Rows, AppError> {
    let rows = state
        .db
        .from(VOTES_TABLE)
        .select("*")
        .eq("person_id", id)
        .order("vote_date", true)
        .execute()
        .await?;
    Ok(Json(rows))
}

pub async fn create_voting_record(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let row = object_payload(payload)?;
    let created = state.db.insert(VOTES_TABLE, &row).await?;
    Ok((StatusCode::CREATED, Json(first_or(created, row))))
}

pub async fn ward_statistics(
    State(state): State<AppState>,
    Path(ward): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ward = parse_ward(&ward)?;
    let rows = state
        .db
        .from(OFFICIALS_VIEW)
        .select("*")
        .eq("district_number", ward)
        .execute()
        .await?;
    first_row(rows, "Ward statistics not found").map(Json)
}

pub async fn list_committees(State(state): State<AppState>) -> Result<Rows, AppError> {
    let rows = state.db.from(COMMITTEES_TABLE).select("*").execute().await?;
    Ok(Json(rows))
}

pub async fn official_committees(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Rows, AppError> {
    let rows = state
        .db
        .from(OFFICIAL_COMMITTEES_TABLE)
        .select("*, committees(*)")
        .eq("official_id", id)
        .execute()
        .await?;
    Ok(Json(rows))
}

pub async fn official_metrics(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let rows = state
        .db
        .from(PERSON_METRICS_TABLE)
        .select("*")
        .eq("person_id", id)
        .execute()
        .await?;
    first_row(rows, "Metrics not found").map(Json)
}

pub async fn ward_metrics(
    State(state): State<AppState>,
    Path(ward): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ward = parse_ward(&ward)?;
    let rows = state
        .db
        .from(OFFICIALS_VIEW)
        .select("*, person_metrics(*)")
        .eq("district_number", ward)
        .execute()
        .await?;
    first_row(rows, "Ward metrics not found").map(Json)
}

pub async fn voting_allies(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ranking = calculate_allies(
        id,
        state.votes.as_ref(),
        state.officials.as_ref(),
        &state.alignment,
    )
    .await?;

    let headers = [(SKIPPED_HEADER, ranking.skipped.to_string())];
    Ok((headers, Json(ranking.allies)))
}

pub async fn recent_votes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Rows, AppError> {
    let rows = state
        .db
        .from(VOTES_TABLE)
        .select("*, matters(matter_name, matter_type)")
        .eq("person_id", id)
        .order("created_at", false)
        .limit(RECENT_VOTES_LIMIT)
        .execute()
        .await?;
    Ok(Json(rows))
}

/// Wards are council district numbers.
pub fn parse_ward(raw: &str) -> Result<i32, AppError> {
    raw.trim().parse().map_err(|_| AppError::InvalidWard)
}

/// Unwrap a JSON body, which must be an object to become a table row.
fn object_payload(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    let Json(value) = payload.map_err(|e| AppError::MalformedPayload(e.body_text()))?;
    if !value.is_object() {
        return Err(AppError::MalformedPayload(
            "expected a JSON object".to_string(),
        ));
    }
    Ok(value)
}

fn first_row(rows: Vec<Value>, missing: &'static str) -> Result<Value, AppError> {
    rows.into_iter().next().ok_or(AppError::NotFound(missing))
}

/// PostgREST echoes written rows back; fall back to the request body when
/// it returns none.
fn first_or(rows: Vec<Value>, fallback: Value) -> Value {
    match rows.into_iter().next() {
        Some(row) => row,
        None => {
            debug!("No representation returned, echoing request body");
            fallback
        }
    }
}
