//! Crew endpoints.

use axum::extract::{Path, State};

use crewmatch_model::Team;

use tracing::instrument;

use crate::app::{AppError, AppJson, AppState, error::AppErrorKind};

/// Lists every crew.
pub async fn list(State(state): State<AppState>) -> Result<AppJson<Vec<Team>>, AppError> {
    let mut conn = state.db.acquire().await?;

    let teams = crate::team::list_teams(&mut conn).await?;

    Ok(AppJson(teams))
}

/// Returns the crew with the given id.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<AppJson<Team>, AppError> {
    let mut conn = state.db.acquire().await?;

    let team = crate::team::get_team(team_id, &mut conn)
        .await?
        .ok_or(AppErrorKind::TeamNotFound)?;

    let team = crate::team::to_team(&team, &mut conn).await?;

    Ok(AppJson(team))
}

/// Returns a browse sample of joinable crews.
///
/// At most 20 crews, none of them full, drawn uniformly when more are
/// available.
#[instrument(skip(state))]
pub async fn sample(State(state): State<AppState>) -> Result<AppJson<Vec<Team>>, AppError> {
    let mut conn = state.db.acquire().await?;

    let teams = crate::team::sample_teams(&mut conn).await?;

    Ok(AppJson(teams))
}
