//! User endpoints.

use axum::extract::{Path, State};

use crewmatch_model::{Team, User, request::user::CreateUserRequest};

use garde::Validate;

use http::StatusCode;

use tracing::instrument;

use crate::app::{AppError, AppJson, AppState, Payload, error::AppErrorKind};

/// Lists every user.
pub async fn list(State(state): State<AppState>) -> Result<AppJson<Vec<User>>, AppError> {
    let mut conn = state.db.acquire().await?;

    let users = crate::user::list_users(&mut conn).await?;

    Ok(AppJson(users.into_iter().map(User::from).collect()))
}

/// Creates a new user.
///
/// New users start at level 1 with the configured starter coins, and belong
/// to no crew.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    Payload(request): Payload<CreateUserRequest>,
) -> Result<(StatusCode, AppJson<User>), AppError> {
    request.validate().map_err(AppErrorKind::Garde)?;

    let mut tx = state.db.begin().await?;

    let user =
        crate::user::insert_user(&request.name, state.config.game.starter_coins, &mut tx).await?;

    tx.commit().await?;

    tracing::info!(user_id = user.id, "created user");

    Ok((StatusCode::CREATED, AppJson(user.into())))
}

/// Assigns a user to a new crew of their own.
#[instrument(skip(state))]
pub async fn assign(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<AppJson<Team>, AppError> {
    assign_inner(state, user_id, None).await
}

/// Assigns a user to the given crew.
#[instrument(skip(state))]
pub async fn assign_to(
    State(state): State<AppState>,
    Path((user_id, team_id)): Path<(i64, i64)>,
) -> Result<AppJson<Team>, AppError> {
    assign_inner(state, user_id, Some(team_id)).await
}

async fn assign_inner(
    state: AppState,
    user_id: i64,
    team_id: Option<i64>,
) -> Result<AppJson<Team>, AppError> {
    let mut tx = state.db.begin().await?;

    let team = crate::team::assign_user_to_team(user_id, team_id, &mut tx).await?;

    tx.commit().await?;

    Ok(AppJson(team))
}

/// Removes a user from their current crew.
#[instrument(skip(state))]
pub async fn leave(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    leave_inner(state, user_id, None).await
}

/// Removes a user from the given crew.
#[instrument(skip(state))]
pub async fn leave_from(
    State(state): State<AppState>,
    Path((user_id, team_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    leave_inner(state, user_id, Some(team_id)).await
}

async fn leave_inner(
    state: AppState,
    user_id: i64,
    team_id: Option<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;

    crate::team::leave_team(user_id, team_id, &mut tx).await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Advances a user one level.
#[instrument(skip(state))]
pub async fn level_up(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<AppJson<User>, AppError> {
    let mut tx = state.db.begin().await?;

    let user = crate::user::level_up(user_id, &mut tx).await?;

    tx.commit().await?;

    Ok(AppJson(user.into()))
}
