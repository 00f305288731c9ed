//! Crew functions and utilities.
//!
//! This is the sole authority for moving a user into, out of, or between
//! crews. Every mutation here keeps `user.team_id` and `team.capacity`
//! consistent, and callers are expected to run each top-level operation
//! inside a single transaction so a failure never commits a half-finished
//! move.

use chrono::Utc;

use crewmatch_model::{
    Team, TeamStatus,
    team::{FORMATION_PRICE, MAX_CAPACITY, SAMPLE_SIZE},
};

use rand::seq::IndexedRandom;

use sqlx::{FromRow, SqliteConnection};

use crate::{
    app::{AppError, error::AppErrorKind},
    user::UserSchema,
};

/// A row in the database representing a crew.
#[derive(Clone, Debug, FromRow)]
pub struct TeamSchema {
    pub id: i64,
    pub capacity: i64,
}

/// Gets a crew by its id.
pub async fn get_team(
    team_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<TeamSchema>, AppError> {
    sqlx::query_as::<_, TeamSchema>(
        r#"
        SELECT id, capacity
        FROM team
        WHERE id = $1
        "#,
    )
    .bind(team_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::from)
}

/// Lists every crew, members included.
pub async fn list_teams(conn: &mut SqliteConnection) -> Result<Vec<Team>, AppError> {
    let schemas = sqlx::query_as::<_, TeamSchema>(
        r#"
        SELECT id, capacity
        FROM team
        ORDER BY id ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut teams = Vec::with_capacity(schemas.len());

    for schema in &schemas {
        teams.push(to_team(schema, &mut *conn).await?);
    }

    Ok(teams)
}

/// Builds the full [`Team`] model from a schema row.
pub async fn to_team(
    schema: &TeamSchema,
    conn: &mut SqliteConnection,
) -> Result<Team, AppError> {
    let members = sqlx::query_as::<_, (i64,)>(
        r#"
        SELECT id
        FROM user
        WHERE team_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(schema.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Team {
        id: schema.id,
        capacity: schema.capacity,
        members: members.into_iter().map(|(id,)| id).collect(),
        status: TeamStatus::from_capacity(schema.capacity),
    })
}

/// Assigns a user to a crew.
///
/// If `team_id` is absent, or names a crew that no longer exists, the user
/// founds a new crew instead (see [`create_team`]). If the user already
/// belongs to a different crew, they are removed from it first, so a user is
/// never counted in two crews at once.
///
/// Assigning a user to a crew they are already in succeeds without touching
/// any record, except when that crew is full: a full crew rejects every
/// join, its own members included.
pub async fn assign_user_to_team(
    user_id: i64,
    team_id: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<Team, AppError> {
    let user = crate::user::get_user(user_id, &mut *conn)
        .await?
        .ok_or(AppErrorKind::UserNotFound)?;

    let target = match team_id {
        Some(team_id) => get_team(team_id, &mut *conn).await?,
        None => None,
    };

    let Some(team) = target else {
        // no crew given, or the requested crew no longer exists
        return create_team(&user, conn).await;
    };

    // a full crew rejects the join outright, its own members included
    if team.capacity >= MAX_CAPACITY {
        return Err(AppErrorKind::TeamFull.into());
    }

    if user.team_id == Some(team.id) {
        // already a member, nothing to do
        return to_team(&team, conn).await;
    }

    // fully leave the old crew before joining the new one
    if let Some(old_team_id) = user.team_id {
        remove_member(user.id, old_team_id, &mut *conn).await?;
    }

    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE user
        SET team_id = $2, updated_at = $3
        WHERE id = $1
        "#,
    )
    .bind(user.id)
    .bind(team.id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        UPDATE team
        SET capacity = capacity + 1, updated_at = $2
        WHERE id = $1
        "#,
    )
    .bind(team.id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let team = get_team(team.id, &mut *conn)
        .await?
        .ok_or(AppErrorKind::TeamNotFound)?;

    to_team(&team, conn).await
}

/// Founds a new crew with the user as its only member.
///
/// Charges the user [`FORMATION_PRICE`] coins; fails with
/// [`AppErrorKind::InsufficientFunds`] before anything is written if they
/// cannot afford it. This is the only path by which a crew record comes into
/// existence.
pub async fn create_team(
    user: &UserSchema,
    conn: &mut SqliteConnection,
) -> Result<Team, AppError> {
    if user.coins < FORMATION_PRICE {
        return Err(AppErrorKind::InsufficientFunds.into());
    }

    // founding while already in a crew is a transfer; leave first
    if let Some(old_team_id) = user.team_id {
        remove_member(user.id, old_team_id, &mut *conn).await?;
    }

    let now = Utc::now();

    let (team_id,) = sqlx::query_as::<_, (i64,)>(
        r#"
        INSERT INTO team (capacity, inserted_at, updated_at)
        VALUES (1, $1, $1)
        RETURNING id
        "#,
    )
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        UPDATE user
        SET coins = coins - $2, team_id = $3, updated_at = $4
        WHERE id = $1
        "#,
    )
    .bind(user.id)
    .bind(FORMATION_PRICE)
    .bind(team_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(Team {
        id: team_id,
        capacity: 1,
        members: vec![user.id],
        status: TeamStatus::Forming,
    })
}

/// Removes a user from a crew.
///
/// With an explicit `team_id`, the user must currently belong to that crew.
/// Without one, the crew is resolved from the user's own membership field.
pub async fn leave_team(
    user_id: i64,
    team_id: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<(), AppError> {
    let user = crate::user::get_user(user_id, &mut *conn)
        .await?
        .ok_or(AppErrorKind::UserNotFound)?;

    let team_id = match team_id {
        Some(team_id) => {
            let team = get_team(team_id, &mut *conn)
                .await?
                .ok_or(AppErrorKind::TeamNotFound)?;

            if user.team_id != Some(team.id) {
                return Err(AppErrorKind::NotAMember.into());
            }

            team.id
        }
        None => user.team_id.ok_or(AppErrorKind::NotInAnyTeam)?,
    };

    remove_member(user.id, team_id, conn).await
}

/// Removes a member from a crew, deleting the crew if it empties.
///
/// Assumes the caller has already checked the user belongs to the crew.
async fn remove_member(
    user_id: i64,
    team_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), AppError> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE user
        SET team_id = NULL, updated_at = $2
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let (capacity,) = sqlx::query_as::<_, (i64,)>(
        r#"
        UPDATE team
        SET capacity = capacity - 1, updated_at = $2
        WHERE id = $1
        RETURNING capacity
        "#,
    )
    .bind(team_id)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    // crews never persist with zero members
    if capacity <= 0 {
        sqlx::query(
            r#"
            DELETE FROM team
            WHERE id = $1
            "#,
        )
        .bind(team_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Returns a browse sample of joinable crews.
///
/// Filters out full crews, then picks at most [`SAMPLE_SIZE`] of the rest
/// uniformly without replacement. Read-only.
pub async fn sample_teams(conn: &mut SqliteConnection) -> Result<Vec<Team>, AppError> {
    let candidates = sqlx::query_as::<_, TeamSchema>(
        r#"
        SELECT id, capacity
        FROM team
        WHERE capacity < $1
        ORDER BY id ASC
        "#,
    )
    .bind(MAX_CAPACITY)
    .fetch_all(&mut *conn)
    .await?;

    let picked = if candidates.len() <= SAMPLE_SIZE {
        candidates
    } else {
        let mut rng = rand::rng();

        candidates
            .choose_multiple(&mut rng, SAMPLE_SIZE)
            .cloned()
            .collect()
    };

    let mut teams = Vec::with_capacity(picked.len());

    for schema in &picked {
        teams.push(to_team(schema, &mut *conn).await?);
    }

    Ok(teams)
}
