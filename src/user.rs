//! User structs and utilities.

use chrono::Utc;

use crewmatch_model::{
    User,
    user::{LEVEL_UP_REWARD, STARTER_LEVEL},
};

use sqlx::{FromRow, SqliteConnection};

use crate::app::{AppError, error::AppErrorKind};

/// A row in the database representing a user.
#[derive(Clone, Debug, FromRow)]
pub struct UserSchema {
    pub id: i64,
    pub name: String,
    pub coins: i64,
    pub level: i64,
    pub team_id: Option<i64>,
}

impl From<UserSchema> for User {
    fn from(value: UserSchema) -> Self {
        User {
            id: value.id,
            name: value.name,
            coins: value.coins,
            level: value.level,
            team_id: value.team_id,
        }
    }
}

/// Gets a user by their id.
pub async fn get_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<UserSchema>, AppError> {
    sqlx::query_as::<_, UserSchema>(
        r#"
        SELECT id, name, coins, level, team_id
        FROM user
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::from)
}

/// Lists every user.
pub async fn list_users(conn: &mut SqliteConnection) -> Result<Vec<UserSchema>, AppError> {
    sqlx::query_as::<_, UserSchema>(
        r#"
        SELECT id, name, coins, level, team_id
        FROM user
        ORDER BY id ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(AppError::from)
}

/// Inserts a new user with no crew.
///
/// The id is assigned by the database.
pub async fn insert_user(
    name: &str,
    starter_coins: i64,
    conn: &mut SqliteConnection,
) -> Result<UserSchema, AppError> {
    let now = Utc::now();

    sqlx::query_as::<_, UserSchema>(
        r#"
        INSERT INTO user (name, coins, level, inserted_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        RETURNING id, name, coins, level, team_id
        "#,
    )
    .bind(name)
    .bind(starter_coins)
    .bind(STARTER_LEVEL)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(AppError::from)
}

/// Advances a user one level, awarding [`LEVEL_UP_REWARD`] coins.
///
/// Crew state is untouched.
pub async fn level_up(user_id: i64, conn: &mut SqliteConnection) -> Result<UserSchema, AppError> {
    let now = Utc::now();

    let user = sqlx::query_as::<_, UserSchema>(
        r#"
        UPDATE user
        SET level = level + 1, coins = coins + $2, updated_at = $3
        WHERE id = $1
        RETURNING id, name, coins, level, team_id
        "#,
    )
    .bind(user_id)
    .bind(LEVEL_UP_REWARD)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    user.ok_or_else(|| AppErrorKind::UserNotFound.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

    async fn setup() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory database");

        sqlx::migrate!().run(&pool).await.expect("migrations");

        pool
    }

    #[tokio::test]
    async fn test_insert_user_defaults() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();

        let user = insert_user("fresh", 5000, &mut conn).await.unwrap();

        assert_eq!(user.coins, 5000);
        assert_eq!(user.level, 1);
        assert_eq!(user.team_id, None);
    }

    #[tokio::test]
    async fn test_level_up_awards_coins() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();

        let user = insert_user("climber", 100, &mut conn).await.unwrap();

        let user = level_up(user.id, &mut conn).await.unwrap();
        assert_eq!(user.level, 2);
        assert_eq!(user.coins, 100 + LEVEL_UP_REWARD);

        let user = level_up(user.id, &mut conn).await.unwrap();
        assert_eq!(user.level, 3);
        assert_eq!(user.coins, 100 + LEVEL_UP_REWARD * 2);
    }

    #[tokio::test]
    async fn test_level_up_leaves_crew_alone() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();

        let user = insert_user("crewmate", 5000, &mut conn).await.unwrap();
        let team = crate::team::assign_user_to_team(user.id, None, &mut conn)
            .await
            .unwrap();

        let user = level_up(user.id, &mut conn).await.unwrap();
        assert_eq!(user.team_id, Some(team.id));

        let team = crate::team::get_team(team.id, &mut conn)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(team.capacity, 1);
    }

    #[tokio::test]
    async fn test_level_up_unknown_user() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();

        let err = level_up(42, &mut conn).await.unwrap_err();
        assert!(matches!(err.kind(), AppErrorKind::UserNotFound));
    }
}
