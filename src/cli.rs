//! Crewmatch server command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crewmatch_model::request::user::CreateUserRequest;

use garde::Validate;

use anyhow::Error;
use sqlx::SqliteConnection;

/// The command line arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file path.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// The command to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Operational commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "create-user")]
    CreateUser(CreateUser),
}

/// Creates a user without going through the API.
#[derive(clap::Args, Debug)]
pub struct CreateUser {
    /// The display name of the new user.
    pub name: String,
}

/// Creates a user, printing their assigned id.
///
/// The name is held to the same rules the API enforces.
pub async fn create_user(
    command: &CreateUser,
    starter_coins: i64,
    conn: &mut SqliteConnection,
) -> Result<(), Error> {
    let request = CreateUserRequest {
        name: command.name.clone(),
    };
    request.validate()?;

    let user = crate::user::insert_user(&request.name, starter_coins, conn).await?;

    // export id
    println!("{}", user.id);

    Ok(())
}
