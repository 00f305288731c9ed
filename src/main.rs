use std::{io, net::SocketAddr, path::PathBuf, sync::Arc};

use http::{HeaderValue, Method, header};

use clap::Parser;

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::{Next, from_fn},
    response::Response,
    routing::{get, post},
};

use axum_server::Handle;

use crewmatch::{
    app::{AppState, error::AppErrorKind},
    cli::{Args, Command, create_user},
    config::read_config,
    routes,
};

use anyhow::Error;

use sqlx::{Connection, SqliteConnection, pool::PoolOptions};

use tokio::{main, select, signal};

use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
};

#[main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    fmt::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Args::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => PathBuf::from("config.toml"),
    };

    // Read config file
    let config = Arc::new(read_config(config_path)?);

    let database_url = config
        .server
        .database_url
        .clone()
        .ok_or_else(|| Error::msg("No `DATABASE_URL` set!"))?;

    // Run any pending commands
    if let Some(command) = cli.command.as_ref() {
        match command {
            Command::CreateUser(new_user) => {
                // establish connection
                let mut conn = SqliteConnection::connect(&database_url).await?;
                let mut tx = conn.begin().await?;

                tracing::info!("creating user {}", new_user.name);

                create_user(new_user, config.game.starter_coins, &mut tx).await?;

                tx.commit().await?;
                conn.close().await?;
            }
        }

        return Ok(());
    }

    tracing::info!("establishing connection to database");

    // Connect to sqlite database
    let db = PoolOptions::new().connect(&database_url).await?;

    sqlx::migrate!().run(&db).await?;

    // Create app state
    let state = AppState {
        db: db.clone(),
        config: config.clone(),
    };

    // Build routes
    let api_routes = Router::<AppState>::new()
        .nest(
            "/users",
            Router::<AppState>::new()
                .route("/", get(routes::user::list).post(routes::user::create))
                .route("/{user_id}/assign", post(routes::user::assign))
                .route("/{user_id}/assign/{team_id}", post(routes::user::assign_to))
                .route("/{user_id}/leave", post(routes::user::leave))
                .route("/{user_id}/leave/{team_id}", post(routes::user::leave_from))
                .route("/{user_id}/level-up", post(routes::user::level_up)),
        )
        .nest(
            "/teams",
            Router::<AppState>::new()
                .route("/", get(routes::team::list))
                .route("/{team_id}", get(routes::team::show)),
        )
        .with_state(state.clone());

    // The browse sample is fetched straight from game clients, so it gets
    // permissive CORS.
    let browse_routes = Router::<AppState>::new()
        .route("/teams/sample", get(routes::team::sample))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_origin(Any),
        )
        .with_state(state);

    // Finalize router
    let router = Router::new()
        .merge(api_routes.layer(from_fn(security_headers)))
        .merge(browse_routes)
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    let method = req.method();
                    let uri = req.uri();

                    // axum automatically adds this extension.
                    let matched_path = req
                        .extensions()
                        .get::<MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::debug_span!("request", %method, %uri, matched_path)
                })
                // By default `TraceLayer` will log 5xx responses but we're doing our specific
                // logging of errors so disable that
                .on_failure(()),
        )
        .layer(from_fn(log_app_errors));

    let handle = Handle::new();

    // run shutdown task to detect shutdowns
    tokio::spawn(shutdown_signal(handle.clone()));

    let addr: SocketAddr = ([0, 0, 0, 0], config.http.port).into();

    tracing::info!("listening on {} (http)", addr);

    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    tracing::info!("shutting down");

    db.close().await;

    Ok(())
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut res = next.run(request).await;

    res.headers_mut().extend([
        (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("frame-ancestors 'none'"),
        ),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
    ]);

    res
}

// Stolen from: https://github.com/tokio-rs/axum/blob/main/examples/error-handling/src/main.rs
async fn log_app_errors(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    // If the response contains an AppErrorKind Extension, log it.
    if let Some(err) = response.extensions().get::<Arc<AppErrorKind>>() {
        tracing::error!(?err, "an unexpected error occurred inside a handler");
    }
    response
}

// Stolen from: https://github.com/maxcountryman/tower-sessions-stores/tree/main/sqlx-store
// Lol
async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    select! {
        _ = ctrl_c => { handle.shutdown() }
        _ = terminate => { handle.shutdown() }
    }
}
