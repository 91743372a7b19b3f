#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for grid cell statistics.
//!
//! Answers "what are the demographic, economic, and housing statistics
//! for a square cell on the map?" by geocoding, intersecting the cell
//! with Census block groups, fetching ACS tables, and redistributing
//! counts onto the cell by density × covered area. Collaborator clients
//! are constructed once at startup and injected into the pipeline —
//! there is no process-wide client state.

mod handlers;

pub mod export;
pub mod pipeline;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};

use crate::pipeline::Collaborators;

/// Starts the gridstats API server.
///
/// Builds the collaborator clients from the environment and serves the
/// REST API. This is a regular async function — the caller provides the
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the HTTP client cannot be constructed.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let http = gridstats_geography::tigerweb::build_tigerweb_client()
        .expect("Failed to build HTTP client");
    let collaborators = web::Data::new(Collaborators::from_env(http));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(collaborators.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/version", web::get().to(handlers::version))
                    .route("/cell_stats", web::post().to(handlers::cell_stats))
                    .route("/cell_stats.csv", web::post().to(handlers::cell_stats_csv)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
