use actix_web::{web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ads_service::clients::{HttpCustomerClient, HttpPrimeClubClient};
use ads_service::db::{PgContentStore, PgTargetingGroupStore};
use ads_service::handlers;
use ads_service::services::AdSelectionService;
use ads_service::targeting::PredicateDeps;
use ads_service::Config;

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "alive" }))
}

async fn readiness_check(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "ready": true })),
        Err(e) => {
            error!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable()
                .json(serde_json::json!({ "ready": false, "error": e.to_string() }))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env().expect("Failed to load config");

    info!(
        "Starting {} on HTTP:{}",
        config.service.service_name, config.service.http_port
    );

    // Initialize database pool and schema
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    // Initialize collaborator clients
    let request_timeout = Duration::from_millis(config.clients.request_timeout_ms);
    let customer_client = HttpCustomerClient::new(
        config.clients.customer_service_url.clone(),
        request_timeout,
    )
    .expect("Failed to build customer client");
    let prime_client = HttpPrimeClubClient::new(
        config.clients.prime_club_service_url.clone(),
        request_timeout,
    )
    .expect("Failed to build prime club client");

    let deps = PredicateDeps {
        customer: Arc::new(customer_client),
        prime: Arc::new(prime_client),
    };

    // Selection logic over the Postgres-backed stores
    let selection = web::Data::new(AdSelectionService::new(
        Arc::new(PgContentStore::new(pool.clone())),
        Arc::new(PgTargetingGroupStore::new(pool.clone())),
        deps,
        &config.evaluation,
    ));

    let pool_data = web::Data::new(pool);
    let http_port = config.service.http_port;

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(pool_data.clone())
            .app_data(selection.clone())
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .route("/api/v1/health/ready", web::get().to(readiness_check))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/advertisements")
                            .route("", web::get().to(handlers::generate_advertisement)),
                    )
                    .service(
                        web::scope("/content")
                            .service(
                                web::resource("")
                                    .route(web::post().to(handlers::create_content)),
                            )
                            .service(
                                web::resource("/{content_id}")
                                    .route(web::put().to(handlers::update_content))
                                    .route(web::delete().to(handlers::delete_content)),
                            )
                            .route(
                                "/{content_id}/targeting-groups",
                                web::post().to(handlers::add_targeting_group),
                            ),
                    )
                    .service(
                        web::resource("/targeting-groups/{targeting_group_id}/click-through-rate")
                            .route(web::put().to(handlers::update_click_through_rate)),
                    ),
            )
    })
    .bind(("0.0.0.0", http_port))?
    .run()
    .await?;

    Ok(())
}
