use actix_cors::Cors;
use actix_web::{middleware::Compress, App, HttpServer};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use board_api::config::AppConfig;
use board_api::openapi::ApiDoc;
use board_api::repo::{inmem::InMemRepo, BoardPostRepo};
use board_api::{config, AppState, BoardService, SecurityHeaders};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds; deployments set the environment themselves.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    // Structured logging initialisation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cfg = AppConfig::from_env()?;
    info!(create_policy = %cfg.create_policy, "Bootstrapping board API");

    let repo = build_repo(&cfg).await?;
    let boards = Arc::new(BoardService::new(repo, cfg.create_policy.build()));
    let openapi = ApiDoc::openapi();
    let frontend_url = cfg.frontend_url.clone();

    let server = HttpServer::new(move || {
        let mut cors = Cors::default()
            // local dev frontends
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://127.0.0.1:5173")
            .allow_any_header()
            .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .max_age(3600);
        if let Some(front) = frontend_url.as_deref() {
            cors = cors.allowed_origin(front);
        }

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(SecurityHeaders::from_env())
            .wrap(cors)
            .app_data(actix_web::web::Data::new(AppState { boards: boards.clone() }))
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
    })
    .bind((cfg.bind_addr.as_str(), cfg.port))?;

    info!("Listening on http://{}:{}", cfg.bind_addr, cfg.port);

    server.run().await?;
    Ok(())
}

/// Postgres when `DATABASE_URL` is set, otherwise the in-memory store
/// (snapshotted to `BOARD_DATA_DIR` when that is set).
async fn build_repo(cfg: &AppConfig) -> anyhow::Result<Arc<dyn BoardPostRepo>> {
    if let Some(url) = cfg.database_url.as_deref() {
        #[cfg(feature = "postgres-store")]
        return connect_postgres(url, cfg).await;
        #[cfg(not(feature = "postgres-store"))]
        anyhow::bail!("DATABASE_URL is set ({url}) but the binary was built without `postgres-store`");
    }
    let repo = match cfg.data_dir.as_deref() {
        Some(dir) => {
            info!("Using in-memory repository backend (snapshot dir {})", dir.display());
            InMemRepo::with_snapshot_dir(dir)
        }
        None => {
            info!("Using in-memory repository backend (not persisted)");
            InMemRepo::new()
        }
    };
    Ok(Arc::new(repo))
}

#[cfg(feature = "postgres-store")]
async fn connect_postgres(url: &str, cfg: &AppConfig) -> anyhow::Result<Arc<dyn BoardPostRepo>> {
    use anyhow::Context;
    use board_api::repo::pg::PgRepo;
    use sqlx::postgres::PgPoolOptions;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;
    if cfg.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        info!("Database migrations applied");
    }
    info!("Using Postgres repository backend");
    Ok(Arc::new(PgRepo::new(pool)))
}
