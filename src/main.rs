use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fintrack::config::{Config, DatabaseConfig};
use fintrack::core::{AuthEvent, AuthStateStore};
use fintrack::debts::{DebtService, MySqlDebtRepository};
use fintrack::middleware::{
    json_error_handler, query_error_handler, ApiKeyAuth, ErrorHandler, RateLimiter, RequestId,
};
use fintrack::modules::health;
use fintrack::summary::SummaryService;
use fintrack::transactions::{MySqlTransactionRepository, TransactionService};
use fintrack::users::{key_digest, KeyService, MySqlUserRepository, UserRepository};

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fintrack=debug,actix_web=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Log identity changes until the store shuts down
fn spawn_auth_listener(store: &AuthStateStore) {
    let mut events = store.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedIn(principal)) => {
                    tracing::info!(user_id = principal.user_id.as_str(), "User signed in");
                }
                Ok(AuthEvent::SignedOut { user_id }) => {
                    tracing::info!(user_id = user_id.as_str(), "User signed out");
                }
                Ok(AuthEvent::Shutdown) => break,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth listener lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.app.log_format);
    config.validate().context("Configuration validation failed")?;

    tracing::info!("Starting Fintrack");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Ledger currency: {}", config.ledger.currency);

    let db_pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;
    DatabaseConfig::migrate(&db_pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    let user_repo: Arc<dyn UserRepository> = Arc::new(MySqlUserRepository::new(db_pool.clone()));
    if let (Some(name), Some(key)) = (
        config.security.bootstrap_user.as_deref(),
        config.security.bootstrap_api_key.as_deref(),
    ) {
        let user_id = user_repo
            .ensure_user_with_key(name, &key_digest(key))
            .await
            .context("Failed to seed bootstrap user")?;
        tracing::info!(user_id = user_id.as_str(), "Bootstrap user ready");
    }

    let auth_store = Arc::new(AuthStateStore::new(
        64,
        Duration::from_secs(config.security.session_ttl_secs),
    ));
    spawn_auth_listener(&auth_store);

    let key_service = Arc::new(KeyService::new(user_repo.clone(), auth_store.clone()));
    let debt_repo = Arc::new(MySqlDebtRepository::new(db_pool.clone()));
    let transaction_repo = Arc::new(MySqlTransactionRepository::new(db_pool.clone()));

    let debt_service = Arc::new(DebtService::new(debt_repo.clone(), config.ledger.clone()));
    let transaction_service = Arc::new(TransactionService::new(
        transaction_repo.clone(),
        config.ledger.currency,
    ));
    let summary_service = Arc::new(SummaryService::new(transaction_repo, debt_repo));

    let bind_address = config.server.bind_address();
    let workers = config.server.workers;
    let ledger = config.ledger.clone();
    let security = config.security.clone();
    let rate_limiter = RateLimiter::new(security.rate_limit_per_minute);
    let store = auth_store.clone();

    let server = HttpServer::new(move || {
        let cors = match security.cors_allowed_origin.as_deref() {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header(),
            None => Cors::permissive(),
        };

        App::new()
            .wrap(ErrorHandler)
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(rate_limiter.clone())
            .wrap(RequestId)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(ledger.clone()))
            .app_data(web::Data::new(debt_service.clone()))
            .app_data(web::Data::new(transaction_service.clone()))
            .app_data(web::Data::new(summary_service.clone()))
            .app_data(web::Data::new(key_service.clone()))
            .configure(health::controllers::configure)
            .configure(health::controllers::configure_readiness)
            .service(
                web::scope("/api")
                    .wrap(ApiKeyAuth::new(store.clone(), user_repo.clone()))
                    .configure(fintrack::configure_api),
            )
    })
    .workers(workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    let result = server.await;
    auth_store.shutdown();
    result.context("Server error")
}
