use std::sync::Arc;

use ticker_api::database::repositories::{
    InMemoryTickerStore, InMemoryUserRepository, TickerRepositoryImpl, TickerStore,
    UserRepository, UserRepositoryImpl,
};
use ticker_api::database::{establish_connection_pool, Collection};
use ticker_api::market_data::{MarketDataProvider, YahooQuoteProvider};
use ticker_api::{create_router, AppState, AuthService, Config, TickerEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Stores {
    stocks: Arc<dyn TickerStore>,
    indices: Arc<dyn TickerStore>,
    users: Arc<dyn UserRepository>,
    kind: &'static str,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticker_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let stores = initialize_stores(&config);

    let jwt_secret = config.jwt_secret.clone().unwrap_or_else(|| {
        tracing::warn!("⚠️  JWT_SECRET not set; sessions will not survive a restart");
        rand::random::<[u8; 32]>().to_vec()
    });
    let auth = Arc::new(AuthService::new(&jwt_secret, config.jwt_ttl));

    let market_data: Arc<dyn MarketDataProvider> = match YahooQuoteProvider::new(
        config.market_data_base_url.clone(),
        config.market_data_timeout,
    ) {
        Ok(provider) => Arc::new(provider.with_session_url(config.market_data_session_url.clone())),
        Err(e) => {
            tracing::error!("❌ Failed to create market data client: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        engine: Arc::new(TickerEngine::new(stores.stocks, stores.indices)),
        users: stores.users,
        auth,
        market_data,
        cookie_secure: config.cookie_secure,
        storage: stores.kind,
    };

    let app = create_router(state, &config.cors_allow);

    let addr = config.listen_addr;
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    tracing::info!("🚀 Ticker API server running on http://{}", addr);
    tracing::info!("📊 Health check: http://{}/health", addr);
    tracing::info!("📚 Swagger UI: http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.unwrap();
}

/// PostgreSQL-backed stores when DATABASE_URL is set, in-memory otherwise
fn initialize_stores(config: &Config) -> Stores {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("⚠️  DATABASE_URL not set; using empty in-memory stores");
        return in_memory_stores();
    };

    tracing::info!("🗄️  Initializing PostgreSQL connection pool...");

    let pool = match establish_connection_pool(database_url, config.db_pool_size) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Failed to establish database connection: {}", e);
            std::process::exit(1);
        }
    };

    if config.run_migrations {
        match pool.run_migrations() {
            Ok(applied) => tracing::info!("✅ Applied {} pending migration(s)", applied),
            Err(e) => {
                tracing::error!("❌ Failed to run migrations: {}", e);
                std::process::exit(1);
            }
        }
    }

    let stocks_pool = pool.clone();
    let indices_pool = pool.clone();
    let users_pool = pool;

    tracing::info!("✅ Database integration complete");

    Stores {
        stocks: Arc::new(TickerRepositoryImpl::new(Collection::Stocks, move || {
            stocks_pool.get_conn()
        })),
        indices: Arc::new(TickerRepositoryImpl::new(Collection::Indices, move || {
            indices_pool.get_conn()
        })),
        users: Arc::new(UserRepositoryImpl::new(move || users_pool.get_conn())),
        kind: "postgres",
    }
}

fn in_memory_stores() -> Stores {
    Stores {
        stocks: Arc::new(InMemoryTickerStore::new(Collection::Stocks)),
        indices: Arc::new(InMemoryTickerStore::new(Collection::Indices)),
        users: Arc::new(InMemoryUserRepository::new()),
        kind: "memory",
    }
}
