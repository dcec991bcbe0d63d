pub mod auth;
pub mod cache;
pub mod companies;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod games;
pub mod imports;
pub mod metadata;
pub mod pricing;
pub mod reviews;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use redis::aio::ConnectionManager;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use cache::RedisCache;
use companies::{CompanyRepository, CompanyService};
use config::Config;
use dashboard::{DashboardRepository, DashboardService};
use games::{GameRepository, GameService};
use imports::{GameImportService, RawgClient};
use metadata::IgdbClient;
use pricing::{ItadClient, PriceSyncConsumer, PriceSyncQueue, PriceSyncService};
use reviews::{Aggregator, ReviewRepository, ReviewService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        games::handlers::create_game_handler,
        games::handlers::get_game_detail_handler,
        games::handlers::top_rated_handler,
        pricing::handlers::sync_game_prices_handler,
        pricing::handlers::sync_all_prices_handler,
        companies::handlers::create_company_handler,
        imports::handlers::import_game_handler,
        dashboard::handlers::dashboard_handler,
    ),
    components(
        schemas(
            games::models::GameResponse,
            games::models::GameDetailResponse,
            games::models::PriceOffer,
            games::models::CreateGameRequest,
            games::models::UpdateGameRequest,
            games::models::PatchGenresRequest,
            reviews::models::ReviewResponse,
            reviews::models::CreateReviewRequest,
            reviews::models::UpdateReviewRequest,
            companies::models::CompanyResponse,
            companies::models::CreateCompanyRequest,
            pricing::handlers::ResyncResponse,
            imports::handlers::ImportGameRequest,
            dashboard::models::DashboardStats,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "games", description = "Game catalog endpoints"),
        (name = "reviews", description = "Review endpoints"),
        (name = "pricing", description = "Price synchronization endpoints"),
        (name = "companies", description = "Company endpoints"),
        (name = "imports", description = "Catalog import endpoints"),
        (name = "dashboard", description = "Admin dashboard endpoints")
    ),
    info(
        title = "IndieZone API",
        version = "1.0.0",
        description = "Game catalog with store-price synchronization and community reviews"
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub games: GameService,
    pub reviews: ReviewService,
    pub pricing: PriceSyncService,
    pub companies: CompanyService,
    pub imports: GameImportService,
    pub dashboard: DashboardService,
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Games
        .route("/api/games", post(games::handlers::create_game_handler))
        .route("/api/games/top-rated", get(games::handlers::top_rated_handler))
        .route("/api/games/newest", get(games::handlers::newest_releases_handler))
        .route("/api/games/:id", get(games::handlers::get_game_detail_handler))
        .route("/api/games/:id", put(games::handlers::update_game_handler))
        .route("/api/games/:id", delete(games::handlers::delete_game_handler))
        .route(
            "/api/games/:id/genres",
            patch(games::handlers::patch_genres_handler),
        )
        // Pricing
        .route(
            "/api/games/:id/price-sync",
            post(pricing::handlers::sync_game_prices_handler),
        )
        .route(
            "/api/admin/price-sync",
            post(pricing::handlers::sync_all_prices_handler),
        )
        // Catalog import
        .route(
            "/api/admin/import/games",
            post(imports::handlers::import_game_handler),
        )
        // Dashboard
        .route("/api/dashboard", get(dashboard::handlers::dashboard_handler))
        // Reviews
        .route(
            "/api/games/:id/reviews",
            post(reviews::handlers::create_review_handler),
        )
        .route(
            "/api/games/:id/reviews",
            get(reviews::handlers::list_reviews_handler),
        )
        .route(
            "/api/reviews/:id",
            put(reviews::handlers::update_review_handler),
        )
        .route(
            "/api/reviews/:id",
            delete(reviews::handlers::delete_review_handler),
        )
        // Companies
        .route(
            "/api/companies",
            post(companies::handlers::create_company_handler),
        )
        .route(
            "/api/companies",
            get(companies::handlers::list_companies_handler),
        )
        .route(
            "/api/companies/:id",
            get(companies::handlers::get_company_handler),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    tracing::info!("IndieZone API - Starting...");

    let config = Config::from_env().expect("Invalid configuration");

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Redis backs both the derived caches and the price-sync queue
    tracing::info!("Connecting to Redis...");
    let redis_client = redis::Client::open(config.redis_url.clone()).expect("Invalid REDIS_URL");
    let redis_conn = ConnectionManager::new(redis_client)
        .await
        .expect("Failed to connect to Redis");

    let cache: Arc<dyn cache::DerivedCache> = Arc::new(RedisCache::new(redis_conn.clone()));
    let queue = PriceSyncQueue::new(redis_conn, &config.price_sync_queue);

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .expect("Failed to build HTTP client");

    let game_repo = GameRepository::new(db_pool.clone());
    let review_repo = ReviewRepository::new(db_pool.clone());
    let company_repo = CompanyRepository::new(db_pool.clone());
    let dashboard_repo = DashboardRepository::new(db_pool);

    let price_sync = PriceSyncService::new(
        game_repo.clone(),
        Arc::new(queue.clone()),
        cache.clone(),
    );
    let aggregator = Aggregator::new(review_repo.clone(), game_repo.clone());
    let games = GameService::new(game_repo.clone(), cache.clone(), price_sync.clone());

    let state = AppState {
        games: games.clone(),
        reviews: ReviewService::new(review_repo, aggregator, cache.clone()),
        pricing: price_sync.clone(),
        companies: CompanyService::new(
            company_repo,
            Arc::new(IgdbClient::new(http.clone(), &config)),
        ),
        imports: GameImportService::new(RawgClient::new(http, &config), games),
        dashboard: DashboardService::new(dashboard_repo),
    };

    // Background pipeline: the queue consumer and the daily full resync
    let provider = ItadClient::new(&config).expect("Failed to build pricing client");
    let consumer = PriceSyncConsumer::new(
        game_repo,
        provider,
        cache.clone(),
        config.price_sync_cooldown,
    );
    tokio::spawn(consumer.run(queue));
    tokio::spawn(pricing::run_daily_price_sync(price_sync));

    // Create the application router
    let app = create_router(state);

    // Start the Axum server
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("IndieZone API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
