use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use std::env;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use adega::database::{create_database_pool, init_schema, Database};
use adega::handlers;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    // Initialize database
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://adega.db".to_string());

    let db = create_database_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    init_schema(&db).await.expect("Failed to initialize schema");

    log::info!("Database connection successful!");

    // Build the application router
    let app = create_router(db);

    // Get port from environment or use default
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    log::info!("🍷 Adega server starting on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}

fn create_router(db: Database) -> Router {
    Router::new()
        // Public routes (no authentication required)
        .route("/", get(|| async { Redirect::permanent("/login") }))
        .route("/login", get(handlers::auth::login_page))
        .route("/login", post(handlers::auth::login))
        .route("/register", get(handlers::auth::register_page))
        .route("/register", post(handlers::auth::register))
        .route("/logout", post(handlers::auth::logout))
        .route("/profile", get(handlers::auth::profile_page))
        .route("/profile", post(handlers::auth::change_password))
        // Protected routes (session required; handlers redirect to /login)
        .route("/dashboard", get(handlers::dashboard::dashboard))
        // Catalog routes
        .route("/products", get(handlers::products::products_list))
        .route("/products/new", get(handlers::products::product_form))
        .route("/products", post(handlers::products::create_product))
        .route("/products/:id", get(handlers::products::product_detail))
        .route("/products/:id/edit", get(handlers::products::edit_form))
        .route("/products/:id", post(handlers::products::update_product))
        .route("/products/:id/delete", post(handlers::products::delete_product))
        // Stock routes
        .route("/stock/entry", get(handlers::stock::entry_form))
        .route("/stock/entry", post(handlers::stock::create_entry))
        // Sales routes
        .route("/sales", get(handlers::sales::sales_list))
        .route("/sales/new", get(handlers::sales::sale_form))
        .route("/sales/new", post(handlers::sales::create_sale))
        // Static files
        .nest_service("/static", ServeDir::new("static"))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(db)
}
