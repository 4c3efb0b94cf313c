//! planner-server
//!
//! Axum HTTP surface over the travel plan synthesis pipeline.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_runtime::{build_gateway, config};
use travel_planner::{travel_tools, PlannerConfig, TravelPlanner};

use crate::handlers::{health_check, plan_handler, train_tickets_handler, weather_handler};
use crate::state::AppState;

/// All routes over shared state
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/travel/plan", post(plan_handler))
        .route("/api/travel/weather", get(weather_handler))
        .route("/api/train/tickets", get(train_tickets_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before reading RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let gateway = build_gateway(config::profiles_from_env(), config::gateway_config_from_env());
    let providers: Vec<String> = gateway.profiles().map(|p| p.name.clone()).collect();
    if let Err(e) = agent_runtime::require_providers(&gateway) {
        tracing::warn!("{}", e);
    }

    let planner_config = PlannerConfig::from_env();
    let weather = planner_config.weather_service();
    let trains = planner_config.train_service();

    let tools = travel_tools(weather.clone(), trains.clone());
    tracing::info!("Registered {} tools: {}", tools.len(), tools.names().join(", "));

    let planner = TravelPlanner::new(Arc::new(gateway), tools, &planner_config)?;

    let state = AppState {
        planner: Arc::new(planner),
        weather,
        trains,
        providers: Arc::new(providers),
    };

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("planner-server listening on http://{}", addr);
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  POST /api/travel/plan     - Synthesize a travel plan");
    tracing::info!("  GET  /api/travel/weather  - Weather forecast");
    tracing::info!("  GET  /api/train/tickets   - Train ticket search");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
