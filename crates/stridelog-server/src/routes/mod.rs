pub mod account;
pub mod focus;
pub mod habits;
pub mod health;
pub mod tasks;

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::cors::CorsLayer;

use stridelog_db::Database;
use stridelog_service::LocalService;

use crate::auth::auth_middleware;

pub struct InnerAppState {
    pub service: LocalService,
    pub db: Arc<dyn Database>,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(service: LocalService, db: Arc<dyn Database>) -> Router {
    let state: AppState = Arc::new(InnerAppState { service, db });

    let public = Router::new()
        .merge(health::routes())
        .merge(account::routes());

    let protected = Router::new()
        .merge(account::protected_routes())
        .merge(habits::routes())
        .merge(tasks::routes())
        .merge(focus::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
