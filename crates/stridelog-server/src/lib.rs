pub mod auth;
mod routes;
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;

use stridelog_db::Database;
use stridelog_service::LocalService;

pub async fn serve(listener: TcpListener, db: Arc<dyn Database>) -> Result<()> {
    let service = LocalService::new(db.clone());
    let app = routes::build_router(service, db);
    axum::serve(listener, app).await?;
    Ok(())
}
