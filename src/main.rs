use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{error, info};

use ledger_node::api::{self, AppState};
use ledger_node::config::NodeConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env().map_err(|e| {
        error!("invalid configuration: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    let state = AppState::new(&config).map_err(|e| {
        error!("failed to initialize node: {e}");
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    info!(
        "⛓️ Starting {:?} node {} at http://{}:{} (difficulty {}, {} peers)",
        config.role,
        state.node_id,
        config.host,
        config.port,
        config.difficulty,
        config.peers.len()
    );

    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
