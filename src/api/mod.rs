mod chain;
mod health;
mod mining;
pub mod models;
mod nodes;
mod tx;
mod wallet;

use actix_web::web::{self, ServiceConfig};

pub use models::{AppState, MiningSnapshot};

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(mining::mine)
            .service(tx::new_transaction)
            .service(tx::signed_transaction)
            .service(tx::get_pending)
            .service(nodes::register_nodes)
            .service(nodes::resolve)
            .service(wallet::create_wallet),
    );
}
