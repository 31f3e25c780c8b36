use actix_web::{HttpResponse, Responder, get, web};
use log::{debug, error, info, warn};

use super::models::{AppState, MineResponse, MiningSnapshot};
use crate::config::NodeRole;
use crate::error::LedgerError;

/// Mine a block over the current tip:
/// - Snapshot last proof and tip hash, then release the ledger
/// - Search the proof on the blocking pool, cancelled if the tip moves
/// - Re-lock, reward this node and forge the block if the tip is unchanged
#[get("/mine/")]
pub async fn mine(state: web::Data<AppState>) -> impl Responder {
    if state.role != NodeRole::Miner {
        return HttpResponse::Forbidden().body("this node does not mine");
    }

    let MiningSnapshot {
        last_proof,
        tip,
        pow,
        epoch,
    } = state.mining_snapshot();
    debug!("MINER - searching proof over last_proof={last_proof} (epoch {epoch})");

    let watcher = state.clone();
    let found = web::block(move || pow.search(last_proof, || watcher.epoch() != epoch)).await;
    let proof = match found {
        Ok(Some(proof)) => proof,
        Ok(None) => {
            warn!("MINER - chain tip moved during search; attempt abandoned");
            return HttpResponse::Conflict().body("chain changed while mining");
        }
        Err(e) => {
            error!("MINER - proof search failed: {e}");
            return HttpResponse::InternalServerError().body("proof search failed");
        }
    };

    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    match ledger.forge(proof, &tip, &state.node_id) {
        Ok(block) => {
            let resp = MineResponse {
                message: "New Block Forged".to_string(),
                index: block.index,
                transactions: block.transactions.clone(),
                proof: block.proof,
                previous_hash: block.previous_hash.clone(),
                merkle_root: block.merkle_root.clone(),
            };
            state.bump_epoch();
            info!(
                "MINER - sealed block #{} (proof={}, txs={})",
                resp.index,
                resp.proof,
                resp.transactions.len()
            );
            HttpResponse::Ok().json(resp)
        }
        Err(LedgerError::StaleTip) => {
            warn!("MINER - proof {proof} is stale; tip changed before forging");
            HttpResponse::Conflict().body("chain changed while mining")
        }
        Err(e) => {
            error!("MINER - forging failed: {e}");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}
