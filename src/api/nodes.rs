use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, RegisterNodesRequest, RegisterNodesResponse, ResolveResponse};
use crate::consensus::{fetch_chains, resolve_conflicts};

#[post("/nodes/register/")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> impl Responder {
    let Some(nodes) = body.into_inner().nodes else {
        return HttpResponse::BadRequest().body("Error: Please supply a valid list of nodes");
    };

    let mut peers = state.peers.lock().expect("mutex poisoned");
    for node in &nodes {
        if let Err(e) = peers.register(node) {
            warn!("POST /nodes/register/ - rejected {node:?}: {e}");
            return HttpResponse::BadRequest().body(e.to_string());
        }
    }
    info!("PEERS - {} known after registration", peers.len());

    HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added".to_string(),
        total_nodes: peers.to_vec(),
    })
}

/// Run longest-valid-chain resolution against every known peer.
#[get("/nodes/resolve/")]
pub async fn resolve(state: web::Data<AppState>) -> impl Responder {
    let peers = state.peers.lock().expect("mutex poisoned").to_vec();
    // Fetch without holding the ledger; selection and swap happen under it.
    let responses = fetch_chains(&state.client, &peers).await;

    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    let replaced = resolve_conflicts(&mut ledger, responses);
    if replaced {
        state.bump_epoch();
    }

    HttpResponse::Ok().json(ResolveResponse {
        message: if replaced {
            "Our chain was replaced".to_string()
        } else {
            "Our chain is authoritative".to_string()
        },
        replaced,
        chain: ledger.chain().to_vec(),
    })
}
