use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info, warn};

use super::models::{AppState, MessageResponse, NewTxRequest, PendingResponse, SignedTxRequest};
use crate::config::NodeRole;
use crate::wallet::TransactionAuthenticator;

/// Submit an unsigned transaction into the pending pool.
#[post("/transactions/new/")]
pub async fn new_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let NewTxRequest {
        sender,
        recipient,
        amount,
    } = body.into_inner();
    let (Some(sender), Some(recipient), Some(amount)) = (sender, recipient, amount) else {
        warn!("POST /transactions/new/ - rejected: missing fields");
        return HttpResponse::BadRequest().body("Missing values");
    };

    let index = {
        let mut ledger = state.ledger.lock().expect("mutex poisoned");
        ledger.new_transaction(sender, recipient, amount)
    };
    debug!("POST /transactions/new/ - queued for block {index}");

    HttpResponse::Created().json(MessageResponse {
        message: format!("Transaction will be added to Block {index}"),
    })
}

/// Submit a signed transaction. The signature is checked before the
/// transaction reaches the pool; a relay node hands it on to its miner.
#[post("/transactions/signed/")]
pub async fn signed_transaction(
    state: web::Data<AppState>,
    body: web::Json<SignedTxRequest>,
) -> impl Responder {
    let req = body.into_inner();
    if let Err(e) = state
        .authenticator
        .verify(&req.transaction, &req.signature, &req.public_key)
    {
        warn!("POST /transactions/signed/ - rejected: {e}");
        return HttpResponse::BadRequest().body(e.to_string());
    }

    if state.role == NodeRole::Relay {
        let Some(miner) = state.miner_address.as_deref() else {
            return HttpResponse::ServiceUnavailable().body("no miner configured");
        };
        return match state.client.forward_signed(miner, &req).await {
            Ok(()) => {
                info!("RELAY - forwarded signed transaction to {miner}");
                HttpResponse::Accepted().json(MessageResponse {
                    message: format!("Transaction forwarded to miner {miner}"),
                })
            }
            Err(e) => {
                warn!("RELAY - forwarding failed: {e}");
                HttpResponse::BadGateway().body(e.to_string())
            }
        };
    }

    let index = {
        let mut ledger = state.ledger.lock().expect("mutex poisoned");
        ledger.admit(req.transaction)
    };
    info!("POST /transactions/signed/ - authentic, queued for block {index}");
    HttpResponse::Created().json(MessageResponse {
        message: format!("Transaction will be added to Block {index}"),
    })
}

/// List the pending pool.
#[get("/transactions/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(PendingResponse {
        size: ledger.pending().len(),
        transactions: ledger.pending().to_vec(),
    })
}
