use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, ChainView, ValidateResponse};

/// Get the full chain. Peers call this during conflict resolution.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ChainView {
        chain: ledger.chain(),
        length: ledger.len(),
    })
}

/// Validate our own chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    let merkle_mismatches = ledger
        .chain()
        .iter()
        .filter(|b| !b.merkle_root_matches())
        .map(|b| b.index)
        .collect();
    HttpResponse::Ok().json(ValidateResponse {
        valid: ledger.valid_chain(ledger.chain()),
        merkle_mismatches,
        length: ledger.len(),
        difficulty: ledger.difficulty(),
    })
}
