//! HTTP surface tests
//!
//! Drives the actix app in-process: transaction admission, mining,
//! chain export, peer registration and resolution. Scenarios that need a
//! second node start it on a loopback listener.

use std::net::TcpListener;

use actix_web::{App, HttpServer, http::StatusCode, test, web};
use serde_json::{Value, json};

use ledger_node::api::{self, AppState};
use ledger_node::blockchain::Block;
use ledger_node::config::{NodeConfig, NodeRole};
use ledger_node::transaction::Transaction;
use ledger_node::wallet::{generate_keypair_hex, sign_transaction};

fn state(role: NodeRole) -> web::Data<AppState> {
    state_with(NodeConfig {
        role,
        difficulty: 2,
        ..NodeConfig::default()
    })
}

fn state_with(config: NodeConfig) -> web::Data<AppState> {
    web::Data::new(AppState::new(&config).unwrap())
}

/// Serve `state` on an ephemeral loopback port; returns `host:port`.
fn serve(state: web::Data<AppState>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .workers(1)
    .disable_signals()
    .listen(listener)
    .unwrap()
    .run();
    actix_web::rt::spawn(server);
    addr
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .configure(api::init_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn submit_mine_and_export_chain() {
    let state = state(NodeRole::Miner);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/transactions/new/")
        .set_json(json!({ "sender": "0", "recipient": "A", "amount": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Transaction will be added to Block 2");

    let req = test::TestRequest::get().uri("/api/v1/mine/").to_request();
    let mined: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mined["index"], 2);
    assert_eq!(mined["transactions"][0], json!({ "sender": "0", "recipient": "A", "amount": 1 }));
    assert_eq!(mined["transactions"][1]["recipient"], state.node_id.as_str());

    let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["length"], 2);
    let chain: Vec<Block> = serde_json::from_value(body["chain"].clone()).unwrap();
    assert_eq!(chain[1].previous_hash, chain[0].hash());

    let req = test::TestRequest::get().uri("/api/v1/validate/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["merkle_mismatches"], json!([]));

    let req = test::TestRequest::get().uri("/api/v1/transactions/pending/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["size"], 0);
}

#[actix_web::test]
async fn missing_transaction_fields_are_rejected() {
    let state = state(NodeRole::Miner);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/transactions/new/")
        .set_json(json!({ "sender": "0", "amount": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(state.ledger.lock().unwrap().pending().is_empty());
}

#[actix_web::test]
async fn relay_does_not_mine() {
    let state = state(NodeRole::Relay);
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/v1/mine/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(state.ledger.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn signed_transactions_are_authenticated() {
    let state = state(NodeRole::Miner);
    let app = app!(state);

    let (sk, pk, addr) = generate_keypair_hex();
    let tx = Transaction::new(addr, "bob", 3);
    let signature = sign_transaction(&tx, &sk).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/transactions/signed/")
        .set_json(json!({ "transaction": tx, "signature": signature, "public_key": pk }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let mut forged = tx.clone();
    forged.amount = 3_000.into();
    let req = test::TestRequest::post()
        .uri("/api/v1/transactions/signed/")
        .set_json(json!({ "transaction": forged, "signature": signature, "public_key": pk }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(state.ledger.lock().unwrap().pending(), &[tx]);
}

#[actix_web::test]
async fn register_nodes_and_resolve_with_unreachable_peer() {
    let state = state(NodeRole::Miner);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/nodes/register/")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/nodes/register/")
        .set_json(json!({ "nodes": ["http://127.0.0.1:1", "127.0.0.1:1"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_nodes"], json!(["127.0.0.1:1"]));

    // Nothing listens on port 1: the peer is skipped, our chain stands.
    let req = test::TestRequest::get().uri("/api/v1/nodes/resolve/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["replaced"], false);
    assert_eq!(body["message"], "Our chain is authoritative");
    assert_eq!(body["chain"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn health_endpoint_answers() {
    let state = state(NodeRole::Miner);
    let app = app!(state);
    let req = test::TestRequest::get().uri("/api/v1/health/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn negative_and_fractional_amounts_are_queued() {
    let state = state(NodeRole::Miner);
    let app = app!(state);

    for amount in [json!(-1), json!(0.5)] {
        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new/")
            .set_json(json!({ "sender": "a", "recipient": "b", "amount": amount }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/api/v1/transactions/pending/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["size"], 2);
    assert_eq!(body["transactions"][0]["amount"], json!(-1));
    assert_eq!(body["transactions"][1]["amount"], json!(0.5));
}

#[actix_web::test]
async fn validate_reports_blocks_with_mismatched_merkle_root() {
    let state = state(NodeRole::Miner);
    let app = app!(state);

    // The last block has no successor, so its merkle_root can be altered
    // without breaking the hash links.
    let mut donor = ledger_node::blockchain::Ledger::new(2);
    donor.new_transaction("a", "b", 1);
    donor.mine("donor");
    donor.mine("donor");
    let mut chain = donor.chain().to_vec();
    chain[2].merkle_root = "f".repeat(64);
    state.ledger.lock().unwrap().replace_chain(chain).unwrap();

    let req = test::TestRequest::get().uri("/api/v1/validate/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["merkle_mismatches"], json!([3]));
    assert_eq!(body["length"], 3);
}

#[actix_web::test]
async fn mining_snapshot_pairs_tip_with_its_epoch() {
    let state = state(NodeRole::Miner);

    let before = state.mining_snapshot();
    assert_eq!(before.epoch, state.epoch());
    assert_eq!(before.tip, Block::genesis().hash());

    // A replacement moves tip and epoch together under the ledger lock.
    let mut donor = ledger_node::blockchain::Ledger::new(2);
    donor.mine("donor");
    {
        let mut ledger = state.ledger.lock().unwrap();
        ledger.replace_chain(donor.chain().to_vec()).unwrap();
        state.bump_epoch();
    }

    let after = state.mining_snapshot();
    assert_eq!(after.epoch, before.epoch + 1);
    assert_eq!(after.tip, donor.last_block().hash());
    assert_eq!(after.last_proof, donor.last_block().proof);

    // Mining over the fresh snapshot succeeds and moves the epoch again.
    let app = app!(state);
    let req = test::TestRequest::get().uri("/api/v1/mine/").to_request();
    let mined: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mined["index"], 3);
    assert_eq!(mined["previous_hash"], after.tip.as_str());
    assert_eq!(state.epoch(), after.epoch + 1);
}

#[actix_web::test]
async fn resolve_adopts_longer_chain_from_live_peer() {
    let peer = state(NodeRole::Miner);
    {
        let mut ledger = peer.ledger.lock().unwrap();
        ledger.new_transaction("a", "b", -2);
        ledger.mine("peer");
        ledger.mine("peer");
    }
    let peer_chain = peer.ledger.lock().unwrap().chain().to_vec();
    let peer_addr = serve(peer.clone());

    let local = state(NodeRole::Miner);
    let app = app!(local);
    let epoch = local.epoch();

    let req = test::TestRequest::post()
        .uri("/api/v1/nodes/register/")
        .set_json(json!({ "nodes": [format!("http://{peer_addr}")] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/v1/nodes/resolve/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["replaced"], true);
    assert_eq!(body["message"], "Our chain was replaced");
    let adopted: Vec<Block> = serde_json::from_value(body["chain"].clone()).unwrap();
    assert_eq!(adopted, peer_chain);
    assert_eq!(local.ledger.lock().unwrap().len(), 3);
    assert_eq!(local.epoch(), epoch + 1);
}

#[actix_web::test]
async fn relay_forwards_signed_transaction_to_miner_pool() {
    let miner = state(NodeRole::Miner);
    let miner_addr = serve(miner.clone());

    let relay = state_with(NodeConfig {
        role: NodeRole::Relay,
        difficulty: 2,
        miner_address: Some(miner_addr),
        ..NodeConfig::default()
    });
    let app = app!(relay);

    let (sk, pk, addr) = generate_keypair_hex();
    let tx = Transaction::new(addr, "carol", 7);
    let signature = sign_transaction(&tx, &sk).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/transactions/signed/")
        .set_json(json!({ "transaction": tx, "signature": signature, "public_key": pk }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    assert!(relay.ledger.lock().unwrap().pending().is_empty());
    assert_eq!(miner.ledger.lock().unwrap().pending(), &[tx]);
}

#[actix_web::test]
async fn relay_without_miner_is_unavailable() {
    let relay = state(NodeRole::Relay);
    let app = app!(relay);

    let (sk, pk, addr) = generate_keypair_hex();
    let tx = Transaction::new(addr, "carol", 7);
    let signature = sign_transaction(&tx, &sk).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/transactions/signed/")
        .set_json(json!({ "transaction": tx, "signature": signature, "public_key": pk }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(relay.ledger.lock().unwrap().pending().is_empty());
}
