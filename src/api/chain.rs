use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{
    AppState, ChainResponse, DifficultyResponse, MineRequest, MineResponse, SetDifficultyRequest,
    ValidateResponse,
};
use crate::ledger::LedgerError;

/// Get the full chain. Blocks are plain data; serde does the export.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    let resp = ChainResponse {
        length: ledger.len(),
        difficulty: ledger.difficulty(),
        chain: ledger.chain(),
    };
    HttpResponse::Ok().json(resp)
}

/// Validate the whole chain, reporting the first failing index if any.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    let first_invalid_index = ledger.first_invalid_index();
    HttpResponse::Ok().json(ValidateResponse {
        valid: first_invalid_index.is_none(),
        length: ledger.len(),
        first_invalid_index,
    })
}

/// Mine the pending queue into a new block credited to `miner_address`.
/// Blocking, CPU-bound: returns once a valid nonce is found.
#[post("/mine/")]
pub async fn mine_block(state: web::Data<AppState>, req: web::Json<MineRequest>) -> impl Responder {
    let miner_address = req.miner_address.trim();
    if miner_address.is_empty() {
        return HttpResponse::BadRequest().body("miner_address required");
    }

    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    let difficulty = ledger.difficulty();
    match ledger.mine_pending(miner_address) {
        Ok(block) => {
            let resp = MineResponse {
                mined_index: block.index,
                hash: block.hash.clone(),
                nonce: block.nonce,
                difficulty,
                transactions: block.transactions.len(),
            };
            info!(
                "POST /mine/ - sealed block #{} (hash={}, nonce={})",
                resp.mined_index, resp.hash, resp.nonce
            );
            HttpResponse::Ok().json(resp)
        }
        Err(e @ LedgerError::EmptyQueue) => {
            warn!("POST /mine/ - nothing to mine");
            HttpResponse::BadRequest().body(e.to_string())
        }
        Err(e) => {
            warn!("POST /mine/ - failed: {e}");
            HttpResponse::BadRequest().body(e.to_string())
        }
    }
}

/// Get current PoW difficulty.
#[get("/difficulty/")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: ledger.difficulty(),
    })
}

/// Update PoW difficulty (affects future blocks only).
#[post("/difficulty/")]
pub async fn set_difficulty(
    state: web::Data<AppState>,
    body: web::Json<SetDifficultyRequest>,
) -> impl Responder {
    if body.difficulty > 6 {
        return HttpResponse::BadRequest().body("difficulty too high for dev mode (max 6)");
    }
    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    ledger.set_difficulty(body.difficulty);
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: ledger.difficulty(),
    })
}
