use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, NewTxRequest, NewTxResponse, PendingResponse};
use crate::ledger::LedgerError;

/// Submit a transfer: the ledger signs it with the sender's registered key,
/// verifies the signature and queues it for the next block.
#[post("/tx/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    match ledger.submit_transaction(&body.sender, &body.recipient, body.amount) {
        Ok(()) => {
            info!(
                "POST /tx/ - queued {} -> {} ({}), pending={}",
                body.sender,
                body.recipient,
                body.amount,
                ledger.pending().len()
            );
            HttpResponse::Ok().json(NewTxResponse {
                pending_size: ledger.pending().len(),
            })
        }
        Err(e @ LedgerError::SelfVerifyFailed) => {
            // Our own signature failed to verify; a bug, not a client error.
            warn!("POST /tx/ - internal signature inconsistency");
            HttpResponse::InternalServerError().body(e.to_string())
        }
        Err(e) => {
            warn!("POST /tx/ - rejected: {e}");
            HttpResponse::BadRequest().body(e.to_string())
        }
    }
}

/// List the pending queue (admitted, signature-verified, not yet mined).
#[get("/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(PendingResponse {
        size: ledger.pending().len(),
        transactions: ledger.pending().to_vec(),
    })
}
