use actix_web::{HttpResponse, Responder, post, web};
use log::{info, warn};

use super::models::{AppState, NewWalletRequest, NewWalletResponse};
use crate::transaction::REWARD_SENDER;

/// Create a named wallet and return its keypair. Keys live in memory only;
/// the caller is responsible for keeping the private key.
#[post("/wallet/new/")]
pub async fn create_wallet(
    state: web::Data<AppState>,
    body: web::Json<NewWalletRequest>,
) -> impl Responder {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().body("wallet name required");
    }
    if name == REWARD_SENDER {
        return HttpResponse::BadRequest().body("wallet name is reserved for miner rewards");
    }

    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    match ledger.registry_mut().create_identity(name) {
        Ok(wallet) => {
            info!("created wallet '{}'", wallet.name);
            HttpResponse::Ok().json(NewWalletResponse {
                name: wallet.name.clone(),
                public_key: wallet.public_key_hex(),
                private_key: wallet.secret_key_hex(),
            })
        }
        Err(e) => {
            warn!("POST /wallet/new/ - rejected: {e}");
            HttpResponse::Conflict().body(e.to_string())
        }
    }
}
