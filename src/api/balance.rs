use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, BalanceResponse};

/// Aggregate a name's balance over the whole chain: received minus sent,
/// miner rewards included. Reporting only; admission never checks funds.
#[get("/balance/{name}/")]
pub async fn get_balance(state: web::Data<AppState>, path: web::Path<(String,)>) -> impl Responder {
    let name = path.into_inner().0;

    let (mut received, mut sent) = (0u128, 0u128);
    {
        let ledger = state.ledger.lock().expect("mutex poisoned");
        for block in ledger.chain() {
            for tx in &block.transactions {
                if tx.recipient == name {
                    received += tx.amount as u128;
                }
                if tx.sender == name {
                    sent += tx.amount as u128;
                }
            }
        }
    }

    HttpResponse::Ok().json(BalanceResponse {
        name,
        received,
        sent,
        balance: received as i128 - sent as i128,
    })
}
