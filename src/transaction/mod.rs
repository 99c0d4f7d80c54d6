pub mod auth;
pub mod model;

pub use auth::{AuthError, Authenticator};
pub use model::{REWARD_SENDER, Transaction};
