pub mod authorizor;
mod token;
mod user;

pub use token::{bearer_token, Claims, TokenVerifier};
pub use user::{Role, User};
