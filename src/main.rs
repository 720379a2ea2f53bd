use std::sync::Arc;

use ridesync::auth::TokenVerifier;
use ridesync::config::Config;
use ridesync::db::{seed_drivers, InMemoryDriverPool, InMemoryRideStore};
use ridesync::engine::Engine;
use ridesync::error::Error;
use ridesync::external::completions::CompletionClient;
use ridesync::server::{serve, DynAPI};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let completions = CompletionClient::new(&config.completions)?;

    let engine = Engine::new(
        Arc::new(InMemoryDriverPool::new(seed_drivers())),
        Arc::new(InMemoryRideStore::new()),
        Arc::new(completions),
    )?;

    let verifier = Arc::new(TokenVerifier::new(&config.jwt_secret));

    serve(Arc::new(engine) as DynAPI, verifier, config.bind_addr).await
}
