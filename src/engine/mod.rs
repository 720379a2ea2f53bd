mod helpers;
mod ride_api;
mod route_api;
mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

use oso::Oso;
use std::sync::Arc;

use crate::{
    api::API,
    auth::authorizor,
    db::{DriverPool, RideStore},
    error::{unauthorized_error, Error},
    external::CompletionService,
};

pub use scheduler::Scheduler;

pub struct Engine {
    drivers: Arc<dyn DriverPool>,
    rides: Arc<dyn RideStore>,
    completions: Arc<dyn CompletionService>,
    scheduler: Scheduler,
    authorizor: Oso,
}

impl Engine {
    /// Must be called from within a tokio runtime: the status scheduler is
    /// started here.
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(
        drivers: Arc<dyn DriverPool>,
        rides: Arc<dyn RideStore>,
        completions: Arc<dyn CompletionService>,
    ) -> Result<Self, Error> {
        let scheduler = Scheduler::start(rides.clone());

        Ok(Self {
            drivers,
            rides,
            completions,
            scheduler,
            authorizor: authorizor::new()?,
        })
    }
}

impl Engine {
    pub fn authorize<Actor, Action, Resource>(
        &self,
        actor: Actor,
        action: Action,
        resource: Resource,
    ) -> Result<(), Error>
    where
        Actor: oso::ToPolar,
        Action: oso::ToPolar,
        Resource: oso::ToPolar,
    {
        if self.authorizor.is_allowed(actor, action, resource)? {
            return Ok(());
        }

        Err(unauthorized_error())
    }
}

impl API for Engine {}
