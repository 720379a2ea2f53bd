use async_channel::{Receiver, Sender};
use std::sync::Arc;
use tokio::time::{sleep_until, Duration, Instant};

use crate::{
    db::RideStore,
    entities::RideStatus,
    error::{unexpected_error, Error},
};

#[derive(Debug)]
struct Transition {
    ride_id: String,
    status: RideStatus,
    due: Instant,
}

/// Applies delayed ride status changes through the ride store, detached
/// from the request that asked for them.
pub struct Scheduler {
    sender: Sender<Transition>,
}

impl Scheduler {
    pub fn start(rides: Arc<dyn RideStore>) -> Self {
        let (sender, receiver) = async_channel::unbounded();

        tokio::spawn(run(receiver, rides));

        Self { sender }
    }

    /// A scheduler whose queue is already closed, so every `schedule` fails.
    #[cfg(test)]
    pub(crate) fn stopped() -> Self {
        let (sender, receiver) = async_channel::unbounded();
        receiver.close();

        Self { sender }
    }

    /// Fire-and-forget: returns as soon as the transition is queued.
    pub fn schedule(&self, ride_id: String, status: RideStatus, delay: Duration) -> Result<(), Error> {
        let transition = Transition {
            ride_id,
            status,
            due: Instant::now() + delay,
        };

        self.sender.try_send(transition).map_err(|err| {
            tracing::error!(error = %err, "status scheduler is not accepting work");
            unexpected_error()
        })
    }
}

async fn run(receiver: Receiver<Transition>, rides: Arc<dyn RideStore>) {
    while let Ok(transition) = receiver.recv().await {
        let rides = rides.clone();

        tokio::spawn(async move {
            sleep_until(transition.due).await;

            match rides.transition(&transition.ride_id, transition.status).await {
                Ok(ride) => tracing::info!(
                    ride_id = %ride.id,
                    status = ride.status.name(),
                    "ride status advanced"
                ),
                Err(err) => tracing::warn!(
                    ride_id = %transition.ride_id,
                    code = err.code,
                    message = %err.message,
                    "scheduled status change failed"
                ),
            }
        });
    }

    tracing::debug!("status scheduler stopped");
}
