use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::Duration;

use crate::{
    api::{Booking, BookingRequest, RideAPI, RouteAPI},
    auth::User,
    entities::{ChosenRoute, Ride, RideDraft, RideStatus},
    error::{invalid_input_error, not_found_error, Error},
};

const DRIVER_DISPATCH_DELAY: Duration = Duration::from_secs(2);

fn required(field: Option<String>) -> Result<String, Error> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(invalid_input_error()),
    }
}

#[async_trait]
impl RideAPI for Engine {
    #[tracing::instrument(skip(self, request), fields(user_id = %user.id))]
    async fn book_ride(&self, user: User, request: BookingRequest) -> Result<Booking, Error> {
        let pickup = required(request.pickup)?;
        let destination = required(request.destination)?;
        let preferences = request.preferences.with_booking_defaults();

        let (route, ai_optimization) = match self
            .optimize_route(pickup.clone(), destination.clone(), preferences)
            .await
        {
            Ok(optimization) => {
                let route = match optimization.routes.into_iter().next() {
                    Some(candidate) => ChosenRoute::Optimized(candidate),
                    None => ChosenRoute::standard(),
                };
                (route, Some(optimization.insights))
            }
            Err(err) => {
                tracing::warn!(
                    code = err.code,
                    message = %err.message,
                    "route optimization failed, booking with the standard route"
                );
                (ChosenRoute::standard(), None)
            }
        };

        // selection marks the driver unavailable, so the snapshot below
        // already carries available = false
        let driver = self.drivers.select_available().await?;

        tracing::info!(driver_id = %driver.id, "driver assigned");

        let ride = Ride::new(
            RideDraft {
                rider_id: user.id,
                pickup,
                destination,
                ride_type: request.ride_type,
                scheduled_time: request.scheduled_time,
                driver,
                route,
            },
            Utc::now(),
        );

        self.rides.insert(ride.clone()).await?;

        // the ride is stored and the driver taken; a lost transition leaves
        // it `booked` but must not turn the booking into a failure
        if let Err(err) = self.scheduler.schedule(
            ride.id.clone(),
            RideStatus::DriverOnTheWay,
            DRIVER_DISPATCH_DELAY,
        ) {
            tracing::error!(
                ride_id = %ride.id,
                code = err.code,
                "driver dispatch could not be scheduled"
            );
        }

        tracing::info!(ride_id = %ride.id, "ride booked");

        Ok(Booking {
            ride,
            ai_optimization,
        })
    }

    #[tracing::instrument(skip(self), fields(user_id = %user.id))]
    async fn find_ride(&self, user: User, id: String) -> Result<Ride, Error> {
        let ride = self.rides.find(&id).await?.ok_or_else(not_found_error)?;

        // other riders' rides are indistinguishable from missing ones
        self.authorize(user, "read", ride.clone()).map_err(|err| {
            if err.is_unauthorized_error() {
                not_found_error()
            } else {
                err
            }
        })?;

        Ok(ride)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user.id))]
    async fn list_rides(&self, user: User) -> Result<Vec<Ride>, Error> {
        self.rides.list_for_rider(&user.id).await
    }
}
