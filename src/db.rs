use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::entities::{Coordinates, Driver, Ride, RideStatus, Vehicle};
use crate::error::{
    invalid_invocation_error, no_drivers_available_error, not_found_error, store_error, Error,
};

#[async_trait]
pub trait DriverPool: Send + Sync {
    /// Takes the first available driver in pool order and marks it
    /// unavailable before any other selection can see it.
    async fn select_available(&self) -> Result<Driver, Error>;

    async fn mark_unavailable(&self, id: &str) -> Result<Driver, Error>;
}

#[async_trait]
pub trait RideStore: Send + Sync {
    async fn insert(&self, ride: Ride) -> Result<(), Error>;

    async fn find(&self, id: &str) -> Result<Option<Ride>, Error>;

    async fn list_for_rider(&self, rider_id: &str) -> Result<Vec<Ride>, Error>;

    async fn transition(&self, id: &str, status: RideStatus) -> Result<Ride, Error>;
}

pub struct InMemoryDriverPool {
    drivers: Mutex<Vec<Driver>>,
}

impl InMemoryDriverPool {
    pub fn new(drivers: Vec<Driver>) -> Self {
        Self {
            drivers: Mutex::new(drivers),
        }
    }
}

fn mark_unavailable_in(drivers: &mut [Driver], id: &str) -> Result<Driver, Error> {
    let driver = drivers
        .iter_mut()
        .find(|d| d.id == id)
        .ok_or_else(not_found_error)?;

    driver.mark_unavailable()?;

    Ok(driver.clone())
}

#[async_trait]
impl DriverPool for InMemoryDriverPool {
    #[tracing::instrument(skip(self))]
    async fn select_available(&self) -> Result<Driver, Error> {
        let mut drivers = self.drivers.lock().await;

        let id = match drivers.iter().find(|d| d.is_available()) {
            Some(driver) => driver.id.clone(),
            None => {
                tracing::warn!("no available drivers left in the pool");
                return Err(no_drivers_available_error());
            }
        };

        mark_unavailable_in(&mut drivers, &id)
    }

    #[tracing::instrument(skip(self))]
    async fn mark_unavailable(&self, id: &str) -> Result<Driver, Error> {
        let mut drivers = self.drivers.lock().await;

        mark_unavailable_in(&mut drivers, id)
    }
}

#[derive(Default)]
struct RideTable {
    rides: HashMap<String, Ride>,
    // insertion order
    order: Vec<String>,
}

#[derive(Default)]
pub struct InMemoryRideStore {
    table: Mutex<RideTable>,
}

impl InMemoryRideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RideStore for InMemoryRideStore {
    #[tracing::instrument(skip(self, ride), fields(ride_id = %ride.id))]
    async fn insert(&self, ride: Ride) -> Result<(), Error> {
        let mut table = self.table.lock().await;

        if table.rides.contains_key(&ride.id) {
            return Err(store_error(format!("duplicate ride id {}", ride.id)));
        }

        table.order.push(ride.id.clone());
        table.rides.insert(ride.id.clone(), ride);

        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Ride>, Error> {
        let table = self.table.lock().await;

        Ok(table.rides.get(id).cloned())
    }

    async fn list_for_rider(&self, rider_id: &str) -> Result<Vec<Ride>, Error> {
        let table = self.table.lock().await;

        let mut rides = vec![];

        for id in table.order.iter() {
            let ride = table
                .rides
                .get(id)
                .ok_or_else(|| store_error(format!("ride index out of sync at {}", id)))?;

            if ride.rider_id == rider_id {
                rides.push(ride.clone());
            }
        }

        Ok(rides)
    }

    #[tracing::instrument(skip(self))]
    async fn transition(&self, id: &str, status: RideStatus) -> Result<Ride, Error> {
        let mut table = self.table.lock().await;

        let ride = table.rides.get_mut(id).ok_or_else(not_found_error)?;

        match status {
            RideStatus::DriverOnTheWay => ride.dispatch_driver()?,
            RideStatus::Booked => return Err(invalid_invocation_error()),
        }

        Ok(ride.clone())
    }
}

/// The fleet the service starts with.
pub fn seed_drivers() -> Vec<Driver> {
    vec![
        Driver::new(
            "driver-1",
            "Alex Johnson",
            4.9,
            Vehicle::new("sedan", "Toyota Camry", "ABC-123", "Silver"),
            Coordinates {
                lat: 40.7128,
                lng: -74.0060,
            },
        ),
        Driver::new(
            "driver-2",
            "Maria Rodriguez",
            4.8,
            Vehicle::new("suv", "Honda CR-V", "XYZ-789", "Black"),
            Coordinates {
                lat: 40.7589,
                lng: -73.9851,
            },
        ),
    ]
}
