use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::entities::{Ride, RouteInsights, RouteOptimization, RoutePreferences};
use crate::error::Error;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub pickup: Option<String>,
    pub destination: Option<String>,
    pub ride_type: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub preferences: RoutePreferences,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub ride: Ride,
    /// Absent when the booking fell back to the standard route.
    pub ai_optimization: Option<RouteInsights>,
}

#[async_trait]
pub trait RouteAPI {
    async fn optimize_route(
        &self,
        pickup: String,
        destination: String,
        preferences: RoutePreferences,
    ) -> Result<RouteOptimization, Error>;
}

#[async_trait]
pub trait RideAPI {
    async fn book_ride(&self, user: User, request: BookingRequest) -> Result<Booking, Error>;

    async fn find_ride(&self, user: User, id: String) -> Result<Ride, Error>;

    async fn list_rides(&self, user: User) -> Result<Vec<Ride>, Error>;
}

pub trait API: RouteAPI + RideAPI {}
