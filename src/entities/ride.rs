use chrono::{DateTime, Duration, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{ChosenRoute, Driver};
use crate::error::{invalid_invocation_error, Error};

const ESTIMATED_PICKUP_MINUTES: i64 = 8;
const ESTIMATED_DROPOFF_MINUTES: i64 = 25;

#[derive(Clone, Debug, Serialize, Deserialize, PolarClass)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    #[polar(attribute)]
    pub id: String,
    #[polar(attribute)]
    pub rider_id: String,
    pub driver_id: String,
    pub pickup: String,
    pub destination: String,
    pub ride_type: String,
    pub status: Status,
    pub scheduled_time: DateTime<Utc>,
    pub driver: Driver,
    pub route: ChosenRoute,
    pub pricing: Pricing,
    pub timeline: Timeline,
    pub features: Features,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Booked,
    DriverOnTheWay,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub base_fare: f64,
    pub per_mile: f64,
    pub per_minute: f64,
    /// Read from the route's cost text; the rates above do not feed into it.
    pub estimated_total: Option<f64>,
    pub surge: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub booked: DateTime<Utc>,
    pub driver_assigned: DateTime<Utc>,
    pub estimated_pickup: DateTime<Utc>,
    pub estimated_dropoff: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub ai_routing: bool,
    pub real_time_tracking: bool,
    pub carbon_tracking: bool,
    pub safety_features: Vec<String>,
}

/// Everything a ride is built from apart from the clock.
#[derive(Clone, Debug)]
pub struct RideDraft {
    pub rider_id: String,
    pub pickup: String,
    pub destination: String,
    pub ride_type: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub driver: Driver,
    pub route: ChosenRoute,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::DriverOnTheWay => "driver-on-the-way",
        }
    }
}

impl Pricing {
    pub fn from_route_cost(cost: &str) -> Self {
        Self {
            base_fare: 3.50,
            per_mile: 1.85,
            per_minute: 0.35,
            estimated_total: parse_cost(cost),
            surge: 1.0,
        }
    }
}

impl Timeline {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            booked: now,
            driver_assigned: now,
            estimated_pickup: now + Duration::minutes(ESTIMATED_PICKUP_MINUTES),
            estimated_dropoff: now + Duration::minutes(ESTIMATED_DROPOFF_MINUTES),
        }
    }
}

impl Default for Features {
    fn default() -> Self {
        Self {
            ai_routing: true,
            real_time_tracking: true,
            carbon_tracking: true,
            safety_features: vec![
                "emergency button".into(),
                "live tracking".into(),
                "driver verification".into(),
            ],
        }
    }
}

impl Ride {
    pub fn new(draft: RideDraft, now: DateTime<Utc>) -> Self {
        let pricing = Pricing::from_route_cost(&draft.route.estimate().cost);

        Self {
            id: format!("ride-{}", Uuid::new_v4()),
            rider_id: draft.rider_id,
            driver_id: draft.driver.id.clone(),
            pickup: draft.pickup,
            destination: draft.destination,
            ride_type: draft.ride_type.unwrap_or_else(|| "economy".into()),
            status: Status::Booked,
            scheduled_time: draft.scheduled_time.unwrap_or(now),
            driver: draft.driver,
            route: draft.route,
            pricing,
            timeline: Timeline::starting_at(now),
            features: Features::default(),
            created_at: now,
        }
    }

    #[tracing::instrument(skip(self), fields(ride_id = %self.id))]
    pub fn dispatch_driver(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Booked => {
                self.status = Status::DriverOnTheWay;
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }
}

/// Drops the first `$` and reads the leading decimal number, the way a
/// lenient float parser would: "$18.50" and "$18.50 USD" both give 18.5.
fn parse_cost(cost: &str) -> Option<f64> {
    let text = cost.replacen('$', "", 1);
    let text = text.trim_start();

    let mut end = 0;
    let mut seen_dot = false;

    for (i, c) in text.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => seen_dot = true,
            '-' | '+' if i == 0 => {}
            _ => break,
        }
    }

    text[..end].parse().ok()
}

#[cfg(test)]
fn test_driver() -> Driver {
    use crate::entities::{Coordinates, Vehicle};

    Driver::new(
        "driver-1",
        "Alex Johnson",
        4.9,
        Vehicle::new("sedan", "Toyota Camry", "ABC-123", "Silver"),
        Coordinates {
            lat: 40.7128,
            lng: -74.0060,
        },
    )
}

#[test]
fn parse_cost_reads_leading_number() {
    assert_eq!(parse_cost("$16.20"), Some(16.20));
    assert_eq!(parse_cost("$18.50 USD"), Some(18.5));
    assert_eq!(parse_cost("12"), Some(12.0));
    assert_eq!(parse_cost("$.5"), Some(0.5));
    assert_eq!(parse_cost("free"), None);
    assert_eq!(parse_cost(""), None);
}

#[test]
fn pricing_total_comes_from_cost_text_only() {
    let pricing = Pricing::from_route_cost("$16.20");

    assert_eq!(pricing.estimated_total, Some(16.20));
    assert_eq!(pricing.base_fare, 3.50);
    assert_eq!(pricing.per_mile, 1.85);
    assert_eq!(pricing.per_minute, 0.35);
    assert_eq!(pricing.surge, 1.0);
}

#[test]
fn new_ride_is_booked_with_fixed_timeline() {
    let now = Utc::now();
    let ride = Ride::new(
        RideDraft {
            rider_id: "1".into(),
            pickup: "123 Main St".into(),
            destination: "456 Oak Ave".into(),
            ride_type: None,
            scheduled_time: None,
            driver: test_driver(),
            route: ChosenRoute::standard(),
        },
        now,
    );

    assert!(ride.id.starts_with("ride-"));
    assert_eq!(ride.status, Status::Booked);
    assert_eq!(ride.driver_id, "driver-1");
    assert_eq!(ride.ride_type, "economy");
    assert_eq!(ride.scheduled_time, now);
    assert_eq!(ride.pricing.estimated_total, Some(18.5));
    assert_eq!(ride.timeline.booked, now);
    assert_eq!(ride.timeline.driver_assigned, now);
    assert_eq!(ride.timeline.estimated_pickup, now + Duration::minutes(8));
    assert_eq!(ride.timeline.estimated_dropoff, now + Duration::minutes(25));
}

#[test]
fn dispatch_driver_happens_once() {
    let mut ride = Ride::new(
        RideDraft {
            rider_id: "1".into(),
            pickup: "a".into(),
            destination: "b".into(),
            ride_type: Some("premium".into()),
            scheduled_time: None,
            driver: test_driver(),
            route: ChosenRoute::standard(),
        },
        Utc::now(),
    );

    ride.dispatch_driver().unwrap();
    assert_eq!(ride.status, Status::DriverOnTheWay);
    assert_eq!(ride.status.name(), "driver-on-the-way");

    let err = ride.dispatch_driver().unwrap_err();
    assert_eq!(err.code, 100);
}

#[test]
fn ride_serializes_in_camel_case() {
    let ride = Ride::new(
        RideDraft {
            rider_id: "1".into(),
            pickup: "a".into(),
            destination: "b".into(),
            ride_type: None,
            scheduled_time: None,
            driver: test_driver(),
            route: ChosenRoute::standard(),
        },
        Utc::now(),
    );

    let value = serde_json::to_value(&ride).unwrap();
    assert_eq!(value["status"], "booked");
    assert_eq!(value["riderId"], "1");
    assert_eq!(value["pricing"]["estimatedTotal"], 18.5);
    assert_eq!(value["features"]["safetyFeatures"][0], "emergency button");
    assert_eq!(value["route"]["name"], "Standard Route");
}
