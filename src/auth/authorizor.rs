use oso::{Oso, PolarClass};

use crate::auth::User;
use crate::entities::Ride;
use crate::error::Error;

pub fn new() -> Result<Oso, Error> {
    let mut o = Oso::new();

    o.register_class(User::get_polar_class())?;
    o.register_class(Ride::get_polar_class())?;

    o.load_str(include_str!("rules.polar"))?;

    Ok(o)
}

#[cfg(test)]
fn ride_for(rider_id: &str) -> Ride {
    use crate::entities::{ChosenRoute, Coordinates, Driver, RideDraft, Vehicle};
    use chrono::Utc;

    let driver = Driver::new(
        "driver-1",
        "Alex Johnson",
        4.9,
        Vehicle::new("sedan", "Toyota Camry", "ABC-123", "Silver"),
        Coordinates { lat: 0.0, lng: 0.0 },
    );

    Ride::new(
        RideDraft {
            rider_id: rider_id.into(),
            pickup: "123 Main St".into(),
            destination: "456 Oak Ave".into(),
            ride_type: None,
            scheduled_time: None,
            driver,
            route: ChosenRoute::standard(),
        },
        Utc::now(),
    )
}

#[test]
fn rider_can_read_own_ride() {
    use crate::auth::Role;

    let authorizor = new().unwrap();

    let rider = User::new("1", "rider@demo.com", Role::Rider);
    let ride = ride_for("1");

    let result = authorizor.is_allowed(rider.clone(), "read", ride.clone());
    assert_eq!(result.unwrap(), true);
}

#[test]
fn rider_cannot_read_someone_elses_ride() {
    use crate::auth::Role;

    let authorizor = new().unwrap();

    let other = User::new("2", "other@demo.com", Role::Rider);
    let admin = User::new("3", "admin@ridesync.com", Role::Admin);
    let ride = ride_for("1");

    let result = authorizor.is_allowed(other.clone(), "read", ride.clone());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(admin.clone(), "read", ride.clone());
    assert_eq!(result.unwrap(), false);
}

#[test]
fn unknown_actions_are_denied() {
    use crate::auth::Role;

    let authorizor = new().unwrap();

    let rider = User::new("1", "rider@demo.com", Role::Rider);
    let ride = ride_for("1");

    let result = authorizor.is_allowed(rider.clone(), "cancel", ride.clone());
    assert_eq!(result.unwrap(), false);
}
