use serde::{Deserialize, Serialize};

use crate::error::{invalid_invocation_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub rating: f64,
    pub vehicle: Vehicle,
    pub location: Coordinates,
    pub available: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "type")]
    pub kind: String,
    pub model: String,
    pub plate: String,
    pub color: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Driver {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        rating: f64,
        vehicle: Vehicle,
        location: Coordinates,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating,
            vehicle,
            location,
            available: true,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    // there is no way back to `available`: nothing releases a driver yet
    #[tracing::instrument(skip(self), fields(driver_id = %self.id))]
    pub fn mark_unavailable(&mut self) -> Result<(), Error> {
        if !self.available {
            return Err(invalid_invocation_error());
        }

        self.available = false;
        Ok(())
    }
}

impl Vehicle {
    pub fn new(kind: &str, model: &str, plate: &str, color: &str) -> Self {
        Self {
            kind: kind.into(),
            model: model.into(),
            plate: plate.into(),
            color: color.into(),
        }
    }
}

#[test]
fn mark_unavailable_only_once() {
    let mut driver = Driver::new(
        "driver-9",
        "Sam Lee",
        4.5,
        Vehicle::new("sedan", "Kia K5", "KIA-555", "Blue"),
        Coordinates { lat: 0.0, lng: 0.0 },
    );

    assert!(driver.is_available());
    driver.mark_unavailable().unwrap();
    assert!(!driver.is_available());

    let err = driver.mark_unavailable().unwrap_err();
    assert_eq!(err.code, 100);
}

#[test]
fn vehicle_kind_serializes_as_type() {
    let vehicle = Vehicle::new("suv", "Honda CR-V", "XYZ-789", "Black");
    let value = serde_json::to_value(&vehicle).unwrap();

    assert_eq!(value["type"], "suv");
    assert!(value.get("kind").is_none());
}
