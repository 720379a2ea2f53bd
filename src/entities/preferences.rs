use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    Fastest,
    Cheapest,
    EcoFriendly,
    Balanced,
    /// Any other wording the rider chose; handed to the optimizer verbatim.
    #[serde(untagged)]
    Other(String),
}

/// Rider preferences forwarded to the route optimizer. The map is open:
/// recognised keys are pulled out, everything else is carried through
/// untouched. `ecoFriendly` keeps whatever JSON value the caller sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco_friendly: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoutePreferences {
    /// Fills the keys booking always sends: fastest, not eco-friendly.
    /// Values supplied by the caller win.
    pub fn with_booking_defaults(mut self) -> Self {
        self.priority.get_or_insert(Priority::Fastest);
        self.eco_friendly.get_or_insert(Value::Bool(false));
        self
    }
}

#[test]
fn booking_defaults_fill_missing_keys() {
    let preferences = RoutePreferences::default().with_booking_defaults();

    assert_eq!(preferences.priority, Some(Priority::Fastest));
    assert_eq!(preferences.eco_friendly, Some(Value::Bool(false)));
}

#[test]
fn caller_values_and_extras_survive_defaults() {
    let preferences: RoutePreferences = serde_json::from_value(serde_json::json!({
        "ecoFriendly": true,
        "avoidTolls": true,
    }))
    .unwrap();
    let preferences = preferences.with_booking_defaults();

    assert_eq!(preferences.priority, Some(Priority::Fastest));
    assert_eq!(preferences.eco_friendly, Some(Value::Bool(true)));

    let value = serde_json::to_value(&preferences).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "priority": "fastest",
            "ecoFriendly": true,
            "avoidTolls": true,
        })
    );
}

#[test]
fn unrecognised_values_are_kept_as_sent() {
    let preferences: RoutePreferences = serde_json::from_value(serde_json::json!({
        "priority": "shortest",
        "ecoFriendly": "yes",
    }))
    .unwrap();

    assert_eq!(preferences.priority, Some(Priority::Other("shortest".into())));
    assert_eq!(preferences.eco_friendly, Some(Value::String("yes".into())));

    let preferences = preferences.with_booking_defaults();
    assert_eq!(
        serde_json::to_value(&preferences).unwrap(),
        serde_json::json!({ "priority": "shortest", "ecoFriendly": "yes" })
    );

    let known: Priority = serde_json::from_str("\"ecoFriendly\"").unwrap();
    assert_eq!(known, Priority::EcoFriendly);
}
