use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ROUTE_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ROUTE_ID_LENGTH: usize = 9;

/// Minutes added on top of the quoted duration when estimating arrival.
const ARRIVAL_BUFFER_MINUTES: i64 = 5;

/// A route as described by the optimization service (or the fallback set),
/// before any enhancement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEstimate {
    pub name: String,
    pub duration: String,
    pub distance: String,
    pub cost: String,
    #[serde(default)]
    pub carbon_footprint: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advantages: Vec<String>,
    /// Anything else the upstream attached to the route.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeFactors {
    pub traffic_condition: String,
    pub weather_impact: String,
    pub construction_delays: bool,
    pub surge_multiplier: f64,
}

/// An enhanced route returned by the optimization gateway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCandidate {
    #[serde(flatten)]
    pub estimate: RouteEstimate,
    pub id: String,
    pub real_time_factors: RealTimeFactors,
    pub estimated_arrival: DateTime<Utc>,
}

/// The route a ride was booked with: the first optimized candidate, or the
/// standard placeholder when optimization was unavailable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChosenRoute {
    Optimized(RouteCandidate),
    Standard(RouteEstimate),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInsights {
    pub optimal_choice: String,
    pub reasoning: String,
    pub confidence_score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteOptimization {
    pub routes: Vec<RouteCandidate>,
    pub insights: RouteInsights,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RouteSet {
    pub routes: Vec<RouteEstimate>,
}

impl RouteEstimate {
    fn fixed(
        name: &str,
        duration: &str,
        distance: &str,
        cost: &str,
        carbon_footprint: &str,
        advantages: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            duration: duration.into(),
            distance: distance.into(),
            cost: cost.into(),
            carbon_footprint: carbon_footprint.into(),
            advantages: advantages.iter().map(|&a| a.into()).collect(),
            extra: Map::new(),
        }
    }

    /// Routes substituted when the optimization answer cannot be parsed.
    pub fn fallback_set() -> Vec<Self> {
        vec![
            Self::fixed(
                "Fastest Route",
                "15-20 mins",
                "8.2 mi",
                "$18.50",
                "2.3 kg CO₂",
                &["Quickest arrival", "Main roads", "Reliable timing"],
            ),
            Self::fixed(
                "Eco-Friendly Route",
                "18-25 mins",
                "7.8 mi",
                "$16.20",
                "1.8 kg CO₂",
                &["Lower emissions", "Fuel efficient", "Environmental impact"],
            ),
            Self::fixed(
                "Multi-Modal Option",
                "25-30 mins",
                "6.5 mi + transit",
                "$12.80",
                "0.9 kg CO₂",
                &["Most sustainable", "Cost effective", "Reduces traffic"],
            ),
        ]
    }

    /// Placeholder used by booking when no optimization result exists.
    pub fn standard() -> Self {
        Self::fixed(
            "Standard Route",
            "15-20 mins",
            "8.2 mi",
            "$18.50",
            "2.3 kg CO₂",
            &[],
        )
    }

    /// Leading whole number of the duration text: "15-20 mins" gives 15.
    /// Text without a leading number counts as zero.
    pub fn leading_minutes(&self) -> i64 {
        let digits: String = self
            .duration
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();

        digits.parse().unwrap_or(0)
    }
}

impl RealTimeFactors {
    pub fn neutral() -> Self {
        Self {
            traffic_condition: "moderate".into(),
            weather_impact: "none".into(),
            construction_delays: false,
            surge_multiplier: 1.0,
        }
    }
}

impl RouteCandidate {
    pub fn enhance(mut estimate: RouteEstimate, now: DateTime<Utc>) -> Self {
        // these keys belong to the enhancement and must not be duplicated
        for key in ["id", "realTimeFactors", "estimatedArrival"] {
            estimate.extra.remove(key);
        }

        let arrival_minutes = estimate.leading_minutes() + ARRIVAL_BUFFER_MINUTES;

        Self {
            estimate,
            id: random_route_id(),
            real_time_factors: RealTimeFactors::neutral(),
            estimated_arrival: now + Duration::minutes(arrival_minutes),
        }
    }
}

impl ChosenRoute {
    pub fn standard() -> Self {
        Self::Standard(RouteEstimate::standard())
    }

    pub fn estimate(&self) -> &RouteEstimate {
        match self {
            Self::Optimized(candidate) => &candidate.estimate,
            Self::Standard(estimate) => estimate,
        }
    }
}

impl RouteInsights {
    pub fn for_routes(routes: &[RouteCandidate]) -> Self {
        Self {
            optimal_choice: routes.first().map(|r| r.id.clone()).unwrap_or_default(),
            reasoning: "Based on current traffic patterns and user preferences".into(),
            confidence_score: 0.92,
        }
    }
}

fn random_route_id() -> String {
    let mut rng = rand::thread_rng();

    (0..ROUTE_ID_LENGTH)
        .map(|_| ROUTE_ID_CHARSET[rng.gen_range(0..ROUTE_ID_CHARSET.len())] as char)
        .collect()
}

#[test]
fn leading_minutes_takes_first_number_of_range() {
    let mut estimate = RouteEstimate::standard();
    assert_eq!(estimate.leading_minutes(), 15);

    estimate.duration = " 42 mins".into();
    assert_eq!(estimate.leading_minutes(), 42);

    estimate.duration = "about half an hour".into();
    assert_eq!(estimate.leading_minutes(), 0);
}

#[test]
fn enhance_assigns_id_factors_and_arrival() {
    let now = Utc::now();
    let estimate = RouteEstimate::fallback_set().remove(1);
    let candidate = RouteCandidate::enhance(estimate.clone(), now);

    assert_eq!(candidate.estimate, estimate);
    assert_eq!(candidate.id.len(), 9);
    assert!(candidate
        .id
        .bytes()
        .all(|b| ROUTE_ID_CHARSET.contains(&b)));
    assert_eq!(candidate.real_time_factors, RealTimeFactors::neutral());
    // "18-25 mins" -> 18 + 5
    assert_eq!(candidate.estimated_arrival, now + Duration::minutes(23));
}

#[test]
fn enhance_overrides_upstream_owned_keys() {
    let mut estimate = RouteEstimate::standard();
    estimate.extra.insert("id".into(), Value::from("upstream-id"));
    estimate.extra.insert("tolls".into(), Value::from(2));

    let candidate = RouteCandidate::enhance(estimate, Utc::now());
    let value = serde_json::to_value(&candidate).unwrap();

    assert_eq!(value["id"], Value::from(candidate.id.clone()));
    assert_ne!(value["id"], "upstream-id");
    assert_eq!(value["tolls"], 2);
    assert_eq!(value["realTimeFactors"]["trafficCondition"], "moderate");
}

#[test]
fn standard_route_has_no_enhancement_fields() {
    let value = serde_json::to_value(ChosenRoute::standard()).unwrap();

    assert_eq!(value["name"], "Standard Route");
    assert_eq!(value["cost"], "$18.50");
    assert!(value.get("id").is_none());
    assert!(value.get("advantages").is_none());
}

#[test]
fn insights_point_at_first_route() {
    let now = Utc::now();
    let routes: Vec<RouteCandidate> = RouteEstimate::fallback_set()
        .into_iter()
        .map(|e| RouteCandidate::enhance(e, now))
        .collect();

    let insights = RouteInsights::for_routes(&routes);
    assert_eq!(insights.optimal_choice, routes[0].id);
    assert_eq!(insights.confidence_score, 0.92);
}
