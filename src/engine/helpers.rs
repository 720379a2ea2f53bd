use crate::entities::{RouteEstimate, RoutePreferences, RouteSet};
use crate::error::{unexpected_error, Error};

pub const ROUTE_SYSTEM_PROMPT: &str = "\
You plan routes for a ride-hailing service. For the trip you are given, weigh:
- current traffic patterns and congestion
- weather and its effect on travel time
- road construction and closures
- fuel efficiency and environmental impact
- the rider's stated priority (fastest, cheapest, or most eco-friendly)
Answer with a JSON object of the form \
{\"routes\": [{\"name\", \"duration\", \"distance\", \"cost\", \"carbonFootprint\", \"advantages\"}]}.";

pub fn route_prompt(
    pickup: &str,
    destination: &str,
    preferences: &RoutePreferences,
) -> Result<String, Error> {
    let preferences = serde_json::to_string(preferences).map_err(|err| {
        tracing::error!(error = %err, "failed to encode route preferences");
        unexpected_error()
    })?;

    Ok(format!(
        "Optimize the route from \"{pickup}\" to \"{destination}\".\n\
         Rider preferences: {preferences}\n\
         Include a primary route, an eco-friendly alternative and a multi-modal option \
         where one exists, with time, cost and carbon estimates for each.\n\
         Respond as JSON with a routes array; each route has name, duration, distance, \
         cost, carbonFootprint and advantages."
    ))
}

/// Returns the first brace-balanced `{...}` slice of `text`. Braces inside
/// JSON string literals are ignored. Nothing is returned if the first object
/// never closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Reads the routes out of a free-text answer. `None` means the answer has to
/// be replaced by the fallback set.
pub fn parse_route_estimates(answer: &str) -> Option<Vec<RouteEstimate>> {
    let object = extract_json_object(answer)?;

    match serde_json::from_str::<RouteSet>(object) {
        Ok(set) if !set.routes.is_empty() => Some(set.routes),
        Ok(_) => {
            tracing::warn!("route answer contained an empty routes array");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "route answer did not decode");
            None
        }
    }
}

#[test]
fn extracts_object_surrounded_by_prose() {
    let text = "Sure! Here you go:\n{\"routes\": [{\"name\": \"A\"}]}\nHope that helps {really}.";

    assert_eq!(
        extract_json_object(text),
        Some("{\"routes\": [{\"name\": \"A\"}]}")
    );
}

#[test]
fn ignores_braces_inside_strings() {
    let text = r#"{"note": "use } and { freely", "escaped": "a \" } b"} trailing"#;

    assert_eq!(
        extract_json_object(text),
        Some(r#"{"note": "use } and { freely", "escaped": "a \" } b"}"#)
    );
}

#[test]
fn no_object_or_unclosed_object() {
    assert_eq!(extract_json_object("no json here"), None);
    assert_eq!(extract_json_object("{\"routes\": [ {"), None);
    assert_eq!(extract_json_object("} stray close first"), None);
}

#[test]
fn parses_routes_from_answer() {
    let answer = r#"Based on traffic:
```json
{"routes": [
  {"name": "Downtown Express", "duration": "12-14 mins", "distance": "5.1 mi",
   "cost": "$14.75", "carbonFootprint": "1.2 kg CO₂", "advantages": ["Fast"], "tolls": true}
]}
```"#;

    let routes = parse_route_estimates(answer).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].name, "Downtown Express");
    assert_eq!(routes[0].cost, "$14.75");
    assert_eq!(routes[0].advantages, vec!["Fast".to_string()]);
    assert_eq!(routes[0].extra["tolls"], serde_json::Value::Bool(true));
}

#[test]
fn unusable_answers_yield_nothing() {
    assert!(parse_route_estimates("Take the highway, it is quicker.").is_none());
    assert!(parse_route_estimates("{\"routes\": []}").is_none());
    assert!(parse_route_estimates("{\"paths\": [1, 2]}").is_none());
    assert!(parse_route_estimates("{\"routes\": [{\"name\": \"no cost\"}]}").is_none());
    assert!(parse_route_estimates("{routes: nope}").is_none());
}

#[test]
fn prompt_embeds_trip_and_preferences() {
    let preferences = RoutePreferences::default().with_booking_defaults();
    let prompt = route_prompt("123 Main St", "456 Oak Ave", &preferences).unwrap();

    assert!(prompt.contains("\"123 Main St\""));
    assert!(prompt.contains("\"456 Oak Ave\""));
    assert!(prompt.contains("\"priority\":\"fastest\""));
    assert!(prompt.contains("\"ecoFriendly\":false"));
}
