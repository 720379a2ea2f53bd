use axum::extract::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{RouteCandidate, RouteInsights, RoutePreferences};
use crate::error::Error;
use crate::server::extract::JsonBody;
use crate::server::DynAPI;

#[derive(Deserialize)]
pub struct OptimizeParams {
    #[serde(default)]
    pickup: String,
    #[serde(default)]
    destination: String,
    #[serde(default)]
    preferences: RoutePreferences,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    success: bool,
    pickup: String,
    destination: String,
    routes: Vec<RouteCandidate>,
    ai_insights: RouteInsights,
    generated_at: DateTime<Utc>,
}

pub async fn optimize(
    Extension(api): Extension<DynAPI>,
    JsonBody(params): JsonBody<OptimizeParams>,
) -> Result<Json<OptimizeResponse>, Error> {
    let optimization = api
        .optimize_route(
            params.pickup.clone(),
            params.destination.clone(),
            params.preferences,
        )
        .await?;

    Ok(Json(OptimizeResponse {
        success: true,
        pickup: params.pickup,
        destination: params.destination,
        routes: optimization.routes,
        ai_insights: optimization.insights,
        generated_at: Utc::now(),
    }))
}
