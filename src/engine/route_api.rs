use super::helpers::{parse_route_estimates, route_prompt, ROUTE_SYSTEM_PROMPT};
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    api::RouteAPI,
    entities::{RouteCandidate, RouteEstimate, RouteInsights, RouteOptimization, RoutePreferences},
    error::{invalid_input_error, Error},
};

#[async_trait]
impl RouteAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn optimize_route(
        &self,
        pickup: String,
        destination: String,
        preferences: RoutePreferences,
    ) -> Result<RouteOptimization, Error> {
        if pickup.trim().is_empty() || destination.trim().is_empty() {
            return Err(invalid_input_error());
        }

        let prompt = route_prompt(&pickup, &destination, &preferences)?;

        tracing::info!("requesting route optimization");

        // transport failures propagate; only unusable answers fall back
        let answer = self.completions.complete(ROUTE_SYSTEM_PROMPT, &prompt).await?;

        let estimates = match answer.as_deref().and_then(parse_route_estimates) {
            Some(estimates) => estimates,
            None => {
                tracing::warn!("route answer unusable, substituting fallback routes");
                RouteEstimate::fallback_set()
            }
        };

        let now = Utc::now();
        let routes: Vec<RouteCandidate> = estimates
            .into_iter()
            .map(|estimate| RouteCandidate::enhance(estimate, now))
            .collect();

        let insights = RouteInsights::for_routes(&routes);

        Ok(RouteOptimization { routes, insights })
    }
}
