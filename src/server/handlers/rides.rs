use axum::extract::{Extension, Json, Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::api::BookingRequest;
use crate::auth::User;
use crate::entities::{Ride, RouteInsights};
use crate::error::Error;
use crate::server::extract::JsonBody;
use crate::server::DynAPI;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    success: bool,
    message: &'static str,
    ride: Ride,
    ai_optimization: Option<RouteInsights>,
}

#[derive(Serialize)]
pub struct RideResponse {
    ride: Ride,
}

#[derive(Serialize)]
pub struct RideListResponse {
    rides: Vec<Ride>,
    total: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    ride_id: Option<String>,
}

pub async fn book(
    Extension(api): Extension<DynAPI>,
    user: User,
    JsonBody(request): JsonBody<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), Error> {
    let booking = api.book_ride(user, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            success: true,
            message: "Ride booked successfully",
            ride: booking.ride,
            ai_optimization: booking.ai_optimization,
        }),
    ))
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
    Query(params): Query<ListParams>,
) -> Result<Response, Error> {
    if let Some(id) = params.ride_id {
        let ride = api.find_ride(user, id).await?;

        return Ok(Json(RideResponse { ride }).into_response());
    }

    let rides = api.list_rides(user).await?;
    let total = rides.len();

    Ok(Json(RideListResponse { rides, total }).into_response())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<RideResponse>, Error> {
    let ride = api.find_ride(user, id).await?;

    Ok(Json(RideResponse { ride }))
}
