mod driver;
mod preferences;
mod ride;
mod route;

pub use driver::{Coordinates, Driver, Vehicle};
pub use preferences::{Priority, RoutePreferences};
pub use ride::{Features, Pricing, Ride, RideDraft, Status as RideStatus, Timeline};
pub use route::{
    ChosenRoute, RealTimeFactors, RouteCandidate, RouteEstimate, RouteInsights,
    RouteOptimization,
};

pub(crate) use route::RouteSet;
