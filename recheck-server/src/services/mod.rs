mod health;
mod recheck;

pub use health::health;
pub use recheck::{
    ApiError, ErrorResponse, OBSERVATION_REQUEST_SENT, RecheckBody, StatusResponse, json_config,
    method_not_allowed, recheck,
};
