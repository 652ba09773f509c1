mod error_response;
mod health;
mod predict;

pub use error_response::{ErrorResponse, error_response, panic_response};
pub use health::{HealthResponse, health_handler};
pub use predict::{
    MISSING_FIELDS_MESSAGE, PredictRequest, PredictResponse, predict_handler,
};
