pub mod auth_handlers;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod price_handlers;
pub mod responses;
pub mod routes;
pub mod state;
pub mod ticker_handlers;
pub mod user_handlers;

pub use errors::ApiError;
pub use openapi::ApiDoc;
pub use responses::*;
pub use routes::create_router;
pub use state::AppState;
