pub mod error;
pub mod handlers;
pub mod health;
pub mod server;
pub mod state;

pub use error::{ApiError, ErrorBody};
pub use health::HealthResponse;
pub use server::ApiServer;
pub use state::AppState;
