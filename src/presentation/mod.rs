pub mod config;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use config::{Environment, Settings};
pub use router::create_router;
pub use server::{ServerError, run};
pub use state::AppState;
