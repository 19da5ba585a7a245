mod routes;
mod server;
mod state;

pub use routes::{router, ApiError};
pub use server::GatewayServer;
pub use state::AppState;
