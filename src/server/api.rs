//! Public API for the HTTP layer

pub use crate::server::handlers::configure;
pub use crate::server::response::Envelope;
pub use crate::server::state::AppState;
