mod error;
mod health;
mod router;
mod state;

pub use error::{ErrorBody, method_not_allowed, not_found};
pub use router::system_router;
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
