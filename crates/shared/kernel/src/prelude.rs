pub use crate::config::load_config;
pub use crate::security::{IdGuardError, ObjectIdGuard};
pub use crate::server::{ApiState, ErrorBody, system_router};
pub use svcd_domain::config::ApiConfig;
pub use svcd_domain::registry::{DomainRegistry, ServiceDomain};
