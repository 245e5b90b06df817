pub mod config;
pub mod extractors;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod principal;

pub use config::AuthConfig;
pub use extractors::{
    AdminPrincipal, ClientPrincipal, CourierPrincipal, ManagerPrincipal, PrincipalExtractor,
};
pub use middleware::AuthLayer;
pub use principal::Principal;
