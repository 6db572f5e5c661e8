//! Domain ports for the hexagonal boundary.

mod auth_gateway;
mod confession_store;

#[cfg(test)]
pub use auth_gateway::MockAuthGateway;
pub use auth_gateway::{AuthGateway, AuthGatewayError, FixtureAuthGateway};
#[cfg(test)]
pub use confession_store::MockConfessionStore;
pub use confession_store::{
    ConfessionStore, ConfessionStoreError, FixtureConfessionStore, LIST_CAP,
};
