//! Commerce backend ("Joanie") adapter.
//!
//! - [`api::JoanieApi`]: REST client for addresses, credit cards, orders,
//!   contracts, contract archives and organizations
//! - [`resources::ResourceManager`]: list state with pending/error flags
//!   wrapping a resource API, as consumed by dashboard views
//! - [`contract_archive`]: local cache of generated contract archive ids

// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::model;

pub mod api;
pub mod contract_archive;
pub mod resource_link;
pub mod resources;

pub use api::JoanieApi;
pub use resource_link::{extract_product, ProductLink};
pub use resources::{ResourceManager, ResourceStates};
