//! Resource traits implemented by the Joanie API handles, and the
//! [`ResourceManager`] that keeps a fetched list plus its request state.

mod manager;

pub use manager::{ResourceError, ResourceManager, ResourceStates};

use async_trait::async_trait;
use richie_http::ApiError;

use crate::contract::model::{Address, Contract, CreditCard, Order};

/// Names used in user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceNames {
    pub singular: &'static str,
    pub plural: &'static str,
}

impl ResourceNames {
    pub const fn new(singular: &'static str, plural: &'static str) -> Self {
        Self { singular, plural }
    }
}

pub trait Identified {
    fn id(&self) -> &str;
}

/// Resources with a single "main" entry (default address, default card).
pub trait MainResource: Identified {
    fn is_main(&self) -> bool;
    fn set_main(&mut self, is_main: bool);
}

#[async_trait]
pub trait ResourceApi: Send + Sync {
    type Item: Identified + Clone + Send + Sync + 'static;

    const NAMES: ResourceNames;

    async fn list(&self) -> Result<Vec<Self::Item>, ApiError>;
}

#[async_trait]
pub trait CreateResource: ResourceApi {
    type Payload: Send + Sync;

    async fn create(&self, payload: &Self::Payload) -> Result<Self::Item, ApiError>;
}

#[async_trait]
pub trait UpdateResource: ResourceApi {
    async fn update(&self, item: &Self::Item) -> Result<Self::Item, ApiError>;
}

#[async_trait]
pub trait DeleteResource: ResourceApi {
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

impl Identified for Address {
    fn id(&self) -> &str {
        &self.id
    }
}

impl MainResource for Address {
    fn is_main(&self) -> bool {
        self.is_main
    }

    fn set_main(&mut self, is_main: bool) {
        self.is_main = is_main;
    }
}

impl Identified for CreditCard {
    fn id(&self) -> &str {
        &self.id
    }
}

impl MainResource for CreditCard {
    fn is_main(&self) -> bool {
        self.is_main
    }

    fn set_main(&mut self, is_main: bool) {
        self.is_main = is_main;
    }
}

impl Identified for Order {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Contract {
    fn id(&self) -> &str {
        &self.id
    }
}
