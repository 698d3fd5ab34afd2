use async_trait::async_trait;
use reqwest::Method;
use richie_http::{response, ApiError, OperationLabel};
use tracing::instrument;

use super::JoanieApi;
use crate::contract::model::{Address, AddressPayload};
use crate::resources::{
    CreateResource, DeleteResource, ResourceApi, ResourceNames, UpdateResource,
};

const GET: OperationLabel = OperationLabel::new("GET", "Addresses");
const CREATE: OperationLabel = OperationLabel::new("CREATE", "Addresses");
const UPDATE: OperationLabel = OperationLabel::new("UPDATE", "Addresses");
const DELETE: OperationLabel = OperationLabel::new("DELETE", "Addresses");

const ROUTE: &str = "addresses";

#[derive(Clone, Debug)]
pub struct AddressesApi {
    api: JoanieApi,
}

impl AddressesApi {
    pub(crate) fn new(api: JoanieApi) -> Self {
        Self { api }
    }

    #[instrument(name = "joanie.addresses.list", skip_all)]
    pub async fn list(&self) -> Result<Vec<Address>, ApiError> {
        let builder = self.api.request(Method::GET, &self.api.url(&[ROUTE]));
        let resp = self.api.call(builder, GET).await?;
        response::read_json(resp).await
    }

    #[instrument(name = "joanie.addresses.get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Address, ApiError> {
        let builder = self.api.request(Method::GET, &self.api.url(&[ROUTE, id]));
        let resp = self.api.call(builder, GET).await?;
        response::read_json(resp).await
    }

    #[instrument(name = "joanie.addresses.create", skip_all)]
    pub async fn create(&self, payload: &AddressPayload) -> Result<Address, ApiError> {
        let builder = self
            .api
            .request(Method::POST, &self.api.url(&[ROUTE]))
            .json(payload);
        let resp = self.api.call(builder, CREATE).await?;
        let address: Address = response::read_json(resp).await?;
        tracing::info!(id = %address.id, "address created");
        Ok(address)
    }

    #[instrument(name = "joanie.addresses.update", skip_all, fields(id = %address.id))]
    pub async fn update(&self, address: &Address) -> Result<Address, ApiError> {
        let builder = self
            .api
            .request(Method::PUT, &self.api.url(&[ROUTE, &address.id]))
            .json(&AddressPayload::from(address));
        let resp = self.api.call(builder, UPDATE).await?;
        response::read_json(resp).await
    }

    #[instrument(name = "joanie.addresses.delete", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.api.request(Method::DELETE, &self.api.url(&[ROUTE, id]));
        self.api.call(builder, DELETE).await?;
        Ok(())
    }
}

#[async_trait]
impl ResourceApi for AddressesApi {
    type Item = Address;

    const NAMES: ResourceNames = ResourceNames::new("address", "addresses");

    async fn list(&self) -> Result<Vec<Address>, ApiError> {
        AddressesApi::list(self).await
    }
}

#[async_trait]
impl CreateResource for AddressesApi {
    type Payload = AddressPayload;

    async fn create(&self, payload: &AddressPayload) -> Result<Address, ApiError> {
        AddressesApi::create(self, payload).await
    }
}

#[async_trait]
impl UpdateResource for AddressesApi {
    async fn update(&self, item: &Address) -> Result<Address, ApiError> {
        AddressesApi::update(self, item).await
    }
}

#[async_trait]
impl DeleteResource for AddressesApi {
    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        AddressesApi::delete(self, id).await
    }
}
