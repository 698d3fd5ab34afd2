//! Joanie REST client.
//!
//! [`JoanieApi`] holds the base URL and the optional bearer token; each
//! resource family is reached through an owned handle (`addresses()`,
//! `orders()`, ...) so it can be moved into a
//! [`ResourceManager`](crate::resources::ResourceManager).

mod addresses;
mod contracts;
mod credit_cards;
mod orders;
mod organizations;

pub use addresses::AddressesApi;
pub use contracts::{ContractArchivesApi, ContractsApi};
pub use credit_cards::CreditCardsApi;
pub use orders::OrdersApi;
pub use organizations::OrganizationsApi;

use reqwest::{Method, RequestBuilder, Response};
use richie_http::{response, ApiError, OperationLabel, TracedClient};
use runtime::RichieContext;

pub const API_VERSION_PATH: &str = "api/v1.0";

#[derive(Clone, Debug)]
pub struct JoanieApi {
    client: TracedClient,
    base_url: String,
    access_token: Option<String>,
}

impl JoanieApi {
    /// `endpoint` is the Joanie root; routes live under `{endpoint}/api/v1.0`.
    pub fn new(client: TracedClient, endpoint: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/{}", endpoint.trim_end_matches('/'), API_VERSION_PATH),
            access_token: None,
        }
    }

    /// Client for the context's `joanie_backend`, if one is configured.
    pub fn from_context(client: TracedClient, context: &RichieContext) -> Result<Self, ApiError> {
        let endpoint = context
            .joanie_endpoint()
            .ok_or_else(|| ApiError::configuration("no joanie_backend configured"))?;
        Ok(Self::new(client, endpoint))
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn addresses(&self) -> AddressesApi {
        AddressesApi::new(self.clone())
    }

    pub fn credit_cards(&self) -> CreditCardsApi {
        CreditCardsApi::new(self.clone())
    }

    pub fn orders(&self) -> OrdersApi {
        OrdersApi::new(self.clone())
    }

    pub fn contracts(&self) -> ContractsApi {
        ContractsApi::new(self.clone())
    }

    pub fn contract_archives(&self) -> ContractArchivesApi {
        ContractArchivesApi::new(self.clone())
    }

    pub fn organizations(&self) -> OrganizationsApi {
        OrganizationsApi::new(self.clone())
    }

    /// `{base}/{segments...}/`, Joanie routes always end with a slash.
    pub(crate) fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(segment.trim_matches('/'));
        }
        url.push('/');
        url
    }

    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn call_raw(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        Ok(self.client.send(builder).await?)
    }

    /// Send and fail on any non-success status.
    pub(crate) async fn call(
        &self,
        builder: RequestBuilder,
        label: OperationLabel,
    ) -> Result<Response, ApiError> {
        let resp = self.client.send(builder).await?;
        response::ensure_success(resp, label).await
    }
}
