use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use richie_http::{response, ApiError, HttpStatusCode, OperationLabel};
use tracing::instrument;

use super::JoanieApi;
use crate::contract::model::{
    Contract, ContractArchiveCreated, ContractArchiveRequest, ContractResourceQuery, Paginated,
};
use crate::resources::{ResourceApi, ResourceNames};

const GET: OperationLabel = OperationLabel::new("GET", "Contracts");
const DOWNLOAD: OperationLabel = OperationLabel::new("DOWNLOAD", "Contracts");
const CREATE_ARCHIVE: OperationLabel = OperationLabel::new("CREATE", "Contract Archive");
const CHECK_ARCHIVE: OperationLabel = OperationLabel::new("CHECK", "Contract Archive");
const GET_ARCHIVE: OperationLabel = OperationLabel::new("GET", "Contract Archive");

const ROUTE: &str = "contracts";
const ARCHIVE_ROUTE: &str = "zip-archive";

#[derive(Clone, Debug)]
pub struct ContractsApi {
    api: JoanieApi,
    query: ContractResourceQuery,
}

impl ContractsApi {
    pub(crate) fn new(api: JoanieApi) -> Self {
        Self {
            api,
            query: ContractResourceQuery::default(),
        }
    }

    /// Handle whose resource listing applies `query`.
    pub fn filtered(mut self, query: ContractResourceQuery) -> Self {
        self.query = query;
        self
    }

    #[instrument(name = "joanie.contracts.list", skip_all)]
    pub async fn list(
        &self,
        query: &ContractResourceQuery,
    ) -> Result<Paginated<Contract>, ApiError> {
        let builder = self
            .api
            .request(Method::GET, &self.api.url(&[ROUTE]))
            .query(&query.to_pairs());
        let resp = self.api.call(builder, GET).await?;
        response::read_json(resp).await
    }

    #[instrument(name = "joanie.contracts.get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Contract, ApiError> {
        let builder = self.api.request(Method::GET, &self.api.url(&[ROUTE, id]));
        let resp = self.api.call(builder, GET).await?;
        response::read_json(resp).await
    }

    /// Signed contract document.
    #[instrument(name = "joanie.contracts.download", skip(self))]
    pub async fn download(&self, id: &str) -> Result<Bytes, ApiError> {
        let builder = self
            .api
            .request(Method::GET, &self.api.url(&[ROUTE, id, "download"]));
        let resp = self.api.call(builder, DOWNLOAD).await?;
        response::read_bytes(resp).await
    }
}

#[async_trait]
impl ResourceApi for ContractsApi {
    type Item = Contract;

    const NAMES: ResourceNames = ResourceNames::new("contract", "contracts");

    async fn list(&self) -> Result<Vec<Contract>, ApiError> {
        Ok(ContractsApi::list(self, &self.query).await?.results)
    }
}

/// Zip archives of signed contracts, generated asynchronously by Joanie.
#[derive(Clone, Debug)]
pub struct ContractArchivesApi {
    api: JoanieApi,
}

impl ContractArchivesApi {
    pub(crate) fn new(api: JoanieApi) -> Self {
        Self { api }
    }

    /// Ask for an archive; returns its id, the last segment of the returned url.
    #[instrument(name = "joanie.contract_archives.create", skip_all)]
    pub async fn create(&self, request: &ContractArchiveRequest) -> Result<String, ApiError> {
        let builder = self
            .api
            .request(Method::POST, &self.api.url(&[ROUTE, ARCHIVE_ROUTE]))
            .json(request);
        let resp = self.api.call(builder, CREATE_ARCHIVE).await?;
        let created: ContractArchiveCreated = response::read_json(resp).await?;

        let id = archive_id_from_url(&created.url).ok_or_else(|| {
            ApiError::unexpected_payload(format!("archive url {:?}", created.url))
        })?;
        tracing::info!(%id, "contract archive requested");
        Ok(id)
    }

    /// `true` once the archive is generated, `false` while it does not exist.
    #[instrument(name = "joanie.contract_archives.check", skip(self))]
    pub async fn check(&self, id: &str) -> Result<bool, ApiError> {
        let builder = self
            .api
            .request(Method::OPTIONS, &self.api.url(&[ROUTE, ARCHIVE_ROUTE, id]));
        let resp = self.api.call_raw(builder).await?;

        if resp.status() == HttpStatusCode::NotFound {
            return Ok(false);
        }
        response::ensure_success(resp, CHECK_ARCHIVE).await?;
        Ok(true)
    }

    #[instrument(name = "joanie.contract_archives.get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Bytes, ApiError> {
        let builder = self
            .api
            .request(Method::GET, &self.api.url(&[ROUTE, ARCHIVE_ROUTE, id]));
        let resp = self.api.call(builder, GET_ARCHIVE).await?;
        response::read_bytes(resp).await
    }
}

fn archive_id_from_url(url: &str) -> Option<String> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.contains(':'))
        .map(str::to_string)
}
