use reqwest::Method;
use richie_http::{response, ApiError, OperationLabel};
use tracing::instrument;

use super::JoanieApi;
use crate::contract::model::{Contract, ContractResourceQuery, Organization, Paginated};

const GET: OperationLabel = OperationLabel::new("GET", "Organizations");
const GET_CONTRACTS: OperationLabel = OperationLabel::new("GET", "Organization Contracts");

const ROUTE: &str = "organizations";

#[derive(Clone, Debug)]
pub struct OrganizationsApi {
    api: JoanieApi,
}

impl OrganizationsApi {
    pub(crate) fn new(api: JoanieApi) -> Self {
        Self { api }
    }

    /// Organizations the authenticated user has access to.
    #[instrument(name = "joanie.organizations.list", skip_all)]
    pub async fn list(&self) -> Result<Vec<Organization>, ApiError> {
        let builder = self.api.request(Method::GET, &self.api.url(&[ROUTE]));
        let resp = self.api.call(builder, GET).await?;
        response::read_json(resp).await
    }

    #[instrument(name = "joanie.organizations.get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Organization, ApiError> {
        let builder = self.api.request(Method::GET, &self.api.url(&[ROUTE, id]));
        let resp = self.api.call(builder, GET).await?;
        response::read_json(resp).await
    }

    /// Contracts signed with the organization, `query.organization_id` is ignored.
    #[instrument(name = "joanie.organizations.contracts", skip(self, query))]
    pub async fn contracts(
        &self,
        id: &str,
        query: &ContractResourceQuery,
    ) -> Result<Paginated<Contract>, ApiError> {
        let query = ContractResourceQuery {
            organization_id: None,
            ..query.clone()
        };
        let builder = self
            .api
            .request(Method::GET, &self.api.url(&[ROUTE, id, "contracts"]))
            .query(&query.to_pairs());
        let resp = self.api.call(builder, GET_CONTRACTS).await?;
        response::read_json(resp).await
    }
}
