use async_trait::async_trait;
use reqwest::Method;
use richie_http::{response, ApiError, OperationLabel};
use tracing::instrument;

use super::JoanieApi;
use crate::contract::model::{CreditCard, CreditCardPatch};
use crate::resources::{DeleteResource, ResourceApi, ResourceNames, UpdateResource};

const GET: OperationLabel = OperationLabel::new("GET", "Credit Cards");
const UPDATE: OperationLabel = OperationLabel::new("UPDATE", "Credit Cards");
const DELETE: OperationLabel = OperationLabel::new("DELETE", "Credit Cards");

const ROUTE: &str = "credit-cards";

/// Credit cards are registered by the payment provider, so there is no
/// `create` here.
#[derive(Clone, Debug)]
pub struct CreditCardsApi {
    api: JoanieApi,
}

impl CreditCardsApi {
    pub(crate) fn new(api: JoanieApi) -> Self {
        Self { api }
    }

    #[instrument(name = "joanie.credit_cards.list", skip_all)]
    pub async fn list(&self) -> Result<Vec<CreditCard>, ApiError> {
        let builder = self.api.request(Method::GET, &self.api.url(&[ROUTE]));
        let resp = self.api.call(builder, GET).await?;
        response::read_json(resp).await
    }

    #[instrument(name = "joanie.credit_cards.get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<CreditCard, ApiError> {
        let builder = self.api.request(Method::GET, &self.api.url(&[ROUTE, id]));
        let resp = self.api.call(builder, GET).await?;
        response::read_json(resp).await
    }

    #[instrument(name = "joanie.credit_cards.update", skip_all, fields(id = %card.id))]
    pub async fn update(&self, card: &CreditCard) -> Result<CreditCard, ApiError> {
        let builder = self
            .api
            .request(Method::PUT, &self.api.url(&[ROUTE, &card.id]))
            .json(&CreditCardPatch::from(card));
        let resp = self.api.call(builder, UPDATE).await?;
        response::read_json(resp).await
    }

    #[instrument(name = "joanie.credit_cards.delete", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.api.request(Method::DELETE, &self.api.url(&[ROUTE, id]));
        self.api.call(builder, DELETE).await?;
        Ok(())
    }
}

#[async_trait]
impl ResourceApi for CreditCardsApi {
    type Item = CreditCard;

    const NAMES: ResourceNames = ResourceNames::new("credit card", "credit cards");

    async fn list(&self) -> Result<Vec<CreditCard>, ApiError> {
        CreditCardsApi::list(self).await
    }
}

#[async_trait]
impl UpdateResource for CreditCardsApi {
    async fn update(&self, item: &CreditCard) -> Result<CreditCard, ApiError> {
        CreditCardsApi::update(self, item).await
    }
}

#[async_trait]
impl DeleteResource for CreditCardsApi {
    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        CreditCardsApi::delete(self, id).await
    }
}
