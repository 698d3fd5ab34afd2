use async_trait::async_trait;
use reqwest::Method;
use richie_http::{response, ApiError, OperationLabel};
use tracing::instrument;

use super::JoanieApi;
use crate::contract::model::{Order, OrderPayload, OrderQuery, OrderState, Paginated};
use crate::resources::{CreateResource, ResourceApi, ResourceNames};

const GET: OperationLabel = OperationLabel::new("GET", "Orders");
const CREATE: OperationLabel = OperationLabel::new("CREATE", "Orders");
const ABORT: OperationLabel = OperationLabel::new("ABORT", "Orders");

const ROUTE: &str = "orders";

#[derive(Clone, Debug)]
pub struct OrdersApi {
    api: JoanieApi,
    query: OrderQuery,
}

impl OrdersApi {
    pub(crate) fn new(api: JoanieApi) -> Self {
        Self {
            api,
            query: OrderQuery::default(),
        }
    }

    /// Handle whose resource listing applies `query`.
    pub fn filtered(mut self, query: OrderQuery) -> Self {
        self.query = query;
        self
    }

    #[instrument(name = "joanie.orders.list", skip_all)]
    pub async fn list(&self, query: &OrderQuery) -> Result<Paginated<Order>, ApiError> {
        let builder = self
            .api
            .request(Method::GET, &self.api.url(&[ROUTE]))
            .query(&order_query_pairs(query));
        let resp = self.api.call(builder, GET).await?;
        response::read_json(resp).await
    }

    #[instrument(name = "joanie.orders.get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Order, ApiError> {
        let builder = self.api.request(Method::GET, &self.api.url(&[ROUTE, id]));
        let resp = self.api.call(builder, GET).await?;
        response::read_json(resp).await
    }

    #[instrument(name = "joanie.orders.create", skip_all, fields(product_id = %payload.product_id))]
    pub async fn create(&self, payload: &OrderPayload) -> Result<Order, ApiError> {
        let builder = self
            .api
            .request(Method::POST, &self.api.url(&[ROUTE]))
            .json(payload);
        let resp = self.api.call(builder, CREATE).await?;
        let order: Order = response::read_json(resp).await?;
        tracing::info!(id = %order.id, state = ?order.state, "order created");
        Ok(order)
    }

    #[instrument(name = "joanie.orders.abort", skip(self))]
    pub async fn abort(&self, id: &str) -> Result<(), ApiError> {
        let builder = self
            .api
            .request(Method::POST, &self.api.url(&[ROUTE, id, "abort"]));
        self.api.call(builder, ABORT).await?;
        Ok(())
    }
}

fn order_query_pairs(query: &OrderQuery) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(v) = &query.product_id {
        pairs.push(("product_id", v.clone()));
    }
    if let Some(v) = &query.course_code {
        pairs.push(("course_code", v.clone()));
    }
    if let Some(v) = &query.enrollment_id {
        pairs.push(("enrollment_id", v.clone()));
    }
    for state in &query.states {
        if let Some(name) = order_state_name(*state) {
            pairs.push(("state", name));
        }
    }
    if let Some(page) = query.page {
        pairs.push(("page", page.to_string()));
    }
    if let Some(size) = query.page_size {
        pairs.push(("page_size", size.to_string()));
    }
    pairs
}

fn order_state_name(state: OrderState) -> Option<String> {
    match serde_json::to_value(state) {
        Ok(serde_json::Value::String(name)) if state != OrderState::Unknown => Some(name),
        _ => None,
    }
}

#[async_trait]
impl ResourceApi for OrdersApi {
    type Item = Order;

    const NAMES: ResourceNames = ResourceNames::new("order", "orders");

    async fn list(&self) -> Result<Vec<Order>, ApiError> {
        Ok(OrdersApi::list(self, &self.query).await?.results)
    }
}

#[async_trait]
impl CreateResource for OrdersApi {
    type Payload = OrderPayload;

    async fn create(&self, payload: &OrderPayload) -> Result<Order, ApiError> {
        OrdersApi::create(self, payload).await
    }
}
