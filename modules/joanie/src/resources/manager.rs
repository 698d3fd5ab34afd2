use std::future::Future;

use parking_lot::RwLock;
use richie_http::ApiError;
use thiserror::Error;

use super::{
    CreateResource, DeleteResource, Identified, MainResource, ResourceApi, ResourceNames,
    UpdateResource,
};

/// Request state shown next to the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceStates {
    pub error: Option<String>,
    pub is_pending: bool,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{0}")]
    MainEntry(String),
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn message(self, names: ResourceNames) -> String {
        match self {
            Self::Fetch => format!(
                "An error occurred while fetching {}. Please retry later.",
                names.plural
            ),
            Self::Create => format!(
                "An error occurred while creating the {}. Please retry later.",
                names.singular
            ),
            Self::Update => format!(
                "An error occurred while updating the {}. Please retry later.",
                names.singular
            ),
            Self::Delete => format!(
                "An error occurred while deleting the {}. Please retry later.",
                names.singular
            ),
        }
    }
}

/// Banner text for a failed operation: the server's localized message when it
/// sent one, the operation's fixed message otherwise.
fn error_message(op: Operation, names: ResourceNames, error: &ApiError) -> String {
    error
        .as_http()
        .and_then(|e| e.localized_message.clone())
        .unwrap_or_else(|| op.message(names))
}

struct State<T> {
    items: Vec<T>,
    error: Option<String>,
    is_pending: bool,
}

/// Fetched list of one resource plus `{ error, is_pending }`.
///
/// Mutations are not optimistic: the list is refetched once the server
/// accepted the change.
pub struct ResourceManager<A: ResourceApi> {
    api: A,
    state: RwLock<State<A::Item>>,
}

impl<A: ResourceApi> ResourceManager<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: RwLock::new(State {
                items: Vec::new(),
                error: None,
                is_pending: false,
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn items(&self) -> Vec<A::Item> {
        self.state.read().items.clone()
    }

    pub fn states(&self) -> ResourceStates {
        let state = self.state.read();
        ResourceStates {
            error: state.error.clone(),
            is_pending: state.is_pending,
        }
    }

    pub fn find(&self, id: &str) -> Option<A::Item> {
        self.state.read().items.iter().find(|i| i.id() == id).cloned()
    }

    #[tracing::instrument(name = "joanie.resources.refresh", skip_all, fields(resource = A::NAMES.plural))]
    pub async fn refresh(&self) -> Result<(), ResourceError> {
        self.settle(Operation::Fetch, async { Ok(()) }).await
    }

    /// Run `request`, then refetch the list. Pending is raised for the whole
    /// sequence and the error of whichever step failed is recorded.
    async fn settle<T, F>(&self, op: Operation, request: F) -> Result<T, ResourceError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.state.write().is_pending = true;

        let outcome = match request.await {
            Ok(value) => match self.api.list().await {
                Ok(items) => Ok((value, items)),
                Err(e) => Err((Operation::Fetch, e)),
            },
            Err(e) => Err((op, e)),
        };

        let mut state = self.state.write();
        state.is_pending = false;
        match outcome {
            Ok((value, items)) => {
                state.items = items;
                state.error = None;
                Ok(value)
            }
            Err((failed, e)) => {
                let message = error_message(failed, A::NAMES, &e);
                tracing::warn!(resource = A::NAMES.plural, error = %e, "{message}");
                state.error = Some(message);
                Err(e.into())
            }
        }
    }

    fn record_error(&self, error: ResourceError) -> ResourceError {
        self.state.write().error = Some(error.to_string());
        error
    }
}

impl<A: CreateResource> ResourceManager<A> {
    pub async fn create(&self, payload: &A::Payload) -> Result<A::Item, ResourceError> {
        self.settle(Operation::Create, self.api.create(payload)).await
    }

    /// `create`, then hand the new entry to `on_success`.
    pub async fn create_then<F>(
        &self,
        payload: &A::Payload,
        on_success: F,
    ) -> Result<A::Item, ResourceError>
    where
        F: FnOnce(&A::Item),
    {
        let item = self.create(payload).await?;
        on_success(&item);
        Ok(item)
    }
}

impl<A: UpdateResource> ResourceManager<A> {
    pub async fn update(&self, item: &A::Item) -> Result<A::Item, ResourceError> {
        self.settle(Operation::Update, self.api.update(item)).await
    }
}

impl<A: DeleteResource> ResourceManager<A> {
    pub async fn remove(&self, id: &str) -> Result<(), ResourceError> {
        self.settle(Operation::Delete, self.api.delete(id)).await
    }
}

impl<A> ResourceManager<A>
where
    A: UpdateResource,
    A::Item: MainResource,
{
    pub fn main_item(&self) -> Option<A::Item> {
        self.state.read().items.iter().find(|i| i.is_main()).cloned()
    }

    /// Make `id` the main entry.
    pub async fn promote(&self, id: &str) -> Result<A::Item, ResourceError> {
        let mut item = self.known(id)?;
        if item.is_main() {
            return Err(self.record_error(ResourceError::MainEntry(format!(
                "Cannot promote main {}.",
                A::NAMES.singular
            ))));
        }
        item.set_main(true);
        self.update(&item).await
    }
}

impl<A> ResourceManager<A>
where
    A: DeleteResource,
    A::Item: MainResource,
{
    /// Delete `id` unless it is the main entry.
    pub async fn safe_delete(&self, id: &str) -> Result<(), ResourceError> {
        let item = self.known(id)?;
        if item.is_main() {
            return Err(self.record_error(ResourceError::MainEntry(format!(
                "Cannot delete main {}.",
                A::NAMES.singular
            ))));
        }
        self.remove(id).await
    }
}

impl<A: ResourceApi> ResourceManager<A> {
    fn known(&self, id: &str) -> Result<A::Item, ResourceError> {
        self.find(id).ok_or_else(|| {
            self.record_error(ResourceError::NotFound {
                resource: A::NAMES.singular,
                id: id.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use richie_http::HttpError;

    #[derive(Debug, Clone, PartialEq)]
    struct Card {
        id: String,
        is_main: bool,
    }

    impl Identified for Card {
        fn id(&self) -> &str {
            &self.id
        }
    }

    impl MainResource for Card {
        fn is_main(&self) -> bool {
            self.is_main
        }
        fn set_main(&mut self, is_main: bool) {
            self.is_main = is_main;
        }
    }

    #[derive(Default)]
    struct FakeApi {
        items: Mutex<Vec<Card>>,
        fail_with: Mutex<Option<HttpError>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with(items: Vec<Card>) -> Self {
            Self {
                items: Mutex::new(items),
                ..Default::default()
            }
        }

        fn check(&self, call: &str) -> Result<(), ApiError> {
            self.calls.lock().push(call.to_string());
            match self.fail_with.lock().clone() {
                Some(e) => Err(e.into()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ResourceApi for FakeApi {
        type Item = Card;
        const NAMES: ResourceNames = ResourceNames::new("card", "cards");

        async fn list(&self) -> Result<Vec<Card>, ApiError> {
            self.check("list")?;
            Ok(self.items.lock().clone())
        }
    }

    #[async_trait]
    impl CreateResource for FakeApi {
        type Payload = String;

        async fn create(&self, payload: &String) -> Result<Card, ApiError> {
            self.check("create")?;
            let card = Card {
                id: payload.clone(),
                is_main: false,
            };
            self.items.lock().push(card.clone());
            Ok(card)
        }
    }

    #[async_trait]
    impl UpdateResource for FakeApi {
        async fn update(&self, item: &Card) -> Result<Card, ApiError> {
            self.check("update")?;
            let mut items = self.items.lock();
            for existing in items.iter_mut() {
                if item.is_main {
                    existing.is_main = false;
                }
                if existing.id == item.id {
                    *existing = item.clone();
                }
            }
            Ok(item.clone())
        }
    }

    #[async_trait]
    impl DeleteResource for FakeApi {
        async fn delete(&self, id: &str) -> Result<(), ApiError> {
            self.check("delete")?;
            self.items.lock().retain(|c| c.id != id);
            Ok(())
        }
    }

    fn card(id: &str, is_main: bool) -> Card {
        Card {
            id: id.to_string(),
            is_main,
        }
    }

    #[tokio::test]
    async fn test_refresh_loads_items_and_clears_pending() {
        let manager = ResourceManager::new(FakeApi::with(vec![card("a", true)]));
        assert!(manager.items().is_empty());

        manager.refresh().await.unwrap();

        assert_eq!(manager.items(), vec![card("a", true)]);
        assert_eq!(manager.states(), ResourceStates::default());
    }

    #[tokio::test]
    async fn test_create_refetches_and_calls_on_success() {
        let manager = ResourceManager::new(FakeApi::with(vec![card("a", true)]));
        let mut seen = None;

        let created = manager
            .create_then(&"b".to_string(), |c| seen = Some(c.id.clone()))
            .await
            .unwrap();

        assert_eq!(created, card("b", false));
        assert_eq!(seen.as_deref(), Some("b"));
        assert_eq!(manager.items().len(), 2);
        assert_eq!(*manager.api().calls.lock(), vec!["create", "list"]);
    }

    #[tokio::test]
    async fn test_failure_keeps_generic_message() {
        let manager = ResourceManager::new(FakeApi::default());
        *manager.api().fail_with.lock() = Some(HttpError::new(500, "Internal Server Error"));

        let err = manager.create(&"x".to_string()).await.unwrap_err();

        assert!(matches!(err, ResourceError::Api(_)));
        let states = manager.states();
        assert!(!states.is_pending);
        assert_eq!(
            states.error.as_deref(),
            Some("An error occurred while creating the card. Please retry later.")
        );
    }

    #[tokio::test]
    async fn test_failure_prefers_localized_message() {
        let manager = ResourceManager::new(FakeApi::default());
        *manager.api().fail_with.lock() =
            Some(HttpError::new(400, "Bad Request").with_localized_message("Carte refusée"));

        manager.refresh().await.unwrap_err();

        assert_eq!(manager.states().error.as_deref(), Some("Carte refusée"));
    }

    #[tokio::test]
    async fn test_promote_marks_main_and_refetches() {
        let manager =
            ResourceManager::new(FakeApi::with(vec![card("a", true), card("b", false)]));
        manager.refresh().await.unwrap();

        manager.promote("b").await.unwrap();

        assert_eq!(manager.main_item(), Some(card("b", true)));
        assert_eq!(manager.find("a"), Some(card("a", false)));
    }

    #[tokio::test]
    async fn test_promote_main_is_refused() {
        let manager = ResourceManager::new(FakeApi::with(vec![card("a", true)]));
        manager.refresh().await.unwrap();

        let err = manager.promote("a").await.unwrap_err();

        assert!(matches!(err, ResourceError::MainEntry(_)));
        assert_eq!(manager.states().error.as_deref(), Some("Cannot promote main card."));
        assert_eq!(*manager.api().calls.lock(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_safe_delete_refuses_main_entry() {
        let manager =
            ResourceManager::new(FakeApi::with(vec![card("a", true), card("b", false)]));
        manager.refresh().await.unwrap();

        let err = manager.safe_delete("a").await.unwrap_err();
        assert!(matches!(err, ResourceError::MainEntry(_)));
        assert_eq!(manager.items().len(), 2);

        manager.safe_delete("b").await.unwrap();
        assert_eq!(manager.items(), vec![card("a", true)]);
        assert_eq!(manager.states().error, None);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let manager = ResourceManager::new(FakeApi::default());
        let err = manager.safe_delete("missing").await.unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { .. }));
        assert_eq!(manager.states().error.as_deref(), Some("card missing not found"));
    }
}
