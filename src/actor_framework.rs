//! Generic actor owning a keyed collection of entities, and its client.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::storage::{persist_committed, SharedStore};

// --- Entities ---

/// Failures raised by the framework itself rather than by an entity.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

/// A record kept by a [`ResourceActor`], with its own create parameters,
/// actions and error type.
pub trait Entity: Clone + PartialEq + Serialize + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;

    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Domain error; framework failures convert into it.
    type Error: Send + Sync + Debug + From<FrameworkError>;

    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and creation parameters
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    fn on_create(&mut self) -> Result<(), Self::Error> { Ok(()) }

    /// Checks an entity loaded from storage; [`ResourceActor::restore`]
    /// drops the ones that fail.
    fn check_restored(&self) -> Result<(), Self::Error> { Ok(()) }

    /// Handle a custom domain-specific action.
    ///
    /// Runs against a draft copy; the stored entity is replaced only on `Ok`.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

// --- Requests ---

pub type Response<T, E> = oneshot::Sender<Result<T, E>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        respond_to: Response<Vec<T>, T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
}

// --- Actor ---

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    /// Insertion order of `store`, used for listings and snapshots.
    order: Vec<T::Id>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
    persistence: Option<(SharedStore, &'static str)>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            order: Vec::new(),
            next_id_fn: Box::new(next_id_fn),
            persistence: None,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Seeds the actor with previously persisted entities, keeping their order.
    /// Later duplicates of an id and entities failing
    /// [`Entity::check_restored`] are ignored.
    pub fn restore(mut self, entities: impl IntoIterator<Item = T>) -> Self {
        for entity in entities {
            let id = entity.id().clone();
            if self.store.contains_key(&id) {
                warn!(id = %id, "Skipping duplicate entity during restore");
                continue;
            }
            if let Err(e) = entity.check_restored() {
                warn!(id = %id, error = ?e, "Skipping invalid entity during restore");
                continue;
            }
            self.order.push(id.clone());
            self.store.insert(id, entity);
        }
        self
    }

    /// Writes the whole collection to `slot` after every committed change.
    pub fn persist_to(mut self, store: SharedStore, slot: &'static str) -> Self {
        self.persistence = Some((store, slot));
        self
    }

    fn snapshot(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.store.get(id))
            .cloned()
            .collect()
    }

    fn persist(&self) {
        if let Some((store, slot)) = &self.persistence {
            persist_committed(store.as_ref(), slot, &self.snapshot());
        }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let id = (self.next_id_fn)();
                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create() {
                                let _ = respond_to.send(Err(e));
                                continue;
                            }
                            debug!(id = %id, "Entity created");
                            self.order.push(id.clone());
                            self.store.insert(id, item.clone());
                            self.persist();
                            let _ = respond_to.send(Ok(item));
                        }
                        Err(e) => { let _ = respond_to.send(Err(e)); }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.snapshot()));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let Some(item) = self.store.get_mut(&id) else {
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string()).into()));
                        continue;
                    };
                    let mut draft = item.clone();
                    match draft.handle_action(action) {
                        Ok(result) => {
                            let changed = draft != *item;
                            *item = draft;
                            if changed {
                                self.persist();
                            }
                            let _ = respond_to.send(Ok(result));
                        }
                        Err(e) => { let _ = respond_to.send(Err(e)); }
                    }
                }
            }
        }
    }
}

// --- Client ---

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

// Derived Clone would require `T: Clone` on every associated type.
impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(build(respond_to))
            .await.map_err(|_| T::Error::from(FrameworkError::ActorClosed))?;
        response.await.map_err(|_| T::Error::from(FrameworkError::ActorDropped))?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, T::Error> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{load_slot, MemoryStore};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        id: String,
        value: u32,
    }

    #[derive(Debug)]
    struct CounterCreate {
        start: u32,
    }

    #[derive(Debug)]
    enum CounterAction {
        Bump,
        /// Bumps twice then fails, to check nothing sticks.
        BumpThenFail,
        Read,
    }

    #[derive(Debug, PartialEq)]
    enum CounterError {
        Framework(FrameworkError),
        Refused,
    }

    impl From<FrameworkError> for CounterError {
        fn from(e: FrameworkError) -> Self {
            CounterError::Framework(e)
        }
    }

    impl Entity for Counter {
        type Id = String;
        type CreateParams = CounterCreate;
        type Action = CounterAction;
        type ActionResult = u32;
        type Error = CounterError;

        fn id(&self) -> &String { &self.id }

        fn from_create_params(id: String, params: CounterCreate) -> Result<Self, CounterError> {
            Ok(Self { id, value: params.start })
        }

        fn handle_action(&mut self, action: CounterAction) -> Result<u32, CounterError> {
            match action {
                CounterAction::Bump => {
                    self.value += 1;
                    Ok(self.value)
                }
                CounterAction::BumpThenFail => {
                    self.value += 2;
                    Err(CounterError::Refused)
                }
                CounterAction::Read => Ok(self.value),
            }
        }

        fn check_restored(&self) -> Result<(), CounterError> {
            if self.value > 100 { Err(CounterError::Refused) } else { Ok(()) }
        }
    }

    fn spawn_counters(store: Option<Arc<MemoryStore>>) -> ResourceClient<Counter> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("counter_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (mut actor, client) = ResourceActor::new(10, next_id);
        if let Some(store) = store {
            actor = actor.persist_to(store, "counters");
        }
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = spawn_counters(None);

        let created = client.create(CounterCreate { start: 5 }).await.unwrap();
        assert_eq!(created.id, "counter_1");

        let value = client.perform_action(created.id.clone(), CounterAction::Bump).await.unwrap();
        assert_eq!(value, 6);

        let stored = client.get(created.id.clone()).await.unwrap().unwrap();
        assert_eq!(stored.value, 6);
    }

    #[tokio::test]
    async fn test_failed_action_leaves_entity_untouched() {
        let client = spawn_counters(None);
        let created = client.create(CounterCreate { start: 1 }).await.unwrap();

        let err = client.perform_action(created.id.clone(), CounterAction::BumpThenFail).await.unwrap_err();
        assert_eq!(err, CounterError::Refused);

        let value = client.perform_action(created.id, CounterAction::Read).await.unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_maps_to_not_found() {
        let client = spawn_counters(None);
        let err = client.perform_action("nope".to_string(), CounterAction::Read).await.unwrap_err();
        assert_eq!(err, CounterError::Framework(FrameworkError::NotFound("nope".to_string())));
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order_and_persists() {
        let store = MemoryStore::shared();
        let client = spawn_counters(Some(store.clone()));
        for start in [3, 1, 2] {
            client.create(CounterCreate { start }).await.unwrap();
        }

        let values: Vec<u32> = client.list().await.unwrap().into_iter().map(|c| c.value).collect();
        assert_eq!(values, vec![3, 1, 2]);

        let persisted: Vec<Counter> = load_slot(&*store, "counters").unwrap().unwrap();
        assert_eq!(persisted.len(), 3);
        assert_eq!(persisted[0].id, "counter_1");
    }

    #[tokio::test]
    async fn test_restore_seeds_store() {
        let (actor, client) = ResourceActor::<Counter>::new(10, || "fresh".to_string());
        let actor = actor.restore(vec![
            Counter { id: "old".into(), value: 9 },
            Counter { id: "old".into(), value: 1 },
        ]);
        tokio::spawn(actor.run());

        let all = client.list().await.unwrap();
        assert_eq!(all, vec![Counter { id: "old".into(), value: 9 }]);
    }

    #[tokio::test]
    async fn test_restore_skips_entities_failing_checks() {
        let (actor, client) = ResourceActor::<Counter>::new(10, || "fresh".to_string());
        let actor = actor.restore(vec![
            Counter { id: "bad".into(), value: 500 },
            Counter { id: "good".into(), value: 7 },
        ]);
        tokio::spawn(actor.run());

        let all = client.list().await.unwrap();
        assert_eq!(all, vec![Counter { id: "good".into(), value: 7 }]);
        assert_eq!(client.get("bad".to_string()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_closed_actor_reports_actor_closed() {
        let (actor, client) = ResourceActor::<Counter>::new(1, || "x".to_string());
        drop(actor);
        let err = client.list().await.unwrap_err();
        assert_eq!(err, CounterError::Framework(FrameworkError::ActorClosed));
    }
}
