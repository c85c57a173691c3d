//! Adapters keyed by concrete type, with first-match dispatch.

use crate::{Adapter, Error, Request, Result, exchange};
use futures_core::Stream;
use futures_util::{
    StreamExt,
    future::BoxFuture,
    stream::{self, BoxStream},
};
use parking_lot::RwLock;
use std::{
    any::{Any, TypeId, type_name},
    sync::Arc,
};

type Erased = Box<dyn Any + Send>;

/// Routes requests to the first registered adapter that accepts them.
///
/// Adapters are identified by their concrete type; registering a second
/// instance of the same type replaces the first in place, keeping its
/// position. Dispatch is a linear scan in registration order, so when two
/// adapters could both claim a request the earlier one wins.
///
/// The lock is only held while scanning or mutating the list, never while
/// a call is in flight.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<Vec<Registered>>>,
}

struct Registered {
    id: TypeId,
    entry: Arc<dyn Entry>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter, replacing any adapter of the same type.
    pub fn register<A: Adapter>(&self, adapter: A) {
        let id = TypeId::of::<A>();
        let entry: Arc<dyn Entry> = Arc::new(Slot(Arc::new(adapter)));
        let mut adapters = self.inner.write();
        match adapters.iter_mut().find(|r| r.id == id) {
            Some(registered) => {
                tracing::debug!("replacing adapter {}", type_name::<A>());
                registered.entry = entry;
            }
            None => {
                tracing::debug!("registering adapter {}", type_name::<A>());
                adapters.push(Registered { id, entry });
            }
        }
    }

    /// Direct access to a registered adapter, for vendor-specific calls.
    pub fn lookup<A: Adapter>(&self) -> Option<Arc<A>> {
        let id = TypeId::of::<A>();
        let adapters = self.inner.read();
        adapters
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.entry.adapter().downcast::<A>().ok())
    }

    /// Remove the adapter of type `A`. Returns whether one was registered.
    pub fn remove<A: Adapter>(&self) -> bool {
        let id = TypeId::of::<A>();
        let mut adapters = self.inner.write();
        let before = adapters.len();
        adapters.retain(|r| r.id != id);
        adapters.len() != before
    }

    /// Adapter type names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.inner.read().iter().map(|r| r.entry.name()).collect()
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no adapter is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Perform a non-streaming exchange on the matching adapter.
    pub async fn perform<R: Request>(&self, request: R) -> Result<R::Response> {
        let entry = self.route(&request).ok_or(Error::UnhandledRequest)?;
        let response = entry.perform(Box::new(request)).await?;
        response
            .downcast::<R::Response>()
            .map(|r| *r)
            .map_err(|_| Error::UnhandledRequest)
    }

    /// Stream an exchange on the matching adapter.
    ///
    /// When no adapter matches, the stream yields a single
    /// [`Error::UnhandledRequest`] instead of failing up front.
    pub fn stream<R: Request>(
        &self,
        request: R,
    ) -> impl Stream<Item = Result<R::Response>> + Send + use<R> {
        let units = match self.route(&request) {
            Some(entry) => entry.stream(Box::new(request)),
            None => stream::once(async { Err(Error::UnhandledRequest) }).boxed(),
        };
        units.map(|item| {
            item.and_then(|response| {
                response
                    .downcast::<R::Response>()
                    .map(|r| *r)
                    .map_err(|_| Error::UnhandledRequest)
            })
        })
    }

    /// The first entry accepting the request.
    fn route<R: Request>(&self, request: &R) -> Option<Arc<dyn Entry>> {
        let adapters = self.inner.read();
        let entry = adapters
            .iter()
            .find(|r| r.entry.accepts(request))
            .map(|r| r.entry.clone());
        match &entry {
            Some(entry) => tracing::debug!("routing {} to {}", request.model(), entry.name()),
            None => tracing::debug!("no adapter accepts {}", request.model()),
        }
        entry
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("adapters", &self.names())
            .finish()
    }
}

/// An adapter with its request type erased.
trait Entry: Send + Sync {
    fn name(&self) -> &'static str;

    fn adapter(&self) -> Arc<dyn Any + Send + Sync>;

    fn accepts(&self, request: &dyn Any) -> bool;

    fn perform(&self, request: Erased) -> BoxFuture<'static, Result<Erased>>;

    fn stream(&self, request: Erased) -> BoxStream<'static, Result<Erased>>;
}

struct Slot<A>(Arc<A>);

impl<A: Adapter> Entry for Slot<A> {
    fn name(&self) -> &'static str {
        type_name::<A>()
    }

    fn adapter(&self) -> Arc<dyn Any + Send + Sync> {
        self.0.clone()
    }

    fn accepts(&self, request: &dyn Any) -> bool {
        request
            .downcast_ref::<A::Request>()
            .is_some_and(|request| self.0.accepts(request))
    }

    fn perform(&self, request: Erased) -> BoxFuture<'static, Result<Erased>> {
        let adapter = self.0.clone();
        Box::pin(async move {
            let request = request
                .downcast::<A::Request>()
                .map_err(|_| Error::UnhandledRequest)?;
            let response = exchange::perform(adapter.as_ref(), *request).await?;
            Ok(Box::new(response) as Erased)
        })
    }

    fn stream(&self, request: Erased) -> BoxStream<'static, Result<Erased>> {
        match request.downcast::<A::Request>() {
            Ok(request) => exchange::stream(self.0.clone(), *request)
                .map(|item| item.map(|response| Box::new(response) as Erased))
                .boxed(),
            Err(_) => stream::once(async { Err(Error::UnhandledRequest) }).boxed(),
        }
    }
}
