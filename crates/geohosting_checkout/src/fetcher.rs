// --- File: crates/geohosting_checkout/src/fetcher.rs ---
//! Order detail loading with last-request-wins semantics.

use geohosting_common::BoxFuture;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::models::{OrderId, SalesOrder};

/// Where order details come from.
pub trait OrderSource: Send + Sync {
    fn fetch_order<'a>(&'a self, id: &'a OrderId) -> BoxFuture<'a, SalesOrder, FetchError>;
}

impl<S: OrderSource + ?Sized> OrderSource for Arc<S> {
    fn fetch_order<'a>(&'a self, id: &'a OrderId) -> BoxFuture<'a, SalesOrder, FetchError> {
        (**self).fetch_order(id)
    }
}

/// Observable fetch state. `data` keeps the last good order across failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchState {
    pub loading: bool,
    pub error: Option<FetchError>,
    pub data: Option<SalesOrder>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded(SalesOrder),
    Failed(FetchError),
    /// A newer request started, or the fetcher was closed, before this one resolved.
    Superseded,
}

pub struct OrderDetailFetcher<S> {
    source: S,
    generation: AtomicU64,
    closed: AtomicBool,
    state: Mutex<FetchState>,
}

impl<S: OrderSource> OrderDetailFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            state: Mutex::new(FetchState::default()),
        }
    }

    pub async fn state(&self) -> FetchState {
        self.state.lock().await.clone()
    }

    /// Stops accepting responses. In-flight requests resolve as `Superseded`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Loads `id`. Only the most recently started request may commit its result.
    pub async fn fetch(&self, id: &OrderId) -> FetchOutcome {
        if self.is_closed() {
            return FetchOutcome::Superseded;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.source.fetch_order(id).await;

        let mut state = self.state.lock().await;
        if self.is_closed() || self.generation.load(Ordering::SeqCst) != generation {
            debug!(order_id = %id, generation, "Discarding stale order response");
            return FetchOutcome::Superseded;
        }
        state.loading = false;
        match result {
            Ok(order) => {
                state.data = Some(order.clone());
                FetchOutcome::Loaded(order)
            }
            Err(err) => {
                warn!(order_id = %id, error = %err, "Failed to load order");
                state.error = Some(err.clone());
                FetchOutcome::Failed(err)
            }
        }
    }
}
