// --- File: crates/geohosting_checkout/src/flow.rs ---
//! Ties fetching, routing and the checkout draft together for one view.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetcher::{FetchOutcome, OrderDetailFetcher, OrderSource};
use crate::models::{OrderId, OrderStatus, SalesOrder};
use crate::router::{CheckoutRouter, Navigator, RouteDecision};
use crate::session::SessionCache;

/// Values entered before payment, kept until the order carries an app name.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// Drafts keyed by session.
#[derive(Debug, Default)]
pub struct DraftStore {
    drafts: RwLock<SessionCache<CheckoutDraft>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drafts older than `ttl` are dropped; at most `capacity` are kept.
    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            drafts: RwLock::new(SessionCache::new(ttl, capacity)),
        }
    }

    pub async fn get(&self, session: &str) -> Option<CheckoutDraft> {
        self.drafts.read().await.get(session).cloned()
    }

    pub async fn save(&self, session: &str, draft: CheckoutDraft) {
        self.drafts.write().await.insert(session.to_string(), draft);
    }

    pub async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }

    pub async fn clear(&self, session: &str) {
        if self.drafts.write().await.remove(session).is_some() {
            debug!("Checkout draft cleared");
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    Routed {
        order: SalesOrder,
        decision: RouteDecision,
    },
    /// The router was not consulted.
    Failed(FetchError),
    Superseded,
}

pub struct CheckoutFlow<S, N> {
    fetcher: OrderDetailFetcher<S>,
    router: CheckoutRouter<N>,
    drafts: Option<(Arc<DraftStore>, String)>,
}

impl<S: OrderSource, N: Navigator> CheckoutFlow<S, N> {
    pub fn new(source: S, navigator: N) -> Self {
        Self {
            fetcher: OrderDetailFetcher::new(source),
            router: CheckoutRouter::new(navigator),
            drafts: None,
        }
    }

    /// Clears this session's draft once a fetched order has an app name.
    pub fn with_drafts(mut self, store: Arc<DraftStore>, session: impl Into<String>) -> Self {
        self.drafts = Some((store, session.into()));
        self
    }

    pub fn fetcher(&self) -> &OrderDetailFetcher<S> {
        &self.fetcher
    }

    pub fn navigator(&self) -> &N {
        self.router.navigator()
    }

    /// Fetches `id` and routes the result exactly once.
    pub async fn load(&self, id: &OrderId) -> FlowOutcome {
        match self.fetcher.fetch(id).await {
            FetchOutcome::Loaded(order) => {
                if order.has_app_name() {
                    if let Some((store, session)) = &self.drafts {
                        store.clear(session).await;
                    }
                }
                let decision = self.router.route(&order);
                FlowOutcome::Routed { order, decision }
            }
            FetchOutcome::Failed(err) => FlowOutcome::Failed(err),
            FetchOutcome::Superseded => FlowOutcome::Superseded,
        }
    }

    /// Re-fetches every `interval` until the order leaves `watched`.
    ///
    /// Fetch errors are logged and polling continues. Drop the future to cancel.
    pub async fn poll_until_status_changes(
        &self,
        id: &OrderId,
        watched: &OrderStatus,
        interval: Duration,
    ) -> SalesOrder {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.load(id).await {
                FlowOutcome::Routed { order, .. } if &order.order_status != watched => {
                    info!(order_id = %id, status = %order.order_status, "Order left watched status");
                    return order;
                }
                FlowOutcome::Routed { .. } | FlowOutcome::Superseded => {}
                FlowOutcome::Failed(err) => {
                    warn!(order_id = %id, error = %err, "Polling fetch failed; will retry");
                }
            }
        }
    }

    /// Stops the flow. Late responses are ignored.
    pub fn close(&self) {
        self.fetcher.close();
    }
}
