// --- File: crates/geohosting_checkout/src/router.rs ---
//! Keeps the checkout URL in line with the order's server-side status.
//!
//! Each known `order_status` owns exactly one route segment. When the current
//! path disagrees, the router replaces it (no new history entry) with the
//! canonical one. Unknown statuses leave the user where they are.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::models::{OrderId, OrderStatus, SalesOrder};

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    Payment,
    Configuration,
    Deployment,
    Finish,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 4] = [
        CheckoutStep::Payment,
        CheckoutStep::Configuration,
        CheckoutStep::Deployment,
        CheckoutStep::Finish,
    ];

    /// Route segment, bit-exact.
    pub fn segment(self) -> &'static str {
        match self {
            CheckoutStep::Payment => "payment",
            CheckoutStep::Configuration => "configuration",
            CheckoutStep::Deployment => "deployment",
            CheckoutStep::Finish => "finish",
        }
    }

    /// Position in the progress tracker.
    pub fn index(self) -> usize {
        match self {
            CheckoutStep::Payment => 0,
            CheckoutStep::Configuration => 1,
            CheckoutStep::Deployment => 2,
            CheckoutStep::Finish => 3,
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.segment() == segment)
    }

    pub fn for_status(status: &OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::WaitingPayment => Some(CheckoutStep::Payment),
            OrderStatus::WaitingConfiguration => Some(CheckoutStep::Configuration),
            OrderStatus::WaitingDeployment => Some(CheckoutStep::Deployment),
            OrderStatus::Deployed => Some(CheckoutStep::Finish),
            OrderStatus::Unknown(_) => None,
        }
    }

    pub fn status(self) -> OrderStatus {
        match self {
            CheckoutStep::Payment => OrderStatus::WaitingPayment,
            CheckoutStep::Configuration => OrderStatus::WaitingConfiguration,
            CheckoutStep::Deployment => OrderStatus::WaitingDeployment,
            CheckoutStep::Finish => OrderStatus::Deployed,
        }
    }
}

pub fn canonical_path(order_id: &OrderId, step: CheckoutStep) -> String {
    format!("/orders/{}/{}", order_id, step.segment())
}

/// `None` for statuses without a route.
pub fn canonical_path_for(order: &SalesOrder) -> Option<String> {
    CheckoutStep::for_status(&order.order_status).map(|step| canonical_path(&order.id, step))
}

/// Strips hash-routing prefix, query, fragment and trailing slashes.
pub fn normalize_path(path: &str) -> &str {
    let path = path
        .strip_prefix("/#")
        .or_else(|| path.strip_prefix('#'))
        .unwrap_or(path);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = path[..end].trim_end_matches('/');
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Already on the canonical path.
    Stay,
    /// Navigated (replace) to the contained path.
    Redirect(String),
    /// Status has no route; nothing was done.
    Unrouted,
}

/// Decides without navigating.
pub fn evaluate(order: &SalesOrder, current_path: &str) -> RouteDecision {
    match canonical_path_for(order) {
        None => RouteDecision::Unrouted,
        Some(target) if normalize_path(current_path) == target => RouteDecision::Stay,
        Some(target) => RouteDecision::Redirect(target),
    }
}

/// History access for the router.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    /// Replaces the current history entry.
    fn replace(&self, path: &str);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn current_path(&self) -> String {
        (**self).current_path()
    }

    fn replace(&self, path: &str) {
        (**self).replace(path)
    }
}

/// In-memory history, seeded with the requested path.
///
/// Used per request by the HTTP front, where a replacement becomes a redirect.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    path: Mutex<String>,
    replaced: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(path.into()),
            replaced: Mutex::new(Vec::new()),
        }
    }

    /// Every path passed to `replace`, oldest first.
    pub fn replacements(&self) -> Vec<String> {
        self.replaced
            .lock()
            .map(|replaced| replaced.clone())
            .unwrap_or_default()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.path.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn replace(&self, path: &str) {
        if let Ok(mut current) = self.path.lock() {
            *current = path.to_string();
        }
        if let Ok(mut replaced) = self.replaced.lock() {
            replaced.push(path.to_string());
        }
    }
}

pub struct CheckoutRouter<N> {
    navigator: N,
}

impl<N: Navigator> CheckoutRouter<N> {
    pub fn new(navigator: N) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Routes `order` against the navigator's current path.
    ///
    /// Issues at most one `replace`. Calling again after a correction is a no-op.
    pub fn route(&self, order: &SalesOrder) -> RouteDecision {
        let current = self.navigator.current_path();
        let decision = evaluate(order, &current);
        match &decision {
            RouteDecision::Redirect(target) => {
                debug!(order_id = %order.id, from = %current, to = %target, "Replacing checkout route");
                self.navigator.replace(target);
            }
            RouteDecision::Unrouted => {
                warn!(
                    order_id = %order.id,
                    status = %order.order_status,
                    "Order status has no checkout route; leaving path unchanged"
                );
            }
            RouteDecision::Stay => {}
        }
        decision
    }
}
