// --- File: crates/geohosting_common/src/services.rs ---
//! Shared aliases for the service traits declared in the feature crates.

use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;
