//! # Route Table
//!
//! Ordered (name, predicate, handler) rows plus an optional fallback.
//! Selection is first-match; the fallback only sees messages no row claimed.

use crate::ports::outbound::VaaPush;
use shared_types::{ChainId, Vaa};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Name reported for the fallback handler.
pub const FALLBACK_ROUTE: &str = "fallback";

type Predicate = Box<dyn Fn(&Vaa) -> bool + Send + Sync>;

pub(crate) struct Route {
    pub(crate) name: String,
    predicate: Predicate,
    pub(crate) handler: Arc<dyn VaaPush>,
    dispatched: AtomicU64,
}

impl Route {
    pub(crate) fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    fallback: Option<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row. Rows are tried in insertion order.
    #[must_use]
    pub fn route(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Vaa) -> bool + Send + Sync + 'static,
        handler: Arc<dyn VaaPush>,
    ) -> Self {
        self.routes.push(Route {
            name: name.into(),
            predicate: Box::new(predicate),
            handler,
            dispatched: AtomicU64::new(0),
        });
        self
    }

    /// Handler for messages no row matches.
    #[must_use]
    pub fn fallback(mut self, handler: Arc<dyn VaaPush>) -> Self {
        self.fallback = Some(Route {
            name: FALLBACK_ROUTE.to_string(),
            predicate: Box::new(|_| true),
            handler,
            dispatched: AtomicU64::new(0),
        });
        self
    }

    /// Pythnet price attestations to `oracle`, everything else to `generic`.
    pub fn price_oracle_split(oracle: Arc<dyn VaaPush>, generic: Arc<dyn VaaPush>) -> Self {
        Self::new()
            .route(
                "price-oracle",
                |vaa: &Vaa| vaa.emitter_chain == ChainId::PYTHNET,
                oracle,
            )
            .fallback(generic)
    }

    pub(crate) fn select(&self, vaa: &Vaa) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| (r.predicate)(vaa))
            .or(self.fallback.as_ref())
    }

    /// Name of the route `vaa` would take.
    pub fn route_name(&self, vaa: &Vaa) -> Option<&str> {
        self.select(vaa).map(|r| r.name.as_str())
    }

    /// Messages handed to each route so far, in table order (fallback last).
    pub fn dispatch_counts(&self) -> Vec<(String, u64)> {
        self.routes
            .iter()
            .chain(self.fallback.iter())
            .map(|r| (r.name.clone(), r.dispatched.load(Ordering::Relaxed)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len() + usize::from(self.fallback.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .routes
            .iter()
            .chain(self.fallback.iter())
            .map(|r| r.name.as_str())
            .collect();
        f.debug_struct("RouteTable").field("routes", &names).finish()
    }
}
