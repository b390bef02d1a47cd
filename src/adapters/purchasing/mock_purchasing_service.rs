//! Mock purchasing service for testing.
//!
//! Provides a configurable in-memory implementation of
//! `PurchasingService` for unit and integration tests. Supports:
//! - Scripted catalog resolution (full echo, partial, explicit, failure)
//! - Scripted purchase outcomes and error injection
//! - Pushed status snapshots
//! - Call tracking

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;

use crate::domain::foundation::StatusGroupId;
use crate::domain::paywall::{
    Product, ProductCatalogRequest, PurchaseOutcome, SubscriptionPeriod,
    SubscriptionStatusSnapshot,
};
use crate::ports::{PurchasingError, PurchasingService, StatusStream};

/// Mock purchasing service for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPurchasingService::new();
///
/// // Configure responses
/// mock.resolve_partial_catalog(2);
/// mock.set_purchase_outcome(PurchaseOutcome::Cancelled);
///
/// // Push a status change
/// mock.push_snapshot(snapshot);
/// ```
#[derive(Default)]
pub struct MockPurchasingService {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// How the mock answers catalog resolution.
#[derive(Default)]
enum CatalogMode {
    /// Echo one product per requested identifier.
    #[default]
    FullEcho,

    /// Echo only the first N requested identifiers.
    Partial(usize),

    /// Return this exact product list.
    Explicit(Vec<Product>),

    /// Fail with this error.
    Fail(PurchasingError),
}

/// How the next purchase completes.
enum ScriptedOutcome {
    /// Return this outcome as-is.
    Decoded(PurchaseOutcome),

    /// Deliver this wire-level code through the contract decoder, the
    /// way the host bridge does.
    Wire { code: String, detail: Option<String> },
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Catalog resolution behavior.
    catalog_mode: CatalogMode,

    /// Outcome of the next purchase; defaults to success.
    purchase_outcome: Option<ScriptedOutcome>,

    /// Transport error to return instead of an outcome.
    purchase_error: Option<PurchasingError>,

    /// Live status stream subscribers.
    status_subscribers: Vec<mpsc::UnboundedSender<SubscriptionStatusSnapshot>>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPurchasingService {
    /// Create a new mock with full-echo catalog resolution and
    /// succeeding purchases.
    pub fn new() -> Self {
        Self::default()
    }

    // Configuration

    /// Resolve every requested identifier (the default).
    pub fn resolve_full_catalog(&self) {
        self.inner.lock().unwrap().catalog_mode = CatalogMode::FullEcho;
    }

    /// Resolve only the first `count` requested identifiers.
    pub fn resolve_partial_catalog(&self, count: usize) {
        self.inner.lock().unwrap().catalog_mode = CatalogMode::Partial(count);
    }

    /// Resolve to this exact product list, whatever was requested.
    pub fn set_products(&self, products: Vec<Product>) {
        self.inner.lock().unwrap().catalog_mode = CatalogMode::Explicit(products);
    }

    /// Fail catalog resolution with this error.
    pub fn fail_catalog(&self, error: PurchasingError) {
        self.inner.lock().unwrap().catalog_mode = CatalogMode::Fail(error);
    }

    /// Set the outcome returned by the next purchase.
    pub fn set_purchase_outcome(&self, outcome: PurchaseOutcome) {
        self.inner.lock().unwrap().purchase_outcome = Some(ScriptedOutcome::Decoded(outcome));
    }

    /// Script the next purchase as a wire-level outcome code, decoded
    /// through the contract on delivery.
    pub fn set_purchase_wire_outcome(&self, code: impl Into<String>, detail: Option<&str>) {
        self.inner.lock().unwrap().purchase_outcome = Some(ScriptedOutcome::Wire {
            code: code.into(),
            detail: detail.map(str::to_string),
        });
    }

    /// Fail purchases at the transport level with this error.
    pub fn fail_purchases(&self, error: PurchasingError) {
        self.inner.lock().unwrap().purchase_error = Some(error);
    }

    /// Push a status snapshot to every live subscriber.
    pub fn push_snapshot(&self, snapshot: SubscriptionStatusSnapshot) {
        let mut state = self.inner.lock().unwrap();
        state
            .status_subscribers
            .retain(|tx| tx.unbounded_send(snapshot.clone()).is_ok());
    }

    // Assertions

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Number of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    fn record(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    /// Builds store-shaped metadata for an identifier.
    fn echo_product(id: &crate::domain::foundation::ProductId) -> Product {
        let (period, price) = if id.as_str().contains("weekly") {
            (SubscriptionPeriod::Weekly, "$1.99")
        } else if id.as_str().contains("yearly") {
            (SubscriptionPeriod::Yearly, "$29.99")
        } else {
            (SubscriptionPeriod::Monthly, "$4.99")
        };
        Product {
            id: id.clone(),
            display_name: id.as_str().replace('_', " "),
            display_price: price.to_string(),
            period,
        }
    }
}

#[async_trait]
impl PurchasingService for MockPurchasingService {
    async fn resolve_catalog(
        &self,
        request: &ProductCatalogRequest,
    ) -> Result<Vec<Product>, PurchasingError> {
        self.record(
            "resolve_catalog",
            request.ids().iter().map(|id| id.to_string()).collect(),
        );

        let state = self.inner.lock().unwrap();
        match &state.catalog_mode {
            CatalogMode::FullEcho => Ok(request.ids().iter().map(Self::echo_product).collect()),
            CatalogMode::Partial(count) => Ok(request
                .ids()
                .iter()
                .take(*count)
                .map(Self::echo_product)
                .collect()),
            CatalogMode::Explicit(products) => Ok(products.clone()),
            CatalogMode::Fail(error) => Err(error.clone()),
        }
    }

    async fn initiate_purchase(
        &self,
        product: &Product,
    ) -> Result<PurchaseOutcome, PurchasingError> {
        self.record("initiate_purchase", vec![product.id.to_string()]);

        let mut state = self.inner.lock().unwrap();
        if let Some(error) = state.purchase_error.take() {
            return Err(error);
        }
        // Every delivery passes through the contract decoder, as the
        // host bridge does with real wire codes.
        Ok(match state.purchase_outcome.take() {
            Some(ScriptedOutcome::Decoded(outcome)) => outcome,
            Some(ScriptedOutcome::Wire { code, detail }) => {
                PurchaseOutcome::from_wire_code(&code, detail.as_deref())
            }
            None => PurchaseOutcome::from_wire_code("succeeded", Some("txn_mock")),
        })
    }

    fn status_stream(&self, group_id: &StatusGroupId) -> StatusStream {
        self.record("status_stream", vec![group_id.to_string()]);

        let (tx, rx) = mpsc::unbounded();
        self.inner.lock().unwrap().status_subscribers.push(tx);
        rx.boxed()
    }
}
