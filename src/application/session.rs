//! PaywallSession - the stateful bridge between the purchasing service
//! and the presentation layer.
//!
//! The session owns all mutable paywall state: the loading lifecycle
//! that decides when the screen is ready to display, the single
//! in-flight purchase guard, and the premium flag derived from status
//! snapshots. There is exactly one writer (the session itself); the
//! presentation layer observes through read-only `watch` receivers.
//!
//! Lifecycle: on `start`, the session issues the catalog request and
//! subscribes to the status stream as background tasks; `shutdown` (or
//! drop) aborts both. Nothing survives the session - no partial-state
//! cleanup is required on teardown because there is no state to unwind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::CatalogConfig;
use crate::domain::foundation::{AttemptId, StateMachine, StatusGroupId};
use crate::domain::paywall::{
    CatalogResolution, LoadingState, PaywallError, Product, ProductCatalogRequest, PurchaseAttempt,
    PurchaseOutcome,
};
use crate::ports::PurchasingService;

/// Owns the loading/ready state of the paywall for one screen
/// presentation.
///
/// # Example
///
/// ```ignore
/// let session = PaywallSession::new(service, &config.catalog)?;
/// session.start();
///
/// let mut loading = session.loading();
/// loading.wait_for(|state| state.is_ready()).await?;
/// ```
pub struct PaywallSession {
    inner: Arc<SessionInner>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// State shared with the background tasks.
struct SessionInner {
    service: Arc<dyn PurchasingService>,
    request: ProductCatalogRequest,
    group_id: StatusGroupId,
    settling_delay: Duration,
    loading_tx: watch::Sender<LoadingState>,
    busy_tx: watch::Sender<bool>,
    premium_tx: watch::Sender<bool>,
    in_flight: Mutex<Option<PurchaseAttempt>>,
    resolution: Mutex<CatalogResolution>,
    resolution_claimed: AtomicBool,
}

impl PaywallSession {
    /// Creates a session over a purchasing service.
    ///
    /// The session starts Unloaded, not busy, and not premium. No work
    /// is issued until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns `PaywallError::Validation` if the configured product set
    /// or status group is invalid.
    pub fn new(
        service: Arc<dyn PurchasingService>,
        config: &CatalogConfig,
    ) -> Result<Self, PaywallError> {
        let request = config.catalog_request()?;
        let group_id = config.group_id()?;

        let (loading_tx, _) = watch::channel(LoadingState::Unloaded);
        let (busy_tx, _) = watch::channel(false);
        let (premium_tx, _) = watch::channel(false);

        Ok(Self {
            inner: Arc::new(SessionInner {
                service,
                request,
                group_id,
                settling_delay: config.settling_delay(),
                loading_tx,
                busy_tx,
                premium_tx,
                in_flight: Mutex::new(None),
                resolution: Mutex::new(CatalogResolution::Unresolved),
                resolution_claimed: AtomicBool::new(false),
            }),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Session-start lifecycle hook.
    ///
    /// Issues the catalog request and subscribes to the status stream.
    /// Both run as background tasks and are aborted by
    /// [`shutdown`](Self::shutdown) or drop.
    pub fn start(&self) {
        let catalog = {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.resolve_catalog_once().await })
        };
        let status = {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.pump_status().await })
        };

        let mut tasks = self.tasks.lock().unwrap();
        tasks.push(catalog);
        tasks.push(status);
    }

    /// Session-end lifecycle hook: cancels the catalog request and the
    /// status subscription.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
    }

    /// Resolves the configured catalog through the port, driving the
    /// loading lifecycle. Exposed for callers that manage their own
    /// tasks; [`start`](Self::start) calls this internally.
    pub async fn request_catalog(&self) {
        self.inner.resolve_catalog_once().await;
    }

    /// Marks a purchase as initiated for a product.
    ///
    /// The busy flag goes up immediately; the presentation layer must
    /// block further purchase initiation until
    /// [`complete_purchase`](Self::complete_purchase) reports back.
    ///
    /// # Errors
    ///
    /// Returns `PurchaseAlreadyInFlight` if an attempt is outstanding;
    /// simultaneous purchases are not a supported scenario.
    pub fn begin_purchase(&self, product: &Product) -> Result<AttemptId, PaywallError> {
        self.inner.begin_purchase(product)
    }

    /// Reports the terminal outcome of the outstanding purchase.
    ///
    /// Releases the busy flag for every outcome. A succeeded outcome
    /// means receipt verification is now required before granting
    /// entitlement; this session does not perform it.
    ///
    /// # Errors
    ///
    /// Returns `NoPurchaseInFlight` if nothing was begun.
    pub fn complete_purchase(
        &self,
        outcome: PurchaseOutcome,
    ) -> Result<PurchaseAttempt, PaywallError> {
        self.inner.complete_purchase(outcome)
    }

    /// Runs a full purchase flow: begin, drive the platform purchase,
    /// complete with its outcome.
    ///
    /// Transport-level failures to reach an outcome fold into a
    /// `PlatformError` outcome so the busy flag is released on every
    /// path.
    pub async fn purchase(&self, product: &Product) -> Result<PurchaseAttempt, PaywallError> {
        self.inner.begin_purchase(product)?;

        let outcome = match self.inner.service.initiate_purchase(product).await {
            Ok(outcome) => outcome,
            Err(err) => PurchaseOutcome::PlatformError {
                message: err.to_string(),
            },
        };

        self.inner.complete_purchase(outcome)
    }

    /// Read-only view of the loading lifecycle, for visibility/opacity
    /// binding.
    pub fn loading(&self) -> watch::Receiver<LoadingState> {
        self.inner.loading_tx.subscribe()
    }

    /// Read-only view of the busy flag, for disabling interaction
    /// during a purchase.
    pub fn busy(&self) -> watch::Receiver<bool> {
        self.inner.busy_tx.subscribe()
    }

    /// Read-only view of the premium flag derived from status
    /// snapshots. False until the first snapshot arrives.
    pub fn is_premium(&self) -> watch::Receiver<bool> {
        self.inner.premium_tx.subscribe()
    }

    /// The resolved products, in picker order. Empty until the full
    /// catalog has resolved: a partial catalog never reaches the picker.
    pub fn products(&self) -> Vec<Product> {
        let resolution = self.inner.resolution.lock().unwrap();
        if !resolution.is_complete(&self.inner.request) {
            return Vec::new();
        }
        match &*resolution {
            CatalogResolution::Resolved(products) => products.clone(),
            _ => Vec::new(),
        }
    }
}

impl Drop for PaywallSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl SessionInner {
    /// Resolves the catalog and drives `Unloaded -> Settling -> Ready`.
    ///
    /// The resolution slot is claimed atomically before the first
    /// suspension point, so overlapping calls collapse into one service
    /// request and at most one pass over the loading lifecycle. A
    /// failed or partial resolution leaves the session in Unloaded with
    /// no retry.
    async fn resolve_catalog_once(&self) {
        if self.resolution_claimed.swap(true, Ordering::AcqRel) {
            debug!("catalog resolution already claimed; skipping");
            return;
        }

        let resolution = match self.service.resolve_catalog(&self.request).await {
            Ok(products) => CatalogResolution::Resolved(products),
            Err(err) => {
                error!(%err, "catalog resolution failed; staying unloaded");
                CatalogResolution::Failed
            }
        };

        let complete = resolution.is_complete(&self.request);
        let resolved_count = match &resolution {
            CatalogResolution::Resolved(products) => products.len(),
            _ => 0,
        };
        *self.resolution.lock().unwrap() = resolution;

        if !complete {
            if resolved_count > 0 {
                warn!(
                    requested = self.request.len(),
                    resolved = resolved_count,
                    "partial catalog resolution; staying unloaded"
                );
            }
            return;
        }

        info!(count = resolved_count, "catalog resolved; settling");
        self.advance_loading(LoadingState::Settling);

        // Cooperative pause so the reveal reads as a fade, not a flash.
        tokio::time::sleep(self.settling_delay).await;

        self.advance_loading(LoadingState::Ready);
        if self.loading_tx.borrow().is_ready() {
            info!("paywall ready");
        }
    }

    /// Advances the loading state, validated against its current value
    /// under the watch lock. Invalid transitions are dropped rather
    /// than sent, so a terminal state can never be replayed over.
    fn advance_loading(&self, target: LoadingState) {
        self.loading_tx.send_if_modified(|state| match state.transition_to(target) {
            Ok(next) => {
                *state = next;
                true
            }
            Err(err) => {
                debug!(%err, "loading transition skipped");
                false
            }
        });
    }

    fn begin_purchase(&self, product: &Product) -> Result<AttemptId, PaywallError> {
        let mut guard = self.in_flight.lock().unwrap();
        if let Some(outstanding) = guard.as_ref() {
            return Err(PaywallError::PurchaseAlreadyInFlight {
                product_id: outstanding.product_id().clone(),
            });
        }

        let attempt = PurchaseAttempt::start(product.id.clone());
        let id = attempt.id();
        *guard = Some(attempt);
        self.busy_tx.send_replace(true);

        info!(product = %product.id, name = %product.display_name, "purchasing");
        Ok(id)
    }

    fn complete_purchase(&self, outcome: PurchaseOutcome) -> Result<PurchaseAttempt, PaywallError> {
        let mut attempt = self
            .in_flight
            .lock()
            .unwrap()
            .take()
            .ok_or(PaywallError::NoPurchaseInFlight)?;

        // Busy is released uniformly for all four outcomes.
        self.busy_tx.send_replace(false);

        attempt.complete(&outcome)?;

        match &outcome {
            PurchaseOutcome::Succeeded { .. } => {
                info!(product = %attempt.product_id(), "purchase succeeded; receipt verification required");
            }
            PurchaseOutcome::Pending => {
                info!(product = %attempt.product_id(), "purchase pending approval");
            }
            PurchaseOutcome::Cancelled => {
                info!(product = %attempt.product_id(), "user cancelled purchase");
            }
            PurchaseOutcome::PlatformError { message } => {
                error!(product = %attempt.product_id(), %message, "purchase failed");
            }
        }

        Ok(attempt)
    }

    /// Subscribes to status snapshots and keeps the premium flag
    /// current. Each snapshot supersedes the previous; no history is
    /// retained.
    async fn pump_status(&self) {
        let mut stream = self.service.status_stream(&self.group_id);
        while let Some(snapshot) = stream.next().await {
            let premium = snapshot.is_premium();
            debug!(group = %snapshot.group_id(), premium, states = ?snapshot.states(), "status snapshot");
            self.premium_tx.send_replace(premium);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MockPurchasingService;
    use crate::domain::paywall::{ReceiptToken, SubscriptionPeriod};
    use crate::domain::foundation::ProductId;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id).unwrap(),
            display_name: id.to_string(),
            display_price: "$4.99".to_string(),
            period: SubscriptionPeriod::Monthly,
        }
    }

    fn session_over(mock: MockPurchasingService) -> PaywallSession {
        PaywallSession::new(Arc::new(mock), &CatalogConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn new_session_is_unloaded_idle_and_not_premium() {
        let session = session_over(MockPurchasingService::new());
        assert_eq!(*session.loading().borrow(), LoadingState::Unloaded);
        assert!(!*session.busy().borrow());
        assert!(!*session.is_premium().borrow());
        assert!(session.products().is_empty());
    }

    #[tokio::test]
    async fn begin_purchase_raises_busy_and_guards_reentry() {
        let session = session_over(MockPurchasingService::new());
        let weekly = product("pro_weekly");

        session.begin_purchase(&weekly).unwrap();
        assert!(*session.busy().borrow());

        let again = session.begin_purchase(&product("pro_monthly"));
        assert_eq!(
            again,
            Err(PaywallError::PurchaseAlreadyInFlight {
                product_id: weekly.id.clone()
            })
        );
    }

    #[tokio::test]
    async fn complete_purchase_releases_busy_for_every_outcome() {
        let outcomes = [
            PurchaseOutcome::Succeeded {
                receipt: ReceiptToken::new("txn_1"),
            },
            PurchaseOutcome::Pending,
            PurchaseOutcome::Cancelled,
            PurchaseOutcome::PlatformError {
                message: "declined".to_string(),
            },
        ];

        for outcome in outcomes {
            let session = session_over(MockPurchasingService::new());
            session.begin_purchase(&product("pro_weekly")).unwrap();
            assert!(*session.busy().borrow());

            let attempt = session.complete_purchase(outcome.clone()).unwrap();
            assert!(!*session.busy().borrow(), "busy after {:?}", outcome);
            assert!(attempt.is_settled());
        }
    }

    #[tokio::test]
    async fn completing_without_begin_is_an_error() {
        let session = session_over(MockPurchasingService::new());
        let result = session.complete_purchase(PurchaseOutcome::Cancelled);
        assert_eq!(result, Err(PaywallError::NoPurchaseInFlight));
    }

    #[tokio::test]
    async fn purchase_folds_transport_errors_and_releases_busy() {
        let mock = MockPurchasingService::new();
        mock.fail_purchases(crate::ports::PurchasingError::network("store unreachable"));
        let session = session_over(mock);

        let attempt = session.purchase(&product("pro_weekly")).await.unwrap();
        assert_eq!(
            attempt.state(),
            crate::domain::paywall::PurchaseAttemptState::Failed
        );
        assert!(!*session.busy().borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn second_catalog_resolution_is_a_no_op() {
        let mock = MockPurchasingService::new();
        mock.resolve_full_catalog();
        let session =
            PaywallSession::new(Arc::new(mock), &CatalogConfig::default()).unwrap();

        session.request_catalog().await;
        assert_eq!(*session.loading().borrow(), LoadingState::Ready);

        // A second request must not touch the terminal state.
        session.request_catalog().await;
        assert_eq!(*session.loading().borrow(), LoadingState::Ready);
    }
}
