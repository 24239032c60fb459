//! The payment-confirmation poller.
//!
//! After the user returns from the external checkout page there is a
//! window where the payment may still be settling. The poller checks the
//! checkout status on a fixed budget: one immediate check, then up to four
//! more two seconds apart. It always terminates; when the budget runs out
//! the result is "could not confirm", never a guess either way.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use nafas_api::{CheckoutRedirect, VentApi};
use nafas_auth::AuthSessionManager;

use crate::config::PollConfig;
use crate::error::BillingError;

/// Terminal outcome of one confirmation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// The payment settled; the profile has been refreshed.
    Paid,
    /// The checkout session lapsed before payment. No point polling on.
    Expired,
    /// The budget ran out with the status still pending. The caller must
    /// present this as "could not confirm", not as success or failure.
    TimedOut,
}

/// Record of a finished confirmation loop. Produced exactly once per loop
/// and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCheckoutAttempt {
    pub checkout_session_id: String,
    pub outcome: ConfirmationOutcome,
    /// Status checks actually issued, including failed ones.
    pub attempts_made: u32,
}

/// Creates checkouts and confirms their payment status.
///
/// At most one confirmation loop is live at a time: starting a new one (or
/// calling [`Self::cancel`]) bumps a generation counter, and a loop that
/// finds itself behind the counter stops without applying anything.
pub struct PaymentConfirmationPoller<A: VentApi> {
    api: Arc<A>,
    auth: Arc<AuthSessionManager<A>>,
    config: PollConfig,
    generation: AtomicU64,
}

impl<A: VentApi> PaymentConfirmationPoller<A> {
    pub fn new(api: Arc<A>, auth: Arc<AuthSessionManager<A>>) -> Self {
        Self::with_config(api, auth, PollConfig::default())
    }

    pub fn with_config(api: Arc<A>, auth: Arc<AuthSessionManager<A>>, config: PollConfig) -> Self {
        Self {
            api,
            auth,
            config: config.validated(),
            generation: AtomicU64::new(0),
        }
    }

    /// Creates a checkout session for the subscription and returns the
    /// external payment page URL plus the id to confirm afterwards.
    pub async fn begin_checkout(&self, origin_url: &str) -> Result<CheckoutRedirect, BillingError> {
        let token = self
            .auth
            .store()
            .token()
            .ok_or(BillingError::NotAuthenticated)?;

        let redirect = self
            .api
            .create_checkout(&token, origin_url)
            .await
            .map_err(|err| self.map_protected_err(err))?;
        tracing::info!(checkout_session_id = %redirect.session_id, "checkout created");
        Ok(redirect)
    }

    /// Runs one bounded confirmation loop for a checkout session.
    ///
    /// A `paid` status refreshes the profile (the service has flipped the
    /// subscription by then) and stops. An `expired` status stops
    /// immediately. Anything else, including transient request failures,
    /// consumes an attempt; exhausting the budget yields
    /// [`ConfirmationOutcome::TimedOut`].
    pub async fn begin_confirmation(
        &self,
        checkout_session_id: &str,
    ) -> Result<PaymentCheckoutAttempt, BillingError> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::info!(checkout_session_id, "confirming payment");

        let mut attempts_made = 0;
        while attempts_made < self.config.max_attempts {
            if attempts_made > 0 {
                tokio::time::sleep(self.config.interval).await;
            }
            if self.generation.load(Ordering::Acquire) != generation {
                tracing::debug!(checkout_session_id, "confirmation superseded");
                return Err(BillingError::Superseded);
            }

            let store = self.auth.store();
            let (token, epoch) = store
                .token_with_epoch()
                .ok_or(BillingError::NotAuthenticated)?;

            attempts_made += 1;
            match self.api.checkout_status(&token, checkout_session_id).await {
                Ok(status) => {
                    if self.generation.load(Ordering::Acquire) != generation {
                        return Err(BillingError::Superseded);
                    }
                    if !store.is_current(epoch) {
                        tracing::info!(
                            checkout_session_id,
                            "credential changed mid-check; discarding status"
                        );
                        return Err(BillingError::LoggedOut);
                    }

                    if status.is_paid() {
                        tracing::info!(checkout_session_id, attempts_made, "payment confirmed");
                        // The subscription flipped server-side; pull the
                        // updated profile so the client sees it too.
                        if let Err(err) = self.auth.refresh_profile().await {
                            tracing::warn!(%err, "profile refresh after payment failed");
                        }
                        return Ok(self.finished(
                            checkout_session_id,
                            ConfirmationOutcome::Paid,
                            attempts_made,
                        ));
                    }
                    if status.is_expired() {
                        tracing::info!(checkout_session_id, attempts_made, "checkout expired");
                        return Ok(self.finished(
                            checkout_session_id,
                            ConfirmationOutcome::Expired,
                            attempts_made,
                        ));
                    }
                    tracing::debug!(
                        checkout_session_id,
                        attempt = attempts_made,
                        "payment still pending"
                    );
                }
                Err(err) if err.is_auth() => {
                    self.auth.force_logout("service rejected the session token");
                    return Err(BillingError::SessionRejected);
                }
                Err(err) => {
                    // Transient failures consume attempts; the budget, not
                    // the error kind, decides when to stop.
                    tracing::debug!(
                        %err,
                        checkout_session_id,
                        attempt = attempts_made,
                        "status check failed"
                    );
                }
            }
        }

        tracing::info!(checkout_session_id, attempts_made, "confirmation timed out");
        Ok(self.finished(
            checkout_session_id,
            ConfirmationOutcome::TimedOut,
            attempts_made,
        ))
    }

    /// Aborts the current confirmation loop, if any. The aborted loop
    /// returns [`BillingError::Superseded`] and applies nothing. Used when
    /// the user navigates away from the confirmation screen.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn finished(
        &self,
        checkout_session_id: &str,
        outcome: ConfirmationOutcome,
        attempts_made: u32,
    ) -> PaymentCheckoutAttempt {
        PaymentCheckoutAttempt {
            checkout_session_id: checkout_session_id.to_owned(),
            outcome,
            attempts_made,
        }
    }

    fn map_protected_err(&self, err: nafas_api::ApiError) -> BillingError {
        if err.is_auth() {
            self.auth.force_logout("service rejected the session token");
            return BillingError::SessionRejected;
        }
        BillingError::Network(err.to_string())
    }
}
