//! The unified error type.

use nafas_api::ApiError;
use nafas_auth::{AuthError, PersistError};
use nafas_billing::BillingError;
use nafas_chat::ChatError;

/// Any error the toolkit can produce, for callers that do not want to
/// handle each layer's enum separately.
#[derive(Debug, thiserror::Error)]
pub enum NafasError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}
