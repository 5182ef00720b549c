//! Boundary for handing a completed quote request over to the company.

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use super::entities::ShipmentRequest;
use super::quotation::Quotation;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmissionAck {
    pub reference: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

impl SubmissionAck {
    pub fn new() -> Self {
        Self {
            reference: Uuid::new_v4(),
            submitted_at: OffsetDateTime::now_utc(),
        }
    }
}

impl Default for SubmissionAck {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("submission channel unavailable: {0}")]
    Unavailable(String),
}

/// Receives a fully validated request together with the quote shown to the
/// client. Only called once the session has checked every required field.
pub trait QuoteSubmitter {
    fn submit_final(
        &self,
        request: &ShipmentRequest,
        quotation: &Quotation,
    ) -> Result<SubmissionAck, SubmitError>;
}
