use tracing::info;

use crate::domain::{Quotation, QuoteSubmitter, ShipmentRequest, SubmissionAck, SubmitError};

/// Accepts every request and logs it. Stands in for the e-mail hand-off.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalSubmitter;

impl QuoteSubmitter for LocalSubmitter {
    fn submit_final(
        &self,
        request: &ShipmentRequest,
        quotation: &Quotation,
    ) -> Result<SubmissionAck, SubmitError> {
        let ack = SubmissionAck::new();
        info!(
            reference = %ack.reference,
            client = %request.client_name,
            email = %request.client_email,
            service = %quotation.service_kind(),
            origin = request.origin.as_ref().map(|found| found.formatted.as_str()),
            destination = request.destination.as_ref().map(|found| found.formatted.as_str()),
            total = ?quotation.total_price(),
            "quote request received"
        );
        Ok(ack)
    }
}
