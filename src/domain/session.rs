//! State of one quote interaction, from the first keystroke to the final
//! request.
//!
//! The session never performs I/O itself. Address edits hand out a
//! [`LookupTicket`] that the caller feeds to the lookup driver; the driver's
//! outcome comes back through [`QuotationSession::apply_lookup`], which drops
//! anything that no longer matches the field's latest query.

use thiserror::Error;
use tracing::{debug, info};

use super::entities::{
    AddressCandidate, AddressSide, ServiceKind, ShipmentRequest, UnitDimensions,
};
use super::fields::{FieldErrors, FieldId};
use super::geo::distance_km;
use super::messages::{Language, MessageKey};
use super::quotation::{Quotation, QuotationEngine};
use super::resolver::ResolveError;
use super::submission::{QuoteSubmitter, SubmissionAck, SubmitError};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SessionError {
    #[error("quote request was already submitted")]
    Finalized,
    #[error("no quote has been calculated yet")]
    NotCalculated,
    #[error("no suggestion #{index} for {side}")]
    NoSuchSuggestion { side: AddressSide, index: usize },
    #[error("{} field(s) need attention", .0.len())]
    Invalid(FieldErrors),
    #[error(transparent)]
    Submission(#[from] SubmitError),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionPhase {
    #[default]
    Idle,
    AwaitingAddresses,
    Calculated(Quotation),
    FinalSubmitted {
        quotation: Quotation,
        ack: SubmissionAck,
    },
}

impl SessionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::AwaitingAddresses => "awaiting_addresses",
            SessionPhase::Calculated(_) => "calculated",
            SessionPhase::FinalSubmitted { .. } => "final_submitted",
        }
    }
}

/// Identifies one resolver request: which field, which edit, which text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupTicket {
    pub side: AddressSide,
    pub seq: u64,
    pub query: String,
}

/// Free-text address box with its current suggestions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddressInput {
    text: String,
    seq: u64,
    suggestions: Vec<AddressCandidate>,
}

impl AddressInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn suggestions(&self) -> &[AddressCandidate] {
        &self.suggestions
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    fn bump(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn reset(&mut self) {
        self.text.clear();
        self.suggestions.clear();
        self.bump();
    }
}

#[derive(Clone, Debug, Default)]
pub struct QuotationSession {
    language: Language,
    request: ShipmentRequest,
    origin: AddressInput,
    destination: AddressInput,
    errors: FieldErrors,
    phase: SessionPhase,
}

impl QuotationSession {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switching language keeps every input; only future lookups change.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn request(&self) -> &ShipmentRequest {
        &self.request
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn address_input(&self, side: AddressSide) -> &AddressInput {
        match side {
            AddressSide::Origin => &self.origin,
            AddressSide::Destination => &self.destination,
        }
    }

    fn address_input_mut(&mut self, side: AddressSide) -> &mut AddressInput {
        match side {
            AddressSide::Origin => &mut self.origin,
            AddressSide::Destination => &mut self.destination,
        }
    }

    pub fn quotation(&self) -> Option<&Quotation> {
        match &self.phase {
            SessionPhase::Calculated(quotation) => Some(quotation),
            SessionPhase::FinalSubmitted { quotation, .. } => Some(quotation),
            _ => None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.phase, SessionPhase::FinalSubmitted { .. })
    }

    /// Picks ground or air. Changing an already chosen kind wipes the whole
    /// form and returns to `Idle`; returns whether that reset happened.
    pub fn set_service_kind(&mut self, kind: ServiceKind) -> bool {
        match self.request.service_kind {
            Some(current) if current == kind => false,
            None => {
                self.request.service_kind = Some(kind);
                self.errors.clear(FieldId::ServiceKind);
                self.mark_dirty();
                false
            }
            _ => {
                info!(service = %kind, "service kind changed, resetting quote form");
                self.request = ShipmentRequest {
                    service_kind: Some(kind),
                    ..ShipmentRequest::default()
                };
                self.origin.reset();
                self.destination.reset();
                self.errors.clear_all();
                self.phase = SessionPhase::Idle;
                true
            }
        }
    }

    /// Records typed address text. Returns a ticket to resolve unless the
    /// text is blank, in which case suggestions are simply cleared.
    pub fn edit_address(
        &mut self,
        side: AddressSide,
        text: &str,
    ) -> Result<Option<LookupTicket>, SessionError> {
        self.ensure_editable()?;
        self.mark_dirty();
        self.errors.clear(side.into());
        *self.request.address_mut(side) = None;

        let input = self.address_input_mut(side);
        input.text = text.to_string();
        let seq = input.bump();

        if text.trim().is_empty() {
            input.suggestions.clear();
            return Ok(None);
        }

        Ok(Some(LookupTicket {
            side,
            seq,
            query: text.to_string(),
        }))
    }

    /// Applies a resolver outcome. Returns `false` when the outcome is stale
    /// and was discarded.
    pub fn apply_lookup(
        &mut self,
        ticket: &LookupTicket,
        outcome: Result<Vec<AddressCandidate>, ResolveError>,
    ) -> bool {
        if self.is_finalized() {
            return false;
        }
        let input = self.address_input_mut(ticket.side);
        if ticket.seq != input.seq || ticket.query != input.text {
            debug!(
                side = %ticket.side,
                seq = ticket.seq,
                latest = input.seq,
                "discarding stale address lookup"
            );
            return false;
        }

        match outcome {
            Ok(candidates) => {
                debug!(
                    side = %ticket.side,
                    count = candidates.len(),
                    "address suggestions updated"
                );
                input.suggestions = candidates;
                self.errors.clear(ticket.side.into());
            }
            Err(err) => {
                debug!(side = %ticket.side, error = %err, "address lookup failed");
                input.suggestions.clear();
                self.errors
                    .set(ticket.side.into(), MessageKey::AddressSuggestionFailed);
            }
        }
        true
    }

    /// Confirms one of the current suggestions. The list is pinned to the
    /// chosen candidate and its coordinate becomes the field's resolved value.
    pub fn select_suggestion(
        &mut self,
        side: AddressSide,
        index: usize,
    ) -> Result<AddressCandidate, SessionError> {
        self.ensure_editable()?;
        let candidate = self
            .address_input(side)
            .suggestions
            .get(index)
            .cloned()
            .ok_or(SessionError::NoSuchSuggestion { side, index })?;

        self.mark_dirty();
        self.errors.clear(side.into());

        let input = self.address_input_mut(side);
        input.text = candidate.formatted.clone();
        input.suggestions = vec![candidate.clone()];
        input.bump();

        *self.request.address_mut(side) = Some(candidate.clone());
        Ok(candidate)
    }

    pub fn set_weight(&mut self, weight_kg: Option<f64>) -> Result<(), SessionError> {
        self.edit_shipment(FieldId::Weight, |request| {
            request.measures.weight_kg = weight_kg;
        })
    }

    pub fn set_volume_count(&mut self, count: Option<i64>) -> Result<(), SessionError> {
        self.edit_shipment(FieldId::Volumes, |request| {
            request.measures.volume_count = count;
        })
    }

    pub fn set_dimensions(&mut self, dimensions: UnitDimensions) -> Result<(), SessionError> {
        self.edit_shipment(FieldId::Dimensions, |request| {
            request.measures.dimensions = dimensions;
        })
    }

    pub fn set_client_name(&mut self, name: &str) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.request.client_name = name.to_string();
        self.errors.clear(FieldId::ClientName);
        Ok(())
    }

    pub fn set_client_email(&mut self, email: &str) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.request.client_email = email.to_string();
        self.errors.clear(FieldId::ClientEmail);
        Ok(())
    }

    /// Validates addresses, measures the distance and prices the request.
    pub fn submit(&mut self, engine: &QuotationEngine) -> Result<Quotation, SessionError> {
        self.ensure_editable()?;
        self.errors.clear_all();

        let kind = self.request.service_kind;
        let origin = self.request.origin.as_ref().map(|found| found.coordinate);
        let destination = self.request.destination.as_ref().map(|found| found.coordinate);

        let mut errors = FieldErrors::new();
        if kind.is_none() {
            errors.set(FieldId::ServiceKind, MessageKey::SelectServiceType);
        }
        if origin.is_none() {
            errors.set(FieldId::Origin, MessageKey::SelectValidAddress);
        }
        if destination.is_none() {
            errors.set(FieldId::Destination, MessageKey::SelectValidAddress);
        }
        let (Some(kind), Some(origin), Some(destination)) = (kind, origin, destination) else {
            return Err(self.reject(errors));
        };

        let distance = distance_km(origin, destination);
        match engine.price(distance, kind, &self.request.measures) {
            Ok(quotation) => {
                info!(
                    service = %kind,
                    distance_km = distance,
                    total = ?quotation.total_price(),
                    "quote calculated"
                );
                self.phase = SessionPhase::Calculated(quotation.clone());
                Ok(quotation)
            }
            Err(errors) => Err(self.reject(errors)),
        }
    }

    /// Checks the contact fields and hands the request to `submitter`.
    /// On success the session is finished.
    pub fn finalize<S: QuoteSubmitter + ?Sized>(
        &mut self,
        submitter: &S,
    ) -> Result<SubmissionAck, SessionError> {
        let quotation = match &self.phase {
            SessionPhase::Calculated(quotation) => quotation.clone(),
            SessionPhase::FinalSubmitted { .. } => return Err(SessionError::Finalized),
            _ => return Err(SessionError::NotCalculated),
        };

        let mut errors = FieldErrors::new();
        if self.request.client_name.trim().is_empty() {
            errors.set(FieldId::ClientName, MessageKey::PleaseEnterName);
        }
        let email = self.request.client_email.trim();
        if email.is_empty() {
            errors.set(FieldId::ClientEmail, MessageKey::PleaseEnterEmail);
        } else if !looks_like_email(email) {
            errors.set(FieldId::ClientEmail, MessageKey::InvalidEmail);
        }
        if !errors.is_empty() {
            return Err(self.reject(errors));
        }

        let ack = submitter.submit_final(&self.request, &quotation)?;
        info!(reference = %ack.reference, "quote request finalized");
        self.phase = SessionPhase::FinalSubmitted {
            quotation,
            ack: ack.clone(),
        };
        Ok(ack)
    }

    fn reject(&mut self, errors: FieldErrors) -> SessionError {
        debug!(count = errors.len(), "quote form rejected");
        self.errors.merge(&errors);
        SessionError::Invalid(errors)
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        if self.is_finalized() {
            Err(SessionError::Finalized)
        } else {
            Ok(())
        }
    }

    fn edit_shipment(
        &mut self,
        field: FieldId,
        apply: impl FnOnce(&mut ShipmentRequest),
    ) -> Result<(), SessionError> {
        self.ensure_editable()?;
        apply(&mut self.request);
        self.errors.clear(field);
        self.mark_dirty();
        Ok(())
    }

    // Any change to what is being shipped invalidates a calculated quote.
    fn mark_dirty(&mut self) {
        if !self.is_finalized() {
            self.phase = SessionPhase::AwaitingAddresses;
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::Coordinate;

    fn candidate(name: &str, lat: f64, lng: f64) -> AddressCandidate {
        AddressCandidate {
            formatted: name.to_string(),
            coordinate: Coordinate::new(lat, lng).unwrap(),
        }
    }

    fn pick(session: &mut QuotationSession, side: AddressSide, found: AddressCandidate) {
        let ticket = session
            .edit_address(side, &found.formatted)
            .unwrap()
            .unwrap();
        assert!(session.apply_lookup(&ticket, Ok(vec![found])));
        session.select_suggestion(side, 0).unwrap();
    }

    #[test]
    fn blank_address_issues_no_ticket() {
        let mut session = QuotationSession::default();
        assert_eq!(session.edit_address(AddressSide::Origin, "  ").unwrap(), None);
        assert_eq!(session.phase(), &SessionPhase::AwaitingAddresses);
    }

    #[test]
    fn tickets_are_sequenced_per_field() {
        let mut session = QuotationSession::default();
        let first = session.edit_address(AddressSide::Origin, "Li").unwrap().unwrap();
        let second = session.edit_address(AddressSide::Origin, "Lis").unwrap().unwrap();
        let other = session
            .edit_address(AddressSide::Destination, "Ma")
            .unwrap()
            .unwrap();
        assert!(second.seq > first.seq);
        assert_eq!(other.seq, 1);
    }

    #[test]
    fn stale_outcome_is_discarded() {
        let mut session = QuotationSession::default();
        let old = session.edit_address(AddressSide::Origin, "Lis").unwrap().unwrap();
        let new = session.edit_address(AddressSide::Origin, "Lisboa").unwrap().unwrap();

        assert!(!session.apply_lookup(&old, Ok(vec![candidate("Lisbon", 38.7, -9.1)])));
        assert!(session.address_input(AddressSide::Origin).suggestions().is_empty());

        assert!(session.apply_lookup(&new, Ok(vec![candidate("Lisboa", 38.7, -9.1)])));
        assert_eq!(
            session.address_input(AddressSide::Origin).suggestions()[0].formatted,
            "Lisboa"
        );
    }

    #[test]
    fn outcome_with_mismatched_query_is_discarded() {
        let mut session = QuotationSession::default();
        let mut ticket = session.edit_address(AddressSide::Origin, "Porto").unwrap().unwrap();
        ticket.query = "Port".to_string();
        assert!(!session.apply_lookup(&ticket, Ok(vec![])));
    }

    #[test]
    fn lookup_failure_is_a_field_error() {
        let mut session = QuotationSession::default();
        let ticket = session.edit_address(AddressSide::Destination, "Faro").unwrap().unwrap();
        assert!(session.apply_lookup(&ticket, Err(ResolveError::Request("timeout".into()))));
        assert_eq!(
            session.errors().get(FieldId::Destination),
            Some(MessageKey::AddressSuggestionFailed)
        );
        assert_eq!(session.errors().get(FieldId::Origin), None);

        // Typing again clears the error and re-issues a lookup.
        assert!(session.edit_address(AddressSide::Destination, "Faro ").unwrap().is_some());
        assert_eq!(session.errors().get(FieldId::Destination), None);
    }

    #[test]
    fn selection_pins_suggestions() {
        let mut session = QuotationSession::default();
        let ticket = session.edit_address(AddressSide::Origin, "Lis").unwrap().unwrap();
        session.apply_lookup(
            &ticket,
            Ok(vec![
                candidate("Lisboa, Portugal", 38.72, -9.14),
                candidate("Lisbon, Ohio", 40.77, -80.77),
            ]),
        );
        let chosen = session.select_suggestion(AddressSide::Origin, 1).unwrap();
        assert_eq!(chosen.formatted, "Lisbon, Ohio");

        let input = session.address_input(AddressSide::Origin);
        assert_eq!(input.text(), "Lisbon, Ohio");
        assert_eq!(input.suggestions(), &[chosen.clone()]);
        assert_eq!(session.request().origin, Some(chosen));
    }

    #[test]
    fn selecting_missing_suggestion_fails() {
        let mut session = QuotationSession::default();
        assert_eq!(
            session.select_suggestion(AddressSide::Origin, 0).unwrap_err(),
            SessionError::NoSuchSuggestion {
                side: AddressSide::Origin,
                index: 0
            }
        );
    }

    #[test]
    fn editing_text_drops_selection() {
        let mut session = QuotationSession::default();
        pick(&mut session, AddressSide::Origin, candidate("Lisboa", 38.72, -9.14));
        assert!(session.request().origin.is_some());
        session.edit_address(AddressSide::Origin, "Lisboa 2").unwrap();
        assert!(session.request().origin.is_none());
    }

    #[test]
    fn submit_requires_both_addresses() {
        let mut session = QuotationSession::default();
        session.set_service_kind(ServiceKind::Ground);
        let err = session.submit(&QuotationEngine::default()).unwrap_err();
        let SessionError::Invalid(errors) = err else {
            panic!("expected field errors");
        };
        assert_eq!(errors.get(FieldId::Origin), Some(MessageKey::SelectValidAddress));
        assert_eq!(errors.get(FieldId::Destination), Some(MessageKey::SelectValidAddress));
        assert_eq!(session.errors(), &errors);
        assert!(session.quotation().is_none());
    }

    #[test]
    fn submit_requires_service_kind() {
        let mut session = QuotationSession::default();
        pick(&mut session, AddressSide::Origin, candidate("A", 0.0, 0.0));
        pick(&mut session, AddressSide::Destination, candidate("B", 0.0, 1.0));
        let err = session.submit(&QuotationEngine::default()).unwrap_err();
        assert!(matches!(err, SessionError::Invalid(ref e)
            if e.get(FieldId::ServiceKind) == Some(MessageKey::SelectServiceType)));
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("ana@example.pt"));
        assert!(!looks_like_email("ana@"));
        assert!(!looks_like_email("ana example@x.pt"));
        assert!(!looks_like_email("@example.pt"));
        assert!(!looks_like_email("ana@localhost"));
    }
}
