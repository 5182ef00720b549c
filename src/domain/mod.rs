//! Quotation domain: distance, vehicle tiers, pricing and the session state.

pub mod entities;
pub mod fields;
pub mod geo;
pub mod messages;
pub mod quotation;
pub mod resolver;
pub mod session;
pub mod submission;
pub mod vehicle;

pub use entities::{
    parse_count, parse_decimal, AddressCandidate, AddressSide, ServiceKind, ShipmentMeasures,
    ShipmentRequest, UnitDimensions,
};
pub use fields::{FieldErrors, FieldId};
pub use geo::{distance_km, Coordinate, CoordinateError, EARTH_RADIUS_KM};
pub use messages::{Language, MessageKey};
pub use quotation::{AirQuote, GroundQuote, PriceBreakdown, Quotation, QuotationEngine};
pub use resolver::{AddressResolver, ResolveError};
pub use session::{AddressInput, LookupTicket, QuotationSession, SessionError, SessionPhase};
pub use submission::{QuoteSubmitter, SubmissionAck, SubmitError};
pub use vehicle::{BoundingDimensions, VehicleCatalog, VehicleTier};
