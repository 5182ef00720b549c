use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::geo::Coordinate;
use super::messages::MessageKey;

/// Transport mode offered on the quote form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceKind {
    /// Road transport within the Iberian Peninsula, priced per round-trip km.
    Ground,
    /// International air freight, priced offline and sent by e-mail.
    Air,
}

impl ServiceKind {
    pub fn label(&self) -> MessageKey {
        match self {
            ServiceKind::Ground => MessageKey::LandTransportIberia,
            ServiceKind::Air => MessageKey::InternationalAir,
        }
    }
}

/// One geocoder match: display text plus the point it resolves to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddressCandidate {
    pub formatted: String,
    pub coordinate: Coordinate,
}

/// Which of the two address inputs a lookup or selection refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AddressSide {
    Origin,
    Destination,
}

impl AddressSide {
    pub const ALL: [AddressSide; 2] = [AddressSide::Origin, AddressSide::Destination];
}

/// Per-unit box size in centimetres; `None` means the input is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitDimensions {
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
}

impl UnitDimensions {
    pub fn new(length_cm: f64, width_cm: f64, height_cm: f64) -> Self {
        Self {
            length_cm: Some(length_cm),
            width_cm: Some(width_cm),
            height_cm: Some(height_cm),
        }
    }

    /// Volume of one unit, if all three sides are entered.
    pub fn unit_volume_cm3(&self) -> Option<f64> {
        Some(self.length_cm? * self.width_cm? * self.height_cm?)
    }
}

/// Weight, volume count and unit size as typed by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentMeasures {
    pub weight_kg: Option<f64>,
    pub volume_count: Option<i64>,
    pub dimensions: UnitDimensions,
}

/// Everything the quote form collects, mutated field by field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRequest {
    pub service_kind: Option<ServiceKind>,
    pub origin: Option<AddressCandidate>,
    pub destination: Option<AddressCandidate>,
    pub measures: ShipmentMeasures,
    pub client_name: String,
    pub client_email: String,
}

impl ShipmentRequest {
    pub fn address(&self, side: AddressSide) -> Option<&AddressCandidate> {
        match side {
            AddressSide::Origin => self.origin.as_ref(),
            AddressSide::Destination => self.destination.as_ref(),
        }
    }

    pub(crate) fn address_mut(&mut self, side: AddressSide) -> &mut Option<AddressCandidate> {
        match side {
            AddressSide::Origin => &mut self.origin,
            AddressSide::Destination => &mut self.destination,
        }
    }
}

/// Parses a decimal form input. Accepts `,` as the decimal separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses a whole-number form input.
pub fn parse_count(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_portuguese_decimals() {
        assert_eq!(parse_decimal("12,5"), Some(12.5));
        assert_eq!(parse_decimal(" 40 "), Some(40.0));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("inf"), None);
    }

    #[test]
    fn parses_counts() {
        assert_eq!(parse_count("3"), Some(3));
        assert_eq!(parse_count("-2"), Some(-2));
        assert_eq!(parse_count("2.5"), None);
    }

    #[test]
    fn unit_volume_needs_all_sides() {
        assert_eq!(UnitDimensions::new(10.0, 20.0, 30.0).unit_volume_cm3(), Some(6000.0));
        let partial = UnitDimensions {
            length_cm: Some(10.0),
            ..UnitDimensions::default()
        };
        assert_eq!(partial.unit_volume_cm3(), None);
    }
}
