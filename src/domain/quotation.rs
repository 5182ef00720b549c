//! Quote pricing: input validation, tier selection and round-trip price.

use serde::Serialize;

use super::entities::{ServiceKind, ShipmentMeasures};
use super::fields::{FieldErrors, FieldId};
use super::messages::MessageKey;
use super::vehicle::{VehicleCatalog, VehicleTier};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub price_per_km: f64,
    pub one_way_distance_km: f64,
    pub round_trip_distance_km: f64,
    pub tier: &'static VehicleTier,
    pub unit_volume_cm3: f64,
    pub total_volume_cm3: f64,
    pub volume_count: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroundQuote {
    pub total_price: f64,
    pub breakdown: PriceBreakdown,
}

/// Air freight is priced offline; this only echoes what was asked for.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AirQuote {
    pub one_way_distance_km: f64,
    pub measures: ShipmentMeasures,
    pub follow_up: MessageKey,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "service", rename_all = "lowercase")]
pub enum Quotation {
    Ground(GroundQuote),
    Air(AirQuote),
}

impl Quotation {
    pub fn service_kind(&self) -> ServiceKind {
        match self {
            Quotation::Ground(_) => ServiceKind::Ground,
            Quotation::Air(_) => ServiceKind::Air,
        }
    }

    /// Only ground quotes carry a computed price.
    pub fn total_price(&self) -> Option<f64> {
        match self {
            Quotation::Ground(quote) => Some(quote.total_price),
            Quotation::Air(_) => None,
        }
    }

    pub fn one_way_distance_km(&self) -> f64 {
        match self {
            Quotation::Ground(quote) => quote.breakdown.one_way_distance_km,
            Quotation::Air(quote) => quote.one_way_distance_km,
        }
    }
}

/// Stateless pricing over a vehicle catalog. Safe to call repeatedly.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuotationEngine {
    catalog: VehicleCatalog,
}

impl QuotationEngine {
    pub fn new(catalog: VehicleCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &VehicleCatalog {
        &self.catalog
    }

    pub fn price(
        &self,
        distance_km: f64,
        service_kind: ServiceKind,
        measures: &ShipmentMeasures,
    ) -> Result<Quotation, FieldErrors> {
        match service_kind {
            ServiceKind::Air => Ok(Quotation::Air(AirQuote {
                one_way_distance_km: distance_km,
                measures: *measures,
                follow_up: MessageKey::QuotationEmail,
            })),
            ServiceKind::Ground => self.price_ground(distance_km, measures).map(Quotation::Ground),
        }
    }

    fn price_ground(
        &self,
        distance_km: f64,
        measures: &ShipmentMeasures,
    ) -> Result<GroundQuote, FieldErrors> {
        let ValidMeasures {
            weight_kg,
            volume_count,
            unit_volume_cm3,
        } = validate_measures(measures)?;

        let total_volume_cm3 = unit_volume_cm3 * volume_count as f64;

        let Some(tier) = self.catalog.select(weight_kg, total_volume_cm3) else {
            return Err(self.capacity_errors(weight_kg, total_volume_cm3));
        };

        let round_trip_distance_km = distance_km * 2.0;
        Ok(GroundQuote {
            total_price: tier.price_per_km * round_trip_distance_km,
            breakdown: PriceBreakdown {
                price_per_km: tier.price_per_km,
                one_way_distance_km: distance_km,
                round_trip_distance_km,
                tier,
                unit_volume_cm3,
                total_volume_cm3,
                volume_count,
            },
        })
    }

    fn capacity_errors(&self, weight_kg: f64, total_volume_cm3: f64) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(last) = self.catalog.last() {
            if weight_kg > last.max_weight_kg {
                errors.set(FieldId::Weight, MessageKey::WeightExceedsLimit);
            }
            if total_volume_cm3 > last.max_volume_cm3 {
                errors.set(FieldId::Volumes, MessageKey::VolumeExceedsLimit);
                errors.set(FieldId::Dimensions, MessageKey::VolumeExceedsLimit);
            }
        }
        if errors.is_empty() {
            errors.set(FieldId::Weight, MessageKey::NoVehicleAvailable);
        }
        errors
    }
}

struct ValidMeasures {
    weight_kg: f64,
    volume_count: i64,
    unit_volume_cm3: f64,
}

fn is_blank(value: Option<f64>) -> bool {
    value.map_or(true, |value| value == 0.0 || value.is_nan())
}

fn validate_measures(measures: &ShipmentMeasures) -> Result<ValidMeasures, FieldErrors> {
    let mut errors = FieldErrors::new();
    let dims = &measures.dimensions;

    // Presence: stop at the first empty input.
    if is_blank(measures.weight_kg) {
        errors.set(FieldId::Weight, MessageKey::PleaseEnterWeight);
        return Err(errors);
    }
    if measures.volume_count.map_or(true, |count| count == 0) {
        errors.set(FieldId::Volumes, MessageKey::PleaseEnterVolumes);
        return Err(errors);
    }
    if [dims.length_cm, dims.width_cm, dims.height_cm]
        .into_iter()
        .any(is_blank)
    {
        errors.set(FieldId::Dimensions, MessageKey::PleaseEnterDimensions);
        return Err(errors);
    }

    let weight_kg = measures.weight_kg.unwrap_or_default();
    let volume_count = measures.volume_count.unwrap_or_default();
    let unit_volume_cm3 = dims.unit_volume_cm3().unwrap_or_default();

    // Sign checks are independent of each other.
    if weight_kg <= 0.0 {
        errors.set(FieldId::Weight, MessageKey::WeightMustBePositive);
    }
    if unit_volume_cm3 <= 0.0 {
        errors.set(FieldId::Dimensions, MessageKey::DimensionsMustBePositive);
    }
    if volume_count <= 0 {
        errors.set(FieldId::Volumes, MessageKey::VolumesMustBePositive);
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidMeasures {
        weight_kg,
        volume_count,
        unit_volume_cm3,
    })
}
