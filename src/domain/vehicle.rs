//! Vehicle tiers available for road quotes.

use serde::Serialize;

use super::messages::MessageKey;

/// Outer box of a vehicle's cargo area, in centimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundingDimensions {
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleTier {
    pub id: &'static str,
    pub display_name: MessageKey,
    pub capacity_description: MessageKey,
    pub max_weight_kg: f64,
    pub max_volume_cm3: f64,
    pub bounding_dimensions: BoundingDimensions,
    pub price_per_km: f64,
}

impl VehicleTier {
    /// Both limits are inclusive.
    pub fn fits(&self, weight_kg: f64, total_volume_cm3: f64) -> bool {
        weight_kg <= self.max_weight_kg && total_volume_cm3 <= self.max_volume_cm3
    }
}

// The large tier carries less weight than the van but more volume. Selection
// scans in this order, so the thresholds must stay as listed.
static STANDARD_TIERS: [VehicleTier; 3] = [
    VehicleTier {
        id: "light",
        display_name: MessageKey::VehicleLight,
        capacity_description: MessageKey::VehicleLightCapacity,
        max_weight_kg: 600.0,
        max_volume_cm3: 2_000_000.0,
        bounding_dimensions: BoundingDimensions {
            length_cm: 200.0,
            width_cm: 100.0,
            height_cm: 100.0,
        },
        price_per_km: 0.40,
    },
    VehicleTier {
        id: "van",
        display_name: MessageKey::VehicleVan,
        capacity_description: MessageKey::VehicleVanCapacity,
        max_weight_kg: 1200.0,
        max_volume_cm3: 13_000_000.0,
        bounding_dimensions: BoundingDimensions {
            length_cm: 400.0,
            width_cm: 180.0,
            height_cm: 180.0,
        },
        price_per_km: 0.60,
    },
    VehicleTier {
        id: "large",
        display_name: MessageKey::VehicleLarge,
        capacity_description: MessageKey::VehicleLargeCapacity,
        max_weight_kg: 1000.0,
        max_volume_cm3: 20_000_000.0,
        bounding_dimensions: BoundingDimensions {
            length_cm: 500.0,
            width_cm: 200.0,
            height_cm: 200.0,
        },
        price_per_km: 0.90,
    },
];

/// Read-only, ordered list of tiers. Order is significant: the first tier
/// that fits wins.
#[derive(Clone, Copy, Debug)]
pub struct VehicleCatalog {
    tiers: &'static [VehicleTier],
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl VehicleCatalog {
    pub fn standard() -> Self {
        Self {
            tiers: &STANDARD_TIERS,
        }
    }

    /// Builds a catalog over an arbitrary tier list, kept in the given order.
    pub fn from_tiers(tiers: &'static [VehicleTier]) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &'static [VehicleTier] {
        self.tiers
    }

    pub fn last(&self) -> Option<&'static VehicleTier> {
        self.tiers.last()
    }

    pub fn find(&self, id: &str) -> Option<&'static VehicleTier> {
        self.tiers.iter().find(|tier| tier.id == id)
    }

    /// First tier, in catalog order, whose weight and volume limits both hold.
    pub fn select(&self, weight_kg: f64, total_volume_cm3: f64) -> Option<&'static VehicleTier> {
        self.tiers
            .iter()
            .find(|tier| tier.fits(weight_kg, total_volume_cm3))
    }
}
