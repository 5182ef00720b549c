//! Property tests for distance and pricing invariants.

use proptest::prelude::*;

use freight_quote::domain::{
    distance_km, Coordinate, Quotation, QuotationEngine, ServiceKind, ShipmentMeasures,
    UnitDimensions, VehicleCatalog, EARTH_RADIUS_KM,
};

fn coordinate_strategy() -> impl Strategy<Value = Coordinate> {
    (-90.0f64..=90.0, -180.0f64..=180.0)
        .prop_map(|(latitude, longitude)| Coordinate::new(latitude, longitude).unwrap())
}

fn optional_positive() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(-50.0f64..5000.0)
}

fn measures_strategy() -> impl Strategy<Value = ShipmentMeasures> {
    (
        optional_positive(),
        prop::option::of(-5i64..50),
        optional_positive(),
        optional_positive(),
        optional_positive(),
    )
        .prop_map(|(weight_kg, volume_count, length_cm, width_cm, height_cm)| {
            ShipmentMeasures {
                weight_kg,
                volume_count,
                dimensions: UnitDimensions {
                    length_cm,
                    width_cm,
                    height_cm,
                },
            }
        })
}

proptest! {
    #[test]
    fn distance_to_self_is_zero(a in coordinate_strategy()) {
        prop_assert!(distance_km(a, a).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric_and_bounded(a in coordinate_strategy(), b in coordinate_strategy()) {
        let there = distance_km(a, b);
        let back = distance_km(b, a);
        prop_assert!((there - back).abs() < 1e-6);
        prop_assert!(there >= 0.0);
        prop_assert!(there <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
    }

    /// Air quotes never carry a price, whatever was typed.
    #[test]
    fn air_is_never_priced(distance in 0.0f64..20_000.0, measures in measures_strategy()) {
        let quotation = QuotationEngine::default()
            .price(distance, ServiceKind::Air, &measures)
            .unwrap();
        prop_assert_eq!(quotation.total_price(), None);
    }

    /// The selected tier fits and no earlier tier does.
    #[test]
    fn selection_is_first_fit(weight in 0.1f64..3000.0, volume in 1.0f64..30_000_000.0) {
        let catalog = VehicleCatalog::standard();
        match catalog.select(weight, volume) {
            Some(tier) => {
                prop_assert!(tier.fits(weight, volume));
                let earlier = catalog.tiers().iter().take_while(|t| t.id != tier.id);
                for skipped in earlier {
                    prop_assert!(!skipped.fits(weight, volume));
                }
            }
            None => {
                prop_assert!(catalog.tiers().iter().all(|t| !t.fits(weight, volume)));
            }
        }
    }

    /// Anything a van can carry gets priced at the round trip rate.
    #[test]
    fn ground_price_is_round_trip_rate(
        distance in 0.0f64..2_000.0,
        weight in 0.5f64..=1000.0,
        count in 1i64..=10,
        sides in (1.0f64..=100.0, 1.0f64..=100.0, 1.0f64..=100.0),
    ) {
        let measures = ShipmentMeasures {
            weight_kg: Some(weight),
            volume_count: Some(count),
            dimensions: UnitDimensions::new(sides.0, sides.1, sides.2),
        };
        let quotation = QuotationEngine::default()
            .price(distance, ServiceKind::Ground, &measures)
            .unwrap();
        let Quotation::Ground(quote) = quotation else {
            panic!("ground request produced {quotation:?}");
        };
        let rate = quote.breakdown.tier.price_per_km;
        prop_assert!((quote.total_price - 2.0 * distance * rate).abs() < 1e-6);
        prop_assert!(quote.breakdown.tier.id == "light" || quote.breakdown.tier.id == "van");
    }
}
