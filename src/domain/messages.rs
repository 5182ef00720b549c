//! Stable message keys for every user-facing string the quotation core emits.
//!
//! The core never carries display text. It hands out a [`MessageKey`] and the
//! front-end resolves it against the catalog of the active [`Language`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    Pt,
    En,
}

impl Language {
    /// Language code sent to the geocoder.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Language::Pt => Language::En,
            Language::En => Language::Pt,
        }
    }
}

/// Catalog key. The camelCase rendering is the key used in `locales/*.json`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum MessageKey {
    // Form labels
    GetQuote,
    CalculateShippingCosts,
    ServiceType,
    LandTransportIberia,
    InternationalAir,
    OriginLocation,
    DestinationLocation,
    Weight,
    NumberOfVolumes,
    Dimensions,
    Length,
    Width,
    Height,
    CalculatePrice,
    EnterYourName,
    EnterYourEmail,
    SendRequest,

    // Summary
    TotalPrice,
    VehicleType,
    MaxDimensions,
    VolumePerUnit,
    TotalVolume,
    PricePerKm,
    OneWayDistance,
    RoundTripDistance,
    QuotationEmail,
    OrderDetails,
    Origin,
    Destination,

    // Vehicle tiers
    VehicleLight,
    VehicleLightCapacity,
    VehicleVan,
    VehicleVanCapacity,
    VehicleLarge,
    VehicleLargeCapacity,

    // Validation
    SelectServiceType,
    PleaseEnterWeight,
    PleaseEnterVolumes,
    PleaseEnterDimensions,
    WeightMustBePositive,
    DimensionsMustBePositive,
    VolumesMustBePositive,
    WeightExceedsLimit,
    VolumeExceedsLimit,
    NoVehicleAvailable,
    SelectValidAddress,
    AddressSuggestionFailed,
    PleaseEnterName,
    PleaseEnterEmail,
    InvalidEmail,

    // Outcome
    QuoteSuccess,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_render_as_camel_case() {
        assert_eq!(MessageKey::PleaseEnterWeight.as_ref(), "pleaseEnterWeight");
        assert_eq!(MessageKey::VehicleLargeCapacity.as_ref(), "vehicleLargeCapacity");
        assert_eq!(MessageKey::GetQuote.to_string(), "getQuote");
        let key: &'static str = MessageKey::InvalidEmail.into();
        assert_eq!(key, "invalidEmail");
    }

    #[test]
    fn language_parses_codes() {
        assert_eq!("PT".parse::<Language>().unwrap(), Language::Pt);
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Language::Pt.toggled(), Language::En);
    }
}
