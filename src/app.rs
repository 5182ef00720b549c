//! Line-oriented terminal front-end over a [`QuotationSession`].
//!
//! Stdin commands and finished address lookups are multiplexed on one loop,
//! so suggestions show up while the user keeps typing.

use std::sync::Arc;

use thiserror::Error;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use freight_quote::domain::{
    parse_count, parse_decimal, AddressResolver, AddressSide, Language, MessageKey, Quotation,
    QuotationEngine, QuotationSession, QuoteSubmitter, ServiceKind, SessionError, UnitDimensions,
};
use freight_quote::infra::{AddressLookup, GeocoderError, LocalSubmitter, OpenCageClient};
use freight_quote::util::assets::text;
use freight_quote::util::persistence::{remember_language, Settings};
use freight_quote::util::version::{build_label, APP_NAME};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("geocoder setup failed: {0}")]
    Geocoder(#[from] GeocoderError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, PartialEq)]
enum Command {
    Service(ServiceKind),
    Address(AddressSide, String),
    Pick(AddressSide, usize),
    Weight(Option<f64>),
    Volumes(Option<i64>),
    Dimensions(UnitDimensions),
    Calculate,
    Name(String),
    Email(String),
    Send,
    ToggleLanguage,
    Show,
    Help,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Error)]
enum ParseError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

const HELP: &str = "\
commands:
  service ground|air
  origin <text>            destination <text>
  pick origin|destination <n>
  weight <kg>   volumes <n>   dims <length> <width> <height>
  calc
  name <text>   email <text>   send
  lang   show   help   quit";

impl Command {
    fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match verb.to_ascii_lowercase().as_str() {
            "service" => match rest.to_ascii_lowercase().as_str() {
                "ground" | "land" => Command::Service(ServiceKind::Ground),
                "air" => Command::Service(ServiceKind::Air),
                _ => return Err(ParseError::Usage("service ground|air")),
            },
            "origin" | "from" => Command::Address(AddressSide::Origin, rest.to_string()),
            "destination" | "to" => Command::Address(AddressSide::Destination, rest.to_string()),
            "pick" => {
                let usage = ParseError::Usage("pick origin|destination <n>");
                let mut parts = rest.split_whitespace();
                let side = parts.next().and_then(parse_side).ok_or(usage.clone())?;
                let index = parts
                    .next()
                    .and_then(|raw| raw.parse::<usize>().ok())
                    .filter(|n| *n >= 1)
                    .ok_or(usage)?;
                Command::Pick(side, index - 1)
            }
            "weight" => Command::Weight(parse_decimal(rest)),
            "volumes" => Command::Volumes(parse_count(rest)),
            "dims" => {
                let sides: Vec<&str> = rest.split_whitespace().collect();
                let [length, width, height] = sides.as_slice() else {
                    return Err(ParseError::Usage("dims <length> <width> <height>"));
                };
                Command::Dimensions(UnitDimensions {
                    length_cm: parse_decimal(length),
                    width_cm: parse_decimal(width),
                    height_cm: parse_decimal(height),
                })
            }
            "calc" | "quote" => Command::Calculate,
            "name" => Command::Name(rest.to_string()),
            "email" => Command::Email(rest.to_string()),
            "send" => Command::Send,
            "lang" => Command::ToggleLanguage,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn parse_side(raw: &str) -> Option<AddressSide> {
    match raw.to_ascii_lowercase().as_str() {
        "origin" | "from" => Some(AddressSide::Origin),
        "destination" | "to" => Some(AddressSide::Destination),
        _ => None,
    }
}

pub async fn run(settings: Settings) -> Result<(), AppError> {
    let api_key = settings.api_key.clone().unwrap_or_default();
    let client = OpenCageClient::with_base_url(&settings.geocoder_url, api_key)?
        .with_ttl(settings.cache_ttl());
    let mut lookup = AddressLookup::new(Arc::new(client), settings.debounce());
    let engine = QuotationEngine::default();
    let submitter = LocalSubmitter;
    let mut session = QuotationSession::new(settings.language);

    info!(version = %build_label(), language = %settings.language, "session started");
    println!("{APP_NAME} {}", build_label());
    println!("{}", text(session.language(), MessageKey::CalculateShippingCosts));
    println!("{HELP}");

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => {
                        handle(command, &mut session, &mut lookup, &engine, &submitter);
                    }
                    Ok(None) => {}
                    Err(err) => println!("{err}"),
                }
            }
            Some(outcome) = lookup.next_outcome() => {
                let side = outcome.ticket.side;
                if session.apply_lookup(&outcome.ticket, outcome.result) {
                    print_suggestions(&session, side);
                }
            }
        }
    }

    lookup.cancel_all();
    Ok(())
}

fn handle<R, S>(
    command: Command,
    session: &mut QuotationSession,
    lookup: &mut AddressLookup<R>,
    engine: &QuotationEngine,
    submitter: &S,
) where
    R: AddressResolver + 'static,
    S: QuoteSubmitter,
{
    let language = session.language();
    let outcome = match command {
        Command::Service(kind) => {
            if session.set_service_kind(kind) {
                lookup.cancel_all();
            }
            println!(
                "{}: {}",
                text(language, MessageKey::ServiceType),
                text(language, kind.label())
            );
            Ok(())
        }
        Command::Address(side, query) => session.edit_address(side, &query).map(|ticket| {
            match ticket {
                Some(ticket) => lookup.schedule(ticket, language),
                None => lookup.cancel(side),
            }
        }),
        Command::Pick(side, index) => session.select_suggestion(side, index).map(|candidate| {
            lookup.cancel(side);
            println!("{}: {}", text(language, side_label(side)), candidate.formatted);
        }),
        Command::Weight(weight) => session.set_weight(weight),
        Command::Volumes(count) => session.set_volume_count(count),
        Command::Dimensions(dimensions) => session.set_dimensions(dimensions),
        Command::Calculate => session
            .submit(engine)
            .map(|quotation| print_quotation(language, &quotation)),
        Command::Name(name) => session.set_client_name(&name),
        Command::Email(email) => session.set_client_email(&email),
        Command::Send => session.finalize(submitter).map(|ack| {
            println!("{} [{}]", text(language, MessageKey::QuoteSuccess), ack.reference);
        }),
        Command::ToggleLanguage => {
            let next = language.toggled();
            session.set_language(next);
            if let Err(err) = remember_language(next) {
                warn!(%err, "could not persist language choice");
            }
            println!("{}", next.code());
            Ok(())
        }
        Command::Show => {
            print_form(session);
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    if let Err(err) = outcome {
        print_error(language, &err);
    }
}

fn side_label(side: AddressSide) -> MessageKey {
    match side {
        AddressSide::Origin => MessageKey::OriginLocation,
        AddressSide::Destination => MessageKey::DestinationLocation,
    }
}

fn print_error(language: Language, err: &SessionError) {
    match err {
        SessionError::Invalid(errors) => {
            for (field, message) in errors.iter() {
                println!("  {field}: {}", text(language, message));
            }
        }
        other => println!("{other}"),
    }
}

fn print_suggestions(session: &QuotationSession, side: AddressSide) {
    let language = session.language();
    let input = session.address_input(side);
    if let Some(message) = session.errors().get(side.into()) {
        println!("{}: {}", text(language, side_label(side)), text(language, message));
        return;
    }
    println!("{} ({}):", text(language, side_label(side)), input.text());
    for (position, candidate) in input.suggestions().iter().enumerate() {
        println!("  {}. {}", position + 1, candidate.formatted);
    }
}

fn print_quotation(language: Language, quotation: &Quotation) {
    match quotation {
        Quotation::Ground(quote) => {
            let breakdown = &quote.breakdown;
            let tier = breakdown.tier;
            let bounds = tier.bounding_dimensions;
            println!("{}: €{:.2}", text(language, MessageKey::TotalPrice), quote.total_price);
            println!(
                "  {}: {} ({})",
                text(language, MessageKey::VehicleType),
                text(language, tier.display_name),
                text(language, tier.capacity_description)
            );
            println!(
                "  {}: {} x {} x {} cm",
                text(language, MessageKey::MaxDimensions),
                bounds.length_cm,
                bounds.width_cm,
                bounds.height_cm
            );
            println!(
                "  {}: {:.0} cm³",
                text(language, MessageKey::VolumePerUnit),
                breakdown.unit_volume_cm3
            );
            println!(
                "  {}: {:.0} cm³ ({} x)",
                text(language, MessageKey::TotalVolume),
                breakdown.total_volume_cm3,
                breakdown.volume_count
            );
            println!(
                "  {}: €{:.2}",
                text(language, MessageKey::PricePerKm),
                breakdown.price_per_km
            );
            println!(
                "  {}: {:.1} km",
                text(language, MessageKey::OneWayDistance),
                breakdown.one_way_distance_km
            );
            println!(
                "  {}: {:.1} km",
                text(language, MessageKey::RoundTripDistance),
                breakdown.round_trip_distance_km
            );
        }
        Quotation::Air(quote) => {
            println!("{}", text(language, quote.follow_up));
            println!(
                "  {}: {:.1} km",
                text(language, MessageKey::OneWayDistance),
                quote.one_way_distance_km
            );
        }
    }
}

fn print_form(session: &QuotationSession) {
    let language = session.language();
    let request = session.request();
    let measures = &request.measures;
    let dims = measures.dimensions;
    let show = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());

    println!("{} [{}]", text(language, MessageKey::OrderDetails), session.phase().name());
    if let Some(kind) = request.service_kind {
        println!(
            "  {}: {}",
            text(language, MessageKey::ServiceType),
            text(language, kind.label())
        );
    }
    for side in AddressSide::ALL {
        let resolved = match request.address(side) {
            Some(found) => found.formatted.clone(),
            None => session.address_input(side).text().to_string(),
        };
        println!("  {}: {resolved}", text(language, side_label(side)));
    }
    println!("  {}: {} kg", text(language, MessageKey::Weight), show(measures.weight_kg));
    println!(
        "  {}: {}",
        text(language, MessageKey::NumberOfVolumes),
        measures.volume_count.map_or_else(|| "-".to_string(), |n| n.to_string())
    );
    println!(
        "  {}: {} x {} x {} cm",
        text(language, MessageKey::Dimensions),
        show(dims.length_cm),
        show(dims.width_cm),
        show(dims.height_cm)
    );
    if let Some(quotation) = session.quotation() {
        print_quotation(language, quotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_not_a_command() {
        assert_eq!(Command::parse("   "), Ok(None));
    }

    #[test]
    fn parses_service_and_addresses() {
        assert_eq!(
            Command::parse("service AIR"),
            Ok(Some(Command::Service(ServiceKind::Air)))
        );
        assert_eq!(
            Command::parse("origin  Rua Augusta, Lisboa "),
            Ok(Some(Command::Address(
                AddressSide::Origin,
                "Rua Augusta, Lisboa".into()
            )))
        );
        assert_eq!(
            Command::parse("to"),
            Ok(Some(Command::Address(AddressSide::Destination, String::new())))
        );
    }

    #[test]
    fn pick_is_one_based() {
        assert_eq!(
            Command::parse("pick destination 2"),
            Ok(Some(Command::Pick(AddressSide::Destination, 1)))
        );
        assert!(matches!(Command::parse("pick origin 0"), Err(ParseError::Usage(_))));
        assert!(matches!(Command::parse("pick nowhere 1"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn measures_accept_comma_decimals() {
        assert_eq!(Command::parse("weight 12,5"), Ok(Some(Command::Weight(Some(12.5)))));
        assert_eq!(Command::parse("weight"), Ok(Some(Command::Weight(None))));
        assert_eq!(
            Command::parse("dims 100 50,5 40"),
            Ok(Some(Command::Dimensions(UnitDimensions::new(100.0, 50.5, 40.0))))
        );
        assert!(matches!(Command::parse("dims 100 50"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn unknown_verb_is_reported() {
        assert_eq!(
            Command::parse("teleport now"),
            Err(ParseError::Unknown("teleport".into()))
        );
    }
}
