use semver::Version;
use thiserror::Error;

pub const APP_NAME: &str = "Freight Quote";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

#[derive(Error, Debug)]
#[error("invalid version format: {0}")]
pub struct InvalidVersion(String);

fn parse_version_str(input: &str) -> Result<Version, InvalidVersion> {
    let trimmed = input.trim_start_matches(|ch| ch == 'v' || ch == 'V');
    Version::parse(trimmed).map_err(|err| InvalidVersion(err.to_string()))
}

pub fn current_version() -> Result<Version, InvalidVersion> {
    if let Some(tag) = GIT_TAG {
        return parse_version_str(tag);
    }

    parse_version_str(APP_VERSION)
}

pub fn version_label() -> String {
    match GIT_TAG {
        Some(tag) => tag.to_string(),
        None => format!("v{}", APP_VERSION),
    }
}

/// Version label plus the commit it was built from, when known.
pub fn build_label() -> String {
    match GIT_COMMIT {
        Some(commit) => format!("{} ({commit})", version_label()),
        None => version_label(),
    }
}

/// User-Agent sent to the geocoder.
pub fn user_agent() -> String {
    let version = current_version()
        .map(|version| version.to_string())
        .unwrap_or_else(|_| APP_VERSION.to_string());
    format!("freight-quote/{version}")
}
