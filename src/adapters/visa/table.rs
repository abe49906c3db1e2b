//! Static visa requirement table loaded from JSON.
//!
//! Two files make up the table:
//!
//! - `visa_information.json`: `{PASSPORT: {visaFree: {DEST: {maxStay}}, visaOnArrival: {...}}}`
//! - `country_names.json`: `{CODE: "Display name"}`

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::foundation::CountryCode;

const UNKNOWN_PASSPORT_NAME: &str = "Unknown passport country";
const UNKNOWN_DESTINATION_NAME: &str = "Unknown destination";

/// Errors loading the table files.
#[derive(Debug, thiserror::Error)]
pub enum VisaTableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Maximum stay as recorded in the data; usually days, sometimes free text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MaxStay {
    Days(u32),
    Text(String),
}

impl fmt::Display for MaxStay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxStay::Days(days) => write!(f, "{}", days),
            MaxStay::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StayRule {
    max_stay: MaxStay,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PassportEntry {
    #[serde(default)]
    visa_free: HashMap<String, StayRule>,
    #[serde(default)]
    visa_on_arrival: HashMap<String, StayRule>,
}

/// Outcome of a table lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisaRule {
    VisaFree { max_stay: MaxStay },
    OnArrival { max_stay: MaxStay },
    /// Passport is listed but the destination grants no exemption.
    AdvanceVisa,
    /// Passport has no entry at all.
    NotListed,
}

/// In-memory visa table.
#[derive(Debug, Clone, Default)]
pub struct VisaTable {
    entries: HashMap<String, PassportEntry>,
    names: HashMap<String, String>,
}

impl VisaTable {
    /// Loads both files from disk.
    pub fn load(
        visa_information: impl AsRef<Path>,
        country_names: impl AsRef<Path>,
    ) -> Result<Self, VisaTableError> {
        let entries = read_json(visa_information.as_ref())?;
        let names = read_json(country_names.as_ref())?;
        Ok(Self { entries, names })
    }

    /// Builds a table from JSON strings.
    pub fn from_json(visa_information: &str, country_names: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entries: serde_json::from_str(visa_information)?,
            names: serde_json::from_str(country_names)?,
        })
    }

    pub fn passport_count(&self) -> usize {
        self.entries.len()
    }

    /// Display name for a code, if the names file has one.
    pub fn name(&self, code: &CountryCode) -> Option<&str> {
        self.names.get(code.as_str()).map(String::as_str)
    }

    pub fn passport_name(&self, code: &CountryCode) -> &str {
        self.name(code).unwrap_or(UNKNOWN_PASSPORT_NAME)
    }

    pub fn destination_name(&self, code: &CountryCode) -> &str {
        self.name(code).unwrap_or(UNKNOWN_DESTINATION_NAME)
    }

    /// Looks up the rule for a passport/destination pair.
    ///
    /// Visa-free takes priority over visa on arrival.
    pub fn lookup(&self, passport: &CountryCode, destination: &CountryCode) -> VisaRule {
        let Some(entry) = self.entries.get(passport.as_str()) else {
            return VisaRule::NotListed;
        };
        if let Some(rule) = entry.visa_free.get(destination.as_str()) {
            return VisaRule::VisaFree {
                max_stay: rule.max_stay.clone(),
            };
        }
        if let Some(rule) = entry.visa_on_arrival.get(destination.as_str()) {
            return VisaRule::OnArrival {
                max_stay: rule.max_stay.clone(),
            };
        }
        VisaRule::AdvanceVisa
    }

    /// Renders the requirement sentence for a listed passport.
    ///
    /// Returns `None` for `NotListed`.
    pub fn describe(&self, passport: &CountryCode, destination: &CountryCode) -> Option<String> {
        let passport_name = self.passport_name(passport);
        let destination_name = self.destination_name(destination);
        match self.lookup(passport, destination) {
            VisaRule::VisaFree { max_stay } => Some(format!(
                "{} passport holders are exempt from visa for travel to {} with a maximum stay of {} days.",
                passport_name, destination_name, max_stay
            )),
            VisaRule::OnArrival { max_stay } => Some(format!(
                "{} passport holders can obtain a visa upon arrival which will give you {}-day maximum stay.",
                passport_name, max_stay
            )),
            VisaRule::AdvanceVisa => Some(format!(
                "{} passport holders will need to apply for a visa in advance at a {} consulate - there are no visa on arrival or visa exemptions.",
                passport_name, destination_name
            )),
            VisaRule::NotListed => None,
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, VisaTableError> {
    let raw = std::fs::read_to_string(path).map_err(|source| VisaTableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| VisaTableError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
