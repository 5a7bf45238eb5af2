//! Typed catalog records and their construction from loose list rows.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::access::AccessList;

/// One row as returned by the list service: ordered column name to value.
pub type RawRow = IndexMap<String, String>;

/// Column names the catalog list is expected to carry. An empty sync result
/// reports exactly this shape so callers can render a blank catalog.
pub const CATALOG_COLUMNS: &[&str] = &[
    columns::NAME,
    columns::DESCRIPTION,
    columns::EXECUTABLE_LOCATION,
    columns::ENVIRONMENT,
    columns::RELEASE_DATE,
    columns::VALIDITY_PERIOD_DAYS,
    columns::VERSION_NUMBER,
    columns::REGISTRATION_ID,
    columns::ACCESS,
];

pub mod columns {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const EXECUTABLE_LOCATION: &str = "executable_location";
    pub const ENVIRONMENT: &str = "environment";
    pub const RELEASE_DATE: &str = "release_date";
    pub const VALIDITY_PERIOD_DAYS: &str = "validity_period_days";
    pub const VERSION_NUMBER: &str = "version_number";
    pub const REGISTRATION_ID: &str = "registration_id";
    pub const ACCESS: &str = "access";
}

/// Deployment environment a solution is published under.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Environment {
    Uat,
    #[default]
    Beta,
    Prod,
}

impl Environment {
    /// Unknown or missing values fall back to `BETA`, the least privileged
    /// tier.
    pub fn parse(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub executable_location: String,
    #[serde(default)]
    pub environment: Environment,
    /// Kept as the wire string; expiry evaluation parses it fail-open.
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub validity_period_days: Option<i64>,
    #[serde(default)]
    pub version_number: Option<String>,
    #[serde(default)]
    pub registration_id: Option<String>,
    #[serde(default)]
    pub access: AccessList,
}

impl CatalogEntry {
    /// Builds an entry from a list row, normalizing missing columns to empty
    /// values. Rows never fail to construct; malformed dates and versions are
    /// carried through and handled fail-open where they are evaluated.
    pub fn from_row(row: &RawRow) -> Self {
        let field = |key: &str| row.get(key).map(|v| v.trim().to_string()).unwrap_or_default();
        let optional = |key: &str| {
            let value = field(key);
            (!value.is_empty()).then_some(value)
        };

        let validity = field(columns::VALIDITY_PERIOD_DAYS);
        let validity_period_days = match validity.parse::<i64>() {
            Ok(days) => Some(days),
            Err(_) => {
                if !validity.is_empty() {
                    tracing::warn!(value = %validity, "unparseable validity period");
                }
                None
            }
        };

        Self {
            name: field(columns::NAME),
            description: field(columns::DESCRIPTION),
            executable_location: field(columns::EXECUTABLE_LOCATION),
            environment: Environment::parse(&field(columns::ENVIRONMENT)),
            release_date: field(columns::RELEASE_DATE),
            validity_period_days,
            version_number: optional(columns::VERSION_NUMBER),
            registration_id: optional(columns::REGISTRATION_ID),
            access: AccessList::parse(&field(columns::ACCESS)),
        }
    }

    /// Renders the entry back into row form for admin writes.
    pub fn to_row(&self) -> RawRow {
        let mut row = RawRow::new();
        row.insert(columns::NAME.into(), self.name.clone());
        row.insert(columns::DESCRIPTION.into(), self.description.clone());
        row.insert(
            columns::EXECUTABLE_LOCATION.into(),
            self.executable_location.clone(),
        );
        row.insert(columns::ENVIRONMENT.into(), self.environment.to_string());
        row.insert(columns::RELEASE_DATE.into(), self.release_date.clone());
        row.insert(
            columns::VALIDITY_PERIOD_DAYS.into(),
            self.validity_period_days
                .map(|days| days.to_string())
                .unwrap_or_default(),
        );
        row.insert(
            columns::VERSION_NUMBER.into(),
            self.version_number.clone().unwrap_or_default(),
        );
        row.insert(
            columns::REGISTRATION_ID.into(),
            self.registration_id.clone().unwrap_or_default(),
        );
        row.insert(columns::ACCESS.into(), self.access.as_column());
        row
    }

    pub fn is_registered(&self) -> bool {
        self.registration_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn missing_columns_normalize_to_empty() {
        let entry = CatalogEntry::from_row(&row(&[(columns::NAME, "Ledger")]));
        assert_eq!(entry.name, "Ledger");
        assert_eq!(entry.description, "");
        assert_eq!(entry.environment, Environment::Beta);
        assert_eq!(entry.version_number, None);
        assert_eq!(entry.registration_id, None);
        assert!(!entry.access.grants("anyone"));
    }

    #[test]
    fn malformed_validity_survives_construction() {
        let entry = CatalogEntry::from_row(&row(&[
            (columns::NAME, "Ledger"),
            (columns::VALIDITY_PERIOD_DAYS, "soon"),
        ]));
        assert_eq!(entry.validity_period_days, None);
    }

    #[test]
    fn environment_parses_case_insensitively_with_beta_fallback() {
        assert_eq!(Environment::parse("prod"), Environment::Prod);
        assert_eq!(Environment::parse("UAT"), Environment::Uat);
        assert_eq!(Environment::parse("staging"), Environment::Beta);
        assert_eq!(Environment::parse(""), Environment::Beta);
    }

    #[test]
    fn row_round_trip_preserves_fields() {
        let entry = CatalogEntry::from_row(&row(&[
            (columns::NAME, "Ledger"),
            (columns::DESCRIPTION, "Monthly close helper"),
            (columns::EXECUTABLE_LOCATION, "/shared/ledger/Ledger.exe"),
            (columns::ENVIRONMENT, "PROD"),
            (columns::RELEASE_DATE, "2023-01-01"),
            (columns::VALIDITY_PERIOD_DAYS, "365"),
            (columns::VERSION_NUMBER, "2.0"),
            (columns::ACCESS, "everyone"),
        ]));
        let rebuilt = CatalogEntry::from_row(&entry.to_row());
        assert_eq!(entry, rebuilt);
    }
}
