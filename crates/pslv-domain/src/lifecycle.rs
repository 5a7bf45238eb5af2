//! Expiry, update-availability, and tile-state rules for catalog entries.
//!
//! Date and version parsing fail open: an entry whose metadata cannot be
//! interpreted stays usable rather than locking the user out.

use time::{format_description::FormatItem, Date, Duration};

use crate::catalog::{CatalogEntry, Environment};
use crate::install::InstallRecord;

const DATE_FORMAT: &[FormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]");

/// Parses the leading `YYYY-MM-DD` of a release-date value. List services
/// frequently append a time component; anything past the date is ignored.
pub fn parse_release_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    match Date::parse(head, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            if !raw.is_empty() {
                tracing::warn!(value = %raw, "unparseable release date");
            }
            None
        }
    }
}

/// The last day an entry is valid, when its metadata allows computing one.
pub fn expiry_date(entry: &CatalogEntry) -> Option<Date> {
    let release = parse_release_date(&entry.release_date)?;
    let days = entry.validity_period_days?;
    release.checked_add(Duration::days(days))
}

/// `today > release_date + validity_period_days`; malformed metadata means
/// not expired.
pub fn is_expired(entry: &CatalogEntry, today: Date) -> bool {
    expiry_date(entry).is_some_and(|expiry| today > expiry)
}

/// Days until expiry, negative once past it. None when expiry is unknowable.
pub fn days_remaining(entry: &CatalogEntry, today: Date) -> Option<i64> {
    expiry_date(entry).map(|expiry| (expiry - today).whole_days())
}

fn parse_version(raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(version) => Some(version),
        Err(_) => {
            tracing::warn!(value = %raw, "unparseable version number");
            None
        }
    }
}

/// Whether an installed entry has a newer catalog version than its marker
/// records. A missing marker on an installed entry reads as stale so the
/// user is steered toward a reinstall.
pub fn update_available(entry: &CatalogEntry, record: &InstallRecord) -> bool {
    if !record.is_installed() {
        return false;
    }
    let Some(catalog_version) = entry.version_number.as_deref().and_then(parse_version) else {
        return false;
    };
    match record.installed_version() {
        None => true,
        Some(installed) => catalog_version > installed,
    }
}

/// What a catalog entry's tile shows, in evaluation priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileState {
    Expired,
    UpdateAvailable,
    Installed,
    NotInstalled,
}

impl TileState {
    pub fn evaluate(entry: &CatalogEntry, record: &InstallRecord, today: Date) -> Self {
        if is_expired(entry, today) {
            Self::Expired
        } else if update_available(entry, record) {
            Self::UpdateAvailable
        } else if record.is_installed() {
            Self::Installed
        } else {
            Self::NotInstalled
        }
    }

    /// Primary action label; expired tiles offer no action.
    pub fn button_label(self) -> Option<&'static str> {
        match self {
            Self::Expired => None,
            Self::UpdateAvailable => Some("Update"),
            Self::Installed => Some("Launch"),
            Self::NotInstalled => Some("Install"),
        }
    }

    pub fn status_line(self, environment: Environment) -> &'static str {
        match self {
            Self::Expired => {
                if environment == Environment::Prod {
                    "Application Expired"
                } else {
                    "UAT Period Expired"
                }
            }
            Self::UpdateAvailable => "Update Available",
            Self::Installed => "Ready for Launch",
            Self::NotInstalled => "Not Installed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::UpdateAvailable => "update-available",
            Self::Installed => "installed",
            Self::NotInstalled => "not-installed",
        }
    }
}

/// Orders a catalog for display: active entries first, then by name.
pub fn order_catalog(entries: &mut [CatalogEntry], today: Date) {
    entries.sort_by(|a, b| {
        is_expired(a, today)
            .cmp(&is_expired(b, today))
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{columns, RawRow};
    use time::macros::date;

    fn entry(release: &str, validity: &str, version: &str) -> CatalogEntry {
        let row: RawRow = [
            (columns::NAME.to_string(), "Ledger".to_string()),
            (columns::RELEASE_DATE.to_string(), release.to_string()),
            (columns::VALIDITY_PERIOD_DAYS.to_string(), validity.to_string()),
            (columns::VERSION_NUMBER.to_string(), version.to_string()),
        ]
        .into_iter()
        .collect();
        CatalogEntry::from_row(&row)
    }

    fn record(dir: &std::path::Path) -> InstallRecord {
        InstallRecord::locate(dir, "Ledger", "/shared/Ledger.exe")
    }

    #[test]
    fn thirty_day_validity_expires_by_march() {
        let e = entry("2023-01-01", "30", "");
        assert!(is_expired(&e, date!(2023 - 03 - 01)));
    }

    #[test]
    fn expiry_is_monotonic_in_now() {
        let e = entry("2023-01-01", "30", "");
        let mut day = date!(2023 - 01 - 02);
        let mut seen_expired = false;
        for _ in 0..120 {
            let expired = is_expired(&e, day);
            assert!(!seen_expired || expired, "expiry regressed at {day}");
            seen_expired = expired;
            day = day.next_day().unwrap();
        }
        assert!(seen_expired);
    }

    #[test]
    fn day_of_expiry_is_still_valid() {
        let e = entry("2023-01-01", "30", "");
        assert!(!is_expired(&e, date!(2023 - 01 - 31)));
        assert!(is_expired(&e, date!(2023 - 02 - 01)));
    }

    #[test]
    fn malformed_date_fails_open() {
        let e = entry("next tuesday", "30", "");
        assert!(!is_expired(&e, date!(2099 - 01 - 01)));
        assert_eq!(expiry_date(&e), None);
    }

    #[test]
    fn missing_validity_fails_open() {
        let e = entry("2023-01-01", "", "");
        assert!(!is_expired(&e, date!(2099 - 01 - 01)));
    }

    #[test]
    fn update_available_requires_newer_catalog_version() {
        let dir = tempfile::tempdir().unwrap();
        let rec = record(dir.path());
        std::fs::create_dir_all(rec.install_dir()).unwrap();
        std::fs::write(rec.executable(), b"bin").unwrap();
        rec.write_version("1.5").unwrap();

        let newer = entry("2023-01-01", "365", "2.0");
        let same = entry("2023-01-01", "365", "1.5");
        assert!(update_available(&newer, &rec));
        assert!(!update_available(&same, &rec));
    }

    #[test]
    fn missing_marker_on_installed_entry_reads_as_stale() {
        let dir = tempfile::tempdir().unwrap();
        let rec = record(dir.path());
        std::fs::create_dir_all(rec.install_dir()).unwrap();
        std::fs::write(rec.executable(), b"bin").unwrap();

        let e = entry("2023-01-01", "365", "2.0");
        assert!(update_available(&e, &rec));
    }

    #[test]
    fn not_installed_never_reports_update() {
        let dir = tempfile::tempdir().unwrap();
        let e = entry("2023-01-01", "365", "2.0");
        assert!(!update_available(&e, &record(dir.path())));
    }

    #[test]
    fn tile_state_priority_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let rec = record(dir.path());
        let today = date!(2023 - 06 - 01);

        let fresh = entry("2023-01-01", "365", "2.0");
        assert_eq!(TileState::evaluate(&fresh, &rec, today), TileState::NotInstalled);
        assert_eq!(TileState::NotInstalled.button_label(), Some("Install"));

        std::fs::create_dir_all(rec.install_dir()).unwrap();
        std::fs::write(rec.executable(), b"bin").unwrap();
        rec.write_version("2.0").unwrap();
        assert_eq!(TileState::evaluate(&fresh, &rec, today), TileState::Installed);
        assert_eq!(TileState::Installed.button_label(), Some("Launch"));

        rec.write_version("1.5").unwrap();
        assert_eq!(
            TileState::evaluate(&fresh, &rec, today),
            TileState::UpdateAvailable
        );
        assert_eq!(TileState::UpdateAvailable.button_label(), Some("Update"));

        let dead = entry("2023-01-01", "30", "2.0");
        assert_eq!(TileState::evaluate(&dead, &rec, today), TileState::Expired);
        assert_eq!(TileState::Expired.button_label(), None);
    }

    #[test]
    fn expired_status_line_depends_on_environment() {
        assert_eq!(
            TileState::Expired.status_line(Environment::Prod),
            "Application Expired"
        );
        assert_eq!(
            TileState::Expired.status_line(Environment::Beta),
            "UAT Period Expired"
        );
    }

    #[test]
    fn ordering_puts_expired_entries_last() {
        let mut entries = vec![
            entry("2023-01-01", "30", ""),
            entry("2023-01-01", "3650", ""),
        ];
        entries[0].name = "Alpha".into();
        entries[1].name = "Zulu".into();
        order_catalog(&mut entries, date!(2023 - 06 - 01));
        assert_eq!(entries[0].name, "Zulu");
        assert_eq!(entries[1].name, "Alpha");
    }
}
