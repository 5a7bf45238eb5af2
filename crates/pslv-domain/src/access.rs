//! Per-entry access lists: lower-cased user ids with an `everyone` wildcard.

use serde::{Deserialize, Serialize};

/// Wildcard id granting every user visibility of an entry.
pub const EVERYONE: &str = "everyone";

const SEPARATOR: char = ';';

/// The set of user ids allowed to see a catalog entry. Stored on the wire as
/// a semicolon-separated column; ids compare case-insensitively by always
/// being held lower-cased.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AccessList {
    ids: Vec<String>,
}

impl AccessList {
    pub fn parse(raw: &str) -> Self {
        let mut ids = Vec::new();
        for id in raw.split(SEPARATOR) {
            let id = id.trim().to_lowercase();
            if !id.is_empty() && !ids.contains(&id) {
                ids.push(id);
            }
        }
        Self { ids }
    }

    pub fn grants_everyone(&self) -> bool {
        self.ids.iter().any(|id| id == EVERYONE)
    }

    /// Whether `user` may see the entry, either directly or via `everyone`.
    pub fn grants(&self, user: &str) -> bool {
        let user = user.to_lowercase();
        self.grants_everyone() || self.ids.iter().any(|id| *id == user)
    }

    /// Adds an id; returns false when it was already present.
    pub fn grant(&mut self, id: &str) -> bool {
        let id = id.trim().to_lowercase();
        if id.is_empty() || self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Removes an id; returns false when it was not present.
    pub fn revoke(&mut self, id: &str) -> bool {
        let id = id.trim().to_lowercase();
        let before = self.ids.len();
        self.ids.retain(|existing| *existing != id);
        self.ids.len() != before
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn as_column(&self) -> String {
        self.ids.join(";")
    }
}

impl From<String> for AccessList {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<AccessList> for String {
    fn from(list: AccessList) -> Self {
        list.as_column()
    }
}
