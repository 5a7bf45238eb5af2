//! Blocking HTTP client for the named-list service.
//!
//! The wire shape is deliberately small: a list exposes `items` as a JSON
//! array of flat objects, reads accept a `contains=column:needle` filter,
//! writes are "new row" (POST) and "update row" (PATCH by key column).

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use pslv_domain::RawRow;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use url::Url;

use crate::core::effects::ListService;
use crate::core::tooling::outcome::UserFriendlyError;
use crate::core::PSLV_VERSION;

pub(crate) const SITE_URL_ENV: &str = "PSLV_SITE_URL";
pub(crate) const TOKEN_ENV: &str = "PSLV_TOKEN";

pub(crate) fn build_http_client() -> Result<Client> {
    let keep_proxies = env::var("PSLV_KEEP_PROXIES")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let builder = Client::builder()
        .user_agent(format!("pslv/{PSLV_VERSION}"))
        .timeout(Duration::from_secs(60));
    let builder = if keep_proxies {
        builder
    } else {
        builder.no_proxy()
    };
    builder.build().context("failed to build HTTP client")
}

#[derive(Debug)]
pub struct HttpListService {
    base: Url,
    token: Option<String>,
    client: Client,
}

impl HttpListService {
    pub fn new(base: Url, token: Option<String>) -> Result<Self> {
        Ok(Self {
            base,
            token,
            client: build_http_client()?,
        })
    }

    pub fn from_env() -> Result<Self> {
        let raw = env::var(SITE_URL_ENV).map_err(|_| {
            UserFriendlyError::new(
                format!("{SITE_URL_ENV} is not set; cannot reach the list service"),
                json!({ "hint": format!("export {SITE_URL_ENV}=<list service url>") }),
            )
        })?;
        let base = Url::parse(&raw).with_context(|| format!("invalid {SITE_URL_ENV}: {raw}"))?;
        let token = env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        Self::new(base, token)
    }

    fn items_url(&self, list: &str) -> Result<Url> {
        self.base
            .join(&format!("lists/{list}/items"))
            .with_context(|| format!("building items URL for list {list}"))
    }

    fn request(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn get_rows(&self, url: Url) -> Result<Vec<RawRow>> {
        let response = self
            .request(self.client.get(url.clone()))
            .send()
            .with_context(|| format!("querying {url}"))?
            .error_for_status()
            .with_context(|| format!("list service rejected {url}"))?;
        let raw: Vec<IndexMap<String, Value>> = response
            .json()
            .with_context(|| format!("invalid JSON from {url}"))?;
        Ok(raw.into_iter().map(normalize_row).collect())
    }
}

/// Rows arrive with whatever value types the service stores; everything the
/// launcher consumes is a string, and null becomes empty.
fn normalize_row(raw: IndexMap<String, Value>) -> RawRow {
    raw.into_iter()
        .map(|(column, value)| {
            let text = match value {
                Value::Null => String::new(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            (column, text)
        })
        .collect()
}

impl ListService for HttpListService {
    fn fetch_all(&self, list: &str) -> Result<Vec<RawRow>> {
        self.get_rows(self.items_url(list)?)
    }

    fn fetch_contains(&self, list: &str, column: &str, needle: &str) -> Result<Vec<RawRow>> {
        let mut url = self.items_url(list)?;
        url.query_pairs_mut()
            .append_pair("contains", &format!("{column}:{needle}"));
        self.get_rows(url)
    }

    fn append(&self, list: &str, row: &RawRow) -> Result<()> {
        let url = self.items_url(list)?;
        self.request(self.client.post(url.clone()))
            .json(row)
            .send()
            .with_context(|| format!("posting to {url}"))?
            .error_for_status()
            .with_context(|| format!("list service rejected new row on {list}"))?;
        Ok(())
    }

    fn update(&self, list: &str, key_column: &str, key: &str, row: &RawRow) -> Result<()> {
        let mut url = self.items_url(list)?;
        url.query_pairs_mut()
            .append_pair("match", &format!("{key_column}:{key}"));
        self.request(self.client.patch(url.clone()))
            .json(row)
            .send()
            .with_context(|| format!("patching {url}"))?
            .error_for_status()
            .with_context(|| format!("list service rejected update on {list}"))?;
        Ok(())
    }
}
