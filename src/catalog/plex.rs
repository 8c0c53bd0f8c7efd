// src/catalog/plex.rs

//! Plex Media Server client
//!
//! Blocking HTTP client for the handful of Plex endpoints the sync pass needs.
//! Reads are retried with a linear back-off; edits are sent exactly once so a
//! failed write surfaces as an item error instead of being replayed.

use std::collections::VecDeque;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace, warn};
use url::Url;

use super::{Catalog, CatalogItem, FieldKind, FieldLocks, ItemIter, ItemKind, LibraryKind, LibraryRef};
use crate::error::{Error, Result};

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts for read requests
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds, multiplied by the attempt number
const RETRY_DELAY_MS: u64 = 1000;

/// Items requested per page when listing a library
const PAGE_SIZE: usize = 200;

/// Plex search type for episodes
const TYPE_EPISODE: u8 = 4;

/// Plex search type for movies
const TYPE_MOVIE: u8 = 1;

const PRODUCT: &str = "hide-spoilers";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Deserialize)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<PlexDirectory>,
}

#[derive(Debug, Deserialize)]
struct PlexDirectory {
    key: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataContainer {
    #[serde(default)]
    total_size: Option<usize>,
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PlexMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlexMetadata {
    rating_key: String,
    #[serde(default)]
    guid: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    thumb: Option<String>,
    #[serde(default)]
    grandparent_title: Option<String>,
    #[serde(default)]
    grandparent_thumb: Option<String>,
    #[serde(default)]
    parent_index: Option<u32>,
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    year: Option<u32>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(rename = "Field", default)]
    fields: Vec<PlexField>,
}

#[derive(Debug, Deserialize)]
struct PlexField {
    name: String,
    #[serde(default)]
    locked: bool,
}

impl PlexMetadata {
    /// Convert to a catalog item; `None` for types other than episode/movie
    fn into_item(self) -> Option<CatalogItem> {
        let kind = match self.kind.as_str() {
            "episode" => ItemKind::Episode,
            "movie" => ItemKind::Movie,
            _ => return None,
        };

        let mut locks = FieldLocks::default();
        for field in self.fields.iter().filter(|f| f.locked) {
            match field.name.as_str() {
                "title" => locks.title = true,
                "summary" => locks.summary = true,
                "thumb" => locks.thumbnail = true,
                _ => {}
            }
        }

        let guid = self
            .guid
            .unwrap_or_else(|| format!("plex://{}/{}", kind, self.rating_key));

        Some(CatalogItem {
            guid,
            key: self.rating_key,
            kind,
            show_title: self.grandparent_title,
            season: self.parent_index.filter(|_| kind == ItemKind::Episode),
            episode: self.index.filter(|_| kind == ItemKind::Episode),
            year: self.year.filter(|_| kind == ItemKind::Movie),
            watched: self.view_count.unwrap_or(0) > 0,
            title: self.title,
            summary: self.summary,
            thumbnail: self.thumb.unwrap_or_default(),
            locks,
            fallback_thumbnail: self.grandparent_thumb,
        })
    }
}

/// HTTP client for one Plex server
pub struct PlexClient {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl PlexClient {
    /// Create a client without contacting the server
    pub fn new(plex_url: &str, token: &str) -> Result<Self> {
        Url::parse(plex_url)
            .map_err(|e| Error::InitError(format!("Invalid Plex URL {plex_url}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("x-plex-product", HeaderValue::from_static(PRODUCT));
        headers.insert("x-plex-client-identifier", HeaderValue::from_static(PRODUCT));
        headers.insert(
            "x-plex-version",
            HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
        );
        let mut token_value = HeaderValue::from_str(token)
            .map_err(|e| Error::InitError(format!("Invalid Plex token: {e}")))?;
        token_value.set_sensitive(true);
        headers.insert("x-plex-token", token_value);

        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: plex_url.trim_end_matches('/').to_string(),
            max_retries: MAX_RETRIES,
        })
    }

    /// Create a client and verify the server answers with the given token
    pub fn connect(plex_url: &str, token: &str) -> Result<Self> {
        let client = Self::new(plex_url, token)?;
        let identity = client.client.get(client.endpoint("/identity")?).send().map_err(|e| {
            Error::ConnectivityError(format!("{}: {e}", client.base_url))
        })?;
        check_read_status(identity.status(), &client.base_url)?;
        // /identity answers without auth on some servers, so probe an authenticated route too
        let sections = client.client.get(client.endpoint("/library/sections")?).send().map_err(|e| {
            Error::ConnectivityError(format!("{}: {e}", client.base_url))
        })?;
        check_read_status(sections.status(), &client.base_url)?;

        info!("Connected to Plex server at {}", client.base_url);
        Ok(client)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| Error::InitError(format!("Invalid request URL for {path}: {e}")))
    }

    /// GET a JSON document, retrying transport failures
    fn get_json<T: DeserializeOwned>(&self, build: impl Fn() -> Result<RequestBuilder>) -> Result<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = build()?;
            match request.send() {
                Ok(response) => {
                    let status = response.status();
                    let url = response.url().path().to_string();
                    check_read_status(status, &url)?;
                    let envelope: Envelope<T> = response
                        .json()
                        .map_err(|e| Error::ParseError(format!("Failed to parse {url}: {e}")))?;
                    return Ok(envelope.media_container);
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::ConnectivityError(format!(
                            "Request failed after {attempt} attempts: {e}"
                        )));
                    }
                    warn!("Request attempt {} failed: {}, retrying...", attempt, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }

    fn fetch_page(&self, section_key: &str, item_type: u8, start: usize) -> Result<MetadataContainer> {
        let path = format!("/library/sections/{section_key}/all");
        trace!("Fetching {} (type {}) from offset {}", path, item_type, start);
        self.get_json(|| {
            let mut url = self.endpoint(&path)?;
            url.query_pairs_mut().append_pair("type", &item_type.to_string());
            Ok(self
                .client
                .get(url)
                .header("x-plex-container-start", start.to_string())
                .header("x-plex-container-size", PAGE_SIZE.to_string()))
        })
    }

    /// Send one edit; never retried
    fn put(&self, key: &str, action: &str, url: Url) -> Result<()> {
        debug!("PUT {}", url.path());
        let response = self.client.put(url).send().map_err(|e| Error::ItemWriteError {
            item: key.to_string(),
            action: action.to_string(),
            reason: e.to_string(),
        })?;

        write_status(response.status(), key, action)
    }

    fn edit_url(&self, key: &str, params: &[(String, String)]) -> Result<Url> {
        let mut url = self.endpoint(&format!("/library/metadata/{key}"))?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

/// Map the status of an edit or refresh to its outcome
fn write_status(status: StatusCode, key: &str, action: &str) -> Result<()> {
    if status == StatusCode::NOT_FOUND {
        return Err(Error::ItemVanished(key.to_string()));
    }
    if !status.is_success() {
        return Err(Error::ItemWriteError {
            item: key.to_string(),
            action: action.to_string(),
            reason: format!("HTTP {status}"),
        });
    }
    Ok(())
}

/// Whether a listing is complete after a page of `received` items ending at `next_start`
fn listing_done(received: usize, next_start: usize, total_size: Option<usize>) -> bool {
    received < PAGE_SIZE || total_size.is_some_and(|total| next_start >= total)
}

fn check_read_status(status: StatusCode, what: &str) -> Result<()> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::ConnectivityError(format!(
            "Authentication failed for {what} (HTTP 401); check plex_token"
        )));
    }
    if !status.is_success() {
        return Err(Error::ConnectivityError(format!("HTTP {status} from {what}")));
    }
    Ok(())
}

/// One-pass pager over a library listing
struct ItemPager<'a> {
    client: &'a PlexClient,
    section_key: String,
    item_type: u8,
    start: usize,
    buffer: VecDeque<CatalogItem>,
    done: bool,
}

impl Iterator for ItemPager<'_> {
    type Item = Result<CatalogItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }

            let page = match self.client.fetch_page(&self.section_key, self.item_type, self.start) {
                Ok(page) => page,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            let received = page.metadata.len();
            self.start += received;
            self.done = listing_done(received, self.start, page.total_size);
            self.buffer
                .extend(page.metadata.into_iter().filter_map(PlexMetadata::into_item));
        }
    }
}

impl Catalog for PlexClient {
    fn list_libraries(&self) -> Result<Vec<LibraryRef>> {
        let sections: SectionsContainer =
            self.get_json(|| Ok(self.client.get(self.endpoint("/library/sections")?)))?;

        Ok(sections
            .directories
            .into_iter()
            .map(|d| LibraryRef {
                key: d.key,
                title: d.title,
                kind: LibraryKind::from_plex(&d.kind),
            })
            .collect())
    }

    fn items<'a>(&'a self, library: &LibraryRef) -> Result<ItemIter<'a>> {
        let item_type = match &library.kind {
            LibraryKind::Show => TYPE_EPISODE,
            LibraryKind::Movie => TYPE_MOVIE,
            LibraryKind::Other(kind) => {
                return Err(Error::ParseError(format!(
                    "Library {} has unsupported type {kind}",
                    library.title
                )));
            }
        };

        Ok(Box::new(ItemPager {
            client: self,
            section_key: library.key.clone(),
            item_type,
            start: 0,
            buffer: VecDeque::new(),
            done: false,
        }))
    }

    fn write_field(&mut self, key: &str, kind: FieldKind, value: &str, lock: bool) -> Result<()> {
        let field = kind.plex_field();
        let url = self.edit_url(
            key,
            &[
                (format!("{field}.value"), value.to_string()),
                (format!("{field}.locked"), if lock { "1" } else { "0" }.to_string()),
            ],
        )?;
        self.put(key, &format!("edit {kind}"), url)
    }

    fn unlock_field(&mut self, key: &str, kind: FieldKind) -> Result<()> {
        let field = kind.plex_field();
        let url = self.edit_url(key, &[(format!("{field}.locked"), "0".to_string())])?;
        self.put(key, &format!("unlock {kind}"), url)
    }

    fn refresh_item(&mut self, key: &str) -> Result<()> {
        let url = self.endpoint(&format!("/library/metadata/{key}/refresh"))?;
        self.put(key, "refresh metadata", url)
    }
}
