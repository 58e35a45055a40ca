use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::model::{Ability, CategoryTag, Metric, Record, RecordError, RecordId, Size};
use crate::MAX_METRIC_VALUE;

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error {status}")]
    Status { status: u16 },

    #[error("request failed: {message}")]
    Transport { message: String },

    #[error("response had no body")]
    MissingBody,

    #[error("malformed response body: {message}")]
    Decode { message: String },
}

impl HttpError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404 })
    }
}

/// An absolute http(s) base URL whose path always ends in `/`, so endpoint
/// paths can be appended directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpError> {
        let url = url.into();
        let trimmed = url.trim();

        if trimmed.is_empty() {
            return Err(HttpError::InvalidUrl {
                url: String::new(),
                reason: "URL cannot be empty".to_string(),
            });
        }

        if trimmed.len() > MAX_URL_LENGTH {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(trimmed),
                reason: format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            });
        }

        let mut parsed = Url::parse(trimmed).map_err(|e| HttpError::InvalidUrl {
            url: Self::truncate_url(trimmed),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme().to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(trimmed),
                reason: format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            });
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl {
                url: Self::truncate_url(trimmed),
                reason: "URL must have a host".to_string(),
            })?
            .to_lowercase();

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(trimmed),
                reason: "credentials in URL are not allowed".to_string(),
            });
        }

        parsed.set_query(None);
        parsed.set_fragment(None);
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        Ok(Self {
            url: parsed.to_string(),
            host,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            url.to_string()
        } else {
            let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
            format!("{}...", &url[..cut])
        }
    }
}

/// Upstream endpoint paths, resolved against the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: ValidatedUrl,
}

impl Endpoints {
    #[must_use]
    pub fn new(base: ValidatedUrl) -> Self {
        Self { base }
    }

    #[must_use]
    pub fn index(&self, limit: usize) -> String {
        format!("{}pokemon?limit={limit}&offset=0", self.base.as_str())
    }

    #[must_use]
    pub fn record(&self, id: RecordId) -> String {
        format!("{}pokemon/{id}", self.base.as_str())
    }

    #[must_use]
    pub fn category_kinds(&self) -> String {
        format!("{}type", self.base.as_str())
    }
}

/// The shell may report an error status either as a response or as
/// `Error::Http`; both become [`HttpError::Status`].
fn transport_error(error: crux_http::Error) -> HttpError {
    match error {
        crux_http::Error::Http(e) => HttpError::Status {
            status: u16::from(e.code),
        },
        other => HttpError::Transport {
            message: other.to_string(),
        },
    }
}

/// Unwraps a successful response body, turning transport errors, non-2xx
/// statuses and empty bodies into [`HttpError`].
pub fn response_body<T>(
    result: crux_http::Result<crux_http::Response<T>>,
) -> Result<T, HttpError> {
    let mut response = result.map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(HttpError::Status {
            status: u16::from(status),
        });
    }

    response.take_body().ok_or(HttpError::MissingBody)
}

/// Like [`response_body`] for a raw byte response, decoding JSON only once
/// the status is known to be a success. Error bodies are usually not JSON.
pub fn json_body<T: DeserializeOwned>(
    result: crux_http::Result<crux_http::Response<Vec<u8>>>,
) -> Result<T, HttpError> {
    let bytes = response_body(result)?;
    serde_json::from_slice(&bytes).map_err(|e| HttpError::Decode {
        message: e.to_string(),
    })
}

// --- Upstream wire shapes ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl NamedResource {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }
}

/// `GET /pokemon?limit=N` and `GET /type` share this envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPage {
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default, deserialize_with = "lenient")]
    pub official_artwork: Option<ArtworkPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpritesPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub front_default: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub slot: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatPayload {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    pub id: u32,
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub sprites: SpritesPayload,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub stats: Vec<StatPayload>,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
}

/// Media references are optional decoration. A null or oddly shaped value
/// decodes as "no media" for that reference alone; its siblings still decode.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn parse_media(raw: Option<String>, id: u32) -> Option<Url> {
    let raw = raw?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(record_id = id, error = %e, "ignoring malformed media url");
            None
        }
    }
}

impl TryFrom<RecordPayload> for Record {
    type Error = RecordError;

    fn try_from(payload: RecordPayload) -> Result<Self, Self::Error> {
        let RecordPayload {
            id,
            name,
            sprites,
            mut types,
            abilities,
            stats,
            height,
            weight,
        } = payload;

        types.sort_by_key(|t| t.slot);

        let artwork = sprites
            .other
            .and_then(|o| o.official_artwork)
            .and_then(|a| a.front_default);

        let metrics = stats
            .into_iter()
            .map(|s| {
                let value = u8::try_from(s.base_stat).unwrap_or_else(|_| {
                    warn!(record_id = id, metric = %s.stat.name, value = s.base_stat, "clamping metric");
                    MAX_METRIC_VALUE
                });
                Metric {
                    name: s.stat.name,
                    value,
                }
            })
            .collect();

        Record {
            id: RecordId(id),
            name: name.to_lowercase(),
            primary_media: parse_media(artwork, id),
            thumbnail: parse_media(sprites.front_default, id),
            categories: types
                .into_iter()
                .map(|t| CategoryTag::new(t.kind.name))
                .collect(),
            attributes: abilities
                .into_iter()
                .map(|a| Ability {
                    name: a.ability.name,
                    hidden: a.is_hidden,
                })
                .collect(),
            metrics,
            size: Size {
                length_dm: height,
                mass_hg: weight,
            },
        }
        .validate()
    }
}
