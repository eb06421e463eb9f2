//! Turns a raw `query_plugins` payload into display-ready [`PluginRecord`]s.
//!
//! Required fields (`name`, `slug`) are validated while decoding; a payload
//! without them is a [`DirectoryError::Parse`]. Optional fields that are absent
//! or of an unexpected numeric shape become `None` / [`Ratio::Unknown`].

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::errors::{DirectoryConfigError, DirectoryError, DirectoryResult};
use crate::metrics::{ceil_percent, format_count};
use crate::record::{IconRef, PluginRecord, Ratio};

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
}

/// Entity the directory leaves in plugin names (en dash).
const EN_DASH_ENTITY: &str = "&#8211;";

/// Which description field feeds [`PluginRecord::description`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DescriptionMode {
    /// Full `description` HTML with tags replaced by newlines.
    #[default]
    Detailed,
    /// `short_description` as sent.
    Summary,
}

impl FromStr for DescriptionMode {
    type Err = DirectoryConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detailed" => Ok(DescriptionMode::Detailed),
            "summary" => Ok(DescriptionMode::Summary),
            other => Err(DirectoryConfigError::UnknownDescriptionMode(other.to_string())),
        }
    }
}

/// Lazy, single-pass sequence of records for one response.
#[derive(Debug)]
pub struct PluginRecords {
    inner: std::vec::IntoIter<RawPlugin>,
    mode: DescriptionMode,
}

impl Iterator for PluginRecords {
    type Item = PluginRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let mode = self.mode;
        self.inner.next().map(|raw| raw.into_record(mode))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for PluginRecords {}

/// Validates the transport status and decodes the body.
///
/// # Errors
/// - [`DirectoryError::Fetch`] for a non-success status; the message is the
///   status text
/// - [`DirectoryError::Parse`] for malformed JSON or missing `name`/`slug`
pub fn normalize_response(
    status: StatusCode,
    body: &[u8],
    mode: DescriptionMode,
) -> DirectoryResult<PluginRecords> {
    if !status.is_success() {
        let message = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string());
        return Err(DirectoryError::Fetch {
            status: status.as_u16(),
            message,
        });
    }

    let raw: RawSearchResponse = serde_json::from_slice(body)?;
    let plugins = raw.plugins.unwrap_or_default();
    debug!(count = plugins.len(), ?mode, "directory payload decoded");

    Ok(PluginRecords {
        inner: plugins.into_iter(),
        mode,
    })
}

/// Replaces the en-dash entity with `-`; other entities are left as sent.
pub fn decode_name(name: &str) -> String {
    name.replace(EN_DASH_ENTITY, "-")
}

/// Replaces every HTML tag with a newline.
pub fn strip_tags(html: &str) -> String {
    HTML_TAG.replace_all(html, "\n").into_owned()
}

pub fn plugin_url(slug: &str) -> String {
    format!("https://wordpress.org/plugins/{slug}/")
}

/* ==========================
Wire shapes
========================== */

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(default)]
    plugins: Option<Vec<RawPlugin>>,
}

#[derive(Debug, Deserialize)]
struct RawPlugin {
    name: String,
    slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    short_description: Option<String>,
    /// Object keyed by density (`"1x"`, `"2x"`, ...) or an empty array.
    #[serde(default)]
    icons: Option<Value>,
    #[serde(default)]
    download_link: Option<String>,
    #[serde(default)]
    version: Option<String>,
    /// Object keyed by star count, or an empty array for unrated plugins.
    #[serde(default)]
    ratings: Option<Value>,
    #[serde(default, deserialize_with = "de_count")]
    num_ratings: Option<u64>,
    #[serde(default, deserialize_with = "de_count")]
    support_threads_resolved: Option<u64>,
    #[serde(default, deserialize_with = "de_count")]
    support_threads: Option<u64>,
    #[serde(default, deserialize_with = "de_count")]
    downloaded: Option<u64>,
    #[serde(default)]
    last_updated: Option<String>,
}

impl RawPlugin {
    fn into_record(self, mode: DescriptionMode) -> PluginRecord {
        let description = match mode {
            DescriptionMode::Detailed => self
                .description
                .as_deref()
                .map(strip_tags)
                .or(self.short_description),
            DescriptionMode::Summary => self
                .short_description
                .or_else(|| self.description.as_deref().map(strip_tags)),
        }
        .unwrap_or_default();

        let icon = self
            .icons
            .as_ref()
            .and_then(|v| v.get("1x"))
            .and_then(Value::as_str)
            .map(|s| IconRef::Remote(s.to_string()));

        let one_star = self
            .ratings
            .as_ref()
            .and_then(|v| v.get("1"))
            .and_then(count_of);

        PluginRecord {
            name: decode_name(&self.name),
            description,
            url: plugin_url(&self.slug),
            icon,
            download: self.download_link,
            version: self.version,
            rating: ceil_percent(one_star, self.num_ratings),
            solved: ceil_percent(self.support_threads_resolved, self.support_threads),
            downloaded: self.downloaded.map(format_count),
            last_updated: self.last_updated,
        }
    }
}

/// Accepts integers, integral floats and numeric strings; anything else is `None`.
fn count_of(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn de_count<'de, D>(d: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(count_of))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(plugins: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({ "info": { "page": 1 }, "plugins": plugins })).unwrap()
    }

    fn akismet() -> Value {
        json!({
            "name": "Akismet Anti-spam&#8211;Spam Protection",
            "slug": "akismet",
            "description": "<p>Akismet checks your comments.</p><ul><li>Fast</li></ul>",
            "short_description": "The best anti-spam protection.",
            "icons": { "1x": "https://ps.w.org/akismet/assets/icon-128x128.png", "2x": "x" },
            "download_link": "https://downloads.wordpress.org/plugin/akismet.5.3.zip",
            "version": "5.3",
            "ratings": { "1": 98, "2": 20, "3": 30, "4": 60, "5": 800 },
            "num_ratings": 1008,
            "support_threads_resolved": 3,
            "support_threads": 4,
            "downloaded": 334215678,
            "last_updated": "2024-05-01 3:14pm GMT"
        })
    }

    fn normalize(body: &[u8], mode: DescriptionMode) -> Vec<PluginRecord> {
        normalize_response(StatusCode::OK, body, mode)
            .unwrap()
            .collect()
    }

    #[test]
    fn maps_every_field() {
        let recs = normalize(&payload(json!([akismet()])), DescriptionMode::Detailed);
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.name, "Akismet Anti-spam-Spam Protection");
        assert_eq!(r.url, "https://wordpress.org/plugins/akismet/");
        assert_eq!(
            r.icon,
            Some(IconRef::Remote(
                "https://ps.w.org/akismet/assets/icon-128x128.png".into()
            ))
        );
        assert_eq!(
            r.download.as_deref(),
            Some("https://downloads.wordpress.org/plugin/akismet.5.3.zip")
        );
        assert_eq!(r.version.as_deref(), Some("5.3"));
        assert_eq!(r.rating, Ratio::Percent(10));
        assert_eq!(r.solved, Ratio::Percent(75));
        assert_eq!(r.downloaded.as_deref(), Some("334,215,678"));
        assert_eq!(r.last_updated.as_deref(), Some("2024-05-01 3:14pm GMT"));
    }

    #[test]
    fn decodes_en_dash_entity_only() {
        assert_eq!(decode_name("Foo&#8211;Bar"), "Foo-Bar");
        assert_eq!(decode_name("A &#8211; B &#8211; C"), "A - B - C");
        assert_eq!(decode_name("Tom &amp; Jerry"), "Tom &amp; Jerry");
    }

    #[test]
    fn detailed_mode_strips_tags_to_newlines() {
        let recs = normalize(&payload(json!([akismet()])), DescriptionMode::Detailed);
        assert_eq!(
            recs[0].description,
            "\nAkismet checks your comments.\n\n\nFast\n\n"
        );
    }

    #[test]
    fn summary_mode_passes_short_description_through() {
        let recs = normalize(&payload(json!([akismet()])), DescriptionMode::Summary);
        assert_eq!(recs[0].description, "The best anti-spam protection.");
    }

    #[test]
    fn description_falls_back_between_modes() {
        let only_short = json!({ "name": "A", "slug": "a", "short_description": "short" });
        let only_long = json!({ "name": "B", "slug": "b", "description": "<b>long</b>" });
        let recs = normalize(
            &payload(json!([only_short, only_long])),
            DescriptionMode::Detailed,
        );
        assert_eq!(recs[0].description, "short");
        assert_eq!(recs[1].description, "\nlong\n");

        let bare = json!({ "name": "C", "slug": "c" });
        let recs = normalize(&payload(json!([bare])), DescriptionMode::Summary);
        assert_eq!(recs[0].description, "");
    }

    #[test]
    fn zero_ratings_are_unknown_not_nan() {
        let mut p = akismet();
        p["num_ratings"] = json!(0);
        p["ratings"] = json!([]);
        p["support_threads"] = json!(0);
        p["support_threads_resolved"] = json!(0);
        let recs = normalize(&payload(json!([p])), DescriptionMode::Detailed);
        assert_eq!(recs[0].rating, Ratio::Unknown);
        assert_eq!(recs[0].solved, Ratio::Unknown);
    }

    #[test]
    fn missing_optional_fields_become_unknown() {
        let recs = normalize(
            &payload(json!([{ "name": "Bare", "slug": "bare", "icons": [] }])),
            DescriptionMode::Detailed,
        );
        let r = &recs[0];
        assert_eq!(r.icon, None);
        assert_eq!(r.rating, Ratio::Unknown);
        assert_eq!(r.solved, Ratio::Unknown);
        assert_eq!(r.downloaded, None);
        assert_eq!(r.version, None);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let mut p = akismet();
        p["num_ratings"] = json!("1008");
        p["downloaded"] = json!("1500");
        let recs = normalize(&payload(json!([p])), DescriptionMode::Detailed);
        assert_eq!(recs[0].rating, Ratio::Percent(10));
        assert_eq!(recs[0].downloaded.as_deref(), Some("1,500"));
    }

    #[test]
    fn absent_plugins_field_is_empty() {
        let body = serde_json::to_vec(&json!({ "info": { "results": 0 } })).unwrap();
        assert_eq!(normalize(&body, DescriptionMode::Detailed).len(), 0);
        let body = serde_json::to_vec(&json!({ "plugins": null })).unwrap();
        assert_eq!(normalize(&body, DescriptionMode::Detailed).len(), 0);
    }

    #[test]
    fn non_success_status_is_fetch_error() {
        let err = normalize_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &payload(json!([akismet()])),
            DescriptionMode::Detailed,
        )
        .unwrap_err();
        match err {
            DirectoryError::Fetch { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_payloads_are_parse_errors() {
        let not_json = normalize_response(StatusCode::OK, b"<html>", DescriptionMode::Detailed);
        assert!(matches!(not_json, Err(DirectoryError::Parse(_))));

        let no_slug = payload(json!([{ "name": "No slug" }]));
        let err = normalize_response(StatusCode::OK, &no_slug, DescriptionMode::Detailed)
            .unwrap_err();
        match err {
            DirectoryError::Parse(msg) => assert!(msg.contains("slug"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }

        let wrong_type = payload(json!({ "name": "not a list" }));
        assert!(matches!(
            normalize_response(StatusCode::OK, &wrong_type, DescriptionMode::Detailed),
            Err(DirectoryError::Parse(_))
        ));
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let body = payload(json!([akismet(), { "name": "Other", "slug": "other" }]));
        let a = normalize(&body, DescriptionMode::Detailed);
        let b = normalize(&body, DescriptionMode::Detailed);
        assert_eq!(a, b);
    }

    #[test]
    fn sequence_is_lazy_and_sized() {
        let body = payload(json!([akismet(), { "name": "Other", "slug": "other" }]));
        let mut recs = normalize_response(StatusCode::OK, &body, DescriptionMode::Detailed).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs.next().map(|r| r.name), Some("Akismet Anti-spam-Spam Protection".into()));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs.next().map(|r| r.url), Some(plugin_url("other")));
        assert!(recs.next().is_none());
    }
}
