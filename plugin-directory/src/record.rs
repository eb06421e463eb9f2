//! Display-ready plugin records.

use std::fmt;

use serde::Serialize;

/// One normalized search hit (or one fallback directory link).
///
/// `name` is the list key; the directory guarantees uniqueness within one
/// result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginRecord {
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Share of one-star ratings.
    pub rating: Ratio,
    /// Share of resolved support threads.
    pub solved: Ratio,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloaded: Option<String>,
    #[serde(rename = "update", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl PluginRecord {
    /// A record that only points somewhere: no metrics, no download.
    pub fn link(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        icon: IconRef,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: url.into(),
            icon: Some(icon),
            download: None,
            version: None,
            rating: Ratio::Unknown,
            solved: Ratio::Unknown,
            downloaded: None,
            last_updated: None,
        }
    }
}

/// Percentage derived from two counters, or `Unknown` when the denominator
/// is zero or an input is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Ratio {
    Percent(u32),
    Unknown,
}

impl Ratio {
    pub fn percent(self) -> Option<u32> {
        match self {
            Ratio::Percent(p) => Some(p),
            Ratio::Unknown => None,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Percent(p) => write!(f, "{p}%"),
            Ratio::Unknown => f.write_str("unknown"),
        }
    }
}

/// Icon shown next to a list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IconRef {
    /// Remote image (the directory's `icons["1x"]`).
    Remote(String),
    /// Glyph from the host's built-in icon set.
    Builtin(BuiltinIcon),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinIcon {
    Hammer,
    Brush,
    PlusTopRightSquare,
}

impl BuiltinIcon {
    /// Single-character stand-in used by text front-ends.
    pub fn glyph(self) -> char {
        match self {
            BuiltinIcon::Hammer => '🔨',
            BuiltinIcon::Brush => '🖌',
            BuiltinIcon::PlusTopRightSquare => '⊞',
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ratio_renders_percent_or_unknown() {
        assert_eq!(Ratio::Percent(7).to_string(), "7%");
        assert_eq!(Ratio::Unknown.to_string(), "unknown");
        assert_eq!(Ratio::Unknown.percent(), None);
    }

    #[test]
    fn serializes_with_directory_field_names() {
        let mut rec = PluginRecord::link(
            "Akismet",
            "Spam protection",
            "https://wordpress.org/plugins/akismet/",
            IconRef::Remote("https://ps.w.org/akismet/icon.png".into()),
        );
        rec.rating = Ratio::Percent(3);
        rec.last_updated = Some("2024-05-01 3:14pm GMT".into());

        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["rating"], json!(3));
        assert_eq!(v["solved"], json!(null));
        assert_eq!(v["icon"], json!("https://ps.w.org/akismet/icon.png"));
        assert_eq!(v["update"], json!("2024-05-01 3:14pm GMT"));
        assert!(v.get("download").is_none());
    }

    #[test]
    fn builtin_icons_use_kebab_names() {
        let v = serde_json::to_value(IconRef::Builtin(BuiltinIcon::PlusTopRightSquare)).unwrap();
        assert_eq!(v, json!("plus-top-right-square"));
    }

    #[test]
    fn every_builtin_icon_has_its_own_glyph() {
        let glyphs = [
            BuiltinIcon::Hammer.glyph(),
            BuiltinIcon::Brush.glyph(),
            BuiltinIcon::PlusTopRightSquare.glyph(),
        ];
        assert_eq!(glyphs, ['🔨', '🖌', '⊞']);
    }
}
