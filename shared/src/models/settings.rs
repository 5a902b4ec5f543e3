//! Site Settings Model (Singleton)
//!
//! One document holds slider behaviour, visual effects, site texts, footer
//! and logo. Stored documents may be partial or written by older versions;
//! [`SettingsDocument::from_stored`] is the one place that fills the gaps
//! from [`SettingsDocument::default`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::image::ImageRecord;

/// Collection and key of the settings singleton
pub const SETTINGS_COLLECTION: &str = "settings";
pub const SETTINGS_ID: &str = "main";

/// Complete site settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    pub autoplay: bool,
    /// Slide interval in milliseconds
    pub autoplay_speed: u64,
    pub effects: Effects,
    pub texts: Texts,
    pub footer: Footer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effects {
    pub ken_burns: KenBurns,
    pub transition: Transition,
    pub film_grain: FilmGrain,
}

/// Slow pan/zoom animation applied to slider images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KenBurns {
    pub enabled: bool,
    pub duration_ms: u64,
    pub zoom_range: ZoomRange,
}

/// Zoom factor range; older documents store a bare number meaning the maximum
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl<'de> Deserialize<'de> for ZoomRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Range { min: f64, max: f64 },
            Max(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Range { min, max } => Ok(Self { min, max }),
            Repr::Max(max) => Ok(Self { min: 1.0, max }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub duration_ms: u64,
    pub blur_amount_px: f64,
    pub dark_overlay_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmGrain {
    pub enabled: bool,
    pub opacity: f64,
    pub animation_speed_sec: f64,
}

/// Styled line of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub text: String,
    pub color: String,
    pub font_size: u32,
    pub font_weight: u32,
}

impl TextBlock {
    fn new(text: &str, color: &str, font_size: u32, font_weight: u32) -> Self {
        Self {
            text: text.to_string(),
            color: color.to_string(),
            font_size,
            font_weight,
        }
    }
}

/// About section shown on the home page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutText {
    pub title: String,
    pub text: String,
    pub title_color: String,
    pub text_color: String,
    pub title_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Texts {
    pub header: TextBlock,
    pub heading: TextBlock,
    pub subheading: TextBlock,
    pub about: AboutText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    pub left_text: TextBlock,
    pub right_text: TextBlock,
    pub social_media: SocialMedia,
}

/// Link to one social platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub enabled: bool,
    pub url: String,
}

impl SocialLink {
    fn disabled(url: &str) -> Self {
        Self {
            enabled: false,
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialMedia {
    pub color: String,
    pub facebook: SocialLink,
    pub twitter: SocialLink,
    pub instagram: SocialLink,
    pub linkedin: SocialLink,
    pub youtube: SocialLink,
    pub amazon: SocialLink,
}

impl SocialMedia {
    /// Platform keys in display order
    pub const PLATFORMS: [&'static str; 6] = [
        "facebook",
        "twitter",
        "instagram",
        "linkedin",
        "youtube",
        "amazon",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoSettings {
    pub enabled: bool,
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            autoplay: true,
            autoplay_speed: 5000,
            effects: Effects {
                ken_burns: KenBurns {
                    enabled: true,
                    duration_ms: 20_000,
                    zoom_range: ZoomRange { min: 1.0, max: 1.2 },
                },
                transition: Transition {
                    duration_ms: 1500,
                    blur_amount_px: 10.0,
                    dark_overlay_opacity: 0.2,
                },
                film_grain: FilmGrain {
                    enabled: true,
                    opacity: 0.05,
                    animation_speed_sec: 8.0,
                },
            },
            texts: Texts {
                header: TextBlock::new("The Homely Treasures", "#A67C52", 20, 700),
                heading: TextBlock::new("Welcome to Our Store", "#000000", 32, 600),
                subheading: TextBlock::new(
                    "Unique and carefully curated home products",
                    "#666666",
                    16,
                    400,
                ),
                about: AboutText {
                    title: "About Us".to_string(),
                    text: "Welcome to The Homely Treasures, your premier destination for unique and carefully curated home products.".to_string(),
                    title_color: "#000000".to_string(),
                    text_color: "#666666".to_string(),
                    title_size: 28,
                },
            },
            footer: Footer {
                left_text: TextBlock::new("© 2024 The Homely Treasures", "#666666", 14, 400),
                right_text: TextBlock::new("All rights reserved", "#666666", 14, 400),
                social_media: SocialMedia {
                    color: "#666666".to_string(),
                    facebook: SocialLink::disabled("https://facebook.com"),
                    twitter: SocialLink::disabled("https://twitter.com"),
                    instagram: SocialLink::disabled("https://instagram.com"),
                    linkedin: SocialLink::disabled("https://linkedin.com"),
                    youtube: SocialLink::disabled("https://youtube.com"),
                    amazon: SocialLink::disabled("https://amazon.com"),
                },
            },
            logo: None,
            updated_at: None,
        }
    }
}

impl SettingsDocument {
    /// The default template as JSON
    pub fn default_value() -> Value {
        serde_json::to_value(Self::default()).unwrap_or(Value::Null)
    }

    /// Deep default-fill: stored values win, anything missing (or null)
    /// falls back to the default template.
    pub fn from_stored(stored: &Value) -> Result<Self, serde_json::Error> {
        let mut merged = Self::default_value();
        merge_json(&mut merged, &strip_nulls(stored));
        serde_json::from_value(merged)
    }
}

/// Settings plus the selected images, as rendered by the home page slider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliderView {
    pub settings: SettingsDocument,
    /// Selected images by display order
    pub images: Vec<ImageRecord>,
}

/// Single-field edit from the admin settings form
///
/// `{section: "texts", subsection: "header", key: "fontSize", value: 24}`
/// addresses `texts.header.fontSize`. Keys may contain dots
/// (`footer.socialMedia` with key `"facebook.enabled"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingChange {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub subsection: Option<String>,
    pub key: String,
    pub value: Value,
}

impl SettingChange {
    /// Nested partial document for this edit; dotted keys are kept as-is
    pub fn to_patch(&self) -> Value {
        let mut patch = Value::Object(Map::from_iter([(self.key.clone(), self.value.clone())]));
        for level in [&self.subsection, &self.section].into_iter().flatten() {
            if level.is_empty() {
                continue;
            }
            patch = Value::Object(Map::from_iter([(level.clone(), patch)]));
        }
        patch
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key by key; any other overlay value (arrays, scalars, null)
/// replaces the base value.
pub fn merge_json(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Copy of `value` with every null object entry removed
fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect::<Map<_, _>>(),
        ),
        other => other.clone(),
    }
}
