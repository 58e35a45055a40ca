//! Display conversions. Records store canonical values only; everything the
//! shell shows is derived here.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::MediaSlot;
use crate::model::{Ability, CategoryKind, CategoryTag, Metric, Record, RecordId, Size};

pub const UNKNOWN_STYLE_KEY: &str = "unknown";
pub const UNKNOWN_STYLE_COLOR: &str = "#68A090";

/// Presentation metadata for one category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub key: String,
    pub color: String,
}

impl CategoryStyle {
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            key: UNKNOWN_STYLE_KEY.to_string(),
            color: UNKNOWN_STYLE_COLOR.to_string(),
        }
    }

    #[must_use]
    pub fn of(kind: CategoryKind) -> Self {
        Self {
            key: kind.as_str().to_string(),
            color: kind.color_hex().to_string(),
        }
    }

    /// Unrecognised names get the unknown style.
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        match CategoryKind::from_name(name) {
            Some(kind) => Self::of(kind),
            None => {
                warn!(category = name, "unknown category kind, using fallback style");
                Self::unknown()
            }
        }
    }
}

/// First letter upper-cased: `"bulbasaur"` → `"Bulbasaur"`.
#[must_use]
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `#001`, `#025`, `#1025`.
#[must_use]
pub fn display_number(id: RecordId) -> String {
    format!("#{:03}", id.get())
}

/// Tenths as a decimal without a trailing `.0`: `7` → `"0.7"`, `60` → `"6"`.
#[must_use]
pub fn format_tenths(value: u32) -> String {
    let whole = value / 10;
    match value % 10 {
        0 => whole.to_string(),
        frac => format!("{whole}.{frac}"),
    }
}

#[must_use]
pub fn display_length(size: Size) -> String {
    format!("{} m", format_tenths(size.length_dm))
}

#[must_use]
pub fn display_mass(size: Size) -> String {
    format!("{} kg", format_tenths(size.mass_hg))
}

/// `"solar-power"` → `"solar power"`. Only the first hyphen is replaced.
#[must_use]
pub fn ability_label(name: &str) -> String {
    name.replacen('-', " ", 1)
}

/// `"special-attack"` → `"SPECIAL ATTACK"`.
#[must_use]
pub fn metric_label(name: &str) -> String {
    name.replacen('-', " ", 1).to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBadge {
    pub name: String,
    pub style: CategoryStyle,
}

impl From<&CategoryTag> for CategoryBadge {
    fn from(tag: &CategoryTag) -> Self {
        Self {
            name: tag.name().to_string(),
            style: CategoryStyle::for_name(tag.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityView {
    pub label: String,
    pub hidden: bool,
}

impl From<&Ability> for AbilityView {
    fn from(ability: &Ability) -> Self {
        Self {
            label: ability_label(&ability.name),
            hidden: ability.hidden,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBar {
    pub label: String,
    pub value: u8,
    /// Bar width in `[0, 1]`.
    pub fraction: f32,
}

impl From<&Metric> for MetricBar {
    fn from(metric: &Metric) -> Self {
        Self {
            label: metric_label(&metric.name),
            value: metric.value,
            fraction: metric.fraction(),
        }
    }
}

/// One tile of a browse view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCard {
    pub id: RecordId,
    pub number: String,
    pub name: String,
    pub media: Option<String>,
    pub categories: Vec<CategoryBadge>,
}

impl RecordCard {
    #[must_use]
    pub fn new(record: &Record, media: MediaSlot) -> Self {
        let media = match media {
            MediaSlot::Thumbnail => record.thumbnail.as_ref(),
            MediaSlot::Artwork => record.primary_media.as_ref(),
        };
        Self {
            id: record.id,
            number: display_number(record.id),
            name: display_name(&record.name),
            media: media.map(ToString::to_string),
            categories: record.categories.iter().map(CategoryBadge::from).collect(),
        }
    }
}

/// Display fields of the detail view, without navigation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDetail {
    pub id: RecordId,
    pub number: String,
    pub name: String,
    pub media: Option<String>,
    pub categories: Vec<CategoryBadge>,
    pub abilities: Vec<AbilityView>,
    pub metrics: Vec<MetricBar>,
    pub length: String,
    pub mass: String,
}

impl From<&Record> for RecordDetail {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            number: display_number(record.id),
            name: display_name(&record.name),
            media: record.primary_media.as_ref().map(ToString::to_string),
            categories: record.categories.iter().map(CategoryBadge::from).collect(),
            abilities: record.attributes.iter().map(AbilityView::from).collect(),
            metrics: record.metrics.iter().map(MetricBar::from).collect(),
            length: display_length(record.size),
            mass: display_mass(record.size),
        }
    }
}
