//! Item, quality, and signal types exchanged with the host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the baseline quality tier.
pub const BASE_QUALITY: &str = "normal";

/// Quality tier of an item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(String);

impl Quality {
    /// Creates a quality tier from its prototype name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The baseline tier used when a quality is omitted.
    pub fn base() -> Self {
        Self(BASE_QUALITY.to_owned())
    }

    /// Returns the tier's prototype name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolves an optional quality, falling back to the baseline tier.
    pub fn or_base(quality: Option<&Quality>) -> Self {
        quality.cloned().unwrap_or_else(Self::base)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::base()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Item identity plus quality tier; the aggregation key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub item: String,
    pub quality: Quality,
}

impl ItemKey {
    pub fn new(item: impl Into<String>, quality: Quality) -> Self {
        Self {
            item: item.into(),
            quality,
        }
    }
}

/// Item count as declared by a prototype or a delivery request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub name: String,
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
}

impl ItemStack {
    /// Stack without an explicit quality.
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
            quality: None,
        }
    }

    /// Stack at an explicit quality tier.
    pub fn with_quality(name: impl Into<String>, count: u32, quality: Quality) -> Self {
        Self {
            name: name.into(),
            count,
            quality: Some(quality),
        }
    }
}

/// Item prototype data the engine needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPrototype {
    pub stack_size: u32,
    #[serde(default)]
    pub hidden: bool,
}

/// Comparator attached to every published signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[default]
    #[serde(rename = "=")]
    Equals,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Equals => f.write_str("="),
        }
    }
}

/// One entry of a scanner's output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub item: String,
    pub quality: Quality,
    #[serde(default)]
    pub comparator: Comparator,
    pub count: i64,
}

impl Signal {
    pub fn new(key: ItemKey, count: i64) -> Self {
        Self {
            item: key.item,
            quality: key.quality,
            comparator: Comparator::Equals,
            count,
        }
    }

    /// Aggregation key of this signal.
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.item.clone(), self.quality.clone())
    }
}
