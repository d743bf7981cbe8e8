//! Live-reloadable scan settings.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of sub-regions drained per cadence tick.
pub const DEFAULT_AREAS_PER_TICK: u32 = 5;
/// Default admission cooldown in ticks.
pub const DEFAULT_UPDATE_INTERVAL: u32 = 300;
/// Default cadence delay in ticks.
pub const DEFAULT_SCAN_AREAS_DELAY: u32 = 10;

/// Engine settings. All fields may change between ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScanSettings {
    /// Sub-regions drained per cadence tick, across all scanners.
    pub areas_per_tick: u32,
    /// Cooldown after the round-robin cursor wraps; released on ticks divisible
    /// by `update_interval + 1`.
    pub update_interval: u32,
    /// Scheduler work only happens on ticks divisible by this value.
    pub scan_areas_delay: u32,
    /// Per-region result cap; zero disables it.
    pub max_results: u32,
    /// Keep hidden items in item-to-place lists.
    pub show_hidden: bool,
    /// Negate every contribution.
    pub invert_sign: bool,
    /// Round report quantities to whole stacks.
    pub round_to_stack: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            areas_per_tick: DEFAULT_AREAS_PER_TICK,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            scan_areas_delay: DEFAULT_SCAN_AREAS_DELAY,
            max_results: 0,
            show_hidden: false,
            invert_sign: false,
            round_to_stack: false,
        }
    }
}

impl ScanSettings {
    /// Result cap, or `None` when disabled.
    pub fn result_cap(&self) -> Option<u32> {
        (self.max_results > 0).then_some(self.max_results)
    }

    /// Checks every constrained field.
    pub fn validate(&self) -> EngineResult<()> {
        check_positive(SettingName::AreasPerTick, self.areas_per_tick)?;
        check_positive(SettingName::ScanAreasDelay, self.scan_areas_delay)?;
        Ok(())
    }

    /// Current value of one setting.
    pub fn get(&self, name: SettingName) -> SettingValue {
        match name {
            SettingName::AreasPerTick => SettingValue::Int(self.areas_per_tick),
            SettingName::UpdateInterval => SettingValue::Int(self.update_interval),
            SettingName::ScanAreasDelay => SettingValue::Int(self.scan_areas_delay),
            SettingName::MaxResults => SettingValue::Int(self.max_results),
            SettingName::ShowHidden => SettingValue::Bool(self.show_hidden),
            SettingName::InvertSign => SettingValue::Bool(self.invert_sign),
            SettingName::RoundToStack => SettingValue::Bool(self.round_to_stack),
        }
    }

    /// Applies a single change. On error the previous value is kept.
    pub fn apply(&mut self, change: &SettingChange) -> EngineResult<()> {
        let SettingChange { name, value } = *change;
        match (name, value) {
            (SettingName::AreasPerTick, SettingValue::Int(v)) => {
                check_positive(name, v)?;
                self.areas_per_tick = v;
            }
            (SettingName::UpdateInterval, SettingValue::Int(v)) => self.update_interval = v,
            (SettingName::ScanAreasDelay, SettingValue::Int(v)) => {
                check_positive(name, v)?;
                self.scan_areas_delay = v;
            }
            (SettingName::MaxResults, SettingValue::Int(v)) => self.max_results = v,
            (SettingName::ShowHidden, SettingValue::Bool(v)) => self.show_hidden = v,
            (SettingName::InvertSign, SettingValue::Bool(v)) => self.invert_sign = v,
            (SettingName::RoundToStack, SettingValue::Bool(v)) => self.round_to_stack = v,
            (name, value) => {
                return Err(EngineError::InvalidSetting {
                    name: name.as_str(),
                    value: value.to_string(),
                    reason: "wrong value type",
                })
            }
        }
        Ok(())
    }
}

fn check_positive(name: SettingName, value: u32) -> EngineResult<()> {
    if value == 0 {
        return Err(EngineError::InvalidSetting {
            name: name.as_str(),
            value: value.to_string(),
            reason: "must be at least 1",
        });
    }
    Ok(())
}

/// Names of the live settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingName {
    AreasPerTick,
    UpdateInterval,
    ScanAreasDelay,
    MaxResults,
    ShowHidden,
    InvertSign,
    RoundToStack,
}

impl SettingName {
    pub const ALL: [SettingName; 7] = [
        SettingName::AreasPerTick,
        SettingName::UpdateInterval,
        SettingName::ScanAreasDelay,
        SettingName::MaxResults,
        SettingName::ShowHidden,
        SettingName::InvertSign,
        SettingName::RoundToStack,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingName::AreasPerTick => "areas-per-tick",
            SettingName::UpdateInterval => "update-interval",
            SettingName::ScanAreasDelay => "scan-areas-delay",
            SettingName::MaxResults => "max-results",
            SettingName::ShowHidden => "show-hidden",
            SettingName::InvertSign => "invert-sign",
            SettingName::RoundToStack => "round-to-stack",
        }
    }

    fn is_flag(self) -> bool {
        matches!(
            self,
            SettingName::ShowHidden | SettingName::InvertSign | SettingName::RoundToStack
        )
    }
}

impl fmt::Display for SettingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| EngineError::UnknownSetting(s.to_owned()))
    }
}

/// Typed setting value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingValue {
    Int(u32),
    Bool(bool),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// A setting that changed, with its new value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettingChange {
    pub name: SettingName,
    pub value: SettingValue,
}

impl SettingChange {
    pub fn new(name: SettingName, value: SettingValue) -> Self {
        Self { name, value }
    }

    /// Parses `name=value`, typing the value by the setting it targets.
    pub fn parse(input: &str) -> EngineResult<Self> {
        let (raw_name, raw_value) = input
            .split_once('=')
            .ok_or_else(|| EngineError::UnknownSetting(input.to_owned()))?;
        let name: SettingName = raw_name.trim().parse()?;
        let raw_value = raw_value.trim();
        let value = if name.is_flag() {
            raw_value.parse::<bool>().map(SettingValue::Bool).ok()
        } else {
            raw_value.parse::<u32>().map(SettingValue::Int).ok()
        };
        let value = value.ok_or_else(|| EngineError::InvalidSetting {
            name: name.as_str(),
            value: raw_value.to_owned(),
            reason: "cannot parse value",
        })?;
        Ok(Self { name, value })
    }
}
