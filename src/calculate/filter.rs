//! Row and comp filters applied around aggregation.
//!
//! Two independent filters:
//! - Region selection: keeps rows whose parsed region number falls in at
//!   least one selected preset range. Applied before aggregation.
//! - Hero exclusions: makes comps ineligible for recommendation without
//!   affecting display. Applied during recommendation.

use std::collections::BTreeSet;

use crate::models::{is_unknown_name, CompKey, RawComp};

/// An inclusive region range a user can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionPreset {
    pub key: &'static str,
    pub label: &'static str,
    pub min: u32,
    pub max: u32,
}

/// The selectable region ranges.
pub const REGION_PRESETS: [RegionPreset; 3] = [
    RegionPreset {
        key: "r1-20",
        label: "R1-R20",
        min: 1,
        max: 20,
    },
    RegionPreset {
        key: "r21-40",
        label: "R21-R40",
        min: 21,
        max: 40,
    },
    RegionPreset {
        key: "r41p",
        label: "R41+",
        min: 41,
        max: u32::MAX,
    },
];

fn preset_by_key(key: &str) -> Option<&'static RegionPreset> {
    REGION_PRESETS.iter().find(|p| p.key == key)
}

/// A normalized set of selected region presets.
///
/// Selecting no presets, every preset, or the explicit "all" key all
/// normalize to `All`, and filtering by `All` is a true no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionSelection {
    All,
    Presets(BTreeSet<&'static str>),
}

impl Default for RegionSelection {
    fn default() -> Self {
        RegionSelection::All
    }
}

impl RegionSelection {
    /// Build a selection from raw keys. Unrecognized keys are ignored.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: BTreeSet<&'static str> = BTreeSet::new();
        for key in keys {
            let key = key.as_ref().trim().to_lowercase();
            if key == "all" {
                return RegionSelection::All;
            }
            if let Some(preset) = preset_by_key(&key) {
                selected.insert(preset.key);
            }
        }

        if selected.is_empty() || selected.len() == REGION_PRESETS.len() {
            RegionSelection::All
        } else {
            RegionSelection::Presets(selected)
        }
    }

    /// Parse a comma-separated selection string ("r1-20,r41p").
    pub fn from_csv(csv: &str) -> Self {
        Self::from_keys(csv.split(','))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RegionSelection::All)
    }

    /// Human-readable label ("All regions" or joined preset labels).
    pub fn label(&self) -> String {
        match self {
            RegionSelection::All => "All regions".to_string(),
            RegionSelection::Presets(keys) => REGION_PRESETS
                .iter()
                .filter(|p| keys.contains(p.key))
                .map(|p| p.label)
                .collect::<Vec<_>>()
                .join(" + "),
        }
    }

    /// Whether a row passes the selection. Rows without a parseable
    /// region number are kept only when everything is selected.
    pub fn matches(&self, row: &RawComp) -> bool {
        let keys = match self {
            RegionSelection::All => return true,
            RegionSelection::Presets(keys) => keys,
        };

        let region = match row.region_number() {
            Some(n) => n,
            None => return false,
        };

        REGION_PRESETS
            .iter()
            .filter(|p| keys.contains(p.key))
            .any(|p| region >= p.min && region <= p.max)
    }

    /// Filter a row set. Filtering by `All` returns the identical list.
    pub fn apply(&self, rows: &[RawComp]) -> Vec<RawComp> {
        if self.is_all() {
            return rows.to_vec();
        }
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Heroes the user wants kept out of recommendations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeroExclusions(BTreeSet<String>);

impl HeroExclusions {
    /// Build from hero names; blanks and the unknown sentinel are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .filter(|n| !is_unknown_name(n))
            .collect();
        Self(set)
    }

    /// Parse a comma-separated exclusion list.
    pub fn from_csv(csv: &str) -> Self {
        Self::from_names(csv.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if the comp contains any excluded hero. Unknown slots never
    /// match an exclusion.
    pub fn blocks(&self, key: &CompKey) -> bool {
        key.known_heroes().any(|h| self.0.contains(h))
    }
}
