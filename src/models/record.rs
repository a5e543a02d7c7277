//! Raw match rows as returned by the backing store.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A field the backend stores inconsistently as either a number or text
/// (e.g. `teams` may be `6` or `"6 teams"`, `region` may be `12` or `"R12"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    /// Extract a numeric value. Text values yield their first digit run,
    /// so "R12", "region 12" and "12" all parse to 12.
    pub fn as_number(&self) -> Option<u32> {
        match self {
            NumberOrText::Number(n) if n.is_finite() && *n >= 0.0 => Some(*n as u32),
            NumberOrText::Number(_) => None,
            NumberOrText::Text(s) => first_digit_run(s),
        }
    }
}

impl From<u32> for NumberOrText {
    fn from(n: u32) -> Self {
        NumberOrText::Number(n as f64)
    }
}

impl From<&str> for NumberOrText {
    fn from(s: &str) -> Self {
        NumberOrText::Text(s.to_string())
    }
}

fn first_digit_run(s: &str) -> Option<u32> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"(\d+)").expect("valid regex"));
    re.captures(s)?.get(1)?.as_str().parse().ok()
}

/// One raw composition row from the `comps` table.
///
/// All fields are optional: rows are submitted from screenshots and
/// frequently arrive partial. Malformed rows are never an error; they are
/// dropped (and tallied) during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComp {
    /// Heroes as a single "A - B - C - D - E" delimited string.
    pub heroes: Option<String>,

    /// Pet name.
    pub pet: Option<String>,

    /// Observed win rate percentage for this record.
    pub winrate: Option<f64>,

    /// Number of opposing teams in the match.
    pub teams: Option<NumberOrText>,

    /// Region identifier ("R12", "region 12", 12, ...).
    pub region: Option<NumberOrText>,
}

impl RawComp {
    /// Parsed team count, if any.
    pub fn teams_count(&self) -> Option<u32> {
        self.teams.as_ref().and_then(|t| t.as_number())
    }

    /// Parsed region number, if any.
    pub fn region_number(&self) -> Option<u32> {
        self.region.as_ref().and_then(|r| r.as_number())
    }
}
