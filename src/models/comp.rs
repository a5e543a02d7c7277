//! Composition identity and display forms.
//!
//! A composition is 5 heroes plus a pet. Identity is order-independent:
//! the same heroes in a different submission order are the same comp. The
//! display form keeps the first-observed order and casing.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sentinel for a missing or unrecognized hero/pet slot.
pub const UNKNOWN: &str = "unknown";

/// True for blank names and the "unknown" sentinel (any casing).
pub fn is_unknown_name(name: &str) -> bool {
    let n = name.trim();
    n.is_empty() || n.eq_ignore_ascii_case(UNKNOWN)
}

/// Split a stored hero field ("A - B - C") into trimmed, non-empty tokens.
pub fn parse_heroes_list(field: &str) -> Vec<String> {
    field
        .split('-')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Truncate or right-pad a token list to exactly 5 slots.
fn five_slots(mut tokens: Vec<String>) -> [String; 5] {
    tokens.truncate(5);
    while tokens.len() < 5 {
        tokens.push(UNKNOWN.to_string());
    }
    tokens.try_into().expect("exactly five slots")
}

/// Slot ordering for key construction: the unknown sentinel sorts after
/// every real name, otherwise lexicographic.
fn key_slot_order(a: &str, b: &str) -> Ordering {
    match (a == UNKNOWN, b == UNKNOWN) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

/// Canonical, order-independent composition identity.
///
/// Always exactly 5 hero slots plus 1 pet slot, lowercased, with the hero
/// slots sorted at construction time. Two records listing the same heroes
/// in different orders compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompKey {
    heroes: [String; 5],
    pet: String,
}

impl CompKey {
    /// Build a key from raw hero tokens and a pet name.
    ///
    /// Tokens are lowercased, truncated/padded to 5 slots and sorted;
    /// a blank pet becomes the unknown sentinel.
    pub fn new(hero_tokens: &[String], pet: &str) -> Self {
        let lowered: Vec<String> = hero_tokens
            .iter()
            .map(|h| {
                let n = h.trim().to_lowercase();
                if n.is_empty() {
                    UNKNOWN.to_string()
                } else {
                    n
                }
            })
            .collect();

        let mut heroes = five_slots(lowered);
        heroes.sort_by(|a, b| key_slot_order(a, b));

        let pet = pet.trim().to_lowercase();
        let pet = if pet.is_empty() {
            UNKNOWN.to_string()
        } else {
            pet
        };

        Self { heroes, pet }
    }

    /// Sorted, lowercased hero slots.
    pub fn heroes(&self) -> &[String; 5] {
        &self.heroes
    }

    /// Lowercased pet slot.
    pub fn pet(&self) -> &str {
        &self.pet
    }

    /// Non-unknown hero names in this key.
    pub fn known_heroes(&self) -> impl Iterator<Item = &str> {
        self.heroes
            .iter()
            .map(String::as_str)
            .filter(|h| !is_unknown_name(h))
    }

    /// Count of unknown slots across all 6 (5 heroes + pet).
    pub fn unknown_slots(&self) -> u32 {
        let hero_unknowns = self.heroes.iter().filter(|h| is_unknown_name(h)).count();
        let pet_unknown = usize::from(is_unknown_name(&self.pet));
        (hero_unknowns + pet_unknown) as u32
    }

    /// True if the pet slot is a real pet, not the sentinel.
    pub fn has_known_pet(&self) -> bool {
        !is_unknown_name(&self.pet)
    }

    /// True if this comp contains the given hero (case-insensitive).
    /// Unknown slots never match.
    pub fn contains_hero(&self, hero: &str) -> bool {
        if is_unknown_name(hero) {
            return false;
        }
        let needle = hero.trim().to_lowercase();
        self.known_heroes().any(|h| h == needle)
    }
}

/// Display form of a composition: first-seen order and casing, with unknown
/// sentinels filling missing slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompDisplay {
    pub heroes: [String; 5],
    pub pet: String,
}

/// A normalized record: canonical key plus its display form.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedComp {
    pub key: CompKey,
    pub display: CompDisplay,
}

/// Normalize raw hero/pet fields into a key and display form.
pub fn normalize_comp(heroes_field: Option<&str>, pet_field: Option<&str>) -> NormalizedComp {
    let tokens = parse_heroes_list(heroes_field.unwrap_or_default());
    let pet_raw = pet_field.unwrap_or_default().trim();

    let key = CompKey::new(&tokens, pet_raw);

    let display = CompDisplay {
        heroes: five_slots(tokens),
        pet: if pet_raw.is_empty() {
            UNKNOWN.to_string()
        } else {
            pet_raw.to_string()
        },
    };

    NormalizedComp { key, display }
}
