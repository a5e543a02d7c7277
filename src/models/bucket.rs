//! Team-size buckets.

use serde::{Deserialize, Serialize};

/// Bucket of matches by opposing team count.
///
/// Matches with a team count outside 2..=7 are not bucketed; they are
/// rejected during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TeamsBucket {
    #[serde(rename = "2-3")]
    Teams2To3,
    #[serde(rename = "4-5")]
    Teams4To5,
    #[serde(rename = "6-7")]
    Teams6To7,
}

impl TeamsBucket {
    /// All buckets in ascending team-count order.
    pub const ALL: [TeamsBucket; 3] = [
        TeamsBucket::Teams2To3,
        TeamsBucket::Teams4To5,
        TeamsBucket::Teams6To7,
    ];

    /// Bucket for a parsed team count, or `None` outside 2..=7.
    pub fn from_teams_count(n: u32) -> Option<Self> {
        match n {
            2..=3 => Some(TeamsBucket::Teams2To3),
            4..=5 => Some(TeamsBucket::Teams4To5),
            6..=7 => Some(TeamsBucket::Teams6To7),
            _ => None,
        }
    }

    /// Parse a bucket label ("2-3", "4-5", "6-7").
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "2-3" => Some(TeamsBucket::Teams2To3),
            "4-5" => Some(TeamsBucket::Teams4To5),
            "6-7" => Some(TeamsBucket::Teams6To7),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TeamsBucket::Teams2To3 => "2-3",
            TeamsBucket::Teams4To5 => "4-5",
            TeamsBucket::Teams6To7 => "6-7",
        }
    }

    /// How many conflict-free comps to recommend for this bucket.
    ///
    /// The smallest bucket gets no recommendation: with 2-3 opposing teams
    /// there is no roster-planning problem worth solving.
    pub fn recommend_target(&self) -> usize {
        match self {
            TeamsBucket::Teams2To3 => 0,
            TeamsBucket::Teams4To5 => 5,
            TeamsBucket::Teams6To7 => 7,
        }
    }
}

impl std::fmt::Display for TeamsBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(TeamsBucket::from_teams_count(2), Some(TeamsBucket::Teams2To3));
        assert_eq!(TeamsBucket::from_teams_count(3), Some(TeamsBucket::Teams2To3));
        assert_eq!(TeamsBucket::from_teams_count(4), Some(TeamsBucket::Teams4To5));
        assert_eq!(TeamsBucket::from_teams_count(5), Some(TeamsBucket::Teams4To5));
        assert_eq!(TeamsBucket::from_teams_count(6), Some(TeamsBucket::Teams6To7));
        assert_eq!(TeamsBucket::from_teams_count(7), Some(TeamsBucket::Teams6To7));
    }

    #[test]
    fn test_bucket_out_of_range() {
        assert_eq!(TeamsBucket::from_teams_count(0), None);
        assert_eq!(TeamsBucket::from_teams_count(1), None);
        assert_eq!(TeamsBucket::from_teams_count(8), None);
        assert_eq!(TeamsBucket::from_teams_count(100), None);
    }

    #[test]
    fn test_bucket_labels_round_trip() {
        for bucket in TeamsBucket::ALL {
            assert_eq!(TeamsBucket::from_label(bucket.label()), Some(bucket));
        }
        assert_eq!(TeamsBucket::from_label("3-4"), None);
    }

    #[test]
    fn test_bucket_serde_labels() {
        let json = serde_json::to_string(&TeamsBucket::Teams4To5).unwrap();
        assert_eq!(json, "\"4-5\"");
        let parsed: TeamsBucket = serde_json::from_str("\"6-7\"").unwrap();
        assert_eq!(parsed, TeamsBucket::Teams6To7);
    }

    #[test]
    fn test_recommend_targets() {
        assert_eq!(TeamsBucket::Teams2To3.recommend_target(), 0);
        assert_eq!(TeamsBucket::Teams4To5.recommend_target(), 5);
        assert_eq!(TeamsBucket::Teams6To7.recommend_target(), 7);
    }
}
