use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::InvalidVoteError;

/// One of the fixed impact dimensions an entity is scored on.
///
/// The set is closed: votes and score sets are mapped onto these variants at
/// the input boundary and anything else is rejected or ignored there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Social,
    Environmental,
    Political,
    Philanthropy,
    Cultural,
}

impl Category {
    pub const COUNT: usize = 5;

    /// All categories in canonical order.
    pub const ALL: [Category; Category::COUNT] = [
        Category::Social,
        Category::Environmental,
        Category::Political,
        Category::Philanthropy,
        Category::Cultural,
    ];

    /// Position in `ALL`, used to index fixed-size weight arrays.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Lowercase key as used in config files and vote submissions.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Social => "social",
            Category::Environmental => "environmental",
            Category::Political => "political",
            Category::Philanthropy => "philanthropy",
            Category::Cultural => "cultural",
        }
    }

    /// Capitalized name for display.
    pub fn label(self) -> &'static str {
        match self {
            Category::Social => "Social",
            Category::Environmental => "Environmental",
            Category::Political => "Political",
            Category::Philanthropy => "Philanthropy",
            Category::Cultural => "Cultural",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = InvalidVoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| InvalidVoteError::UnknownCategory(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Social".parse::<Category>().unwrap(), Category::Social);
        assert_eq!(" CULTURAL ".parse::<Category>().unwrap(), Category::Cultural);
        assert_eq!(
            "philanthropy".parse::<Category>().unwrap(),
            Category::Philanthropy
        );
    }

    #[test]
    fn test_parse_unknown_rejected() {
        let err = "economic".parse::<Category>().unwrap_err();
        assert_eq!(err, InvalidVoteError::UnknownCategory("economic".to_string()));
    }

    #[test]
    fn test_serde_uses_lowercase_keys() {
        let json = serde_json::to_string(&Category::Environmental).unwrap();
        assert_eq!(json, "\"environmental\"");
        let parsed: Category = serde_json::from_str("\"political\"").unwrap();
        assert_eq!(parsed, Category::Political);
    }
}
