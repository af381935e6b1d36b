use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Pill tag that selects every category.
pub const ALL_CATEGORIES_TAG: &str = "__all";

/// Active category filter.
///
/// Pills carry plain string tags; the reserved `__all` tag maps to `All` and
/// every other tag (including the empty string) is an exact category match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn from_tag(tag: &str) -> Self {
        if tag == ALL_CATEGORIES_TAG {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(tag.to_string())
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES_TAG,
            CategoryFilter::Only(category) => category.as_str(),
        }
    }

    /// Exact, case-sensitive category match.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_tag())
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&value))
    }
}
