use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::FilterError;

/// Item attribute that can parameterize a filter or a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    Name,
    Description,
    DueDate,
    Status,
    Priority,
}

impl AttributeType {
    pub const ALL: [AttributeType; 5] = [
        AttributeType::Name,
        AttributeType::Description,
        AttributeType::DueDate,
        AttributeType::Status,
        AttributeType::Priority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Name => "Name",
            AttributeType::Description => "Description",
            AttributeType::DueDate => "DueDate",
            AttributeType::Status => "Status",
            AttributeType::Priority => "Priority",
        }
    }
}

impl FromStr for AttributeType {
    type Err = FilterError;

    /// Case-insensitive; `dueDate`, `due_date` and `DueDate` are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.trim().chars().filter(|c| *c != '_').collect::<String>().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|attr| attr.as_str().to_ascii_lowercase() == wanted)
            .ok_or_else(|| FilterError::UnsupportedAttribute(s.to_string()))
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Orient an ascending comparison
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(FilterError::InvalidSortOrder(s.to_string())),
        }
    }
}

/// Native typed value of an attribute, compared when sorting.
/// All items sorted together produce the same variant for a given attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Text(String),
    // None sorts before any date
    Date(Option<DateTime<Utc>>),
    Ordinal(u8),
}

/// Filter condition: attribute plus the raw value supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub attribute: AttributeType,
    pub key: String,
}

impl FilterSpec {
    /// A missing key is treated as the empty value
    pub fn new(attribute: AttributeType, key: Option<&str>) -> Self {
        Self {
            attribute,
            key: key.unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub attribute: AttributeType,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(attribute: AttributeType, direction: Option<SortDirection>) -> Self {
        Self {
            attribute,
            direction: direction.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attribute_names_loosely() {
        assert_eq!("dueDate".parse::<AttributeType>(), Ok(AttributeType::DueDate));
        assert_eq!("due_date".parse::<AttributeType>(), Ok(AttributeType::DueDate));
        assert_eq!("PRIORITY".parse::<AttributeType>(), Ok(AttributeType::Priority));
        assert!("owner".parse::<AttributeType>().is_err());
    }

    #[test]
    fn parses_sort_direction() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert!("sideways".parse::<SortDirection>().is_err());
        assert_eq!(SortSpec::new(AttributeType::Name, None).direction, SortDirection::Asc);
    }
}
