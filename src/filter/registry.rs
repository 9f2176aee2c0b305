//! Attribute dispatch table.
//!
//! Each [`AttributeType`] maps to a predicate and a sort-key extractor. Adding an
//! attribute means adding one entry here; callers only ever go through [`accessor`].

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;

use super::error::FilterError;
use super::types::{AttributeType, SortKey};
use crate::database::models::{PriorityType, StatusType, TodoItem};

/// Predicate and sort-key extractor for one attribute
#[derive(Clone, Copy)]
pub struct AttributeAccessor {
    pub matches: fn(&TodoItem, &str) -> bool,
    pub sort_key: fn(&TodoItem) -> SortKey,
}

impl std::fmt::Debug for AttributeAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeAccessor").finish_non_exhaustive()
    }
}

static REGISTRY: Lazy<HashMap<AttributeType, AttributeAccessor>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert(
        AttributeType::Name,
        AttributeAccessor {
            matches: |item, raw| item.name == raw,
            sort_key: |item| SortKey::Text(item.name.clone()),
        },
    );
    table.insert(
        AttributeType::Description,
        AttributeAccessor {
            matches: |item, raw| item.description.contains(raw),
            sort_key: |item| SortKey::Text(item.description.clone()),
        },
    );
    table.insert(
        AttributeType::DueDate,
        AttributeAccessor {
            matches: due_date_matches,
            sort_key: |item| SortKey::Date(item.due_date),
        },
    );
    table.insert(
        AttributeType::Status,
        AttributeAccessor {
            matches: |item, raw| StatusType::from_raw(raw) == Some(item.status),
            sort_key: |item| SortKey::Ordinal(item.status.ordinal()),
        },
    );
    table.insert(
        AttributeType::Priority,
        AttributeAccessor {
            matches: |item, raw| PriorityType::from_raw(raw) == Some(item.priority),
            sort_key: |item| SortKey::Ordinal(item.priority.ordinal()),
        },
    );
    table
});

/// Look up the accessor pair for an attribute
pub fn accessor(attribute: AttributeType) -> Result<&'static AttributeAccessor, FilterError> {
    REGISTRY
        .get(&attribute)
        .ok_or(FilterError::MissingAccessor(attribute.as_str()))
}

/// Same calendar day (UTC), time of day ignored. An empty filter value selects
/// items without a due date; values that do not parse as a date match nothing.
fn due_date_matches(item: &TodoItem, raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return item.due_date.is_none();
    }
    match (parse_date(raw), item.due_date) {
        (Some(wanted), Some(due)) => due.date_naive() == wanted,
        _ => false,
    }
}

/// Accepted: RFC 3339 timestamps, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM:SS` and `MM/DD/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.date());
        }
    }
    ["%Y-%m-%d", "%m/%d/%Y"]
        .into_iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn item(name: &str, description: &str) -> TodoItem {
        let mut item = TodoItem::new(Uuid::new_v4(), name);
        item.description = description.to_string();
        item
    }

    #[test]
    fn every_attribute_has_an_accessor() {
        for attribute in AttributeType::ALL {
            assert!(accessor(attribute).is_ok(), "missing accessor for {}", attribute);
        }
    }

    #[test]
    fn name_is_exact_and_description_is_substring() {
        let milk = item("Milk", "two litres, semi skimmed");
        let name = accessor(AttributeType::Name).unwrap();
        let description = accessor(AttributeType::Description).unwrap();

        assert!((name.matches)(&milk, "Milk"));
        assert!(!(name.matches)(&milk, "milk"));
        assert!(!(name.matches)(&milk, "Mil"));
        assert!((description.matches)(&milk, "semi"));
        assert!(!(description.matches)(&milk, "Semi"));
    }

    #[test]
    fn due_date_compares_calendar_day_only() {
        let mut dentist = item("Dentist", "");
        dentist.due_date = Some(Utc.with_ymd_and_hms(2025, 5, 22, 16, 45, 0).unwrap());
        let undated = item("Someday", "");
        let due = accessor(AttributeType::DueDate).unwrap();

        assert!((due.matches)(&dentist, "2025-05-22"));
        assert!((due.matches)(&dentist, "2025-05-22T08:00:00Z"));
        assert!((due.matches)(&dentist, "05/22/2025"));
        assert!(!(due.matches)(&dentist, "2025-05-23"));
        assert!(!(due.matches)(&dentist, "not a date"));
        assert!(!(due.matches)(&undated, "not a date"));
        assert!((due.matches)(&undated, ""));
        assert!(!(due.matches)(&dentist, ""));
    }

    #[test]
    fn status_and_priority_convert_raw_values() {
        let mut task = item("Report", "");
        task.status = StatusType::Completed;
        task.priority = PriorityType::High;

        assert!((accessor(AttributeType::Status).unwrap().matches)(&task, "completed"));
        assert!((accessor(AttributeType::Status).unwrap().matches)(&task, "2"));
        assert!(!(accessor(AttributeType::Status).unwrap().matches)(&task, "bogus"));
        assert!((accessor(AttributeType::Priority).unwrap().matches)(&task, "High"));
        assert!(!(accessor(AttributeType::Priority).unwrap().matches)(&task, "Low"));
    }

    #[test]
    fn sort_keys_use_native_values() {
        let mut urgent = item("b", "");
        urgent.priority = PriorityType::Critical;
        let relaxed = item("a", "");
        let key = accessor(AttributeType::Priority).unwrap().sort_key;

        assert!(key(&relaxed) < key(&urgent));
        assert_eq!((accessor(AttributeType::Name).unwrap().sort_key)(&relaxed), SortKey::Text("a".to_string()));
    }
}
