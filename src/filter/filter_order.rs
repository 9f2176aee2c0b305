use super::error::FilterError;
use super::registry::accessor;
use super::types::SortSpec;
use crate::database::models::TodoItem;

pub struct FilterOrder;

impl FilterOrder {
    /// Stable sort by the attribute's native value; ties keep insertion order in both directions.
    pub fn sort(items: &mut [TodoItem], spec: &SortSpec) -> Result<(), FilterError> {
        let key = accessor(spec.attribute)?.sort_key;
        items.sort_by(|a, b| spec.direction.apply(key(a).cmp(&key(b))));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::PriorityType;
    use crate::filter::types::{AttributeType, SortDirection};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn named(names: &[&str]) -> Vec<TodoItem> {
        names.iter().map(|n| TodoItem::new(Uuid::nil(), *n)).collect()
    }

    fn names(items: &[TodoItem]) -> Vec<String> {
        items.iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn sorts_names_both_ways() {
        let mut items = named(&["Banana", "Apple", "Cherry"]);
        FilterOrder::sort(&mut items, &SortSpec::new(AttributeType::Name, None)).unwrap();
        assert_eq!(names(&items), vec!["Apple", "Banana", "Cherry"]);

        FilterOrder::sort(&mut items, &SortSpec::new(AttributeType::Name, Some(SortDirection::Desc))).unwrap();
        assert_eq!(names(&items), vec!["Cherry", "Banana", "Apple"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut items = named(&["first", "second", "third"]);
        items[1].priority = PriorityType::High;

        FilterOrder::sort(&mut items, &SortSpec::new(AttributeType::Priority, Some(SortDirection::Desc))).unwrap();
        assert_eq!(names(&items), vec!["second", "first", "third"]);
    }

    #[test]
    fn undated_items_sort_first_ascending() {
        let mut items = named(&["later", "never", "sooner"]);
        items[0].due_date = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        items[2].due_date = Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap());

        FilterOrder::sort(&mut items, &SortSpec::new(AttributeType::DueDate, None)).unwrap();
        assert_eq!(names(&items), vec!["never", "sooner", "later"]);
    }
}
