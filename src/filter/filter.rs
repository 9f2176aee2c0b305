use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::registry::accessor;
use super::types::{FilterSpec, SortSpec};
use crate::database::models::TodoItem;

/// Filter and/or sort over a list's items, driven by the attribute registry
#[derive(Debug, Clone, Default)]
pub struct Filter {
    filter: Option<FilterSpec>,
    sort: Option<SortSpec>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.filter = Some(spec);
        self
    }

    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sort = Some(spec);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filter.is_none() && self.sort.is_none()
    }

    /// Keep matching items in their original relative order, then sort if requested.
    pub fn apply(&self, items: Vec<TodoItem>) -> Result<Vec<TodoItem>, FilterError> {
        let mut items = match &self.filter {
            Some(spec) => {
                let matches = accessor(spec.attribute)?.matches;
                items.into_iter().filter(|item| matches(item, &spec.key)).collect()
            }
            None => items,
        };

        if let Some(spec) = &self.sort {
            FilterOrder::sort(&mut items, spec)?;
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{PriorityType, StatusType};
    use crate::filter::types::{AttributeType, SortDirection};
    use uuid::Uuid;

    fn item(name: &str, priority: PriorityType, status: StatusType) -> TodoItem {
        let mut item = TodoItem::new(Uuid::nil(), name);
        item.priority = priority;
        item.status = status;
        item
    }

    fn names(items: &[TodoItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn filter_keeps_relative_order() {
        let items = vec![
            item("w", PriorityType::Low, StatusType::Completed),
            item("x", PriorityType::Medium, StatusType::InProgress),
            item("y", PriorityType::High, StatusType::Completed),
            item("z", PriorityType::Critical, StatusType::NotStarted),
        ];

        let out = Filter::new()
            .filter(FilterSpec::new(AttributeType::Status, Some("Completed")))
            .apply(items)
            .unwrap();

        assert_eq!(names(&out), vec!["w", "y"]);
    }

    #[test]
    fn filter_then_sort() {
        let items = vec![
            item("Banana", PriorityType::Critical, StatusType::NotStarted),
            item("Cherry", PriorityType::High, StatusType::NotStarted),
            item("Apple", PriorityType::High, StatusType::NotStarted),
        ];

        let out = Filter::new()
            .filter(FilterSpec::new(AttributeType::Priority, Some("High")))
            .sort(SortSpec::new(AttributeType::Name, Some(SortDirection::Asc)))
            .apply(items)
            .unwrap();

        assert_eq!(names(&out), vec!["Apple", "Cherry"]);
    }

    #[test]
    fn empty_filter_is_identity() {
        let items = vec![item("b", PriorityType::Low, StatusType::NotStarted), item("a", PriorityType::Low, StatusType::NotStarted)];
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert_eq!(names(&filter.apply(items).unwrap()), vec!["b", "a"]);
    }
}
