use chrono::{DateTime, Utc};
use tvchart_core::error::DisplayableError;

/// One user-facing error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDisplayItem {
    pub id: u64,
    pub description: String,
    pub details: Option<String>,
    pub at: DateTime<Utc>,
}

/// Errors waiting to be shown or dismissed, oldest first.
#[derive(Debug, Default)]
pub struct ErrorDisplayList {
    items: Vec<ErrorDisplayItem>,
    next_id: u64,
}

impl ErrorDisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error and return the id to dismiss it with.
    pub fn add(&mut self, error: &dyn DisplayableError) -> u64 {
        self.push(error.display_description(), error.display_details())
    }

    /// Record an error that has no user-facing description of its own.
    pub fn add_plain(&mut self, error: &dyn std::error::Error) -> u64 {
        self.push(error.to_string(), None)
    }

    fn push(&mut self, description: String, details: Option<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(ErrorDisplayItem {
            id,
            description,
            details,
            at: Utc::now(),
        });
        id
    }

    pub fn remove(&mut self, id: u64) {
        self.items.retain(|item| item.id != id);
    }

    pub fn items(&self) -> &[ErrorDisplayItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tvchart_core::models::EpisodeDescriptor;

    use super::*;
    use crate::error::CommandError;

    #[test]
    fn test_add_and_remove() {
        let mut list = ErrorDisplayList::new();
        assert!(list.is_empty());

        let first = list.add(&CommandError::EpisodeNotFound(EpisodeDescriptor::new(3, 1, 4)));
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let second = list.add_plain(&io);
        assert_ne!(first, second);

        assert_eq!(list.items()[0].description, "Episode is no longer available");
        assert_eq!(list.items()[0].details.as_deref(), Some("show 3 season 1 episode #4"));
        assert_eq!(list.items()[1].description, "disk full");
        assert_eq!(list.items()[1].details, None);

        list.remove(first);
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.items()[0].id, second);

        list.remove(first);
        list.remove(second);
        assert!(list.is_empty());
    }
}
