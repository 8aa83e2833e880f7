use std::collections::HashMap;

use super::show::{Episode, EpisodeDescriptor, Show};

/// Leading articles ignored when ordering titles.
const ARTICLES: &[&str] = &["a", "an", "the"];

/// All shows known to the client, rebuilt wholesale on every full fetch.
#[derive(Debug, Clone, Default)]
pub struct Library {
    shows: Vec<Show>,
    by_id: HashMap<i64, usize>,
}

impl Library {
    pub fn new(shows: Vec<Show>) -> Self {
        let by_id = shows
            .iter()
            .enumerate()
            .map(|(pos, show)| (show.id, pos))
            .collect();
        Self { shows, by_id }
    }

    pub fn shows(&self) -> &[Show] {
        &self.shows
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }

    pub fn find_show(&self, id: i64) -> Option<&Show> {
        self.by_id.get(&id).and_then(|&pos| self.shows.get(pos))
    }

    pub fn find_show_mut(&mut self, id: i64) -> Option<&mut Show> {
        let pos = *self.by_id.get(&id)?;
        self.shows.get_mut(pos)
    }

    pub fn find_episode(&self, desc: &EpisodeDescriptor) -> Option<&Episode> {
        self.find_show(desc.show_id)?
            .episode(desc.season, desc.episode_index)
    }

    pub fn find_episode_mut(&mut self, desc: &EpisodeDescriptor) -> Option<&mut Episode> {
        self.find_show_mut(desc.show_id)?
            .episode_mut(desc.season, desc.episode_index)
    }
}

/// Lowercased title with one leading article removed.
pub fn title_sort_key(title: &str) -> String {
    let lower = title.trim().to_lowercase();
    for article in ARTICLES {
        if let Some(rest) = lower.strip_prefix(article) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim_start().to_string();
            }
        }
    }
    lower
}

pub fn sort_by_title(shows: &mut [Show]) {
    shows.sort_by_cached_key(|show| title_sort_key(&show.title));
}
