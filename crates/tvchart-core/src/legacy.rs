//! Conversion to and from the superseded "seen-thru" watch model.
//!
//! The old protocol tracked only a high-water mark: the season of the latest watched
//! episode and how many episodes of that season were watched. Converting to it is
//! lossy. An unwatched episode followed by a later watched one is reported as if
//! everything up to the later one were watched.

use serde::{Deserialize, Serialize};

use crate::models::Show;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeenThru {
    /// 1-based season number.
    pub season: u32,
    pub episodes_watched: u32,
}

impl Default for SeenThru {
    fn default() -> Self {
        Self {
            season: 1,
            episodes_watched: 0,
        }
    }
}

impl SeenThru {
    pub fn covers(&self, season: u32, episode_index: u32) -> bool {
        season < self.season || (season == self.season && episode_index < self.episodes_watched)
    }
}

/// Overwrite every episode's watched flag from a seen-thru mark.
pub fn apply_seen_thru(show: &mut Show, seen_thru: SeenThru) {
    for season in &mut show.seasons {
        let number = season.number;
        for ep in season.episodes_mut() {
            ep.is_watched = seen_thru.covers(number, ep.episode_index);
        }
    }
}

/// Find the latest watched episode, ignoring any unwatched gaps before it.
pub fn seen_thru(show: &Show) -> SeenThru {
    let mut mark = SeenThru::default();
    for season in &show.seasons {
        for (count, ep) in season.episodes().enumerate() {
            if ep.is_watched {
                mark = SeenThru {
                    season: season.number,
                    episodes_watched: count as u32 + 1,
                };
            }
        }
    }
    mark
}
