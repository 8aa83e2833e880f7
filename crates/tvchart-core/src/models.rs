pub mod library;
pub mod show;

pub use library::{sort_by_title, title_sort_key, Library};
pub use show::{
    Episode, EpisodeDescriptor, EpisodeKind, ItemShape, Season, SeasonItem, SeasonItemKind, Show,
};
