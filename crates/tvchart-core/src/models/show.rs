use serde::{Deserialize, Serialize};

/// Addresses one episode independently of any object in the show tree.
///
/// `season` is 1-based (it doubles as the season's display id); `episode_index`
/// is the 0-based episode counter within that season, separators excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeDescriptor {
    pub show_id: i64,
    pub season: u32,
    pub episode_index: u32,
}

impl EpisodeDescriptor {
    pub fn new(show_id: i64, season: u32, episode_index: u32) -> Self {
        Self {
            show_id,
            season,
            episode_index,
        }
    }
}

impl std::fmt::Display for EpisodeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "show {} season {} episode #{}",
            self.show_id, self.season, self.episode_index
        )
    }
}

/// Whether an episode carries an official number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeKind {
    Numbered { number: u32 },
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub kind: EpisodeKind,
    pub episode_index: u32,
    pub is_watched: bool,
}

impl Episode {
    /// Official episode number, `None` for specials.
    pub fn number(&self) -> Option<u32> {
        match self.kind {
            EpisodeKind::Numbered { number } => Some(number),
            EpisodeKind::Special => None,
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self.kind, EpisodeKind::Special)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonItemKind {
    Episode(Episode),
    Separator,
}

/// One slot in a season's layout.
///
/// `index` is the 0-based position within the season including separators and is
/// stable for the lifetime of the tree. `season` is the owning season's number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonItem {
    pub index: u32,
    pub season: u32,
    pub kind: SeasonItemKind,
}

impl SeasonItem {
    pub fn as_episode(&self) -> Option<&Episode> {
        match &self.kind {
            SeasonItemKind::Episode(ep) => Some(ep),
            SeasonItemKind::Separator => None,
        }
    }

    pub fn as_episode_mut(&mut self) -> Option<&mut Episode> {
        match &mut self.kind {
            SeasonItemKind::Episode(ep) => Some(ep),
            SeasonItemKind::Separator => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self.kind, SeasonItemKind::Separator)
    }

    pub fn shape(&self) -> ItemShape {
        match &self.kind {
            SeasonItemKind::Episode(ep) => match ep.kind {
                EpisodeKind::Numbered { .. } => ItemShape::Numbered,
                EpisodeKind::Special => ItemShape::Special,
            },
            SeasonItemKind::Separator => ItemShape::Separator,
        }
    }
}

/// Layout of a season item without any derived numbering or watch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemShape {
    Numbered,
    Special,
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub number: u32,
    pub show_id: i64,
    pub items: Vec<SeasonItem>,
}

impl Season {
    /// Build a season from its layout, assigning item indices, episode indices and
    /// official numbers. Every episode starts unwatched.
    pub fn from_shapes(number: u32, shapes: impl IntoIterator<Item = ItemShape>) -> Self {
        let mut episode_index = 0;
        let mut next_number = 1;

        let items = shapes
            .into_iter()
            .enumerate()
            .map(|(index, shape)| {
                let kind = match shape {
                    ItemShape::Separator => SeasonItemKind::Separator,
                    ItemShape::Numbered | ItemShape::Special => {
                        let kind = if shape == ItemShape::Numbered {
                            let number = next_number;
                            next_number += 1;
                            EpisodeKind::Numbered { number }
                        } else {
                            EpisodeKind::Special
                        };
                        let ep = Episode {
                            kind,
                            episode_index,
                            is_watched: false,
                        };
                        episode_index += 1;
                        SeasonItemKind::Episode(ep)
                    }
                };
                SeasonItem {
                    index: index as u32,
                    season: number,
                    kind,
                }
            })
            .collect();

        Self {
            number,
            show_id: 0,
            items,
        }
    }

    pub fn episodes(&self) -> impl Iterator<Item = &Episode> {
        self.items.iter().filter_map(SeasonItem::as_episode)
    }

    pub fn episodes_mut(&mut self) -> impl Iterator<Item = &mut Episode> {
        self.items.iter_mut().filter_map(SeasonItem::as_episode_mut)
    }

    pub fn episode_count(&self) -> usize {
        self.episodes().count()
    }

    pub fn episode(&self, episode_index: u32) -> Option<&Episode> {
        self.episodes().find(|ep| ep.episode_index == episode_index)
    }

    pub fn episode_mut(&mut self, episode_index: u32) -> Option<&mut Episode> {
        self.episodes_mut()
            .find(|ep| ep.episode_index == episode_index)
    }

    /// Descriptor naming `episode` within this season.
    pub fn descriptor(&self, episode: &Episode) -> EpisodeDescriptor {
        EpisodeDescriptor::new(self.show_id, self.number, episode.episode_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub title: String,
    /// Identifier in the external metadata catalog.
    pub catalog_id: String,
    pub favorite: bool,
    pub location: String,
    pub episode_length: String,
    pub seasons: Vec<Season>,
}

impl Show {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        catalog_id: impl Into<String>,
        seasons: Vec<Season>,
    ) -> Self {
        let mut show = Self {
            id,
            title: title.into(),
            catalog_id: catalog_id.into(),
            favorite: false,
            location: String::new(),
            episode_length: String::new(),
            seasons,
        };
        show.relink();
        show
    }

    /// Recompute parent links after the tree has been (re)built.
    ///
    /// Seasons are renumbered by position so that `number == position + 1` holds.
    pub fn relink(&mut self) {
        for (position, season) in self.seasons.iter_mut().enumerate() {
            season.number = position as u32 + 1;
            season.show_id = self.id;
            for item in &mut season.items {
                item.season = season.number;
            }
        }
    }

    pub fn season(&self, number: u32) -> Option<&Season> {
        let idx = usize::try_from(number.checked_sub(1)?).ok()?;
        self.seasons.get(idx)
    }

    pub fn season_mut(&mut self, number: u32) -> Option<&mut Season> {
        let idx = usize::try_from(number.checked_sub(1)?).ok()?;
        self.seasons.get_mut(idx)
    }

    pub fn episode(&self, season: u32, episode_index: u32) -> Option<&Episode> {
        self.season(season)?.episode(episode_index)
    }

    pub fn episode_mut(&mut self, season: u32, episode_index: u32) -> Option<&mut Episode> {
        self.season_mut(season)?.episode_mut(episode_index)
    }

    /// Mark every unwatched episode at or before `target` as watched, walking seasons
    /// in order and items in index order. Returns exactly the episodes that changed.
    ///
    /// Episodes after the target are never touched. A target that does not name an
    /// episode of this show changes nothing.
    pub fn mark_watched_up_to(&mut self, target: EpisodeDescriptor) -> Vec<EpisodeDescriptor> {
        if target.show_id != self.id || self.episode(target.season, target.episode_index).is_none()
        {
            return Vec::new();
        }

        let mut changed = Vec::new();
        for season in &mut self.seasons {
            if season.number > target.season {
                break;
            }
            let show_id = season.show_id;
            let number = season.number;
            for ep in season.episodes_mut() {
                if number == target.season && ep.episode_index > target.episode_index {
                    break;
                }
                if !ep.is_watched {
                    ep.is_watched = true;
                    changed.push(EpisodeDescriptor::new(show_id, number, ep.episode_index));
                }
            }
        }
        changed
    }

    /// Set the watched flag on each described episode of this show. Descriptors that
    /// name another show or a missing episode are skipped. Returns how many were found.
    pub fn set_watched(&mut self, descriptors: &[EpisodeDescriptor], watched: bool) -> usize {
        let id = self.id;
        let mut found = 0;
        for desc in descriptors.iter().filter(|d| d.show_id == id) {
            if let Some(ep) = self.episode_mut(desc.season, desc.episode_index) {
                ep.is_watched = watched;
                found += 1;
            }
        }
        found
    }

    pub fn watched_count(&self) -> usize {
        self.seasons
            .iter()
            .flat_map(Season::episodes)
            .filter(|ep| ep.is_watched)
            .count()
    }

    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(Season::episode_count).sum()
    }
}
