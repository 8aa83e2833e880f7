use serde::Deserialize;

use crate::traits::EpisodeMetadata;

/// One entry of the TVmaze `shows/{id}/episodes` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TvMazeEpisode {
    pub season: u32,
    /// `None` for specials.
    pub number: Option<u32>,
    pub name: Option<String>,
    /// Minutes.
    pub runtime: Option<u32>,
    /// HTML.
    pub summary: Option<String>,
}

impl TvMazeEpisode {
    pub fn into_metadata(self) -> EpisodeMetadata {
        let length = match self.runtime {
            Some(minutes) => format!("{minutes} min."),
            None => "n/a".into(),
        };
        EpisodeMetadata {
            season: self.season,
            episode: self.number,
            title: self.name.unwrap_or_default(),
            length,
            synopsis: self.summary.as_deref().map(strip_paragraph),
        }
    }
}

/// Remove a leading `<p>` and a trailing `</p>`.
fn strip_paragraph(html: &str) -> String {
    let html = html.strip_prefix("<p>").unwrap_or(html);
    html.strip_suffix("</p>").unwrap_or(html).to_string()
}

/// Split a flat episode listing into seasons, starting a new season whenever the
/// season field changes. Specials stay in their airing position.
pub fn group_by_season(episodes: Vec<EpisodeMetadata>) -> Vec<Vec<EpisodeMetadata>> {
    let mut seasons: Vec<Vec<EpisodeMetadata>> = Vec::new();
    for ep in episodes {
        match seasons.last_mut() {
            Some(current) if current.last().map(|e| e.season) == Some(ep.season) => {
                current.push(ep)
            }
            _ => seasons.push(vec![ep]),
        }
    }
    seasons
}
