//! Compact string encoding of season layouts and watched status.
//!
//! A season map has one character per season item, in index order:
//! `.` numbered episode, `S` special, `+` separator.
//!
//! A watched map has one character per *episode* (separators have no slot):
//! `x` watched, `.` unwatched. Positions past the end of the map are unwatched
//! and extra trailing characters are ignored.

use crate::error::CodecError;
use crate::models::{ItemShape, Season, Show};

const NUMBERED: char = '.';
const SPECIAL: char = 'S';
const SEPARATOR: char = '+';
const WATCHED: char = 'x';
const UNWATCHED: char = '.';

/// Parse a season map into item shapes.
pub fn parse_season_map(season: u32, map: &str) -> Result<Vec<ItemShape>, CodecError> {
    map.chars()
        .enumerate()
        .map(|(position, c)| match c {
            NUMBERED => Ok(ItemShape::Numbered),
            SPECIAL => Ok(ItemShape::Special),
            SEPARATOR => Ok(ItemShape::Separator),
            found => Err(CodecError::InvalidSeasonMapChar {
                season,
                position,
                found,
            }),
        })
        .collect()
}

/// Decode one season from its season map and (possibly short) watched map.
pub fn decode_season(
    number: u32,
    season_map: &str,
    watched_map: &str,
) -> Result<Season, CodecError> {
    let mut season = Season::from_shapes(number, parse_season_map(number, season_map)?);
    apply_watched_map(&mut season, watched_map)?;
    Ok(season)
}

/// Set each episode's watched flag from `map`, by episode index.
pub fn apply_watched_map(season: &mut Season, map: &str) -> Result<(), CodecError> {
    let flags = map
        .chars()
        .enumerate()
        .map(|(position, c)| match c {
            WATCHED => Ok(true),
            UNWATCHED => Ok(false),
            found => Err(CodecError::InvalidWatchedMapChar {
                season: season.number,
                position,
                found,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    for ep in season.episodes_mut() {
        ep.is_watched = flags
            .get(ep.episode_index as usize)
            .copied()
            .unwrap_or(false);
    }
    Ok(())
}

pub fn season_map(season: &Season) -> String {
    season
        .items
        .iter()
        .map(|item| match item.shape() {
            ItemShape::Numbered => NUMBERED,
            ItemShape::Special => SPECIAL,
            ItemShape::Separator => SEPARATOR,
        })
        .collect()
}

pub fn watched_map(season: &Season) -> String {
    season
        .episodes()
        .map(|ep| if ep.is_watched { WATCHED } else { UNWATCHED })
        .collect()
}

/// Decode all seasons of a show. A missing watched map leaves that season unwatched.
pub fn decode_seasons<S: AsRef<str>>(
    season_maps: &[S],
    watched_maps: &[S],
) -> Result<Vec<Season>, CodecError> {
    season_maps
        .iter()
        .enumerate()
        .map(|(idx, map)| {
            let watched = watched_maps.get(idx).map(AsRef::as_ref).unwrap_or("");
            decode_season(idx as u32 + 1, map.as_ref(), watched)
        })
        .collect()
}

/// Encode a show's seasons as `(season_maps, watched_maps)`.
pub fn encode_seasons(show: &Show) -> (Vec<String>, Vec<String>) {
    show.seasons
        .iter()
        .map(|season| (season_map(season), watched_map(season)))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EpisodeKind;

    #[test]
    fn test_decode_mixed_season() {
        let season = decode_season(1, "..S+.", "xx.x").unwrap();
        let items = &season.items;
        assert_eq!(items.len(), 5);

        let ep = items[0].as_episode().unwrap();
        assert_eq!(ep.kind, EpisodeKind::Numbered { number: 1 });
        assert_eq!((ep.episode_index, ep.is_watched), (0, true));
        let ep = items[1].as_episode().unwrap();
        assert_eq!(ep.kind, EpisodeKind::Numbered { number: 2 });
        assert_eq!((ep.episode_index, ep.is_watched), (1, true));
        let ep = items[2].as_episode().unwrap();
        assert_eq!((ep.kind, ep.episode_index, ep.is_watched), (EpisodeKind::Special, 2, false));
        assert!(items[3].is_separator());
        assert_eq!(items[3].index, 3);
        let ep = items[4].as_episode().unwrap();
        assert_eq!(ep.kind, EpisodeKind::Numbered { number: 3 });
        assert_eq!((ep.episode_index, ep.is_watched), (3, true));
        assert_eq!(items[4].index, 4);
    }

    #[test]
    fn test_short_watched_map_defaults_to_unwatched() {
        let season = decode_season(1, "....", "x").unwrap();
        let flags: Vec<bool> = season.episodes().map(|e| e.is_watched).collect();
        assert_eq!(flags, vec![true, false, false, false]);
    }

    #[test]
    fn test_long_watched_map_is_truncated() {
        let season = decode_season(1, "..", "xxxx").unwrap();
        assert_eq!(watched_map(&season), "xx");
    }

    #[test]
    fn test_invalid_season_char() {
        let err = decode_season(2, "..?", "").unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidSeasonMapChar {
                season: 2,
                position: 2,
                found: '?'
            }
        );
    }

    #[test]
    fn test_invalid_watched_char() {
        let err = decode_season(1, "..", "xo").unwrap_err();
        assert!(matches!(err, CodecError::InvalidWatchedMapChar { position: 1, .. }));
    }

    #[test]
    fn test_missing_watched_maps() {
        let seasons = decode_seasons(&["..", "S."], &["x."]).unwrap();
        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons[1].number, 2);
        assert!(seasons[1].episodes().all(|e| !e.is_watched));
    }

    #[test]
    fn test_roundtrip_preserves_structure_and_flags() {
        let maps = ["....", "S.+..", "+S+"];
        let watched = ["xx..", "...x", "x"];
        let seasons = decode_seasons(&maps, &watched).unwrap();
        let show = Show::new(1, "For All Mankind", "41414", seasons);

        let (season_maps, watched_maps) = encode_seasons(&show);
        assert_eq!(season_maps, maps);
        assert_eq!(watched_maps, watched);

        let seasons = decode_seasons(&season_maps, &watched_maps).unwrap();
        let decoded = Show::new(1, "For All Mankind", "41414", seasons);
        assert_eq!(decoded, show);
    }

    #[test]
    fn test_empty_season() {
        let season = decode_season(1, "", "").unwrap();
        assert!(season.items.is_empty());
        assert_eq!(season_map(&season), "");
    }
}
