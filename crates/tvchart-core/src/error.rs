use thiserror::Error;

/// Errors that can be shown to the user as a short headline plus optional details.
pub trait DisplayableError: std::error::Error {
    fn display_description(&self) -> String;

    fn display_details(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Malformed season or watched-status map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("season {season}: unexpected character {found:?} at position {position} in season map")]
    InvalidSeasonMapChar {
        season: u32,
        position: usize,
        found: char,
    },

    #[error(
        "season {season}: unexpected character {found:?} at position {position} in watched map"
    )]
    InvalidWatchedMapChar {
        season: u32,
        position: usize,
        found: char,
    },
}

impl DisplayableError for CodecError {
    fn display_description(&self) -> String {
        "Received malformed show data".into()
    }

    fn display_details(&self) -> Option<String> {
        Some(self.to_string())
    }
}
