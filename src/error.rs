use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Invalid Riot ID format. Use format: Name#TAG")]
    InvalidRiotId,

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("{0} is not registered on a clash team")]
    NoClashTeam(String),

    #[error("Champion id {0} is missing from the champion catalog")]
    UnknownChampion(i64),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

/// Non-fatal conditions reported alongside the tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerIssue {
    #[error("Could not find player: {0}")]
    NotFound(String),

    #[error("{0} has no recent match history")]
    NoMatchHistory(String),

    #[error("Could not load match history for {0}")]
    HistoryUnavailable(String),

    #[error("{player}: {games} games with an unknown role were left out")]
    UnclassifiedGames { player: String, games: u32 },

    #[error("{0} has no recent ranked or clash games")]
    NoRankedHistory(String),

    #[error("Could not load champion mastery for {0}")]
    NoMastery(String),

    #[error("Could not load ranked information for {0}")]
    NoRank(String),
}
