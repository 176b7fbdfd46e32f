//! Runs one scouting request from loaded players to finished tables.
//!
//! All state lives in the values passed between stages; nothing is shared
//! between requests.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::analysis::champion_tables::{
    mastery_table, recent_table, role_champion_table, ChampionTable, TableKind,
};
use crate::analysis::highlight::ScoredColumn;
use crate::analysis::position::{DeclaredPosition, Position};
use crate::analysis::ranks::PlayerRank;
use crate::analysis::recommender::{BanRecommendation, BanRecommender};
use crate::analysis::resolver::{order_players, ResolveError};
use crate::analysis::role_tally::{role_rate_columns, tally_player};
use crate::config::ScoutSettings;
use crate::error::{AppError, PlayerIssue};
use crate::model::{Player, PlayerIdentity};
use crate::source::{parse_riot_id, ScoutSource};

#[derive(Debug, Clone)]
pub struct ScoutContext {
    pub settings: ScoutSettings,
    pub now: DateTime<Utc>,
}

impl ScoutContext {
    pub fn new(settings: ScoutSettings) -> Self {
        ScoutContext {
            settings,
            now: Utc::now(),
        }
    }

    pub fn history_cutoff(&self) -> DateTime<Utc> {
        self.now - self.settings.lookback
    }
}

#[derive(Debug, Default)]
pub struct LoadedRoster {
    pub players: Vec<Player>,
    pub issues: Vec<PlayerIssue>,
}

/// Fetches everything the tables need for one identified player. Missing
/// data is recorded as an issue and left empty.
#[instrument(skip(source, ctx, identity), fields(player = %identity.game_name))]
pub fn populate_player(
    source: &dyn ScoutSource,
    ctx: &ScoutContext,
    identity: PlayerIdentity,
    declared: Option<DeclaredPosition>,
) -> (Player, Vec<PlayerIssue>) {
    let mut issues = Vec::new();
    let mut player = Player::new(identity);
    player.locked_in_position = declared;

    match source.match_history(&player.identity, ctx.history_cutoff()) {
        Ok(matches) => {
            player.matches = matches;
            if !player.has_history() {
                issues.push(PlayerIssue::NoMatchHistory(player.name().to_string()));
            } else if player.ranked_matches().next().is_none() {
                issues.push(PlayerIssue::NoRankedHistory(player.name().to_string()));
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to load match history");
            issues.push(PlayerIssue::HistoryUnavailable(player.name().to_string()));
        }
    }

    match source.champion_mastery(&player.identity) {
        Ok(mastery) => player.mastery = mastery,
        Err(e) => {
            warn!(error = %e, "Failed to load champion mastery");
            issues.push(PlayerIssue::NoMastery(player.name().to_string()));
        }
    }

    match source.league_entries(&player.identity) {
        Ok(entries) => player.rank = PlayerRank::best_of(&entries),
        Err(e) => {
            warn!(error = %e, "Failed to load ranked information");
            issues.push(PlayerIssue::NoRank(player.name().to_string()));
        }
    }

    info!(
        games = player.matches.len(),
        mastery = player.mastery.len(),
        rank = %player.rank,
        "Loaded player"
    );
    (player, issues)
}

/// Loads a list of `Name#TAG` handles. Players that cannot be found are
/// reported and skipped.
pub fn load_players(
    source: &dyn ScoutSource,
    ctx: &ScoutContext,
    handles: &[String],
    mut on_loaded: impl FnMut(&str),
) -> LoadedRoster {
    let mut roster = LoadedRoster::default();

    for handle in handles {
        let identity = parse_riot_id(handle)
            .and_then(|(name, tag)| source.find_player(&name, &tag));
        match identity {
            Ok(identity) => {
                let (player, issues) = populate_player(source, ctx, identity, None);
                roster.players.push(player);
                roster.issues.extend(issues);
            }
            Err(e) => {
                warn!(%handle, error = %e, "Player lookup failed");
                roster.issues.push(PlayerIssue::NotFound(handle.clone()));
            }
        }
        on_loaded(handle);
    }

    roster
}

/// Loads the clash team `handle` is registered on, with each member's
/// declared position.
pub fn load_team(
    source: &dyn ScoutSource,
    ctx: &ScoutContext,
    handle: &str,
    mut on_loaded: impl FnMut(&str),
) -> Result<LoadedRoster, AppError> {
    let (name, tag) = parse_riot_id(handle)?;
    let captain = source.find_player(&name, &tag)?;
    let members = source.team_roster(&captain)?;
    if members.is_empty() {
        return Err(AppError::NoClashTeam(captain.riot_id()));
    }

    let mut roster = LoadedRoster::default();
    for member in members {
        let identity = if member.puuid == captain.puuid {
            Ok(captain.clone())
        } else {
            source.find_player_by_puuid(&member.puuid)
        };
        match identity {
            Ok(identity) => {
                let label = identity.riot_id();
                let (player, issues) = populate_player(source, ctx, identity, member.declared);
                roster.players.push(player);
                roster.issues.extend(issues);
                on_loaded(&label);
            }
            Err(e) => {
                warn!(puuid = %member.puuid, error = %e, "Team member lookup failed");
                roster.issues.push(PlayerIssue::NotFound(member.puuid.clone()));
                on_loaded(&member.puuid);
            }
        }
    }

    Ok(roster)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineupRow {
    pub player: String,
    pub declared: Option<DeclaredPosition>,
    pub resolved: Option<Position>,
    pub collided: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankRow {
    pub player: String,
    pub rank: PlayerRank,
    pub has_history: bool,
}

#[derive(Debug)]
pub struct ScoutReport {
    /// Lineup order when the roster resolved, input order otherwise.
    pub players: Vec<Player>,
    pub roster_order: Result<(), ResolveError>,
    pub lineup: Vec<LineupRow>,
    pub role_rates: Vec<ScoredColumn>,
    pub mastery: ChampionTable,
    pub recent_all: ChampionTable,
    pub recent_ranked: ChampionTable,
    pub role_champions: Option<ChampionTable>,
    pub ranks: Vec<RankRow>,
    pub bans: Vec<BanRecommendation>,
    pub issues: Vec<PlayerIssue>,
}

/// Tally, resolve, reorder, then build every table from the ordered players.
pub fn build_report(roster: LoadedRoster, ctx: &ScoutContext) -> ScoutReport {
    let LoadedRoster {
        mut players,
        mut issues,
    } = roster;

    for player in players.iter_mut() {
        let games = tally_player(player).unclassified();
        if games > 0 {
            issues.push(PlayerIssue::UnclassifiedGames {
                player: player.name().to_string(),
                games,
            });
        }
    }

    let (players, resolution) = order_players(players);
    let collided: Vec<bool> = match &resolution {
        Ok(resolution) => {
            let by_input: Vec<bool> = (0..players.len())
                .map(|idx| resolution.collided(idx))
                .collect();
            resolution.reorder(by_input)
        }
        Err(_) => vec![false; players.len()],
    };

    let lineup = players
        .iter()
        .zip(collided)
        .map(|(p, collided)| LineupRow {
            player: p.name().to_string(),
            declared: p.locked_in_position,
            resolved: p.real_position,
            collided,
        })
        .collect();

    let role_rates = role_rate_columns(&players);
    let mastery = mastery_table(&players, &ctx.settings, ctx.now);
    let recent_all = recent_table(&players, TableKind::RecentAll, &ctx.settings, ctx.now);
    let recent_ranked = recent_table(&players, TableKind::RecentRanked, &ctx.settings, ctx.now);
    let role_champions = role_champion_table(&players, &ctx.settings);

    let mut recommender = BanRecommender::new();
    recommender.fold_table(&mastery);
    recommender.fold_table(&recent_all);
    recommender.fold_table(&recent_ranked);
    if let Some(table) = &role_champions {
        recommender.fold_table(table);
    }
    let bans = recommender.get_recommendations(ctx.settings.ban_rows);

    let ranks = players
        .iter()
        .map(|p| RankRow {
            player: p.name().to_string(),
            rank: p.rank,
            has_history: p.has_history(),
        })
        .collect();

    ScoutReport {
        players,
        roster_order: resolution.map(|_| ()),
        lineup,
        role_rates,
        mastery,
        recent_all,
        recent_ranked,
        role_champions,
        ranks,
        bans,
        issues,
    }
}
