use crate::cache::ChampionCatalog;
use crate::config::Config;
use crate::error::AppError;
use crate::model::{
    ChampionMasteryEntry, LeagueEntry, MatchRecord, PlayerIdentity, Queue, RosterMember,
};
use crate::source::ScoutSource;
use chrono::{DateTime, Utc};
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::de::DeserializeOwned;
use std::cell::{Cell, RefCell};
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::endpoints;
use super::models::*;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

// Development keys allow 20 requests per second and 100 per two minutes.
const SHORT_WINDOW_REQUESTS: NonZeroU32 = match NonZeroU32::new(20) {
    Some(n) => n,
    None => unreachable!(),
};
const LONG_WINDOW_REQUESTS: NonZeroU32 = match NonZeroU32::new(100) {
    Some(n) => n,
    None => unreachable!(),
};
const LONG_WINDOW_REPLENISH: Duration = Duration::from_millis(1200);

const MAX_RETRIES: u32 = 3;
const RETRY_STEP_MS: u64 = 2000;
const MATCH_PAGE_SIZE: usize = 100;
const USER_AGENT: &str = "clash_scout/0.1.0";
/// A new patch ships every two weeks; check for one weekly.
const CATALOG_MAX_AGE_DAYS: i64 = 7;

pub struct RiotApiClient {
    config: Config,
    agent: ureq::Agent,
    short_limiter: DirectLimiter,
    long_limiter: DirectLimiter,
    catalog: RefCell<Option<ChampionCatalog>>,
    catalog_refreshed: Cell<bool>,
}

impl RiotApiClient {
    pub fn new(config: Config) -> Self {
        let long_quota = Quota::with_period(LONG_WINDOW_REPLENISH)
            .map(|q| q.allow_burst(LONG_WINDOW_REQUESTS))
            .unwrap_or_else(|| Quota::per_minute(LONG_WINDOW_REQUESTS));

        RiotApiClient {
            config,
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(10))
                .user_agent(USER_AGENT)
                .build(),
            short_limiter: RateLimiter::direct(Quota::per_second(SHORT_WINDOW_REQUESTS)),
            long_limiter: RateLimiter::direct(long_quota),
            catalog: RefCell::new(None),
            catalog_refreshed: Cell::new(false),
        }
    }

    fn region(&self) -> &str {
        &self.config.region
    }

    fn wait_for(limiter: &DirectLimiter) {
        let clock = DefaultClock::default();
        while let Err(not_until) = limiter.check() {
            let wait = not_until.wait_time_from(clock.now());
            debug!(wait_ms = wait.as_millis() as u64, "Waiting for rate limit quota");
            thread::sleep(wait);
        }
    }

    /// Fetches a Riot API resource. `Ok(None)` means the resource does not
    /// exist (HTTP 404).
    fn execute_request(&self, url: &str) -> Result<Option<String>, AppError> {
        let mut retry_count = 0;

        loop {
            Self::wait_for(&self.short_limiter);
            Self::wait_for(&self.long_limiter);

            let response = self
                .agent
                .get(url)
                .set("X-Riot-Token", &self.config.api_key)
                .call();

            match response {
                Ok(resp) => {
                    return resp
                        .into_string()
                        .map(Some)
                        .map_err(|e| AppError::HttpError(e.to_string()));
                }
                Err(ureq::Error::Status(404, _)) => return Ok(None),
                Err(ureq::Error::Status(429, resp)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::RateLimited);
                    }
                    let wait_ms = resp
                        .header("Retry-After")
                        .and_then(|secs| secs.trim().parse::<u64>().ok())
                        .map(|secs| secs * 1000)
                        .unwrap_or(RETRY_STEP_MS * u64::from(retry_count + 1));
                    warn!(wait_ms, attempt = retry_count + 1, "Rate limited, retrying");
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(code, resp)) => {
                    return Err(AppError::ApiError(format!(
                        "{} {} from {}",
                        code,
                        resp.status_text(),
                        resp.get_url()
                    )));
                }
                Err(e) => {
                    return Err(AppError::HttpError(e.to_string()));
                }
            }
        }
    }

    fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, AppError> {
        match self.execute_request(url)? {
            Some(body) => serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| AppError::JsonError(e.to_string())),
            None => Ok(None),
        }
    }

    /// Data Dragon is static content: no key and no rate limit.
    fn fetch_static<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let body = self
            .agent
            .get(url)
            .call()
            .map_err(|e| AppError::HttpError(e.to_string()))?
            .into_string()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))
    }

    fn get_account(&self, game_name: &str, tag_line: &str) -> Result<AccountDto, AppError> {
        let url = endpoints::account_by_riot_id(self.region(), game_name, tag_line);
        self.fetch_json(&url)?
            .ok_or_else(|| AppError::PlayerNotFound(format!("{}#{}", game_name, tag_line)))
    }

    /// Ids of the newest qualifying games across every drafted or blind
    /// queue, so ARAM and event games never use up the match budget.
    fn get_match_ids(&self, puuid: &str, since: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let limit = self.config.match_limit;
        let mut ids: Vec<String> = Vec::new();

        for queue_id in Queue::NON_RANDOM.iter().filter_map(|q| q.queue_id()) {
            let mut fetched = 0;
            while fetched < limit {
                let count = (limit - fetched).min(MATCH_PAGE_SIZE);
                let url = endpoints::match_ids(
                    self.region(),
                    puuid,
                    queue_id,
                    since.timestamp(),
                    fetched,
                    count,
                );
                let page: Vec<String> = self.fetch_json(&url)?.unwrap_or_default();
                let exhausted = page.len() < count;
                fetched += page.len();
                ids.extend(page);
                if exhausted {
                    break;
                }
            }
        }

        Ok(newest_match_ids(ids, limit))
    }

    fn get_match(&self, match_id: &str) -> Result<Option<MatchDto>, AppError> {
        self.fetch_json(&endpoints::match_detail(self.region(), match_id))
    }

    /// Downloads the newest catalog unless the cached one is already for
    /// that version.
    fn refresh_catalog(&self) -> Result<(), AppError> {
        self.catalog_refreshed.set(true);

        let versions: Vec<String> = self.fetch_static(&endpoints::data_dragon_versions())?;
        let latest = versions
            .first()
            .ok_or_else(|| AppError::ApiError("Data Dragon returned no versions".to_string()))?;

        let current = self.catalog.borrow().as_ref().map(|c| c.version.clone());
        if current.as_deref() == Some(latest.as_str()) {
            debug!(version = %latest, "Champion catalog already current");
            if let Some(catalog) = self.catalog.borrow_mut().as_mut() {
                catalog.fetched_at = Utc::now();
                if let Err(e) = catalog.save() {
                    warn!(error = %e, "Could not write champion catalog cache");
                }
            }
            return Ok(());
        }

        let data: DataDragonChampions =
            self.fetch_static(&endpoints::data_dragon_champions(latest))?;
        let catalog = ChampionCatalog::from_data_dragon(data, Utc::now());
        info!(version = %catalog.version, champions = catalog.len(), "Refreshed champion catalog");
        if let Err(e) = catalog.save() {
            warn!(error = %e, "Could not write champion catalog cache");
        }
        *self.catalog.borrow_mut() = Some(catalog);
        Ok(())
    }

    fn ensure_catalog(&self) -> Result<(), AppError> {
        if self.catalog.borrow().is_some() {
            return Ok(());
        }
        match ChampionCatalog::load() {
            Ok(Some(catalog)) => {
                debug!(version = %catalog.version, "Loaded champion catalog from disk");
                let max_age = chrono::Duration::days(CATALOG_MAX_AGE_DAYS);
                let stale = catalog.is_stale(max_age, Utc::now());
                *self.catalog.borrow_mut() = Some(catalog);
                if stale {
                    // a failed version check still leaves the cached catalog usable
                    if let Err(e) = self.refresh_catalog() {
                        warn!(error = %e, "Could not check for a newer champion catalog");
                    }
                }
                Ok(())
            }
            Ok(None) => self.refresh_catalog(),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable champion catalog cache");
                self.refresh_catalog()
            }
        }
    }

    fn cached_name(&self, key: i64) -> Option<String> {
        self.catalog
            .borrow()
            .as_ref()
            .and_then(|c| c.name_for(key))
            .map(str::to_string)
    }

    /// Looks up a champion name, refreshing the catalog once on a miss.
    fn champion_name(&self, key: i64) -> Result<String, AppError> {
        self.ensure_catalog()?;
        if let Some(name) = self.cached_name(key) {
            return Ok(name);
        }
        if !self.catalog_refreshed.get() {
            self.refresh_catalog()?;
            if let Some(name) = self.cached_name(key) {
                return Ok(name);
            }
        }
        Err(AppError::UnknownChampion(key))
    }
}

impl ScoutSource for RiotApiClient {
    #[instrument(skip(self))]
    fn find_player(&self, game_name: &str, tag_line: &str) -> Result<PlayerIdentity, AppError> {
        let account = self.get_account(game_name, tag_line)?;
        Ok(account.into())
    }

    #[instrument(skip(self))]
    fn find_player_by_puuid(&self, puuid: &str) -> Result<PlayerIdentity, AppError> {
        let url = endpoints::account_by_puuid(self.region(), puuid);
        self.fetch_json::<AccountDto>(&url)?
            .map(PlayerIdentity::from)
            .ok_or_else(|| AppError::PlayerNotFound(puuid.to_string()))
    }

    #[instrument(skip(self, player), fields(player = %player.riot_id()))]
    fn team_roster(&self, player: &PlayerIdentity) -> Result<Vec<RosterMember>, AppError> {
        let registrations: Vec<ClashPlayerDto> = self
            .fetch_json(&endpoints::clash_players(self.region(), &player.puuid))?
            .unwrap_or_default();

        let team_id = registrations
            .into_iter()
            .find_map(|r| r.team_id)
            .ok_or_else(|| AppError::NoClashTeam(player.riot_id()))?;

        let team: ClashTeamDto = self
            .fetch_json(&endpoints::clash_team(self.region(), &team_id))?
            .ok_or_else(|| AppError::NoClashTeam(player.riot_id()))?;

        info!(team = %team.id, members = team.players.len(), "Found clash team");
        Ok(team.players.into_iter().map(RosterMember::from).collect())
    }

    #[instrument(skip(self, player), fields(player = %player.riot_id()))]
    fn match_history(
        &self,
        player: &PlayerIdentity,
        since: DateTime<Utc>,
    ) -> Result<Vec<MatchRecord>, AppError> {
        let ids = self.get_match_ids(&player.puuid, since)?;
        debug!(matches = ids.len(), "Fetched match ids");

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.get_match(id) {
                Ok(Some(detail)) => match detail.record_for(&player.puuid) {
                    Some(record) if record.played_at >= since && record.queue.is_non_random() => {
                        records.push(record)
                    }
                    Some(_) => {}
                    None => debug!(match_id = %id, "Player missing from match participants"),
                },
                Ok(None) => debug!(match_id = %id, "Match no longer available"),
                Err(AppError::RateLimited) => return Err(AppError::RateLimited),
                Err(e) => warn!(match_id = %id, error = %e, "Skipping match"),
            }
        }

        Ok(records)
    }

    #[instrument(skip(self, player), fields(player = %player.riot_id()))]
    fn champion_mastery(
        &self,
        player: &PlayerIdentity,
    ) -> Result<Vec<ChampionMasteryEntry>, AppError> {
        let entries: Vec<ChampionMasteryDto> = self
            .fetch_json(&endpoints::champion_mastery(self.region(), &player.puuid))?
            .unwrap_or_default();

        let mut mastery = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.champion_name(entry.champion_id) {
                Ok(champion) => mastery.push(ChampionMasteryEntry {
                    champion,
                    points: entry.champion_points,
                    last_played: entry.last_played(),
                }),
                Err(AppError::UnknownChampion(id)) => {
                    warn!(champion_id = id, "Champion missing from catalog, skipping mastery entry")
                }
                Err(e) => return Err(e),
            }
        }

        Ok(mastery)
    }

    #[instrument(skip(self, player), fields(player = %player.riot_id()))]
    fn league_entries(&self, player: &PlayerIdentity) -> Result<Vec<LeagueEntry>, AppError> {
        let entries: Vec<LeagueEntryDto> = self
            .fetch_json(&endpoints::league_entries(self.region(), &player.puuid))?
            .unwrap_or_default();

        Ok(entries.into_iter().map(LeagueEntry::from).collect())
    }
}

/// Match ids carry a per-platform sequence number (`NA1_4812345678`) that
/// grows with time; newest first, duplicates dropped.
fn newest_match_ids(mut ids: Vec<String>, limit: usize) -> Vec<String> {
    let sequence = |id: &str| {
        id.rsplit('_')
            .next()
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0)
    };
    ids.sort_by(|a, b| sequence(b).cmp(&sequence(a)).then_with(|| a.cmp(b)));
    ids.dedup();
    ids.truncate(limit);
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_queue_pages_keep_the_newest_games() {
        let ids = vec![
            "NA1_100".to_string(),
            "NA1_300".to_string(),
            "NA1_200".to_string(),
            "NA1_400".to_string(),
            "NA1_300".to_string(),
        ];
        assert_eq!(newest_match_ids(ids, 3), ["NA1_400", "NA1_300", "NA1_200"]);
    }

    #[test]
    fn short_histories_are_kept_whole() {
        let ids = vec!["EUW1_7".to_string(), "EUW1_9".to_string()];
        assert_eq!(newest_match_ids(ids, 40), ["EUW1_9", "EUW1_7"]);
    }
}
