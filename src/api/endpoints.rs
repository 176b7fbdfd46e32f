// URL builders for the Riot endpoints the scout reads.
// Platform hosts (na1, euw1, ...) serve league, mastery and clash data;
// regional hosts (americas, europe, ...) serve accounts and matches.

const DATA_DRAGON: &str = "https://ddragon.leagueoflegends.com";

/// Regional routing value for a platform id.
pub fn regional_routing(platform: &str) -> &'static str {
    match platform.to_ascii_lowercase().as_str() {
        "na1" | "br1" | "la1" | "la2" => "americas",
        "euw1" | "eun1" | "tr1" | "ru" | "me1" => "europe",
        "kr" | "jp1" => "asia",
        "oc1" | "ph2" | "sg2" | "th2" | "tw2" | "vn2" => "sea",
        _ => "americas",
    }
}

fn platform_host(platform: &str) -> String {
    format!("https://{}.api.riotgames.com", platform.to_ascii_lowercase())
}

fn regional_host(platform: &str) -> String {
    format!("https://{}.api.riotgames.com", regional_routing(platform))
}

fn encode_segment(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

pub fn account_by_riot_id(platform: &str, game_name: &str, tag_line: &str) -> String {
    format!(
        "{}/riot/account/v1/accounts/by-riot-id/{}/{}",
        regional_host(platform),
        encode_segment(game_name),
        encode_segment(tag_line)
    )
}

pub fn account_by_puuid(platform: &str, puuid: &str) -> String {
    format!("{}/riot/account/v1/accounts/by-puuid/{}", regional_host(platform), puuid)
}

pub fn match_ids(
    platform: &str,
    puuid: &str,
    queue_id: i64,
    start_time: i64,
    start: usize,
    count: usize,
) -> String {
    format!(
        "{}/lol/match/v5/matches/by-puuid/{}/ids?queue={}&startTime={}&start={}&count={}",
        regional_host(platform),
        puuid,
        queue_id,
        start_time,
        start,
        count
    )
}

pub fn match_detail(platform: &str, match_id: &str) -> String {
    format!("{}/lol/match/v5/matches/{}", regional_host(platform), match_id)
}

pub fn champion_mastery(platform: &str, puuid: &str) -> String {
    format!(
        "{}/lol/champion-mastery/v4/champion-masteries/by-puuid/{}",
        platform_host(platform),
        puuid
    )
}

pub fn league_entries(platform: &str, puuid: &str) -> String {
    format!("{}/lol/league/v4/entries/by-puuid/{}", platform_host(platform), puuid)
}

pub fn clash_players(platform: &str, puuid: &str) -> String {
    format!("{}/lol/clash/v1/players/by-puuid/{}", platform_host(platform), puuid)
}

pub fn clash_team(platform: &str, team_id: &str) -> String {
    format!("{}/lol/clash/v1/teams/{}", platform_host(platform), team_id)
}

pub fn data_dragon_versions() -> String {
    format!("{}/api/versions.json", DATA_DRAGON)
}

pub fn data_dragon_champions(version: &str) -> String {
    format!("{}/cdn/{}/data/en_US/champion.json", DATA_DRAGON, version)
}
