use crate::analysis::champion_tables::{ChampionTable, TableKind};
use crate::analysis::highlight::{Highlight, ScoredCell, ScoredColumn};
use crate::analysis::position::Position;
use crate::analysis::ranks::Tier;
use crate::analysis::recommender::BanRecommendation;
use crate::scout::{LineupRow, RankRow, ScoutReport};
use colored::*;
use std::io::{self, Write};
use tabled::{builder::Builder, settings::Style, Table};

const NO_DATA: &str = "no data";

/// Mastery points the way the client shows them: `1.2 M`, `350.5 K`.
pub fn format_mastery(points: u64) -> String {
    if points >= 1_000_000 {
        format!("{:.1} M", points as f64 / 1_000_000.0)
    } else if points >= 1_000 {
        format!("{:.1} K", points as f64 / 1_000.0)
    } else {
        points.to_string()
    }
}

fn paint(text: &str, highlight: Highlight) -> String {
    match highlight {
        Highlight::Red => text.red().bold().to_string(),
        Highlight::Orange => text.truecolor(255, 140, 0).bold().to_string(),
        Highlight::Yellow => text.truecolor(230, 200, 40).to_string(),
        Highlight::Blue => text.truecolor(90, 150, 240).to_string(),
        Highlight::Green => text.truecolor(80, 190, 90).to_string(),
        Highlight::Plain => text.to_string(),
    }
}

fn paint_title(title: &str, tier: Option<Tier>) -> String {
    let (r, g, b) = match tier {
        Some(Tier::Iron) => (110, 100, 95),
        Some(Tier::Bronze) => (170, 110, 70),
        Some(Tier::Silver) => (170, 180, 190),
        Some(Tier::Gold) => (220, 180, 70),
        Some(Tier::Platinum) => (60, 170, 160),
        Some(Tier::Emerald) => (40, 190, 110),
        Some(Tier::Diamond) => (110, 140, 240),
        Some(Tier::Master) => (170, 80, 220),
        Some(Tier::Grandmaster) => (220, 60, 60),
        Some(Tier::Challenger) => (240, 210, 120),
        None => return title.bold().to_string(),
    };
    title.truecolor(r, g, b).bold().to_string()
}

fn cell_text(cell: &ScoredCell, kind: TableKind) -> String {
    match cell.value {
        Some(value) if !cell.is_empty() => {
            let value = match kind {
                TableKind::Mastery => format_mastery(value),
                _ => value.to_string(),
            };
            paint(&format!("{} {}", cell.label, value), cell.highlight)
        }
        _ => String::new(),
    }
}

/// Players across, rows down; an optional leading column labels the rows.
fn column_table(
    columns: &[ScoredColumn],
    row_labels: Option<&[&str]>,
    render: impl Fn(&ScoredCell) -> String,
) -> Table {
    let rows = columns.iter().map(|c| c.cells.len()).max().unwrap_or(0);
    let mut builder = Builder::default();

    let mut header: Vec<String> = Vec::with_capacity(columns.len() + 1);
    if row_labels.is_some() {
        header.push(String::new());
    }
    header.extend(columns.iter().map(|c| paint_title(&c.title, c.title_tier)));
    builder.push_record(header);

    for row in 0..rows {
        let mut record: Vec<String> = Vec::with_capacity(columns.len() + 1);
        if let Some(labels) = row_labels {
            record.push(labels.get(row).copied().unwrap_or_default().bold().to_string());
        }
        record.extend(
            columns
                .iter()
                .map(|c| c.cells.get(row).map(|cell| render(cell)).unwrap_or_default()),
        );
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table
}

fn section(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", title.bold().cyan())?;
    writeln!(out, "{}", "=".repeat(60).cyan())
}

fn legend(out: &mut impl Write, entries: &[(Highlight, &str)]) -> io::Result<()> {
    let parts: Vec<String> = entries
        .iter()
        .map(|(highlight, meaning)| paint(meaning, *highlight))
        .collect();
    writeln!(out, "{}", parts.join("  "))
}

fn write_lineup(out: &mut impl Write, lineup: &[LineupRow]) -> io::Result<()> {
    section(out, "Declared positions")?;
    let mut builder = Builder::default();
    builder.push_record(["Player", "Declared", "Resolved"]);
    for row in lineup {
        let declared = match row.declared {
            Some(declared) if row.collided => format!("{} {}", declared, "(collision)".yellow()),
            Some(declared) => declared.to_string(),
            None => "NONE".dimmed().to_string(),
        };
        let resolved = row
            .resolved
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        builder.push_record([row.player.clone(), declared, resolved]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    writeln!(out, "{}", table)
}

fn write_ranks(out: &mut impl Write, ranks: &[RankRow]) -> io::Result<()> {
    section(out, "Ranks")?;
    let mut builder = Builder::default();
    builder.push_record(["Player", "Rank"]);
    for row in ranks {
        let rank = if row.has_history {
            row.rank.to_string()
        } else {
            format!("{} ({})", row.rank, NO_DATA.dimmed())
        };
        builder.push_record([paint_title(&row.player, row.rank.tier()), rank]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    writeln!(out, "{}", table)
}

fn write_role_rates(out: &mut impl Write, columns: &[ScoredColumn]) -> io::Result<()> {
    section(out, "Games per role")?;
    if columns.is_empty() {
        return writeln!(out, "{}", NO_DATA.yellow());
    }
    let labels: Vec<&str> = Position::ALL.iter().map(|p| p.short_label()).collect();
    let table = column_table(columns, Some(labels.as_slice()), |cell| match cell.value {
        Some(value) => paint(&value.to_string(), cell.highlight),
        None => String::new(),
    });
    writeln!(out, "{}", table)?;
    legend(
        out,
        &[(Highlight::Red, "50+ games"), (Highlight::Orange, "25+ games")],
    )
}

fn table_title(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Mastery => "Champion mastery",
        TableKind::RecentAll => "Recent games",
        TableKind::RecentRanked => "Recent ranked and clash games",
        TableKind::RoleChampions => "Champions in their role",
    }
}

fn write_champion_table(out: &mut impl Write, table: &ChampionTable) -> io::Result<()> {
    section(out, table_title(table.kind))?;
    if table.is_empty() {
        return writeln!(out, "{}", NO_DATA.yellow());
    }
    let rendered = column_table(&table.columns, None, |cell| cell_text(cell, table.kind));
    writeln!(out, "{}", rendered)?;
    match table.kind {
        TableKind::Mastery => legend(
            out,
            &[
                (Highlight::Orange, "15%+ of top mastery"),
                (Highlight::Red, "high and shared"),
                (Highlight::Yellow, "shared"),
            ],
        ),
        TableKind::RoleChampions => legend(
            out,
            &[
                (Highlight::Orange, "main pick"),
                (Highlight::Blue, "regular pick"),
                (Highlight::Red, "main and shared"),
                (Highlight::Yellow, "regular and shared"),
                (Highlight::Green, "shared"),
            ],
        ),
        _ => legend(
            out,
            &[
                (Highlight::Orange, "over 25 games"),
                (Highlight::Blue, "over 10 games"),
                (Highlight::Red, "over 25 and shared"),
                (Highlight::Yellow, "over 10 and shared"),
                (Highlight::Green, "shared"),
            ],
        ),
    }
}

fn write_bans(out: &mut impl Write, bans: &[BanRecommendation]) -> io::Result<()> {
    section(out, "Ban suggestions")?;
    if bans.is_empty() {
        return writeln!(
            out,
            "{}",
            "No ban recommendations available (not enough data)".yellow()
        );
    }
    let mut builder = Builder::default();
    builder.push_record(["#", "Champion", "Score"]);
    for (idx, ban) in bans.iter().enumerate() {
        builder.push_record([
            format!("#{}", idx + 1),
            paint(&ban.champion_name, ban.highlight),
            paint(&format!("{:.2}", ban.display_score), ban.highlight),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    writeln!(out, "{}", table)
}

/// Writes the full report. Sections are always emitted in the same order.
pub fn render_report(out: &mut impl Write, report: &ScoutReport) -> io::Result<()> {
    writeln!(out, "\n{}", "🎮 Clash scouting report".bold().cyan())?;

    for issue in &report.issues {
        writeln!(out, "{} {}", "⚠️".yellow(), issue)?;
    }
    if let Err(e) = &report.roster_order {
        writeln!(
            out,
            "{} {} (showing players in input order)",
            "⚠️".yellow(),
            e
        )?;
    }

    if report.lineup.iter().any(|row| row.declared.is_some()) {
        write_lineup(out, &report.lineup)?;
    }
    write_ranks(out, &report.ranks)?;
    write_role_rates(out, &report.role_rates)?;
    write_champion_table(out, &report.mastery)?;
    write_champion_table(out, &report.recent_all)?;
    write_champion_table(out, &report.recent_ranked)?;
    if let Some(table) = &report.role_champions {
        write_champion_table(out, table)?;
    }
    write_bans(out, &report.bans)?;
    writeln!(out)
}

/// Renders the report while holding the stdout lock so concurrent renders
/// cannot interleave.
pub fn display_report(report: &ScoutReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_report(&mut out, report)?;
    out.flush()
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(999, "999")]
    #[case(1_000, "1.0 K")]
    #[case(350_500, "350.5 K")]
    #[case(1_234_567, "1.2 M")]
    fn formats_mastery_points(#[case] points: u64, #[case] expected: &str) {
        assert_eq!(format_mastery(points), expected);
    }

    #[test]
    fn empty_cells_render_blank() {
        assert_eq!(cell_text(&ScoredCell::empty(), TableKind::RecentAll), "");
    }

    #[test]
    fn champion_cells_carry_label_and_value() {
        let cell = ScoredCell::new("Ahri", 12, Highlight::Plain);
        assert_eq!(cell_text(&cell, TableKind::RecentAll), "Ahri 12");
        let cell = ScoredCell::new("Ahri", 120_000, Highlight::Plain);
        assert_eq!(cell_text(&cell, TableKind::Mastery), "Ahri 120.0 K");
    }

    #[test]
    fn column_table_pads_short_columns() {
        let columns = vec![
            ScoredColumn::new("One", None, vec![ScoredCell::new("Ahri", 3, Highlight::Plain)]),
            ScoredColumn::new(
                "Two",
                None,
                vec![
                    ScoredCell::new("Zed", 2, Highlight::Plain),
                    ScoredCell::new("Lux", 1, Highlight::Plain),
                ],
            ),
        ];
        let rendered =
            column_table(&columns, None, |c| cell_text(c, TableKind::RecentAll)).to_string();
        assert!(rendered.contains("Ahri 3"));
        assert!(rendered.contains("Lux 1"));
        assert_eq!(rendered.lines().filter(|l| l.contains("Lux 1")).count(), 1);
    }
}
