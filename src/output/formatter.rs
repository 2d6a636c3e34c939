use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::entities::Entity;
use crate::scoring::{AggregatorState, RankedEntity, ScoreResult, SkippedEntity};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score to two decimals. Rounding happens here only; the engine
/// keeps full precision.
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// Format a weight as a percentage with one decimal ("30.0%")
pub fn format_weight(weight: f64) -> String {
    format!("{:.1}%", weight * 100.0)
}

/// Format net worth in billions ("$245.3B"), or "-" when unknown
pub fn format_net_worth(net_worth: Option<f64>) -> String {
    match net_worth {
        Some(value) => format!("${:.1}B", value),
        None => "-".to_string(),
    }
}

/// A ranked entity joined with its source record for display
pub struct RankedRow<'a> {
    pub ranked: &'a RankedEntity,
    pub entity: &'a Entity,
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format ranked entities as a table with columns: Rank, Score, Name, Net worth
/// Rank column: 4 chars (fits "999."), right-aligned
/// Score column: 8 chars, right-aligned
pub fn format_ranked_table(rows: &[RankedRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No ranked entities.".to_string();
    }

    let term_width = get_terminal_width();
    let rank_width = 4;
    let score_width = 8;
    let separator = "  ";

    rows.iter()
        .map(|row| {
            let rank_str = format!("{:>width$}", format!("{}.", row.ranked.rank), width = rank_width);
            let score_padded = format!(
                "{:>width$}",
                format_score(row.ranked.score),
                width = score_width
            );
            let worth = format_net_worth(row.entity.net_worth);
            let fixed_width = rank_width + 1 + score_width + separator.len() * 2 + worth.len();

            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&row.entity.name, width - fixed_width)
                }
                // Very narrow terminal
                Some(_) => truncate_name(&row.entity.name, 20),
                // No terminal (pipe), don't truncate
                None => row.entity.name.clone(),
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str.dimmed(),
                    score_padded.bold(),
                    separator,
                    name,
                    separator,
                    worth.green()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str, score_padded, separator, name, separator, worth
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked entities as tab-separated values for scripting
/// Columns: rank, score (full precision), id, name (no headers, no colors)
pub fn format_tsv(rows: &[RankedRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}",
                row.ranked.rank, row.ranked.score, row.entity.id, row.entity.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per entity left out of the ranking
pub fn format_skipped(skipped: &[SkippedEntity]) -> String {
    skipped
        .iter()
        .map(|s| format!("Skipped {}: {}", s.id, s.error))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one entity with its score breakdown (for `show`)
pub fn format_entity_detail(
    entity: &Entity,
    rank: Option<usize>,
    result: &ScoreResult,
    use_colors: bool,
) -> String {
    let mut lines = Vec::new();
    let rank_str = rank.map(|r| format!("#{}", r)).unwrap_or_else(|| "-".to_string());

    if use_colors {
        lines.push(format!("{} ({})", entity.name.bold(), entity.id.dimmed()));
    } else {
        lines.push(format!("{} ({})", entity.name, entity.id));
    }
    lines.push(format!("  Rank: {}", rank_str));
    lines.push(format!("  Overall: {}", format_score(result.score)));
    lines.push(format!("  Net worth: {}", format_net_worth(entity.net_worth)));

    for c in &result.breakdown.contributions {
        lines.push(format!(
            "  {:<14}{:>8} x {:>6} = {:>8}",
            format!("{}:", c.category.label()),
            format_score(c.score),
            format_weight(c.weight),
            format_score(c.contribution)
        ));
    }

    lines.join("\n")
}

/// Format the canonical weighting with a bar per category (for `weights`)
pub fn format_weights(state: &AggregatorState, now: DateTime<Utc>, use_colors: bool) -> String {
    const BAR_WIDTH: f64 = 30.0;
    let mut lines = Vec::new();

    for (category, weight) in state.weights.iter() {
        let bar = "#".repeat((weight * BAR_WIDTH).round() as usize);
        let label = format!("{:<14}", format!("{}:", category.label()));
        let pct = format!("{:>6}", format_weight(weight));
        if use_colors {
            lines.push(format!("{}{}  {}", label, pct.bold(), bar.cyan()));
        } else {
            lines.push(format!("{}{}  {}", label, pct, bar));
        }
    }

    lines.push(String::new());
    lines.push(format!("Policy: {}", state.policy));
    lines.push(format!("Votes folded: {}", state.votes_folded));
    let updated = match state.updated_at {
        Some(at) => format!("{} ago", format_age(now - at)),
        None => "never (defaults)".to_string(),
    };
    lines.push(format!("Last update: {}", updated));

    lines.join("\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "<1m".to_string()
        }
    }
}
