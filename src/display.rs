//! Terminal rendering: the model table, config groups and the lines printed
//! while reconciling. Everything returns a `String`; callers print.

use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::{CONFIG_FILENAME, Group, ModelGroups, ReplacementMap},
    models::ModelRecord,
    reconcile::Event,
};

const UNKNOWN: &str = "?";
const SPINNER_CHARS: &[&str] = &["◒", "◐", "◓", "◑"];

/// `printf("%.3g")`: three significant digits, trailing zeros dropped,
/// exponent notation below 1e-4 and from 1e3 up.
pub fn format_sig3(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let scientific = format!("{value:.2e}");
    let Some((mantissa, exp)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return scientific;
    };

    if !(-4..3).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.abs())
    } else {
        let decimals = (2 - exp) as usize;
        trim_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

pub fn format_price(value: f64) -> String {
    format!("${}/M", format_sig3(value))
}

/// Context window in units of 1024 tokens.
pub fn format_context(tokens: Option<u64>) -> String {
    match tokens {
        Some(n) if n > 0 => format!("{}k", n / 1024),
        _ => UNKNOWN.to_string(),
    }
}

pub fn format_flags(model: &ModelRecord) -> String {
    model
        .flags()
        .iter()
        .map(|flag| flag.abbreviation())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

struct Column {
    title: &'static str,
    align: Align,
    style: fn(&str) -> ColoredString,
}

const COLUMNS: [Column; 6] = [
    Column {
        title: "Model",
        align: Align::Left,
        style: |s| s.cyan().bold(),
    },
    Column {
        title: "Quant",
        align: Align::Left,
        style: |s| s.magenta(),
    },
    Column {
        title: "Ctx",
        align: Align::Right,
        style: |s| s.green(),
    },
    Column {
        title: "$/M in",
        align: Align::Right,
        style: |s| s.yellow(),
    },
    Column {
        title: "$/M out",
        align: Align::Right,
        style: |s| s.yellow(),
    },
    Column {
        title: "Flags",
        align: Align::Left,
        style: |s| s.dimmed(),
    },
];

fn model_row(model: &ModelRecord) -> [String; 6] {
    [
        model.id.clone(),
        model
            .quantization
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        format_context(model.context_tokens()),
        format_sig3(model.pricing.prompt),
        format_sig3(model.pricing.completion),
        format_flags(model),
    ]
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{cell:<width$}"),
        Align::Right => format!("{cell:>width$}"),
    }
}

/// The inventory as a table, sorted case-insensitively by id.
pub fn models_table(models: &[ModelRecord]) -> String {
    let mut sorted: Vec<&ModelRecord> = models.iter().collect();
    sorted.sort_by_cached_key(|m| m.id.to_lowercase());
    let rows: Vec<[String; 6]> = sorted.into_iter().map(model_row).collect();

    let mut widths = COLUMNS.map(|c| c.title.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    // the last column is left unpadded so styled rows carry no trailing blanks
    if let Some(last) = widths.last_mut() {
        *last = 0;
    }

    let mut out = format!("{}\n", format!("Chutes Models ({})", models.len()).bold());

    let header: Vec<String> = COLUMNS
        .iter()
        .zip(widths)
        .map(|(col, width)| pad(col.title, width, col.align).bold().to_string())
        .collect();
    out.push_str(&header.join(" "));
    out.push('\n');

    let rule: Vec<String> = widths
        .iter()
        .zip(COLUMNS)
        .map(|(&w, col)| "─".repeat(w.max(col.title.chars().count())))
        .collect();
    out.push_str(&rule.join(" "));
    out.push('\n');

    for row in &rows {
        let used = row.len() - usize::from(row[row.len() - 1].is_empty());
        let cells: Vec<String> = COLUMNS
            .iter()
            .zip(widths)
            .zip(row)
            .take(used)
            .map(|((col, width), cell)| (col.style)(&pad(cell, width, col.align)).to_string())
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

/// Each recognized group with its size and members.
pub fn config_groups(groups: &ModelGroups) -> String {
    let mut out = String::new();
    for group in Group::ALL {
        let models = groups.get(group);
        out.push_str(&format!("\n{} ({}):\n", group.key().bold(), models.len()));
        for model in models {
            out.push_str(&format!("  {model}\n"));
        }
    }
    out
}

pub fn event_line(event: Event<'_>) -> String {
    match event {
        Event::Live(id) => format!("{} {id}", "  OK".green()),
        Event::Missing(id) => format!("{} {id}", "  MISSING".red()),
        Event::NoCandidates(_) => "  No candidates available.".red().to_string(),
        Event::Exhausted(_) => "  No more candidates.".dimmed().to_string(),
    }
}

pub fn candidate_line(model: &ModelRecord) -> String {
    format!(
        "  Candidate: {}  (in {}, out {})",
        model.id.cyan().bold(),
        format_price(model.pricing.prompt),
        format_price(model.pricing.completion),
    )
}

pub fn all_live_line() -> String {
    format!("\n{}", "All models are live.".green().bold())
}

pub fn replacements_summary(replacements: &ReplacementMap) -> String {
    let mut out = format!(
        "\n{}\n",
        format!("Replacements written to {CONFIG_FILENAME}:").bold()
    );
    for (old, new) in replacements.iter() {
        out.push_str(&format!("  {old} → {}\n", new.cyan().bold()));
    }
    out
}

/// Indeterminate spinner on stderr. Caller finishes it.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(SPINNER_CHARS);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
