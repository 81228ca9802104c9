//! Plain-text output. Everything here returns strings; printing happens in
//! `commands.rs`.

use chrono::{DateTime, Local, Utc};
use huntapp::integrity::{IntegrityReport, IntegrityStatus};
use huntapp::mirror::format_number;
use huntapp::model::Hunt;
use huntapp::recovery::{RecoveryOutcome, RecoveryReport};
use huntapp::settings::{DateFormat, Settings, TimeFormat};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

pub fn format_datetime(at: DateTime<Utc>, settings: &Settings) -> String {
    let local = at.with_timezone(&Local);
    let date = match settings.date_format {
        DateFormat::DayMonthYearDots => "%d.%m.%Y",
        DateFormat::MonthDayYear => "%m/%d/%Y",
        DateFormat::DayMonthYear => "%d/%m/%Y",
        DateFormat::Iso => "%Y-%m-%d",
        DateFormat::DayShortMonthYear => "%d-%b-%Y",
    };
    let time = match settings.time_format {
        TimeFormat::TwelveHour => "%-I:%M %p",
        TimeFormat::TwentyFourHour => "%H:%M",
    };
    local.format(&format!("{} {}", date, time)).to_string()
}

/// Rows carry each hunt's 1-based position in the full list.
pub fn hunt_list(rows: &[(usize, Hunt)], settings: &Settings) -> String {
    if rows.is_empty() {
        return "No hunts yet. Start one with `hunt create <name> --target <species>`.\n"
            .to_string();
    }
    let name_width = rows.iter().map(|(_, h)| h.name.width()).max().unwrap_or(0);
    let mut out = String::new();
    for (position, hunt) in rows {
        // Padded by display width, not char count.
        let padding = " ".repeat(name_width.saturating_sub(hunt.name.width()));
        let _ = write!(
            out,
            "{:>3}. {}{}  {:>9}  {}",
            position,
            hunt.name,
            padding,
            format_number(hunt.count, settings.number_separator),
            hunt.target_species,
        );
        if hunt.archived {
            out.push_str("  [archived]");
        }
        out.push('\n');
    }
    out
}

pub fn hunt_detail(hunt: &Hunt, settings: &Settings) -> String {
    let sep = settings.number_separator;
    let mut out = String::new();
    let _ = writeln!(out, "{}  ({})", hunt.name, hunt.id);
    if hunt.archived {
        let _ = writeln!(out, "  [archived]");
    }
    let _ = writeln!(out, "  Target:      {}", hunt.target_species);
    if !hunt.game.is_empty() {
        let _ = writeln!(out, "  Game:        {}", hunt.game);
    }
    if !hunt.method.is_empty() {
        let _ = writeln!(out, "  Method:      {}", hunt.method);
    }
    let _ = writeln!(out, "  Count:       {}", format_number(hunt.count, sep));
    let _ = writeln!(
        out,
        "  Since phase: {}",
        format_number(hunt.encounters_since_milestone, sep)
    );
    let _ = writeln!(
        out,
        "  Odds:        {} in {}",
        hunt.base_odds.numerator,
        format_number(hunt.base_odds.denominator, sep)
    );
    let mut modifiers = Vec::new();
    if hunt.modifiers.shiny_charm {
        modifiers.push("shiny charm".to_string());
    }
    if hunt.modifiers.masuda {
        modifiers.push("masuda".to_string());
    }
    if hunt.modifiers.chain_tier > 0 {
        modifiers.push(format!("chain tier {}", hunt.modifiers.chain_tier));
    }
    if !modifiers.is_empty() {
        let _ = writeln!(out, "  Modifiers:   {}", modifiers.join(", "));
    }
    if !hunt.notes.is_empty() {
        let _ = writeln!(out, "  Notes:       {}", hunt.notes);
    }
    let _ = writeln!(out, "  Updated:     {}", format_datetime(hunt.updated_at, settings));

    if hunt.phases.is_empty() {
        let _ = writeln!(out, "  No phases yet");
    } else {
        let _ = writeln!(out, "  Phases:");
        for (i, phase) in hunt.phases.iter().enumerate() {
            let marker = if phase.is_target { " *" } else { "" };
            let _ = writeln!(
                out,
                "    #{} {}{} at {}  ({})",
                i + 1,
                phase.species,
                marker,
                format_number(phase.at_count, sep),
                format_datetime(phase.created_at, settings)
            );
        }
    }
    out
}

/// One line after a counter change, e.g. `Charm hunt: 1,234 (56 since last phase)`.
pub fn counter_line(hunt: &Hunt, settings: &Settings) -> String {
    format!(
        "{}: {} ({} since last phase)\n",
        hunt.name,
        format_number(hunt.count, settings.number_separator),
        format_number(hunt.encounters_since_milestone, settings.number_separator)
    )
}

pub fn integrity_report(report: &IntegrityReport) -> String {
    let mut out = String::new();
    for detail in &report.details {
        let status = match detail.status {
            IntegrityStatus::Valid => "ok",
            IntegrityStatus::InvalidStructure => "invalid structure",
            IntegrityStatus::ParseError => "parse error",
        };
        let _ = write!(out, "  {:<18} {}", status, detail.file);
        if let Some(name) = &detail.hunt {
            let _ = write!(out, "  ({})", name);
        }
        if let Some(error) = &detail.error {
            let _ = write!(out, "  {}", error);
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{} valid, {} corrupted",
        report.valid, report.corrupted
    );
    out
}

pub fn recovery_report(report: &RecoveryReport) -> String {
    let mut out = String::new();
    for (id, outcome) in &report.outcomes {
        let line = match outcome {
            RecoveryOutcome::Promoted => format!("  recovered {} from its temp file", id),
            RecoveryOutcome::RestoredFromSnapshot(name) => {
                format!("  recovered {} from snapshot {}", id, name)
            }
            RecoveryOutcome::Unrecoverable => format!("  could not recover {}", id),
        };
        out.push_str(&line);
        out.push('\n');
    }
    if report.stray_temps_removed > 0 {
        let _ = writeln!(
            out,
            "  removed {} leftover temp file(s)",
            report.stray_temps_removed
        );
    }
    let _ = writeln!(
        out,
        "{} corrupted, {} recovered",
        report.corrupted.len(),
        report.recovered.len()
    );
    out
}
