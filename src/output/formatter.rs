use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::grading::{FinalExamResult, GoalProjection, WeightFormat};
use crate::saved::{CalculationData, SavedCalculation};
use crate::worksheet::GradeReport;

const GRADE_WIDTH: usize = 5;
const WEIGHT_WIDTH: usize = 8;
const MIN_LABEL_WIDTH: usize = 12;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, accounting for Unicode
fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Width of the label column: the longest label, capped by the terminal width.
fn label_column_width(labels: &[&str], term_width: Option<usize>) -> usize {
    let longest = labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_LABEL_WIDTH);

    match term_width {
        Some(width) => {
            let available = width.saturating_sub(GRADE_WIDTH + WEIGHT_WIDTH + 4);
            longest.min(available.max(MIN_LABEL_WIDTH))
        }
        None => longest,
    }
}

fn format_weight(token: &str, weight_format: WeightFormat) -> String {
    match weight_format {
        WeightFormat::Percentage => format!("{}%", token.trim()),
        WeightFormat::Points => token.trim().to_string(),
    }
}

/// Format an aggregation as a headline plus a table of contributing rows
///
/// ```text
/// B (86.1)
///
/// Assignment    Grade    Weight
/// Homework 1        A        5%
/// Final Average     B      86.1
/// ```
pub fn format_grade_report(report: &GradeReport, use_colors: bool) -> String {
    let result = &report.result;
    let weight_format = report.grading.weight_format;
    let term_width = get_terminal_width();

    let mut labels: Vec<&str> = result
        .entries
        .iter()
        .map(|e| {
            if e.label.trim().is_empty() {
                "-"
            } else {
                e.label.trim()
            }
        })
        .collect();
    labels.push("Final Average");
    let label_width = label_column_width(&labels, term_width);

    let mut lines = Vec::new();

    let headline = format!("{} ({:.1})", result.letter, result.average);
    lines.push(if use_colors {
        headline.bold().to_string()
    } else {
        headline
    });
    lines.push(String::new());

    let header = format!(
        "{:<lw$}  {:>gw$}  {:>ww$}",
        "Assignment",
        "Grade",
        "Weight",
        lw = label_width,
        gw = GRADE_WIDTH,
        ww = WEIGHT_WIDTH
    );
    lines.push(if use_colors {
        header.dimmed().to_string()
    } else {
        header
    });

    for (entry, label) in result.entries.iter().zip(labels.iter()) {
        lines.push(format!(
            "{:<lw$}  {:>gw$}  {:>ww$}",
            truncate_label(label, label_width),
            entry.grade.trim(),
            format_weight(&entry.weight, weight_format),
            lw = label_width,
            gw = GRADE_WIDTH,
            ww = WEIGHT_WIDTH
        ));
    }

    let total = format!(
        "{:<lw$}  {:>gw$}  {:>ww$}",
        "Final Average",
        result.letter.as_str(),
        format!("{:.1}", result.average),
        lw = label_width,
        gw = GRADE_WIDTH,
        ww = WEIGHT_WIDTH
    );
    lines.push(if use_colors {
        total.green().bold().to_string()
    } else {
        total
    });

    if let Some(ref projection) = report.projection {
        lines.push(String::new());
        lines.push(format_projection(projection, use_colors));
    }

    lines.join("\n")
}

/// Describe the score needed on remaining work. Unattainable goals read as a warning.
pub fn format_projection(projection: &GoalProjection, use_colors: bool) -> String {
    if projection.unattainable {
        let msg = format!(
            "Warning: to reach {:.1} you would need {:.1} on the remaining {} weight, which is not possible.",
            projection.goal, projection.required, projection.remaining_weight
        );
        if use_colors {
            msg.yellow().to_string()
        } else {
            msg
        }
    } else {
        format!(
            "To reach {:.1} you need {:.1} on the remaining {} weight.",
            projection.goal, projection.required, projection.remaining_weight
        )
    }
}

/// Format the required final exam score with any advisory
pub fn format_final_result(result: &FinalExamResult, use_colors: bool) -> String {
    let headline = format!("Required on final: {:.1}", result.required);
    let headline = if use_colors {
        headline.bold().to_string()
    } else {
        headline
    };

    let mut lines = vec![
        headline,
        format!(
            "  Current {} -> desired {} with the final worth {}%",
            result.query.current, result.query.desired, result.query.final_weight
        ),
    ];

    if result.exceeds_maximum {
        let note = "  Note: this exceeds the maximum of 100.";
        lines.push(if use_colors {
            note.yellow().to_string()
        } else {
            note.to_string()
        });
    } else if result.already_secured {
        let note = "  Note: the desired grade is reached even with 0 on the final.";
        lines.push(if use_colors {
            note.green().to_string()
        } else {
            note.to_string()
        });
    }

    lines.join("\n")
}

/// Format saved calculations as one numbered line each
/// Columns: index, type, name, summary, created date
pub fn format_saved_list(calcs: &[SavedCalculation], use_colors: bool) -> String {
    if calcs.is_empty() {
        return "No saved calculations.".to_string();
    }

    calcs
        .iter()
        .enumerate()
        .map(|(idx, calc)| {
            let index_str = format!("{:>3}.", idx + 1);
            let kind = format!("{:<5}", calc.data.kind());
            let date = calc.created_at.format("%Y-%m-%d %H:%M").to_string();
            if use_colors {
                format!(
                    "{} {}  {}  {}  {}",
                    index_str.dimmed(),
                    kind.cyan(),
                    calc.name.bold(),
                    calc.data.summary(),
                    date.dimmed()
                )
            } else {
                format!(
                    "{} {}  {}  {}  {}",
                    index_str,
                    kind,
                    calc.name,
                    calc.data.summary(),
                    date
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one saved calculation in full
pub fn format_saved_detail(calc: &SavedCalculation, use_colors: bool) -> String {
    let mut out = format!(
        "{}\n  Type: {}\n  Saved: {}\n  Id: {}",
        calc.name,
        calc.data.kind(),
        calc.created_at.format("%Y-%m-%d %H:%M UTC"),
        calc.id
    );
    if !calc.description.is_empty() {
        out.push_str(&format!("\n  Description: {}", calc.description));
    }
    out.push_str("\n\n");

    match &calc.data {
        CalculationData::Grade(report) => {
            out.push_str(&format_grade_report(report, use_colors))
        }
        CalculationData::Final(result) => out.push_str(&format_final_result(result, use_colors)),
    }
    out
}
