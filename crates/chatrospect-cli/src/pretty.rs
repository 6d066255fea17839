//! Pretty terminal output for chatrospect reports.

use chatrospect_core::models::WordCount;
use chatrospect_core::{AnalysisReport, GhostingEnd, GhostingEvent, Role, SubjectiveAnnotation};
use chrono::{DateTime, Utc};
use console::{Style, Term, style};

const BAR_WIDTH: usize = 20;

/// Terminal width for formatting, with fallback.
fn term_width() -> usize {
    usize::from(Term::stdout().size().1)
}

fn role_style(role: Role) -> Style {
    match role {
        Role::Primary => Style::new().cyan().bold(),
        Role::Secondary => Style::new().green().bold(),
    }
}

/// Human-readable latency, e.g. "45s", "3m 20s", "2h 5m", "1d 4h".
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_latency(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (days, hours, minutes, secs) = (
        total / 86_400,
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60,
    );
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Share of `part` in `total` as a fixed-width bar.
fn share_bar(part: usize, total: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (part * BAR_WIDTH / total).min(BAR_WIDTH)
    };
    "█".repeat(filled) + &"░".repeat(BAR_WIDTH - filled)
}

fn format_words(words: &[WordCount]) -> String {
    if words.is_empty() {
        return "-".to_string();
    }
    words
        .iter()
        .map(|w| format!("{} ({})", w.word, w.count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_end(end: &GhostingEnd) -> String {
    match end {
        GhostingEnd::At(at) => format_date(*at),
        GhostingEnd::Ongoing => "ongoing".to_string(),
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Print the report for a terminal.
pub fn print_report(report: &AnalysisReport) {
    let width = term_width().clamp(40, 100);
    let double_sep = "═".repeat(width);
    let separator = "─".repeat(width);
    let metrics = &report.metrics;

    println!("{}", style(&double_sep).dim());
    println!("{}", style(" Chat report").bold().white());
    println!("{}", style(&double_sep).dim());

    if report.participants.is_empty() {
        println!("{}", style("No messages found.").dim());
        return;
    }

    let total = metrics.total_messages.primary + metrics.total_messages.secondary;
    for role in [Role::Primary, Role::Secondary] {
        let Some(label) = report.participants.label(role) else {
            continue;
        };
        let count = *metrics.total_messages.get(role);
        println!();
        println!(" {} {}", role_style(role).apply_to(label), style(role).dim());
        println!(
            "   messages  {} {count}",
            style(share_bar(count, total)).yellow()
        );
        println!(
            "   replies   {}",
            format_latency(*metrics.average_response_time.get(role))
        );
        println!(
            "   words     {}",
            format_words(metrics.frequent_words.get(role))
        );
        let emojis = metrics.frequent_emojis.get(role);
        println!(
            "   emojis    {}",
            if emojis.is_empty() {
                "-".to_string()
            } else {
                emojis.join(" ")
            }
        );
    }

    println!();
    println!("{}", style(&separator).dim());
    print_ghosting(report, &metrics.ghosting_events);

    if let Some(annotations) = &report.annotations {
        println!("{}", style(&separator).dim());
        print_annotations(report, annotations);
    }
    println!("{}", style(&double_sep).dim());
}

fn print_ghosting(report: &AnalysisReport, events: &[GhostingEvent]) {
    if events.is_empty() {
        println!(" {}", style("No ghosting detected.").dim());
        return;
    }
    println!(" {}", style(format!("Ghosting ({})", events.len())).bold());
    for event in events {
        let silent = report
            .participants
            .label(event.silent_role)
            .unwrap_or("?");
        println!(
            "   {} went quiet {} -> {} ({:.1} days)",
            role_style(event.silent_role).apply_to(silent),
            format_date(event.start_timestamp),
            format_end(&event.end_timestamp),
            event.duration_days
        );
    }
}

fn print_annotations(report: &AnalysisReport, annotations: &SubjectiveAnnotation) {
    println!(" {}", style("Annotations").bold());
    for role in [Role::Primary, Role::Secondary] {
        let label = report.participants.label(role).unwrap_or("?");
        println!(
            "   {}: sentiment {}, compliments {}, interest {:.0}",
            role_style(role).apply_to(label),
            annotations.overall_sentiment.get(role),
            annotations.compliment_count.get(role),
            annotations.interest_level.get(role)
        );
    }
    if let Some(summary) = &annotations.relationship_summary {
        println!("   {}", style(summary).italic());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(0.0), "0s");
        assert_eq!(format_latency(45.4), "45s");
        assert_eq!(format_latency(200.0), "3m 20s");
        assert_eq!(format_latency(7_500.0), "2h 5m");
        assert_eq!(format_latency(100_800.0), "1d 4h");
        assert_eq!(format_latency(-5.0), "0s");
    }

    #[test]
    fn test_share_bar() {
        let bar = share_bar(1, 4);
        assert_eq!(bar.chars().count(), BAR_WIDTH);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 5);
        assert_eq!(share_bar(0, 0), "░".repeat(BAR_WIDTH));
    }

    #[test]
    fn test_format_words() {
        let words = vec![WordCount {
            word: "pizza".to_string(),
            count: 2,
        }];
        assert_eq!(format_words(&words), "pizza (2)");
        assert_eq!(format_words(&[]), "-");
    }

    #[test]
    fn test_format_end() {
        assert_eq!(format_end(&GhostingEnd::Ongoing), "ongoing");
    }
}
