//! Status glyphs and color helpers.
//!
//! Semantic colors:
//!   - done:        green
//!   - in progress: yellow
//!   - blocked:     red (also overdue flags)
//!   - archived:    dimmed
//!   - task ids:    cyan
//!   - headers:     bold

use super::RenderOptions;
use crate::analysis::RiskLevel;
use crate::domain::TaskStatus;
use colored::Colorize;

/// Status glyph, with ASCII fallback.
pub(crate) fn status_icon(status: TaskStatus, options: &RenderOptions) -> String {
    let icon = if options.use_ascii {
        match status {
            TaskStatus::Todo => "o",
            TaskStatus::InProgress => ">",
            TaskStatus::Done => "+",
            TaskStatus::Blocked => "x",
            TaskStatus::Archived => "-",
        }
    } else {
        match status {
            TaskStatus::Todo => "○",
            TaskStatus::InProgress => "▶",
            TaskStatus::Done => "✓",
            TaskStatus::Blocked => "✗",
            TaskStatus::Archived => "▪",
        }
    };
    paint_status(icon, status, options)
}

/// Status name colored like its glyph.
pub(crate) fn status_text(status: TaskStatus, options: &RenderOptions) -> String {
    paint_status(&status.to_string(), status, options)
}

fn paint_status(text: &str, status: TaskStatus, options: &RenderOptions) -> String {
    if !options.use_colors {
        return text.to_string();
    }
    match status {
        TaskStatus::Todo => text.white().to_string(),
        TaskStatus::InProgress => text.yellow().to_string(),
        TaskStatus::Done => text.green().to_string(),
        TaskStatus::Blocked => text.red().to_string(),
        TaskStatus::Archived => text.dimmed().to_string(),
    }
}

/// Task id (cyan).
pub(crate) fn id(text: &str, options: &RenderOptions) -> String {
    if !options.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Connectors and secondary labels.
pub(crate) fn dimmed(text: &str, options: &RenderOptions) -> String {
    if !options.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Section headers.
pub(crate) fn bold(text: &str, options: &RenderOptions) -> String {
    if !options.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

pub(crate) fn overdue(text: &str, options: &RenderOptions) -> String {
    if !options.use_colors {
        return text.to_string();
    }
    text.red().bold().to_string()
}

/// Risk class: high red, medium yellow, low green.
pub(crate) fn risk(level: RiskLevel, options: &RenderOptions) -> String {
    let text = level.to_string();
    if !options.use_colors {
        return text;
    }
    match level {
        RiskLevel::High => text.red().bold().to_string(),
        RiskLevel::Medium => text.yellow().to_string(),
        RiskLevel::Low => text.green().to_string(),
    }
}

/// Marker for tasks pulled in from another board.
pub(crate) fn placeholder_marker(options: &RenderOptions) -> String {
    dimmed("(other board)", options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TaskStatus::Todo, "○", "o")]
    #[case(TaskStatus::InProgress, "▶", ">")]
    #[case(TaskStatus::Done, "✓", "+")]
    #[case(TaskStatus::Blocked, "✗", "x")]
    #[case(TaskStatus::Archived, "▪", "-")]
    fn test_status_icons(#[case] status: TaskStatus, #[case] unicode: &str, #[case] ascii: &str) {
        let mut options = RenderOptions::default();
        assert_eq!(status_icon(status, &options), unicode);

        options.use_ascii = true;
        assert_eq!(status_icon(status, &options), ascii);
    }

    #[test]
    fn test_no_colors_leaves_text_alone() {
        let options = RenderOptions::default();
        assert_eq!(id("t-1", &options), "t-1");
        assert_eq!(bold("Header", &options), "Header");
        assert_eq!(status_text(TaskStatus::InProgress, &options), "in_progress");
    }
}
