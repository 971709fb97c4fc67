//! Critical path as a connector chain.

use super::glyph::{bold, dimmed, id, status_icon};
use super::{RenderOptions, format_hours, write_details};
use crate::analysis::CriticalPath;
use std::io::{self, Write};

/// Write the critical path, one task per line, with a summary header.
///
/// ```text
/// Critical path: 3 tasks, 9h
/// ├─ ○ A Design (2h)
/// │
/// ├─ ○ B Build (3h)
/// │
/// └─ ○ C Test (4h)
/// ```
pub fn write_chain<W: Write>(
    w: &mut W,
    path: &CriticalPath,
    options: &RenderOptions,
) -> io::Result<()> {
    if path.is_empty() {
        return writeln!(
            w,
            "{}",
            bold("Critical path: none (no blocking dependencies)", options)
        );
    }

    let header = format!(
        "Critical path: {} task{}, {}",
        path.tasks.len(),
        if path.tasks.len() == 1 { "" } else { "s" },
        format_hours(path.total_duration)
    );
    writeln!(w, "{}", bold(&header, options))?;

    let (branch, corner, pipe) = if options.use_ascii {
        ("|-", "`-", "|")
    } else {
        ("├─", "└─", "│")
    };

    let last = path.tasks.len() - 1;
    for (i, task) in path.tasks.iter().enumerate() {
        if i > 0 {
            writeln!(w, "{}", dimmed(pipe, options))?;
        }
        let connector = if i == last { corner } else { branch };
        write!(
            w,
            "{} {} {} {}",
            dimmed(connector, options),
            status_icon(task.status, options),
            id(task.id.as_str(), options),
            task.title
        )?;
        if options.show_task_details {
            write_details(w, task, options)?;
        } else {
            write!(w, " ({})", format_hours(task.weight()))?;
        }
        writeln!(w)?;
    }
    Ok(())
}
