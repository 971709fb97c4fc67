//! Command execution functions.
//!
//! Each `execute_*` function runs one command against an [`App`] and
//! prints the result in the requested [`OutputMode`].

use anyhow::Result;
use std::io::{self, Write};

use super::args::{CriticalPathArgs, DepAction, DepArgs, GraphArgs, ImpactArgs, InitArgs};
use crate::app::App;
use crate::domain::{BoardId, NewDependency, TaskId, TaskNode};
use crate::output::{self, OutputConfig, OutputMode};
use crate::render::glyph::{bold, dimmed, id, risk, status_icon};
use crate::render::{RenderFormat, RenderOptions, TreeDirection, write_chain};

/// Render options carrying the terminal styling from the environment.
fn terminal_options(format: RenderFormat) -> RenderOptions {
    let mut options = RenderOptions::new(format);
    OutputConfig::from_env().apply(&mut options);
    options
}

fn write_task_line<W: Write>(w: &mut W, task: &TaskNode, options: &RenderOptions) -> io::Result<()> {
    writeln!(
        w,
        "  {} {} {}",
        status_icon(task.status, options),
        id(task.id.as_str(), options),
        task.title
    )
}

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::config;

    let current_dir = std::env::current_dir()?;
    let result = config::init(&current_dir).await?;

    if !args.quiet {
        println!("Initialized tasklane in {}", result.tasklane_dir.display());
        println!("  Config: {}", result.config_file.display());
        println!("  Tasks:  {}", result.data_file.display());
    }

    Ok(())
}

/// Execute the critical-path command
pub async fn execute_critical_path(
    app: &App,
    args: &CriticalPathArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let board = args
        .board
        .as_deref()
        .map(BoardId::new)
        .or_else(|| app.config().board.clone());
    let path = app.engine().critical_path(board.as_ref()).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&path)?,
        OutputMode::Text => {
            let options = terminal_options(RenderFormat::Ascii);
            let stdout = io::stdout();
            let mut w = stdout.lock();

            write_chain(&mut w, &path, &options)?;

            if !path.starting_tasks.is_empty() {
                writeln!(w)?;
                writeln!(w, "{}", bold("Ready to start:", &options))?;
                for task in &path.starting_tasks {
                    write_task_line(&mut w, task, &options)?;
                }
            }

            if !path.bottlenecks.is_empty() {
                writeln!(w)?;
                writeln!(w, "{}", bold("Bottlenecks:", &options))?;
                for bottleneck in &path.bottlenecks {
                    writeln!(
                        w,
                        "  {} {} {}",
                        id(bottleneck.task.id.as_str(), &options),
                        bottleneck.task.title,
                        dimmed(
                            &format!(
                                "({} dependents, score {})",
                                bottleneck.dependent_count, bottleneck.score
                            ),
                            &options
                        )
                    )?;
                }
            }
        }
    }

    Ok(())
}

/// Execute the impact command
pub async fn execute_impact(app: &App, args: &ImpactArgs, output_mode: OutputMode) -> Result<()> {
    let impact = app.engine().impact(&TaskId::new(&args.task)).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&impact)?,
        OutputMode::Text => {
            let options = terminal_options(RenderFormat::Tree);
            let stdout = io::stdout();
            let mut w = stdout.lock();

            writeln!(
                w,
                "{} {} {}: {} risk",
                bold("Impact of", &options),
                id(impact.task.id.as_str(), &options),
                impact.task.title,
                risk(impact.risk_level, &options)
            )?;
            writeln!(
                w,
                "  {} dependent task(s), {} would be blocked, depth {}",
                impact.total_impact, impact.would_block_count, impact.max_depth
            )?;

            for (label, tasks) in [
                ("Direct dependents:", &impact.direct_dependents),
                ("Indirect dependents:", &impact.indirect_dependents),
            ] {
                if tasks.is_empty() {
                    continue;
                }
                writeln!(w)?;
                writeln!(w, "{}", bold(label, &options))?;
                for task in tasks {
                    write_task_line(&mut w, task, &options)?;
                }
            }
        }
    }

    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    let defaults = &app.config().render;
    let format = args.format.map_or(defaults.format, Into::into);

    let mut options = terminal_options(format);
    options.show_task_details = args.details || defaults.show_task_details;
    options.board = args
        .board
        .as_deref()
        .map(BoardId::new)
        .or_else(|| app.config().board.clone());
    options.root = args.root.as_deref().map(TaskId::new);
    options.direction = if args.upstream {
        TreeDirection::Dependencies
    } else {
        TreeDirection::Dependents
    };
    if output_mode == OutputMode::Json {
        options.use_colors = false;
    }

    let text = app.engine().visualize(&options).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "format": format,
            "board": options.board,
            "output": text,
        }))?,
        OutputMode::Text => print!("{text}"),
    }

    Ok(())
}

/// Execute the dep command
pub async fn execute_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        DepAction::Add {
            task,
            depends_on,
            dep_type,
        } => {
            let edge = app
                .engine()
                .add_dependency(NewDependency::new(
                    task.as_str(),
                    depends_on.as_str(),
                    (*dep_type).into(),
                ))
                .await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "action": "add",
                    "dependency": edge,
                    "status": "success"
                }))?,
                OutputMode::Text => {
                    println!("Added dependency: {task} --[{dep_type}]--> {depends_on}");
                }
            }
        }
        DepAction::Remove { task, depends_on } => {
            let edge = app
                .engine()
                .remove_dependency(&TaskId::new(task), &TaskId::new(depends_on))
                .await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "action": "remove",
                    "dependency": edge,
                    "status": "success"
                }))?,
                OutputMode::Text => {
                    println!(
                        "Removed dependency: {task} --[{}]--> {depends_on}",
                        edge.dep_type
                    );
                }
            }
        }
    }

    Ok(())
}
