// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Vigil main entry point - CLI argument handling and operation selection.

use clap::Parser;
use colored::Colorize;

use vigil::config;
use vigil::ops::{Engine, OpsOptions};

/// Vigil - AI cross-check orchestrator.
#[derive(Parser)]
#[command(name = "vigil")]
#[command(author, version, about = "Cross-check AI agents against your codebase", long_about = None)]
struct Cli {
    /// Question to analyze against the project
    question: Option<String>,

    /// Propose performance-oriented refactorings
    #[arg(short = 'r', long)]
    refactor: bool,

    /// Recommend architecture, feature, and stack improvements
    #[arg(short = 'R', long)]
    recommend: bool,

    /// Review UI/UX of a React or Next.js project
    #[arg(short = 'u', long = "ui-ux")]
    ui_ux: bool,

    /// Write an implementation plan for a task (prompts if omitted)
    #[arg(short = 'p', long, num_args = 0..=1, default_missing_value = "")]
    plan: Option<String>,

    /// Design a new project from an idea (prompts if omitted)
    #[arg(short = 'n', long = "new", num_args = 0..=1, default_missing_value = "")]
    new: Option<String>,

    /// Show agent availability, project info, and statistics
    #[arg(long)]
    usage: bool,

    /// Write a default vigil.json and exit
    #[arg(long)]
    init: bool,

    /// Extract code changes from the answer and apply them
    #[arg(short = 'a', long)]
    apply: bool,

    /// Skip per-change review; one confirmation applies everything
    #[arg(short = 'y', long)]
    yes: bool,

    /// Call the primary agent alone instead of fanning out
    #[arg(long, env = "VIGIL_SEQUENTIAL")]
    sequential: bool,

    /// Carry conversation context across invocations
    #[arg(short = 's', long, env = "VIGIL_SESSION")]
    session: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        if std::env::var("VIGIL_DEBUG").is_ok() {
            eprintln!("{:?}", e);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let project_root = std::env::current_dir()?;

    if cli.init {
        let path = config::init_config(&project_root)?;
        println!("{} wrote {}", "✓".green(), path.display());
        return Ok(());
    }

    let options = OpsOptions {
        apply: cli.apply,
        yes: cli.yes,
        sequential: cli.sequential,
        session: cli.session,
    };
    let mut engine = Engine::new(project_root, options);

    if cli.refactor {
        engine.refactor().await
    } else if cli.recommend {
        engine.recommend().await
    } else if cli.ui_ux {
        engine.ui_ux().await
    } else if let Some(task) = cli.plan {
        let task = if task.is_empty() {
            read_line("Describe the task to plan:")?
        } else {
            task
        };
        engine.plan(&task).await
    } else if let Some(idea) = cli.new {
        let idea = if idea.is_empty() {
            read_line("Describe the project idea:")?
        } else {
            idea
        };
        engine.new_project(&idea).await
    } else if cli.usage {
        engine.usage();
        Ok(())
    } else if let Some(question) = cli.question {
        engine.analyze(&question).await
    } else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        Ok(())
    }
}

/// Ask interactively when `--plan` or `--new` was given bare.
fn read_line(question: &str) -> anyhow::Result<String> {
    use std::io::Write;
    print!("{} ", question.cyan());
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let answer = line.trim().to_string();
    if answer.is_empty() {
        anyhow::bail!("nothing given");
    }
    Ok(answer)
}

fn init_tracing() {
    // Only initialize verbose logging when asked for
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt::init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .init();
    }
}
