//! Apply command - converge the host to the declared state.

use crate::cli::ApplyArgs;
use crate::config::Manifest;
use crate::plan::build_providers;
use anyhow::{bail, Result};
use colored::Colorize;
use convergence::{converge, BoxedProvider, ConvergeAction, ConvergeSummary};
use shellkit::ShellRunner;
use std::path::Path;
use std::sync::Arc;

pub fn run(manifest_path: &Path, args: &ApplyArgs) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    if manifest.is_empty() {
        println!("Nothing declared in {}", manifest_path.display());
        return Ok(());
    }

    let providers = build_providers(&manifest, Arc::new(ShellRunner))?;

    // 1. Plan: ask each provider what it would do
    let pending = display_plan(&providers);
    if pending == 0 {
        println!();
        println!("  {} No changes needed", "✓".green());
        return Ok(());
    }

    if args.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(());
    }

    // 2. Confirm (unless --yes)
    if !args.yes && !confirm_proceed()? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(());
    }

    // 3. Converge sequentially; each provider is one linear attempt
    println!();
    println!("  {} Converging {} resource(s)...", "→".cyan(), providers.len());

    let mut summary = ConvergeSummary::default();
    for provider in &providers {
        let outcome = converge(provider.as_ref());

        let symbol = if !outcome.succeeded() {
            "✗".red()
        } else if outcome.action.is_change() {
            "✓".green()
        } else {
            "○".dimmed()
        };
        print!("    {} {}", symbol, provider.description());
        if let Some(error) = &outcome.error {
            print!("  {}", error.to_string().red());
        }
        println!();

        summary.add_outcome(&outcome);
    }

    print_summary(&summary);

    if !summary.is_success() {
        bail!("{} resource(s) failed to converge", summary.failed);
    }
    Ok(())
}

/// Show the planned actions; returns how many would change the host.
fn display_plan(providers: &[BoxedProvider]) -> usize {
    println!();
    println!("  {}", "Planned changes".bold());

    let mut pending = 0;
    for provider in providers {
        match convergence::plan(provider.as_ref()) {
            Ok(ConvergeAction::NoOp) => {}
            Ok(action) => {
                pending += 1;
                let symbol = match action {
                    ConvergeAction::Create => "+".green(),
                    ConvergeAction::Modify => "~".yellow(),
                    ConvergeAction::Remove => "-".red(),
                    ConvergeAction::NoOp => unreachable!(),
                };
                println!("    {} {}", symbol, provider.description());
            }
            Err(error) => {
                // Shown here, surfaced again by the converge pass.
                pending += 1;
                println!(
                    "    {} {}  {}",
                    "!".red(),
                    provider.description(),
                    error.to_string().red()
                );
            }
        }
    }
    pending
}

fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}

fn print_summary(summary: &ConvergeSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Host converged", "✓".green().bold());
    } else {
        println!("  {} Converged with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} modified", summary.modified);
    }
    if summary.removed > 0 {
        println!("    • {} removed", summary.removed);
    }
    if summary.no_op > 0 {
        println!("    • {} already converged", summary.no_op);
    }
    if summary.failed > 0 {
        println!("    • {} {}", summary.failed, "failed".red());
    }
}
