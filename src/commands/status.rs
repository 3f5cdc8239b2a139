//! Status command - show what a convergence run would do.

use crate::config::Manifest;
use crate::plan::build_providers;
use anyhow::Result;
use colored::Colorize;
use convergence::BoxedProvider;
use serde::Serialize;
use shellkit::ShellRunner;
use std::path::Path;
use std::sync::Arc;

#[derive(Serialize)]
struct StatusRow {
    id: String,
    provider_type: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn plan_rows(providers: &[BoxedProvider]) -> Vec<StatusRow> {
    providers
        .iter()
        .map(|provider| {
            let (action, error) = match convergence::plan(provider.as_ref()) {
                Ok(action) => (Some(action.as_str()), None),
                Err(e) => (None, Some(e.to_string())),
            };
            StatusRow {
                id: provider.id(),
                provider_type: provider.provider_type().to_string(),
                description: provider.description(),
                action,
                error,
            }
        })
        .collect()
}

pub fn run(manifest_path: &Path, json: bool) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let providers = build_providers(&manifest, Arc::new(ShellRunner))?;
    let rows = plan_rows(&providers);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!();
        println!("  {} Nothing declared", "✓".green());
        return Ok(());
    }

    println!();
    let mut changes = 0;
    for row in &rows {
        match (&row.action, &row.error) {
            (Some(action), _) => {
                let symbol = match *action {
                    "create" => "+".green(),
                    "modify" => "~".yellow(),
                    "remove" => "-".red(),
                    _ => "○".dimmed(),
                };
                if *action != "no-op" {
                    changes += 1;
                }
                println!(
                    "  {} {:<18} {:<30} {}",
                    symbol,
                    row.provider_type,
                    row.id,
                    action.dimmed()
                );
            }
            (None, Some(error)) => {
                println!(
                    "  {} {:<18} {:<30} {}",
                    "!".red(),
                    row.provider_type,
                    row.id,
                    error
                );
            }
            (None, None) => {}
        }
    }

    println!();
    if changes == 0 {
        println!("  {} Host matches the declared state", "✓".green());
    } else {
        println!("  {} pending change(s)", changes.to_string().bold());
    }
    Ok(())
}
