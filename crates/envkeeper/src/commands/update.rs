//! Update command

use anyhow::Result;
use camino::Utf8Path;
use dialoguer::Confirm;
use envkeeper_environment::{PlatformUpdate, PluginOutcome, UpdateOptions, UpdateOutcome};
use envkeeper_plugins::PluginAction;

use crate::cli::UpdateArgs;
use crate::commands::open_environment;
use crate::output::{self, DownloadBar};

pub async fn run(args: UpdateArgs, dir: Option<&Utf8Path>) -> Result<()> {
    let env = open_environment(dir)?;

    if !args.dry_run && !args.yes {
        let report = env.status().await?;
        if report.is_up_to_date() {
            output::success("Environment is up to date");
            return Ok(());
        }

        output::header("Pending changes");
        for item in report.drifted() {
            output::status_item(item);
        }

        let confirmed = Confirm::new()
            .with_prompt("Bring the environment in line with environment.json?")
            .default(false)
            .interact()?;

        if !confirmed {
            output::info("Cancelled");
            return Ok(());
        }
    }

    let mut bar = DownloadBar::new("Downloading platform", args.dry_run);
    let outcome = env
        .update(UpdateOptions { dry_run: args.dry_run }, |p| bar.update(p))
        .await;
    bar.finish();
    let outcome = outcome?;

    print_outcome(&outcome);

    if outcome.has_failures() {
        anyhow::bail!("One or more plugins could not be updated");
    }
    Ok(())
}

fn print_outcome(outcome: &UpdateOutcome) {
    let would = |done: &str, pending: &str| -> String {
        if outcome.dry_run {
            pending.to_string()
        } else {
            done.to_string()
        }
    };

    output::header("Platform");
    match &outcome.platform {
        PlatformUpdate::Manual => output::info("Managed manually; skipped"),
        PlatformUpdate::UpToDate => output::success("Up to date"),
        PlatformUpdate::Installed {
            version,
            reason,
            removal,
            files,
        } => {
            output::kv("Reason", &format!("Platform {}", reason));
            output::removal_report(removal);
            if outcome.dry_run {
                output::info(&format!("Would install {}", version));
            } else {
                output::success(&format!("Installed {} ({} files)", version, files));
            }
        }
    }

    if outcome.plugins.is_empty() {
        return;
    }

    output::header("Plugins");
    for plugin in &outcome.plugins {
        let path = plugin.path();
        match plugin {
            PluginOutcome::Failed { error, .. } => output::error(&format!("{}: {}", path, error)),
            PluginOutcome::Done { action, .. } => match action {
                PluginAction::Cloned { url } => output::success(&format!(
                    "{}: {} {}",
                    path,
                    would("cloned from", "would clone from"),
                    url
                )),
                PluginAction::BranchSwitched { from, to } => output::success(&format!(
                    "{}: {} {} to {}",
                    path,
                    would("switched", "would switch"),
                    from.as_deref().unwrap_or("detached HEAD"),
                    to
                )),
                PluginAction::Unchanged => output::success(&format!("{}: up to date", path)),
                PluginAction::SkippedMissingUrl => {
                    output::warning(&format!("{}: missing and has no url; skipped", path))
                }
                PluginAction::SkippedNotRepository => {
                    output::warning(&format!("{}: not a git repository; skipped", path))
                }
                PluginAction::SkippedDirty => output::warning(&format!(
                    "{}: uncommitted changes on the wrong branch; skipped",
                    path
                )),
            },
        }
    }
}
