//! Clean command

use anyhow::Result;
use camino::Utf8Path;
use dialoguer::Confirm;

use crate::cli::CleanArgs;
use crate::commands::open_environment;
use crate::output;

pub fn run(args: CleanArgs, dir: Option<&Utf8Path>) -> Result<()> {
    let env = open_environment(dir)?;
    let root = env.platform_root();

    if !args.dry_run && !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove the platform installed in {}?", root))
            .default(false)
            .interact()?;

        if !confirmed {
            output::info("Cancelled");
            return Ok(());
        }
    }

    match env.clean(args.dry_run)? {
        None => output::info(&format!("No installation manifest in {}; nothing to clean", root)),
        Some(report) => {
            output::removal_report(&report);
            if args.dry_run {
                output::info(&format!(
                    "Dry run: {} path(s) would be removed",
                    report.removed_count()
                ));
            } else {
                output::success(&format!("Removed {} path(s)", report.removed_count()));
            }
        }
    }

    Ok(())
}
