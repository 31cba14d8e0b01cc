//! Status command

use anyhow::Result;
use camino::Utf8Path;

use crate::cli::StatusArgs;
use crate::commands::open_environment;
use crate::output;

pub async fn run(args: StatusArgs, dir: Option<&Utf8Path>) -> Result<()> {
    let env = open_environment(dir)?;
    let report = env.status().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::header(&format!("Environment {}", env.root()));
        for item in report.items() {
            output::status_item(item);
        }
        println!();

        let drifted = report.drifted().count();
        if drifted == 0 {
            output::success("Environment is up to date");
        } else {
            output::warning(&format!(
                "{} item(s) out of date; run 'envkeeper update'",
                drifted
            ));
        }
    }

    if !report.is_up_to_date() {
        std::process::exit(1);
    }

    Ok(())
}
