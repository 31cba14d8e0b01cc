//! Plugin commands

use anyhow::Result;
use camino::Utf8Path;
use envkeeper_core::types::PluginEntry;
use envkeeper_environment::{Environment, PluginChange, RemovePluginOptions};
use serde::Serialize;

use crate::cli::{
    PluginAddArgs, PluginCommands, PluginListArgs, PluginRemoveArgs, PluginSetArgs,
};
use crate::commands::open_environment;
use crate::output;

pub async fn run(cmd: PluginCommands, dir: Option<&Utf8Path>) -> Result<()> {
    let mut env = open_environment(dir)?;

    match cmd {
        PluginCommands::Add(args) => add(&mut env, args),
        PluginCommands::Set(args) => set(&mut env, args),
        PluginCommands::Remove(args) => remove(&mut env, args).await,
        PluginCommands::List(args) => list(&env, args),
    }
}

fn add(env: &mut Environment, args: PluginAddArgs) -> Result<()> {
    let mut entry = PluginEntry::new(&args.path);
    if let Some(url) = args.url {
        entry = entry.with_url(url);
    }
    if let Some(branch) = args.branch {
        entry = entry.with_branch(branch);
    }

    let path = entry.path.clone();
    env.add_plugin(entry)?;
    env.save()?;

    output::success(&format!("Added plugin '{}'", path));
    output::info("Run 'envkeeper update' to clone it");
    Ok(())
}

fn set(env: &mut Environment, args: PluginSetArgs) -> Result<()> {
    let branch = if args.clear_branch {
        Some(None)
    } else {
        args.branch.map(Some)
    };

    if args.url.is_none() && branch.is_none() {
        anyhow::bail!("Nothing to change; pass --url, --branch or --clear-branch");
    }

    let entry = env
        .update_plugin(&args.path, PluginChange { url: args.url, branch })?
        .clone();

    if env.save()? {
        output::success(&format!("Updated plugin '{}'", entry.path));
    } else {
        output::info(&format!("Plugin '{}' already matches", entry.path));
    }
    print_entry(&entry);
    Ok(())
}

async fn remove(env: &mut Environment, args: PluginRemoveArgs) -> Result<()> {
    let options = RemovePluginOptions {
        delete: args.delete,
        force: args.force,
        dry_run: args.dry_run,
    };

    let entry = env.remove_plugin(&args.path, options).await?;

    if args.dry_run {
        output::info(&format!("Dry run: would remove plugin '{}'", entry.path));
        if args.delete {
            output::info(&format!("Dry run: would delete {}", env.root().join(&entry.path)));
        }
        return Ok(());
    }

    env.save()?;
    output::success(&format!("Removed plugin '{}'", entry.path));
    if args.delete {
        output::success(&format!("Deleted {}", env.root().join(&entry.path)));
    }
    Ok(())
}

#[derive(Serialize)]
struct PluginRow<'a> {
    path: &'a str,
    url: Option<&'a str>,
    branch: Option<&'a str>,
}

fn list(env: &Environment, args: PluginListArgs) -> Result<()> {
    let plugins = &env.descriptor().plugins;

    if args.json {
        let rows: Vec<PluginRow<'_>> = plugins
            .iter()
            .map(|p| PluginRow {
                path: &p.path,
                url: p.remote_url(),
                branch: p.required_branch(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if plugins.is_empty() {
        output::info("No plugins declared");
        return Ok(());
    }

    output::header(&format!("Plugins ({})", plugins.len()));
    for entry in plugins {
        println!("  {}", entry.path);
        print_entry(entry);
    }
    Ok(())
}

fn print_entry(entry: &PluginEntry) {
    output::kv("url", entry.remote_url().unwrap_or("-"));
    output::kv("branch", entry.required_branch().unwrap_or("-"));
}
