//! # CLI Layer
//!
//! The CLI layer is the **only** place in the workspace that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Decides where log records go
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Logging**: install `env_logger`; `-v`/`-vv` raise the default level,
//!    `RUST_LOG` overrides it.
//! 2. **Context Setup**: load the engine config, apply `--data`, run startup
//!    (which includes crash recovery).
//! 3. **Dispatch**: route each subcommand to the API facade.
//! 4. **Output**: text via `render.rs`, or JSON with `--json`.

use super::render;
use super::setup::{Cli, Commands, CreateArgs};
use anyhow::{bail, Context, Result};
use clap::Parser;
use huntapp::config::EngineConfig;
use huntapp::init::{initialize, HuntContext};
use huntapp::model::{Hunt, HuntUpdate, Modifiers, NewHunt, Odds};
use huntapp::settings::Settings;
use log::LevelFilter;
use serde::Serialize;
use std::path::Path;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = create_context(&cli)?;
    let command = cli.command.unwrap_or(Commands::List { all: false });
    dispatch(&ctx, command, cli.json)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let env = env_logger::Env::default().default_filter_or(level.as_str());
    // Ignore a second initialization; the first logger stays in place.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn create_context(cli: &Cli) -> Result<HuntContext> {
    let mut config = EngineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(data) = &cli.data {
        config.data_dir = Some(data.clone());
    }
    initialize(config).context("opening the data directory")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn dispatch(ctx: &HuntContext, command: Commands, json: bool) -> Result<()> {
    let api = &ctx.api;
    let settings = api.settings();

    match command {
        Commands::Create(args) => {
            let hunt = api.create_hunt(new_hunt(args)?)?;
            if json {
                return print_json(&hunt);
            }
            println!("Created {} ({})", hunt.name, hunt.id);
        }

        Commands::List { all } => {
            // Positions are taken before filtering so they stay valid selectors.
            let rows: Vec<(usize, Hunt)> = api
                .list_hunts()
                .into_iter()
                .enumerate()
                .map(|(i, h)| (i + 1, h))
                .filter(|(_, h)| all || !h.archived)
                .collect();
            if json {
                let hunts: Vec<&Hunt> = rows.iter().map(|(_, h)| h).collect();
                return print_json(&hunts);
            }
            print!("{}", render::hunt_list(&rows, &settings));
        }

        Commands::Show { hunt } => {
            let hunt = api.get_hunt(&hunt)?;
            if json {
                return print_json(&hunt);
            }
            print!("{}", render::hunt_detail(&hunt, &settings));
        }

        Commands::Inc { hunt, times } => {
            let id = api.resolve(&hunt)?;
            let mut latest = api.get_hunt(&id)?;
            for _ in 0..times {
                latest = api.increment(&id)?;
            }
            counter_output(&latest, &settings, json)?;
        }

        Commands::Dec { hunt } => {
            let hunt = api.decrement(&hunt)?;
            counter_output(&hunt, &settings, json)?;
        }

        Commands::Set { hunt, value } => {
            let hunt = api.set_count(&hunt, value)?;
            counter_output(&hunt, &settings, json)?;
        }

        Commands::Phase {
            hunt,
            species,
            target,
            notes,
        } => {
            let hunt = api.add_phase(&hunt, &species, target, notes)?;
            if json {
                return print_json(&hunt);
            }
            println!(
                "Phase #{} recorded for {}: {} at {}",
                hunt.phases.len(),
                hunt.name,
                species,
                hunt.count
            );
        }

        Commands::Unphase { hunt, phase } => {
            let before = api.get_hunt(&hunt)?;
            let after = api.remove_phase(&before.id, &phase)?;
            if json {
                return print_json(&after);
            }
            if after.phases.len() == before.phases.len() {
                println!("No phase {} in {}", phase, after.name);
            } else {
                print!("{}", render::counter_line(&after, &settings));
            }
        }

        Commands::Rename { hunt, name } => {
            let hunt = api.update_hunt(&hunt, vec![HuntUpdate::Name(name)])?;
            if json {
                return print_json(&hunt);
            }
            println!("Renamed {} to {}", hunt.id, hunt.name);
        }

        Commands::Archive { hunt, undo } => {
            let hunt = api.update_hunt(&hunt, vec![HuntUpdate::Archived(!undo)])?;
            if json {
                return print_json(&hunt);
            }
            let state = if hunt.archived { "Archived" } else { "Unarchived" };
            println!("{} {}", state, hunt.name);
        }

        Commands::Delete { hunt } => {
            let id = api.delete_hunt(&hunt)?;
            if json {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("Deleted {}", id);
        }

        Commands::Check => {
            let report = api.check_integrity();
            if json {
                print_json(&report)?;
            } else {
                print!("{}", render::integrity_report(&report));
            }
            if report.corrupted > 0 {
                bail!("{} record(s) failed the integrity check", report.corrupted);
            }
        }

        Commands::Doctor => {
            // Startup already ran the scan; this shows its result and scans
            // once more for anything that appeared since.
            let mut report = ctx.report.clone();
            report.merge(api.scan_and_recover());
            if json {
                return print_json(&report);
            }
            print!("{}", render::recovery_report(&report));
        }

        Commands::Backup => match api.emergency_backup() {
            Some(path) => {
                if json {
                    return print_json(&serde_json::json!({ "backup": path }));
                }
                println!("Backup written to {}", path.display());
            }
            None => bail!("emergency backup failed (see log output with -v)"),
        },

        Commands::Export { file } => {
            let count = api.export(&file)?;
            if json {
                return print_json(&serde_json::json!({ "exported": count, "file": file }));
            }
            println!("Exported {} hunt(s) to {}", count, file.display());
        }

        Commands::Import { file } => {
            let hunts = api.import(&file)?;
            if json {
                return print_json(&hunts);
            }
            println!("Imported {} hunt(s) from {}", hunts.len(), file.display());
        }

        Commands::Mirror { folder, off } => mirror(ctx, folder.as_deref(), off)?,

        Commands::Path => {
            println!("{}", api.data_directory().display());
        }
    }
    Ok(())
}

fn counter_output(hunt: &Hunt, settings: &Settings, json: bool) -> Result<()> {
    if json {
        return print_json(hunt);
    }
    print!("{}", render::counter_line(hunt, settings));
    Ok(())
}

fn new_hunt(args: CreateArgs) -> Result<NewHunt> {
    Ok(NewHunt {
        name: args.name,
        game: args.game,
        method: args.method,
        target_species: args.target,
        base_odds: Odds::new(1, args.odds)?,
        modifiers: Some(Modifiers {
            shiny_charm: args.charm,
            masuda: args.masuda,
            chain_tier: 0,
        }),
        notes: args.notes,
    })
}

fn mirror(ctx: &HuntContext, folder: Option<&Path>, off: bool) -> Result<()> {
    let api = &ctx.api;
    if off {
        api.update_settings(|s| s.obs_text_folder.clear())?;
        println!("Text mirror disabled");
        return Ok(());
    }

    let Some(folder) = folder else {
        let current = api.settings().obs_text_folder;
        if current.is_empty() {
            println!("Text mirror is off");
        } else {
            println!("{}", current);
        }
        return Ok(());
    };

    let check = api.validate_output_folder(folder);
    if !check.valid {
        bail!(
            "cannot use {}: {}",
            folder.display(),
            check.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    let value = folder.to_string_lossy().into_owned();
    api.update_settings(|s| s.obs_text_folder = value)?;
    println!("Text mirror writes to {}", folder.display());
    Ok(())
}
