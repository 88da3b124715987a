//! Application orchestrator.
//! Loads/merges config, initializes logging, registers the event log,
//! validates roots, and dispatches the requested command.

use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io;
use std::sync::Arc;
use tracing::{debug, error};

use safe_persist::config::{
    CONFIG_ENV, ensure_default_config_exists, load_config_from_default_xml,
    load_config_from_xml_env, load_config_from_xml_path,
};
use safe_persist::output as out;
use safe_persist::{
    Config, EventLogSink, Locator, PersistError, SIZE_UNKNOWN, Storage, default_config_path,
    event_log,
};

use crate::cli::{Args, Command};
use crate::logging::init_tracing;

/// Event log identity for this binary.
const EVENT_LOG_NAME: &str = "safe_persist";
const EVENT_LOG_GUID: u64 = 0x5afe_9e25_1570_0001;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    if args.print_config {
        print_config_location(&args);
        return Ok(());
    }

    let mut cfg = load_config(&args)?;
    args.apply_overrides(&mut cfg)?;

    let _guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    if !event_log::setup(EVENT_LOG_NAME, EVENT_LOG_GUID) {
        out::print_warn("Event log registration failed; release errors will only reach stderr logs.");
    }
    debug!(?args, "starting safe_persist");

    let Some(command) = args.command.as_ref() else {
        bail!("no command given; run with --help to see the available commands");
    };

    cfg.validate()?;
    let storage = Storage::from_config(&cfg).with_sink(Arc::new(EventLogSink));

    execute(&storage, command).inspect_err(|e| {
        if let Some(pe) = e.downcast_ref::<PersistError>() {
            let code = pe.code();
            error!(code = code.as_raw(), kind = %code.describe(), error = %pe, "command failed");
        } else {
            error!(error = ?e, "command failed");
        }
    })
}

fn print_config_location(args: &Args) {
    if let Some(p) = &args.config {
        out::print_info(&format!("Using --config (explicit):\n  {}\n", p.display()));
        return;
    }
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {cfg_env}\n"));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default safe_persist config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run any command to create a template.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a default config path: {e}")),
    }
}

/// --config, then SAFE_PERSIST_CONFIG, then the default path (a template is
/// written there on first use).
fn load_config(args: &Args) -> Result<Config> {
    if let Some(p) = &args.config {
        return load_config_from_xml_path(p);
    }
    if let Some(cfg) = load_config_from_xml_env()? {
        return Ok(cfg);
    }
    if let Some(path) = ensure_default_config_exists() {
        out::print_success(&format!("A template safe_persist config was written to: {}", path.display()));
        out::print_info(&format!("Edit its <root> entries to point at your storage. To use a different file set {CONFIG_ENV}."));
    }
    Ok(load_config_from_default_xml()?.unwrap_or_default())
}

fn execute(storage: &Storage, command: &Command) -> Result<()> {
    match command {
        Command::Write {
            locator,
            from,
            data,
            parents,
        } => {
            let target = Locator::from(locator.as_str());
            if *parents {
                storage.create_directory_with_ancestors(&target)?;
            }
            let written = match (from, data) {
                (_, Some(d)) => storage.write_bytes(&target, d.as_bytes())?,
                (Some(p), None) => {
                    let mut f = File::open(p).with_context(|| format!("open '{}'", p.display()))?;
                    storage.write_from(&target, &mut f)?
                }
                (None, None) => storage.write_from(&target, &mut io::stdin().lock())?,
            };
            out::print_success(&format!("wrote {written} bytes to {target}"));
        }
        Command::Copy { source, target } => {
            let (source, target) = (Locator::from(source.as_str()), Locator::from(target.as_str()));
            let copied = storage.copy_file(&source, &target)?;
            out::print_success(&format!("copied {copied} bytes {source} -> {target}"));
        }
        Command::Mkdir { locator, parents } => {
            let loc = Locator::from(locator.as_str()).as_directory();
            if *parents {
                storage.create_directory_with_ancestors(&loc)?;
            } else {
                storage.create_directory(&loc)?;
            }
            out::print_success(&format!("created {loc}"));
        }
        Command::Rm { locator, recursive } => {
            let loc = Locator::from(locator.as_str());
            if *recursive {
                storage.delete_tree(&loc)?;
            } else {
                storage.delete(&loc)?;
            }
            out::print_success(&format!("removed {loc}"));
        }
        Command::Rename { locator, new_name } => {
            let loc = Locator::from(locator.as_str());
            match storage.rename(&loc, new_name)? {
                Some(renamed) => out::print_user(renamed.as_str()),
                None => out::print_warn(&format!("nothing to rename at {loc}")),
            }
        }
        Command::Stat { locator } => {
            let loc = Locator::from(locator.as_str());
            let exists = storage.is_present(&loc)?;
            let is_dir = exists && storage.is_directory(&loc)?;
            let size = match (exists, is_dir) {
                (false, _) => SIZE_UNKNOWN,
                (true, true) => storage.directory_size(&loc, true),
                (true, false) => storage.file_size(&loc),
            };
            out::print_user(&format!("exists: {exists}"));
            out::print_user(&format!("directory: {is_dir}"));
            out::print_user(&format!("size: {size}"));
        }
        Command::Space { root } => {
            let root = Locator::from(root.as_str());
            out::print_user(&format!("available: {}", storage.available_space(&root)));
            out::print_user(&format!("total: {}", storage.total_space(&root)));
            out::print_user(&format!("used: {}", storage.used_space(&root)));
        }
        Command::ProbeEncryption { root } => {
            let encrypted = storage.is_encryption_enabled(&Locator::from(root.as_str()))?;
            out::print_user(&format!("encrypted: {encrypted}"));
        }
        Command::Ls { locator } => {
            for name in storage.list(&Locator::from(locator.as_str()))? {
                out::print_user(&name);
            }
        }
    }
    Ok(())
}
