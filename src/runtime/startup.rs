use std::sync::mpsc::Sender;

use crate::app::{Action, App};
use crate::config;
use crate::library::{LocalFs, parse_picked_path};

use super::workers::{self, LibraryMsg};

pub const USAGE: &str = "usage: audioflow [--rescan] [DIR]";

/// Command-line arguments.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StartupArgs {
    /// Re-walk the library roots instead of trusting the cached catalog.
    pub rescan: bool,
    /// A directory to open right away, as if picked.
    pub dir: Option<String>,
}

impl StartupArgs {
    /// Parse arguments, program name excluded. `Ok(None)` means help was asked for.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>, String> {
        let mut parsed = Self::default();
        for arg in args {
            match arg.as_str() {
                "--rescan" => parsed.rescan = true,
                "-h" | "--help" => return Ok(None),
                flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
                _ if parsed.dir.is_some() => return Err("only one directory may be given".into()),
                dir => parsed.dir = Some(dir.to_string()),
            }
        }
        Ok(Some(parsed))
    }
}

/// Kick off the catalog load and open the command-line directory, if any.
pub fn begin(
    app: &mut App,
    settings: &config::Settings,
    args: &StartupArgs,
    tx: &Sender<LibraryMsg>,
) {
    workers::spawn_catalog_load(
        settings.library.clone(),
        settings.cache.clone(),
        args.rescan,
        tx.clone(),
    );

    if let Some(dir) = &args.dir {
        let probe = LocalFs::new(settings.library.follow_links);
        if let Some(Action::List(ticket)) = app.pick(&probe, Ok(parse_picked_path(dir))) {
            workers::spawn_listing(ticket, settings.library.clone(), tx.clone());
        }
    }
}
