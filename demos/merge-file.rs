use std::{env, fs};

use anyhow::{Context as _, Result, bail};
use log::info;
use reconcile_merge::{MergeConfig, MergeSession, Side, TextRole, build_merge};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Three-way merge of a file in the spirit of `git merge-file`: lists what
/// each side changed, takes the non-conflicting changes into base and
/// reports what is left.
///
/// Run it with:
/// `cargo run --features serde --example merge-file mine.txt base.txt theirs.txt [config.yml]`
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reconcile_merge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to initialise tracing")?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 || args.len() > 5 {
        bail!("Usage: merge-file <mine> <base> <theirs> [config.yml]");
    }

    let read =
        |path: &String| fs::read_to_string(path).with_context(|| format!("Cannot read {path}"));
    let mine = read(&args[1])?;
    let base = read(&args[2])?;
    let theirs = read(&args[3])?;

    let config = match args.get(4) {
        Some(path) => {
            MergeConfig::from_yaml(&read(path)?).context("Failed to parse configuration")?
        }
        None => MergeConfig::default(),
    };

    let mut session =
        build_merge(&base, &mine, &theirs, &config).context("Failed to compare the files")?;

    for side in Side::BOTH {
        print_changes(&session, side);
    }

    let applied = session
        .apply_non_conflicted(TextRole::Base)
        .context("Failed to apply the non-conflicting changes")?;
    info!("Applied {applied} non-conflicting changes");

    print!("{}", session.document(TextRole::Base).text());

    if session.is_fully_merged() {
        eprintln!("Merged cleanly");
    } else {
        let open = session
            .conflicts()
            .filter(|conflict| !conflict.is_closed())
            .count();
        eprintln!("{open} conflicts are left unresolved");
    }

    Ok(())
}

fn print_changes(session: &MergeSession, side: Side) {
    let list = session.change_list(side);
    eprintln!(
        "{side}: {} pending changes, {} in conflicts",
        list.count(),
        list.conflict_count()
    );

    for id in list.pending() {
        let Some(change) = session.change(id) else {
            continue;
        };

        eprintln!(
            "  {change}: base {:?} {:?} -> {side} {:?} {:?}",
            session.range(id, TextRole::Base).unwrap_or_default(),
            session.text(id, TextRole::Base).unwrap_or_default(),
            session.range(id, side.role()).unwrap_or_default(),
            session.text(id, side.role()).unwrap_or_default(),
        );
    }
}
