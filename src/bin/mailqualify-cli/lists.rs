use anyhow::{Context, Result};
use mailqualify_lib::{DomainList, DomainLists};

use crate::args::Cli;

/// `--lists-dir` d'abord, puis les fichiers individuels par-dessus.
pub fn load(cli: &Cli) -> Result<DomainLists> {
    let mut lists = match &cli.lists_dir {
        Some(dir) => DomainLists::from_dir(dir)
            .with_context(|| format!("load lists from {}", dir.display()))?,
        None => DomainLists::default(),
    };

    if let Some(path) = &cli.disposable {
        lists.disposable = DomainList::from_path(path)?;
    }
    if let Some(path) = &cli.whitelist {
        lists.whitelist = DomainList::from_path(path)?;
    }
    if let Some(path) = &cli.blacklist {
        lists.blacklist = DomainList::from_path(path)?;
    }

    #[cfg(feature = "with-tracing")]
    tracing::info!(
        disposable = lists.disposable.len(),
        whitelist = lists.whitelist.len(),
        blacklist = lists.blacklist.len(),
        "domain lists ready"
    );
    Ok(lists)
}
