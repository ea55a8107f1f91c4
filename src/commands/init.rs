//! Init command - create a starter extforge.toml

use anyhow::{Context, Result, bail};
use std::env;
use std::fs;

use extforge::manifest::{MANIFEST_FILENAME, starter_manifest};

/// Run the init command.
pub(crate) fn run(name: Option<&str>) -> Result<()> {
    let cwd = env::current_dir().context("cannot determine current directory")?;
    let path = cwd.join(MANIFEST_FILENAME);

    if path.exists() {
        bail!("{MANIFEST_FILENAME} already exists in {}", cwd.display());
    }

    let name = name.map_or_else(
        || {
            cwd.file_name()
                .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().into_owned())
        },
        ToString::to_string,
    );

    fs::write(&path, starter_manifest(&name))
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Created {MANIFEST_FILENAME} for {name}");
    Ok(())
}
