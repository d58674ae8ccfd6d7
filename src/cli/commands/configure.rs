//! Per-user default settings command.

use crate::config;

/// Show or update the persisted defaults for the embed command
pub fn cmd_config(
    encoding: Option<&str>,
    keep_lyrics: Option<bool>,
    use_accel: Option<bool>,
) -> anyhow::Result<()> {
    let mut settings = config::load();

    let changed = encoding.is_some() || keep_lyrics.is_some() || use_accel.is_some();
    if let Some(encoding) = encoding {
        settings.encoding = encoding.to_string();
    }
    if let Some(keep_lyrics) = keep_lyrics {
        settings.keep_lyrics = keep_lyrics;
    }
    if let Some(use_accel) = use_accel {
        settings.use_accel = use_accel;
    }

    if changed {
        config::save(&settings)?;
        println!("Saved.");
        println!();
    }

    println!("encoding    = {}", settings.encoding);
    println!("keep-lyrics = {}", settings.keep_lyrics);
    println!("use-accel   = {}", settings.use_accel);
    if let Some(path) = config::config_path() {
        println!();
        println!("Config file: {:?}", path);
    }

    Ok(())
}
