use keel_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config::{normalize_profile_name, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(explicit_profile: Option<&str>, command: &ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            api_url,
            api_key,
            owner,
            day_window,
            no_activate,
        } => run_init(
            explicit_profile,
            profile.as_deref(),
            api_url.clone(),
            api_key.clone(),
            owner.clone(),
            *day_window,
            *no_activate,
        ),
        ConfigCommands::Show => run_show(explicit_profile),
    }
}

fn run_init(
    global_profile: Option<&str>,
    init_profile: Option<&str>,
    api_url: Option<String>,
    api_key: Option<String>,
    owner: Option<String>,
    day_window: Option<u32>,
    no_activate: bool,
) -> Result<(), CliError> {
    if let Some(url) = api_url.as_deref() {
        if !keel_core::util::is_http_url(url.trim()) {
            return Err(CliError::Config(format!(
                "API URL must include http:// or https://: {url}"
            )));
        }
    }

    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let name = normalize_profile_name(init_profile)
        .or_else(|| normalize_profile_name(global_profile))
        .unwrap_or_else(|| config.resolve_profile_name(None));

    let entry = config.profile_mut_or_default(&name);
    if let Some(url) = normalize_text_option(api_url) {
        entry.api_base_url = Some(url);
    }
    if let Some(key) = normalize_text_option(api_key) {
        entry.api_key = Some(key);
    }
    if let Some(owner) = normalize_text_option(owner) {
        entry.owner_id = Some(owner);
    }
    if let Some(days) = day_window {
        entry.day_window_days = Some(days);
    }

    if !no_activate {
        config.active_profile = Some(name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!("profile '{name}' saved to {}", path.display());
    Ok(())
}

fn run_show(explicit_profile: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let name = config.resolve_profile_name(explicit_profile);
    let profile = config.profile(&name).cloned().unwrap_or_default();

    println!("profile: {name}");
    println!(
        "api_base_url: {}",
        profile.api_base_url.as_deref().unwrap_or("(unset)")
    );
    println!(
        "api_key: {}",
        if profile.api_key.is_some() {
            "(set)"
        } else {
            "(unset)"
        }
    );
    println!(
        "owner_id: {}",
        profile.owner_id.as_deref().unwrap_or("(from local store)")
    );
    println!("day_window_days: {}", profile.day_window_days());
    Ok(())
}
