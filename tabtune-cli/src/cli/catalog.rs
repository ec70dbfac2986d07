//! `lookup` and `search` subcommands against the catalog endpoint.

use tabtune_lib::settings::CatalogSettings;

/// Catalog settings with `TABTUNE_API_BASE` applied.
pub fn catalog_settings() -> CatalogSettings {
    let mut settings = CatalogSettings::default();
    if let Ok(api_base) = std::env::var("TABTUNE_API_BASE") {
        if !api_base.trim().is_empty() {
            settings.api_base = api_base.trim().to_string();
        }
    }
    settings
}

#[cfg(feature = "http")]
mod online {
    use clap::ArgMatches;
    use log::info;
    use tabtune_lib::catalog::{extract_video_id, Catalog, HttpCatalog};
    use tabtune_lib::SystemClock;

    use super::catalog_settings;
    use crate::cli::{duration_label, open_player, print_notices, Player};
    use crate::error::CliError;
    use crate::simulate::SimulatedEmbed;

    fn player(args: &ArgMatches) -> Result<Player, CliError> {
        let clock = SystemClock::new();
        let embed = SimulatedEmbed::new(Box::new(clock.clone()), 0.0);
        open_player(args, Box::new(clock), embed)
    }

    pub fn run_lookup(args: &ArgMatches) -> Result<i32, CliError> {
        let catalog = HttpCatalog::new(&catalog_settings())?;
        info!("catalog at {}", catalog.api_base());
        let url = args
            .get_one::<String>("URL")
            .map(String::as_str)
            .unwrap_or_default();
        let mut player = player(args)?;

        let media_id = if args.get_flag("favorite") {
            if !player.add_by_url(url, &catalog) {
                return Ok(print_notices(&mut player).max(1));
            }
            extract_video_id(url).unwrap_or_default()
        } else {
            let Some(media_id) = extract_video_id(url) else {
                println!("Invalid YouTube URL");
                return Ok(1);
            };
            let video = catalog.video(&media_id)?;
            player.remember(video.to_media_info(&media_id));
            media_id
        };

        let Some(info) = player.media_info(&media_id).cloned() else {
            return Ok(print_notices(&mut player));
        };
        println!("{}  {}  ({})", info.id, info.title, duration_label(info.duration));
        if !info.thumbnail.is_empty() {
            println!("  {}", info.thumbnail);
        }
        if args.get_flag("queue") {
            player.add_to_queue(info, false);
        }
        Ok(print_notices(&mut player))
    }

    pub fn run_search(args: &ArgMatches) -> Result<i32, CliError> {
        let catalog = HttpCatalog::new(&catalog_settings())?;
        let query = args
            .get_many::<String>("QUERY")
            .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        let mut player = player(args)?;

        let count = player.search(&query, &catalog);
        for (index, result) in player.search_results().iter().enumerate() {
            println!(
                "{:>3}. {}  {}  ({})",
                index,
                result.id,
                result.title,
                duration_label(result.duration)
            );
        }
        let code = print_notices(&mut player);
        if count == 0 && code == 0 {
            println!("No results");
        }
        Ok(code)
    }
}

#[cfg(feature = "http")]
pub use online::{run_lookup, run_search};

#[cfg(not(feature = "http"))]
pub fn run_lookup(_args: &clap::ArgMatches) -> Result<i32, crate::error::CliError> {
    println!("tabtune was built without the http feature");
    Ok(2)
}

#[cfg(not(feature = "http"))]
pub fn run_search(_args: &clap::ArgMatches) -> Result<i32, crate::error::CliError> {
    println!("tabtune was built without the http feature");
    Ok(2)
}
