//! Subcommand handlers and the setup they share.

pub mod args;
pub mod catalog;
pub mod library;
pub mod session;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ArgMatches;
use log::debug;
use tabtune_lib::catalog::{extract_video_id, format_time, parse_duration};
use tabtune_lib::library::FileStore;
use tabtune_lib::playback::controller::NoticeLevel;
use tabtune_lib::playback::timer::Clock;
use tabtune_lib::{Library, MediaInfo, PlayerController, PlayerEvent, PlayerSettings};

use crate::error::CliError;
use crate::simulate::SimulatedEmbed;

pub type Player = PlayerController<SimulatedEmbed, FileStore>;

/// Directory from `--data-dir`, or the per-user default.
pub fn data_dir(args: &ArgMatches) -> Result<PathBuf, CliError> {
    match args.get_one::<String>("data-dir") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => FileStore::default_dir().ok_or(CliError::NoDataDir),
    }
}

/// Settings from `--settings`, or the defaults.
pub fn load_settings(args: &ArgMatches) -> Result<PlayerSettings, CliError> {
    match args.get_one::<String>("settings") {
        Some(path) => Ok(PlayerSettings::from_file(Path::new(path))?),
        None => Ok(PlayerSettings::default()),
    }
}

/// Controller over the on-disk library.
pub fn open_player(
    args: &ArgMatches,
    clock: Box<dyn Clock>,
    embed: SimulatedEmbed,
) -> Result<Player, CliError> {
    let dir = data_dir(args)?;
    debug!("library at {}", dir.display());
    let settings = load_settings(args)?;
    let library = Library::load(FileStore::new(dir));
    Ok(PlayerController::new(settings, clock, embed, library))
}

/// Parse a required or defaulted argument.
pub fn parse_arg<T: FromStr>(args: &ArgMatches, name: &'static str) -> Result<T, CliError> {
    let value = args
        .get_one::<String>(name)
        .ok_or(CliError::InvalidArgument {
            name,
            value: String::new(),
        })?;
    value.parse::<T>().map_err(|_| CliError::InvalidArgument {
        name,
        value: value.clone(),
    })
}

/// Optional argument, parsed when present.
pub fn parse_optional<T: FromStr>(
    args: &ArgMatches,
    name: &'static str,
) -> Result<Option<T>, CliError> {
    match args.get_one::<String>(name) {
        Some(_) => parse_arg(args, name).map(Some),
        None => Ok(None),
    }
}

/// Seconds from plain seconds, `m:ss` or `h:mm:ss`.
fn parse_duration_arg(value: &str) -> Result<u32, CliError> {
    let seconds = if value.contains(':') {
        Some(parse_duration(value)).filter(|secs| *secs > 0)
    } else {
        value.trim().parse::<u32>().ok()
    };
    seconds.ok_or(CliError::InvalidArgument {
        name: "duration",
        value: value.to_string(),
    })
}

/// Media described by the `ID`, `--title`, `--duration` and `--thumbnail` args.
pub fn media_from_args(args: &ArgMatches) -> Result<MediaInfo, CliError> {
    let raw = args
        .get_one::<String>("ID")
        .map(String::as_str)
        .unwrap_or_default();
    let id = extract_video_id(raw).ok_or(CliError::InvalidArgument {
        name: "ID",
        value: raw.to_string(),
    })?;
    let duration = match args.get_one::<String>("duration") {
        Some(value) => parse_duration_arg(value)?,
        None => 0,
    };
    let title = args
        .get_one::<String>("title")
        .cloned()
        .unwrap_or_else(|| id.clone());
    let thumbnail = args
        .get_one::<String>("thumbnail")
        .cloned()
        .unwrap_or_default();
    Ok(MediaInfo::new(id, title, duration).with_thumbnail(thumbnail))
}

pub fn duration_label(seconds: u32) -> String {
    if seconds == 0 {
        "--:--".to_string()
    } else {
        format_time(f64::from(seconds))
    }
}

/// Print pending notices. Returns 1 if any of them was an error, else 0.
pub fn print_notices(player: &mut Player) -> i32 {
    let mut code = 0;
    for event in player.drain_events() {
        if let PlayerEvent::Notice(notice) = event {
            println!("{}", notice.message);
            if notice.level == NoticeLevel::Error {
                code = 1;
            }
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_accept_seconds_and_clock_forms() {
        assert_eq!(parse_duration_arg("95").unwrap(), 95);
        assert_eq!(parse_duration_arg("1:35").unwrap(), 95);
        assert_eq!(parse_duration_arg("1:00:00").unwrap(), 3600);
        assert!(parse_duration_arg("99999999:00").is_err());
        assert!(parse_duration_arg("soon").is_err());
        assert!(parse_duration_arg("0:00").is_err());
    }

    #[test]
    fn media_args_accept_urls() {
        let matches = args::build_cli()
            .try_get_matches_from([
                "tabtune",
                "queue",
                "add",
                "https://youtu.be/dQw4w9WgXcQ",
                "--duration",
                "3:32",
            ])
            .unwrap();
        let (_, queue) = matches.subcommand().unwrap();
        let (_, add) = queue.subcommand().unwrap();
        let info = media_from_args(add).unwrap();
        assert_eq!(info.id, "dQw4w9WgXcQ");
        assert_eq!(info.title, "dQw4w9WgXcQ");
        assert_eq!(info.duration, 212);
    }

    #[test]
    fn zero_duration_has_placeholder_label() {
        assert_eq!(duration_label(0), "--:--");
        assert_eq!(duration_label(61), "1:01");
    }
}
