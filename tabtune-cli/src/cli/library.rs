//! `queue`, `favorites` and `playlist` subcommands.

use clap::ArgMatches;
use tabtune_lib::playback::controller::PlaylistSource;
use tabtune_lib::{MediaEntry, SystemClock};

use super::{duration_label, media_from_args, open_player, parse_arg, print_notices, Player};
use crate::error::CliError;
use crate::simulate::SimulatedEmbed;

fn player(args: &ArgMatches) -> Result<Player, CliError> {
    let clock = SystemClock::new();
    let embed = SimulatedEmbed::new(Box::new(clock.clone()), 0.0);
    open_player(args, Box::new(clock), embed)
}

fn print_entries(entries: &[MediaEntry], current: Option<usize>) {
    for (index, entry) in entries.iter().enumerate() {
        let marker = if Some(index) == current { "▶" } else { " " };
        println!(
            "{}{:>3}. {}  {}  ({})",
            marker,
            index,
            entry.id,
            entry.title,
            duration_label(entry.duration)
        );
    }
}

pub fn run_queue(args: &ArgMatches) -> Result<i32, CliError> {
    let Some((name, sub)) = args.subcommand() else {
        return Ok(-1);
    };
    let mut player = player(sub)?;
    match name {
        "list" => {
            let queue = player.library().queue();
            if queue.is_empty() {
                println!("Queue is empty");
            } else {
                print_entries(queue.entries(), queue.current());
            }
        }
        "add" => {
            let info = media_from_args(sub)?;
            player.add_to_queue(info, false);
        }
        "remove" => {
            let index = parse_arg::<usize>(sub, "INDEX")?;
            player.remove_from_queue(index);
        }
        "clear" => {
            if player.library().queue().is_empty() {
                println!("Queue is empty");
            }
            player.clear_queue();
        }
        _ => return Ok(-1),
    }
    Ok(print_notices(&mut player))
}

pub fn run_favorites(args: &ArgMatches) -> Result<i32, CliError> {
    let Some((name, sub)) = args.subcommand() else {
        return Ok(-1);
    };
    let mut player = player(sub)?;
    match name {
        "list" => {
            let favorites = player.library().favorites();
            if favorites.is_empty() {
                println!("No favorites yet");
            } else {
                print_entries(favorites, None);
            }
        }
        "add" => {
            let info = media_from_args(sub)?;
            player.add_to_favorites(info);
        }
        "remove" => {
            let id = sub
                .get_one::<String>("ID")
                .map(String::as_str)
                .unwrap_or_default();
            player.remove_from_favorites(id);
        }
        _ => return Ok(-1),
    }
    Ok(print_notices(&mut player))
}

pub fn run_playlist(args: &ArgMatches) -> Result<i32, CliError> {
    let Some((name, sub)) = args.subcommand() else {
        return Ok(-1);
    };
    let mut player = player(sub)?;
    let playlist_id = sub
        .try_get_one::<String>("PLAYLIST")
        .ok()
        .flatten()
        .cloned()
        .unwrap_or_default();
    match name {
        "list" => {
            let playlists = player.library().playlists();
            if playlists.is_empty() {
                println!("No playlists yet");
            }
            for playlist in playlists {
                println!(
                    "{}  {}  ({} tracks)",
                    playlist.id,
                    playlist.name,
                    playlist.tracks.len()
                );
            }
        }
        "show" => match player.library().playlist(&playlist_id) {
            Some(playlist) => {
                println!("{}", playlist.name);
                if !playlist.description.is_empty() {
                    println!("{}", playlist.description);
                }
                print_entries(&playlist.tracks, None);
            }
            None => {
                println!("Playlist not found");
                return Ok(1);
            }
        },
        "create" => {
            let name = sub
                .get_one::<String>("NAME")
                .map(String::as_str)
                .unwrap_or_default();
            let description = sub
                .get_one::<String>("description")
                .map(String::as_str)
                .unwrap_or_default();
            let source = if sub.get_flag("from-queue") {
                PlaylistSource::Queue
            } else {
                PlaylistSource::Empty
            };
            if let Some(id) = player.create_playlist(name, description, source) {
                println!("{}", id);
            }
        }
        "add" => {
            let info = media_from_args(sub)?;
            player.add_to_playlist(&playlist_id, info);
        }
        "remove" => {
            let id = sub
                .get_one::<String>("ID")
                .map(String::as_str)
                .unwrap_or_default();
            player.remove_from_playlist(&playlist_id, id);
        }
        "delete" => {
            player.delete_playlist(&playlist_id);
        }
        _ => return Ok(-1),
    }
    Ok(print_notices(&mut player))
}
