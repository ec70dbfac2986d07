//! CLI argument definitions for `tabtune`.

use clap::{Arg, ArgAction, Command};

fn media_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("ID")
                .help("Video id or URL")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("title")
                .long("title")
                .short('t')
                .value_name("TITLE")
                .help("Display title"),
        )
        .arg(
            Arg::new("duration")
                .long("duration")
                .short('d')
                .value_name("DURATION")
                .help("Duration as seconds, m:ss or h:mm:ss"),
        )
        .arg(
            Arg::new("thumbnail")
                .long("thumbnail")
                .value_name("URL")
                .help("Thumbnail URL"),
        )
}

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("tabtune")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Side-panel video player: queue, favorites, playlists and playback")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .global(true)
                .help("Directory holding the queue, favorites and playlists"),
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("PATH")
                .global(true)
                .help("Path to a player settings JSON file"),
        )
        .subcommand(
            Command::new("queue")
                .about("Inspect and edit the play queue")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List queued videos"))
                .subcommand(media_args(Command::new("add").about("Append a video")))
                .subcommand(
                    Command::new("remove").about("Remove a queue entry").arg(
                        Arg::new("INDEX")
                            .help("Zero-based queue position")
                            .required(true)
                            .index(1),
                    ),
                )
                .subcommand(Command::new("clear").about("Empty the queue")),
        )
        .subcommand(
            Command::new("favorites")
                .about("Inspect and edit favorites")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List favorites"))
                .subcommand(media_args(Command::new("add").about("Add a favorite")))
                .subcommand(
                    Command::new("remove").about("Remove a favorite").arg(
                        Arg::new("ID")
                            .help("Video id")
                            .required(true)
                            .index(1),
                    ),
                ),
        )
        .subcommand(
            Command::new("playlist")
                .about("Manage playlists")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List playlists"))
                .subcommand(
                    Command::new("show").about("List a playlist's tracks").arg(
                        Arg::new("PLAYLIST")
                            .help("Playlist id")
                            .required(true)
                            .index(1),
                    ),
                )
                .subcommand(
                    Command::new("create")
                        .about("Create a playlist")
                        .arg(
                            Arg::new("NAME")
                                .help("Playlist name")
                                .required(true)
                                .index(1),
                        )
                        .arg(
                            Arg::new("description")
                                .long("description")
                                .value_name("TEXT")
                                .help("Playlist description"),
                        )
                        .arg(
                            Arg::new("from-queue")
                                .long("from-queue")
                                .action(ArgAction::SetTrue)
                                .help("Start with a copy of the current queue"),
                        ),
                )
                .subcommand(media_args(
                    Command::new("add").about("Add a video to a playlist").arg(
                        Arg::new("PLAYLIST")
                            .long("playlist")
                            .short('p')
                            .value_name("PLAYLIST")
                            .required(true)
                            .help("Playlist id"),
                    ),
                ))
                .subcommand(
                    Command::new("remove")
                        .about("Remove a track from a playlist")
                        .arg(
                            Arg::new("PLAYLIST")
                                .help("Playlist id")
                                .required(true)
                                .index(1),
                        )
                        .arg(
                            Arg::new("ID")
                                .help("Video id")
                                .required(true)
                                .index(2),
                        ),
                )
                .subcommand(
                    Command::new("delete").about("Delete a playlist").arg(
                        Arg::new("PLAYLIST")
                            .help("Playlist id")
                            .required(true)
                            .index(1),
                    ),
                ),
        )
        .subcommand(
            Command::new("lookup")
                .about("Fetch video metadata from the catalog")
                .arg(
                    Arg::new("URL")
                        .help("Video URL or id")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("queue")
                        .long("queue")
                        .action(ArgAction::SetTrue)
                        .help("Append the video to the queue"),
                )
                .arg(
                    Arg::new("favorite")
                        .long("favorite")
                        .action(ArgAction::SetTrue)
                        .help("Add the video to favorites"),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search the catalog")
                .arg(
                    Arg::new("QUERY")
                        .help("Search terms")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("session")
                .about("Play the queue against a simulated embed")
                .arg(
                    Arg::new("headless")
                        .long("headless")
                        .action(ArgAction::SetTrue)
                        .help("Print events instead of opening the TUI"),
                )
                .arg(
                    Arg::new("seconds")
                        .long("seconds")
                        .value_name("SECONDS")
                        .default_value("60")
                        .help("Simulated seconds to run in headless mode"),
                )
                .arg(
                    Arg::new("hide-at")
                        .long("hide-at")
                        .value_name("SECONDS")
                        .help("Hide the document after this many seconds"),
                )
                .arg(
                    Arg::new("show-at")
                        .long("show-at")
                        .value_name("SECONDS")
                        .help("Show the document again after this many seconds"),
                )
                .arg(
                    Arg::new("playlist")
                        .long("playlist")
                        .value_name("PLAYLIST")
                        .help("Load this playlist into the queue first"),
                )
                .arg(
                    Arg::new("fallback-duration")
                        .long("fallback-duration")
                        .value_name("SECONDS")
                        .default_value("180")
                        .help("Length the simulated embed uses for videos without a duration"),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Emit default JSON payloads")
                .subcommand_required(true)
                .subcommand(
                    Command::new("settings-json").about("Print the default player settings JSON"),
                ),
        )
}
