use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::catalog::{Catalog, CatalogError, SearchResult, VideoInfo};
use crate::library::MemoryStore;
use crate::playback::timer::ManualClock;

const YT: &str = "https://www.youtube.com";

#[derive(Default)]
struct RecordingEmbed {
    no_window: bool,
    loads: Vec<String>,
    posted: Vec<String>,
}

impl RecordingEmbed {
    fn funcs(&self) -> Vec<String> {
        self.posted
            .iter()
            .map(|message| {
                let value: serde_json::Value = serde_json::from_str(message).unwrap();
                value["func"].as_str().unwrap().to_string()
            })
            .collect()
    }
}

impl EmbedPort for RecordingEmbed {
    fn has_content_window(&self) -> bool {
        !self.no_window
    }

    fn load(&mut self, url: &str) {
        self.loads.push(url.to_string());
    }

    fn post(&mut self, message: &str) {
        self.posted.push(message.to_string());
    }
}

type TestController = PlayerController<RecordingEmbed, MemoryStore>;

fn controller() -> (TestController, ManualClock) {
    let clock = ManualClock::new();
    let controller = PlayerController::new(
        PlayerSettings::default(),
        Box::new(clock.clone()),
        RecordingEmbed::default(),
        Library::new(MemoryStore::new()),
    );
    (controller, clock)
}

fn info(id: &str, duration: u32) -> MediaInfo {
    MediaInfo::new(id, id.to_uppercase(), duration)
}

/// Step the clock in 50 ms increments up to `until_ms`, pumping each step.
fn run_until(controller: &mut TestController, clock: &ManualClock, until_ms: u64) {
    let until = Duration::from_millis(until_ms);
    while clock.now() < until {
        clock.advance(Duration::from_millis(50));
        controller.pump();
    }
}

fn state(controller: &mut TestController, code: i64) {
    let message = format!(r#"{{"event":"onStateChange","info":{}}}"#, code);
    controller.handle_message(YT, &message);
}

fn current_time(controller: &mut TestController, seconds: f64) {
    let message = format!(r#"{{"event":"infoDelivery","info":{{"currentTime":{}}}}}"#, seconds);
    controller.handle_message(YT, &message);
}

fn ended_count(events: &[PlayerEvent], media_id: &str) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, PlayerEvent::Ended { media_id: id, .. } if id == media_id))
        .count()
}

fn notices(events: &[PlayerEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            PlayerEvent::Notice(notice) => Some(notice.message.clone()),
            _ => None,
        })
        .collect()
}

fn playing_id(controller: &TestController) -> Option<String> {
    controller.session().map(|session| session.media_id.clone())
}

fn seek_targets(embed: &RecordingEmbed) -> Vec<f64> {
    embed
        .posted
        .iter()
        .map(|message| serde_json::from_str::<serde_json::Value>(message).unwrap())
        .filter(|value| value["func"] == "seekTo")
        .map(|value| value["args"][0].as_f64().unwrap())
        .collect()
}

/// Catalog answering every lookup with the same video, or failing.
struct FixedCatalog {
    offline: bool,
}

impl Catalog for FixedCatalog {
    fn video(&self, _media_id: &str) -> Result<VideoInfo, CatalogError> {
        if self.offline {
            return Err(CatalogError::Transport("offline".to_string()));
        }
        Ok(VideoInfo {
            title: "Never".to_string(),
            duration: "3:32".to_string(),
            ..VideoInfo::default()
        })
    }

    fn search(&self, _query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        Ok(Vec::new())
    }
}

#[test]
fn estimator_ends_queue_item_before_embed_reports_it() {
    let (mut player, clock) = controller();
    player.add_to_queue(info("a", 10), false);
    player.add_to_queue(info("b", 20), false);
    player.play_queue_index(0);

    run_until(&mut player, &clock, 9_200);
    let events = player.drain_events();
    assert!(events.contains(&PlayerEvent::Ended {
        media_id: "a".to_string(),
        source: EndSource::Estimator,
    }));
    assert!(player.advance_pending_in().is_some());

    run_until(&mut player, &clock, 10_300);
    assert_eq!(playing_id(&player).as_deref(), Some("b"));
    assert_eq!(player.library().queue().current(), Some(1));
    assert!(player.is_playing());
}

#[test]
fn background_tracker_advances_once_while_hidden() {
    let (mut player, clock) = controller();
    player.add_to_queue(info("x", 20), false);
    player.add_to_queue(info("y", 20), false);
    player.play_queue_index(0);

    run_until(&mut player, &clock, 1_000);
    current_time(&mut player, 15.0);
    player.set_visibility(false);
    assert_eq!(player.timers_running(), (false, true));

    run_until(&mut player, &clock, 7_000);
    let events = player.drain_events();
    assert_eq!(ended_count(&events, "x"), 1);
    assert!(events.contains(&PlayerEvent::Ended {
        media_id: "x".to_string(),
        source: EndSource::Background,
    }));
    assert_eq!(playing_id(&player).as_deref(), Some("y"));
}

#[test]
fn estimated_and_authoritative_end_advance_only_once() {
    let (mut player, clock) = controller();
    player.add_to_queue(info("a", 10), false);
    player.add_to_queue(info("b", 20), false);
    player.add_to_queue(info("c", 20), false);
    player.play_queue_index(0);

    run_until(&mut player, &clock, 1_100);
    state(&mut player, 1);
    run_until(&mut player, &clock, 9_500);
    // The embed catches up after the estimator already ended the item.
    state(&mut player, 0);
    run_until(&mut player, &clock, 10_500);
    // Late duplicate for the previous item, delivered after the next loaded.
    state(&mut player, 0);
    run_until(&mut player, &clock, 12_000);

    let events = player.drain_events();
    assert_eq!(ended_count(&events, "a"), 1);
    assert_eq!(ended_count(&events, "b"), 0);
    assert_eq!(playing_id(&player).as_deref(), Some("b"));
    assert_eq!(player.library().queue().current(), Some(1));
}

#[test]
fn embed_end_advances_when_duration_is_unknown() {
    let (mut player, clock) = controller();
    player.add_to_queue(info("a", 0), false);
    player.add_to_queue(info("b", 0), false);
    player.play_queue_index(0);

    run_until(&mut player, &clock, 60_000);
    assert_eq!(ended_count(&player.drain_events(), "a"), 0);

    state(&mut player, 1);
    state(&mut player, 0);
    let events = player.drain_events();
    assert!(events.contains(&PlayerEvent::Ended {
        media_id: "a".to_string(),
        source: EndSource::Embed,
    }));
    run_until(&mut player, &clock, 61_100);
    assert_eq!(playing_id(&player).as_deref(), Some("b"));
}

#[test]
fn ended_before_playback_started_is_ignored() {
    let (mut player, clock) = controller();
    player.play("a", "A", "", None);
    state(&mut player, 0);
    run_until(&mut player, &clock, 3_000);

    assert_eq!(ended_count(&player.drain_events(), "a"), 0);
    assert!(player.is_playing());
}

#[test]
fn rapid_plays_leave_one_session_and_one_tick() {
    let (mut player, clock) = controller();
    player.play("a", "A", "", None);
    player.play("b", "B", "", None);
    player.play("c", "C", "", None);

    assert_eq!(player.embed().loads.len(), 3);
    assert_eq!(player.debug_timer_state(), (3, true, false));
    run_until(&mut player, &clock, 1_500);

    assert_eq!(playing_id(&player).as_deref(), Some("c"));
    assert_eq!(player.timers_running(), (true, false));
    assert!(player.embed().loads[2].contains("/embed/c?"));
}

#[test]
fn reported_position_is_monotonic_and_bounded() {
    let (mut player, clock) = controller();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    player.set_reporting(move |report| sink.borrow_mut().push((report.media_id, report.time)));
    player.remember(info("a", 8));
    player.play("a", "A", "", None);

    run_until(&mut player, &clock, 3_000);
    current_time(&mut player, 1.0);
    run_until(&mut player, &clock, 7_500);

    let positions: Vec<f64> = seen.borrow().iter().map(|(_, time)| *time).collect();
    assert!(positions.len() > 5);
    assert!(positions.windows(2).all(|pair| pair[1] >= pair[0]));
    assert!(positions.iter().all(|time| *time <= 8.0));

    player.play("b", "B", "", None);
    assert_eq!(player.session().map(|s| s.position()), Some(0.0));
    assert_eq!(seen.borrow().last().map(|(id, _)| id.as_str()), Some("b"));
}

#[test]
fn removing_before_current_shifts_queue_index() {
    let (mut player, _clock) = controller();
    for id in ["a", "b", "c"] {
        player.add_to_queue(info(id, 30), false);
    }
    player.play_queue_index(1);
    assert!(player.remove_from_queue(0));

    let queue = player.library().queue();
    assert_eq!(queue.current(), Some(0));
    assert_eq!(queue.get(0).map(|e| e.id.as_str()), Some("b"));
    assert!(notices(&player.drain_events()).contains(&"Removed from queue".to_string()));
}

#[test]
fn duplicate_queue_add_only_notifies() {
    let (mut player, _clock) = controller();
    assert_eq!(player.add_to_queue(info("a", 30), false), Some(0));
    player.drain_events();

    assert_eq!(player.add_to_queue(info("a", 30), false), None);
    assert_eq!(player.library().queue().len(), 1);
    assert_eq!(notices(&player.drain_events()), vec!["Already in queue".to_string()]);
}

#[test]
fn untrusted_messages_are_discarded() {
    let (mut player, _clock) = controller();
    player.play("a", "A", "", None);
    player.pause();
    assert!(!player.is_playing());

    player.handle_message("https://evil.example", r#"{"event":"onStateChange","info":1}"#);
    assert!(!player.is_playing());
    player.handle_message(YT, "not json");
    assert!(!player.is_playing());

    state(&mut player, 1);
    assert!(player.is_playing());
}

#[test]
fn commands_are_dropped_without_content_window() {
    let (mut player, _clock) = controller();
    player.embed_mut().no_window = true;
    player.play("a", "A", "", None);
    player.mute();
    player.seek_to(30.0);
    player.pause();

    assert!(player.embed().posted.is_empty());
    assert!(!player.is_muted());
    assert_eq!(player.session().map(|s| s.estimator().peek(Duration::ZERO)), Some(0.0));
}

#[test]
fn no_state_requests_before_settle_delay() {
    let (mut player, clock) = controller();
    player.play("a", "A", "", None);
    run_until(&mut player, &clock, 950);
    assert!(!player.embed().funcs().iter().any(|f| f == "getCurrentTime"));

    run_until(&mut player, &clock, 1_000);
    let funcs = player.embed().funcs();
    assert!(funcs.contains(&"getDuration".to_string()));
    assert!(funcs.contains(&"getCurrentTime".to_string()));
}

#[test]
fn same_media_toggles_pause_in_place() {
    let (mut player, _clock) = controller();
    player.play("a", "A", "", None);
    player.play("a", "A", "", None);
    assert!(!player.is_playing());
    player.play("a", "A", "", None);
    assert!(player.is_playing());

    assert_eq!(player.embed().loads.len(), 1);
    assert_eq!(player.embed().funcs(), vec!["pauseVideo", "playVideo"]);
}

#[test]
fn pause_stops_both_timers() {
    let (mut player, clock) = controller();
    player.remember(info("a", 120));
    player.play("a", "A", "", None);
    run_until(&mut player, &clock, 1_200);
    player.set_visibility(false);
    assert_eq!(player.timers_running(), (false, true));

    player.pause();
    assert_eq!(player.timers_running(), (false, false));
    player.set_visibility(true);
    assert_eq!(player.timers_running(), (false, false));
}

#[test]
fn becoming_visible_resyncs_immediately() {
    let (mut player, clock) = controller();
    player.remember(info("a", 120));
    player.play("a", "A", "", None);
    run_until(&mut player, &clock, 1_200);
    player.set_visibility(false);
    player.embed_mut().posted.clear();

    player.set_visibility(true);
    assert_eq!(player.embed().funcs(), vec!["getDuration", "getCurrentTime"]);
    assert_eq!(player.timers_running(), (true, false));
}

#[test]
fn seek_uses_fallback_duration_until_known() {
    let (mut player, _clock) = controller();
    player.play("a", "A", "", None);
    player.seek(0.5);
    let seek: serde_json::Value = serde_json::from_str(&player.embed().posted[0]).unwrap();
    assert_eq!(seek["args"][0], serde_json::json!(50.0));

    player.handle_message(YT, r#"{"event":"infoDelivery","info":{"duration":200.7}}"#);
    assert_eq!(player.session().and_then(|s| s.duration()), Some(200.0));
    player.seek(0.5);
    let seek: serde_json::Value = serde_json::from_str(&player.embed().posted[1]).unwrap();
    assert_eq!(seek["args"][0], serde_json::json!(100.0));
}

#[test]
fn unmute_restores_full_volume() {
    let (mut player, _clock) = controller();
    player.play("a", "A", "", None);
    player.set_volume(150);
    assert_eq!(player.volume(), 100);
    player.set_volume(30);
    player.toggle_mute();
    assert!(player.is_muted());
    player.toggle_mute();
    assert!(!player.is_muted());
    assert_eq!(player.volume(), 100);
}

#[test]
fn stale_metadata_is_cached_but_not_applied() {
    let (mut player, _clock) = controller();
    player.play("a", "", "", None);
    let stale = player.request_metadata("a");
    player.play("b", "B", "", None);

    let late = MediaInfo::new("a", "Late title", 90);
    assert!(!player.apply_metadata(&stale, Ok(late)));
    assert_eq!(player.session().map(|s| s.title.as_str()), Some("B"));
    assert_eq!(player.media_info("a").map(|i| i.title.as_str()), Some("Late title"));

    let fresh = player.request_metadata("b");
    assert!(player.apply_metadata(&fresh, Ok(MediaInfo::new("b", "Real B", 90))));
    assert_eq!(player.session().map(|s| s.title.as_str()), Some("Real B"));
    assert_eq!(player.session().and_then(|s| s.duration()), Some(90.0));
}

#[test]
fn failed_metadata_lookup_notifies() {
    let (mut player, _clock) = controller();
    player.play("a", "A", "", None);
    let ticket = player.request_metadata("a");
    player.drain_events();

    let err = CatalogError::Transport("offline".to_string());
    assert!(!player.apply_metadata(&ticket, Err(err)));
    assert_eq!(
        notices(&player.drain_events()),
        vec!["Error fetching video information".to_string()]
    );
}

#[test]
fn search_results_advance_then_stop() {
    let (mut player, clock) = controller();
    player.set_search_results(vec![info("s1", 10), info("s2", 10)]);
    player.play_search_result(0);

    run_until(&mut player, &clock, 10_100);
    assert_eq!(playing_id(&player).as_deref(), Some("s2"));
    assert_eq!(player.library().queue().current(), None);

    run_until(&mut player, &clock, 20_500);
    let events = player.drain_events();
    assert!(events.contains(&PlayerEvent::Stopped));
    assert!(!player.is_playing());
}

#[test]
fn active_playlist_feeds_advance() {
    let (mut player, clock) = controller();
    let id = player
        .create_playlist("Mix", "", PlaylistSource::Media(info("p1", 10)))
        .unwrap();
    assert!(player.add_to_playlist(&id, info("p2", 10)));
    player.play_playlist_track(&id, 0);
    assert_eq!(player.active_playlist(), Some(id.as_str()));

    run_until(&mut player, &clock, 10_100);
    assert_eq!(playing_id(&player).as_deref(), Some("p2"));
    assert!(player.library().queue().is_empty());
}

#[test]
fn play_playlist_copies_tracks_into_queue() {
    let (mut player, _clock) = controller();
    player.add_to_queue(info("q", 30), false);
    let id = player
        .create_playlist("Mix", "evening", PlaylistSource::Media(info("p1", 10)))
        .unwrap();
    player.add_to_playlist(&id, info("p2", 10));
    player.drain_events();

    player.play_playlist(&id, 1);
    let ids: Vec<&str> = player
        .library()
        .queue()
        .entries()
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(ids, vec!["p1", "p2"]);
    assert_eq!(player.library().queue().current(), Some(1));
    assert_eq!(playing_id(&player).as_deref(), Some("p2"));
    assert!(notices(&player.drain_events()).contains(&"Playing playlist".to_string()));
}

#[test]
fn deleting_active_playlist_clears_it() {
    let (mut player, _clock) = controller();
    let id = player
        .create_playlist("Mix", "", PlaylistSource::Media(info("p1", 10)))
        .unwrap();
    player.play_playlist_track(&id, 0);
    player.drain_events();

    assert!(player.delete_playlist(&id));
    assert_eq!(player.active_playlist(), None);
    assert_eq!(notices(&player.drain_events()), vec!["Playlist deleted".to_string()]);
    assert!(!player.delete_playlist(&id));
}

#[test]
fn playlist_edits_report_rejections() {
    let (mut player, _clock) = controller();
    assert_eq!(player.create_playlist("  ", "", PlaylistSource::Empty), None);
    let id = player
        .create_playlist("Mix", "", PlaylistSource::Empty)
        .unwrap();
    assert!(player.add_to_playlist(&id, info("a", 10)));
    assert!(!player.add_to_playlist(&id, info("a", 10)));
    assert!(player.remove_from_playlist(&id, "a"));

    assert_eq!(
        notices(&player.drain_events()),
        vec![
            "Please enter a playlist name".to_string(),
            "Playlist created successfully".to_string(),
            "Added to playlist".to_string(),
            "Video already in playlist".to_string(),
            "Track removed from playlist".to_string(),
        ]
    );
}

#[test]
fn toggling_favorite_of_current_media() {
    let (mut player, _clock) = controller();
    player.add_to_favorites(info("old", 10));
    player.remember(info("a", 42));
    player.play("a", "A", "", None);

    player.toggle_current_favorite();
    assert!(player.is_favorite("a"));
    assert_eq!(player.library().favorites()[0].id, "a");
    assert_eq!(player.library().favorites()[0].duration, 42);

    player.toggle_current_favorite();
    assert!(!player.is_favorite("a"));
}

#[test]
fn replaying_ended_media_reloads_it() {
    let (mut player, clock) = controller();
    player.remember(info("a", 5));
    player.play("a", "A", "", None);
    run_until(&mut player, &clock, 7_000);
    assert!(player.session().is_some_and(|s| s.has_ended()));

    player.play("a", "A", "", None);
    assert_eq!(player.embed().loads.len(), 2);
    assert!(player.is_playing());
}

#[test]
fn play_next_without_current_entry_starts_queue() {
    let (mut player, _clock) = controller();
    player.add_to_queue(info("a", 10), false);
    player.add_to_queue(info("b", 10), false);
    player.drain_events();

    player.play_next();
    assert_eq!(playing_id(&player).as_deref(), Some("a"));
    assert_eq!(player.library().queue().current(), Some(0));

    player.play_next();
    assert_eq!(playing_id(&player).as_deref(), Some("b"));
    player.drain_events();

    player.play_next();
    assert_eq!(playing_id(&player).as_deref(), Some("b"));
    assert_eq!(
        notices(&player.drain_events()),
        vec!["Nothing to play next".to_string()]
    );
}

#[test]
fn play_next_falls_back_to_playlist_then_search_results() {
    let (mut player, _clock) = controller();
    let id = player
        .create_playlist("Mix", "", PlaylistSource::Media(info("p1", 10)))
        .unwrap();
    player.add_to_playlist(&id, info("p2", 10));
    player.set_search_results(vec![info("s1", 10), info("s2", 10)]);

    player.play_playlist_track(&id, 0);
    player.play_next();
    assert_eq!(playing_id(&player).as_deref(), Some("p2"));
    player.drain_events();

    player.play_next();
    assert_eq!(playing_id(&player).as_deref(), Some("p2"));
    assert_eq!(
        notices(&player.drain_events()),
        vec!["Nothing to play next".to_string()]
    );

    player.play_search_result(0);
    player.play_next();
    assert_eq!(playing_id(&player).as_deref(), Some("s2"));
    assert!(player.library().queue().is_empty());
}

#[test]
fn play_previous_from_first_queue_entry_uses_search_results() {
    let (mut player, _clock) = controller();
    player.add_to_queue(info("a", 10), false);
    player.set_search_results(vec![info("s1", 10), info("a", 10)]);
    player.play_queue_index(0);

    player.play_previous();
    assert_eq!(playing_id(&player).as_deref(), Some("s1"));
    assert_eq!(player.library().queue().current(), None);
    player.drain_events();

    player.play_previous();
    assert_eq!(playing_id(&player).as_deref(), Some("s1"));
    assert_eq!(
        notices(&player.drain_events()),
        vec!["Nothing to play before this".to_string()]
    );
}

#[test]
fn relative_seek_stays_within_duration() {
    let (mut player, _clock) = controller();
    player.remember(info("a", 100));
    player.play("a", "A", "", None);

    player.seek_relative(-5.0);
    player.seek_relative(500.0);
    player.seek_relative(-30.0);
    assert_eq!(seek_targets(player.embed()), vec![0.0, 100.0, 70.0]);
}

#[test]
fn unstarted_state_stops_tracking() {
    let (mut player, clock) = controller();
    player.remember(info("a", 120));
    player.play("a", "A", "", None);
    run_until(&mut player, &clock, 1_200);
    assert_eq!(player.timers_running(), (true, false));
    player.drain_events();

    state(&mut player, -1);
    assert_eq!(player.timers_running(), (false, false));
    assert!(!player.is_playing());
    assert!(player
        .drain_events()
        .contains(&PlayerEvent::PlayState { playing: false }));

    state(&mut player, 1);
    assert_eq!(player.timers_running(), (true, false));
}

#[test]
fn adding_by_url_saves_a_favorite() {
    let (mut player, _clock) = controller();
    let catalog = FixedCatalog { offline: false };

    assert!(player.add_by_url(" https://youtu.be/dQw4w9WgXcQ ", &catalog));
    assert!(player.is_favorite("dQw4w9WgXcQ"));
    assert!(player.library().queue().is_empty());
    assert_eq!(player.library().favorites()[0].duration, 212);
    assert!(!player.add_by_url("https://youtu.be/dQw4w9WgXcQ", &catalog));
    assert_eq!(
        notices(&player.drain_events()),
        vec!["Added to favorites".to_string(), "Already in favorites".to_string()]
    );
}

#[test]
fn adding_by_url_reports_bad_input() {
    let (mut player, _clock) = controller();
    assert!(!player.add_by_url("   ", &FixedCatalog { offline: false }));
    assert!(!player.add_by_url("https://example.com/", &FixedCatalog { offline: false }));
    assert!(!player.add_by_url("dQw4w9WgXcQ", &FixedCatalog { offline: true }));
    assert!(player.library().favorites().is_empty());
    assert_eq!(
        notices(&player.drain_events()),
        vec![
            "Please enter a YouTube URL".to_string(),
            "Invalid YouTube URL".to_string(),
            "Error fetching video information".to_string(),
        ]
    );
}
