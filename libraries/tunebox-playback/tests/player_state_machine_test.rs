//! Player state machine tests
//!
//! Drive the player through the scripted backend and assert on the published
//! session, the backend call log and the event stream.

mod common;

use common::{create_test_song, song_path, wait_for_session, Call, MockBackend};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tunebox_playback::{
    PlaybackConfig, PlaybackStatus, PlayerEvent, PlayerState, PlayerStateMachine,
};

fn create_player() -> (Arc<PlayerStateMachine<MockBackend>>, MockBackend) {
    let backend = MockBackend::new();
    let player = PlayerStateMachine::new(backend.clone(), PlaybackConfig::default());
    (player, backend)
}

/// Play `id` and wait until it is reported loaded and playing
async fn play_and_load(
    player: &PlayerStateMachine<MockBackend>,
    backend: &MockBackend,
    id: &str,
) {
    let mut rx = player.subscribe();
    player.play_song(create_test_song(id)).await;
    backend
        .reporter_for(&song_path(id))
        .report(PlaybackStatus::loaded(true, 0, 3000));
    wait_for_session(&mut rx, |s| {
        s.state() == PlayerState::ReadyPlaying && s.current_song_id() == Some(id)
    })
    .await;
}

fn drain(events: &mut broadcast::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

async fn wait_for_event<F>(events: &mut broadcast::Receiver<PlayerEvent>, predicate: F)
where
    F: Fn(&PlayerEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = events.recv().await.expect("event stream closed");
            if predicate(&event) {
                break;
            }
        }
    })
    .await
    .expect("timed out waiting for event");
}

fn playlist_ids(songs: &[tunebox_core::DownloadedSong]) -> Vec<&str> {
    songs.iter().map(|s| s.id.as_str()).collect()
}

mod play_song {
    use super::*;

    #[tokio::test]
    async fn loads_with_autoplay_and_becomes_ready() {
        let (player, backend) = create_player();
        let mut rx = player.subscribe();

        player.play_song(create_test_song("a")).await;

        assert_eq!(backend.opens(), vec![(song_path("a"), true)]);
        assert_eq!(player.state(), PlayerState::Loading);
        assert_eq!(player.session().current_song_id(), Some("a"));

        backend.reporter(0).report(PlaybackStatus::loaded(true, 120, 3000));
        let session = wait_for_session(&mut rx, |s| s.state() == PlayerState::ReadyPlaying).await;

        assert_eq!(session.duration_ms, 3000);
        assert_eq!(session.position_ms, 120);
        assert!(session.error.is_none());
    }

    #[tokio::test]
    async fn paused_report_yields_ready_paused() {
        let (player, backend) = create_player();
        let mut rx = player.subscribe();

        player.play_song(create_test_song("a")).await;
        backend.reporter(0).report(PlaybackStatus::loaded(false, 0, 3000));

        wait_for_session(&mut rx, |s| s.state() == PlayerState::ReadyPaused).await;
    }

    #[tokio::test]
    async fn appends_non_member_to_playlist() {
        let (player, _backend) = create_player();
        player
            .set_playlist(vec![create_test_song("a"), create_test_song("b")])
            .await;

        player.play_song(create_test_song("x")).await;
        player.play_song(create_test_song("x")).await;

        assert_eq!(playlist_ids(&player.playlist().await), ["a", "b", "x"]);
    }

    #[tokio::test]
    async fn load_failure_returns_to_empty_with_error() {
        let (player, backend) = create_player();
        backend.fail_open(song_path("broken"));
        let mut events = player.events();

        player.play_song(create_test_song("broken")).await;

        let session = player.session();
        assert_eq!(session.state(), PlayerState::Empty);
        assert!(session.current_song.is_none());
        assert!(session.error.as_deref().unwrap().contains("file not found"));
        assert!(drain(&mut events).iter().any(PlayerEvent::is_error));
        assert!(!player.engine().is_loaded().await);
    }

    #[tokio::test]
    async fn new_song_clears_previous_error() {
        let (player, backend) = create_player();
        backend.fail_open(song_path("broken"));

        player.play_song(create_test_song("broken")).await;
        assert!(player.session().error.is_some());

        play_and_load(&player, &backend, "a").await;
        assert!(player.session().error.is_none());
    }

    #[tokio::test]
    async fn emits_track_changed_with_previous_id() {
        let (player, backend) = create_player();
        play_and_load(&player, &backend, "a").await;
        let mut events = player.events();

        player.play_song(create_test_song("b")).await;

        let seen = drain(&mut events);
        assert!(seen.contains(&PlayerEvent::TrackChanged {
            song_id: "b".to_string(),
            previous_song_id: Some("a".to_string()),
        }));
        assert!(seen.contains(&PlayerEvent::StateChanged {
            state: PlayerState::Loading
        }));
    }
}

mod transport {
    use super::*;

    #[tokio::test]
    async fn transport_is_noop_when_empty() {
        let (player, backend) = create_player();

        player.pause_song().await;
        player.resume_song().await;
        player.seek_to(1000).await;

        assert!(backend.calls().is_empty());
        assert_eq!(player.state(), PlayerState::Empty);
    }

    #[tokio::test]
    async fn transport_is_noop_while_loading() {
        let (player, backend) = create_player();
        player.play_song(create_test_song("a")).await;

        player.pause_song().await;
        player.seek_to(1000).await;

        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn pause_waits_for_reported_status() {
        let (player, backend) = create_player();
        play_and_load(&player, &backend, "a").await;
        let mut rx = player.subscribe();

        player.pause_song().await;

        assert_eq!(backend.count(|c| matches!(c, Call::Pause(_))), 1);
        // Not flipped until the native layer confirms
        assert!(player.session().is_playing);

        backend
            .reporter_for(&song_path("a"))
            .report(PlaybackStatus::loaded(false, 500, 3000));
        wait_for_session(&mut rx, |s| s.state() == PlayerState::ReadyPaused).await;

        player.resume_song().await;
        assert_eq!(backend.count(|c| matches!(c, Call::Play(_))), 1);
    }

    #[tokio::test]
    async fn seek_is_clamped() {
        let (player, backend) = create_player();
        play_and_load(&player, &backend, "a").await;

        player.seek_to(-50).await;
        player.seek_to(5000).await;

        assert_eq!(
            backend.calls()[1..],
            [
                Call::SetPosition(song_path("a"), 0),
                Call::SetPosition(song_path("a"), 3000),
            ]
        );
    }

    #[tokio::test]
    async fn rejected_transport_is_recorded_not_fatal() {
        let (player, backend) = create_player();
        play_and_load(&player, &backend, "a").await;
        backend.reject_transport();

        player.pause_song().await;

        let session = player.session();
        assert_eq!(session.state(), PlayerState::ReadyPlaying);
        assert!(session.error.as_deref().unwrap().contains("device lost"));
    }
}

mod navigation {
    use super::*;

    #[tokio::test]
    async fn next_and_previous_wrap() {
        let (player, backend) = create_player();
        player
            .set_playlist(vec![
                create_test_song("a"),
                create_test_song("b"),
                create_test_song("c"),
            ])
            .await;

        player.play_song(create_test_song("c")).await;
        player.play_next_song().await;
        assert_eq!(player.session().current_song_id(), Some("a"));

        player.play_previous_song().await;
        assert_eq!(player.session().current_song_id(), Some("c"));

        let opened: Vec<_> = backend.opens().into_iter().map(|(p, _)| p).collect();
        assert_eq!(opened, vec![song_path("c"), song_path("a"), song_path("c")]);
    }

    #[tokio::test]
    async fn navigation_without_current_song_is_noop() {
        let (player, backend) = create_player();
        player
            .set_playlist(vec![create_test_song("a"), create_test_song("b")])
            .await;

        player.play_next_song().await;
        player.play_previous_song().await;

        assert!(backend.calls().is_empty());
        assert_eq!(player.state(), PlayerState::Empty);
    }

    #[tokio::test]
    async fn navigation_from_non_member_is_noop() {
        let (player, backend) = create_player();
        play_and_load(&player, &backend, "x").await;
        // Replacing the playlist drops "x" while it keeps playing
        player
            .set_playlist(vec![create_test_song("a"), create_test_song("b")])
            .await;
        let calls_before = backend.calls().len();

        player.play_next_song().await;
        player.play_previous_song().await;

        assert_eq!(backend.calls().len(), calls_before);
        assert_eq!(player.session().current_song_id(), Some("x"));
        assert_eq!(player.state(), PlayerState::ReadyPlaying);
    }
}

mod auto_advance {
    use super::*;

    #[tokio::test]
    async fn finished_song_advances_and_wraps() {
        let (player, backend) = create_player();
        player
            .set_playlist(vec![create_test_song("a"), create_test_song("b")])
            .await;
        play_and_load(&player, &backend, "a").await;
        let mut rx = player.subscribe();
        let mut events = player.events();

        backend
            .reporter_for(&song_path("a"))
            .report(PlaybackStatus::finished(3000));
        wait_for_session(&mut rx, |s| s.current_song_id() == Some("b")).await;
        assert_eq!(backend.opens().last(), Some(&(song_path("b"), true)));
        assert!(drain(&mut events).contains(&PlayerEvent::TrackFinished {
            song_id: "a".to_string()
        }));

        backend
            .reporter_for(&song_path("b"))
            .report(PlaybackStatus::finished(3000));
        wait_for_session(&mut rx, |s| s.current_song_id() == Some("a")).await;

        let opened: Vec<_> = backend.opens().into_iter().map(|(p, _)| p).collect();
        assert_eq!(opened, vec![song_path("a"), song_path("b"), song_path("a")]);
    }

    #[tokio::test]
    async fn single_song_restarts() {
        let (player, backend) = create_player();
        play_and_load(&player, &backend, "a").await;
        let mut events = player.events();

        backend
            .reporter_for(&song_path("a"))
            .report(PlaybackStatus::finished(3000));
        let restarted = PlayerEvent::TrackChanged {
            song_id: "a".to_string(),
            previous_song_id: Some("a".to_string()),
        };
        wait_for_event(&mut events, |e| *e == restarted).await;

        assert_eq!(backend.opens().len(), 2);
        assert_eq!(backend.reporter_count(), 2);
        assert!(backend.reporter(1).is_current());
        assert!(!backend.reporter(0).is_current());
    }

    #[tokio::test]
    async fn playback_failure_returns_to_empty() {
        let (player, backend) = create_player();
        play_and_load(&player, &backend, "a").await;
        let mut rx = player.subscribe();

        backend
            .reporter_for(&song_path("a"))
            .report(PlaybackStatus::failed("decoder crashed"));
        let session = wait_for_session(&mut rx, |s| s.state() == PlayerState::Empty).await;

        assert_eq!(session.error.as_deref(), Some("decoder crashed"));
        assert!(!player.engine().is_loaded().await);
        assert_eq!(player.playlist().await.len(), 1);
    }
}

mod stop {
    use super::*;

    #[tokio::test]
    async fn stop_preserves_playlist() {
        let (player, backend) = create_player();
        player
            .set_playlist(vec![create_test_song("a"), create_test_song("b")])
            .await;
        play_and_load(&player, &backend, "a").await;

        player.stop_playback().await;

        let session = player.session();
        assert_eq!(session.state(), PlayerState::Empty);
        assert!(session.current_song.is_none());
        assert_eq!(session.position_ms, 0);
        assert_eq!(session.duration_ms, 0);
        assert_eq!(playlist_ids(&player.playlist().await), ["a", "b"]);
        assert!(!player.engine().is_loaded().await);
    }

    #[tokio::test]
    async fn status_after_stop_is_ignored() {
        let (player, backend) = create_player();
        play_and_load(&player, &backend, "a").await;
        let stale = backend.reporter_for(&song_path("a"));

        player.stop_playback().await;
        stale.report(PlaybackStatus::finished(3000));
        tokio::task::yield_now().await;

        assert_eq!(player.state(), PlayerState::Empty);
        assert_eq!(backend.opens().len(), 1);
    }
}

mod supersession {
    use super::*;

    #[tokio::test]
    async fn later_play_wins_and_stale_status_is_not_observed() {
        let (player, backend) = create_player();
        let gate = backend.gate_open(song_path("a"));
        let started = backend.on_open_started();
        let mut rx = player.subscribe();

        let first = {
            let player = player.clone();
            tokio::spawn(async move { player.play_song(create_test_song("a")).await })
        };
        started.notified().await;

        let second = {
            let player = player.clone();
            tokio::spawn(async move { player.play_song(create_test_song("b")).await })
        };
        tokio::task::yield_now().await;
        gate.notify_one();
        first.await.unwrap();
        second.await.unwrap();

        // A's sound was released before B was opened
        assert_eq!(
            backend.calls(),
            vec![
                Call::Open {
                    path: song_path("a"),
                    autoplay: true
                },
                Call::Unload(song_path("a")),
                Call::Open {
                    path: song_path("b"),
                    autoplay: true
                },
            ]
        );
        assert!(player.engine().is_loaded().await);

        // Late callback from A, then B's own report
        backend
            .reporter_for(&song_path("a"))
            .report(PlaybackStatus::loaded(true, 99_999, 99_999));
        backend
            .reporter_for(&song_path("b"))
            .report(PlaybackStatus::loaded(true, 10, 3000));

        let session = wait_for_session(&mut rx, |s| s.state() == PlayerState::ReadyPlaying).await;
        assert_eq!(session.current_song_id(), Some("b"));
        assert_eq!(session.duration_ms, 3000);
        assert_eq!(session.position_ms, 10);
    }
}

mod library {
    use super::*;

    #[tokio::test]
    async fn remove_song_keeps_session() {
        let (player, backend) = create_player();
        player
            .set_playlist(vec![create_test_song("a"), create_test_song("b")])
            .await;
        play_and_load(&player, &backend, "a").await;

        assert!(player.remove_song("a").await);
        assert!(!player.remove_song("a").await);

        assert_eq!(playlist_ids(&player.playlist().await), ["b"]);
        assert_eq!(player.session().current_song_id(), Some("a"));
    }

    #[tokio::test]
    async fn initialize_failure_is_recorded() {
        let (player, backend) = create_player();
        backend.fail_session();

        player.initialize().await;

        let session = player.session();
        assert_eq!(session.state(), PlayerState::Empty);
        assert!(session.error.as_deref().unwrap().contains("initialize audio"));
    }

    #[tokio::test]
    async fn initialize_applies_configured_policy() {
        let (player, backend) = create_player();

        player.initialize().await;

        assert_eq!(
            backend.session_config().as_ref(),
            Some(&player.config().audio_session)
        );
        assert!(player.session().error.is_none());
    }
}
