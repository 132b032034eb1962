//! Property-based tests for playlist navigation and seek clamping
//!
//! Uses proptest to verify invariants across many random inputs.

use proptest::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;
use tunebox_core::DownloadedSong;
use tunebox_playback::{clamp_position, PlaylistNavigator};

// ===== Helpers =====

fn song(id: &str) -> DownloadedSong {
    DownloadedSong {
        id: id.to_string(),
        title: format!("Song {}", id),
        artist: "Artist".to_string(),
        album: "Album".to_string(),
        cover_image: String::new(),
        file_path: PathBuf::from(format!("/music/{}.mp3", id)),
        download_date: "2024-01-01T00:00:00.000Z".to_string(),
    }
}

/// Ids drawn from a small alphabet so duplicates are common
fn arbitrary_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-h]{1,2}", 0..30)
}

fn navigator(ids: &[String]) -> PlaylistNavigator {
    let mut navigator = PlaylistNavigator::new();
    navigator.replace(ids.iter().map(|id| song(id)).collect());
    navigator
}

// ===== Property Tests =====

proptest! {
    /// Property: the playlist never holds two songs with the same id
    #[test]
    fn replace_never_keeps_duplicates(ids in arbitrary_ids()) {
        let navigator = navigator(&ids);

        let unique: HashSet<_> = navigator.songs().iter().map(|s| s.id.clone()).collect();
        prop_assert_eq!(unique.len(), navigator.len());

        let distinct_input: HashSet<_> = ids.iter().cloned().collect();
        prop_assert_eq!(navigator.len(), distinct_input.len());
    }

    /// Property: next and previous are inverse for every member
    #[test]
    fn next_then_previous_returns_to_start(ids in arbitrary_ids()) {
        let navigator = navigator(&ids);

        for current in navigator.songs() {
            let next = navigator.next(current).expect("members always have a next song");
            let back = navigator.previous(next).expect("members always have a previous song");
            prop_assert_eq!(&back.id, &current.id);
        }
    }

    /// Property: walking `len` steps forward visits every song once and wraps home
    #[test]
    fn full_cycle_visits_every_song(ids in arbitrary_ids()) {
        let navigator = navigator(&ids);
        prop_assume!(!navigator.is_empty());

        let start = navigator.songs()[0].clone();
        let mut current = start.clone();
        let mut visited = HashSet::new();
        for _ in 0..navigator.len() {
            visited.insert(current.id.clone());
            current = navigator.next(&current).unwrap().clone();
        }

        prop_assert_eq!(visited.len(), navigator.len());
        prop_assert_eq!(current.id, start.id);
    }

    /// Property: ensure_member is idempotent and only ever appends
    #[test]
    fn ensure_member_is_idempotent(ids in arbitrary_ids(), extra in "[a-j]{1,2}") {
        let mut navigator = navigator(&ids);
        let before: Vec<_> = navigator.songs().iter().map(|s| s.id.clone()).collect();

        let appended = navigator.ensure_member(song(&extra));
        let after_first: Vec<_> = navigator.songs().iter().map(|s| s.id.clone()).collect();
        prop_assert!(!navigator.ensure_member(song(&extra)));
        let after_second: Vec<_> = navigator.songs().iter().map(|s| s.id.clone()).collect();

        prop_assert_eq!(appended, !before.contains(&extra));
        prop_assert_eq!(&after_first[..before.len()], &before[..]);
        prop_assert_eq!(after_first, after_second);
    }

    /// Property: non-members never have neighbours
    #[test]
    fn non_member_navigation_is_none(ids in arbitrary_ids()) {
        let navigator = navigator(&ids);
        let outsider = song("zzz");

        prop_assert!(navigator.next(&outsider).is_none());
        prop_assert!(navigator.previous(&outsider).is_none());
    }

    /// Property: clamped positions always lie in [0, duration]
    #[test]
    fn clamp_stays_in_bounds(requested in any::<i64>(), duration in 0u64..10_000_000) {
        let clamped = clamp_position(requested, duration);

        prop_assert!(clamped <= duration);
        if requested >= 0 && (requested as u64) <= duration {
            prop_assert_eq!(clamped, requested as u64);
        }
    }
}
