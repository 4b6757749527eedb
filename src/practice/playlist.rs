// REFCUE Playlist Builder
// Copyright (c) 2026 Xing_The_Creator | REFCUE

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::catalog::Catalog;
use super::{ClipDescriptor, PracticeOption, Selection};

/// Build the ordered clip list for one practice session.
///
/// One pass per format (`Both` means receptive, then expressive). Each pass is
/// the matching clips in random order, headed by that format's intro when
/// requested. The outro, when requested, closes the whole list once.
///
/// Never fails: an empty topic set simply yields an empty or intro-only list.
pub fn build_playlist<R: Rng + ?Sized>(
    catalog: &Catalog,
    selection: &Selection,
    rng: &mut R,
) -> Vec<ClipDescriptor> {
    let mut playlist = Vec::new();

    for format in selection.format.passes() {
        if selection.includes(PracticeOption::Intro) {
            if let Some(intro) = catalog.intro_for(format) {
                playlist.push(intro.clone());
            }
        }

        let mut clips = catalog.matching(format, &selection.topics);
        clips.shuffle(rng);
        playlist.extend(clips);
    }

    if selection.includes(PracticeOption::Outro) {
        if let Some(outro) = catalog.outro() {
            playlist.push(outro.clone());
        }
    }

    debug!(
        "[PLAYLIST] Built {} clips for {} / {:?} / {:?}",
        playlist.len(),
        selection.format,
        selection.topics,
        selection.options
    );
    playlist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::{Format, Topic};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn clip(format: Option<Format>, topic: Option<Topic>, name: &str) -> ClipDescriptor {
        let dir = match (format, topic) {
            (Some(f), Some(t)) => format!("{}/{}", f, t),
            (Some(f), None) => f.to_string(),
            _ => "_".to_string(),
        };
        ClipDescriptor {
            format,
            topic,
            name: name.to_string(),
            url: format!("/media/{}/{}", dir, name),
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_clips(vec![
            clip(Some(Format::Expressive), Some(Topic::Penalties), "e_pen_1.mp4"),
            clip(Some(Format::Expressive), Some(Topic::Penalties), "e_pen_2.mp4"),
            clip(Some(Format::Expressive), Some(Topic::PackStuff), "e_pack_1.mp4"),
            clip(Some(Format::Expressive), Some(Topic::Other), "e_other_1.mp4"),
            clip(Some(Format::Receptive), Some(Topic::Penalties), "r_pen_1.mp4"),
            clip(Some(Format::Receptive), Some(Topic::JammerStuff), "r_jam_1.mp4"),
            clip(Some(Format::Expressive), None, "intro_e.mp4"),
            clip(Some(Format::Receptive), None, "intro_r.mp4"),
            clip(None, None, "outro.mp4"),
        ])
    }

    fn names(playlist: &[ClipDescriptor]) -> Vec<&str> {
        playlist.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_scenario_single_match_with_bookends() {
        let catalog = Catalog::from_clips(vec![
            clip(Some(Format::Expressive), Some(Topic::Penalties), "clip1.mp4"),
            clip(Some(Format::Receptive), Some(Topic::Penalties), "clip2.mp4"),
            clip(Some(Format::Expressive), None, "intro.mp4"),
            clip(None, None, "outro.mp4"),
        ]);
        let selection = Selection::new(
            Format::Expressive,
            vec![Topic::Penalties],
            vec![PracticeOption::Intro, PracticeOption::Outro],
        );
        let playlist = build_playlist(&catalog, &selection, &mut StdRng::seed_from_u64(7));
        assert_eq!(names(&playlist), vec!["intro.mp4", "clip1.mp4", "outro.mp4"]);
    }

    #[test]
    fn test_every_clip_matches_selection() {
        let catalog = catalog();
        let selection = Selection::new(
            Format::Expressive,
            vec![Topic::Penalties, Topic::Other],
            vec![],
        );
        let playlist = build_playlist(&catalog, &selection, &mut StdRng::seed_from_u64(1));
        assert_eq!(playlist.len(), 3);
        for clip in &playlist {
            assert_eq!(clip.format, Some(Format::Expressive));
            assert!(selection.topics.contains(&clip.topic.unwrap()));
        }
    }

    #[test]
    fn test_both_runs_receptive_then_expressive() {
        let catalog = catalog();
        let selection = Selection::new(
            Format::Both,
            Topic::ALL.to_vec(),
            vec![PracticeOption::Intro, PracticeOption::Outro],
        );
        let playlist = build_playlist(&catalog, &selection, &mut StdRng::seed_from_u64(3));

        // intro_r, 2 receptive, intro_e, 4 expressive, outro
        assert_eq!(playlist.len(), 9);
        assert_eq!(playlist[0].name, "intro_r.mp4");
        assert_eq!(playlist[3].name, "intro_e.mp4");
        assert_eq!(playlist.last().unwrap().name, "outro.mp4");

        let body: Vec<Format> = playlist[..playlist.len() - 1]
            .iter()
            .filter_map(|c| c.format)
            .collect();
        let first_expressive = body.iter().position(|f| *f == Format::Expressive).unwrap();
        assert!(body[..first_expressive].iter().all(|f| *f == Format::Receptive));
        assert!(body[first_expressive..].iter().all(|f| *f == Format::Expressive));

        let outros = playlist.iter().filter(|c| c.name == "outro.mp4").count();
        assert_eq!(outros, 1);
    }

    #[test]
    fn test_missing_bookends_are_skipped() {
        let catalog = Catalog::from_clips(vec![clip(
            Some(Format::Receptive),
            Some(Topic::Penalties),
            "r.mp4",
        )]);
        let selection = Selection::new(
            Format::Receptive,
            vec![Topic::Penalties],
            vec![PracticeOption::Intro, PracticeOption::Outro],
        );
        let playlist = build_playlist(&catalog, &selection, &mut rand::thread_rng());
        assert_eq!(names(&playlist), vec!["r.mp4"]);
    }

    #[test]
    fn test_empty_topics_keeps_intro_only() {
        let catalog = catalog();
        let bare = Selection::new(Format::Expressive, vec![], vec![]);
        assert!(build_playlist(&catalog, &bare, &mut rand::thread_rng()).is_empty());

        let with_intro = Selection::new(Format::Expressive, vec![], vec![PracticeOption::Intro]);
        let playlist = build_playlist(&catalog, &with_intro, &mut rand::thread_rng());
        assert_eq!(names(&playlist), vec!["intro_e.mp4"]);
    }

    #[test]
    fn test_rebuild_keeps_the_same_set() {
        let catalog = catalog();
        let selection = Selection::new(Format::Both, Topic::ALL.to_vec(), vec![]);
        let first: HashSet<String> =
            build_playlist(&catalog, &selection, &mut StdRng::seed_from_u64(11))
                .into_iter()
                .map(|c| c.url)
                .collect();
        let second: HashSet<String> =
            build_playlist(&catalog, &selection, &mut StdRng::seed_from_u64(12))
                .into_iter()
                .map(|c| c.url)
                .collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }
}
