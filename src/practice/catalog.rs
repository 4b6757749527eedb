// REFCUE Clip Catalog
// Copyright (c) 2026 Xing_The_Creator | REFCUE
//
// Scans the content tree once and classifies every file by its path:
//   <format>/<topic>/<clip>   -> practice clip
//   <format>/<..intro..>      -> intro bookend for that format
//   <format>/<any>/<..intro..>   (same, filed one level down, never in a topic folder)
//   <anywhere>/<..outro..>    -> outro bookend
// Anything else is skipped without complaint.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{ClipDescriptor, Format, PickerOption, PracticeOption, Topic};

/// URL prefix the server mounts the content root under.
pub const MEDIA_PREFIX: &str = "/media";

/// Read-only list of every playable clip, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    root: PathBuf,
    clips: Vec<ClipDescriptor>,
}

impl Catalog {
    /// Walk `root` and classify every regular file found.
    ///
    /// A missing or partially unreadable tree yields a smaller (possibly empty)
    /// catalog; it is never an error.
    pub fn scan(root: &Path) -> Self {
        let mut clips = Vec::new();

        if !root.is_dir() {
            warn!("[CATALOG] Content root {:?} is not a directory. Catalog is empty.", root);
            return Self {
                root: root.to_path_buf(),
                clips,
            };
        }

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("[CATALOG] Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = match entry.path().strip_prefix(root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };

            match classify(relative) {
                Some(clip) => clips.push(clip),
                None => debug!("[CATALOG] Unclassified file skipped: {:?}", relative),
            }
        }

        info!("[CATALOG] 📼 Indexed {} clips from {:?}", clips.len(), root);
        Self {
            root: root.to_path_buf(),
            clips,
        }
    }

    /// Build a catalog from already classified clips.
    pub fn from_clips(clips: Vec<ClipDescriptor>) -> Self {
        Self {
            root: PathBuf::new(),
            clips,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn clips(&self) -> &[ClipDescriptor] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn lookup(&self, url: &str) -> Option<&ClipDescriptor> {
        self.clips.iter().find(|clip| clip.url == url)
    }

    /// Topic clips filed under `format` whose topic is one of `topics`, in catalog order.
    pub fn matching(&self, format: Format, topics: &[Topic]) -> Vec<ClipDescriptor> {
        self.clips
            .iter()
            .filter(|clip| {
                clip.format == Some(format)
                    && clip.topic.map_or(false, |topic| topics.contains(&topic))
            })
            .cloned()
            .collect()
    }

    /// First clip whose name carries the intro marker and whose format is `format`.
    pub fn intro_for(&self, format: Format) -> Option<&ClipDescriptor> {
        self.clips
            .iter()
            .find(|clip| clip.is_bookend(PracticeOption::Intro) && clip.format == Some(format))
    }

    /// First clip whose name carries the outro marker, regardless of format.
    pub fn outro(&self) -> Option<&ClipDescriptor> {
        self.clips
            .iter()
            .find(|clip| clip.is_bookend(PracticeOption::Outro))
    }

    /// Concrete formats that have at least one clip, in pass order.
    pub fn formats(&self) -> Vec<Format> {
        Format::CONCRETE
            .into_iter()
            .filter(|format| self.clips.iter().any(|clip| clip.format == Some(*format)))
            .collect()
    }

    /// Topics that have at least one clip.
    pub fn topics(&self) -> Vec<Topic> {
        self.clips
            .iter()
            .filter_map(|clip| clip.topic)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Bookend options that would actually add a clip for `format`.
    pub fn available_options(&self, format: Format) -> Vec<PracticeOption> {
        let mut available = Vec::new();
        if self
            .clips
            .iter()
            .any(|clip| clip.is_bookend(PracticeOption::Intro) && matches_format(clip, format))
        {
            available.push(PracticeOption::Intro);
        }
        if self.outro().is_some() {
            available.push(PracticeOption::Outro);
        }
        available
    }

    /// Format picker entries. `Both` is offered once both concrete formats have content.
    pub fn format_pickers(&self) -> Vec<PickerOption> {
        let formats = self.formats();
        let mut pickers: Vec<PickerOption> = formats
            .iter()
            .map(|format| PickerOption {
                label: format.label().to_string(),
                value: format.as_str().to_string(),
            })
            .collect();
        if formats.len() == Format::CONCRETE.len() {
            pickers.push(PickerOption {
                label: Format::Both.label().to_string(),
                value: Format::Both.as_str().to_string(),
            });
        }
        pickers
    }

    pub fn topic_pickers(&self) -> Vec<PickerOption> {
        self.topics()
            .into_iter()
            .map(|topic| PickerOption {
                label: topic.label(),
                value: topic.as_str().to_string(),
            })
            .collect()
    }
}

fn matches_format(clip: &ClipDescriptor, format: Format) -> bool {
    format == Format::Both || clip.format == Some(format)
}

/// Classify one file by its path relative to the content root.
pub fn classify(relative: &Path) -> Option<ClipDescriptor> {
    let name = relative.file_name()?.to_str()?.to_string();
    let parent = relative.parent().and_then(dir_name);

    let grandparent = relative
        .parent()
        .and_then(Path::parent)
        .and_then(dir_name);

    let (format, topic) = if name.contains(PracticeOption::Intro.as_str()) {
        // A topic folder holds practice clips only
        let format = match parent {
            Some(dir) if dir.parse::<Topic>().is_ok() => None,
            Some(dir) => Format::from_dir_name(dir)
                .or_else(|| grandparent.and_then(Format::from_dir_name)),
            None => None,
        }?;
        (Some(format), None)
    } else if name.contains(PracticeOption::Outro.as_str()) {
        (None, None)
    } else {
        let topic: Topic = parent?.parse().ok()?;
        (Some(Format::from_dir_name(grandparent?)?), Some(topic))
    };

    Some(ClipDescriptor {
        format,
        topic,
        url: media_url(relative)?,
        name,
    })
}

fn dir_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// `expressive/penalties/clip1.mp4` -> `/media/expressive/penalties/clip1.mp4`
pub fn media_url(relative: &Path) -> Option<String> {
    let mut url = String::from(MEDIA_PREFIX);
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                url.push('/');
                url.push_str(part.to_str()?);
            }
            _ => return None,
        }
    }
    Some(url)
}
