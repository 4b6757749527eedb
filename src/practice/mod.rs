// REFCUE Practice Modules
// Copyright (c) 2026 Xing_The_Creator | REFCUE
//
// Clip model shared by the catalog, the playlist builder and the cursor.

pub mod catalog;
pub mod cursor;
pub mod playlist;
pub mod session;
pub mod ui_state;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `{label, value}` pair as consumed by the front-end pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerOption {
    pub label: String,
    pub value: String,
}

/// Practice mode. `Both` runs the receptive clips, then the expressive ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Cue shown, signal expected.
    Expressive,
    /// Signal shown, cue expected.
    Receptive,
    #[default]
    Both,
}

impl Format {
    /// The formats clips can actually be filed under, in playback order for `Both`.
    pub const CONCRETE: [Format; 2] = [Format::Receptive, Format::Expressive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Expressive => "expressive",
            Format::Receptive => "receptive",
            Format::Both => "both",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Format::Expressive => "Expressive",
            Format::Receptive => "Receptive",
            Format::Both => "Both",
        }
    }

    /// Parse a content directory name. `both` is a selection, not a place clips live.
    pub fn from_dir_name(name: &str) -> Option<Format> {
        match name.parse::<Format>() {
            Ok(Format::Both) | Err(_) => None,
            Ok(format) => Some(format),
        }
    }

    /// One entry per playlist pass.
    pub fn passes(&self) -> Vec<Format> {
        match self {
            Format::Both => Format::CONCRETE.to_vec(),
            format => vec![*format],
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expressive" => Ok(Format::Expressive),
            "receptive" => Ok(Format::Receptive),
            "both" => Ok(Format::Both),
            other => Err(format!("Unknown format '{}'", other)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subject area of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Penalties,
    PackStuff,
    JammerStuff,
    Other,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::Penalties,
        Topic::PackStuff,
        Topic::JammerStuff,
        Topic::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Penalties => "penalties",
            Topic::PackStuff => "pack_stuff",
            Topic::JammerStuff => "jammer_stuff",
            Topic::Other => "other",
        }
    }

    /// `pack_stuff` -> `Pack Stuff`
    pub fn label(&self) -> String {
        self.as_str()
            .split('_')
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .iter()
            .find(|topic| topic.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown topic '{}'", s))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional bookend clips around a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeOption {
    Intro,
    Outro,
}

impl PracticeOption {
    pub const ALL: [PracticeOption; 2] = [PracticeOption::Intro, PracticeOption::Outro];

    /// Substring that marks a bookend file name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PracticeOption::Intro => "intro",
            PracticeOption::Outro => "outro",
        }
    }

    pub fn label(&self) -> String {
        format!("Include {}", title_case(self.as_str()))
    }

    pub fn picker(&self) -> PickerOption {
        PickerOption {
            label: self.label(),
            value: self.as_str().to_string(),
        }
    }
}

impl FromStr for PracticeOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intro" => Ok(PracticeOption::Intro),
            "outro" => Ok(PracticeOption::Outro),
            other => Err(format!("Unknown option '{}'", other)),
        }
    }
}

/// One playable media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipDescriptor {
    /// `None` only for outros.
    pub format: Option<Format>,
    /// `None` only for bookends.
    pub topic: Option<Topic>,
    pub name: String,
    pub url: String,
}

impl ClipDescriptor {
    pub fn is_bookend(&self, option: PracticeOption) -> bool {
        self.name.contains(option.as_str())
    }
}

/// The criteria a playlist is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub format: Format,
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub options: Vec<PracticeOption>,
}

impl Selection {
    pub fn new(format: Format, topics: Vec<Topic>, options: Vec<PracticeOption>) -> Self {
        Self {
            format,
            topics,
            options,
        }
    }

    pub fn includes(&self, option: PracticeOption) -> bool {
        self.options.contains(&option)
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
