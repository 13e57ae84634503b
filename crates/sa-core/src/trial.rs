//! Fixed-shape trial records handed to the presentation layer.
//!
//! Field names on the wire follow the timeline variables the browser runtime
//! reads (`sound_pattern`, `correct_response`, `old_pair`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Association pattern of a learning trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// First half of a learned pair
    A,
    /// Second half of a learned pair
    B,
    /// Singleton sound with no partner
    X,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Pattern::A => "A",
            Pattern::B => "B",
            Pattern::X => "X",
        };
        f.write_str(s)
    }
}

/// Response key expected from the participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKey {
    J,
    K,
}

impl ResponseKey {
    pub fn as_char(self) -> char {
        match self {
            ResponseKey::J => 'j',
            ResponseKey::K => 'k',
        }
    }
}

/// Two sounds presented under one shared episodic tag, serialized as `[a, b]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundPair(pub String, pub String);

impl SoundPair {
    pub fn new(first: &str, second: &str) -> Self {
        Self(first.to_string(), second.to_string())
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }

    pub fn contains(&self, sound: &str) -> bool {
        self.0 == sound || self.1 == sound
    }

    /// True if the two pairs have any sound in common.
    pub fn shares_sound_with(&self, other: &SoundPair) -> bool {
        self.contains(&other.0) || self.contains(&other.1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningTrial {
    pub image: String,
    pub sound: String,
    #[serde(rename = "sound_pattern")]
    pub pattern: Pattern,
}

impl LearningTrial {
    pub fn new(image: &str, sound: &str, pattern: Pattern) -> Self {
        Self {
            image: image.to_string(),
            sound: sound.to_string(),
            pattern,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Old,
    New,
}

impl ImageStatus {
    /// `j` = "seen during learning", `k` = "not seen".
    pub fn expected_response(self) -> ResponseKey {
        match self {
            ImageStatus::Old => ResponseKey::J,
            ImageStatus::New => ResponseKey::K,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecognitionItem {
    pub image: String,
    pub status: ImageStatus,
    #[serde(rename = "correct_response")]
    pub expected_response: ResponseKey,
}

impl ImageRecognitionItem {
    pub fn new(image: &str, status: ImageStatus) -> Self {
        Self {
            image: image.to_string(),
            status,
            expected_response: status.expected_response(),
        }
    }
}

/// Which pair occupies a play position in a forced-choice trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairRole {
    Old,
    New,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundRecognitionItem {
    #[serde(rename = "old_pair")]
    pub learned_pair: SoundPair,
    #[serde(rename = "new_pair")]
    pub novel_pair: SoundPair,
    pub presentation_order: [PairRole; 2],
    #[serde(rename = "correct_response")]
    pub expected_response: ResponseKey,
}

impl SoundRecognitionItem {
    pub fn new(learned_pair: SoundPair, novel_pair: SoundPair, order: [PairRole; 2]) -> Self {
        let expected_response = if order[0] == PairRole::Old {
            ResponseKey::J
        } else {
            ResponseKey::K
        };
        Self {
            learned_pair,
            novel_pair,
            presentation_order: order,
            expected_response,
        }
    }

    fn pair_for(&self, role: PairRole) -> &SoundPair {
        match role {
            PairRole::Old => &self.learned_pair,
            PairRole::New => &self.novel_pair,
        }
    }

    /// Pair played first.
    pub fn first_pair(&self) -> &SoundPair {
        self.pair_for(self.presentation_order[0])
    }

    /// Pair played second.
    pub fn second_pair(&self) -> &SoundPair {
        self.pair_for(self.presentation_order[1])
    }
}
