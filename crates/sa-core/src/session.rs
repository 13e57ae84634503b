//! Session timeline: an assignment arranged into the blocks the presentation
//! layer runs, plus the preload manifest.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::assign::{Assignment, AssignWarning};
use crate::constants::{DEFAULT_IMAGE_TEST_BLOCKS, DEFAULT_LEARNING_BLOCKS};
use crate::random::shuffled;
use crate::trial::{ImageRecognitionItem, LearningTrial, SoundRecognitionItem};

/// How many rest-separated blocks each phase is split into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub learning_blocks: usize,
    pub image_test_blocks: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            learning_blocks: DEFAULT_LEARNING_BLOCKS,
            image_test_blocks: DEFAULT_IMAGE_TEST_BLOCKS,
        }
    }
}

/// Files the browser should fetch before the first trial.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preload {
    pub images: Vec<String>,
    pub audio: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub learning_blocks: Vec<Vec<LearningTrial>>,
    pub image_test_blocks: Vec<Vec<ImageRecognitionItem>>,
    pub sound_test: Vec<SoundRecognitionItem>,
    pub preload: Preload,
    #[serde(default)]
    pub warnings: Vec<AssignWarning>,
}

impl SessionPlan {
    /// Learning trials keep their order; the image battery is shuffled into
    /// presentation order before it is chunked.
    pub fn build(assignment: &Assignment, layout: &Layout, rng: &mut impl Rng) -> Self {
        let presentation = shuffled(assignment.image_battery.clone(), rng);

        let mut images = assignment.learning_images.clone();
        images.extend(assignment.new_images().map(str::to_string));

        Self {
            learning_blocks: split_blocks(&assignment.learning_trials, layout.learning_blocks),
            image_test_blocks: split_blocks(&presentation, layout.image_test_blocks),
            sound_test: assignment.sound_battery.clone(),
            preload: Preload {
                images,
                audio: assignment.sound_order.clone(),
            },
            warnings: assignment.warnings.clone(),
        }
    }

    pub fn learning_trial_count(&self) -> usize {
        self.learning_blocks.iter().map(Vec::len).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Split into `count` contiguous chunks whose sizes differ by at most one,
/// larger chunks first. A count of zero is treated as one.
pub fn split_blocks<T: Clone>(items: &[T], count: usize) -> Vec<Vec<T>> {
    let count = count.max(1);
    let base = items.len() / count;
    let extra = items.len() % count;

    let mut blocks = Vec::with_capacity(count);
    let mut start = 0;
    for i in 0..count {
        let len = base + usize::from(i < extra);
        blocks.push(items[start..start + len].to_vec());
        start += len;
    }
    blocks
}
