//! Stimulus assignment: partitions the catalogs into learning material and the
//! two recognition batteries.
//!
//! Randomness is consumed in a fixed order (sound shuffle, per-category image
//! samples, image shuffle, block shuffle, distractor sample, pair shuffles,
//! per-trial play orders), so a seeded generator reproduces a session exactly.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::catalog::{ImageCatalog, SoundCatalog};
use crate::constants::{DEFAULT_IMAGES_PER_CATEGORY, DEFAULT_PAIRS, DEFAULT_SINGLETONS};
use crate::random::{sample_without_replacement, shuffled};
use crate::trial::{
    ImageRecognitionItem, ImageStatus, LearningTrial, PairRole, Pattern, SoundPair,
    SoundRecognitionItem,
};

/// Design constants of one study.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Design {
    /// Learned sound pairs (P)
    pub pairs: usize,
    /// Singleton sounds (X)
    pub singletons: usize,
    /// Images sampled per minor category (K)
    pub images_per_category: usize,
    /// Fixed number of base-set repetitions. `None` sizes the block sequence
    /// to cover every learning image.
    pub repetitions: Option<usize>,
}

impl Default for Design {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_PAIRS,
            singletons: DEFAULT_SINGLETONS,
            images_per_category: DEFAULT_IMAGES_PER_CATEGORY,
            repetitions: None,
        }
    }
}

impl Design {
    /// Images consumed by one pass over the base set: two per pair, one per singleton.
    pub fn images_per_base_set(&self) -> usize {
        2 * self.pairs + self.singletons
    }

    /// Sounds drawn for the learning phase (roles A, B and singleton).
    pub fn learning_sounds(&self) -> usize {
        2 * self.pairs + self.singletons
    }

    /// Base-set repetitions needed to cover `images` learning images.
    pub fn repetitions_for(&self, images: usize) -> usize {
        match self.repetitions {
            Some(n) => n,
            None => match self.images_per_base_set() {
                0 => 0,
                per_set => images.div_ceil(per_set),
            },
        }
    }
}

/// Configuration errors. All are fatal and raised before any trial exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    InsufficientImages {
        category: String,
        available: usize,
        requested: usize,
    },
    InsufficientDistractors {
        available: usize,
        requested: usize,
    },
    InsufficientSounds {
        available: usize,
        requested: usize,
    },
    InsufficientReservedSounds {
        available: usize,
        requested: usize,
    },
    EmptyDesign,
    /// A fixed repetition count larger than the number of learning images,
    /// so whole base sets could never receive an image.
    ExcessiveRepetitions {
        repetitions: usize,
        images: usize,
    },
}

impl fmt::Display for AssignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignError::InsufficientImages {
                category,
                available,
                requested,
            } => write!(
                f,
                "category {category} has {available} images, {requested} requested"
            ),
            AssignError::InsufficientDistractors {
                available,
                requested,
            } => write!(
                f,
                "only {available} unused images for {requested} new recognition items"
            ),
            AssignError::InsufficientSounds {
                available,
                requested,
            } => write!(
                f,
                "sound catalog has {available} sounds, learning phase needs {requested}"
            ),
            AssignError::InsufficientReservedSounds {
                available,
                requested,
            } => write!(
                f,
                "{available} reserved sounds left, novel pairs need {requested}"
            ),
            AssignError::EmptyDesign => {
                write!(f, "design has no trial blocks but learning images exist")
            }
            AssignError::ExcessiveRepetitions {
                repetitions,
                images,
            } => write!(
                f,
                "{repetitions} repetitions requested for only {images} learning images"
            ),
        }
    }
}

impl std::error::Error for AssignError {}

/// Non-fatal conditions surfaced with the assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignWarning {
    /// The shuffled block sequence ran out before the images did and wrapped.
    SizingMismatch { blocks: usize, images: usize },
    /// The last paired block had a single image left and emitted only its A trial.
    TruncatedPair { image: String },
}

impl fmt::Display for AssignWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignWarning::SizingMismatch { blocks, images } => write!(
                f,
                "{blocks} trial blocks cannot cover {images} learning images; wrapped to the start"
            ),
            AssignWarning::TruncatedPair { image } => {
                write!(f, "paired block cut short after A trial for {image}")
            }
        }
    }
}

/// Everything one session needs, built once and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub learning_trials: Vec<LearningTrial>,
    /// Learning images in their shuffled consumption order
    pub learning_images: Vec<String>,
    pub learned_pairs: Vec<SoundPair>,
    pub singleton_sounds: Vec<String>,
    /// Old items followed by new items; presentation order is the caller's
    pub image_battery: Vec<ImageRecognitionItem>,
    pub sound_battery: Vec<SoundRecognitionItem>,
    /// The full sound catalog in shuffled order
    pub sound_order: Vec<String>,
    pub repetitions: usize,
    pub warnings: Vec<AssignWarning>,
}

impl Assignment {
    pub fn pattern_count(&self, pattern: Pattern) -> usize {
        self.learning_trials
            .iter()
            .filter(|t| t.pattern == pattern)
            .count()
    }

    /// Images sampled as "new" recognition items.
    pub fn new_images(&self) -> impl Iterator<Item = &str> {
        self.image_battery
            .iter()
            .filter(|item| item.status == ImageStatus::New)
            .map(|item| item.image.as_str())
    }
}

/// Check every size constraint up front so nothing is generated for an
/// inconsistent configuration.
pub fn validate(
    images: &ImageCatalog,
    sounds: &SoundCatalog,
    design: &Design,
) -> Result<(), AssignError> {
    let learning_sounds = design.learning_sounds();
    if sounds.len() < learning_sounds {
        return Err(AssignError::InsufficientSounds {
            available: sounds.len(),
            requested: learning_sounds,
        });
    }
    let reserved = sounds.len() - learning_sounds;
    if reserved < 2 * design.pairs {
        return Err(AssignError::InsufficientReservedSounds {
            available: reserved,
            requested: 2 * design.pairs,
        });
    }

    for category in images.categories() {
        if category.images.len() < design.images_per_category {
            return Err(AssignError::InsufficientImages {
                category: category.label(),
                available: category.images.len(),
                requested: design.images_per_category,
            });
        }
    }

    let learning = design.images_per_category * images.categories().len();
    if learning > 0 && (design.images_per_base_set() == 0 || design.repetitions == Some(0)) {
        return Err(AssignError::EmptyDesign);
    }
    if let Some(repetitions) = design.repetitions
        && learning > 0
    {
        block_count(repetitions, design.images_per_base_set(), learning)?;
    }
    let unused = images.len() - learning;
    if unused < learning {
        return Err(AssignError::InsufficientDistractors {
            available: unused,
            requested: learning,
        });
    }
    Ok(())
}

/// Assign catalogs to learning trials and recognition batteries.
pub fn assign(
    images: &ImageCatalog,
    sounds: &SoundCatalog,
    design: &Design,
    rng: &mut impl Rng,
) -> Result<Assignment, AssignError> {
    validate(images, sounds, design)?;

    let sound_order = shuffled(sounds.sounds().to_vec(), rng);
    let (roles, reserved) = sound_order.split_at(design.learning_sounds());
    let (role_a, rest) = roles.split_at(design.pairs);
    let (role_b, singleton_sounds) = rest.split_at(design.pairs);
    let learned_pairs: Vec<SoundPair> = role_a
        .iter()
        .zip(role_b)
        .map(|(a, b)| SoundPair::new(a, b))
        .collect();

    let mut learning_images =
        Vec::with_capacity(design.images_per_category * images.categories().len());
    for category in images.categories() {
        let sampled = sample_without_replacement(&category.images, design.images_per_category, rng)
            .ok_or_else(|| AssignError::InsufficientImages {
                category: category.label(),
                available: category.images.len(),
                requested: design.images_per_category,
            })?;
        learning_images.extend(sampled);
    }
    let learning_images = shuffled(learning_images, rng);

    let sequence = build_learning_trials(
        &learning_images,
        &learned_pairs,
        singleton_sounds,
        design.repetitions,
        rng,
    )?;
    let image_battery = build_image_battery(images, &learning_images, rng)?;
    let sound_battery = build_sound_battery(&learned_pairs, reserved, rng)?;

    Ok(Assignment {
        learning_trials: sequence.trials,
        learning_images,
        learned_pairs,
        singleton_sounds: singleton_sounds.to_vec(),
        image_battery,
        sound_battery,
        sound_order,
        repetitions: sequence.repetitions,
        warnings: sequence.warnings,
    })
}

/// Total blocks for `repetitions` copies of a base set of `per_set` blocks.
/// Each repetition holds at least one image, so more repetitions than images
/// is rejected before anything is allocated.
fn block_count(repetitions: usize, per_set: usize, images: usize) -> Result<usize, AssignError> {
    let excessive = AssignError::ExcessiveRepetitions {
        repetitions,
        images,
    };
    if repetitions > images {
        return Err(excessive);
    }
    repetitions.checked_mul(per_set).ok_or(excessive)
}

#[derive(Clone, Copy)]
enum Block<'a> {
    Paired(&'a SoundPair),
    Singleton(&'a str),
}

/// Learning trials plus the bookkeeping of how they were laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningSequence {
    pub trials: Vec<LearningTrial>,
    pub repetitions: usize,
    pub warnings: Vec<AssignWarning>,
}

/// Lay learning images onto a shuffled, repeated sequence of trial blocks.
pub fn build_learning_trials(
    learning_images: &[String],
    pairs: &[SoundPair],
    singletons: &[String],
    repetitions: Option<usize>,
    rng: &mut impl Rng,
) -> Result<LearningSequence, AssignError> {
    if learning_images.is_empty() {
        return Ok(LearningSequence {
            trials: Vec::new(),
            repetitions: 0,
            warnings: Vec::new(),
        });
    }
    let per_set = 2 * pairs.len() + singletons.len();
    let repetitions = repetitions.unwrap_or_else(|| learning_images.len().div_ceil(per_set.max(1)));
    if per_set == 0 || repetitions == 0 {
        return Err(AssignError::EmptyDesign);
    }

    let base: Vec<Block<'_>> = pairs
        .iter()
        .map(Block::Paired)
        .chain(singletons.iter().map(|s| Block::Singleton(s.as_str())))
        .collect();
    let capacity = block_count(repetitions, base.len(), learning_images.len())?;
    let mut blocks = Vec::with_capacity(capacity);
    for _ in 0..repetitions {
        blocks.extend_from_slice(&base);
    }
    blocks.shuffle(rng);

    let mut trials = Vec::with_capacity(learning_images.len());
    let mut warnings = Vec::new();
    let mut images = learning_images.iter();
    let mut cursor = 0;
    let mut wrapped = false;

    while images.len() > 0 {
        if cursor == blocks.len() {
            cursor = 0;
            if !wrapped {
                wrapped = true;
                warnings.push(AssignWarning::SizingMismatch {
                    blocks: blocks.len(),
                    images: learning_images.len(),
                });
            }
        }
        let block = blocks[cursor];
        cursor += 1;

        match block {
            Block::Paired(pair) => {
                let Some(first) = images.next() else { break };
                trials.push(LearningTrial::new(first, pair.first(), Pattern::A));
                match images.next() {
                    Some(second) => {
                        trials.push(LearningTrial::new(second, pair.second(), Pattern::B))
                    }
                    None => warnings.push(AssignWarning::TruncatedPair {
                        image: first.clone(),
                    }),
                }
            }
            Block::Singleton(sound) => {
                let Some(image) = images.next() else { break };
                trials.push(LearningTrial::new(image, sound, Pattern::X));
            }
        }
    }

    Ok(LearningSequence {
        trials,
        repetitions,
        warnings,
    })
}

/// Old items for every learning image, then an equal number of new items
/// sampled from the images never chosen for learning.
pub fn build_image_battery(
    catalog: &ImageCatalog,
    learning_images: &[String],
    rng: &mut impl Rng,
) -> Result<Vec<ImageRecognitionItem>, AssignError> {
    let learned: HashSet<&str> = learning_images.iter().map(String::as_str).collect();
    let unused: Vec<&String> = catalog
        .all_images()
        .filter(|image| !learned.contains(image.as_str()))
        .collect();
    let new_images = sample_without_replacement(&unused, learning_images.len(), rng).ok_or(
        AssignError::InsufficientDistractors {
            available: unused.len(),
            requested: learning_images.len(),
        },
    )?;

    let mut items = Vec::with_capacity(learning_images.len() * 2);
    items.extend(
        learning_images
            .iter()
            .map(|image| ImageRecognitionItem::new(image, ImageStatus::Old)),
    );
    items.extend(
        new_images
            .into_iter()
            .map(|image| ImageRecognitionItem::new(image, ImageStatus::New)),
    );
    Ok(items)
}

/// Forced-choice trials: each learned pair against a novel pair built from
/// the reserved sounds, in a random play order.
pub fn build_sound_battery(
    learned_pairs: &[SoundPair],
    reserved: &[String],
    rng: &mut impl Rng,
) -> Result<Vec<SoundRecognitionItem>, AssignError> {
    let needed = 2 * learned_pairs.len();
    if reserved.len() < needed {
        return Err(AssignError::InsufficientReservedSounds {
            available: reserved.len(),
            requested: needed,
        });
    }

    let novel_pairs: Vec<SoundPair> = reserved[..needed]
        .chunks_exact(2)
        .map(|chunk| SoundPair::new(&chunk[0], &chunk[1]))
        .collect();
    let learned = shuffled(learned_pairs.to_vec(), rng);
    let novel = shuffled(novel_pairs, rng);

    Ok(learned
        .into_iter()
        .zip(novel)
        .map(|(learned_pair, novel_pair)| {
            let mut order = [PairRole::Old, PairRole::New];
            order.shuffle(rng);
            SoundRecognitionItem::new(learned_pair, novel_pair, order)
        })
        .collect())
}
