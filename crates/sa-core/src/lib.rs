//! Stimulus assignment for an audiovisual associative-memory study.
//!
//! Partitions an image catalog (indoor/outdoor scenes by sub-category) and a
//! sound catalog into learning trials under three association patterns
//! (A/B halves of a learned pair, X singletons), an old/new image recognition
//! battery and a two-alternative forced-choice sound-pair battery.
//!
//! No I/O: a pure function of the catalogs and a random source.

pub mod assign;
pub mod catalog;
pub mod constants;
pub mod naming;
pub mod random;
pub mod session;
pub mod time;
pub mod trial;

pub use assign::{
    AssignError, AssignWarning, Assignment, Design, LearningSequence, assign,
    build_image_battery, build_learning_trials, build_sound_battery, validate,
};
pub use catalog::{
    CatalogError, ImageCatalog, MajorCategory, MinorCategory, RawCatalog, SoundCatalog,
};
pub use constants::{
    DEFAULT_IMAGES_PER_CATEGORY, DEFAULT_LEARNING_BLOCKS, DEFAULT_PAIRS, DEFAULT_SINGLETONS,
};
pub use naming::{default_result_name, result_filename, sanitize_file_name_part};
pub use session::{Layout, Preload, SessionPlan, split_blocks};
pub use trial::{
    ImageRecognitionItem, ImageStatus, LearningTrial, PairRole, Pattern, ResponseKey, SoundPair,
    SoundRecognitionItem,
};
