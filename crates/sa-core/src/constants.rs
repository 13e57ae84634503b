/// Learned sound pairs per base set (P)
pub const DEFAULT_PAIRS: usize = 4;

/// Unpaired singleton sounds per base set (X)
pub const DEFAULT_SINGLETONS: usize = 4;

/// Learning images sampled from every minor category (K)
pub const DEFAULT_IMAGES_PER_CATEGORY: usize = 12;

/// Learning trials are split into this many blocks with a rest break between them
pub const DEFAULT_LEARNING_BLOCKS: usize = 2;

/// Image recognition battery chunks
pub const DEFAULT_IMAGE_TEST_BLOCKS: usize = 1;

/// Path prefix for every image identifier: `scenes/<MAJOR>/<minor>/<file>`
pub const IMAGE_ROOT: &str = "scenes";

/// Path prefix for every sound identifier: `sounds/<file>`
pub const SOUND_ROOT: &str = "sounds";

/// Upper bound on a sanitized file-name part, in characters
pub const MAX_NAME_PART_LEN: usize = 50;
