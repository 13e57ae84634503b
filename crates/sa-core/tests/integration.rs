//! Integration tests exercising the full pipeline:
//! raw catalog → assignment → session plan → JSON, across module boundaries.

use std::collections::{BTreeMap, HashSet};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use sa_core::{
    AssignError, AssignWarning, Design, ImageStatus, Layout, Pattern, RawCatalog, ResponseKey,
    SessionPlan, assign,
};

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

const INDOOR: [&str; 5] = ["grocerystore", "library", "restaurant", "kitchen", "gym"];
const OUTDOOR: [&str; 5] = ["castle", "beach", "forest", "desert", "mountain"];
const SYLLABLES: [&str; 58] = [
    "hu", "ri", "go", "ta", "no", "zu", "wa", "ku", "mu", "na", "zi", "do", "ze", "pe", "za", "pu",
    "se", "ko", "ga", "zo", "gu", "me", "po", "te", "bi", "re", "ya", "ba", "da", "ra", "mo", "bo",
    "so", "ha", "hi", "si", "ru", "sa", "nu", "ke", "mi", "gi", "su", "de", "ro", "to", "bu", "ma",
    "pa", "ki", "ti", "pi", "yu", "ho", "he", "ni", "be", "tu",
];

/// Ten minor categories of sixty scenes and fifty-eight syllable sounds.
fn study_catalog() -> RawCatalog {
    let mut images = BTreeMap::new();
    for (major, minors) in [("INDOOR", INDOOR), ("OUTDOOR", OUTDOOR)] {
        let mut table = BTreeMap::new();
        for minor in minors {
            let files = (0..60).map(|i| format!("{minor}_{i:03}.jpg")).collect();
            table.insert(minor.to_string(), files);
        }
        images.insert(major.to_string(), table);
    }
    RawCatalog {
        sounds: SYLLABLES.iter().map(|s| format!("{s}.wav")).collect(),
        images,
    }
}

/// P=4, X=4, K=12 over ten categories: 120 images, ten repetitions of a
/// 12-image base set, nothing left over and no wraparound.
#[test]
fn full_study_sizes() {
    let (images, sounds) = study_catalog().build().unwrap();
    let result = assign(&images, &sounds, &Design::default(), &mut rng()).unwrap();

    assert_eq!(result.learning_images.len(), 120);
    assert_eq!(result.learning_trials.len(), 120);
    assert_eq!(result.repetitions, 10);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    assert_eq!(result.pattern_count(Pattern::A), result.pattern_count(Pattern::B));
    assert_eq!(result.pattern_count(Pattern::A), 4 * 10);
    assert_eq!(result.pattern_count(Pattern::X), 4 * 10);
}

#[test]
fn every_category_contributes_k_images() {
    let (images, sounds) = study_catalog().build().unwrap();
    let result = assign(&images, &sounds, &Design::default(), &mut rng()).unwrap();

    for category in images.categories() {
        let prefix = format!("scenes/{}/{}/", category.major.dir_name(), category.name);
        let count = result
            .learning_images
            .iter()
            .filter(|img| img.starts_with(&prefix))
            .count();
        assert_eq!(count, 12, "category {}", category.label());
    }
}

#[test]
fn recognition_batteries_are_consistent() {
    let (images, sounds) = study_catalog().build().unwrap();
    let result = assign(&images, &sounds, &Design::default(), &mut rng()).unwrap();

    let old: Vec<&str> = result
        .image_battery
        .iter()
        .filter(|i| i.status == ImageStatus::Old)
        .map(|i| i.image.as_str())
        .collect();
    let new: Vec<&str> = result.new_images().collect();
    let old_set: HashSet<&str> = old.iter().copied().collect();
    let new_set: HashSet<&str> = new.iter().copied().collect();

    assert_eq!(old.len(), 120);
    assert_eq!(old_set.len(), 120);
    assert_eq!(new.len(), 120);
    assert_eq!(new_set.len(), 120);
    assert!(old_set.is_disjoint(&new_set));

    for item in &result.image_battery {
        let expected = match item.status {
            ImageStatus::Old => ResponseKey::J,
            ImageStatus::New => ResponseKey::K,
        };
        assert_eq!(item.expected_response, expected);
    }

    let learned: HashSet<_> = result.learned_pairs.iter().collect();
    for item in &result.sound_battery {
        assert!(learned.contains(&item.learned_pair));
        assert!(!item.learned_pair.shares_sound_with(&item.novel_pair));
        let learned_first = item.first_pair() == &item.learned_pair;
        assert_eq!(item.expected_response == ResponseKey::J, learned_first);
    }
    let used: HashSet<&str> = result
        .sound_battery
        .iter()
        .flat_map(|i| [i.novel_pair.first(), i.novel_pair.second()])
        .collect();
    assert_eq!(used.len(), 8, "novel pairs never reuse a sound");
}

#[test]
fn session_plan_halves_learning_phase() {
    let (images, sounds) = study_catalog().build().unwrap();
    let result = assign(&images, &sounds, &Design::default(), &mut rng()).unwrap();
    let plan = SessionPlan::build(&result, &Layout::default(), &mut rng());

    assert_eq!(plan.learning_blocks.len(), 2);
    assert_eq!(plan.learning_blocks[0].len(), 60);
    assert_eq!(plan.learning_blocks[1].len(), 60);
    assert_eq!(plan.image_test_blocks.len(), 1);
    assert_eq!(plan.image_test_blocks[0].len(), 240);
    assert_eq!(plan.sound_test.len(), 4);
    assert_eq!(plan.preload.images.len(), 240);
    assert_eq!(plan.preload.audio.len(), 58);

    let json: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
    let first = &json["learning_blocks"][0][0];
    assert!(first["image"].as_str().unwrap().starts_with("scenes/"));
    assert!(first["sound"].as_str().unwrap().starts_with("sounds/"));
    assert!(["A", "B", "X"].contains(&first["sound_pattern"].as_str().unwrap()));
}

#[test]
fn identical_seed_identical_session() {
    let (images, sounds) = study_catalog().build().unwrap();
    let run = |seed: u64| {
        let mut rng = SmallRng::seed_from_u64(seed);
        let result = assign(&images, &sounds, &Design::default(), &mut rng).unwrap();
        SessionPlan::build(&result, &Layout::default(), &mut rng)
    };
    assert_eq!(run(9), run(9));
    assert_ne!(run(9), run(10));
}

#[test]
fn fixed_ten_repetitions_on_smaller_study_leaves_blocks_unused() {
    let mut raw = study_catalog();
    raw.images.remove("OUTDOOR");
    let (images, sounds) = raw.build().unwrap();
    let design = Design {
        repetitions: Some(10),
        ..Design::default()
    };
    let result = assign(&images, &sounds, &design, &mut rng()).unwrap();
    assert_eq!(result.learning_trials.len(), 60);
    assert!(
        !result
            .warnings
            .iter()
            .any(|w| matches!(w, AssignWarning::SizingMismatch { .. }))
    );
}

#[test]
fn short_reserved_pool_aborts_before_any_trial() {
    let mut raw = study_catalog();
    raw.sounds.truncate(14);
    let (images, sounds) = raw.build().unwrap();
    let err = assign(&images, &sounds, &Design::default(), &mut rng()).unwrap_err();
    assert_eq!(
        err,
        AssignError::InsufficientReservedSounds {
            available: 2,
            requested: 8
        }
    );
    assert_eq!(err.to_string(), "2 reserved sounds left, novel pairs need 8");
}

#[test]
fn catalog_parses_from_json_shape() {
    let json = r#"{
        "sounds": ["hu.wav"],
        "images": { "indoor": { "gym": ["gym3.jpg"] } }
    }"#;
    let raw: RawCatalog = serde_json::from_str(json).unwrap();
    let (images, sounds) = raw.build().unwrap();
    assert_eq!(
        images.all_images().next().unwrap(),
        "scenes/INDOOR/gym/gym3.jpg"
    );
    assert_eq!(sounds.sounds(), ["sounds/hu.wav".to_string()]);
}
