use slither_core::{HighScoreStore, SlitherConfig, World};
use slither_storage::HighScoreFile;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(tag: &str) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_micros();
    std::env::temp_dir().join(format!(
        "slither_highscore_{tag}_{}_{timestamp}.txt",
        std::process::id()
    ))
}

#[test]
fn missing_file_loads_zero() {
    let path = temp_path("missing");
    let store = HighScoreFile::open(&path);
    assert_eq!(store.read(), 0);
}

#[test]
fn scores_roundtrip_through_the_file() {
    let path = temp_path("roundtrip");
    let mut store = HighScoreFile::open(&path);

    store.write(42).expect("write");
    assert_eq!(store.read(), 42);

    store.record(97);
    assert_eq!(store.load(), 97);

    let _ = fs::remove_file(&path);
}

#[test]
fn corrupt_contents_load_zero() {
    let path = temp_path("corrupt");
    fs::write(&path, "not a score").expect("seed corrupt file");

    let store = HighScoreFile::open(&path);
    assert_eq!(store.read(), 0);

    let _ = fs::remove_file(&path);
}

#[test]
fn world_boots_with_the_persisted_best() {
    let path = temp_path("boot");
    fs::write(&path, "77").expect("seed score file");

    let config = SlitherConfig {
        rng_seed: Some(5),
        ..SlitherConfig::default()
    };
    let store = HighScoreFile::open(&path);
    let world = World::with_store(config, Box::new(store)).expect("world");
    assert_eq!(world.high_score(), 77);

    let _ = fs::remove_file(&path);
}
