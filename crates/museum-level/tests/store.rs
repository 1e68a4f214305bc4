//! Loads real level files from disk through the manifest store.

use std::path::Path;

use tempfile::TempDir;

use museum_level::{
    Level, LevelError, LevelStore, Museum, Spawnpoint, encode_level,
};

fn write_level(path: &Path, level: &Level) {
    let file = std::fs::File::create(path).expect("create level file");
    encode_level(level, file).expect("write level");
}

#[test]
fn test_manifest_store_loads_level_files() {
    let dir = TempDir::new().unwrap();
    let level = Level::new(
        8,
        4,
        8,
        Spawnpoint {
            x: 144,
            y: 96,
            z: 144,
            ..Spawnpoint::default()
        },
        vec![1; 8 * 4 * 8],
    )
    .unwrap();
    let level_path = dir.path().join("flat.dat");
    write_level(&level_path, &level);

    let manifest = dir.path().join("manifest.csv");
    std::fs::write(
        &manifest,
        format!("Flat,{},2009-06-01\n", level_path.display()),
    )
    .unwrap();

    let museum = Museum::from_manifest(&manifest).unwrap();
    let descriptor = museum.default_level().unwrap();
    assert_eq!(descriptor.name, "Flat");
    assert_eq!(descriptor.date, "2009-06-01");

    let loaded = museum.load(&descriptor).unwrap();
    assert_eq!(loaded, level);
}

#[test]
fn test_missing_level_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let museum = Museum::from_reader(
        format!("Ghost,{},never\n", dir.path().join("nope.dat").display()).as_bytes(),
    )
    .unwrap();

    let descriptor = museum.lookup("Ghost").unwrap();
    assert!(matches!(museum.load(&descriptor), Err(LevelError::Io(_))));
}

#[test]
fn test_missing_manifest() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Museum::from_manifest(&dir.path().join("manifest.csv")),
        Err(LevelError::Io(_))
    ));
}
