mod common;

use chrono::NaiveDate;
use importer::{Diagnostic, DirectoryImportOptions, FileOutcome, import_directory};
use storage::dto::leaderboard::LeaderboardFilter;
use storage::models::RatingCategory;
use storage::services::leaderboard::build_leaderboard;
use storage::MemoryStore;
use tempfile::TempDir;

fn archive() -> TempDir {
    let dir = TempDir::new().unwrap();
    common::write_january_file(&dir.path().join("rating_2024-01-15.xlsx")).unwrap();

    let nested = dir.path().join("2024");
    std::fs::create_dir(&nested).unwrap();
    common::write_february_file(&nested.join("15.02.2024_rating.xlsx")).unwrap();

    std::fs::write(dir.path().join("notes.xlsx"), b"").unwrap();
    std::fs::write(dir.path().join("readme.txt"), b"").unwrap();
    dir
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_directory_import_end_to_end() {
    let dir = archive();
    let store = MemoryStore::new();
    let options = DirectoryImportOptions {
        directory: dir.path().to_path_buf(),
        dry_run: false,
    };

    let report = import_directory(&store, &options).await.unwrap();

    assert_eq!(report.totals.files_seen, 3);
    assert_eq!(report.totals.files_imported, 2);
    assert_eq!(report.totals.files_skipped, 1);
    assert!(!report.has_failures());

    // Oldest first, undated last.
    assert_eq!(report.files[0].filename, "rating_2024-01-15.xlsx");
    assert_eq!(report.files[1].filename, "15.02.2024_rating.xlsx");
    assert_eq!(report.files[2].filename, "notes.xlsx");
    assert_eq!(
        report.files[2].diagnostics,
        vec![Diagnostic::UndatedFile {
            filename: "notes.xlsx".to_string()
        }]
    );

    let january = &report.files[0];
    let FileOutcome::Imported { stats } = &january.outcome else {
        panic!("january file was not imported: {:?}", january.outcome);
    };
    assert_eq!(stats.players_created, 7);
    assert_eq!(stats.snapshots_created, 8);
    assert!(january.diagnostics.contains(&Diagnostic::UnmappedSheet {
        sheet: "Лист1".to_string()
    }));
    let missing = january.diagnostics.iter().find_map(|d| match d {
        Diagnostic::MissingCategories { missing, .. } => Some(missing.clone()),
        _ => None,
    });
    assert_eq!(
        missing,
        Some(vec![RatingCategory::MenMixed, RatingCategory::JuniorFemale])
    );

    let FileOutcome::Imported { stats } = &report.files[1].outcome else {
        panic!("february file was not imported");
    };
    assert_eq!(stats.players_created, 1);
    assert_eq!(stats.players_updated, 1);
    assert_eq!(stats.snapshots_created, 3);

    assert_eq!(store.player_count(), 8);
    assert_eq!(store.snapshot_count(), 11);
    assert_eq!(store.source_file_count(), 2);

    let ivanov = store.player(101).unwrap();
    assert_eq!(ivanov.city, "Москва");
    assert_eq!(ivanov.birth_date, Some(date(1990, 2, 1)));
    assert_eq!(store.player(103).unwrap().last_name, "Сидоров-Белый");

    let orlov = store.player(301).unwrap();
    assert_eq!(orlov.middle_name, "Игоревич");
    let orlov_snapshots = store.snapshots_for(301);
    assert_eq!(orlov_snapshots.len(), 1);
    assert_eq!(orlov_snapshots[0].rating, 800);
    assert_eq!(orlov_snapshots[0].tournaments_52_weeks, 3);

    // Smirnova plays two categories under one identity.
    assert_eq!(store.snapshots_for(201).len(), 2);
}

#[tokio::test]
async fn test_directory_import_is_idempotent() {
    let dir = archive();
    let store = MemoryStore::new();
    let options = DirectoryImportOptions {
        directory: dir.path().to_path_buf(),
        dry_run: false,
    };

    import_directory(&store, &options).await.unwrap();
    let second = import_directory(&store, &options).await.unwrap();

    assert_eq!(second.totals.files_already_recorded, 2);
    assert_eq!(second.totals.stats.players_created, 0);
    assert_eq!(second.totals.stats.snapshots_created, 0);
    assert_eq!(store.snapshot_count(), 11);
}

#[tokio::test]
async fn test_directory_dry_run_stores_nothing() {
    let dir = archive();
    let store = MemoryStore::new();
    let options = DirectoryImportOptions {
        directory: dir.path().to_path_buf(),
        dry_run: true,
    };

    let report = import_directory(&store, &options).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.totals.stats.snapshots_created, 11);
    assert_eq!(store.player_count(), 0);
    assert_eq!(store.snapshot_count(), 0);
    assert_eq!(store.source_file_count(), 0);
}

#[tokio::test]
async fn test_leaderboard_after_import() {
    let dir = archive();
    let store = MemoryStore::new();
    import_directory(
        &store,
        &DirectoryImportOptions {
            directory: dir.path().to_path_buf(),
            dry_run: false,
        },
    )
    .await
    .unwrap();

    let leaderboard = build_leaderboard(&store, &LeaderboardFilter::default())
        .await
        .unwrap();

    let men = &leaderboard["MD"];
    assert_eq!(men.rating_date, Some(date(2024, 2, 15)));
    let ranked: Vec<(i64, i64)> = men.results.iter().map(|e| (e.external_id, e.rank)).collect();
    assert_eq!(ranked, vec![(103, 1), (104, 2), (101, 2)]);

    // Categories keep their own latest date.
    assert_eq!(leaderboard["JM"].rating_date, Some(date(2024, 1, 15)));
    assert_eq!(leaderboard["MMX"].rating_date, None);
    assert_eq!(leaderboard["MMX"].total, 0);

    let filtered = build_leaderboard(
        &store,
        &LeaderboardFilter {
            search: Some("иванов".to_string()),
            category: Some(RatingCategory::MenDoubles),
        },
    )
    .await
    .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered["MD"].total, 1);
    assert_eq!(filtered["MD"].results[0].rank, 2);
}
