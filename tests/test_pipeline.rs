//! Integration tests for the EDA pipeline: loading, cleaning, and persistence

use std::io::Write;
use titanic_eda::cleaning::{Cleaner, NO_PREFIX};
use titanic_eda::loader::{DataLoader, DataSaver};
use titanic_eda::pipeline::{run, PipelineConfig};
use titanic_eda::plots::{category_counts, survival_rates};

fn write_train_csv(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("train.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked"
    )
    .unwrap();
    writeln!(file, "1,0,1,\"Smith, Mr. John\",male,,1,0,A/5 21171,7.25,,").unwrap();
    writeln!(file, "2,1,1,\"Brown, Dr. James\",male,40,0,0,17463,51.86,C85,S").unwrap();
    writeln!(
        file,
        "3,1,3,\"Heikkinen, Miss. Laina\",female,26,0,0,STON/O2. 3101282,7.92,,S"
    )
    .unwrap();
    writeln!(file, "4,0,3,\"Palsson, Mrs. Anna\",female,29,2,1,349909,21.07,,C").unwrap();
    writeln!(file, "5,0,3,\"Moran, Mr. James\",male,27,0,0,330877,8.46,,Q").unwrap();
    path
}

// ============================================================================
// Load -> Clean -> Save
// ============================================================================

#[test]
fn test_load_clean_save_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = write_train_csv(dir.path());

    let loader = DataLoader::new();
    let raw = loader.load_csv(&data_path).unwrap();
    assert_eq!(raw.height(), 5);
    assert_eq!(raw.width(), 12);

    let cleaned = Cleaner::new().clean(&raw).unwrap();
    assert_eq!(cleaned.height(), raw.height());
    // Five derived columns on top of the raw twelve.
    assert_eq!(cleaned.width(), 17);

    let out_path = dir.path().join("titanic_cleaned.csv");
    DataSaver::save_csv(&mut cleaned.clone(), &out_path).unwrap();

    let reloaded = loader.load_csv(&out_path).unwrap();
    assert_eq!(reloaded.height(), cleaned.height());
    assert_eq!(reloaded.width(), cleaned.width());
}

#[test]
fn test_cleaning_scenario_from_loaded_csv() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = write_train_csv(dir.path());

    let raw = DataLoader::new().load_csv(&data_path).unwrap();
    let cleaned = Cleaner::new().clean(&raw).unwrap();

    // The Smith row: missing age filled from the (1, male) partition whose
    // only known age is 40.
    let age = cleaned.column("Age").unwrap().f64().unwrap();
    assert_eq!(age.get(0), Some(40.0));
    // Known ages are untouched.
    assert_eq!(age.get(1), Some(40.0));
    assert_eq!(age.get(2), Some(26.0));

    let titles = cleaned.column("Title").unwrap().str().unwrap();
    assert_eq!(titles.get(0), Some("Mr"));
    assert_eq!(titles.get(2), Some("Miss"));

    let family = cleaned.column("FamilySize").unwrap().i64().unwrap();
    let alone = cleaned.column("IsAlone").unwrap().i64().unwrap();
    assert_eq!(family.get(0), Some(2));
    assert_eq!(alone.get(0), Some(0));
    assert_eq!(family.get(4), Some(1));
    assert_eq!(alone.get(4), Some(1));

    let prefix = cleaned.column("TicketPrefix").unwrap().str().unwrap();
    assert_eq!(prefix.get(0), Some("A"));
    assert_eq!(prefix.get(1), Some(NO_PREFIX));

    let has_cabin = cleaned.column("HasCabin").unwrap().i64().unwrap();
    assert_eq!(has_cabin.get(0), Some(0));
    assert_eq!(has_cabin.get(1), Some(1));

    // The only missing port gets the global mode "S" (2 of 4 known ports).
    let embarked = cleaned.column("Embarked").unwrap().str().unwrap();
    assert_eq!(embarked.get(0), Some("S"));
}

// ============================================================================
// Aggregations over the cleaned table
// ============================================================================

#[test]
fn test_aggregations_over_cleaned_table() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = write_train_csv(dir.path());

    let raw = DataLoader::new().load_csv(&data_path).unwrap();
    let cleaned = Cleaner::new().clean(&raw).unwrap();

    let counts = category_counts(&cleaned, "Pclass").unwrap();
    assert_eq!(
        counts,
        vec![("1".to_string(), 2), ("3".to_string(), 3)]
    );

    let rates = survival_rates(&cleaned, "Sex").unwrap();
    // female: 1/2 survived, male: 1/3.
    assert_eq!(rates[0].0, "female");
    assert!((rates[0].1 - 0.5).abs() < 1e-12);
    assert_eq!(rates[1].0, "male");
    assert!((rates[1].1 - 1.0 / 3.0).abs() < 1e-12);
}

// ============================================================================
// Full pipeline
// ============================================================================

#[test]
fn test_full_pipeline_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = write_train_csv(dir.path());
    let output_dir = dir.path().join("outputs");

    let config = PipelineConfig {
        data_path,
        output_dir: output_dir.clone(),
    };
    run(&config).unwrap();

    let expected = [
        "titanic_cleaned.csv",
        "pclass_dist.png",
        "sex_dist.png",
        "embarked_dist.png",
        "survival_by_pclass.png",
        "survival_by_sex.png",
        "survival_by_embarked.png",
        "survival_by_isalone.png",
        "age_hist.png",
    ];
    for name in expected {
        assert!(output_dir.join(name).exists(), "missing output {name}");
    }

    let cleaned = DataLoader::new()
        .load_csv(&output_dir.join("titanic_cleaned.csv"))
        .unwrap();
    assert_eq!(cleaned.height(), 5);
}
