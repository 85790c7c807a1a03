use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use academic_dataset_synth::export::write_submissions_csv;
use academic_dataset_synth::{AcademicCalendar, DatasetGenerator, GeneratorConfig};

#[test]
fn config_file_overrides_merge_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "assessments": { "perModule": { "min": 3, "max": 3 } },
            "catalog": { "programs": ["Mathematics"] }
        }"#,
    )
    .unwrap();

    let config = GeneratorConfig::from_json_file(&path).unwrap();
    assert_eq!(config.assessments.per_module.min, 3);
    assert_eq!(config.catalog.modules_per_term, 3);
    assert_eq!(config.marking.deadline_days, 21);

    let calendar = AcademicCalendar::new(
        &config.calendar,
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
    )
    .unwrap();
    let mut generator = DatasetGenerator::new(config, calendar, StdRng::seed_from_u64(3)).unwrap();
    let students = generator.generate(3);
    for student in &students {
        assert_eq!(student.program, "Mathematics");
        assert!(student.modules.iter().all(|m| m.assessments.len() == 3));
    }
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "calendar": { "targetFraction": 2.0 } }"#).unwrap();
    assert!(GeneratorConfig::from_json_file(&path).is_err());
}

#[test]
fn csv_export_reads_back() {
    let config = GeneratorConfig::default();
    let calendar = AcademicCalendar::new(
        &config.calendar,
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
    )
    .unwrap();
    let mut generator = DatasetGenerator::new(config, calendar, StdRng::seed_from_u64(8)).unwrap();
    let students = generator.generate(4);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("submissions.csv");
    let written = write_submissions_csv(&path, &students).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    let status_column = headers.iter().position(|h| h == "status").unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), written);
    assert!(rows.iter().all(|row| {
        matches!(&row[status_column], "submitted" | "late" | "missing" | "pending")
    }));
}

#[test]
fn dataset_json_carries_calendar_and_keyed_submissions() {
    let config = GeneratorConfig::default();
    let calendar = AcademicCalendar::new(
        &config.calendar,
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
    )
    .unwrap();
    let mut generator = DatasetGenerator::new(config, calendar, StdRng::seed_from_u64(1)).unwrap();
    let dataset = generator.generate_dataset(1);
    let value = serde_json::to_value(&dataset).unwrap();

    assert_eq!(value["calendar"]["academicYear"], 2025);
    assert!(value["calendar"]["currentDate"].is_string());
    let module = &value["students"][0]["modules"][0];
    assert_eq!(module["term"], 1);
    assert_eq!(
        module["assessments"][0]["id"],
        module["submissions"][0]["assessmentId"]
    );
    assert!(module["assessments"][0]["type"].is_string());
}
