use inquest_rules::SunderedKind;
use inquest_session::{CreateValidator, Session, SessionError};
use inquest_table::{TableError, read_table};
use polars::prelude::df;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "inquest-session-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn write_scores_csv(path: &Path) {
    let rows = [
        "name,score",
        "alice,91.5",
        "bob,-3",
        "carol,70",
        "dave,0",
    ];
    fs::write(path, format!("{}\n", rows.join("\n"))).expect("fixture csv should be written");
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn load_scores(session: &mut Session, dir: &Path) -> String {
    let csv = dir.join("scores.csv");
    write_scores_csv(&csv);
    session
        .load_table(csv.to_str().expect("utf-8 path"), None)
        .expect("fixture should load")
        .table_id
}

#[test]
fn load_reports_shape_and_columns() {
    let tmp = TempDirGuard::new("load-shape");
    let csv = tmp.path().join("scores.csv");
    write_scores_csv(&csv);

    let mut session = Session::new();
    let info = session
        .load_table(csv.to_str().expect("utf-8 path"), None)
        .expect("load should succeed");

    assert!(info.table_id.starts_with("tbl_"));
    assert_eq!((info.rows, info.columns), (4, 2));
    assert_eq!(info.column_names, vec!["name", "score"]);
}

#[test]
fn load_rejects_missing_paths_and_foreign_formats() {
    let tmp = TempDirGuard::new("load-reject");
    let mut session = Session::new();

    let missing = tmp.path().join("absent.csv");
    let err = session
        .load_table(missing.to_str().expect("utf-8 path"), None)
        .unwrap_err();
    assert!(matches!(err, SessionError::Table(TableError::NotFound { .. })));

    let txt = tmp.path().join("notes.txt");
    fs::write(&txt, "not a table\n").expect("txt fixture should be written");
    let err = session
        .load_table(txt.to_str().expect("utf-8 path"), None)
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Table(TableError::UnsupportedFormat { .. })
    ));
}

#[test]
fn explicit_table_ids_collide_only_once() {
    let tmp = TempDirGuard::new("load-dup");
    let csv = tmp.path().join("scores.csv");
    write_scores_csv(&csv);
    let source = csv.to_str().expect("utf-8 path");

    let mut session = Session::new();
    session
        .load_table(source, Some("tbl_mine".to_string()))
        .expect("first load should succeed");
    let err = session
        .load_table(source, Some("tbl_mine".to_string()))
        .unwrap_err();
    assert!(matches!(err, SessionError::DuplicateTableId { .. }));

    // Auto ids stay distinct.
    let a = session.load_table(source, None).unwrap().table_id;
    let b = session.load_table(source, None).unwrap().table_id;
    assert_ne!(a, b);
}

#[test]
fn end_to_end_gt_rule_flags_nonpositive_scores() {
    let tmp = TempDirGuard::new("end-to-end");
    let mut session = Session::new();
    let table_id = load_scores(&mut session, tmp.path());

    let validator = session
        .create_validator(CreateValidator {
            table_id,
            ..Default::default()
        })
        .expect("validator should be created");
    let step = session
        .add_step(
            &validator.validator_id,
            "col_vals_gt",
            object(json!({"columns": "score", "value": 0})),
        )
        .expect("step should append");
    assert_eq!(step.step_index, 0);
    assert_eq!(step.step_count, 1);

    let outcome = session
        .interrogate(&validator.validator_id, None)
        .expect("interrogation should run");
    assert!(!outcome.all_passed);
    assert_eq!(outcome.summary.len(), 1);
    // bob (-3) and dave (0) fail score > 0.
    assert_eq!(outcome.summary[0]["nFailed"], json!(2));
    assert_eq!(outcome.summary[0]["nPassed"], json!(2));

    // The failing union contains exactly those rows.
    let out_csv = tmp.path().join("failing.csv");
    let extract = session
        .extract(
            &validator.validator_id,
            out_csv.to_str().expect("utf-8 path"),
            None,
            Some(SunderedKind::Fail),
        )
        .expect("extract should succeed");
    let written = extract.output_path.expect("rows should be written");
    let (frame, _) = read_table(&written).expect("written csv should read back");
    let expected = df!(
        "name" => ["bob", "dave"],
        "score" => [-3.0f64, 0.0],
    )
    .unwrap();
    assert!(frame.equals(&expected));
}

#[test]
fn step_evidence_wins_over_sundered_type() {
    let tmp = TempDirGuard::new("precedence");
    let mut session = Session::new();
    let table_id = load_scores(&mut session, tmp.path());
    let validator = session
        .create_validator(CreateValidator {
            table_id,
            ..Default::default()
        })
        .unwrap();
    session
        .add_step(
            &validator.validator_id,
            "col_vals_gt",
            object(json!({"columns": "score", "value": 0})),
        )
        .unwrap();
    session.interrogate(&validator.validator_id, None).unwrap();

    // step_index=0 takes precedence over the passing union.
    let out_csv = tmp.path().join("step0.csv");
    let extract = session
        .extract(
            &validator.validator_id,
            out_csv.to_str().expect("utf-8 path"),
            Some(0),
            Some(SunderedKind::Pass),
        )
        .unwrap();
    let written = extract.output_path.expect("step evidence should be written");
    let (frame, _) = read_table(&written).expect("written csv should read back");
    assert_eq!(frame.height(), 2);

    let negative = session
        .extract(&validator.validator_id, "any.csv", Some(-1), None)
        .unwrap_err();
    assert!(matches!(negative, SessionError::InvalidArgument { .. }));
}

#[test]
fn all_passing_step_extracts_to_a_noop() {
    let tmp = TempDirGuard::new("noop-extract");
    let mut session = Session::new();
    let table_id = load_scores(&mut session, tmp.path());
    let validator = session
        .create_validator(CreateValidator {
            table_id,
            ..Default::default()
        })
        .unwrap();
    session
        .add_step(
            &validator.validator_id,
            "col_vals_not_null",
            object(json!({"columns": "name"})),
        )
        .unwrap();
    session.interrogate(&validator.validator_id, None).unwrap();

    let out_csv = tmp.path().join("never-written.csv");
    let extract = session
        .extract(
            &validator.validator_id,
            out_csv.to_str().expect("utf-8 path"),
            Some(0),
            None,
        )
        .unwrap();
    assert!(extract.output_path.is_none());
    assert!(extract.message.contains("No data extract available for step 0"));
    assert!(!out_csv.exists());
}

#[test]
fn report_persists_as_csv_and_soft_fails_on_bad_extension() {
    let tmp = TempDirGuard::new("report-save");
    let mut session = Session::new();
    let table_id = load_scores(&mut session, tmp.path());
    let validator = session
        .create_validator(CreateValidator {
            table_id,
            ..Default::default()
        })
        .unwrap();
    session
        .add_step(
            &validator.validator_id,
            "col_vals_gt",
            object(json!({"columns": "score", "value": 0})),
        )
        .unwrap();

    let report_csv = tmp.path().join("reports").join("run.csv");
    let outcome = session
        .interrogate(
            &validator.validator_id,
            Some(report_csv.to_str().expect("utf-8 path")),
        )
        .unwrap();
    let saved = outcome.report_saved_to.expect("report should be saved");
    let (report, _) = read_table(&saved).expect("report should read back");
    assert_eq!(report.height(), 1);
    assert!(report.column("n_failed").is_ok());

    // A bad extension is reported in the payload, not raised.
    let bad = tmp.path().join("run.json");
    let outcome = session
        .interrogate(
            &validator.validator_id,
            Some(bad.to_str().expect("utf-8 path")),
        )
        .unwrap();
    assert!(outcome.report_saved_to.is_none());
    let save_error = outcome.report_save_error.expect("soft error expected");
    assert!(save_error.contains(".csv"));
    assert_eq!(outcome.summary.len(), 1);
}

#[test]
fn reinterrogation_extends_the_summary_in_place() {
    let tmp = TempDirGuard::new("reinterrogate");
    let mut session = Session::new();
    let table_id = load_scores(&mut session, tmp.path());
    let validator = session
        .create_validator(CreateValidator {
            table_id,
            ..Default::default()
        })
        .unwrap();
    session
        .add_step(
            &validator.validator_id,
            "col_vals_gt",
            object(json!({"columns": "score", "value": 0})),
        )
        .unwrap();
    let first = session.interrogate(&validator.validator_id, None).unwrap();

    session
        .add_step(
            &validator.validator_id,
            "col_vals_regex",
            object(json!({"columns": "name", "pattern": "^[a-z]+$"})),
        )
        .unwrap();
    let second = session.interrogate(&validator.validator_id, None).unwrap();

    assert_eq!(second.summary.len(), first.summary.len() + 1);
    assert_eq!(second.summary[0], first.summary[0]);
    assert_eq!(second.summary[1]["i"], json!(1));
}
