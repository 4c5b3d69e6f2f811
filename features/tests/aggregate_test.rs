//! Integration tests for [`features::aggregate`] and the dataset reader.
//!
//! Uses the two-session fixture (group "A" with two squat rows, group "B"
//! with one lunges row) and checks every derived column. Output order is not
//! part of the contract, so tests sort by `session_group` before comparing.

use coach_core::{AggregateError, ExerciseResultRow};
use features::{aggregate, read_exercise_results, ExtraTables};
use std::io::Write;

/// A group-"A" squat row with the session-level columns of patient P1; tests
/// override the per-exercise columns they care about.
fn squat_row() -> ExerciseResultRow {
    ExerciseResultRow {
        session_group: "A".to_string(),
        patient_id: "P1".to_string(),
        patient_name: "John Doe".to_string(),
        patient_age: 30,
        pain: 2,
        fatigue: 3,
        therapy_name: "knee".to_string(),
        session_number: 1,
        leave_session: None,
        quality: 4,
        session_is_nok: 0,
        quality_reason_other: 1,
        quality_reason_exercises: 1,
        quality_reason_my_self_personal: 0,
        quality_reason_movement_detection: 1,
        quality_reason_tablet: 0,
        quality_reason_tablet_and_or_motion_trackers: 0,
        quality_reason_easy_of_use: 0,
        quality_reason_session_speed: 0,
        prescribed_repeats: 10,
        leave_exercise: Some("pain".to_string()),
        training_time: 120,
        correct_repeats: 5,
        wrong_repeats: 5,
        session_exercise_result_id: 1,
        exercise_name: "squat".to_string(),
        exercise_order: 2,
    }
}

/// The three-row fixture: group "A" has two squat rows (orders 2 and 1, the
/// order-1 row abandoned with "system_problem"), group "B" one lunges row.
fn fixture() -> Vec<ExerciseResultRow> {
    let first = squat_row();

    let mut second = squat_row();
    second.prescribed_repeats = 15;
    second.leave_exercise = Some("system_problem".to_string());
    second.training_time = 150;
    second.correct_repeats = 15;
    second.session_exercise_result_id = 2;
    second.exercise_order = 1;

    let mut third = squat_row();
    third.session_group = "B".to_string();
    third.patient_id = "P2".to_string();
    third.patient_name = "Jane Smith".to_string();
    third.patient_age = 45;
    third.pain = 5;
    third.fatigue = 6;
    third.therapy_name = "shoulder".to_string();
    third.session_number = 2;
    third.leave_session = Some("discomfort".to_string());
    third.quality = 3;
    third.session_is_nok = 1;
    third.quality_reason_other = 0;
    third.prescribed_repeats = 20;
    third.leave_exercise = None;
    third.training_time = 300;
    third.correct_repeats = 10;
    third.wrong_repeats = 1;
    third.session_exercise_result_id = 3;
    third.exercise_name = "lunges".to_string();
    third.exercise_order = 1;

    vec![first, second, third]
}

fn aggregate_fixture() -> Vec<coach_core::SessionFeatureRow> {
    let mut result = aggregate(&fixture(), &ExtraTables::default()).unwrap();
    result.sort_by(|a, b| a.session_group.cmp(&b.session_group));
    result
}

/// **Test: One output row per distinct session_group, session-level columns
/// taken representatively and quality reasons OR-ed over the group.**
#[test]
fn session_level_columns() {
    let result = aggregate_fixture();
    assert_eq!(result.len(), 2);

    let a = &result[0];
    assert_eq!(a.session_group, "A");
    assert_eq!(a.patient_id, "P1");
    assert_eq!(a.patient_name, "John Doe");
    assert_eq!(a.pain, 2);
    assert_eq!(a.fatigue, 3);
    assert_eq!(a.quality, 4);
    assert_eq!(a.session_is_nok, 0);
    assert_eq!(a.leave_session, None);
    assert_eq!(a.quality_reason_other, 1);
    assert_eq!(a.quality_reason_exercises, 1);

    let b = &result[1];
    assert_eq!(b.session_group, "B");
    assert_eq!(b.patient_id, "P2");
    assert_eq!(b.patient_name, "Jane Smith");
    assert_eq!(b.pain, 5);
    assert_eq!(b.fatigue, 6);
    assert_eq!(b.quality, 3);
    assert_eq!(b.session_is_nok, 1);
    assert_eq!(b.leave_session.as_deref(), Some("discomfort"));
    assert_eq!(b.quality_reason_other, 0);
    assert_eq!(b.quality_reason_exercises, 1);
}

/// **Test: prescribed_repeats is summed per group: A = 10 + 15, B = 20.**
#[test]
fn prescribed_repeats_summed() {
    let result = aggregate_fixture();
    assert_eq!(result[0].prescribed_repeats, 25);
    assert_eq!(result[1].prescribed_repeats, 20);
}

/// **Test: training_time is summed per group: A = 120 + 150, B = 300.**
#[test]
fn training_time_summed() {
    let result = aggregate_fixture();
    assert_eq!(result[0].training_time, 270);
    assert_eq!(result[1].training_time, 300);
}

/// **Test: perc_correct_repeats = sum(correct) / sum(correct + wrong):
/// A = 20/30, B = 10/11.**
#[test]
fn perc_correct_repeats_computed() {
    let result = aggregate_fixture();
    let a = result[0].perc_correct_repeats.unwrap();
    let b = result[1].perc_correct_repeats.unwrap();
    assert!((a - 2.0 / 3.0).abs() < 1e-12);
    assert!((b - 10.0 / 11.0).abs() < 1e-12);
}

/// **Test: number_exercises counts rows, number_of_distinct_exercises counts
/// distinct names: A has two "squat" rows → 2 and 1.**
#[test]
fn exercise_counts() {
    let result = aggregate_fixture();
    assert_eq!(result[0].number_exercises, 2);
    assert_eq!(result[0].number_of_distinct_exercises, 1);
    assert_eq!(result[1].number_exercises, 1);
    assert_eq!(result[1].number_of_distinct_exercises, 1);
}

/// **Test: exercise_with_most_incorrect picks the name with the highest
/// summed wrong_repeats: "squat" for A, "lunges" for B.**
#[test]
fn exercise_with_most_incorrect() {
    let result = aggregate_fixture();
    assert_eq!(result[0].exercise_with_most_incorrect, "squat");
    assert_eq!(result[1].exercise_with_most_incorrect, "lunges");
}

/// **Test: a tie on summed wrong_repeats goes to the lexicographically
/// smallest exercise name, regardless of row order.**
#[test]
fn most_incorrect_tie_breaks_lexicographically() {
    let mut rows = vec![squat_row(), squat_row()];
    rows[0].exercise_name = "rows".to_string();
    rows[0].wrong_repeats = 5;
    rows[1].exercise_name = "plank".to_string();
    rows[1].wrong_repeats = 5;

    let result = aggregate(&rows, &ExtraTables::default()).unwrap();
    assert_eq!(result[0].exercise_with_most_incorrect, "plank");

    rows.swap(0, 1);
    let result = aggregate(&rows, &ExtraTables::default()).unwrap();
    assert_eq!(result[0].exercise_with_most_incorrect, "plank");
}

/// **Test: first_exercise_skipped is the order-1 exercise name when that row
/// has a leave reason ("squat" for A), and None when it does not (B).**
#[test]
fn first_exercise_skipped() {
    let result = aggregate_fixture();
    assert_eq!(result[0].first_exercise_skipped.as_deref(), Some("squat"));
    assert_eq!(result[1].first_exercise_skipped, None);
}

/// **Test: a group whose repeats all sum to zero has no defined percentage.**
#[test]
fn perc_correct_repeats_zero_denominator_is_none() {
    let mut row = squat_row();
    row.correct_repeats = 0;
    row.wrong_repeats = 0;

    let result = aggregate(&[row], &ExtraTables::default()).unwrap();
    assert_eq!(result[0].perc_correct_repeats, None);
}

/// **Test: row order within a group does not change any derived column.**
#[test]
fn aggregation_is_row_order_independent() {
    let mut rows = fixture();
    let expected = aggregate_fixture();

    rows.reverse();
    let mut reversed = aggregate(&rows, &ExtraTables::default()).unwrap();
    reversed.sort_by(|a, b| a.session_group.cmp(&b.session_group));

    assert_eq!(reversed, expected);
}

/// **Test: an empty session_group is rejected as an input error.**
#[test]
fn empty_session_group_is_an_error() {
    let mut row = squat_row();
    row.session_group = String::new();

    let err = aggregate(&[row], &ExtraTables::default()).unwrap_err();
    assert!(matches!(
        err,
        AggregateError::MissingSessionGroup { index: 0 }
    ));
}

/// **Test: the dataset reader parses one row per line, skips blank lines, and
/// reports the line number of a malformed row.**
#[test]
fn reader_parses_json_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let row = squat_row();
    writeln!(file, "{}", serde_json::to_string(&row).unwrap()).unwrap();
    writeln!(file).unwrap();
    writeln!(file, "{}", serde_json::to_string(&row).unwrap()).unwrap();

    let rows = read_exercise_results(file.path()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], row);

    writeln!(file, "not json").unwrap();
    let err = read_exercise_results(file.path()).unwrap_err();
    assert!(matches!(err, AggregateError::Parse { line: 4, .. }));
}

/// **Test: a missing dataset file surfaces as an Io error with the path.**
#[test]
fn reader_missing_file_is_io_error() {
    let err = read_exercise_results(std::path::Path::new("/nonexistent/exercise.jsonl"))
        .unwrap_err();
    assert!(matches!(err, AggregateError::Io { .. }));
}
