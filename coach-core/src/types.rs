//! Row types for the exercise result dataset and the derived session features.
//!
//! Flag columns (`session_is_nok`, `quality_reason_*`) are 0/1 integers as in
//! the source dataset; nullable text columns are `Option<String>`.

use serde::{Deserialize, Serialize};

/// One exercise/repeat-set event within a therapy session.
///
/// Multiple rows share the same `session_group`; patient- and session-level
/// columns (`patient_name`, `pain`, `fatigue`, `quality`, `session_is_nok`,
/// `leave_session`) are constant within a group, so any one row's value can be
/// taken representatively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseResultRow {
    pub session_group: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_age: i64,
    pub pain: i64,
    pub fatigue: i64,
    pub therapy_name: String,
    pub session_number: i64,
    pub leave_session: Option<String>,
    pub quality: i64,
    pub session_is_nok: i64,
    pub quality_reason_other: i64,
    pub quality_reason_exercises: i64,
    pub quality_reason_my_self_personal: i64,
    pub quality_reason_movement_detection: i64,
    pub quality_reason_tablet: i64,
    pub quality_reason_tablet_and_or_motion_trackers: i64,
    pub quality_reason_easy_of_use: i64,
    pub quality_reason_session_speed: i64,
    pub prescribed_repeats: i64,
    /// Reason the exercise was abandoned, if it was.
    pub leave_exercise: Option<String>,
    /// Training time for this exercise, in seconds.
    pub training_time: i64,
    pub correct_repeats: i64,
    pub wrong_repeats: i64,
    pub session_exercise_result_id: i64,
    pub exercise_name: String,
    /// 1-based position of the exercise within the session.
    pub exercise_order: i64,
}

/// One feature row per `session_group`, derived by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFeatureRow {
    pub session_group: String,
    pub patient_id: String,
    pub patient_name: String,
    pub pain: i64,
    pub fatigue: i64,
    pub quality: i64,
    pub session_is_nok: i64,
    pub leave_session: Option<String>,
    /// 1 if any row in the group had the flag set.
    pub quality_reason_other: i64,
    /// 1 if any row in the group had the flag set.
    pub quality_reason_exercises: i64,
    /// Sum across the group.
    pub prescribed_repeats: i64,
    /// Sum across the group, in seconds.
    pub training_time: i64,
    /// sum(correct) / (sum(correct) + sum(wrong)); `None` when the group has
    /// no repeats at all (zero denominator).
    pub perc_correct_repeats: Option<f64>,
    /// Row count in the group (not distinct exercise names).
    pub number_exercises: i64,
    pub number_of_distinct_exercises: i64,
    /// Exercise name with the highest summed `wrong_repeats`; ties go to the
    /// lexicographically smallest name.
    pub exercise_with_most_incorrect: String,
    /// Name of the first-ordered exercise if it was abandoned, else `None`.
    pub first_exercise_skipped: Option<String>,
}
