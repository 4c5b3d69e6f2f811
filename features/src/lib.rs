//! # Feature aggregation
//!
//! Turns the flat table of per-exercise-repeat rows into one feature row per
//! `session_group`: representative session columns, summed counters, the
//! correct-repeat percentage, the exercise with the most wrong repeats, and
//! whether the first-ordered exercise was abandoned.
//!
//! Rows within a group may arrive in any order; the only order-sensitive
//! feature is `first_exercise_skipped`, which keys off `exercise_order`, not
//! row position. Output is sorted by `session_group` so repeated runs are
//! byte-identical, but callers must not attach meaning to that order.

mod reader;
mod tables;

pub use reader::read_exercise_results;
pub use tables::{ExtraTables, TableSource};

use std::collections::{BTreeMap, BTreeSet};

use coach_core::{AggregateError, ExerciseResultRow, SessionFeatureRow};
use tracing::info;

/// Aggregates exercise result rows into one [`SessionFeatureRow`] per
/// distinct `session_group`.
///
/// `extra` exposes auxiliary named tables to the aggregation; the current
/// feature set performs no joins, so [`ExtraTables::default()`] is the usual
/// argument. A row with an empty `session_group` is an input error.
pub fn aggregate(
    rows: &[ExerciseResultRow],
    _extra: &dyn TableSource,
) -> Result<Vec<SessionFeatureRow>, AggregateError> {
    let mut groups: BTreeMap<&str, GroupAccumulator<'_>> = BTreeMap::new();

    for (index, row) in rows.iter().enumerate() {
        if row.session_group.is_empty() {
            return Err(AggregateError::MissingSessionGroup { index });
        }
        groups
            .entry(row.session_group.as_str())
            .or_insert_with(|| GroupAccumulator::new(row))
            .fold(row);
    }

    let features: Vec<SessionFeatureRow> = groups
        .into_iter()
        .map(|(session_group, acc)| acc.finish(session_group))
        .collect();

    info!(
        input_rows = rows.len(),
        session_groups = features.len(),
        "aggregated exercise results into session features"
    );

    Ok(features)
}

/// Per-partition reducer state, folded over every row of one session group.
struct GroupAccumulator<'a> {
    /// First row seen for the group; source of the representative columns.
    representative: &'a ExerciseResultRow,
    quality_reason_other: i64,
    quality_reason_exercises: i64,
    prescribed_repeats: i64,
    training_time: i64,
    correct_repeats: i64,
    wrong_repeats: i64,
    row_count: i64,
    distinct_exercises: BTreeSet<&'a str>,
    wrong_by_exercise: BTreeMap<&'a str, i64>,
    first_exercise_skipped: Option<&'a str>,
}

impl<'a> GroupAccumulator<'a> {
    fn new(first: &'a ExerciseResultRow) -> Self {
        Self {
            representative: first,
            quality_reason_other: 0,
            quality_reason_exercises: 0,
            prescribed_repeats: 0,
            training_time: 0,
            correct_repeats: 0,
            wrong_repeats: 0,
            row_count: 0,
            distinct_exercises: BTreeSet::new(),
            wrong_by_exercise: BTreeMap::new(),
            first_exercise_skipped: None,
        }
    }

    fn fold(&mut self, row: &'a ExerciseResultRow) {
        self.quality_reason_other = self.quality_reason_other.max(row.quality_reason_other);
        self.quality_reason_exercises = self
            .quality_reason_exercises
            .max(row.quality_reason_exercises);

        self.prescribed_repeats += row.prescribed_repeats;
        self.training_time += row.training_time;
        self.correct_repeats += row.correct_repeats;
        self.wrong_repeats += row.wrong_repeats;
        self.row_count += 1;

        self.distinct_exercises.insert(&row.exercise_name);
        *self.wrong_by_exercise.entry(&row.exercise_name).or_insert(0) += row.wrong_repeats;

        if row.exercise_order == 1 && row.leave_exercise.is_some() {
            // Deterministic when several order-1 rows qualify: smallest name.
            match self.first_exercise_skipped {
                Some(current) if current <= row.exercise_name.as_str() => {}
                _ => self.first_exercise_skipped = Some(&row.exercise_name),
            }
        }
    }

    fn finish(self, session_group: &str) -> SessionFeatureRow {
        let rep = self.representative;

        let denominator = self.correct_repeats + self.wrong_repeats;
        let perc_correct_repeats = if denominator == 0 {
            None
        } else {
            Some(self.correct_repeats as f64 / denominator as f64)
        };

        // Max by summed wrong repeats; iterating name-ascending with a strict
        // `>` keeps the lexicographically smallest name on ties.
        let exercise_with_most_incorrect = {
            let mut best: Option<(&str, i64)> = None;
            for (name, wrong) in &self.wrong_by_exercise {
                match best {
                    Some((_, best_wrong)) if *wrong <= best_wrong => {}
                    _ => best = Some((name, *wrong)),
                }
            }
            best.map(|(name, _)| name.to_string())
                .unwrap_or_else(|| rep.exercise_name.clone())
        };

        SessionFeatureRow {
            session_group: session_group.to_string(),
            patient_id: rep.patient_id.clone(),
            patient_name: rep.patient_name.clone(),
            pain: rep.pain,
            fatigue: rep.fatigue,
            quality: rep.quality,
            session_is_nok: rep.session_is_nok,
            leave_session: rep.leave_session.clone(),
            quality_reason_other: self.quality_reason_other,
            quality_reason_exercises: self.quality_reason_exercises,
            prescribed_repeats: self.prescribed_repeats,
            training_time: self.training_time,
            perc_correct_repeats,
            number_exercises: self.row_count,
            number_of_distinct_exercises: self.distinct_exercises.len() as i64,
            exercise_with_most_incorrect,
            first_exercise_skipped: self.first_exercise_skipped.map(str::to_string),
        }
    }
}
