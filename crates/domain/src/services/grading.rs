//! Ten-point grading and credit-weighted CGPA.

use std::collections::HashMap;
use uuid::Uuid;

use crate::models::marks::{Mark, ResultSheet, Subject, SubjectResult};

/// Letter grade and grade point for a percentage in [0, 100].
pub fn grade_for(percentage: f64) -> (&'static str, u8) {
    match percentage {
        p if p >= 90.0 => ("O", 10),
        p if p >= 80.0 => ("A+", 9),
        p if p >= 70.0 => ("A", 8),
        p if p >= 60.0 => ("B+", 7),
        p if p >= 50.0 => ("B", 6),
        p if p >= 45.0 => ("C", 5),
        p if p >= 40.0 => ("P", 4),
        _ => ("F", 0),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Credit-weighted mean grade point, rounded to two decimals.
///
/// Returns `None` when there are no credits to weigh.
pub fn cgpa(results: &[SubjectResult]) -> Option<f64> {
    let total_credits: i32 = results.iter().map(|r| r.credits).sum();
    if total_credits <= 0 {
        return None;
    }
    let weighted: f64 = results
        .iter()
        .map(|r| f64::from(r.grade_point) * f64::from(r.credits))
        .sum();
    Some(round2(weighted / f64::from(total_credits)))
}

/// Aggregates a student's marks per subject and grades each one.
///
/// A subject's percentage is the sum of scores over the sum of maximum
/// scores across its exams. Subjects without marks are left out.
pub fn build_result_sheet(student_id: Uuid, subjects: &[Subject], marks: &[Mark]) -> ResultSheet {
    let mut totals: HashMap<Uuid, (f64, f64)> = HashMap::new();
    for mark in marks.iter().filter(|m| m.student_id == student_id) {
        let entry = totals.entry(mark.subject_id).or_insert((0.0, 0.0));
        entry.0 += mark.score;
        entry.1 += mark.max_score;
    }

    let mut results: Vec<SubjectResult> = subjects
        .iter()
        .filter_map(|subject| {
            let (score, max_score) = totals.get(&subject.id)?;
            if *max_score <= 0.0 {
                return None;
            }
            let percentage = round2(score / max_score * 100.0);
            let (grade, grade_point) = grade_for(percentage);
            Some(SubjectResult {
                subject_id: subject.id,
                code: subject.code.clone(),
                name: subject.name.clone(),
                credits: subject.credits,
                percentage,
                grade,
                grade_point,
            })
        })
        .collect();
    results.sort_by(|a, b| a.code.cmp(&b.code));

    let total_credits = results.iter().map(|r| r.credits).sum();
    let cgpa = cgpa(&results);

    ResultSheet {
        student_id,
        subjects: results,
        total_credits,
        cgpa,
    }
}
