//! Subjects, exam marks and result sheets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A credit-bearing subject taught in a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub class_id: Uuid,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
}

/// A student's score in one exam of one subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mark {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub exam: String,
    pub score: f64,
    pub max_score: f64,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, max = 20, message = "Code must be 1-20 characters"))]
    pub code: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(range(min = 1, max = 10, message = "Credits must be between 1 and 10"))]
    pub credits: i32,
}

/// Upsert payload keyed on (student, subject, exam).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertMarkRequest {
    pub student_id: Uuid,
    pub subject_id: Uuid,

    #[validate(length(min = 1, max = 50, message = "Exam must be 1-50 characters"))]
    pub exam: String,

    pub score: f64,
    pub max_score: f64,
}

impl UpsertMarkRequest {
    /// Checks `max_score > 0` and `0 <= score <= max_score`.
    pub fn validate_scores(&self) -> Result<(), ValidationError> {
        if !self.max_score.is_finite() || self.max_score <= 0.0 {
            let mut err = ValidationError::new("max_score_range");
            err.message = Some("Max score must be greater than 0".into());
            return Err(err);
        }
        if !self.score.is_finite() || self.score < 0.0 || self.score > self.max_score {
            let mut err = ValidationError::new("score_range");
            err.message = Some("Score must be between 0 and max score".into());
            return Err(err);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListSubjectsResponse {
    pub subjects: Vec<Subject>,
}

/// Aggregate result of one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectResult {
    pub subject_id: Uuid,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub percentage: f64,
    pub grade: &'static str,
    pub grade_point: u8,
}

/// A student's results across all graded subjects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSheet {
    pub student_id: Uuid,
    pub subjects: Vec<SubjectResult>,
    pub total_credits: i32,
    pub cgpa: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(score: f64, max_score: f64) -> UpsertMarkRequest {
        UpsertMarkRequest {
            student_id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            exam: "midterm".to_string(),
            score,
            max_score,
        }
    }

    #[test]
    fn test_validate_scores() {
        assert!(mark(45.0, 50.0).validate_scores().is_ok());
        assert!(mark(0.0, 50.0).validate_scores().is_ok());
        assert!(mark(50.0, 50.0).validate_scores().is_ok());
        assert!(mark(51.0, 50.0).validate_scores().is_err());
        assert!(mark(-1.0, 50.0).validate_scores().is_err());
        assert!(mark(0.0, 0.0).validate_scores().is_err());
    }

    #[test]
    fn test_create_subject_validation() {
        let request = CreateSubjectRequest {
            code: "PHY101".to_string(),
            name: "Physics".to_string(),
            credits: 4,
        };
        assert!(request.validate().is_ok());

        let no_credits = CreateSubjectRequest {
            credits: 0,
            ..request
        };
        assert!(no_credits.validate().is_err());
    }
}
