use std::fmt;

use serde::Serialize;

use crate::models::{Student, SubmissionStatus};

pub const HIGH_MISSING_RATE: f64 = 0.3;
pub const HIGH_GRADE_CEILING: f64 = 40.0;
pub const MEDIUM_MISSING_RATE: f64 = 0.1;
pub const MEDIUM_LATE_RATE: f64 = 0.3;
pub const MEDIUM_GRADE_CEILING: f64 = 55.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub total: usize,
    pub submitted: usize,
    pub late: usize,
    pub missing: usize,
    pub pending: usize,
    pub graded: usize,
    /// `None` until at least one submission has been graded.
    pub average_grade: Option<f64>,
}

impl StudentStats {
    pub fn for_student(student: &Student) -> Self {
        let mut stats = Self::default();
        let mut grade_total = 0u64;

        for submission in student.submissions() {
            stats.total += 1;
            match submission.status {
                SubmissionStatus::Submitted => stats.submitted += 1,
                SubmissionStatus::Late => stats.late += 1,
                SubmissionStatus::Missing => stats.missing += 1,
                SubmissionStatus::Pending => stats.pending += 1,
            }
            if let Some(grade) = submission.grade {
                grade_total += grade as u64;
                stats.graded += 1;
            }
        }

        if stats.graded > 0 {
            stats.average_grade = Some(grade_total as f64 / stats.graded as f64);
        }
        stats
    }

    pub fn missing_rate(&self) -> f64 {
        rate(self.missing, self.total)
    }

    pub fn late_rate(&self) -> f64 {
        rate(self.late, self.total)
    }

    pub fn tier(&self) -> RiskTier {
        classify(self.missing_rate(), self.late_rate(), self.average_grade)
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Three-tier standing. All comparisons are strict, so a value sitting
/// exactly on a threshold resolves to the lower-risk side. Grade clauses
/// are skipped while nothing has been graded.
pub fn classify(missing_rate: f64, late_rate: f64, average_grade: Option<f64>) -> RiskTier {
    let grade_below = |ceiling: f64| average_grade.is_some_and(|grade| grade < ceiling);

    if missing_rate > HIGH_MISSING_RATE || grade_below(HIGH_GRADE_CEILING) {
        RiskTier::High
    } else if missing_rate > MEDIUM_MISSING_RATE
        || late_rate > MEDIUM_LATE_RATE
        || grade_below(MEDIUM_GRADE_CEILING)
    {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRisk {
    pub student_id: String,
    pub student_name: String,
    pub program: String,
    pub tier: RiskTier,
    pub stats: StudentStats,
}

/// Students ordered from highest risk down: tier, then missing rate, then
/// late rate.
pub fn rank_students(students: &[Student]) -> Vec<StudentRisk> {
    let mut ranked: Vec<StudentRisk> = students
        .iter()
        .map(|student| {
            let stats = StudentStats::for_student(student);
            StudentRisk {
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                program: student.program.clone(),
                tier: stats.tier(),
                stats,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.tier
            .cmp(&a.tier)
            .then_with(|| b.stats.missing_rate().total_cmp(&a.stats.missing_rate()))
            .then_with(|| b.stats.late_rate().total_cmp(&a.stats.late_rate()))
    });
    ranked
}
