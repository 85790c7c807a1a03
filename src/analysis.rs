use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::models::{Student, SubmissionStatus};
use crate::risk::{RiskTier, StudentStats};

/// Unmarked work whose marking deadline falls within this many days of now
/// counts as approaching its deadline.
pub const MARKING_WARNING_DAYS: i64 = 7;
pub const UPCOMING_DEADLINE_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskBreakdown {
    fn record(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::High => self.high += 1,
            RiskTier::Medium => self.medium += 1,
            RiskTier::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetAnalysis {
    pub total_students: usize,
    pub submission_stats: BTreeMap<SubmissionStatus, usize>,
    /// Grades floored to the nearest ten.
    pub grade_distribution: BTreeMap<u32, usize>,
    pub program_distribution: BTreeMap<String, usize>,
    pub risk: RiskBreakdown,
}

pub fn analyze(students: &[Student]) -> DatasetAnalysis {
    let mut analysis = DatasetAnalysis {
        total_students: students.len(),
        submission_stats: BTreeMap::new(),
        grade_distribution: BTreeMap::new(),
        program_distribution: BTreeMap::new(),
        risk: RiskBreakdown::default(),
    };

    for student in students {
        *analysis
            .program_distribution
            .entry(student.program.clone())
            .or_insert(0) += 1;

        for submission in student.submissions() {
            *analysis.submission_stats.entry(submission.status).or_insert(0) += 1;
            if let Some(grade) = submission.grade {
                *analysis.grade_distribution.entry(grade / 10 * 10).or_insert(0) += 1;
            }
        }

        analysis.risk.record(StudentStats::for_student(student).tier());
    }

    debug!(
        students = analysis.total_students,
        high = analysis.risk.high,
        medium = analysis.risk.medium,
        low = analysis.risk.low,
        "dataset analysis complete"
    );
    analysis
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkingItem {
    pub module_code: String,
    pub module_name: String,
    pub assessment_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub marking_deadline: NaiveDate,
    pub total_submissions: usize,
    pub marked_submissions: usize,
}

impl MarkingItem {
    pub fn unmarked(&self) -> usize {
        self.total_submissions - self.marked_submissions
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkingQueue {
    /// Ordered by marking deadline, soonest first.
    pub incomplete: Vec<MarkingItem>,
    /// Ordered by due date, most recent first.
    pub completed: Vec<MarkingItem>,
    pub to_mark: usize,
    pub marked: usize,
    pub approaching_deadline: usize,
}

/// Marking workload for past-due assessments, grouped by module and
/// assessment across all students.
pub fn marking_queue(students: &[Student], today: NaiveDate, deadline_days: i64) -> MarkingQueue {
    let mut items: HashMap<(String, String), MarkingItem> = HashMap::new();

    for student in students {
        for module in &student.modules {
            for (assessment, submission) in module.pairs() {
                if assessment.due_date > today {
                    continue;
                }
                let item = items
                    .entry((module.code.clone(), assessment.id.clone()))
                    .or_insert_with(|| MarkingItem {
                        module_code: module.code.clone(),
                        module_name: module.name.clone(),
                        assessment_id: assessment.id.clone(),
                        title: assessment.title.clone(),
                        due_date: assessment.due_date,
                        marking_deadline: assessment.due_date + Duration::days(deadline_days),
                        total_submissions: 0,
                        marked_submissions: 0,
                    });
                if assessment.due_date < item.due_date {
                    item.due_date = assessment.due_date;
                    item.marking_deadline = assessment.due_date + Duration::days(deadline_days);
                }

                let Some(submission) = submission else {
                    continue;
                };
                let handed_in = matches!(
                    submission.status,
                    SubmissionStatus::Submitted | SubmissionStatus::Late
                ) && submission.submission_date.is_some();
                if handed_in {
                    item.total_submissions += 1;
                    if submission.is_graded() {
                        item.marked_submissions += 1;
                    }
                }
            }
        }
    }

    let warning_date = today + Duration::days(MARKING_WARNING_DAYS);
    let mut queue = MarkingQueue::default();
    for item in items.into_values() {
        if item.marked_submissions < item.total_submissions {
            queue.to_mark += item.unmarked();
            if item.marking_deadline <= warning_date {
                queue.approaching_deadline += item.unmarked();
            }
            queue.incomplete.push(item);
        } else if item.total_submissions > 0 {
            queue.marked += item.marked_submissions;
            queue.completed.push(item);
        }
    }

    queue.incomplete.sort_by(|a, b| {
        a.marking_deadline
            .cmp(&b.marking_deadline)
            .then_with(|| a.assessment_id.cmp(&b.assessment_id))
    });
    queue.completed.sort_by(|a, b| {
        b.due_date
            .cmp(&a.due_date)
            .then_with(|| a.assessment_id.cmp(&b.assessment_id))
    });
    queue
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDeadline {
    pub module_code: String,
    pub assessment_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub total_students: usize,
    pub not_submitted: usize,
    /// Whole percent of students who have already handed in.
    pub submission_rate: u32,
}

/// The next few future deadlines with how many students have handed in.
pub fn upcoming_deadlines(students: &[Student], today: NaiveDate) -> Vec<UpcomingDeadline> {
    let mut deadlines: HashMap<(String, String), UpcomingDeadline> = HashMap::new();

    for student in students {
        for module in &student.modules {
            for (assessment, submission) in module.pairs() {
                if assessment.due_date <= today {
                    continue;
                }
                let deadline = deadlines
                    .entry((module.code.clone(), assessment.id.clone()))
                    .or_insert_with(|| UpcomingDeadline {
                        module_code: module.code.clone(),
                        assessment_id: assessment.id.clone(),
                        title: assessment.title.clone(),
                        due_date: assessment.due_date,
                        total_students: 0,
                        not_submitted: 0,
                        submission_rate: 0,
                    });
                deadline.due_date = deadline.due_date.min(assessment.due_date);
                deadline.total_students += 1;
                if submission.and_then(|s| s.submission_date).is_none() {
                    deadline.not_submitted += 1;
                }
            }
        }
    }

    let mut upcoming: Vec<UpcomingDeadline> = deadlines
        .into_values()
        .map(|mut deadline| {
            let handed_in = deadline.total_students - deadline.not_submitted;
            deadline.submission_rate = if deadline.total_students == 0 {
                0
            } else {
                (handed_in as f64 * 100.0 / deadline.total_students as f64).round() as u32
            };
            deadline
        })
        .collect();
    upcoming.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.assessment_id.cmp(&b.assessment_id))
    });
    upcoming.truncate(UPCOMING_DEADLINE_LIMIT);
    upcoming
}
