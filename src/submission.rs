use chrono::{Duration, NaiveDate};
use tracing::trace;

use crate::calendar::AcademicCalendar;
use crate::config::{IntRange, MarkingConfig, SubmissionPatternConfig};
use crate::models::{Assessment, Submission, SubmissionStatus};
use crate::profile::{StudentProfile, SubmissionPattern};
use crate::random::RandomSource;

const HIGH_FEEDBACK: [&str; 3] = [
    "Excellent work! Clear understanding demonstrated throughout.",
    "Very well structured and thoroughly researched.",
    "Outstanding analysis with strong supporting evidence.",
];

const MEDIUM_FEEDBACK: [&str; 3] = [
    "Good effort with some room for improvement.",
    "Demonstrates understanding but could expand analysis.",
    "Solid work overall, consider developing points further.",
];

const LOW_FEEDBACK: [&str; 3] = [
    "Basic understanding shown but needs more depth.",
    "More analysis and critical thinking needed.",
    "Please review core concepts and develop arguments further.",
];

/// Early submissions happen at this fraction of the base on-time odds,
/// further scaled by engagement.
const EARLY_SUBMISSION_FACTOR: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkingSpeed {
    OnTime,
    Late,
    VeryLate,
}

pub struct SubmissionGenerator<'a> {
    calendar: &'a AcademicCalendar,
    patterns: &'a SubmissionPatternConfig,
    marking: &'a MarkingConfig,
    similarity: IntRange,
}

impl<'a> SubmissionGenerator<'a> {
    pub fn new(
        calendar: &'a AcademicCalendar,
        patterns: &'a SubmissionPatternConfig,
        marking: &'a MarkingConfig,
        similarity: IntRange,
    ) -> Self {
        Self {
            calendar,
            patterns,
            marking,
            similarity,
        }
    }

    pub fn generate<R: RandomSource>(
        &self,
        rng: &mut R,
        profile: &StudentProfile,
        assessment: &Assessment,
    ) -> Submission {
        let due = assessment.due_date;
        let term = self.calendar.term_of(due);
        let term_progress = self.calendar.term_dates(term).progress_of(due);
        let engagement = profile.engagement_at(rng, term_progress);

        let submission = if due <= self.calendar.current_date {
            self.past_submission(rng, profile, assessment, engagement)
        } else {
            self.future_submission(rng, assessment, engagement)
        };

        trace!(
            assessment = %assessment.id,
            status = submission.status.as_str(),
            graded = submission.is_graded(),
            "generated submission"
        );
        submission
    }

    fn past_submission<R: RandomSource>(
        &self,
        rng: &mut R,
        profile: &StudentProfile,
        assessment: &Assessment,
        engagement: f64,
    ) -> Submission {
        let odds = SubmissionPattern::for_engagement(self.patterns, engagement).normalized();
        let draw = rng.next_f64();
        let due = assessment.due_date;

        if draw < odds.on_time_prob {
            let submitted_on = due - Duration::days(rng.between(0, 7));
            let submission =
                self.record(rng, assessment, SubmissionStatus::Submitted, Some(submitted_on));
            self.mark(rng, submission, profile)
        } else if draw < odds.on_time_prob + odds.late_prob {
            let submitted_on = due + Duration::days(rng.between(1, 5));
            let submission =
                self.record(rng, assessment, SubmissionStatus::Late, Some(submitted_on));
            self.mark(rng, submission, profile)
        } else {
            self.record(rng, assessment, SubmissionStatus::Missing, None)
        }
    }

    /// Not due yet: either already handed in early or still pending. Early
    /// work is too recent to have been marked.
    fn future_submission<R: RandomSource>(
        &self,
        rng: &mut R,
        assessment: &Assessment,
        engagement: f64,
    ) -> Submission {
        let early_chance = self.patterns.base_on_time_prob * EARLY_SUBMISSION_FACTOR * engagement;
        if rng.chance(early_chance) {
            let submitted_on = self.calendar.current_date - Duration::days(rng.between(0, 5));
            return self.record(rng, assessment, SubmissionStatus::Submitted, Some(submitted_on));
        }
        self.record(rng, assessment, SubmissionStatus::Pending, None)
    }

    fn record<R: RandomSource>(
        &self,
        rng: &mut R,
        assessment: &Assessment,
        status: SubmissionStatus,
        submission_date: Option<NaiveDate>,
    ) -> Submission {
        let similarity = submission_date
            .map(|_| rng.between(self.similarity.min, self.similarity.max) as u32);
        Submission {
            assessment_id: assessment.id.clone(),
            status,
            submission_date,
            grade: None,
            similarity,
            feedback_date: None,
            feedback: None,
        }
    }

    /// Simulates marking delay. Grade and feedback only appear once the
    /// simulated feedback date has passed.
    fn mark<R: RandomSource>(
        &self,
        rng: &mut R,
        mut submission: Submission,
        profile: &StudentProfile,
    ) -> Submission {
        let Some(submitted_on) = submission.submission_date else {
            return submission;
        };
        if submitted_on >= self.calendar.current_date {
            return submission;
        }

        let feedback_date = self.feedback_date(rng, submitted_on);
        if feedback_date > self.calendar.current_date {
            return submission;
        }

        let is_late = submission.status == SubmissionStatus::Late;
        let grade = self.draw_grade(rng, profile, is_late);
        submission.grade = Some(grade);
        submission.feedback_date = Some(feedback_date);
        submission.feedback = Some(feedback_for(rng, grade, profile.consistency));
        submission
    }

    pub fn feedback_date<R: RandomSource>(
        &self,
        rng: &mut R,
        submitted_on: NaiveDate,
    ) -> NaiveDate {
        let deadline = self
            .calendar
            .marking_deadline(submitted_on, self.marking.deadline_days);
        let week = Duration::days(7);
        match self.marking_speed(rng) {
            MarkingSpeed::OnTime => rng.date_between(submitted_on + Duration::days(1), deadline),
            MarkingSpeed::Late => rng.date_between(deadline, deadline + week),
            MarkingSpeed::VeryLate => rng.date_between(deadline + week, deadline + week * 2),
        }
    }

    fn marking_speed<R: RandomSource>(&self, rng: &mut R) -> MarkingSpeed {
        let options = [
            (MarkingSpeed::OnTime, self.marking.on_time_prob),
            (MarkingSpeed::Late, self.marking.late_prob),
            (MarkingSpeed::VeryLate, self.marking.very_late_prob),
        ];
        rng.weighted(&options).copied().unwrap_or(MarkingSpeed::OnTime)
    }

    /// Late work drops the bottom of the range by `late_penalty` points,
    /// floored at `late_grade_floor`.
    fn draw_grade<R: RandomSource>(
        &self,
        rng: &mut R,
        profile: &StudentProfile,
        is_late: bool,
    ) -> u32 {
        let range = profile.grade_range;
        let mut min = range.min as i64;
        if is_late {
            min = (min - self.marking.late_penalty).max(self.marking.late_grade_floor);
        }
        rng.between(min, range.max as i64) as u32
    }
}

pub fn feedback_for<R: RandomSource>(rng: &mut R, grade: u32, consistency: f64) -> String {
    let templates: &[&str] = if grade >= 70 {
        &HIGH_FEEDBACK
    } else if grade >= 50 {
        &MEDIUM_FEEDBACK
    } else {
        &LOW_FEEDBACK
    };
    let remark = if consistency > 0.7 {
        " Maintains consistent quality across submissions."
    } else if consistency < 0.3 {
        " Shows variable quality compared to previous work."
    } else {
        ""
    };
    let base = rng.pick(templates).copied().unwrap_or_default();
    format!("{base}{remark}")
}
