use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::calendar::AcademicCalendar;
use crate::config::{AssessmentConfig, CatalogConfig};
use crate::models::{Assessment, AssessmentType, Term};
use crate::profile::StudentProfile;
use crate::random::RandomSource;

pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10;
pub const PLACEMENT_STEP_DAYS: i64 = 3;

const EXTENSION_REASONS: [&str; 9] = [
    "Technical difficulties",
    "Personal circumstances",
    "Illness",
    "Family emergency",
    "Work commitments",
    "Other coursework conflicts",
    "Bereavement",
    "Computer failure",
    "Internet connectivity issues",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuePlacement {
    pub date: NaiveDate,
    pub attempts: u32,
    pub converged: bool,
}

pub struct AssessmentGenerator<'a> {
    calendar: &'a AcademicCalendar,
    config: &'a AssessmentConfig,
    catalog: &'a CatalogConfig,
}

impl<'a> AssessmentGenerator<'a> {
    pub fn new(
        calendar: &'a AcademicCalendar,
        config: &'a AssessmentConfig,
        catalog: &'a CatalogConfig,
    ) -> Self {
        Self {
            calendar,
            config,
            catalog,
        }
    }

    /// Assessments for one module, sorted by effective due date. Extensions
    /// are only considered when a profile is supplied.
    pub fn generate<R: RandomSource>(
        &self,
        rng: &mut R,
        module_code: &str,
        term: Term,
        profile: Option<&StudentProfile>,
    ) -> Vec<Assessment> {
        let count = rng.between(self.config.per_module.min, self.config.per_module.max) as usize;
        let module_name = self.catalog.module_name(module_code).unwrap_or(module_code);
        let term_dates = self.calendar.term_dates(term);

        let mut assessments: Vec<Assessment> = self
            .term_positions(rng, term, count)
            .into_iter()
            .enumerate()
            .map(|(i, position)| {
                let placement = self.place_due_date(term_dates.at_position(position));
                if !placement.converged {
                    warn!(
                        module = module_code,
                        ordinal = i + 1,
                        date = %placement.date,
                        attempts = placement.attempts,
                        "no break-free due date within retry bound, keeping last attempt"
                    );
                }
                let days_from_now = self.calendar.days_from_now(placement.date);
                Assessment {
                    id: format!("{module_code}_A{}", i + 1),
                    title: format!("{module_name} Assessment {}", i + 1),
                    kind: draw_type(rng),
                    weight: rng.between(self.config.weight.min, self.config.weight.max) as u32,
                    submission_window: rng.between(
                        self.config.submission_window_days.min,
                        self.config.submission_window_days.max,
                    ) as u32,
                    original_due_date: placement.date,
                    due_date: placement.date,
                    has_extension: false,
                    extension_days: 0,
                    extension_reason: None,
                    is_past: placement.date < self.calendar.current_date,
                    days_from_now,
                    term_position: position,
                    placement_converged: placement.converged,
                }
            })
            .collect();

        if profile.is_some() {
            self.apply_extensions(rng, &mut assessments);
        }

        debug!(
            module = module_code,
            term = %term,
            count = assessments.len(),
            extensions = assessments.iter().filter(|a| a.has_extension).count(),
            "generated assessments"
        );

        assessments.sort_by_key(|assessment| assessment.due_date);
        assessments
    }

    /// Fractions through the term at which each assessment falls due.
    ///
    /// In the term containing "now" the first assessment lands early, the
    /// last lands at or after current progress, and the rest cluster around
    /// progress. Other terms are spaced evenly.
    pub fn term_positions<R: RandomSource>(
        &self,
        rng: &mut R,
        term: Term,
        count: usize,
    ) -> Vec<f64> {
        if count == 0 {
            return Vec::new();
        }
        if term != self.calendar.current_term() {
            return (0..count)
                .map(|i| (i + 1) as f64 / (count + 1) as f64)
                .collect();
        }

        let placement = &self.config.placement;
        let progress = self.calendar.term_progress(Some(term));
        let window = placement.middle_window;

        if count == 1 {
            let position = progress + rng.uniform(-window, window);
            return vec![position.clamp(0.0, placement.max_position)];
        }

        let mut first = rng.uniform(placement.early.min, placement.early.max);
        if progress > placement.far_along_threshold {
            first *= placement.far_along_early_scale;
        }
        let last = (progress + rng.uniform(placement.late_offset.min, placement.late_offset.max))
            .max(placement.late_floor)
            .min(placement.max_position);
        let (low, high) = (first.min(last), first.max(last));

        let mut positions = Vec::with_capacity(count);
        positions.push(first);
        for _ in 1..count - 1 {
            positions.push((progress + rng.uniform(-window, window)).clamp(low, high));
        }
        positions.push(last);
        positions.sort_by(|a, b| a.total_cmp(b));
        positions
    }

    /// Steps forward three days at a time until the date clears the breaks,
    /// giving up after [`MAX_PLACEMENT_ATTEMPTS`].
    pub fn place_due_date(&self, candidate: NaiveDate) -> DuePlacement {
        let mut date = candidate;
        let mut attempts = 0;
        while !self.calendar.is_valid_assessment_date(date) && attempts < MAX_PLACEMENT_ATTEMPTS {
            date += Duration::days(PLACEMENT_STEP_DAYS);
            attempts += 1;
        }
        DuePlacement {
            date,
            attempts,
            converged: self.calendar.is_valid_assessment_date(date),
        }
    }

    fn apply_extensions<R: RandomSource>(&self, rng: &mut R, assessments: &mut [Assessment]) {
        let extensions = &self.config.extensions;
        let to_extend = (assessments.len() as f64 * extensions.rate).floor() as usize;
        if to_extend == 0 {
            return;
        }

        let mut eligible: Vec<usize> = assessments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.days_from_now.abs() <= extensions.eligibility_window_days)
            .map(|(i, _)| i)
            .collect();
        eligible.sort_by_key(|&i| assessments[i].days_from_now.abs());

        for index in eligible.into_iter().take(to_extend) {
            let days = if rng.chance(extensions.short_prob) {
                extensions.short_days
            } else {
                extensions.long_days
            };
            let reason = rng.pick(&EXTENSION_REASONS).copied().unwrap_or("Other");

            let assessment = &mut assessments[index];
            assessment.has_extension = true;
            assessment.extension_days = days as u32;
            assessment.extension_reason = Some(reason.to_string());
            assessment.due_date = assessment.original_due_date + Duration::days(days);
            assessment.days_from_now = self.calendar.days_from_now(assessment.due_date);
            assessment.is_past = assessment.due_date < self.calendar.current_date;

            debug!(
                assessment = %assessment.id,
                original_due = %assessment.original_due_date,
                new_due = %assessment.due_date,
                reason,
                "applied {days}-day extension"
            );
        }
    }
}

fn draw_type<R: RandomSource>(rng: &mut R) -> AssessmentType {
    if rng.chance(0.6) {
        AssessmentType::Coursework
    } else if rng.chance(0.7) {
        AssessmentType::Project
    } else {
        AssessmentType::Quiz
    }
}
