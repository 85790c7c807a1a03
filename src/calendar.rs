use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::{CalendarConfig, MonthDay};
use crate::error::ConfigError;
use crate::models::Term;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TermDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TermDates {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Date at `position` (0 = start, 1 = end) through the term.
    pub fn at_position(&self, position: f64) -> NaiveDate {
        let offset = (position * self.days() as f64).round() as i64;
        self.start + Duration::days(offset)
    }

    pub fn progress_of(&self, date: NaiveDate) -> f64 {
        let span = self.days();
        if span <= 0 {
            return 0.0;
        }
        ((date - self.start).num_days() as f64 / span as f64).clamp(0.0, 1.0)
    }
}

/// Term boundaries for one academic year plus the synthetic "now" every
/// generator measures against. Built once per dataset run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicCalendar {
    pub academic_year: i32,
    pub term1: TermDates,
    pub term2: TermDates,
    pub current_date: NaiveDate,
    #[serde(skip)]
    config: CalendarConfig,
}

impl AcademicCalendar {
    /// Reads the wall clock only to decide which academic year we are in.
    pub fn from_clock(config: &CalendarConfig) -> Result<Self, ConfigError> {
        Self::new(config, Utc::now().date_naive())
    }

    pub fn new(config: &CalendarConfig, today: NaiveDate) -> Result<Self, ConfigError> {
        let academic_year = if today.month() < config.term1_start.month {
            today.year() - 1
        } else {
            today.year()
        };

        let term1_start = resolve("term1Start", config.term1_start, academic_year)?;
        let term1_end = resolve("term1End", config.term1_end, academic_year)?;
        let term2_start = resolve("term2Start", config.term2_start, academic_year + 1)?;
        let term2_end = resolve("term2End", config.term2_end, academic_year + 1)?;

        if !(term1_start < term1_end && term1_end < term2_start && term2_start < term2_end) {
            return Err(ConfigError::TermOrder(format!(
                "{term1_start} < {term1_end} < {term2_start} < {term2_end} does not hold"
            )));
        }

        let term1 = TermDates {
            start: term1_start,
            end: term1_end,
        };
        let term2 = TermDates {
            start: term2_start,
            end: term2_end,
        };
        let current_date = place_current_date(config, term1, term2);

        debug!(
            academic_year,
            %term1_start,
            %term1_end,
            %term2_start,
            %term2_end,
            %current_date,
            "term dates calculated"
        );

        Ok(Self {
            academic_year,
            term1,
            term2,
            current_date,
            config: config.clone(),
        })
    }

    pub fn term_dates(&self, term: Term) -> TermDates {
        match term {
            Term::One => self.term1,
            Term::Two => self.term2,
        }
    }

    /// The term "now" falls in.
    pub fn current_term(&self) -> Term {
        if self.current_date <= self.term1.end {
            Term::One
        } else {
            Term::Two
        }
    }

    /// Term a due date is attributed to for progress purposes.
    pub fn term_of(&self, date: NaiveDate) -> Term {
        if date < self.term1.end {
            Term::One
        } else {
            Term::Two
        }
    }

    /// Elapsed fraction of `term` (or the current term) at the current date.
    pub fn term_progress(&self, term: Option<Term>) -> f64 {
        let term = term.unwrap_or_else(|| self.current_term());
        self.term_dates(term).progress_of(self.current_date)
    }

    /// Assessments are never due in the December or spring breaks.
    pub fn is_valid_assessment_date(&self, date: NaiveDate) -> bool {
        let (month, day) = (date.month(), date.day());
        !(self.config.december_break.contains(month, day)
            || self.config.spring_break.contains(month, day))
    }

    pub fn days_from_now(&self, date: NaiveDate) -> i64 {
        (date - self.current_date).num_days()
    }

    pub fn marking_deadline(&self, submission_date: NaiveDate, deadline_days: i64) -> NaiveDate {
        submission_date + Duration::days(deadline_days)
    }
}

fn resolve(field: &'static str, month_day: MonthDay, year: i32) -> Result<NaiveDate, ConfigError> {
    month_day.in_year(year).ok_or(ConfigError::InvalidMonthDay {
        field,
        month: month_day.month,
        day: month_day.day,
    })
}

fn place_current_date(config: &CalendarConfig, term1: TermDates, term2: TermDates) -> NaiveDate {
    let span = (term2.end - term1.start).num_days() as f64;
    let offset = (span * config.target_fraction).round() as i64;
    let mut current = term1.start + Duration::days(offset);

    let in_december_break =
        |date: NaiveDate| config.december_break.contains(date.month(), date.day());
    if (current > term1.end && current < term2.start) || in_december_break(current) {
        current = term2.at_position(config.winter_reposition_fraction);
    }

    let spring = config.spring_recess;
    if spring.contains(current.month(), current.day()) {
        let break_end = NaiveDate::from_ymd_opt(current.year(), spring.month, spring.last_day)
            .unwrap_or(current);
        current = break_end + Duration::days(config.break_recovery_days);
    }

    current.clamp(term1.start, term2.end)
}
