use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rand::rngs::StdRng;
use rand::SeedableRng;

use academic_dataset_synth::config::{CalendarConfig, GeneratorConfig};
use academic_dataset_synth::models::{Student, SubmissionStatus};
use academic_dataset_synth::{AcademicCalendar, DatasetGenerator};

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Duration::days(offset)
}

fn generate(
    config: GeneratorConfig,
    seed: u64,
    offset: i64,
) -> (AcademicCalendar, Vec<Student>) {
    let calendar = AcademicCalendar::new(&config.calendar, day(offset)).unwrap();
    let mut generator =
        DatasetGenerator::new(config, calendar.clone(), StdRng::seed_from_u64(seed)).unwrap();
    (calendar, generator.generate(4))
}

fn check_students(
    calendar: &AcademicCalendar,
    students: &[Student],
) -> Result<(), TestCaseError> {
    let now = calendar.current_date;
    for student in students {
        prop_assert_eq!(student.modules.len(), 6);
        for module in &student.modules {
            prop_assert_eq!(module.assessments.len(), module.submissions.len());
            for (assessment, submission) in module.pairs() {
                let submission = submission.unwrap();

                if assessment.placement_converged {
                    prop_assert!(calendar.is_valid_assessment_date(assessment.original_due_date));
                }
                if assessment.has_extension {
                    prop_assert!([7, 14].contains(&assessment.extension_days));
                    prop_assert!(assessment.extension_reason.is_some());
                    let extension = Duration::days(assessment.extension_days as i64);
                    prop_assert_eq!(
                        assessment.due_date,
                        assessment.original_due_date + extension
                    );
                } else {
                    prop_assert_eq!(assessment.extension_days, 0);
                    prop_assert_eq!(assessment.due_date, assessment.original_due_date);
                }
                prop_assert_eq!(assessment.days_from_now, (assessment.due_date - now).num_days());

                prop_assert_eq!(submission.grade.is_some(), submission.feedback.is_some());
                prop_assert_eq!(submission.grade.is_some(), submission.feedback_date.is_some());
                if let (Some(feedback), Some(submitted)) =
                    (submission.feedback_date, submission.submission_date)
                {
                    prop_assert!(feedback > submitted);
                    prop_assert!(feedback <= now);
                }
                match submission.status {
                    SubmissionStatus::Missing | SubmissionStatus::Pending => {
                        prop_assert!(submission.submission_date.is_none());
                        prop_assert!(submission.similarity.is_none());
                    }
                    SubmissionStatus::Late => {
                        prop_assert!(submission.submission_date.unwrap() > assessment.due_date);
                    }
                    SubmissionStatus::Submitted => {
                        prop_assert!(submission.similarity.is_some());
                    }
                }
                if let Some(grade) = submission.grade {
                    prop_assert!(grade <= 100);
                }
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn pt_calendar_terms_ordered_and_now_inside(
        offset in 0_i64..(60 * 366),
        fraction in 0.0_f64..=1.0,
    ) {
        let config = CalendarConfig { target_fraction: fraction, ..CalendarConfig::default() };
        let calendar = AcademicCalendar::new(&config, day(offset)).unwrap();

        prop_assert!(calendar.term1.start < calendar.term1.end);
        prop_assert!(calendar.term1.end < calendar.term2.start);
        prop_assert!(calendar.term2.start < calendar.term2.end);

        let now = calendar.current_date;
        prop_assert!(now >= calendar.term1.start && now <= calendar.term2.end);
        prop_assert!(!(now > calendar.term1.end && now < calendar.term2.start));
        prop_assert!(!(now.month() == 12 && now.day() > 15));
        prop_assert!(!(now.month() == 4 && now.day() <= 15), "now {} in spring recess", now);
    }

    #[test]
    fn pt_generated_dataset_invariants(seed in any::<u64>(), offset in 0_i64..(30 * 366)) {
        let (calendar, students) = generate(GeneratorConfig::default(), seed, offset);
        check_students(&calendar, &students)?;
    }

    #[test]
    fn pt_extensions_shift_due_dates(seed in any::<u64>(), offset in 0_i64..(30 * 366)) {
        let mut config = GeneratorConfig::default();
        config.assessments.extensions.rate = 1.0;
        config.assessments.extensions.eligibility_window_days = 400;
        let (calendar, students) = generate(config, seed, offset);

        for student in &students {
            for module in &student.modules {
                prop_assert!(module.assessments.iter().all(|a| a.has_extension));
            }
        }
        check_students(&calendar, &students)?;
    }
}
