use serde::Serialize;
use tracing::debug;

use crate::assessment::AssessmentGenerator;
use crate::calendar::AcademicCalendar;
use crate::config::GeneratorConfig;
use crate::error::ConfigError;
use crate::models::{Module, Student, Term};
use crate::profile::StudentProfile;
use crate::random::RandomSource;
use crate::submission::SubmissionGenerator;

/// Generated students together with the calendar they were generated
/// against.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub calendar: AcademicCalendar,
    pub students: Vec<Student>,
}

/// Owns the one calendar and the random source for a generation run.
pub struct DatasetGenerator<R> {
    config: GeneratorConfig,
    calendar: AcademicCalendar,
    rng: R,
}

impl<R: RandomSource> DatasetGenerator<R> {
    pub fn new(
        config: GeneratorConfig,
        calendar: AcademicCalendar,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            calendar,
            rng,
        })
    }

    pub fn calendar(&self) -> &AcademicCalendar {
        &self.calendar
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&mut self, num_students: usize) -> Vec<Student> {
        debug!(num_students, "generating dataset");
        let Self {
            config,
            calendar,
            rng,
        } = self;

        let assessments = AssessmentGenerator::new(calendar, &config.assessments, &config.catalog);
        let submissions = SubmissionGenerator::new(
            calendar,
            &config.profile.submission_patterns,
            &config.marking,
            config.similarity,
        );

        (0..num_students)
            .map(|i| {
                let profile = StudentProfile::generate(&config.profile, rng);
                let mut modules = Vec::with_capacity(config.catalog.modules_per_term * 2);
                for term in [Term::One, Term::Two] {
                    for entry in config.catalog.modules_for(term) {
                        let module_assessments =
                            assessments.generate(rng, &entry.code, term, Some(&profile));
                        let module_submissions = module_assessments
                            .iter()
                            .map(|assessment| submissions.generate(rng, &profile, assessment))
                            .collect();
                        let extensions =
                            module_assessments.iter().filter(|a| a.has_extension).count();
                        debug!(
                            module = %entry.code,
                            term = %term,
                            assessments = module_assessments.len(),
                            extensions,
                            "generated module"
                        );
                        modules.push(Module {
                            code: entry.code.clone(),
                            name: entry.name.clone(),
                            term,
                            assessments: module_assessments,
                            submissions: module_submissions,
                        });
                    }
                }

                let program = rng
                    .pick(&config.catalog.programs)
                    .cloned()
                    .unwrap_or_default();
                let student = Student {
                    id: student_id(i + 1),
                    name: format!("Student {}", i + 1),
                    year: config.catalog.student_year,
                    program,
                    profile,
                    modules,
                };
                debug!(
                    student = %student.id,
                    program = %student.program,
                    modules = student.modules.len(),
                    "generated student"
                );
                student
            })
            .collect()
    }

    pub fn generate_dataset(&mut self, num_students: usize) -> Dataset {
        let students = self.generate(num_students);
        Dataset {
            calendar: self.calendar.clone(),
            students,
        }
    }
}

/// `X` followed by the 1-based index as eight lowercase hex digits.
pub fn student_id(index: usize) -> String {
    format!("X{index:08x}")
}
