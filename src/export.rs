use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Student;

#[derive(Debug, Serialize)]
struct SubmissionRow<'a> {
    student_id: &'a str,
    student_name: &'a str,
    program: &'a str,
    module_code: &'a str,
    term: u8,
    assessment_id: &'a str,
    title: &'a str,
    assessment_type: &'a str,
    weight: u32,
    original_due_date: NaiveDate,
    due_date: NaiveDate,
    extension_days: u32,
    extension_reason: Option<&'a str>,
    status: &'a str,
    submission_date: Option<NaiveDate>,
    similarity: Option<u32>,
    grade: Option<u32>,
    feedback_date: Option<NaiveDate>,
}

/// One row per assessment, joined with its submission by id.
pub fn write_submissions<W: Write>(writer: W, students: &[Student]) -> anyhow::Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut written = 0usize;

    for student in students {
        for module in &student.modules {
            for (assessment, submission) in module.pairs() {
                let Some(submission) = submission else {
                    continue;
                };
                csv.serialize(SubmissionRow {
                    student_id: &student.id,
                    student_name: &student.name,
                    program: &student.program,
                    module_code: &module.code,
                    term: module.term.number(),
                    assessment_id: &assessment.id,
                    title: &assessment.title,
                    assessment_type: assessment.kind.as_str(),
                    weight: assessment.weight,
                    original_due_date: assessment.original_due_date,
                    due_date: assessment.due_date,
                    extension_days: assessment.extension_days,
                    extension_reason: assessment.extension_reason.as_deref(),
                    status: submission.status.as_str(),
                    submission_date: submission.submission_date,
                    similarity: submission.similarity,
                    grade: submission.grade,
                    feedback_date: submission.feedback_date,
                })?;
                written += 1;
            }
        }
    }

    csv.flush()?;
    Ok(written)
}

pub fn write_submissions_csv(path: &Path, students: &[Student]) -> anyhow::Result<usize> {
    let file = std::fs::File::create(path)?;
    write_submissions(file, students)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::AcademicCalendar;
    use crate::config::GeneratorConfig;
    use crate::dataset::DatasetGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn writes_header_and_one_row_per_submission() {
        let config = GeneratorConfig::default();
        let calendar = AcademicCalendar::new(
            &config.calendar,
            NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
        )
        .unwrap();
        let mut generator =
            DatasetGenerator::new(config, calendar, StdRng::seed_from_u64(5)).unwrap();
        let students = generator.generate(2);
        let expected: usize = students.iter().map(|s| s.submissions().count()).sum();

        let mut buffer = Vec::new();
        let written = write_submissions(&mut buffer, &students).unwrap();
        assert_eq!(written, expected);

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert!(lines
            .next()
            .unwrap()
            .starts_with("student_id,student_name,program,module_code,term,assessment_id"));
        assert_eq!(lines.count(), expected);
    }
}
