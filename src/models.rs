use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::profile::StudentProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Term {
    One,
    Two,
}

impl Term {
    pub fn number(self) -> u8 {
        match self {
            Term::One => 1,
            Term::Two => 2,
        }
    }
}

impl From<Term> for u8 {
    fn from(term: Term) -> Self {
        term.number()
    }
}

impl TryFrom<u8> for Term {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Term::One),
            2 => Ok(Term::Two),
            other => Err(format!("unknown term {other}")),
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Term {}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentType {
    Coursework,
    Project,
    Quiz,
}

impl AssessmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentType::Coursework => "Coursework",
            AssessmentType::Project => "Project",
            AssessmentType::Quiz => "Quiz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Late,
    Missing,
    Pending,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Late => "late",
            SubmissionStatus::Missing => "missing",
            SubmissionStatus::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    pub weight: u32,
    pub submission_window: u32,
    pub original_due_date: NaiveDate,
    pub due_date: NaiveDate,
    pub has_extension: bool,
    pub extension_days: u32,
    pub extension_reason: Option<String>,
    pub is_past: bool,
    pub days_from_now: i64,
    pub term_position: f64,
    /// False when no break-free date was found within the retry bound.
    pub placement_converged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub assessment_id: String,
    pub status: SubmissionStatus,
    pub submission_date: Option<NaiveDate>,
    pub grade: Option<u32>,
    pub similarity: Option<u32>,
    pub feedback_date: Option<NaiveDate>,
    pub feedback: Option<String>,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub code: String,
    pub name: String,
    pub term: Term,
    pub assessments: Vec<Assessment>,
    /// Same order as `assessments`; each record also names its assessment.
    pub submissions: Vec<Submission>,
}

impl Module {
    pub fn submission_for(&self, assessment_id: &str) -> Option<&Submission> {
        self.submissions
            .iter()
            .find(|submission| submission.assessment_id == assessment_id)
    }

    /// Assessments joined with their submission by id.
    pub fn pairs(&self) -> impl Iterator<Item = (&Assessment, Option<&Submission>)> {
        self.assessments
            .iter()
            .map(|assessment| (assessment, self.submission_for(&assessment.id)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub year: u32,
    pub program: String,
    pub profile: StudentProfile,
    pub modules: Vec<Module>,
}

impl Student {
    pub fn submissions(&self) -> impl Iterator<Item = &Submission> {
        self.modules.iter().flat_map(|module| module.submissions.iter())
    }
}
