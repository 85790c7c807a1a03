use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Term;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

/// Inclusive month/day window that recurs every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakWindow {
    pub month: u32,
    pub first_day: u32,
    pub last_day: u32,
}

impl BreakWindow {
    pub fn contains(&self, month: u32, day: u32) -> bool {
        month == self.month && (self.first_day..=self.last_day).contains(&day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub calendar: CalendarConfig,
    pub profile: ProfileConfig,
    pub assessments: AssessmentConfig,
    pub marking: MarkingConfig,
    pub similarity: IntRange,
    pub catalog: CatalogConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            profile: ProfileConfig::default(),
            assessments: AssessmentConfig::default(),
            marking: MarkingConfig::default(),
            similarity: IntRange { min: 5, max: 40 },
            catalog: CatalogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarConfig {
    pub term1_start: MonthDay,
    pub term1_end: MonthDay,
    pub term2_start: MonthDay,
    pub term2_end: MonthDay,
    /// Where "now" sits along term-1 start .. term-2 end.
    pub target_fraction: f64,
    /// Term-2 progress used when the target lands in the winter gap.
    pub winter_reposition_fraction: f64,
    pub december_break: BreakWindow,
    /// Assessments are never due inside this window.
    pub spring_break: BreakWindow,
    /// "Now" is moved past this wider window when the target lands in it.
    pub spring_recess: BreakWindow,
    pub break_recovery_days: i64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            term1_start: MonthDay::new(9, 23),
            term1_end: MonthDay::new(12, 15),
            term2_start: MonthDay::new(1, 13),
            term2_end: MonthDay::new(5, 15),
            target_fraction: 0.67,
            winter_reposition_fraction: 0.25,
            december_break: BreakWindow {
                month: 12,
                first_day: 16,
                last_day: 31,
            },
            spring_break: BreakWindow {
                month: 4,
                first_day: 2,
                last_day: 14,
            },
            spring_recess: BreakWindow {
                month: 4,
                first_day: 1,
                last_day: 15,
            },
            break_recovery_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileConfig {
    pub base_ability: AbilityConfig,
    pub engagement_noise: f64,
    /// Full width of the per-assessment engagement jitter (0.2 means ±10%).
    pub engagement_jitter: f64,
    pub grade_ranges: GradeRangeConfig,
    pub submission_patterns: SubmissionPatternConfig,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            base_ability: AbilityConfig::default(),
            engagement_noise: 0.3,
            engagement_jitter: 0.2,
            grade_ranges: GradeRangeConfig::default(),
            submission_patterns: SubmissionPatternConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityConfig {
    pub min: f64,
    pub max: f64,
    pub weight: f64,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            min: 0.2,
            max: 1.0,
            weight: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradeRangeConfig {
    pub min_base: f64,
    pub max_base: f64,
    pub range_multiplier: f64,
}

impl Default for GradeRangeConfig {
    fn default() -> Self {
        Self {
            min_base: 35.0,
            max_base: 45.0,
            range_multiplier: 55.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionPatternConfig {
    pub base_on_time_prob: f64,
    pub base_late_prob: f64,
    pub base_missing_prob: f64,
    pub engagement_multiplier: f64,
}

impl Default for SubmissionPatternConfig {
    fn default() -> Self {
        Self {
            base_on_time_prob: 0.75,
            base_late_prob: 0.10,
            base_missing_prob: 0.05,
            engagement_multiplier: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssessmentConfig {
    pub per_module: IntRange,
    pub weight: IntRange,
    pub submission_window_days: IntRange,
    pub placement: PlacementConfig,
    pub extensions: ExtensionConfig,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            per_module: IntRange { min: 2, max: 3 },
            weight: IntRange { min: 20, max: 50 },
            submission_window_days: IntRange { min: 14, max: 21 },
            placement: PlacementConfig::default(),
            extensions: ExtensionConfig::default(),
        }
    }
}

/// Term-position knobs for assessments in the term that contains "now".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementConfig {
    pub early: FloatRange,
    pub far_along_threshold: f64,
    pub far_along_early_scale: f64,
    pub late_offset: FloatRange,
    pub late_floor: f64,
    pub middle_window: f64,
    pub max_position: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            early: FloatRange {
                min: 0.10,
                max: 0.30,
            },
            far_along_threshold: 0.6,
            far_along_early_scale: 0.5,
            late_offset: FloatRange {
                min: -0.05,
                max: 0.20,
            },
            late_floor: 0.6,
            middle_window: 0.15,
            max_position: 0.95,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionConfig {
    pub rate: f64,
    pub short_days: i64,
    pub long_days: i64,
    pub short_prob: f64,
    pub eligibility_window_days: i64,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            rate: 0.15,
            short_days: 7,
            long_days: 14,
            short_prob: 0.7,
            eligibility_window_days: 45,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkingConfig {
    pub deadline_days: i64,
    pub on_time_prob: f64,
    pub late_prob: f64,
    pub very_late_prob: f64,
    pub late_penalty: i64,
    pub late_grade_floor: i64,
}

impl Default for MarkingConfig {
    fn default() -> Self {
        Self {
            deadline_days: 21,
            on_time_prob: 0.85,
            late_prob: 0.12,
            very_late_prob: 0.03,
            late_penalty: 10,
            late_grade_floor: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
    pub term: Term,
}

impl CatalogEntry {
    fn new(code: &str, name: &str, term: Term) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            term,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogConfig {
    pub modules: Vec<CatalogEntry>,
    pub modules_per_term: usize,
    pub programs: Vec<String>,
    pub student_year: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            modules: vec![
                CatalogEntry::new("ECM1400", "Programming", Term::One),
                CatalogEntry::new("ECM1401", "Discrete Mathematics", Term::One),
                CatalogEntry::new("ECM1402", "Computer Systems", Term::One),
                CatalogEntry::new("ECM1403", "Data Structures", Term::One),
                CatalogEntry::new("ECM1404", "Professional Development", Term::One),
                CatalogEntry::new("ECM2410", "Algorithms", Term::Two),
                CatalogEntry::new("ECM2411", "Database Systems", Term::Two),
                CatalogEntry::new("ECM2412", "Software Engineering", Term::Two),
                CatalogEntry::new("ECM2413", "Artificial Intelligence", Term::Two),
                CatalogEntry::new("ECM2414", "Web Development", Term::Two),
            ],
            modules_per_term: 3,
            programs: vec![
                "Computer Science".to_string(),
                "Data Science".to_string(),
                "Applied AI".to_string(),
            ],
            student_year: 2,
        }
    }
}

impl CatalogConfig {
    /// The fixed modules every student takes in `term`, in catalog order.
    pub fn modules_for(&self, term: Term) -> impl Iterator<Item = &CatalogEntry> {
        self.modules
            .iter()
            .filter(move |entry| entry.term == term)
            .take(self.modules_per_term)
    }

    pub fn module_name(&self, code: &str) -> Option<&str> {
        self.modules
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.name.as_str())
    }
}

impl GeneratorConfig {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let calendar = &self.calendar;
        check_fraction("calendar.targetFraction", calendar.target_fraction)?;
        check_fraction(
            "calendar.winterRepositionFraction",
            calendar.winter_reposition_fraction,
        )?;
        for (field, window) in [
            ("calendar.decemberBreak", calendar.december_break),
            ("calendar.springBreak", calendar.spring_break),
            ("calendar.springRecess", calendar.spring_recess),
        ] {
            check_range(field, window.first_day as f64, window.last_day as f64)?;
            if !(1..=12).contains(&window.month) || window.first_day == 0 || window.last_day > 31 {
                return Err(ConfigError::InvalidMonthDay {
                    field,
                    month: window.month,
                    day: window.last_day,
                });
            }
        }
        check_non_negative("calendar.breakRecoveryDays", calendar.break_recovery_days)?;

        let profile = &self.profile;
        check_range(
            "profile.baseAbility",
            profile.base_ability.min,
            profile.base_ability.max,
        )?;
        check_fraction("profile.baseAbility.min", profile.base_ability.min)?;
        check_fraction("profile.baseAbility.max", profile.base_ability.max)?;
        check_fraction("profile.engagementJitter", profile.engagement_jitter)?;
        let patterns = &profile.submission_patterns;
        check_fraction("profile.submissionPatterns.baseOnTimeProb", patterns.base_on_time_prob)?;
        check_fraction("profile.submissionPatterns.baseLateProb", patterns.base_late_prob)?;
        check_fraction(
            "profile.submissionPatterns.baseMissingProb",
            patterns.base_missing_prob,
        )?;
        check_range(
            "profile.gradeRanges",
            profile.grade_ranges.min_base,
            profile.grade_ranges.max_base,
        )?;

        let assessments = &self.assessments;
        check_int_range("assessments.perModule", assessments.per_module)?;
        check_non_negative("assessments.perModule.min", assessments.per_module.min)?;
        check_int_range("assessments.weight", assessments.weight)?;
        check_non_negative("assessments.weight.min", assessments.weight.min)?;
        check_int_range(
            "assessments.submissionWindowDays",
            assessments.submission_window_days,
        )?;
        check_non_negative(
            "assessments.submissionWindowDays.min",
            assessments.submission_window_days.min,
        )?;
        let placement = &assessments.placement;
        check_range("assessments.placement.early", placement.early.min, placement.early.max)?;
        check_range(
            "assessments.placement.lateOffset",
            placement.late_offset.min,
            placement.late_offset.max,
        )?;
        check_fraction("assessments.placement.early.min", placement.early.min)?;
        check_fraction("assessments.placement.early.max", placement.early.max)?;
        check_fraction("assessments.placement.lateFloor", placement.late_floor)?;
        check_fraction("assessments.placement.maxPosition", placement.max_position)?;
        check_range(
            "assessments.placement.lateFloor..maxPosition",
            placement.late_floor,
            placement.max_position,
        )?;
        check_fraction("assessments.extensions.rate", assessments.extensions.rate)?;
        check_fraction(
            "assessments.extensions.shortProb",
            assessments.extensions.short_prob,
        )?;
        let extensions = &assessments.extensions;
        check_non_negative("assessments.extensions.shortDays", extensions.short_days)?;
        check_non_negative("assessments.extensions.longDays", extensions.long_days)?;
        check_non_negative(
            "assessments.extensions.eligibilityWindowDays",
            extensions.eligibility_window_days,
        )?;

        let marking = &self.marking;
        check_fraction("marking.onTimeProb", marking.on_time_prob)?;
        check_fraction("marking.lateProb", marking.late_prob)?;
        check_fraction("marking.veryLateProb", marking.very_late_prob)?;
        check_non_negative("marking.deadlineDays", marking.deadline_days)?;
        check_non_negative("marking.latePenalty", marking.late_penalty)?;
        check_non_negative("marking.lateGradeFloor", marking.late_grade_floor)?;

        check_int_range("similarity", self.similarity)?;
        check_non_negative("similarity.min", self.similarity.min)?;

        for term in [Term::One, Term::Two] {
            let available = self.catalog.modules_for(term).count();
            if available < self.catalog.modules_per_term {
                return Err(ConfigError::CatalogTooSmall {
                    term: term.number(),
                    available,
                    required: self.catalog.modules_per_term,
                });
            }
        }
        if self.catalog.programs.is_empty() {
            return Err(ConfigError::NoPrograms);
        }

        Ok(())
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { field, value })
    }
}

fn check_range(field: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

fn check_non_negative(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value >= 0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeValue { field, value })
    }
}

fn check_int_range(field: &'static str, range: IntRange) -> Result<(), ConfigError> {
    check_range(field, range.min as f64, range.max as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn default_catalog_picks_first_three_per_term() {
        let catalog = CatalogConfig::default();
        let term1: Vec<&str> = catalog.modules_for(Term::One).map(|m| m.code.as_str()).collect();
        let term2: Vec<&str> = catalog.modules_for(Term::Two).map(|m| m.code.as_str()).collect();
        assert_eq!(term1, vec!["ECM1400", "ECM1401", "ECM1402"]);
        assert_eq!(term2, vec!["ECM2410", "ECM2411", "ECM2412"]);
    }

    #[test]
    fn rejects_inverted_ranges() {
        let mut config = GeneratorConfig::default();
        config.assessments.weight = IntRange { min: 60, max: 10 };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange {
                field: "assessments.weight",
                ..
            })
        ));
    }

    #[test]
    fn rejects_fraction_outside_unit_interval() {
        let mut config = GeneratorConfig::default();
        config.calendar.target_fraction = 1.4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FractionOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_negative_day_counts_and_ranges() {
        let cases: [(&str, fn(&mut GeneratorConfig)); 8] = [
            ("assessments.extensions.shortDays", |c| {
                c.assessments.extensions.short_days = -7
            }),
            ("assessments.extensions.longDays", |c| {
                c.assessments.extensions.long_days = -14
            }),
            ("assessments.weight.min", |c| {
                c.assessments.weight = IntRange { min: -5, max: -1 }
            }),
            ("assessments.submissionWindowDays.min", |c| {
                c.assessments.submission_window_days = IntRange { min: -2, max: 3 }
            }),
            ("similarity.min", |c| c.similarity = IntRange { min: -3, max: -1 }),
            ("marking.deadlineDays", |c| c.marking.deadline_days = -1),
            ("marking.latePenalty", |c| c.marking.late_penalty = -10),
            ("calendar.breakRecoveryDays", |c| c.calendar.break_recovery_days = -7),
        ];
        for (field, mutate) in cases {
            let mut config = GeneratorConfig::default();
            mutate(&mut config);
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::NegativeValue { field: f, .. }) if f == field
                ),
                "{field} accepted"
            );
        }
    }

    #[test]
    fn rejects_break_window_outside_calendar() {
        let mut config = GeneratorConfig::default();
        config.calendar.spring_recess.month = 13;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidMonthDay {
                field: "calendar.springRecess",
                month: 13,
                day: 15,
            })
        );
    }

    #[test]
    fn rejects_short_catalog() {
        let mut config = GeneratorConfig::default();
        config.catalog.modules.retain(|m| m.term == Term::One);
        assert_eq!(
            config.validate(),
            Err(ConfigError::CatalogTooSmall {
                term: 2,
                available: 0,
                required: 3,
            })
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let raw = r#"{"calendar": {"targetFraction": 0.3}, "similarity": {"min": 1, "max": 9}}"#;
        let config: GeneratorConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.calendar.target_fraction, 0.3);
        assert_eq!(config.calendar.term1_start, MonthDay::new(9, 23));
        assert_eq!(config.similarity, IntRange { min: 1, max: 9 });
        assert_eq!(config.marking.deadline_days, 21);
    }
}
