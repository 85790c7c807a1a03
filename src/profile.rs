use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{ProfileConfig, SubmissionPatternConfig};
use crate::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRange {
    pub min: u32,
    pub max: u32,
}

/// Unnormalised submission odds; samplers normalise before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPattern {
    pub on_time_prob: f64,
    pub late_prob: f64,
    pub missing_prob: f64,
}

impl SubmissionPattern {
    /// Engagement raises on-time odds and takes half of that from late and
    /// missing each. Neither drops below zero.
    pub fn for_engagement(config: &SubmissionPatternConfig, engagement: f64) -> Self {
        let shift = engagement * config.engagement_multiplier;
        Self {
            on_time_prob: config.base_on_time_prob + shift,
            late_prob: (config.base_late_prob - shift / 2.0).max(0.0),
            missing_prob: (config.base_missing_prob - shift / 2.0).max(0.0),
        }
    }

    /// The three odds scaled to sum to one; all on-time if they sum to zero.
    pub fn normalized(&self) -> Self {
        let total = self.on_time_prob + self.late_prob + self.missing_prob;
        if total <= 0.0 {
            return Self {
                on_time_prob: 1.0,
                late_prob: 0.0,
                missing_prob: 0.0,
            };
        }
        Self {
            on_time_prob: self.on_time_prob / total,
            late_prob: self.late_prob / total,
            missing_prob: self.missing_prob / total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub base_ability: f64,
    pub consistency: f64,
    pub base_engagement: f64,
    pub grade_range: GradeRange,
    pub submission_pattern: SubmissionPattern,
    #[serde(skip, default = "default_jitter")]
    engagement_jitter: f64,
}

fn default_jitter() -> f64 {
    ProfileConfig::default().engagement_jitter
}

impl StudentProfile {
    pub fn generate<R: RandomSource>(config: &ProfileConfig, rng: &mut R) -> Self {
        let ability = &config.base_ability;
        let base_ability = rng.between(
            (ability.min * 100.0).round() as i64,
            (ability.max * 100.0).round() as i64,
        ) as f64
            / 100.0;
        let consistency = rng.next_f64();
        let base_engagement = (base_ability * ability.weight
            + rng.next_f64() * config.engagement_noise)
            .clamp(0.0, 1.0);

        let grades = &config.grade_ranges;
        let grade_min = (grades.min_base + base_ability * grades.range_multiplier).round();
        let grade_max = (grades.max_base + base_ability * grades.range_multiplier).round();
        let grade_range = GradeRange {
            min: grade_min.clamp(0.0, 100.0) as u32,
            max: grade_max.clamp(grade_min.clamp(0.0, 100.0), 100.0) as u32,
        };

        let profile = Self {
            base_ability,
            consistency,
            base_engagement,
            grade_range,
            submission_pattern: SubmissionPattern::for_engagement(
                &config.submission_patterns,
                base_engagement,
            ),
            engagement_jitter: config.engagement_jitter,
        };

        debug!(
            base_ability,
            consistency, base_engagement, "new profile created"
        );
        profile
    }

    /// Engagement for one assessment: the base value with uniform jitter,
    /// kept in `[0, 1]`.
    pub fn engagement_at<R: RandomSource>(&self, rng: &mut R, term_progress: f64) -> f64 {
        let variation = (rng.next_f64() - 0.5) * self.engagement_jitter;
        let engagement = (self.base_engagement + variation).clamp(0.0, 1.0);
        trace!(term_progress, engagement, "sampled engagement");
        engagement
    }
}
