//! Heuristic scorer: rule-based analysis that never leaves the process.
//!
//! Used when no remote credential is configured and as the fallback of last
//! resort when the remote path fails in a way the user cannot act on.
//!
//! Algorithm:
//! 1. Lowercase both texts and substring-match a fixed technology vocabulary.
//!    found = in both, missing = in the job description only.
//! 2. score = base + per-found bonus (capped) + seniority bonus
//!    + per-soft-skill bonus (capped) − per-missing penalty (capped)
//! 3. Clamp, add a small symmetric jitter, clamp again to the final band.
//! 4. ATS and readability scores are sampled from fixed ranges; nothing in
//!    this path measures them.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::analysis::models::AnalysisResult;

/// Technology and general skill terms, matched as lowercase substrings.
pub const VOCABULARY: &[&str] = &[
    "javascript",
    "python",
    "java",
    "react",
    "node",
    "sql",
    "html",
    "css",
    "typescript",
    "angular",
    "vue",
    "php",
    "c++",
    "c#",
    "ruby",
    "go",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "git",
    "jenkins",
    "linux",
    "machine learning",
    "ai",
    "data science",
    "mongodb",
    "postgresql",
    "express",
    "redux",
    "next",
    "spring",
    "django",
    "flask",
    "laravel",
    "bootstrap",
    "tailwind",
    "sass",
    "webpack",
    "babel",
    "npm",
    "yarn",
];

pub const SENIORITY_TERMS: &[&str] = &["senior", "lead", "principal", "manager", "director"];

pub const SOFT_SKILLS: &[&str] = &[
    "communication",
    "teamwork",
    "leadership",
    "problem solving",
    "analytical",
];

/// Empirically chosen weights and bands. Tunable; none of them is derived.
#[derive(Debug, Clone)]
pub struct HeuristicTuning {
    pub base_score: i32,
    pub per_found_bonus: i32,
    pub found_bonus_cap: i32,
    pub seniority_bonus: i32,
    pub per_soft_skill_bonus: i32,
    pub soft_skill_bonus_cap: i32,
    pub per_missing_penalty: i32,
    pub missing_penalty_cap: i32,
    pub pre_jitter_band: RangeInclusive<i32>,
    pub jitter_amplitude: i32,
    pub final_band: RangeInclusive<i32>,
    pub max_found_shown: usize,
    pub max_missing_shown: usize,
    pub ats_range: RangeInclusive<u8>,
    pub readability_range: RangeInclusive<u8>,
}

impl Default for HeuristicTuning {
    fn default() -> Self {
        Self {
            base_score: 30,
            per_found_bonus: 5,
            found_bonus_cap: 40,
            seniority_bonus: 10,
            per_soft_skill_bonus: 3,
            soft_skill_bonus_cap: 15,
            per_missing_penalty: 2,
            missing_penalty_cap: 20,
            pre_jitter_band: 15..=90,
            jitter_amplitude: 5,
            final_band: 20..=85,
            max_found_shown: 8,
            max_missing_shown: 6,
            ats_range: 65..=90,
            readability_range: 75..=95,
        }
    }
}

/// Term overlap between a resume and a job description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordOverlap {
    /// Vocabulary terms present in both texts, in vocabulary order.
    pub found: Vec<&'static str>,
    /// Vocabulary terms present in the job description only.
    pub missing: Vec<&'static str>,
    pub seniority_match: bool,
    pub soft_skill_matches: Vec<&'static str>,
}

impl KeywordOverlap {
    pub fn compute(resume_text: &str, job_description: &str) -> Self {
        let resume = resume_text.to_lowercase();
        let job = job_description.to_lowercase();

        let in_both = |term: &&str| resume.contains(*term) && job.contains(*term);

        let found = VOCABULARY.iter().copied().filter(in_both).collect();
        let missing = VOCABULARY
            .iter()
            .copied()
            .filter(|term| job.contains(*term) && !resume.contains(*term))
            .collect();
        let seniority_match = SENIORITY_TERMS.iter().any(in_both);
        let soft_skill_matches = SOFT_SKILLS.iter().copied().filter(in_both).collect();

        Self {
            found,
            missing,
            seniority_match,
            soft_skill_matches,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    tuning: HeuristicTuning,
}

impl HeuristicScorer {
    /// Scores with the thread-local RNG.
    pub fn score(&self, resume_text: &str, job_description: &str) -> AnalysisResult {
        self.score_with_rng(resume_text, job_description, &mut rand::thread_rng())
    }

    pub fn score_with_rng<R: Rng>(
        &self,
        resume_text: &str,
        job_description: &str,
        rng: &mut R,
    ) -> AnalysisResult {
        let t = &self.tuning;
        let overlap = KeywordOverlap::compute(resume_text, job_description);

        let base = self.unjittered_score(&overlap);
        let jitter = rng.gen_range(-t.jitter_amplitude..=t.jitter_amplitude);
        let match_score = clamp_to(base + jitter, &t.final_band);

        tracing::debug!(
            "Heuristic match score: {match_score} ({} matches, {} missing)",
            overlap.found.len(),
            overlap.missing.len()
        );

        let top_found = join_first(&overlap.found, 3);
        let top_missing = join_first(&overlap.missing, 3);

        let suggestions = vec![
            if overlap.missing.is_empty() {
                "Highlight specific achievements with quantifiable results".to_string()
            } else {
                format!("Add {top_missing} skills mentioned in the job description")
            },
            "Include more industry-specific keywords from the job posting".to_string(),
            "Optimise resume format for ATS compatibility".to_string(),
            "Add measurable accomplishments and impact metrics".to_string(),
            "Tailor experience descriptions to match job requirements".to_string(),
        ];

        let strengths = vec![
            if overlap.found.is_empty() {
                "Well-structured resume format".to_string()
            } else {
                format!("Strong background in {top_found}")
            },
            "Relevant professional experience".to_string(),
            if overlap.seniority_match {
                "Experience level matches job requirements".to_string()
            } else {
                "Clear career progression".to_string()
            },
        ];

        let weaknesses = vec![
            if overlap.missing.is_empty() {
                "Could include more specific achievements".to_string()
            } else {
                format!("Missing key skills: {}", join_first(&overlap.missing, 2))
            },
            "Resume could be more tailored to this specific role".to_string(),
            "Consider adding more quantifiable accomplishments".to_string(),
        ];

        AnalysisResult {
            match_score,
            ats_score: rng.gen_range(t.ats_range.clone()),
            readability_score: rng.gen_range(t.readability_range.clone()),
            found_keywords: take_owned(&overlap.found, t.max_found_shown),
            missing_keywords: take_owned(&overlap.missing, t.max_missing_shown),
            strengths,
            weaknesses,
            suggestions,
        }
    }

    /// Score before jitter, clamped to the pre-jitter band.
    pub fn unjittered_score(&self, overlap: &KeywordOverlap) -> i32 {
        let t = &self.tuning;
        let mut score = t.base_score;

        score += (count(&overlap.found) * t.per_found_bonus).min(t.found_bonus_cap);
        if overlap.seniority_match {
            score += t.seniority_bonus;
        }
        score += (count(&overlap.soft_skill_matches) * t.per_soft_skill_bonus)
            .min(t.soft_skill_bonus_cap);
        score -= (count(&overlap.missing) * t.per_missing_penalty).min(t.missing_penalty_cap);

        score.clamp(*t.pre_jitter_band.start(), *t.pre_jitter_band.end())
    }
}

fn count(terms: &[&str]) -> i32 {
    i32::try_from(terms.len()).unwrap_or(i32::MAX)
}

fn clamp_to(score: i32, band: &RangeInclusive<i32>) -> u8 {
    let clamped = score.clamp((*band.start()).max(0), (*band.end()).min(100));
    u8::try_from(clamped).unwrap_or(0)
}

fn join_first(terms: &[&str], n: usize) -> String {
    terms.iter().take(n).copied().collect::<Vec<_>>().join(", ")
}

fn take_owned(terms: &[&str], n: usize) -> Vec<String> {
    terms.iter().take(n).map(|s| s.to_string()).collect()
}
