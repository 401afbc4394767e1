use crate::models::{RiskBreakdown, RiskLevel, RiskResult, StudentInput};
use crate::sentiment::PolarityAnalyzer;

pub const ATTENDANCE_THRESHOLD: f64 = 60.0;
pub const GRADES_THRESHOLD: f64 = 50.0;
pub const ASSIGNMENTS_THRESHOLD: f64 = 50.0;

pub const ATTENDANCE_PENALTY: i32 = 30;
pub const GRADES_PENALTY: i32 = 30;
pub const ASSIGNMENTS_PENALTY: i32 = 20;

pub const NEGATIVE_POLARITY_THRESHOLD: f64 = -0.5;
pub const NEGATIVE_MOOD_PENALTY: i32 = 40;
pub const CRISIS_PENALTY: i32 = 50;

pub const CRISIS_WORDS: [&str; 4] = ["hopeless", "give up", "suicide", "worthless"];

pub const MAX_RISK: i32 = 100;
pub const HIGH_RISK_ABOVE: i32 = 60;
pub const MEDIUM_RISK_ABOVE: i32 = 30;

pub fn score(input: &StudentInput, analyzer: &dyn PolarityAnalyzer) -> RiskResult {
    score_with_breakdown(input, analyzer).result
}

pub fn score_with_breakdown(input: &StudentInput, analyzer: &dyn PolarityAnalyzer) -> RiskBreakdown {
    let academic_risk = academic_risk(input.attendance, input.grades, input.assignments);
    let polarity = analyzer.polarity(&input.mood);
    let crisis_detected = contains_crisis_words(&input.mood);
    let mental_risk = mental_risk(polarity, crisis_detected);

    let risk_percentage = (academic_risk + mental_risk).min(MAX_RISK);

    RiskBreakdown {
        academic_risk,
        mental_risk,
        polarity,
        crisis_detected,
        result: RiskResult {
            risk_percentage,
            risk_level: risk_level(risk_percentage),
        },
    }
}

pub fn academic_risk(attendance: f64, grades: f64, assignments: f64) -> i32 {
    let mut risk = 0;
    if attendance < ATTENDANCE_THRESHOLD {
        risk += ATTENDANCE_PENALTY;
    }
    if grades < GRADES_THRESHOLD {
        risk += GRADES_PENALTY;
    }
    if assignments < ASSIGNMENTS_THRESHOLD {
        risk += ASSIGNMENTS_PENALTY;
    }
    risk
}

pub fn mental_risk(polarity: f64, crisis_detected: bool) -> i32 {
    let mut risk = 0;
    if polarity < NEGATIVE_POLARITY_THRESHOLD {
        risk += NEGATIVE_MOOD_PENALTY;
    }
    if crisis_detected {
        risk += CRISIS_PENALTY;
    }
    risk
}

pub fn contains_crisis_words(mood: &str) -> bool {
    let lowered = mood.to_lowercase();
    CRISIS_WORDS.iter().any(|word| lowered.contains(word))
}

pub fn risk_level(risk_percentage: i32) -> RiskLevel {
    match risk_percentage {
        p if p > HIGH_RISK_ABOVE => RiskLevel::High,
        p if p > MEDIUM_RISK_ABOVE => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}
