use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentInput {
    pub attendance: f64,
    pub grades: f64,
    pub assignments: f64,
    pub mood: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            other => anyhow::bail!("unknown risk level {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskResult {
    pub risk_percentage: i32,
    pub risk_level: RiskLevel,
}

/// Intermediate terms of a score, kept for logging and the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskBreakdown {
    pub academic_risk: i32,
    pub mental_risk: i32,
    pub polarity: f64,
    pub crisis_detected: bool,
    pub result: RiskResult,
}

/// Flat persisted shape: the input merged with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub attendance: f64,
    pub grades: f64,
    pub assignments: f64,
    pub mood: String,
    pub risk: i32,
    pub level: RiskLevel,
}

impl StudentRecord {
    pub fn from_scored(input: StudentInput, result: RiskResult) -> Self {
        Self {
            attendance: input.attendance,
            grades: input.grades,
            assignments: input.assignments,
            mood: input.mood,
            risk: result.risk_percentage,
            level: result.risk_level,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl LevelCounts {
    pub fn tally(records: &[StudentRecord]) -> Self {
        let mut counts = LevelCounts::default();
        for record in records {
            counts.total += 1;
            match record.level {
                RiskLevel::High => counts.high += 1,
                RiskLevel::Medium => counts.medium += 1,
                RiskLevel::Low => counts.low += 1,
            }
        }
        counts
    }
}
