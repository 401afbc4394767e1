use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{LevelCounts, RiskLevel, StudentRecord};
use crate::risk;

#[derive(Debug, Clone, PartialEq)]
pub struct LevelSummary {
    pub level: RiskLevel,
    pub count: usize,
    pub avg_attendance: f64,
    pub avg_grades: f64,
    pub avg_assignments: f64,
}

pub fn summarize_by_level(records: &[StudentRecord]) -> Vec<LevelSummary> {
    [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low]
        .into_iter()
        .filter_map(|level| {
            let matching: Vec<&StudentRecord> =
                records.iter().filter(|r| r.level == level).collect();
            if matching.is_empty() {
                return None;
            }
            let count = matching.len() as f64;
            Some(LevelSummary {
                level,
                count: matching.len(),
                avg_attendance: matching.iter().map(|r| r.attendance).sum::<f64>() / count,
                avg_grades: matching.iter().map(|r| r.grades).sum::<f64>() / count,
                avg_assignments: matching.iter().map(|r| r.assignments).sum::<f64>() / count,
            })
        })
        .collect()
}

pub fn build_report(generated_on: NaiveDate, records: &[StudentRecord]) -> String {
    let counts = LevelCounts::tally(records);
    let summaries = summarize_by_level(records);

    let mut output = String::new();

    let _ = writeln!(output, "# Student Dropout Risk Report");
    let _ = writeln!(
        output,
        "Generated on {} from {} assessments",
        generated_on, counts.total
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No assessments recorded.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} students (avg attendance {:.1}%, grades {:.1}%, assignments {:.1}%)",
                summary.level,
                summary.count,
                summary.avg_attendance,
                summary.avg_grades,
                summary.avg_assignments
            );
        }
    }

    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.risk.cmp(&a.risk));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Assessments");

    if ranked.is_empty() {
        let _ = writeln!(output, "No assessments recorded.");
    } else {
        for record in ranked.iter().take(10) {
            let _ = writeln!(
                output,
                "- {}% {} (attendance {:.0}%, grades {:.0}%, assignments {:.0}%): \"{}\"",
                record.risk,
                record.level,
                record.attendance,
                record.grades,
                record.assignments,
                record.mood
            );
        }
    }

    let crisis: Vec<&StudentRecord> = records
        .iter()
        .filter(|r| risk::contains_crisis_words(&r.mood))
        .collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Crisis Language");

    if crisis.is_empty() {
        let _ = writeln!(output, "No crisis language detected.");
    } else {
        let _ = writeln!(
            output,
            "{} assessments mention crisis language and need follow-up:",
            crisis.len()
        );
        for record in crisis {
            let _ = writeln!(output, "- {}% {}: \"{}\"", record.risk, record.level, record.mood);
        }
    }

    output
}
