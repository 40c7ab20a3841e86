//! Downloadable analysis report, rendered as plain text.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::analysis::models::AnalysisResult;

const REPORT_TITLE: &str = "Resume Analysis Report";
const REPORT_FOOTER: &str = "Generated by Resume Analyser - AI-Powered Resume Analysis";
const WRAP_WIDTH: usize = 80;

/// `resume-analysis-2026-10-18.txt`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("resume-analysis-{}.txt", date.format("%Y-%m-%d"))
}

pub fn render_report(result: &AnalysisResult, generated_on: NaiveDate) -> String {
    let mut out = String::new();

    let rule = "=".repeat(REPORT_TITLE.len());
    push_line(&mut out, REPORT_TITLE);
    push_line(&mut out, &rule);
    push_line(
        &mut out,
        &format!("Generated on: {}", generated_on.format("%B %-d, %Y")),
    );
    out.push('\n');

    push_line(&mut out, "OVERALL MATCH SCORE");
    push_line(
        &mut out,
        &format!("{}% ({})", result.match_score, result.band().label()),
    );

    section(
        &mut out,
        "Score Breakdown",
        &[
            format!("Resume-Job Fit: {}%", result.match_score),
            format!("ATS Compatibility: {}%", result.ats_score),
            format!("Content Readability: {}%", result.readability_score),
        ],
    );
    paragraph(&mut out, "Found Keywords", &result.found_keywords.join(", "));
    paragraph(&mut out, "Missing Keywords", &result.missing_keywords.join(", "));
    section(&mut out, "Strengths", &result.strengths);
    section(&mut out, "Areas for Improvement", &result.weaknesses);
    section(&mut out, "AI Recommendations", &result.suggestions);

    out.push('\n');
    push_line(&mut out, REPORT_FOOTER);
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn heading(out: &mut String, title: &str) {
    out.push('\n');
    push_line(out, title);
    push_line(out, &"-".repeat(title.len()));
}

/// Numbered items, each wrapped with a hanging indent.
fn section(out: &mut String, title: &str, items: &[String]) {
    heading(out, title);
    if items.is_empty() {
        push_line(out, "None");
        return;
    }
    for (i, item) in items.iter().enumerate() {
        let marker = format!("{}. ", i + 1);
        let indent = " ".repeat(marker.len());
        for (n, line) in wrap(item, WRAP_WIDTH - marker.len()).iter().enumerate() {
            let prefix = if n == 0 { marker.as_str() } else { indent.as_str() };
            // writing to a String cannot fail
            let _ = writeln!(out, "{prefix}{line}");
        }
    }
}

fn paragraph(out: &mut String, title: &str, text: &str) {
    heading(out, title);
    if text.trim().is_empty() {
        push_line(out, "None");
        return;
    }
    for line in wrap(text, WRAP_WIDTH) {
        push_line(out, &line);
    }
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
