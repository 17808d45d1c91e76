//! Output formatting utilities for the CLI.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use serde::Serialize;

use crate::domain::models::{HealthCheck, HistoryEntry, Memory, SecurityReport, Task, UsageLog};

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_json()).unwrap_or_default()
        );
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate a string to a maximum length, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

fn base_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(headers.iter().map(|h| Cell::new(h)));
    table
}

pub fn format_task_table(tasks: &[Task]) -> String {
    let mut table = base_table(&["ID", "Kind", "Status", "Prompt", "Updated"]);
    for task in tasks {
        table.add_row(vec![
            task.id.to_string(),
            task.kind.clone(),
            task.status.as_str().to_string(),
            truncate(&task.prompt, 48),
            task.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_memory_table(memories: &[Memory]) -> String {
    let mut table = base_table(&["Key", "Value", "Category", "Updated"]);
    for memory in memories {
        table.add_row(vec![
            memory.key.clone(),
            truncate(&memory.value, 48),
            memory.category.clone(),
            memory.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_history_table(entries: &[HistoryEntry]) -> String {
    let mut table = base_table(&["When", "Operation", "Input", "OK"]);
    for entry in entries {
        table.add_row(vec![
            entry.recorded_at.format("%H:%M:%S").to_string(),
            entry.operation.clone(),
            truncate(&entry.input, 60),
            if entry.ok { "yes" } else { "no" }.to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_health_table(checks: &[HealthCheck]) -> String {
    let mut table = base_table(&["Provider", "Healthy", "Detail"]);
    for check in checks {
        table.add_row(vec![
            check.provider.clone(),
            if check.healthy { "yes" } else { "no" }.to_string(),
            check.detail.clone().unwrap_or_default(),
        ]);
    }
    table.to_string()
}

pub fn format_usage_table(logs: &[UsageLog]) -> String {
    let mut table = base_table(&["When", "Provider", "Operation", "Units", "Latency (ms)", "OK"]);
    for log in logs {
        table.add_row(vec![
            log.created_at.format("%H:%M:%S").to_string(),
            log.provider.clone(),
            log.operation.clone(),
            log.units.to_string(),
            log.latency_ms.to_string(),
            if log.ok { "yes" } else { "no" }.to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_security_report(report: &SecurityReport) -> String {
    let mut lines = vec![
        format!("Security report for {}", report.subject),
        format!(
            "Grade: {}  (risk score {:.1})",
            report.grade, report.risk_score
        ),
        String::new(),
    ];

    if report.vulnerabilities.is_empty() {
        lines.push("No open findings.".to_string());
    } else {
        let mut table = base_table(&["Severity", "Source", "ID", "Title", "Component"]);
        for vuln in &report.vulnerabilities {
            table.add_row(vec![
                vuln.severity.as_str().to_string(),
                vuln.source.clone(),
                truncate(&vuln.identifier, 24),
                truncate(&vuln.title, 40),
                vuln.component.clone().unwrap_or_default(),
            ]);
        }
        lines.push(table.to_string());
    }

    if !report.errors.is_empty() {
        lines.push(String::new());
        lines.push("Provider errors:".to_string());
        for error in &report.errors {
            lines.push(format!("  - {error}"));
        }
    }

    lines.join("\n")
}
