//! Output formatting for verbcheck results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use colored::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rule::{
    fix_actions, DetectionResult, Diagnostic, Severity, SuppressedDiagnostic, RULE_CATEGORY,
    RULE_DESCRIPTION, RULE_ID, RULE_TITLE,
};
use crate::runner::FixOutcome;

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub files_scanned: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub suppressed_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressedDiagnostic>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub rule: String,
    pub severity: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub method: String,
    pub message: String,
    #[serde(default)]
    pub fixes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSuppressedDiagnostic {
    pub diagnostic: JsonDiagnostic,
    pub pragma_line: usize,
}

/// Build the JSON report for a detection result.
pub fn build_json_report(path: &str, result: &DetectionResult) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        files_scanned: result.scanned,
        diagnostics: result.diagnostics.iter().map(diagnostic_to_json).collect(),
        suppressed_count: result.suppressed.len(),
        suppressed: result
            .suppressed
            .iter()
            .map(|s| JsonSuppressedDiagnostic {
                diagnostic: diagnostic_to_json(&s.diagnostic),
                pragma_line: s.pragma_line,
            })
            .collect(),
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, result: &DetectionResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json_report(path, result))?;
    println!("{}", json);
    Ok(())
}

fn diagnostic_to_json(d: &Diagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        rule: d.rule_id.clone(),
        severity: d.severity.to_string(),
        file: d.location.file.clone(),
        line: d.location.line,
        column: d.location.column,
        method: d.method_name.clone(),
        message: d.message.clone(),
        fixes: fix_actions(d).into_iter().map(|a| a.title).collect(),
    }
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "verbcheck";

#[derive(Serialize, Deserialize)]
struct SarifReport {
    version: String,
    #[serde(rename = "$schema")]
    schema: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
struct SarifRule {
    id: String,
    name: String,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "fullDescription")]
    full_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_config: SarifRuleConfig,
    properties: SarifRuleProperties,
}

#[derive(Serialize, Deserialize)]
struct SarifRuleConfig {
    level: String,
}

#[derive(Serialize, Deserialize)]
struct SarifRuleProperties {
    category: String,
}

#[derive(Serialize, Deserialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize, Deserialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifact,
    region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
struct SarifArtifact {
    uri: String,
}

#[derive(Serialize, Deserialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
    #[serde(rename = "startColumn")]
    start_column: usize,
    #[serde(rename = "endLine")]
    end_line: usize,
    #[serde(rename = "endColumn")]
    end_column: usize,
}

fn map_severity_to_level(severity: &Severity) -> &'static str {
    match severity {
        Severity::Warning => "warning",
    }
}

fn make_relative_path(file_path: &str, base_path: &Path) -> String {
    if base_path.to_string_lossy().is_empty() {
        return file_path.to_string();
    }

    let file = Path::new(file_path);

    // If they're the same (single file scan), return just the filename
    if file == base_path {
        return file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.to_string());
    }

    file.strip_prefix(base_path)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file_path.to_string())
}

/// Render results as a SARIF document.
pub fn build_sarif(base_path: &Path, result: &DetectionResult) -> anyhow::Result<String> {
    let rules = vec![SarifRule {
        id: RULE_ID.to_string(),
        name: RULE_ID.to_string(),
        short_description: SarifMessage {
            text: RULE_TITLE.to_string(),
        },
        full_description: SarifMessage {
            text: RULE_DESCRIPTION.to_string(),
        },
        default_config: SarifRuleConfig {
            level: map_severity_to_level(&Severity::Warning).to_string(),
        },
        properties: SarifRuleProperties {
            category: RULE_CATEGORY.to_string(),
        },
    }];

    let results: Vec<SarifResult> = result
        .diagnostics
        .iter()
        .map(|d| SarifResult {
            rule_id: d.rule_id.clone(),
            level: map_severity_to_level(&d.severity).to_string(),
            message: SarifMessage {
                text: d.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact {
                        uri: make_relative_path(&d.location.file, base_path),
                    },
                    region: SarifRegion {
                        start_line: d.location.line.max(1),
                        start_column: d.location.column.max(1),
                        end_line: d.location.end_line.max(1),
                        end_column: d.location.end_column.max(1),
                    },
                },
            }],
        })
        .collect();

    let report = SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

/// Write results in SARIF format.
pub fn write_sarif(base_path: &Path, result: &DetectionResult) -> anyhow::Result<()> {
    println!("{}", build_sarif(base_path, result)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, result: &DetectionResult, show_suppressed: bool) {
    write_header(path);

    if result.is_clean() {
        print!("  {}", "✓ CLEAN".green());
    } else {
        print!("  {}", "✗ FLAGGED".red());
    }
    print!("  {} file(s) scanned", result.scanned);
    if !result.suppressed.is_empty() {
        print!(
            "  {}",
            format!("({} suppressed)", result.suppressed.len()).dimmed()
        );
    }
    println!();
    println!();

    if !result.diagnostics.is_empty() {
        write_diagnostics(&result.diagnostics);
    }

    if !result.suppressed.is_empty() {
        write_suppressed_summary(&result.suppressed, show_suppressed);
        println!();
    }
}

fn write_header(path: &str) {
    println!();
    print!("  ");
    print!("{}", "verbcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    println!();
}

fn write_diagnostics(diagnostics: &[Diagnostic]) {
    println!("  {} ({}):", "Diagnostics".bold(), diagnostics.len());
    println!();

    for d in diagnostics {
        write_severity_tag(&d.severity);
        print!("{}  ", d.rule_id.dimmed());
        print!("{}", d.location.file.blue());
        print!(
            "{}",
            format!(":{}:{}", d.location.line, d.location.column).dimmed()
        );
        println!();

        println!("            {}", d.message);

        let titles: Vec<String> = fix_actions(d).into_iter().map(|a| a.title).collect();
        if !titles.is_empty() {
            println!("            {} {}", "fixes:".dimmed(), titles.join(", "));
        }
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
    }
}

fn write_suppressed_summary(suppressed: &[SuppressedDiagnostic], show_details: bool) {
    println!("  {} ({}):", "Suppressed".dimmed(), suppressed.len());

    if !show_details {
        println!("    {}", "(use --show-suppressed to see details)".dimmed());
        return;
    }

    println!();
    for s in suppressed {
        let d = &s.diagnostic;
        print!("    {}  ", d.method_name.dimmed());
        print!("{}", d.location.file.blue());
        print!("{}", format!(":{}", d.location.line).dimmed());
        println!();
        println!(
            "            {}",
            format!("#pragma at line {}", s.pragma_line).dimmed()
        );
    }
}

/// Summarize a fix pass.
pub fn write_fix_outcome(path: &str, outcome: &FixOutcome) {
    write_header(path);

    let verb = if outcome.dry_run { "Would apply" } else { "Applied" };
    for fix in &outcome.applied {
        let loc = &fix.diagnostic.location;
        print!("    {} ", "FIX  ".green());
        print!("{}  ", fix.title);
        print!("{}", loc.file.blue());
        println!("{}", format!(":{}:{}", loc.line, loc.column).dimmed());
    }
    for (d, reason) in &outcome.failed {
        print!("    {} ", "SKIP ".yellow());
        print!("{}", d.location.file.blue());
        println!("{}", format!(":{}", d.location.line).dimmed());
        println!("            {}", reason);
    }

    println!();
    println!(
        "  {} {} fix(es) in {} file(s)",
        verb,
        outcome.applied.len(),
        outcome.files_changed
    );
    println!();
}
