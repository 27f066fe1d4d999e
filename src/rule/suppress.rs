//! Suppression of diagnostics via C# warning pragmas.
//!
//! Supports:
//! - `#pragma warning disable ControllerHttpAttributeAnalyzer`
//! - `#pragma warning restore ControllerHttpAttributeAnalyzer`
//! - bare `#pragma warning disable` / `restore`, which apply to every rule
//!
//! Several ids may be listed, separated by commas. A trailing `//` comment
//! is ignored. Restoring one rule inside a bare `disable` re-enables only
//! that rule.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Diagnostic, SuppressedDiagnostic};

/// A range of lines where a rule (or every rule) is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionRegion {
    pub file: String,
    /// Rule id, or `None` for every rule.
    pub rule: Option<String>,
    /// Line of the `disable` pragma (1-indexed).
    pub start_line: usize,
    /// Line of the matching `restore`, or `None` to end of file.
    pub end_line: Option<usize>,
    /// Rules restored inside a region that covers every rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<String>,
}

impl SuppressionRegion {
    /// Whether this region hides `diagnostic`.
    pub fn covers(&self, diagnostic: &Diagnostic) -> bool {
        let line = diagnostic.location.line;
        self.file == diagnostic.location.file
            && self.rule.as_deref().map_or(true, |r| r == diagnostic.rule_id)
            && !self.except.iter().any(|r| *r == diagnostic.rule_id)
            && line > self.start_line
            && self.end_line.map_or(true, |end| line < end)
    }
}

lazy_static::lazy_static! {
    static ref PRAGMA_PATTERN: Regex =
        Regex::new(r"^\s*#\s*pragma\s+warning\s+(disable|restore)\b([^/]*)").unwrap();
}

/// An open bare `disable`: its start line and the rules restored since.
struct OpenAll {
    start: usize,
    except: Vec<String>,
}

impl OpenAll {
    fn close(self, file: &str, end_line: Option<usize>) -> SuppressionRegion {
        SuppressionRegion {
            file: file.to_string(),
            rule: None,
            start_line: self.start,
            end_line,
            except: self.except,
        }
    }
}

/// Parse warning pragmas from file content into suppression regions.
pub fn parse_pragmas(file_path: &str, content: &str) -> Vec<SuppressionRegion> {
    let mut regions = Vec::new();
    let mut open: HashMap<String, usize> = HashMap::new();
    let mut all: Option<OpenAll> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line_number = line_num + 1;
        let caps = match PRAGMA_PATTERN.captures(line) {
            Some(c) => c,
            None => continue,
        };

        let disable = caps.get(1).map(|m| m.as_str()) == Some("disable");
        let ids: Vec<String> = caps
            .get(2)
            .map(|m| m.as_str())
            .unwrap_or("")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if ids.is_empty() {
            if disable {
                // Rules restored since the last bare disable are disabled again.
                if all.as_ref().map_or(false, |a| !a.except.is_empty()) {
                    regions.extend(all.take().map(|a| a.close(file_path, Some(line_number))));
                }
                all.get_or_insert(OpenAll {
                    start: line_number,
                    except: Vec::new(),
                });
            } else {
                regions.extend(all.take().map(|a| a.close(file_path, Some(line_number))));
                for (rule, start) in open.drain() {
                    regions.push(region(file_path, rule, start, Some(line_number)));
                }
            }
            continue;
        }

        for id in ids {
            if disable {
                open.entry(id).or_insert(line_number);
                continue;
            }
            if let Some(start) = open.remove(&id) {
                regions.push(region(file_path, id.clone(), start, Some(line_number)));
            }
            if let Some(current) = all.take() {
                if current.except.contains(&id) {
                    all = Some(current);
                } else {
                    let mut except = current.except.clone();
                    except.push(id);
                    regions.push(current.close(file_path, Some(line_number)));
                    all = Some(OpenAll {
                        start: line_number,
                        except,
                    });
                }
            }
        }
    }

    for (rule, start) in open {
        regions.push(region(file_path, rule, start, None));
    }
    regions.extend(all.map(|a| a.close(file_path, None)));

    regions.sort_by_key(|r| r.start_line);
    regions
}

fn region(
    file: &str,
    rule: String,
    start_line: usize,
    end_line: Option<usize>,
) -> SuppressionRegion {
    SuppressionRegion {
        file: file.to_string(),
        rule: Some(rule),
        start_line,
        end_line,
        except: Vec::new(),
    }
}

/// Split diagnostics into active and suppressed.
pub fn filter_suppressed(
    diagnostics: Vec<Diagnostic>,
    regions: &[SuppressionRegion],
) -> (Vec<Diagnostic>, Vec<SuppressedDiagnostic>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for diagnostic in diagnostics {
        match regions.iter().find(|r| r.covers(&diagnostic)) {
            Some(r) => suppressed.push(SuppressedDiagnostic {
                diagnostic,
                pragma_line: r.start_line,
            }),
            None => active.push(diagnostic),
        }
    }

    (active, suppressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Location, Severity};

    fn diagnostic_at(line: usize) -> Diagnostic {
        Diagnostic {
            rule_id: "ControllerHttpAttributeAnalyzer".to_string(),
            method_name: "Index".to_string(),
            message: "Controller method 'Index' does not specify a HTTP verb attribute".to_string(),
            location: Location {
                file: "HomeController.cs".to_string(),
                line,
                column: 9,
                end_line: line,
                end_column: 14,
                start_byte: 0,
                end_byte: 5,
            },
            severity: Severity::Warning,
        }
    }

    #[test]
    fn test_disable_restore_region() {
        let content = r#"
class HomeController : Controller
{
#pragma warning disable ControllerHttpAttributeAnalyzer // legacy actions
    public IActionResult Index() => View();
#pragma warning restore ControllerHttpAttributeAnalyzer
    public IActionResult About() => View();
}
"#;
        let regions = parse_pragmas("HomeController.cs", content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].start_line, 4);
        assert_eq!(regions[0].end_line, Some(6));
        assert_eq!(
            regions[0].rule.as_deref(),
            Some("ControllerHttpAttributeAnalyzer")
        );

        let (active, suppressed) =
            filter_suppressed(vec![diagnostic_at(5), diagnostic_at(7)], &regions);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].location.line, 7);
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].pragma_line, 4);
    }

    #[test]
    fn test_bare_disable_runs_to_end_of_file() {
        let content = "#pragma warning disable\nclass A {}\n";
        let regions = parse_pragmas("HomeController.cs", content);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].rule.is_none());
        assert!(regions[0].end_line.is_none());
        assert!(regions[0].covers(&diagnostic_at(40)));
    }

    #[test]
    fn test_specific_restore_inside_bare_disable() {
        let content = r#"class HomeController : Controller
{
#pragma warning disable
    public IActionResult Hidden() => View();
#pragma warning restore ControllerHttpAttributeAnalyzer
    public IActionResult Index() => View();
}
"#;
        let regions = parse_pragmas("HomeController.cs", content);
        let (active, suppressed) =
            filter_suppressed(vec![diagnostic_at(4), diagnostic_at(6)], &regions);

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].location.line, 6);
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].pragma_line, 3);

        // Other rules stay disabled after the restore.
        let mut other = diagnostic_at(6);
        other.rule_id = "CS1591".to_string();
        assert!(regions.iter().any(|r| r.covers(&other)));
    }

    #[test]
    fn test_bare_disable_after_specific_restore() {
        let content = concat!(
            "#pragma warning disable\n",
            "#pragma warning restore ControllerHttpAttributeAnalyzer\n",
            "class A {}\n",
            "#pragma warning disable\n",
            "class B {}\n",
        );
        let regions = parse_pragmas("HomeController.cs", content);
        let (active, suppressed) =
            filter_suppressed(vec![diagnostic_at(3), diagnostic_at(5)], &regions);

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].location.line, 3);
        assert_eq!(suppressed[0].pragma_line, 4);
    }

    #[test]
    fn test_other_rule_ids_do_not_suppress() {
        let content = "#pragma warning disable CS1591, CS0618\nclass A {}\n";
        let regions = parse_pragmas("HomeController.cs", content);
        assert_eq!(regions.len(), 2);
        let (active, suppressed) = filter_suppressed(vec![diagnostic_at(3)], &regions);
        assert_eq!(active.len(), 1);
        assert!(suppressed.is_empty());
    }

    #[test]
    fn test_other_file_is_not_covered() {
        let regions = parse_pragmas("Other.cs", "#pragma warning disable\n");
        assert!(!regions[0].covers(&diagnostic_at(3)));
    }
}
