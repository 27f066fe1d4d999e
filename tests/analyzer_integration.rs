//! Analyzer behavior on single C# sources.
//!
//! Sources are written with four-space indentation and converted to tabs,
//! so reported columns count one per tab.

use verbcheck::host::{extract_facts, parse_source, TypeIndex};
use verbcheck::rule::{Diagnostic, RuleEvaluator, Severity, RULE_ID};

const FILE: &str = "Test0.cs";

/// Replace each leading group of four spaces with a tab.
fn tabbed(source: &str) -> String {
    source
        .lines()
        .map(|line| {
            let spaces = line.len() - line.trim_start_matches(' ').len();
            format!("{}{}", "\t".repeat(spaces / 4), &line[spaces / 4 * 4..])
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn diagnose(source: &str) -> Vec<Diagnostic> {
    let parsed = parse_source(FILE, &tabbed(source)).expect("source should parse");
    let facts = extract_facts(&parsed);
    let mut index = TypeIndex::new();
    index.add_file(&facts);
    RuleEvaluator::new().evaluate_all(&index.resolve(&facts))
}

fn assert_flagged(diagnostics: &[Diagnostic], method: &str, line: usize, column: usize) {
    assert_eq!(diagnostics.len(), 1, "expected one diagnostic: {:?}", diagnostics);
    let d = &diagnostics[0];
    assert_eq!(d.rule_id, RULE_ID);
    assert_eq!(d.severity, Severity::Warning);
    assert_eq!(
        d.message,
        format!(
            "Controller method '{}' does not specify a HTTP verb attribute",
            method
        )
    );
    assert_eq!(d.location.file, FILE);
    assert_eq!((d.location.line, d.location.column), (line, column));
}

#[test]
fn test_no_code_raises_nothing() {
    assert!(diagnose("").is_empty());
}

#[test]
fn test_private_method_raises_nothing() {
    let source = r#"
                using Microsoft.AspNetCore.Mvc;

                namespace WebApplication1.Controllers
                {
                    public class HomeController : Controller
                    {
                        private IActionResult Index()
                        {
                            return View();
                        }
                    }
                }"#;
    assert!(diagnose(source).is_empty());
}

#[test]
fn test_non_controller_base_raises_nothing() {
    let source = r#"
                using Microsoft.AspNetCore.Mvc;

                namespace WebApplication1.Controllers
                {
                    public class HomeController
                    {
                        public IActionResult Index()
                        {
                            return View();
                        }
                    }
                }"#;
    assert!(diagnose(source).is_empty());
}

#[test]
fn test_multiple_attributes_including_http_get_raises_nothing() {
    let source = r#"
                using System.Web.Mvc;

                namespace WebApplication1.Controllers
                {
                    public class HomeController : Controller
                    {
                        [HandleError]
                        [HttpGet]
                        public IActionResult Index()
                        {
                            return View();
                        }
                    }
                }"#;
    assert!(diagnose(source).is_empty());
}

#[test]
fn test_mvc_http_get_raises_nothing() {
    let source = r#"
                using System.Web.Mvc;

                namespace WebApplication2.Controllers
                {
                    public class HomeController : Controller
                    {
                        [HttpGet]
                        public ActionResult Index()
                        {
                            return View();
                        }
                    }
                }"#;
    assert!(diagnose(source).is_empty());
}

#[test]
fn test_mvc_accept_verbs_raises_nothing() {
    let source = r#"
                using System.Web.Mvc;

                namespace WebApplication2.Controllers
                {
                    public class HomeController : Controller
                    {
                        [AcceptVerbs(HttpVerbs.Get)]
                        public ActionResult Index()
                        {
                            return View();
                        }
                    }
                }"#;
    assert!(diagnose(source).is_empty());
}

#[test]
fn test_core_accept_verbs_is_flagged() {
    // ASP.NET Core's AcceptVerbs derives from Attribute directly.
    let source = r#"
                using Microsoft.AspNetCore.Mvc;

                namespace WebApplication1.Controllers
                {
                    public class HomeController : Controller
                    {
                        [AcceptVerbs("GET")]
                        public IActionResult Index()
                        {
                            return View();
                        }
                    }
                }"#;
    assert_flagged(&diagnose(source), "Index", 9, 28);
}

#[test]
fn test_attribute_with_other_base_is_flagged() {
    let source = r#"
                using System;
                using Microsoft.AspNetCore.Mvc;

                namespace WebApplication1.Controllers
                {
                    public class HttpTest: Attribute
                    {
                    }

                    public class HomeController : Controller
                    {
                        [HttpTest]
                        public IActionResult Index()
                        {
                            return View();
                        }
                    }
                }"#;
    assert_flagged(&diagnose(source), "Index", 14, 28);
}

#[test]
fn test_core_public_method_is_flagged() {
    let source = r#"
                using Microsoft.AspNetCore.Mvc;

                namespace WebApplication1.Controllers
                {
                    public class HomeController : Controller
                    {
                        public IActionResult Index()
                        {
                            return View();
                        }
                    }
                }"#;
    assert_flagged(&diagnose(source), "Index", 8, 28);
}

#[test]
fn test_mvc_public_method_is_flagged() {
    let source = r#"
                using System.Web.Mvc;

                namespace WebApplication2.Controllers
                {
                    public class HomeController : Controller
                    {
                        public ActionResult Index()
                        {
                            return View();
                        }
                    }
                }"#;
    assert_flagged(&diagnose(source), "Index", 8, 27);
}

#[test]
fn test_qualified_verb_attribute_raises_nothing() {
    let source = r#"
                public class HomeController : Microsoft.AspNetCore.Mvc.Controller
                {
                    [Microsoft.AspNetCore.Mvc.HttpPostAttribute]
                    public IActionResult Save()
                    {
                        return View();
                    }
                }"#;
    assert!(diagnose(source).is_empty());
}

#[test]
fn test_only_immediate_base_is_checked() {
    // Grandparent ends in "Controller" but the immediate base does not.
    let source = r#"
                using Microsoft.AspNetCore.Mvc;

                public class SiteBase : Controller { }

                public class HomeController : SiteBase
                {
                    public IActionResult Index()
                    {
                        return View();
                    }
                }"#;
    assert!(diagnose(source).is_empty());
}

#[test]
fn test_static_public_method_is_flagged() {
    let source = r#"
                using Microsoft.AspNetCore.Mvc;

                public class HomeController : Controller
                {
                    public static IActionResult Shared()
                    {
                        return null;
                    }
                }"#;
    assert_flagged(&diagnose(source), "Shared", 6, 34);
}

#[test]
fn test_non_methods_are_not_flagged() {
    let source = r#"
                using Microsoft.AspNetCore.Mvc;

                public class HomeController : Controller, System.IDisposable
                {
                    public HomeController() { }
                    public string Title { get; set; }
                    void System.IDisposable.Dispose() { }
                    public static HomeController operator +(HomeController a, HomeController b) { return a; }
                }"#;
    assert!(diagnose(source).is_empty());
}

#[test]
fn test_one_diagnostic_per_method() {
    let source = r#"
                using Microsoft.AspNetCore.Mvc;

                public class HomeController : Controller
                {
                    [HttpGet]
                    public IActionResult Index() { return View(); }

                    public IActionResult About() { return View(); }

                    public IActionResult Contact() { return View(); }
                }"#;
    let diagnostics = diagnose(source);
    let names: Vec<&str> = diagnostics.iter().map(|d| d.method_name.as_str()).collect();
    assert_eq!(names, vec!["About", "Contact"]);
}
