//! Known attribute classes from the ASP.NET frameworks.
//!
//! Attribute classes usually live in referenced assemblies rather than in
//! the scanned sources, so their immediate base types are tabulated here.
//! The same attribute name can have different bases depending on which
//! framework the file imports: MVC 5's `HttpGetAttribute` derives from
//! `ActionMethodSelectorAttribute`, ASP.NET Core's from `HttpMethodAttribute`.

use phf::phf_map;

/// Immediate bases of ASP.NET Core (`Microsoft.AspNetCore.Mvc`) attributes.
static ASPNET_CORE_ATTRIBUTES: phf::Map<&'static str, &'static str> = phf_map! {
    "HttpGetAttribute" => "HttpMethodAttribute",
    "HttpPostAttribute" => "HttpMethodAttribute",
    "HttpPutAttribute" => "HttpMethodAttribute",
    "HttpDeleteAttribute" => "HttpMethodAttribute",
    "HttpPatchAttribute" => "HttpMethodAttribute",
    "HttpHeadAttribute" => "HttpMethodAttribute",
    "HttpOptionsAttribute" => "HttpMethodAttribute",
    "HttpMethodAttribute" => "Attribute",
    "AcceptVerbsAttribute" => "Attribute",
    "RouteAttribute" => "Attribute",
    "NonActionAttribute" => "Attribute",
    "ActionNameAttribute" => "Attribute",
    "AuthorizeAttribute" => "Attribute",
    "AllowAnonymousAttribute" => "Attribute",
    "ValidateAntiForgeryTokenAttribute" => "Attribute",
    "ProducesAttribute" => "ResultFilterAttribute",
    "ResultFilterAttribute" => "Attribute",
    "ApiControllerAttribute" => "ControllerAttribute",
    "ControllerAttribute" => "Attribute",
};

/// Immediate bases of ASP.NET MVC 5 (`System.Web.Mvc`) attributes.
static ASPNET_MVC_ATTRIBUTES: phf::Map<&'static str, &'static str> = phf_map! {
    "HttpGetAttribute" => "ActionMethodSelectorAttribute",
    "HttpPostAttribute" => "ActionMethodSelectorAttribute",
    "HttpPutAttribute" => "ActionMethodSelectorAttribute",
    "HttpDeleteAttribute" => "ActionMethodSelectorAttribute",
    "HttpPatchAttribute" => "ActionMethodSelectorAttribute",
    "HttpHeadAttribute" => "ActionMethodSelectorAttribute",
    "HttpOptionsAttribute" => "ActionMethodSelectorAttribute",
    "AcceptVerbsAttribute" => "ActionMethodSelectorAttribute",
    "NonActionAttribute" => "ActionMethodSelectorAttribute",
    "ActionMethodSelectorAttribute" => "Attribute",
    "ActionNameAttribute" => "ActionNameSelectorAttribute",
    "ActionNameSelectorAttribute" => "Attribute",
    "HandleErrorAttribute" => "FilterAttribute",
    "AuthorizeAttribute" => "FilterAttribute",
    "ChildActionOnlyAttribute" => "FilterAttribute",
    "ValidateAntiForgeryTokenAttribute" => "FilterAttribute",
    "OutputCacheAttribute" => "ActionFilterAttribute",
    "ActionFilterAttribute" => "FilterAttribute",
    "FilterAttribute" => "Attribute",
    "AllowAnonymousAttribute" => "Attribute",
    "RouteAttribute" => "Attribute",
};

/// A web framework whose attribute classes are tabulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    AspNetCore,
    AspNetMvc,
}

impl Framework {
    /// Namespace that brings the framework's attributes into scope.
    pub fn namespace(&self) -> &'static str {
        match self {
            Framework::AspNetCore => "Microsoft.AspNetCore.Mvc",
            Framework::AspNetMvc => "System.Web.Mvc",
        }
    }

    fn table(&self) -> &'static phf::Map<&'static str, &'static str> {
        match self {
            Framework::AspNetCore => &ASPNET_CORE_ATTRIBUTES,
            Framework::AspNetMvc => &ASPNET_MVC_ATTRIBUTES,
        }
    }

    /// Immediate base of a framework attribute class.
    pub fn attribute_base(&self, class_name: &str) -> Option<&'static str> {
        self.table().get(class_name).copied()
    }

    /// Base recorded on verb attributes this framework provides.
    pub fn verb_base(&self) -> &'static str {
        match self {
            Framework::AspNetCore => "HttpMethodAttribute",
            Framework::AspNetMvc => "ActionMethodSelectorAttribute",
        }
    }

    /// Frameworks to consult for a file, in lookup order.
    ///
    /// Imported frameworks come first. A file importing neither falls back
    /// to ASP.NET Core, then MVC.
    pub fn for_usings(usings: &[String]) -> Vec<Framework> {
        let imported: Vec<Framework> = [Framework::AspNetCore, Framework::AspNetMvc]
            .into_iter()
            .filter(|f| usings.iter().any(|u| u == f.namespace()))
            .collect();

        if imported.is_empty() {
            vec![Framework::AspNetCore, Framework::AspNetMvc]
        } else {
            imported
        }
    }
}

/// Class names an attribute usage may refer to, preferred first.
///
/// `[HttpGet]` binds to `HttpGetAttribute` (or `HttpGet` if no such class
/// exists); `[HttpGetAttribute]` binds to `HttpGetAttribute`.
pub fn attribute_class_candidates(name: &str) -> Vec<String> {
    if name.ends_with("Attribute") {
        vec![name.to_string()]
    } else {
        vec![format!("{}Attribute", name), name.to_string()]
    }
}
