//! Declarative navigator setup.
//!
//! A configuration file describes the document, a set of named templates, and the views that
//! use them:
//!
//! ```toml
//! [document]
//! elements = [{ name = "root" }]
//!
//! [templates.menu]
//! elements = [{ name = "menu", children = [{ name = "submenu" }] }]
//!
//! [[view]]
//! id = "main"
//! container = "root"
//! template = "menu"
//! ```

use crate::error::{NavError, Result};
use crate::navigator::Navigator;
use crate::tree::Template;
use crate::view::{View, ViewBehavior, ViewConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// A parsed configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavigatorConfig {
    /// The navigator’s target document.
    pub document: Template,
    /// Templates views can refer to by name.
    #[serde(default)]
    pub templates: HashMap<String, Template>,
    /// View declarations, in registration order.
    #[serde(default, rename = "view")]
    pub views: Vec<ViewDecl>,
}

/// A view declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewDecl {
    pub id: String,
    #[serde(default)]
    pub container: String,
    /// Name of an entry in the `templates` table.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub dependency: Option<String>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

impl ViewDecl {
    fn resolve(self, templates: &HashMap<String, Arc<Template>>) -> Result<ViewConfig> {
        let template = match self.template {
            Some(name) => match templates.get(&name) {
                Some(template) => Some(Arc::clone(template)),
                None => {
                    return Err(NavError::UnknownTemplate {
                        view: self.id,
                        template: name,
                    })
                }
            },
            None => None,
        };
        Ok(ViewConfig {
            id: self.id,
            container_id: self.container,
            template,
            dependency: self.dependency,
            is_static: self.is_static,
        })
    }
}

impl NavigatorConfig {
    pub fn from_toml_str(source: &str) -> Result<NavigatorConfig> {
        Ok(toml::from_str(source)?)
    }

    /// Creates a navigator and registers every declared view.
    ///
    /// `behavior` is asked for the behavior of each view, in declaration order.
    pub fn build<F>(self, mut behavior: F) -> Result<Navigator>
    where
        F: FnMut(&ViewConfig) -> Box<dyn ViewBehavior>,
    {
        let templates: HashMap<String, Arc<Template>> = self
            .templates
            .into_iter()
            .map(|(name, template)| (name, Arc::new(template)))
            .collect();

        let mut navigator = Navigator::new(self.document);
        for decl in self.views {
            let config = decl.resolve(&templates)?;
            let behavior = behavior(&config);
            navigator.register(View::from_boxed(config, behavior))?;
        }
        Ok(navigator)
    }
}

#[cfg(test)]
const SAMPLE: &str = r#"
[document]
elements = [{ name = "root", children = [{ name = "sidebar" }] }]

[templates.layout]
elements = [{ name = "layout", children = [{ name = "panelB" }] }]

[templates.details]
elements = [{ name = "details" }]

[[view]]
id = "A"
container = "root"
template = "layout"

[[view]]
id = "B"
container = "panelB"
template = "details"
dependency = "A"

[[view]]
id = "C"
container = "sidebar"
template = "details"
static = true
"#;

#[test]
fn test_parse() {
    let config = NavigatorConfig::from_toml_str(SAMPLE).expect("sample should parse");
    assert_eq!(config.document.named_elements(), vec!["root", "sidebar"]);
    assert_eq!(config.templates.len(), 2);
    let ids: Vec<_> = config.views.iter().map(|view| view.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(config.views[1].dependency.as_deref(), Some("A"));
    assert!(config.views[2].is_static);
    assert!(!config.views[0].is_static);
}

#[test]
fn test_build_and_show() {
    use crate::test_support::{event_log, Recorder};

    let log = event_log();
    let mut navigator = NavigatorConfig::from_toml_str(SAMPLE)
        .unwrap()
        .build(|_| Box::new(Recorder::new(&log)))
        .expect("sample should build");

    assert_eq!(navigator.len(), 3);
    let b = navigator.view("B").unwrap();
    let c = navigator.view("C").unwrap();
    assert!(
        Arc::ptr_eq(b.template().unwrap(), c.template().unwrap()),
        "views share named templates"
    );

    navigator.show_view("B").unwrap();
    navigator.deliver_notifications();
    assert!(navigator.is_active("A"));
    assert!(navigator.is_active("B"));
    assert_eq!(log.lock().clone(), vec!["A:enter", "B:enter"]);
}

#[test]
fn test_unknown_template() {
    let source = r#"
        [document]
        elements = [{ name = "root" }]

        [[view]]
        id = "A"
        container = "root"
        template = "missing"
    "#;
    let result = NavigatorConfig::from_toml_str(source)
        .unwrap()
        .build(|_| Box::new(()));
    match result {
        Err(NavError::UnknownTemplate { view, template }) => {
            assert_eq!(view, "A");
            assert_eq!(template, "missing");
        }
        other => panic!("expected an unknown template error, got {:?}", other),
    }
}

#[test]
fn test_duplicate_declaration() {
    let source = r#"
        [document]
        elements = [{ name = "root" }]

        [[view]]
        id = "A"

        [[view]]
        id = "A"
    "#;
    let result = NavigatorConfig::from_toml_str(source)
        .unwrap()
        .build(|_| Box::new(()));
    assert!(matches!(result, Err(NavError::DuplicateView(id)) if id == "A"));
}

#[test]
fn test_invalid_file() {
    let result = NavigatorConfig::from_toml_str("[document]\nelements = 3\n");
    assert!(matches!(result, Err(NavError::Config(_))));

    let result = NavigatorConfig::from_toml_str(
        "[document]\n[[view]]\nid = \"A\"\ncolour = \"blue\"\n",
    );
    assert!(
        matches!(result, Err(NavError::Config(_))),
        "unknown fields are rejected"
    );
}
