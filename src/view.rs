use crate::tree::{NodeId, NodeTree, Template};
use core::fmt;
use std::sync::Arc;

/// Prefix of the wrapper node name a view’s content is cloned into.
pub const WRAPPER_PREFIX: &str = "UIView__";

/// Returns the wrapper node name for a view ID.
pub fn wrapper_name(id: &str) -> String {
    format!("{}{}", WRAPPER_PREFIX, id)
}

/// Per-view behavior: lifecycle hooks called by the navigator.
///
/// All hooks do nothing by default, so a view kind only needs to implement the ones it cares
/// about. `()` may be used for views without any behavior.
pub trait ViewBehavior: fmt::Debug + Send {
    /// Called once the view’s content has been attached to the document.
    fn on_enter_focus(&mut self, context: &FocusContext) {
        let _ = context;
    }

    /// Called once the view’s content has been detached from the document.
    ///
    /// The wrapper node is still readable through the context, but no longer connected.
    fn on_leave_focus(&mut self, context: &FocusContext) {
        let _ = context;
    }

    /// Called once per tick while the view is active, unless the view is static.
    fn update(&mut self, context: &FocusContext) {
        let _ = context;
    }
}

/// For views without behavior.
impl ViewBehavior for () {}

/// What a behavior hook gets to see of its view.
pub struct FocusContext<'a> {
    id: &'a str,
    wrapper: NodeId,
    tree: &'a NodeTree,
}

impl<'a> FocusContext<'a> {
    /// The view ID.
    pub fn id(&self) -> &str {
        self.id
    }

    /// The wrapper node holding the view’s content.
    pub fn wrapper(&self) -> NodeId {
        self.wrapper
    }

    pub fn tree(&self) -> &NodeTree {
        self.tree
    }

    /// Looks up a named node inside the view’s own content.
    pub fn query(&self, name: &str) -> Option<NodeId> {
        self.tree.query_by_name(self.wrapper, name)
    }
}

/// View configuration. Fixed once the view is registered.
#[derive(Debug, Clone, Default)]
pub struct ViewConfig {
    /// Unique (per navigator) view ID.
    pub id: String,
    /// Name of the node the view’s content is attached under.
    pub container_id: String,
    /// Content to clone when shown. Views without a template are never drawn.
    pub template: Option<Arc<Template>>,
    /// ID of the view that must be shown before this one.
    pub dependency: Option<String>,
    /// If true, the view never receives `update` calls.
    pub is_static: bool,
}

impl ViewConfig {
    pub fn new(id: impl Into<String>) -> ViewConfig {
        ViewConfig {
            id: id.into(),
            ..ViewConfig::default()
        }
    }

    pub fn container(mut self, container_id: impl Into<String>) -> ViewConfig {
        self.container_id = container_id.into();
        self
    }

    pub fn template(mut self, template: impl Into<Arc<Template>>) -> ViewConfig {
        self.template = Some(template.into());
        self
    }

    pub fn depends_on(mut self, dependency: impl Into<String>) -> ViewConfig {
        self.dependency = Some(dependency.into());
        self
    }

    pub fn static_view(mut self, is_static: bool) -> ViewConfig {
        self.is_static = is_static;
        self
    }
}

/// Lifecycle state of a view.
///
/// `show` and `hide` only move a view into `Attaching`/`Detaching`; the tree’s notifications
/// complete the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewState {
    #[default]
    Inactive,
    /// Content attached, waiting for the attach notification.
    Attaching,
    Active,
    /// Content detached, waiting for the detach notification.
    Detaching,
}

impl ViewState {
    /// True between a confirmed attach and a confirmed detach.
    pub fn is_active(self) -> bool {
        matches!(self, ViewState::Active | ViewState::Detaching)
    }
}

/// How bad a [`Diagnostic`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A configuration remark about a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    NoTemplate,
    NoDependency,
    NoContainer,
}

impl Diagnostic {
    pub fn severity(self) -> Severity {
        match self {
            Diagnostic::NoTemplate => Severity::Warning,
            Diagnostic::NoDependency => Severity::Info,
            Diagnostic::NoContainer => Severity::Error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Diagnostic::NoTemplate => {
                write!(f, "no template has been set, so this view will not be drawn")
            }
            Diagnostic::NoDependency => write!(
                f,
                "no dependency has been set, so this view will be attached on the root document"
            ),
            Diagnostic::NoContainer => write!(
                f,
                "no container has been set, so this view will not be drawn"
            ),
        }
    }
}

/// A registered view.
#[derive(Debug)]
pub struct View {
    config: ViewConfig,
    state: ViewState,
    /// The wrapper node of the current (or pending) attachment.
    wrapper: Option<NodeId>,
    behavior: Box<dyn ViewBehavior>,
}

impl View {
    pub fn new<B: ViewBehavior + 'static>(config: ViewConfig, behavior: B) -> View {
        View::from_boxed(config, Box::new(behavior))
    }

    pub fn from_boxed(config: ViewConfig, behavior: Box<dyn ViewBehavior>) -> View {
        View {
            config,
            state: ViewState::Inactive,
            wrapper: None,
            behavior,
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn container_id(&self) -> &str {
        &self.config.container_id
    }

    pub fn template(&self) -> Option<&Arc<Template>> {
        self.config.template.as_ref()
    }

    pub fn dependency(&self) -> Option<&str> {
        self.config.dependency.as_deref()
    }

    pub fn is_static(&self) -> bool {
        self.config.is_static
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn wrapper_name(&self) -> String {
        wrapper_name(&self.config.id)
    }

    pub fn behavior(&self) -> &dyn ViewBehavior {
        &*self.behavior
    }

    /// Lists configuration problems, most severe first.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if self.config.container_id.is_empty() {
            diagnostics.push(Diagnostic::NoContainer);
        }
        if self.config.template.is_none() {
            diagnostics.push(Diagnostic::NoTemplate);
        }
        if self.config.dependency.is_none() {
            diagnostics.push(Diagnostic::NoDependency);
        }
        diagnostics
    }

    /// Marks the view as waiting for its wrapper’s attach notification.
    pub(crate) fn begin_attach(&mut self, wrapper: NodeId) {
        debug_assert_eq!(self.state, ViewState::Inactive);
        self.state = ViewState::Attaching;
        self.wrapper = Some(wrapper);
    }

    /// Marks the view as waiting for its wrapper’s detach notification.
    pub(crate) fn begin_detach(&mut self) {
        if self.state == ViewState::Active {
            self.state = ViewState::Detaching;
        }
    }

    /// The wrapper node of the current (or pending) attachment.
    pub fn wrapper(&self) -> Option<NodeId> {
        self.wrapper
    }

    /// Handles an attach notification. Returns false if it didn’t apply to this view.
    pub(crate) fn confirm_attach(&mut self, node: NodeId, tree: &NodeTree) -> bool {
        if self.wrapper != Some(node) || self.state != ViewState::Attaching {
            return false;
        }
        self.state = ViewState::Active;
        self.behavior.on_enter_focus(&FocusContext {
            id: &self.config.id,
            wrapper: node,
            tree,
        });
        true
    }

    /// Handles a detach notification. Returns false if it didn’t apply to this view.
    pub(crate) fn confirm_detach(&mut self, node: NodeId, tree: &NodeTree) -> bool {
        if self.wrapper != Some(node) || !self.state.is_active() {
            return false;
        }
        self.state = ViewState::Inactive;
        self.wrapper = None;
        self.behavior.on_leave_focus(&FocusContext {
            id: &self.config.id,
            wrapper: node,
            tree,
        });
        true
    }

    /// Runs the update hook if the view is active and not static.
    pub(crate) fn tick(&mut self, tree: &NodeTree) {
        if self.config.is_static || !self.state.is_active() {
            return;
        }
        if let Some(wrapper) = self.wrapper {
            self.behavior.update(&FocusContext {
                id: &self.config.id,
                wrapper,
                tree,
            });
        }
    }
}

#[test]
fn test_wrapper_name() {
    let view = View::new(ViewConfig::new("settings"), ());
    assert_eq!(view.wrapper_name(), "UIView__settings");
    assert_eq!(wrapper_name("a"), "UIView__a");
}

#[test]
fn test_diagnostics() {
    let view = View::new(ViewConfig::new("bare"), ());
    assert_eq!(
        view.diagnostics(),
        vec![
            Diagnostic::NoContainer,
            Diagnostic::NoTemplate,
            Diagnostic::NoDependency
        ]
    );
    assert_eq!(view.diagnostics()[0].severity(), Severity::Error);

    let view = View::new(
        ViewConfig::new("full")
            .container("root")
            .template(Template::new())
            .depends_on("base"),
        (),
    );
    assert!(view.diagnostics().is_empty());
}

#[test]
fn test_confirmations_require_matching_wrapper() {
    use crate::tree::Element;

    let mut tree = NodeTree::new(&Template::new().element(Element::new("root")));
    let wrapper = tree.instantiate(&Template::new());
    let stranger = tree.instantiate(&Template::new());

    let mut view = View::new(ViewConfig::new("a").container("root"), ());
    assert!(!view.confirm_attach(wrapper, &tree), "nothing was requested yet");

    view.begin_attach(wrapper);
    assert_eq!(view.state(), ViewState::Attaching);
    assert!(!view.is_active());
    assert!(!view.confirm_attach(stranger, &tree));
    assert!(view.confirm_attach(wrapper, &tree));
    assert!(view.is_active());
    assert!(!view.confirm_attach(wrapper, &tree), "already active");

    view.begin_detach();
    assert_eq!(view.state(), ViewState::Detaching);
    assert!(view.is_active(), "still active until the detach is confirmed");
    assert!(view.confirm_detach(wrapper, &tree));
    assert_eq!(view.state(), ViewState::Inactive);
    assert_eq!(view.wrapper(), None);
}
