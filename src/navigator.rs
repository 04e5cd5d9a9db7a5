//! The navigator: view registry and show/hide orchestration.

use crate::error::{NavError, Result};
use crate::tree::{NodeId, NodeTree, Notification, ObserverToken, Template};
use crate::view::{View, ViewState};
use log::{debug, trace, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Owns a document and the views that can be shown on it.
#[derive(Debug)]
pub struct Navigator {
    /// The template the document was built from.
    document: Arc<Template>,
    tree: NodeTree,
    /// Registered views, in registration order.
    views: Vec<View>,
    /// View ID -> index into `views`.
    index: HashMap<String, usize>,
}

impl Navigator {
    /// Creates a navigator targeting a new document built from the given template.
    pub fn new(document: impl Into<Arc<Template>>) -> Navigator {
        let document = document.into();
        Navigator {
            tree: NodeTree::new(&document),
            document,
            views: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn document(&self) -> &Arc<Template> {
        &self.document
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Number of registered views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Returns an iterator over registered views, in registration order.
    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    pub fn view(&self, id: &str) -> Option<&View> {
        self.index.get(id).map(|index| &self.views[*index])
    }

    pub fn state(&self, id: &str) -> Option<ViewState> {
        self.view(id).map(View::state)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.view(id).map_or(false, View::is_active)
    }

    /// Registers a view.
    ///
    /// Fails if the ID is empty or already taken; the registry is left untouched in that case.
    pub fn register(&mut self, view: View) -> Result<()> {
        if view.id().is_empty() {
            return Err(NavError::InvalidId);
        }
        if self.index.contains_key(view.id()) {
            return Err(NavError::DuplicateView(view.id().to_owned()));
        }
        debug!("registered view {:?}", view.id());
        self.index.insert(view.id().to_owned(), self.views.len());
        self.views.push(view);
        Ok(())
    }

    /// Finds a node by name anywhere in the document.
    pub fn resolve_container(&self, container_id: &str) -> Option<NodeId> {
        let container = self.tree.query_by_name(self.tree.root(), container_id);
        if container.is_none() {
            warn!(
                "could not find container {:?} on the target document",
                container_id
            );
        }
        container
    }

    /// Shows a view, showing its inactive dependencies first.
    ///
    /// Unknown IDs are logged and ignored.
    pub fn show_view(&mut self, id: &str) -> Result<()> {
        match self.lookup(id) {
            Some(index) => self.show_at(index),
            None => Ok(()),
        }
    }

    /// Hides a view, removing its content from the document.
    ///
    /// Unknown IDs are logged and ignored.
    pub fn hide_view(&mut self, id: &str) -> Result<()> {
        match self.lookup(id) {
            Some(index) => self.hide_at(index),
            None => Ok(()),
        }
    }

    /// Removes everything inside a container.
    pub fn clear_container(&mut self, container_id: &str) -> Result<()> {
        if let Some(container) = self.resolve_container(container_id) {
            self.tree.clear_children(container)?;
        }
        Ok(())
    }

    /// Returns a view’s dependencies, nearest first.
    ///
    /// Unknown IDs are logged and have no dependencies.
    pub fn dependency_chain(&self, id: &str) -> Result<Vec<&View>> {
        let index = match self.lookup(id) {
            Some(index) => index,
            None => return Ok(Vec::new()),
        };
        let chain = self.chain_indices(index)?;
        Ok(chain.into_iter().map(|index| &self.views[index]).collect())
    }

    /// Names a view could use as its container: the named elements of its nearest dependency’s
    /// template, or of the document if it has no dependency.
    pub fn candidate_containers(&self, id: &str) -> Result<Vec<String>> {
        let view = match self.lookup(id) {
            Some(index) => &self.views[index],
            None => return Ok(Vec::new()),
        };
        match view.dependency() {
            Some(dependency_id) => {
                let dependency = self.index.get(dependency_id).ok_or_else(|| {
                    NavError::UnknownDependency {
                        view: view.id().to_owned(),
                        dependency: dependency_id.to_owned(),
                    }
                })?;
                Ok(self.views[*dependency]
                    .template()
                    .map(|template| template.named_elements())
                    .unwrap_or_default())
            }
            None => Ok(self.document.named_elements()),
        }
    }

    /// Delivers pending attach/detach notifications to their views.
    ///
    /// Detached wrappers are discarded once the whole batch has been delivered, so every leave
    /// hook in the batch can still read its content.
    pub fn deliver_notifications(&mut self) {
        let pending: Vec<Notification> = self.tree.notifications().collect();
        let mut detached = Vec::new();
        for notification in pending {
            match notification {
                Notification::Attached {
                    node,
                    token: ObserverToken(index),
                } => {
                    let applied = match self.views.get_mut(index) {
                        Some(view) => view.confirm_attach(node, &self.tree),
                        None => false,
                    };
                    if applied {
                        debug!("view {:?} entered focus", self.views[index].id());
                    } else {
                        trace!("ignoring stale attach notification for node {}", node);
                    }
                }
                Notification::Detached {
                    node,
                    token: ObserverToken(index),
                } => {
                    let applied = match self.views.get_mut(index) {
                        Some(view) => view.confirm_detach(node, &self.tree),
                        None => false,
                    };
                    if applied {
                        debug!("view {:?} left focus", self.views[index].id());
                    } else {
                        trace!("ignoring stale detach notification for node {}", node);
                    }
                    // wrappers are never re-attached
                    detached.push(node);
                }
            }
        }
        for node in detached {
            self.tree.discard(node);
        }
        self.tree.collect_garbage();
    }

    /// Runs one tick: delivers notifications, then updates every active, non-static view.
    pub fn tick(&mut self) {
        self.deliver_notifications();
        for view in &mut self.views {
            view.tick(&self.tree);
        }
    }

    /// Looks up a view index by ID, logging a warning if there’s none.
    fn lookup(&self, id: &str) -> Option<usize> {
        let index = self.index.get(id).copied();
        if index.is_none() {
            warn!("could not find a registered view with the key {:?}", id);
        }
        index
    }

    /// Follows the dependency chain of a view, nearest dependency first.
    fn chain_indices(&self, index: usize) -> Result<Vec<usize>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(index);

        let mut current = index;
        while let Some(dependency_id) = self.views[current].dependency() {
            let dependency = *self.index.get(dependency_id).ok_or_else(|| {
                NavError::UnknownDependency {
                    view: self.views[current].id().to_owned(),
                    dependency: dependency_id.to_owned(),
                }
            })?;
            if !visited.insert(dependency) {
                return Err(NavError::DependencyCycle {
                    view: self.views[index].id().to_owned(),
                    repeated: dependency_id.to_owned(),
                });
            }
            chain.push(dependency);
            current = dependency;
        }
        Ok(chain)
    }

    fn show_at(&mut self, index: usize) -> Result<()> {
        let view = &self.views[index];
        let template = match view.template() {
            Some(template) => Arc::clone(template),
            None => {
                debug!("view {:?} has no template and will not be drawn", view.id());
                return Ok(());
            }
        };
        if view.state() != ViewState::Inactive {
            trace!("view {:?} is already {:?}", view.id(), view.state());
            return Ok(());
        }
        if view.container_id().is_empty() {
            return Err(NavError::MissingContainer(view.id().to_owned()));
        }

        // most distant dependency first
        let mut dependencies = self.chain_indices(index)?;
        dependencies.reverse();
        for dependency in dependencies {
            if self.views[dependency].state() == ViewState::Inactive {
                self.show_at(dependency)?;
            }
        }

        let container_id = self.views[index].container_id().to_owned();
        let container = match self.resolve_container(&container_id) {
            Some(container) => container,
            None => return Ok(()),
        };

        // a container only ever holds the latest view shown into it
        self.tree.clear_children(container)?;

        let view = &mut self.views[index];
        let wrapper = self.tree.instantiate(&template);
        self.tree.set_name(wrapper, view.wrapper_name())?;
        self.tree.observe(wrapper, ObserverToken(index))?;
        self.tree.attach(container, wrapper)?;
        view.begin_attach(wrapper);
        debug!("attaching view {:?} under {:?}", view.id(), container_id);
        Ok(())
    }

    fn hide_at(&mut self, index: usize) -> Result<()> {
        let view = &self.views[index];
        if view.state() != ViewState::Active {
            trace!("view {:?} is {:?}; not hiding", view.id(), view.state());
            return Ok(());
        }
        let wrapper = match self.resolve_container(&view.wrapper_name()) {
            Some(wrapper) => wrapper,
            None => return Ok(()),
        };
        if let Some(parent) = self.tree.parent(wrapper) {
            self.tree.detach(parent, wrapper)?;
            let view = &mut self.views[index];
            view.begin_detach();
            debug!("detaching view {:?}", view.id());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{capture_logs, captured_warnings, event_log, EventLog, Recorder};
    use crate::tree::Element;
    use crate::view::{FocusContext, ViewBehavior, ViewConfig};

    fn document() -> Template {
        Template::new().element(Element::new("root").child(Element::new("sidebar")))
    }

    fn layout() -> Template {
        Template::new().element(
            Element::new("layout")
                .child(Element::new("panelB"))
                .child(Element::new("panelC")),
        )
    }

    fn content(name: &str) -> Template {
        Template::new().element(Element::new(name))
    }

    fn recorded(navigator: &mut Navigator, log: &EventLog, config: ViewConfig) {
        navigator
            .register(View::new(config, Recorder::new(log)))
            .expect("registration should succeed");
    }

    /// Focus changes, without updates.
    fn entries(log: &EventLog) -> Vec<String> {
        log.lock()
            .iter()
            .filter(|entry| !entry.ends_with(":update"))
            .cloned()
            .collect()
    }

    #[test]
    fn test_duplicate_registration() {
        let mut navigator = Navigator::new(document());
        let first = View::new(ViewConfig::new("A").container("root"), ());
        let second = View::new(ViewConfig::new("A").container("sidebar"), ());

        assert!(navigator.register(first).is_ok());
        match navigator.register(second) {
            Err(NavError::DuplicateView(id)) => assert_eq!(id, "A"),
            other => panic!("expected a duplicate view error, got {:?}", other),
        }
        assert_eq!(navigator.len(), 1);
        assert_eq!(
            navigator.view("A").map(View::container_id),
            Some("root"),
            "the first registration should be kept"
        );
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let mut navigator = Navigator::new(document());
        let result = navigator.register(View::new(ViewConfig::new(""), ()));
        assert!(matches!(result, Err(NavError::InvalidId)));
        assert!(navigator.is_empty());
    }

    #[test]
    fn test_registration_order() {
        let mut navigator = Navigator::new(document());
        for id in &["c", "a", "b"] {
            navigator
                .register(View::new(ViewConfig::new(*id), ()))
                .unwrap();
        }
        let ids: Vec<_> = navigator.views().map(View::id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_dependency_is_attached_first() {
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A").container("root").template(layout()),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("B")
                .container("panelB")
                .template(content("b"))
                .depends_on("A"),
        );

        navigator.show_view("B").unwrap();

        assert_eq!(navigator.state("A"), Some(ViewState::Attaching));
        assert_eq!(navigator.state("B"), Some(ViewState::Attaching));
        assert!(!navigator.is_active("A"), "not active until the tree confirms");

        let tree = navigator.tree();
        let root = tree.query_by_name(tree.root(), "root").unwrap();
        let a_wrapper = tree.query_by_name(tree.root(), "UIView__A").unwrap();
        assert_eq!(tree.parent(a_wrapper), Some(root));
        let panel = tree.query_by_name(tree.root(), "panelB").unwrap();
        let b_wrapper = tree.query_by_name(tree.root(), "UIView__B").unwrap();
        assert_eq!(tree.parent(b_wrapper), Some(panel));
        assert!(tree.has_pending_notifications());

        navigator.deliver_notifications();
        assert_eq!(entries(&log), vec!["A:enter", "B:enter"]);
    }

    #[test]
    fn test_reading_the_tree_keeps_notifications() {
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A").container("root").template(content("a")),
        );

        navigator.show_view("A").unwrap();
        let shared = &navigator;
        let tree = shared.tree();
        assert!(tree.query_by_name(tree.root(), "UIView__A").is_some());
        assert!(tree.has_pending_notifications());
        assert!(shared.tree().has_pending_notifications(), "reads don’t consume");

        navigator.tick();
        assert_eq!(navigator.state("A"), Some(ViewState::Active));
        navigator.hide_view("A").unwrap();
        navigator.tick();
        assert_eq!(navigator.state("A"), Some(ViewState::Inactive));
        assert_eq!(entries(&log), vec!["A:enter", "A:leave"]);
    }

    #[test]
    fn test_scenario_settles_active() {
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A").container("root").template(layout()),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("B")
                .container("panelB")
                .template(content("b"))
                .depends_on("A"),
        );

        navigator.show_view("B").unwrap();
        navigator.deliver_notifications();

        assert!(navigator.is_active("A"));
        assert!(navigator.is_active("B"));
        assert_eq!(entries(&log), vec!["A:enter", "B:enter"]);
    }

    #[test]
    fn test_chain_activates_bottom_up() {
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("C")
                .container("inner")
                .template(content("c"))
                .depends_on("B"),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("B")
                .container("panelB")
                .template(content("inner"))
                .depends_on("A"),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A").container("root").template(layout()),
        );

        let chain: Vec<_> = navigator
            .dependency_chain("C")
            .unwrap()
            .into_iter()
            .map(View::id)
            .collect();
        assert_eq!(chain, vec!["B", "A"]);

        navigator.show_view("C").unwrap();
        navigator.tick();
        assert_eq!(entries(&log), vec!["A:enter", "B:enter", "C:enter"]);
    }

    #[test]
    fn test_active_dependencies_are_not_reshown() {
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A").container("root").template(layout()),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("B")
                .container("panelB")
                .template(content("b"))
                .depends_on("A"),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("C")
                .container("panelC")
                .template(content("c"))
                .depends_on("A"),
        );

        navigator.show_view("B").unwrap();
        navigator.tick();
        navigator.show_view("C").unwrap();
        navigator.tick();

        assert_eq!(entries(&log), vec!["A:enter", "B:enter", "C:enter"]);
        assert!(navigator.is_active("B"), "B lives in a sibling container");
    }

    #[test]
    fn test_show_is_idempotent() {
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A").container("root").template(content("a")),
        );

        navigator.show_view("A").unwrap();
        navigator.show_view("A").unwrap();
        navigator.tick();
        navigator.show_view("A").unwrap();
        navigator.tick();

        assert_eq!(entries(&log), vec!["A:enter"]);
        let tree = navigator.tree();
        let root = tree.query_by_name(tree.root(), "root").unwrap();
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn test_hide_inactive_is_noop() {
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A").container("root").template(content("a")),
        );
        let nodes = navigator.tree().len();

        navigator.hide_view("A").unwrap();
        assert_eq!(navigator.state("A"), Some(ViewState::Inactive));
        assert!(!navigator.tree().has_pending_notifications());
        assert_eq!(navigator.tree().len(), nodes);

        // still waiting for the attach notification
        navigator.show_view("A").unwrap();
        navigator.hide_view("A").unwrap();
        assert_eq!(navigator.state("A"), Some(ViewState::Attaching));
        navigator.tick();
        assert!(navigator.is_active("A"));
        assert_eq!(entries(&log), vec!["A:enter"]);
    }

    #[test]
    fn test_missing_container_id_is_an_error() {
        let mut navigator = Navigator::new(document());
        navigator
            .register(View::new(
                ViewConfig::new("A").template(content("a")),
                (),
            ))
            .unwrap();

        match navigator.show_view("A") {
            Err(NavError::MissingContainer(id)) => assert_eq!(id, "A"),
            other => panic!("expected a missing container error, got {:?}", other),
        }
        navigator.tick();
        assert!(!navigator.is_active("A"));
    }

    #[test]
    fn test_view_without_template_is_never_drawn() {
        let mut navigator = Navigator::new(document());
        navigator
            .register(View::new(ViewConfig::new("A"), ()))
            .unwrap();
        let nodes = navigator.tree().len();

        assert!(navigator.show_view("A").is_ok(), "no template wins over no container");
        navigator.tick();
        assert!(!navigator.is_active("A"));
        assert_eq!(navigator.tree().len(), nodes);
    }

    #[test]
    fn test_round_trip() {
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A")
                .container("sidebar")
                .template(content("a"))
                .static_view(true),
        );
        let nodes = navigator.tree().len();

        navigator.show_view("A").unwrap();
        navigator.tick();
        assert!(navigator.is_active("A"));

        navigator.hide_view("A").unwrap();
        assert_eq!(navigator.state("A"), Some(ViewState::Detaching));
        assert!(navigator.is_active("A"), "still active until the tree confirms");
        navigator.tick();
        assert_eq!(navigator.state("A"), Some(ViewState::Inactive));
        assert_eq!(navigator.tree().len(), nodes, "the old wrapper is freed");

        navigator.show_view("A").unwrap();
        navigator.tick();
        assert!(navigator.is_active("A"));
        assert_eq!(entries(&log), vec!["A:enter", "A:leave", "A:enter"]);
    }

    #[test]
    fn test_unknown_view_is_logged() {
        capture_logs();
        let mut navigator = Navigator::new(document());
        let nodes = navigator.tree().len();

        assert!(navigator.show_view("unknown").is_ok());
        assert!(navigator.hide_view("unknown").is_ok());

        let warnings = captured_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("unknown"));
        assert_eq!(navigator.tree().len(), nodes);
        assert!(!navigator.tree().has_pending_notifications());
    }

    #[test]
    fn test_update_gating() {
        let log = event_log();
        let mut navigator = Navigator::new(
            Template::new().element(
                Element::new("root")
                    .child(Element::new("left"))
                    .child(Element::new("right")),
            ),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("dynamic")
                .container("left")
                .template(content("d")),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("static")
                .container("right")
                .template(content("s"))
                .static_view(true),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("hidden")
                .container("root")
                .template(content("h")),
        );

        navigator.show_view("dynamic").unwrap();
        navigator.show_view("static").unwrap();
        for _ in 0..3 {
            navigator.tick();
        }

        let entries = log.lock().clone();
        let count = |entry: &str| entries.iter().filter(|e| *e == entry).count();
        assert_eq!(count("dynamic:update"), 3);
        assert_eq!(count("static:update"), 0);
        assert_eq!(count("hidden:update"), 0);

        navigator.hide_view("dynamic").unwrap();
        navigator.tick();
        navigator.tick();
        assert_eq!(
            log.lock().iter().filter(|e| *e == "dynamic:update").count(),
            3,
            "no updates once hidden"
        );
    }

    #[test]
    fn test_eviction_clears_active_flag() {
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A")
                .container("root")
                .template(content("a"))
                .static_view(true),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("B")
                .container("root")
                .template(content("b"))
                .static_view(true),
        );

        navigator.show_view("A").unwrap();
        navigator.tick();
        navigator.show_view("B").unwrap();
        assert!(navigator.is_active("A"), "eviction isn’t confirmed yet");
        navigator.tick();

        assert!(!navigator.is_active("A"));
        assert!(navigator.is_active("B"));
        assert_eq!(entries(&log), vec!["A:enter", "A:leave", "B:enter"]);

        // A can come back and evict B in turn
        navigator.show_view("A").unwrap();
        navigator.tick();
        assert!(navigator.is_active("A"));
        assert!(!navigator.is_active("B"));
    }

    /// Records whether each view’s wrapper and content can still be read when it leaves focus.
    #[derive(Debug)]
    struct LeaveReader {
        seen: Arc<parking_lot::Mutex<Vec<(String, bool, bool)>>>,
        content: &'static str,
    }

    impl ViewBehavior for LeaveReader {
        fn on_leave_focus(&mut self, context: &FocusContext) {
            let readable = context.tree().contains(context.wrapper());
            let content = context.query(self.content).is_some();
            self.seen
                .lock()
                .push((context.id().to_owned(), readable, content));
        }
    }

    #[test]
    fn test_nested_wrappers_are_readable_on_leave() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut navigator = Navigator::new(document());
        navigator
            .register(View::new(
                ViewConfig::new("A").container("sidebar").template(layout()),
                LeaveReader {
                    seen: Arc::clone(&seen),
                    content: "panelB",
                },
            ))
            .unwrap();
        navigator
            .register(View::new(
                ViewConfig::new("B")
                    .container("panelB")
                    .template(content("b"))
                    .depends_on("A"),
                LeaveReader {
                    seen: Arc::clone(&seen),
                    content: "b",
                },
            ))
            .unwrap();
        let nodes = navigator.tree().len();

        navigator.show_view("B").unwrap();
        navigator.tick();
        navigator.hide_view("A").unwrap();
        navigator.tick();

        assert!(!navigator.is_active("A"));
        assert!(!navigator.is_active("B"), "B’s content went with A’s");
        assert_eq!(
            seen.lock().clone(),
            vec![
                ("A".to_owned(), true, true),
                ("B".to_owned(), true, true)
            ]
        );
        assert_eq!(navigator.tree().len(), nodes, "both wrappers are freed");
    }

    #[test]
    fn test_evicted_wrapper_is_readable_on_leave() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut navigator = Navigator::new(document());
        for &(id, name) in &[("A", "a"), ("B", "b")] {
            navigator
                .register(View::new(
                    ViewConfig::new(id)
                        .container("sidebar")
                        .template(content(name)),
                    LeaveReader {
                        seen: Arc::clone(&seen),
                        content: name,
                    },
                ))
                .unwrap();
        }
        let nodes = navigator.tree().len();

        navigator.show_view("A").unwrap();
        navigator.tick();
        navigator.show_view("B").unwrap();
        navigator.tick();

        assert!(!navigator.is_active("A"));
        assert!(navigator.is_active("B"));
        assert_eq!(seen.lock().clone(), vec![("A".to_owned(), true, true)]);
        assert_eq!(
            navigator.tree().len(),
            nodes + 2,
            "only B’s wrapper and content remain"
        );
    }

    #[test]
    fn test_clear_container() {
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A")
                .container("sidebar")
                .template(content("a"))
                .static_view(true),
        );
        navigator.show_view("A").unwrap();
        navigator.tick();

        navigator.clear_container("sidebar").unwrap();
        navigator.tick();
        assert!(!navigator.is_active("A"));
        assert_eq!(entries(&log), vec!["A:enter", "A:leave"]);

        capture_logs();
        assert!(navigator.clear_container("nowhere").is_ok());
        assert_eq!(captured_warnings().len(), 1);
    }

    #[test]
    fn test_hide_without_wrapper_is_noop() {
        capture_logs();
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A")
                .container("sidebar")
                .template(content("a"))
                .static_view(true),
        );
        navigator.show_view("A").unwrap();
        navigator.tick();

        // the wrapper is off the document, but the detach hasn’t been delivered yet
        navigator.clear_container("sidebar").unwrap();
        assert!(navigator.hide_view("A").is_ok());
        assert_eq!(navigator.state("A"), Some(ViewState::Active));
        assert!(captured_warnings()
            .iter()
            .any(|warning| warning.contains("UIView__A")));

        navigator.tick();
        assert_eq!(navigator.state("A"), Some(ViewState::Inactive));
    }

    #[test]
    fn test_unresolved_container_aborts_show() {
        capture_logs();
        let log = event_log();
        let mut navigator = Navigator::new(document());
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("A").container("root").template(layout()),
        );
        recorded(
            &mut navigator,
            &log,
            ViewConfig::new("B")
                .container("nowhere")
                .template(content("b"))
                .depends_on("A"),
        );

        assert!(navigator.show_view("B").is_ok());
        navigator.tick();

        assert!(navigator.is_active("A"), "dependencies stay shown");
        assert!(!navigator.is_active("B"));
        assert_eq!(navigator.state("B"), Some(ViewState::Inactive));
        assert!(captured_warnings()
            .iter()
            .any(|warning| warning.contains("nowhere")));
    }

    #[test]
    fn test_dependency_cycle() {
        let mut navigator = Navigator::new(document());
        navigator
            .register(View::new(
                ViewConfig::new("A")
                    .container("root")
                    .template(content("a"))
                    .depends_on("B"),
                (),
            ))
            .unwrap();
        navigator
            .register(View::new(
                ViewConfig::new("B")
                    .container("root")
                    .template(content("b"))
                    .depends_on("A"),
                (),
            ))
            .unwrap();

        assert!(matches!(
            navigator.dependency_chain("A"),
            Err(NavError::DependencyCycle { .. })
        ));
        match navigator.show_view("A") {
            Err(NavError::DependencyCycle { view, repeated }) => {
                assert_eq!(view, "A");
                assert_eq!(repeated, "A");
            }
            other => panic!("expected a dependency cycle, got {:?}", other),
        }
        assert_eq!(navigator.state("A"), Some(ViewState::Inactive));
        assert_eq!(navigator.state("B"), Some(ViewState::Inactive));
    }

    #[test]
    fn test_unknown_dependency() {
        let mut navigator = Navigator::new(document());
        navigator
            .register(View::new(
                ViewConfig::new("A")
                    .container("root")
                    .template(content("a"))
                    .depends_on("ghost"),
                (),
            ))
            .unwrap();

        match navigator.show_view("A") {
            Err(NavError::UnknownDependency { view, dependency }) => {
                assert_eq!(view, "A");
                assert_eq!(dependency, "ghost");
            }
            other => panic!("expected an unknown dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_candidate_containers() {
        let mut navigator = Navigator::new(document());
        navigator
            .register(View::new(
                ViewConfig::new("A").container("root").template(layout()),
                (),
            ))
            .unwrap();
        navigator
            .register(View::new(ViewConfig::new("B").depends_on("A"), ()))
            .unwrap();

        assert_eq!(
            navigator.candidate_containers("A").unwrap(),
            vec!["root", "sidebar"]
        );
        assert_eq!(
            navigator.candidate_containers("B").unwrap(),
            vec!["layout", "panelB", "panelC"]
        );
    }
}
