use crate::error::{NavError, Result};
use crate::navigator::Navigator;
use crate::view::{View, ViewBehavior, ViewConfig, ViewState};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Owns a navigator on behalf of the host application and drives its ticks.
#[derive(Debug)]
pub struct Host {
    navigator: Arc<Mutex<Navigator>>,
}

impl Host {
    pub fn new(navigator: Navigator) -> Host {
        Host {
            navigator: Arc::new(Mutex::new(navigator)),
        }
    }

    /// Returns a non-owning handle for view components.
    pub fn handle(&self) -> NavigatorHandle {
        NavigatorHandle(Arc::downgrade(&self.navigator))
    }

    /// Runs one tick: delivers pending attach/detach notifications and updates active views.
    pub fn poll(&self) {
        self.navigator.lock().tick();
    }

    /// Runs a closure with the navigator locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut Navigator) -> R) -> R {
        f(&mut self.navigator.lock())
    }
}

/// A lookup handle to a navigator. Does not keep the navigator alive.
///
/// # Deadlocks
/// The navigator is locked for the duration of every call, so handles must not be used from
/// inside view behavior hooks.
#[derive(Debug, Clone)]
pub struct NavigatorHandle(Weak<Mutex<Navigator>>);

impl NavigatorHandle {
    /// Runs a closure with the navigator locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut Navigator) -> R) -> Result<R> {
        let navigator = self.0.upgrade().ok_or(NavError::NavigatorGone)?;
        let mut navigator = navigator.lock();
        Ok(f(&mut navigator))
    }

    pub fn show_view(&self, id: &str) -> Result<()> {
        self.with(|navigator| navigator.show_view(id))?
    }

    pub fn hide_view(&self, id: &str) -> Result<()> {
        self.with(|navigator| navigator.hide_view(id))?
    }
}

/// A view as set up by the host: configuration, behavior, and the navigator it belongs to.
///
/// The component registers itself on [`awake`](ViewComponent::awake), after which the
/// navigator owns the view and the component only forwards calls.
#[derive(Debug)]
pub struct ViewComponent {
    navigator: Option<NavigatorHandle>,
    config: ViewConfig,
    /// Moved into the navigator on registration.
    behavior: Option<Box<dyn ViewBehavior>>,
}

impl ViewComponent {
    pub fn new<B: ViewBehavior + 'static>(config: ViewConfig, behavior: B) -> ViewComponent {
        ViewComponent {
            navigator: None,
            config,
            behavior: Some(Box::new(behavior)),
        }
    }

    /// Assigns the navigator this view registers with.
    pub fn with_navigator(mut self, navigator: NavigatorHandle) -> ViewComponent {
        self.navigator = Some(navigator);
        self
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn is_registered(&self) -> bool {
        self.behavior.is_none()
    }

    /// Registers the view with its navigator. Must be called once, on initialization.
    pub fn awake(&mut self) -> Result<()> {
        let navigator = self.handle()?.clone();
        if self.config.id.is_empty() {
            return Err(NavError::InvalidId);
        }
        if self.behavior.is_none() {
            return Err(NavError::DuplicateView(self.config.id.clone()));
        }
        navigator.with(|navigator| {
            // the behavior is only handed over once registration can’t fail
            if navigator.view(&self.config.id).is_some() {
                return Err(NavError::DuplicateView(self.config.id.clone()));
            }
            match self.behavior.take() {
                Some(behavior) => {
                    navigator.register(View::from_boxed(self.config.clone(), behavior))
                }
                None => Ok(()),
            }
        })?
    }

    pub fn show(&self) -> Result<()> {
        self.handle()?.show_view(&self.config.id)
    }

    pub fn hide(&self) -> Result<()> {
        self.handle()?.hide_view(&self.config.id)
    }

    /// The view’s state, or `None` if it isn’t registered.
    pub fn state(&self) -> Result<Option<ViewState>> {
        self.handle()?.with(|navigator| navigator.state(&self.config.id))
    }

    pub fn is_active(&self) -> Result<bool> {
        self.handle()?
            .with(|navigator| navigator.is_active(&self.config.id))
    }

    /// IDs of the view’s dependencies, nearest first.
    pub fn dependency_chain(&self) -> Result<Vec<String>> {
        self.handle()?.with(|navigator| {
            navigator.dependency_chain(&self.config.id).map(|chain| {
                chain
                    .into_iter()
                    .map(|view| view.id().to_owned())
                    .collect()
            })
        })?
    }

    fn handle(&self) -> Result<&NavigatorHandle> {
        self.navigator
            .as_ref()
            .ok_or_else(|| NavError::MissingNavigator(self.config.id.clone()))
    }
}

#[cfg(test)]
fn host() -> Host {
    use crate::tree::{Element, Template};

    Host::new(Navigator::new(Template::new().element(
        Element::new("root").child(Element::new("header")),
    )))
}

#[test]
fn test_missing_navigator() {
    let mut component = ViewComponent::new(ViewConfig::new("menu"), ());
    match component.awake() {
        Err(NavError::MissingNavigator(id)) => assert_eq!(id, "menu"),
        other => panic!("expected a missing navigator error, got {:?}", other),
    }
    assert!(matches!(
        component.show(),
        Err(NavError::MissingNavigator(_))
    ));
}

#[test]
fn test_invalid_id() {
    let host = host();
    let mut component = ViewComponent::new(ViewConfig::new(""), ()).with_navigator(host.handle());
    assert!(matches!(component.awake(), Err(NavError::InvalidId)));
    assert!(!component.is_registered());
    assert!(host.with(|navigator| navigator.is_empty()));
}

#[test]
fn test_duplicate_components() {
    let host = host();
    let mut first =
        ViewComponent::new(ViewConfig::new("menu"), ()).with_navigator(host.handle());
    let mut second =
        ViewComponent::new(ViewConfig::new("menu"), ()).with_navigator(host.handle());

    first.awake().unwrap();
    assert!(first.is_registered());
    assert!(matches!(second.awake(), Err(NavError::DuplicateView(_))));
    assert!(!second.is_registered());
    assert!(matches!(first.awake(), Err(NavError::DuplicateView(_))));
    assert_eq!(host.with(|navigator| navigator.len()), 1);
}

#[test]
fn test_components_drive_navigation() {
    use crate::test_support::{event_log, Recorder};
    use crate::tree::{Element, Template};

    let host = host();
    let log = event_log();
    let mut frame = ViewComponent::new(
        ViewConfig::new("frame")
            .container("root")
            .template(Template::new().element(Element::new("body")))
            .static_view(true),
        Recorder::new(&log),
    )
    .with_navigator(host.handle());
    let mut page = ViewComponent::new(
        ViewConfig::new("page")
            .container("body")
            .template(Template::new().element(Element::new("text")))
            .depends_on("frame")
            .static_view(true),
        Recorder::new(&log),
    )
    .with_navigator(host.handle());

    frame.awake().unwrap();
    page.awake().unwrap();
    assert_eq!(page.dependency_chain().unwrap(), vec!["frame"]);

    page.show().unwrap();
    assert_eq!(page.state().unwrap(), Some(ViewState::Attaching));
    host.poll();
    assert!(frame.is_active().unwrap());
    assert!(page.is_active().unwrap());

    page.hide().unwrap();
    host.poll();
    assert!(!page.is_active().unwrap());
    assert!(frame.is_active().unwrap());
    assert_eq!(
        log.lock().clone(),
        vec!["frame:enter", "page:enter", "page:leave"]
    );
}

#[test]
fn test_dropped_navigator() {
    let host = host();
    let mut component =
        ViewComponent::new(ViewConfig::new("menu"), ()).with_navigator(host.handle());
    drop(host);

    assert!(matches!(component.awake(), Err(NavError::NavigatorGone)));
    assert!(!component.is_registered(), "the behavior is kept for a later attempt");
    assert!(matches!(component.show(), Err(NavError::NavigatorGone)));
}
