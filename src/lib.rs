//! View navigation library.
//!
//! # Conceptual overview
//! Roost shows and hides *views* on a retained node tree. A view is a self-contained piece of UI:
//! a template that is cloned into the tree when the view is shown, the name of the container
//! node it is shown in, and optionally another view it depends on.
//!
//! ## Navigator
//! A [`Navigator`] owns one document (a [`NodeTree`] built from a root [`Template`]) and a
//! registry of views keyed by ID. Views are registered once and stay registered for as long as
//! the navigator lives; IDs must be unique per navigator. Views are shown and hidden by ID, and
//! unknown IDs or missing containers are logged and ignored rather than treated as errors.
//!
//! ## Dependencies
//! A view may depend on another view, which typically provides the container it is shown in.
//! Dependencies form a chain: when a view is shown, every inactive view in its chain is shown
//! first, starting with the most distant one. A chain that loops back on itself is an error.
//!
//! ## Attach and detach
//! Showing a view clears its container, clones its template into a wrapper node named
//! `UIView__<id>`, and attaches the wrapper. Hiding a view detaches the wrapper. Neither takes
//! effect on the view’s state right away: the tree queues an attach or detach notification, and
//! only once that notification is delivered (see [`Navigator::tick`]) does the view become
//! active or inactive and its [`ViewBehavior`] hooks run. In between, the view is
//! [`Attaching`](ViewState::Attaching) or [`Detaching`](ViewState::Detaching), and further
//! show/hide requests are ignored.
//!
//! Because a container only ever holds the view shown into it last, showing a view evicts
//! whatever was in its container; the evicted view becomes inactive through its own detach
//! notification.
//!
//! ## Ticks
//! Every tick first delivers pending notifications, then calls [`ViewBehavior::update`] on
//! each active view that isn’t static.
//!
//! ## Hosts
//! A [`Host`] keeps the navigator behind a lock so that per-view [`ViewComponent`]s can hold
//! non-owning [`NavigatorHandle`]s to it, register themselves on initialization, and show or
//! hide themselves later. Navigators can also be set up from a TOML file using
//! [`NavigatorConfig`].

pub mod config;
mod error;
mod host;
mod navigator;
#[cfg(test)]
mod test_support;
pub mod tree;
mod view;

pub use config::{NavigatorConfig, ViewDecl};
pub use error::{NavError, Result};
pub use host::{Host, NavigatorHandle, ViewComponent};
pub use navigator::Navigator;
pub use tree::{Element, NodeId, NodeTree, Template};
pub use view::{
    wrapper_name, Diagnostic, FocusContext, Severity, View, ViewBehavior, ViewConfig, ViewState,
    WRAPPER_PREFIX,
};
