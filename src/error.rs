//! Navigation errors.

use crate::tree::TreeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NavError>;

/// Errors surfaced by the navigator and its views.
///
/// Lookup failures (unknown view IDs, missing containers) are not errors; they are logged and
/// the operation does nothing.
#[derive(Debug, Error)]
pub enum NavError {
    /// A view component was initialized without a navigator.
    #[error("view {0:?} does not have a navigator assigned")]
    MissingNavigator(String),

    /// A view was registered with an empty ID.
    #[error("a view must have a valid ID")]
    InvalidId,

    /// A view with the same ID is already registered.
    #[error("a view with the ID {0:?} is already registered; views must have unique IDs")]
    DuplicateView(String),

    /// A view was shown without a container ID.
    #[error("view {0:?} must have a container ID set so it can be shown")]
    MissingContainer(String),

    /// Following the dependency chain leads back to a view already visited.
    #[error("dependency chain of view {view:?} loops back to {repeated:?}")]
    DependencyCycle { view: String, repeated: String },

    /// A view depends on an ID that isn’t registered.
    #[error("view {view:?} depends on unregistered view {dependency:?}")]
    UnknownDependency { view: String, dependency: String },

    /// The navigator behind a handle has been dropped.
    #[error("the navigator has been dropped")]
    NavigatorGone,

    /// A view declaration names a template that doesn’t exist.
    #[error("view {view:?} uses unknown template {template:?}")]
    UnknownTemplate { view: String, template: String },

    #[error("invalid navigator configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),
}
