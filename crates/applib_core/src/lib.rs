//! Application lifecycle and component registry core.
//!
//! Keyed model/view registries with management events, a coordinator that
//! maps models to views, lifecycle and property notification, and window
//! geometry preferences.

pub mod application;
pub mod config;
pub mod coordinator;
pub mod db;
pub mod dispatch;
pub mod geometry;
pub mod lifecycle;
pub mod logging;
pub mod prefs;
pub mod property;
pub mod registry;

pub use application::{Application, ApplicationError, ApplicationId};
pub use config::{ApplicationConfig, ConfigError};
pub use coordinator::Coordinator;
pub use dispatch::{
    DispatchError, EventDispatcher, FaultPolicy, ListenerError, ListenerResult, SubscriptionId,
    TopicEvent,
};
pub use geometry::WindowGeometry;
pub use lifecycle::{Lifecycle, LifecycleError, LifecycleEvent, LifecycleNotifier, LifecycleState};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use prefs::{MemoryPreferences, Preferences, PrefsError, PrefsResult, SqlitePreferences};
pub use property::{
    PropertyChangeEvent, PropertyNotifier, PROPERTY_APPLICATION_ICON, PROPERTY_APPLICATION_TITLE,
};
pub use registry::{
    Action, KeyedRegistry, ManagedRegistry, ManagementEvent, RegistryError, RegistryKind,
    RegistryResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
