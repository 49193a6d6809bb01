//! Application object: owns the coordinator and drives the lifecycle.
//!
//! # Responsibility
//! - Build the model/view coordinator and notifiers from configuration.
//! - Fire `STARTING`/`STARTED` on `run` and `STOPPING`/`STOPPED` on `exit`.
//! - Persist window geometry between `STOPPING` and `STOPPED` when enabled.
//!
//! # Invariants
//! - Lifecycle only moves forward: `UNSTARTED → STARTING → STARTED →
//!   STOPPING → STOPPED`. A rejected transition fires nothing.
//! - State is advanced before the matching event is fired.
//! - A fault while announcing `STARTING` or `STOPPING`, or while saving
//!   geometry, leaves the state at that phase; the next `run`/`exit` resumes
//!   from there without announcing it again.
//! - `exit` never terminates the process; it returns the configured code.

use crate::config::{ApplicationConfig, ConfigError};
use crate::coordinator::Coordinator;
use crate::dispatch::DispatchError;
use crate::geometry::WindowGeometry;
use crate::lifecycle::{Lifecycle, LifecycleError, LifecycleNotifier, LifecycleState};
use crate::prefs::{Preferences, PrefsError};
use crate::property::{PropertyNotifier, PROPERTY_APPLICATION_ICON, PROPERTY_APPLICATION_TITLE};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identity stamped on lifecycle and property events.
pub type ApplicationId = Uuid;

#[derive(Debug)]
pub enum ApplicationError {
    Config(ConfigError),
    Prefs(PrefsError),
    Lifecycle(LifecycleError),
    Dispatch(DispatchError),
}

impl Display for ApplicationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Prefs(err) => write!(f, "{err}"),
            Self::Lifecycle(err) => write!(f, "{err}"),
            Self::Dispatch(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ApplicationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Prefs(err) => Some(err),
            Self::Lifecycle(err) => Some(err),
            Self::Dispatch(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<PrefsError> for ApplicationError {
    fn from(value: PrefsError) -> Self {
        Self::Prefs(value)
    }
}

impl From<LifecycleError> for ApplicationError {
    fn from(value: LifecycleError) -> Self {
        Self::Lifecycle(value)
    }
}

impl From<DispatchError> for ApplicationError {
    fn from(value: DispatchError) -> Self {
        Self::Dispatch(value)
    }
}

/// Desktop-style application shell around a model/view coordinator.
pub struct Application<M: Clone, V: Clone> {
    id: ApplicationId,
    config: ApplicationConfig,
    coordinator: Coordinator<M, V>,
    lifecycle: LifecycleNotifier,
    properties: PropertyNotifier,
    preferences: Box<dyn Preferences>,
    geometry: WindowGeometry,
    state: LifecycleState,
    title: Option<String>,
    icon: Option<String>,
}

impl<M: Clone, V: Clone> Application<M, V> {
    /// Builds an application, installing default geometry preferences.
    ///
    /// # Errors
    /// - `Config` when `config` fails validation.
    /// - `Prefs` when default installation or geometry loading fails.
    pub fn new(
        config: ApplicationConfig,
        mut preferences: Box<dyn Preferences>,
    ) -> Result<Self, ApplicationError> {
        config.validate()?;
        if preferences.node() != config.preferences_node {
            warn!(
                "event=app_init module=application status=warn reason=node_mismatch configured={} store={}",
                config.preferences_node,
                preferences.node()
            );
        }

        let id = Uuid::new_v4();
        let policy = config.listener_faults;
        let mut coordinator = Coordinator::with_policy(policy);
        coordinator.set_auto_unregister(config.auto_unregister_models, config.auto_unregister_views);

        let installed = WindowGeometry::install_defaults(preferences.as_mut())?;
        let geometry = WindowGeometry::load(preferences.as_ref())?;

        info!(
            "event=app_init module=application status=ok app={} name={} version={} prefs_node={} defaults_installed={}",
            id,
            config.name,
            config.version,
            preferences.node(),
            installed
        );

        Ok(Self {
            id,
            coordinator,
            lifecycle: LifecycleNotifier::with_policy(id, policy),
            properties: PropertyNotifier::with_policy(id, policy),
            preferences,
            geometry,
            state: LifecycleState::Unstarted,
            title: None,
            icon: None,
            config,
        })
    }

    /// Fires `STARTING` then `STARTED`.
    ///
    /// After a failed attempt that already announced `STARTING`, a retry
    /// continues with `STARTED`.
    pub fn run(&mut self) -> Result<(), ApplicationError> {
        if self.state != LifecycleState::In(Lifecycle::Starting) {
            self.enter(Lifecycle::Starting)?;
        }
        self.enter(Lifecycle::Started)?;
        Ok(())
    }

    /// Fires `STOPPING`, saves geometry if enabled, then fires `STOPPED`.
    ///
    /// Returns the configured exit code. After a failed attempt that already
    /// announced `STOPPING`, a retry saves geometry and fires `STOPPED`.
    pub fn exit(&mut self) -> Result<i32, ApplicationError> {
        if self.state != LifecycleState::In(Lifecycle::Stopping) {
            self.enter(Lifecycle::Stopping)?;
        }
        if self.config.save_preferences_on_exit {
            self.geometry.save(self.preferences.as_mut())?;
            info!(
                "event=prefs_save module=application status=ok app={} maximized={}",
                self.id, self.geometry.maximized
            );
        }
        self.enter(Lifecycle::Stopped)?;
        Ok(self.config.exit_code)
    }

    pub fn id(&self) -> ApplicationId {
        self.id
    }

    /// Application version from configuration; see [`crate::core_version`]
    /// for the library version.
    pub fn version(&self) -> &str {
        self.config.version.as_str()
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.state
    }

    pub fn coordinator(&self) -> &Coordinator<M, V> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut Coordinator<M, V> {
        &mut self.coordinator
    }

    pub fn lifecycle_mut(&mut self) -> &mut LifecycleNotifier {
        &mut self.lifecycle
    }

    pub fn properties_mut(&mut self) -> &mut PropertyNotifier {
        &mut self.properties
    }

    pub fn preferences(&self) -> &dyn Preferences {
        self.preferences.as_ref()
    }

    pub fn preferences_mut(&mut self) -> &mut dyn Preferences {
        self.preferences.as_mut()
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    /// Records the current window geometry; persisted on `exit`.
    pub fn set_geometry(&mut self, geometry: WindowGeometry) {
        self.geometry = geometry;
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Sets the title and fires `application.title`.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ApplicationError> {
        let old = self.title.replace(title.into());
        self.properties.fire(
            PROPERTY_APPLICATION_TITLE,
            old.as_deref(),
            self.title.as_deref(),
        )?;
        Ok(())
    }

    pub fn icon_name(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Sets (or clears) the icon resource name and fires `application.icon`.
    pub fn set_icon_name(&mut self, icon: Option<String>) -> Result<(), ApplicationError> {
        let old = std::mem::replace(&mut self.icon, icon);
        self.properties.fire(
            PROPERTY_APPLICATION_ICON,
            old.as_deref(),
            self.icon.as_deref(),
        )?;
        Ok(())
    }

    fn enter(&mut self, phase: Lifecycle) -> Result<(), ApplicationError> {
        if !self.state.can_enter(phase) {
            warn!(
                "event=lifecycle_change module=application status=error app={} from={} to={}",
                self.id, self.state, phase
            );
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                to: phase,
            }
            .into());
        }
        self.state = LifecycleState::In(phase);
        self.lifecycle.fire(phase)?;
        Ok(())
    }
}
