//! Window geometry persisted through [`Preferences`].
//!
//! # Invariants
//! - Missing keys read as the defaults (`100` for every coordinate, not
//!   maximized).
//! - Saving a maximized window records only the maximized flag, so the last
//!   restored size and location survive.

use crate::prefs::{Preferences, PrefsResult};

pub const KEY_LOCATION_X: &str = "window.location.x";
pub const KEY_LOCATION_Y: &str = "window.location.y";
pub const KEY_SIZE_WIDTH: &str = "window.size.width";
pub const KEY_SIZE_HEIGHT: &str = "window.size.height";
pub const KEY_MAXIMIZED: &str = "window.maximized";

const DEFAULT_COORDINATE: i64 = 100;

/// Location, size and maximized state of the main window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub maximized: bool,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            x: DEFAULT_COORDINATE,
            y: DEFAULT_COORDINATE,
            width: DEFAULT_COORDINATE,
            height: DEFAULT_COORDINATE,
            maximized: false,
        }
    }
}

impl WindowGeometry {
    /// Writes the default for every geometry key not yet stored.
    ///
    /// Returns how many keys were written.
    pub fn install_defaults(prefs: &mut dyn Preferences) -> PrefsResult<usize> {
        let defaults = Self::default();
        let mut installed = 0;
        for (key, value) in [
            (KEY_LOCATION_X, defaults.x),
            (KEY_LOCATION_Y, defaults.y),
            (KEY_SIZE_WIDTH, defaults.width),
            (KEY_SIZE_HEIGHT, defaults.height),
        ] {
            if !prefs.contains(key)? {
                prefs.put_int(key, value)?;
                installed += 1;
            }
        }
        if !prefs.contains(KEY_MAXIMIZED)? {
            prefs.put_bool(KEY_MAXIMIZED, defaults.maximized)?;
            installed += 1;
        }
        Ok(installed)
    }

    pub fn load(prefs: &dyn Preferences) -> PrefsResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            x: prefs.get_int(KEY_LOCATION_X, defaults.x)?,
            y: prefs.get_int(KEY_LOCATION_Y, defaults.y)?,
            width: prefs.get_int(KEY_SIZE_WIDTH, defaults.width)?,
            height: prefs.get_int(KEY_SIZE_HEIGHT, defaults.height)?,
            maximized: prefs.get_bool(KEY_MAXIMIZED, defaults.maximized)?,
        })
    }

    pub fn save(&self, prefs: &mut dyn Preferences) -> PrefsResult<()> {
        prefs.put_bool(KEY_MAXIMIZED, self.maximized)?;
        if self.maximized {
            return Ok(());
        }
        prefs.put_int(KEY_LOCATION_X, self.x)?;
        prefs.put_int(KEY_LOCATION_Y, self.y)?;
        prefs.put_int(KEY_SIZE_WIDTH, self.width)?;
        prefs.put_int(KEY_SIZE_HEIGHT, self.height)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{WindowGeometry, KEY_LOCATION_X, KEY_SIZE_WIDTH};
    use crate::prefs::{MemoryPreferences, Preferences};

    #[test]
    fn install_defaults_only_fills_missing_keys() {
        let mut prefs = MemoryPreferences::new("app");
        prefs.put_int(KEY_LOCATION_X, 7).expect("seed");

        let installed = WindowGeometry::install_defaults(&mut prefs).expect("install");
        assert_eq!(installed, 4);
        assert_eq!(prefs.get_int(KEY_LOCATION_X, 0).expect("x"), 7);
        assert_eq!(
            WindowGeometry::install_defaults(&mut prefs).expect("reinstall"),
            0
        );
    }

    #[test]
    fn save_then_load_restores_geometry() {
        let mut prefs = MemoryPreferences::new("app");
        let geometry = WindowGeometry {
            x: 10,
            y: 20,
            width: 800,
            height: 600,
            maximized: false,
        };
        geometry.save(&mut prefs).expect("save");
        assert_eq!(WindowGeometry::load(&prefs).expect("load"), geometry);
    }

    #[test]
    fn maximized_save_keeps_previous_size() {
        let mut prefs = MemoryPreferences::new("app");
        prefs.put_int(KEY_SIZE_WIDTH, 640).expect("seed");

        let geometry = WindowGeometry {
            width: 1920,
            maximized: true,
            ..WindowGeometry::default()
        };
        geometry.save(&mut prefs).expect("save");

        let loaded = WindowGeometry::load(&prefs).expect("load");
        assert!(loaded.maximized);
        assert_eq!(loaded.width, 640);
    }
}
