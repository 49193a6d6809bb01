use applib_core::geometry::KEY_SIZE_WIDTH;
use applib_core::{
    Application, ApplicationConfig, Preferences, PrefsError, SqlitePreferences, WindowGeometry,
};

#[test]
fn values_survive_reopening_the_database() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("prefs.db");

    let mut prefs = SqlitePreferences::open(&path, "applib").expect("first open");
    prefs.put_int("window.location.x", 42).expect("put x");
    prefs.put_bool("window.maximized", true).expect("put maximized");
    drop(prefs);

    let prefs = SqlitePreferences::open(&path, "applib").expect("second open");
    assert_eq!(prefs.get_int("window.location.x", 0).expect("x"), 42);
    assert!(prefs.get_bool("window.maximized", false).expect("maximized"));
    assert_eq!(
        prefs.names().expect("names"),
        vec!["window.location.x", "window.maximized"]
    );
}

#[test]
fn malformed_stored_value_reports_invalid_value() {
    let mut prefs = SqlitePreferences::open_in_memory("applib").expect("open");
    prefs.put_text(KEY_SIZE_WIDTH, "wide").expect("put text");

    let err = prefs.get_int(KEY_SIZE_WIDTH, 0).expect_err("not an integer");
    assert!(matches!(
        err,
        PrefsError::InvalidValue { expected: "integer", .. }
    ));
}

#[test]
fn application_geometry_round_trips_through_sqlite() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("prefs.db");
    let saved = WindowGeometry {
        x: 5,
        y: 6,
        width: 1024,
        height: 768,
        maximized: false,
    };

    {
        let store = SqlitePreferences::open(&path, "applib").expect("open");
        let mut app: Application<(), ()> =
            Application::new(ApplicationConfig::default(), Box::new(store)).expect("build");
        assert_eq!(app.geometry(), WindowGeometry::default());
        app.run().expect("run");
        app.set_geometry(saved);
        app.exit().expect("exit");
    }

    let store = SqlitePreferences::open(&path, "applib").expect("reopen");
    let app: Application<(), ()> =
        Application::new(ApplicationConfig::default(), Box::new(store)).expect("rebuild");
    assert_eq!(app.geometry(), saved);
}
