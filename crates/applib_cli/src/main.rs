//! Command-line walkthrough of the application core.
//!
//! # Responsibility
//! - Drive one application through its full lifecycle with a mapped
//!   model/view pair, printing every notification it receives.
//! - Optionally log to `APPLIB_LOG_DIR` and persist preferences to
//!   `APPLIB_PREFS_DB`.

use applib_core::{
    core_version, default_log_level, init_logging, Application, ApplicationConfig,
    MemoryPreferences, Preferences, SqlitePreferences,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

#[derive(Debug, Clone)]
struct Person {
    name: String,
}

#[derive(Debug, Clone)]
struct PersonView {
    title: String,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            eprintln!("applib_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<i32, Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("APPLIB_LOG_DIR") {
        init_logging(default_log_level(), &log_dir)?;
    }

    let config = match std::env::var("APPLIB_CONFIG") {
        Ok(raw) => ApplicationConfig::from_json_str(&raw)?,
        Err(_) => ApplicationConfig::default(),
    };
    let preferences: Box<dyn Preferences> = match std::env::var("APPLIB_PREFS_DB") {
        Ok(path) => Box::new(SqlitePreferences::open(path, &config.preferences_node)?),
        Err(_) => Box::new(MemoryPreferences::new(config.preferences_node.clone())),
    };

    let mut app: Application<Person, PersonView> = Application::new(config, preferences)?;
    println!(
        "{} version={} applib_core version={}",
        app.config().name,
        app.version(),
        core_version()
    );

    app.lifecycle_mut().subscribe_all(|event| {
        println!("lifecycle {}", event.phase);
        Ok(())
    });
    app.properties_mut().subscribe_all(|event| {
        println!(
            "property {} {:?} -> {:?}",
            event.property, event.old_value, event.new_value
        );
        Ok(())
    });
    app.coordinator_mut().model_events_mut().subscribe_all(|event| {
        println!("{} {} {}", event.source, event.action, event.key);
        Ok(())
    });
    app.coordinator_mut().view_events_mut().subscribe_all(|event| {
        println!("{} {} {}", event.source, event.action, event.key);
        Ok(())
    });

    app.run()?;
    app.set_title("Simple View Application")?;

    let coordinator = app.coordinator_mut();
    coordinator.register_model(
        "nikola",
        Person {
            name: "Nikola".to_string(),
        },
    )?;
    coordinator.register_view(
        "person",
        PersonView {
            title: "Person".to_string(),
        },
    )?;
    coordinator.map("nikola", "person")?;
    coordinator.focus_view("person")?;

    if let Some(model) = coordinator.model_for("person")? {
        println!("view person shows model {}", model.name);
    }
    if let Some(view) = coordinator.view_for("nikola")? {
        println!("model nikola is shown by view {}", view.title);
    }

    let code = app.exit()?;
    info!("event=cli_exit module=cli status=ok code={}", code);
    Ok(code)
}
