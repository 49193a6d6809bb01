use applib_core::{Coordinator, RegistryError, RegistryKind};

#[derive(Debug, Clone, PartialEq, Eq)]
struct PersonRecord {
    name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PersonPanel {
    title: &'static str,
}

fn nikola_and_person() -> Coordinator<PersonRecord, PersonPanel> {
    let mut coordinator = Coordinator::new();
    coordinator
        .register_model("nikola", PersonRecord { name: "Nikola" })
        .expect("register nikola");
    coordinator
        .register_view("person", PersonPanel { title: "Person" })
        .expect("register person");
    coordinator
}

#[test]
fn mapped_pair_resolves_both_ways() {
    let mut coordinator = nikola_and_person();
    coordinator.map("nikola", "person").expect("map");

    assert_eq!(
        coordinator.view_for("nikola").expect("nikola registered"),
        Some(&PersonPanel { title: "Person" })
    );
    assert_eq!(
        coordinator.model_for("person").expect("person registered"),
        Some(&PersonRecord { name: "Nikola" })
    );
}

#[test]
fn unknown_view_lookup_is_not_registered() {
    let coordinator = nikola_and_person();
    let err = coordinator
        .model_for("view-that-doesnt-exist")
        .expect_err("unknown view");
    assert_eq!(
        err,
        RegistryError::NotRegistered {
            kind: RegistryKind::Views,
            key: "view-that-doesnt-exist".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "\"view-that-doesnt-exist\" is not registered as a view"
    );
}

#[test]
fn map_with_unregistered_model_leaves_map_untouched() {
    let mut coordinator = nikola_and_person();
    let err = coordinator.map("m1", "person").expect_err("m1 missing");
    assert_eq!(
        err,
        RegistryError::NotRegistered {
            kind: RegistryKind::Models,
            key: "m1".to_string(),
        }
    );
    assert_eq!(coordinator.mapped_model_key("person"), None);
    assert_eq!(coordinator.model_for("person").expect("person registered"), None);
}

#[test]
fn mapping_survives_auto_unregister_swap() {
    let mut coordinator = nikola_and_person();
    coordinator.set_auto_unregister(true, false);
    coordinator.map("nikola", "person").expect("map");

    coordinator
        .register_model("nikola", PersonRecord { name: "Nikola T." })
        .expect("swap model");

    assert_eq!(
        coordinator.model_for("person").expect("person registered"),
        Some(&PersonRecord { name: "Nikola T." })
    );
}

#[test]
fn unregister_model_drops_mapping() {
    let mut coordinator = nikola_and_person();
    coordinator.map("nikola", "person").expect("map");
    coordinator.unregister_model("nikola").expect("unregister");

    assert_eq!(coordinator.mapped_model_key("person"), None);
    assert_eq!(coordinator.model_for("person").expect("person registered"), None);
    assert!(matches!(
        coordinator.view_for("nikola"),
        Err(RegistryError::NotRegistered { .. })
    ));
}

#[test]
fn focus_view_tracks_registered_views_only() {
    let mut coordinator = nikola_and_person();
    assert!(coordinator.focus_view("person").expect("focus"));
    assert!(!coordinator.focus_view("missing").expect("focus missing"));
    assert_eq!(coordinator.focused_view(), Some("person"));
}
