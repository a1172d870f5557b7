//! End-to-end integration test for tweak resolution
//!
//! This test exercises the complete flow: coordinator config and tweak list
//! loading -> layered resolution -> user override -> cache invalidation ->
//! subscriber delivery on the main queue.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tweaks_core::{
    ChangeChannel, CoordinatorConfig, CustomizableConfigurationProvider, LocalChangeChannel,
    MainQueue, Priority, Provider, Tweak, TweakValue, TweaksCoordinator,
};
use tweaks_providers::{EphemeralProvider, StaticProvider};
use tweaks_test_utils::RecordingProvider;

/// Set up a directory with a coordinator config and a shipped tweak list
fn setup_app_dir(use_cache: bool) -> TempDir {
    let temp = TempDir::new().unwrap();

    fs::write(
        temp.path().join("coordinator.toml"),
        format!("use_cache = {}\n", use_cache),
    )
    .unwrap();

    fs::write(
        temp.path().join("tweaks.toml"),
        r#"
[[tweak]]
feature = "general"
variable = "greet_on_app_did_become_active"
title = "Greet on app launch"
group = "General"
value = false
displayable = true

[[tweak]]
feature = "ui_customization"
variable = "label_text"
title = "Label Text"
group = "UI Customization"
value = "Test value"
displayable = true

[[tweak]]
feature = "general"
variable = "encrypted_answer_to_the_universe"
value = "Definitely not 42"
"#,
    )
    .unwrap();

    temp
}

struct App {
    channel: LocalChangeChannel,
    queue: Arc<MainQueue>,
    user: Arc<EphemeralProvider>,
    remote: RecordingProvider,
    coordinator: TweaksCoordinator,
}

fn build_app(temp: &TempDir) -> App {
    let channel = LocalChangeChannel::new();
    let shared: Arc<dyn ChangeChannel> = Arc::new(channel.clone());
    let queue = Arc::new(MainQueue::new());

    let config = CoordinatorConfig::load(&temp.path().join("coordinator.toml")).unwrap();
    let defaults = StaticProvider::load(
        "defaults",
        Priority::FALLBACK,
        &temp.path().join("tweaks.toml"),
    )
    .unwrap();
    let user = Arc::new(EphemeralProvider::new(
        "user",
        Priority::OVERRIDE,
        shared.clone(),
    ));
    let remote = RecordingProvider::new("remote", Priority::MEDIUM.value())
        .with_channel(shared.clone())
        .with_tweak(
            "ui_customization",
            Tweak::new("label_text").with_value("Remote label"),
        );

    let user_provider: Arc<dyn CustomizableConfigurationProvider> = user.clone();
    let providers: Vec<Provider> = vec![
        defaults.into_provider(),
        remote.plain(),
        user_provider.into(),
    ];
    let coordinator =
        TweaksCoordinator::with_config(providers, shared, queue.clone(), config).unwrap();

    App {
        channel,
        queue,
        user,
        remote,
        coordinator,
    }
}

#[test]
fn test_layered_resolution() {
    let temp = setup_app_dir(true);
    let app = build_app(&temp);

    assert_eq!(
        app.coordinator.provider_names(),
        vec!["user", "remote", "defaults"]
    );

    let label = app
        .coordinator
        .resolve("ui_customization", "label_text")
        .unwrap();
    assert_eq!(label.value(), Some(&TweakValue::from("Remote label")));
    assert_eq!(label.title(), Some("Label Text"));
    assert!(label.can_be_displayed());

    let secret = app
        .coordinator
        .resolve("general", "encrypted_answer_to_the_universe")
        .unwrap();
    assert!(!secret.can_be_displayed());
}

#[test]
fn test_user_override_invalidates_and_notifies() {
    let temp = setup_app_dir(true);
    let app = build_app(&temp);

    let observed = Arc::new(Mutex::new(Vec::new()));
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let store = observed.clone();
    app.coordinator.subscribe_to_changes(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        store.lock().unwrap().push("changed");
    });

    assert_eq!(
        app.coordinator
            .value_for("general", "greet_on_app_did_become_active"),
        Some(TweakValue::Bool(false))
    );
    assert_eq!(app.coordinator.cache_len(), 1);

    // A write from a background thread clears the cache immediately...
    let user = app.user.clone();
    std::thread::spawn(move || {
        user.set_value("general", "greet_on_app_did_become_active", true);
    })
    .join()
    .unwrap();
    assert_eq!(app.coordinator.cache_len(), 0);

    // ...but subscribers only run once the main queue is drained.
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(app.queue.run_pending(), 1);
    assert_eq!(*observed.lock().unwrap(), vec!["changed"]);

    assert_eq!(
        app.coordinator
            .value_for("general", "greet_on_app_did_become_active"),
        Some(TweakValue::Bool(true))
    );
}

#[test]
fn test_remote_refresh_requeries_in_priority_order() {
    let temp = setup_app_dir(true);
    let app = build_app(&temp);

    app.coordinator.resolve("ui_customization", "label_text");
    app.coordinator.resolve("ui_customization", "label_text");
    assert_eq!(app.remote.lookup_count(), 1);

    app.remote.set(
        "ui_customization",
        Tweak::new("label_text").with_value("Refreshed"),
    );

    assert_eq!(
        app.coordinator.value_for("ui_customization", "label_text"),
        Some(TweakValue::from("Refreshed"))
    );
    assert_eq!(app.remote.lookup_count(), 2);
}

#[test]
fn test_uncached_configuration_from_file() {
    let temp = setup_app_dir(false);
    let app = build_app(&temp);

    assert!(!app.coordinator.config().use_cache);
    app.coordinator.resolve("ui_customization", "label_text");
    app.coordinator.resolve("ui_customization", "label_text");

    assert_eq!(app.remote.lookup_count(), 2);
    assert_eq!(app.coordinator.cache_len(), 0);
}

#[test]
fn test_tweak_editor_listing() {
    let temp = setup_app_dir(true);
    let app = build_app(&temp);

    let top = app.coordinator.top_customizable_provider().unwrap();
    assert_eq!(top.name(), "user");

    app.user.set_value("general", "greet_on_app_did_become_active", true);
    app.user
        .set_value("general", "encrypted_answer_to_the_universe", "42");

    let listed: Vec<String> = app
        .coordinator
        .list_displayable_tweaks()
        .iter()
        .map(|tweak| tweak.to_string())
        .collect();
    assert_eq!(
        listed,
        vec!["greet_on_app_did_become_active = true (bool) \"Greet on app launch\" [General] displayable"]
    );
}

#[test]
fn test_drop_releases_channel() {
    let temp = setup_app_dir(true);
    let app = build_app(&temp);
    app.coordinator.subscribe_to_changes(|| {});
    assert_eq!(app.channel.listener_count(), 2);

    let channel = app.channel.clone();
    drop(app);

    assert_eq!(channel.listener_count(), 0);
}
