use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn provisor(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("provisor").unwrap();
    cmd.arg("--root").arg(root.path());
    cmd
}

fn init(root: &TempDir) {
    provisor(root).arg("init").assert().success();
}

fn add_broker(root: &TempDir, url: &str) {
    provisor(root)
        .args([
            "broker", "add", "overview", "--url", url, "--username", "u", "--password", "p",
        ])
        .assert()
        .success();
}

#[test]
fn init_creates_config_and_db() {
    let root = TempDir::new().unwrap();
    provisor(&root)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized provisor"));
    assert!(root.path().join(".provisor/config.yaml").exists());
    assert!(root.path().join(".provisor/lifecycle.db").exists());

    // Idempotent.
    provisor(&root)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));
}

#[test]
fn commands_require_init() {
    let root = TempDir::new().unwrap();
    provisor(&root)
        .args(["broker", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn broker_add_and_list() {
    let root = TempDir::new().unwrap();
    init(&root);
    add_broker(&root, "http://broker.example.com");

    provisor(&root)
        .args(["broker", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("overview"))
        .stdout(predicate::str::contains("http://broker.example.com"));

    // Duplicate names are refused.
    provisor(&root)
        .args([
            "broker",
            "add",
            "overview",
            "--url",
            "http://other.example.com",
            "--username",
            "u",
            "--password",
            "p",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broker already exists"));

    provisor(&root)
        .args(["broker", "remove", "overview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed broker: overview"));
    provisor(&root)
        .args(["broker", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("overview").not());
}

#[test]
fn disabled_flag_blocks_instance_creation() {
    let root = TempDir::new().unwrap();
    init(&root);
    add_broker(&root, "http://broker.example.com");

    provisor(&root)
        .args([
            "flag",
            "disable",
            "service_instance_creation",
            "--error-message",
            "instance creation is frozen",
        ])
        .assert()
        .success();

    provisor(&root)
        .args(["instance", "create", "redis", "--broker", "overview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Feature Disabled: instance creation is frozen",
        ));

    provisor(&root)
        .args(["flag", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("service_instance_creation"))
        .stdout(predicate::str::contains("disabled"));
}

#[test]
fn unknown_flag_is_refused() {
    let root = TempDir::new().unwrap();
    init(&root);
    provisor(&root)
        .args(["flag", "enable", "bogus_feature_flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("undefined feature flag"));
}

#[test]
fn full_lifecycle_against_a_mock_broker() {
    let mut server = mockito::Server::new();
    server
        .mock(
            "PUT",
            mockito::Matcher::Regex(r"^/v2/service_instances/[0-9a-f-]+$".to_string()),
        )
        .with_status(201)
        .with_body("{}")
        .create();
    server
        .mock(
            "PUT",
            mockito::Matcher::Regex(
                r"^/v2/service_instances/[0-9a-f-]+/service_bindings/[0-9a-f-]+$".to_string(),
            ),
        )
        .with_status(201)
        .with_body("{}")
        .create();
    server
        .mock(
            "DELETE",
            mockito::Matcher::Regex(
                r"^/v2/service_instances/[0-9a-f-]+/service_bindings/[0-9a-f-]+$".to_string(),
            ),
        )
        .with_status(200)
        .with_body("{}")
        .create();
    server
        .mock(
            "DELETE",
            mockito::Matcher::Regex(r"^/v2/service_instances/[0-9a-f-]+$".to_string()),
        )
        .with_status(200)
        .with_body("{}")
        .create();

    let root = TempDir::new().unwrap();
    init(&root);
    add_broker(&root, &server.url());

    provisor(&root)
        .args(["instance", "create", "redis", "--broker", "overview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created instance: redis"));

    provisor(&root)
        .args(["instance", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("redis"))
        .stdout(predicate::str::contains("create succeeded"));

    provisor(&root)
        .args(["key", "create", "redis-key", "--instance", "redis"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created key: redis-key"));

    // An instance with keys cannot be deleted.
    provisor(&root)
        .args(["instance", "delete", "redis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still has service keys"));

    provisor(&root)
        .args(["key", "delete", "redis-key"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted key: redis-key"));

    provisor(&root)
        .args(["instance", "delete", "redis"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted instance: redis"));

    provisor(&root)
        .args(["instance", "show", "redis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("instance not found"));
}

#[test]
fn broker_rejection_surfaces_the_detail() {
    let mut server = mockito::Server::new();
    server
        .mock(
            "PUT",
            mockito::Matcher::Regex(r"^/v2/service_instances/[0-9a-f-]+$".to_string()),
        )
        .with_status(400)
        .with_body(r#"{"description":"plan quota exceeded"}"#)
        .create();

    let root = TempDir::new().unwrap();
    init(&root);
    add_broker(&root, &server.url());

    provisor(&root)
        .args(["instance", "create", "redis", "--broker", "overview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("plan quota exceeded"));

    // The record remains with a failed operation for inspection.
    provisor(&root)
        .args(["instance", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create failed"));
}

#[test]
fn stuck_operations_report_is_empty_on_fresh_state() {
    let root = TempDir::new().unwrap();
    init(&root);
    provisor(&root)
        .args(["ops", "stuck"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No stuck operations."));
}
