//! Integration tests for the inventory workflows against a mocked API.

mod fixtures;

use fixtures::{TOKEN, assetdesk, can_bind_localhost, temp_home, write_session};
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_transfer_form(server: &MockServer) {
    mount_get(
        server,
        "/assets",
        json!([{"id": 1, "name": "Laptop", "category": "IT", "status_id": 1,
                "current_location_id": 1}]),
    )
    .await;
    mount_get(
        server,
        "/employees",
        json!([{"id": 1, "full_name": "Ann Lee", "email": "ann@example.com"}]),
    )
    .await;
    mount_get(server, "/locations", fixtures::locations()).await;
}

/// Test: a transfer between identical locations never reaches the server.
#[tokio::test]
async fn test_transfer_same_locations_rejected() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    write_session(home.path(), TOKEN);
    let server = MockServer::start().await;
    mount_transfer_form(&server).await;

    Mock::given(method("POST"))
        .and(path("/transfers"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
        .expect(0)
        .mount(&server)
        .await;

    assetdesk(home.path(), &server.uri())
        .args([
            "transfers", "create", "--asset", "1", "--employee", "1", "--from", "1", "--to", "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Source and destination locations must differ",
        ));
}

/// Test: a valid transfer is posted and the list is reloaded.
#[tokio::test]
async fn test_transfer_created() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    write_session(home.path(), TOKEN);
    let server = MockServer::start().await;
    mount_transfer_form(&server).await;
    mount_get(&server, "/transfers", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/transfers"))
        .and(body_json(json!({
            "asset_id": 1,
            "employee_id": 1,
            "from_location_id": 1,
            "to_location_id": 2,
            "transfer_date": "2024-06-01T10:30",
            "notes": "desk move"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;

    assetdesk(home.path(), &server.uri())
        .args([
            "transfers",
            "create",
            "--asset",
            "1",
            "--employee",
            "1",
            "--from",
            "1",
            "--to",
            "2",
            "--date",
            "2024-06-01T10:30",
            "--notes",
            "desk move",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transfer #9 created"));
}

/// Test: the status report prints one row per status with formatted cost.
#[tokio::test]
async fn test_status_report_rows() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    write_session(home.path(), TOKEN);
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/reports/assets-by-status",
        json!([{"status": "In Use", "count": 5, "total_cost": 1000}]),
    )
    .await;

    assetdesk(home.path(), &server.uri())
        .args(["reports", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assets by status"))
        .stdout(predicate::str::contains("In Use"))
        .stdout(predicate::str::contains("1000.00 ₽"));
}

/// Test: --yes skips the prompt and deletes the asset.
#[tokio::test]
async fn test_asset_delete_with_yes() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    write_session(home.path(), TOKEN);
    let server = MockServer::start().await;
    mount_get(&server, "/assets", json!([])).await;

    Mock::given(method("DELETE"))
        .and(path("/assets/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assetdesk(home.path(), &server.uri())
        .args(["--yes", "assets", "delete", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Asset deleted"));
}

/// Test: declining the prompt sends nothing.
#[tokio::test]
async fn test_asset_delete_declined() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    write_session(home.path(), TOKEN);
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    assetdesk(home.path(), &server.uri())
        .args(["assets", "delete", "3"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Delete asset #3? [y/N]"));
}

/// Test: an invalid cost is reported without posting.
#[tokio::test]
async fn test_asset_create_rejects_bad_cost() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    write_session(home.path(), TOKEN);
    let server = MockServer::start().await;
    mount_get(&server, "/assets/statuses", json!([{"id": 1, "name": "In Use"}])).await;
    mount_get(&server, "/locations", fixtures::locations()).await;
    mount_get(&server, "/departments", json!([])).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    assetdesk(home.path(), &server.uri())
        .args([
            "assets",
            "create",
            "--name",
            "Desk",
            "--category",
            "Furniture",
            "--acquired",
            "2024-02-01",
            "--cost",
            "cheap",
            "--status",
            "1",
            "--location",
            "2",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Cost must be a non-negative number: cheap",
        ));
}

/// Test: without options the create command only prints the form.
#[tokio::test]
async fn test_asset_create_without_options_shows_form() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    write_session(home.path(), TOKEN);
    let server = MockServer::start().await;
    mount_get(&server, "/assets/statuses", json!([{"id": 1, "name": "In Use"}])).await;
    mount_get(&server, "/locations", fixtures::locations()).await;
    mount_get(&server, "/departments", json!([])).await;

    assetdesk(home.path(), &server.uri())
        .args(["assets", "create"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status (status_id) *"))
        .stdout(predicate::str::contains("1 = In Use"))
        .stdout(predicate::str::contains("2 = Warehouse B"));
}

/// Test: the dashboard shows counts even when transfers fail to load.
#[tokio::test]
async fn test_dashboard_survives_transfer_failure() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    write_session(home.path(), TOKEN);
    let server = MockServer::start().await;
    mount_get(&server, "/assets", json!([{}, {}])).await;
    mount_get(&server, "/employees", json!([{}])).await;
    mount_get(&server, "/departments", json!([])).await;
    Mock::given(method("GET"))
        .and(path("/transfers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assetdesk(home.path(), &server.uri())
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dashboard"))
        .stdout(predicate::str::contains("Recent transfers").not());
}
