//! HTTP client tests against a local mock of the download endpoint

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use extrateto_common::SyncStatus;
use extrateto_sync::db::{membros, sync_log};
use extrateto_sync::services::fetch_orgao;
use extrateto_sync::{DadosJusBrClient, FetchError, OrgaoSource, SyncOrchestrator, SyncSettings};
use helpers::{create_test_db, csv_body, mes};

fn client(server: &MockServer) -> DadosJusBrClient {
    DadosJusBrClient::new(format!("{}/download", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_year_month_and_organ() {
    let server = MockServer::start().await;
    let body = csv_body(&[("Ana Lima", "base", "", "30.000,00")]);
    Mock::given(method("GET"))
        .and(path("/download"))
        .and(query_param("anos", "2025"))
        .and(query_param("meses", "6"))
        .and(query_param("orgaos", "tjsp"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client(&server).fetch_csv("tjsp", mes(2025, 6)).await.unwrap();
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).fetch_csv("mpsp", mes(2025, 6)).await.unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus { status: 500, .. }));
    assert_eq!(err.orgao(), "mpsp");
}

#[tokio::test]
async fn test_short_body_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("sem dados"))
        .mount(&server)
        .await;

    let err = fetch_orgao(&client(&server), "tjac", mes(2025, 6), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::PayloadTooShort { len: 9, .. }));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let err = fetch_orgao(&client(&server), "tjac", mes(2025, 6), Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout { .. }));
}

#[tokio::test]
async fn test_orchestrator_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("orgaos", "tjsp"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(csv_body(&[("Ana Lima", "base", "", "30.000,00")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("orgaos", "tjrj"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (_dir, pool) = create_test_db().await.unwrap();
    let settings = SyncSettings {
        batch_delay: Duration::ZERO,
        ..SyncSettings::default()
    };
    let orchestrator =
        SyncOrchestrator::new(pool.clone(), Arc::new(client(&server)), settings).with_orgaos(["tjsp", "tjrj"]);

    let run = orchestrator.sync_months(&[mes(2025, 6)], false).await.unwrap();
    assert_eq!(run.total_membros(), 1);
    assert_eq!(run.failed(), 1);
    assert_eq!(membros::count_month(&pool, mes(2025, 6)).await.unwrap(), 1);

    let log = sync_log::list(&pool, Some(mes(2025, 6))).await.unwrap();
    assert_eq!(log.iter().filter(|e| e.status == SyncStatus::Error).count(), 1);
}
