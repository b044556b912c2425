use std::sync::atomic::Ordering;

use pg_provision::prelude::*;
use pg_provision::test_utils::{FakeHost, LogCapture};

#[tokio::test(flavor = "current_thread")]
async fn open_twice_connects_once() -> Result<(), ProvisionError> {
    let fake = FakeHost::new();
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    reconciler.open_connection().await?;
    reconciler.open_connection().await?;

    assert_eq!(fake.connector.attempts(), 1);
    assert_eq!(reconciler.connection_state(), ConnectionState::Connected);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn connects_with_merged_credentials() -> Result<(), ProvisionError> {
    let fake = FakeHost::new();
    let mut reconciler = ResourceReconciler::new(
        ProvisionOptions {
            port: Some(5433),
            default_password: Some("hunter2".into()),
            ..ProvisionOptions::default()
        },
        fake.host(),
    );

    reconciler.open_connection().await?;

    let params = fake.connector.last_params.lock().unwrap().clone().unwrap();
    assert_eq!(params.port, 5433);
    assert_eq!(params.user, "postgres");
    assert_eq!(params.password, "hunter2");
    assert_eq!(params.dbname, "postgres");
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn failed_connect_can_be_retried() {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fake = FakeHost::new();
    *fake.connector.fail_connect.lock().unwrap() = Some("connection refused".into());
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let err = reconciler.open_connection().await.unwrap_err();
    assert!(matches!(err, ProvisionError::ConnectionError(_)));
    assert_eq!(reconciler.connection_state(), ConnectionState::Unconnected);
    let errors = logs.errors_with(&[r#"operation="open_connection""#, "resource=postgres"]);
    assert_eq!(errors.len(), 1, "{}", logs.contents());

    *fake.connector.fail_connect.lock().unwrap() = None;
    reconciler.open_connection().await.unwrap();
    assert_eq!(reconciler.connection_state(), ConnectionState::Connected);
    assert_eq!(fake.connector.attempts(), 2);
}

#[tokio::test(flavor = "current_thread")]
async fn close_is_idempotent() -> Result<(), ProvisionError> {
    let fake = FakeHost::new();
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    reconciler.close_connection().await;
    assert_eq!(reconciler.connection_state(), ConnectionState::Unconnected);

    reconciler.open_connection().await?;
    reconciler.close_connection().await;
    reconciler.close_connection().await;

    assert_eq!(reconciler.connection_state(), ConnectionState::Closed);
    assert_eq!(fake.connector.closes.load(Ordering::SeqCst), 1);

    reconciler.open_connection().await?;
    assert_eq!(reconciler.connection_state(), ConnectionState::Connected);
    assert_eq!(fake.connector.attempts(), 2);
    Ok(())
}
