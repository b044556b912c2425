use pg_provision::prelude::*;
use pg_provision::test_utils::{FakeHost, LogCapture};

const PROBE: &str = "psql -p 5432 -lqtA";

#[tokio::test(flavor = "current_thread")]
async fn probe_count_of_one_skips_creation() -> Result<(), ProvisionError> {
    let fake = FakeHost::new();
    fake.shell.reply(PROBE, "1\n");
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let outcome = reconciler
        .ensure_database("app_db", DatabaseOptions::default())
        .await?;

    assert_eq!(outcome, Reconciled::AlreadyPresent);
    assert!(fake.server().statements_starting_with("CREATE DATABASE").is_empty());
    // No creation needed, so no connection either.
    assert_eq!(fake.connector.attempts(), 0);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn absent_database_is_created_with_options() -> Result<(), ProvisionError> {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fake = FakeHost::new();
    fake.shell.reply(PROBE, "0\n");
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let outcome = reconciler
        .ensure_database(
            "app_db",
            DatabaseOptions::new().owner("app").encoding("'UTF8'"),
        )
        .await?;

    assert_eq!(outcome, Reconciled::Created);
    assert_eq!(
        fake.server().statements_starting_with("CREATE DATABASE"),
        vec!["CREATE DATABASE app_db OWNER app ENCODING 'UTF8';".to_string()]
    );
    assert_eq!(reconciler.connection_state(), ConnectionState::Connected);

    let probes = fake.shell.commands_containing("grep -Fx -- 'app_db'");
    assert_eq!(probes.len(), 1);
    assert_eq!(logs.lines_containing("database created").len(), 1);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn failed_probe_still_attempts_creation() -> Result<(), ProvisionError> {
    let fake = FakeHost::new();
    fake.shell.fail(PROBE, "sudo: unknown user postgres");
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let outcome = reconciler
        .ensure_database("app_db", DatabaseOptions::default())
        .await?;

    assert_eq!(outcome, Reconciled::Created);
    assert_eq!(
        fake.server().statements_starting_with("CREATE DATABASE"),
        vec!["CREATE DATABASE app_db;".to_string()]
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn unparseable_probe_output_is_treated_as_absent() -> Result<(), ProvisionError> {
    let fake = FakeHost::new();
    fake.shell.reply(PROBE, "psql: could not connect\n");
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let outcome = reconciler
        .ensure_database("app_db", DatabaseOptions::default())
        .await?;

    assert_eq!(outcome, Reconciled::Created);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn create_failure_after_stale_probe_propagates() {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fake = FakeHost::new();
    fake.shell.reply(PROBE, "0\n");
    fake.server().reject("CREATE DATABASE");
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let err = reconciler
        .ensure_database("app_db", DatabaseOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::QueryError(_)));
    assert!(logs.lines_containing("database created").is_empty());
    let errors = logs.errors_with(&[r#"operation="ensure_database""#, r#"resource="app_db""#]);
    assert_eq!(errors.len(), 1, "{}", logs.contents());
}

#[tokio::test(flavor = "current_thread")]
async fn connection_failure_propagates() {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fake = FakeHost::new();
    fake.shell.reply(PROBE, "0\n");
    *fake.connector.fail_connect.lock().unwrap() = Some("no route to host".into());
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let err = reconciler
        .ensure_database("app_db", DatabaseOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::ConnectionError(_)));
    assert_eq!(reconciler.connection_state(), ConnectionState::Unconnected);
    assert_eq!(logs.lines_containing(" ERROR ").len(), 1, "{}", logs.contents());
}
