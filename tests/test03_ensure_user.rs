use pg_provision::prelude::*;
use pg_provision::test_utils::{FakeHost, LogCapture};

#[tokio::test(flavor = "current_thread")]
async fn second_call_does_not_create_again() -> Result<(), ProvisionError> {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fake = FakeHost::new();
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let first = reconciler.ensure_user("app", "secret").await?;
    let second = reconciler.ensure_user("app", "secret").await?;

    assert_eq!(first, Reconciled::Created);
    assert_eq!(second, Reconciled::AlreadyPresent);
    assert_eq!(
        fake.server().statements_starting_with("CREATE USER"),
        vec!["CREATE USER app WITH PASSWORD 'secret';".to_string()]
    );
    assert_eq!(logs.lines_containing("PostgreSQL user created").len(), 1);
    assert_eq!(logs.lines_containing("PostgreSQL user already exists").len(), 1);
    assert!(logs.lines_containing(" ERROR ").is_empty());
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn existing_user_keeps_its_password() -> Result<(), ProvisionError> {
    let fake = FakeHost::new();
    fake.server().roles.lock().unwrap().insert("app".to_string());
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let outcome = reconciler.ensure_user("app", "a-different-password").await?;

    assert_eq!(outcome, Reconciled::AlreadyPresent);
    assert!(fake.server().statements.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn connection_is_opened_on_demand_and_left_open() -> Result<(), ProvisionError> {
    let fake = FakeHost::new();
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    reconciler.ensure_user("one", "pw").await?;
    reconciler.ensure_user("two", "pw").await?;

    assert_eq!(reconciler.connection_state(), ConnectionState::Connected);
    assert_eq!(fake.connector.attempts(), 1);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn create_failure_reaches_the_caller() {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fake = FakeHost::new();
    fake.server().reject("CREATE USER");
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let err = reconciler.ensure_user("app", "secret").await.unwrap_err();

    assert!(matches!(err, ProvisionError::QueryError(_)));
    assert!(!fake.server().roles.lock().unwrap().contains("app"));

    assert!(logs.lines_containing("PostgreSQL user created").is_empty());
    let errors = logs.errors_with(&[r#"operation="ensure_user""#, r#"resource="app""#]);
    assert_eq!(errors.len(), 1, "{}", logs.contents());
}

#[tokio::test(flavor = "current_thread")]
async fn lookup_failure_is_fatal() {
    let fake = FakeHost::new();
    *fake.server().lookup_error.lock().unwrap() = Some("permission denied".into());
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let err = reconciler.ensure_user("app", "secret").await.unwrap_err();

    assert!(matches!(err, ProvisionError::QueryError(_)));
    assert!(fake.server().statements.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn connection_failure_stops_before_any_query() {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fake = FakeHost::new();
    *fake.connector.fail_connect.lock().unwrap() = Some("password authentication failed".into());
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    let err = reconciler.ensure_user("app", "secret").await.unwrap_err();

    assert!(matches!(err, ProvisionError::ConnectionError(_)));
    assert!(fake.server().statements.lock().unwrap().is_empty());

    // Reported once, by the operation the caller asked for.
    let errors = logs.lines_containing(" ERROR ");
    assert_eq!(errors.len(), 1, "{}", logs.contents());
    assert!(errors[0].contains(r#"operation="ensure_user""#));
}

#[tokio::test(flavor = "current_thread")]
async fn odd_names_are_quoted() -> Result<(), ProvisionError> {
    let fake = FakeHost::new();
    let mut reconciler = ResourceReconciler::new(ProvisionOptions::default(), fake.host());

    reconciler.ensure_user("Report Writer", "it's").await?;

    assert_eq!(
        fake.server().statements_starting_with("CREATE USER"),
        vec!["CREATE USER \"Report Writer\" WITH PASSWORD 'it''s';".to_string()]
    );
    Ok(())
}
