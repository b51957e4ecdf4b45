use crate::helpers::{spawn_app, SIGNED_EXP_SECS, VALID_TOKEN};
use sgm_client_core::{KeyValueStorage as _, SessionStore};
use sgm_shared::{
    const_config::storage::STORAGE_SESSION_KEY, errors::ClientError, id::UserId,
};
use sgm_time::{Seconds, Timestamp};

#[tokio::test]
async fn login_success_explicit_response() {
    // Arrange
    let mut app = spawn_app().await;
    let before = Timestamp::now();

    // Act
    app.login("admin", "admin").await.unwrap();

    // Assert
    assert!(app.store.is_authenticated());
    let user = app.store.user().unwrap();
    assert_eq!(user.id, UserId::from("1"));
    assert_eq!(user.display_name.to_string(), "Administrador");
    assert_eq!(app.store.token().unwrap().as_str(), VALID_TOKEN);
    let expires_at = app.store.expires_at().unwrap();
    assert!(expires_at >= before + Seconds::new(3600));
    assert!(expires_at <= Timestamp::now() + Seconds::new(3600));
}

#[tokio::test]
async fn login_success_signed_credential() {
    // Arrange
    let mut app = spawn_app().await;

    // Act
    app.login("signed", "signed").await.unwrap();

    // Assert
    assert!(app.store.is_authenticated());
    assert_eq!(app.store.user().unwrap().id, UserId::from("42"));
    assert_eq!(
        app.store.expires_at(),
        Some(Timestamp::from_secs(SIGNED_EXP_SECS))
    );
}

#[tokio::test]
async fn login_failure_invalid_credentials() {
    // Arrange
    let mut app = spawn_app().await;

    // Act
    let outcome = app.login("admin", "wrong").await;

    // Assert
    assert_eq!(
        outcome.unwrap_err(),
        ClientError::InvalidCredentials("Credenciales inválidas".to_string())
    );
    assert!(!app.store.is_authenticated());
    assert!(app.store.session().is_empty());
}

#[tokio::test]
async fn login_failure_malformed_credential_keeps_session() {
    // Arrange
    let mut app = spawn_app().await;
    app.login("admin", "admin").await.unwrap();
    let before = app.store.session().clone();

    // Act
    let outcome = app.login("garbled", "garbled").await;

    // Assert
    assert!(matches!(outcome, Err(ClientError::MalformedCredential(_))));
    assert_eq!(app.store.session(), &before);
}

#[tokio::test]
async fn login_failure_server_unreachable() {
    // Arrange
    let mut app = spawn_app().await;
    let credential = app.store.credential().clone();
    // Port 9 (discard) is not expected to have an HTTP server
    let client =
        sgm_client_core::Client::with_credential("http://127.0.0.1:9", credential).unwrap();

    // Act
    let outcome = app
        .store
        .login(
            &client,
            sgm_shared::req_args::LoginReqArgs::new("admin", "admin".to_string().into()),
        )
        .await;

    // Assert
    assert!(matches!(outcome, Err(ClientError::NetworkFailure(_))));
    assert!(!app.store.is_authenticated());
}

#[tokio::test]
async fn session_survives_restart_and_logout_is_shared() {
    // Arrange
    let mut app = spawn_app().await;
    app.login("admin", "admin").await.unwrap();

    // Act - a second window starts up on the same storage
    let mut other = SessionStore::initialize(
        Box::new(app.storage.new_handle()),
        Default::default(),
    );

    // Assert
    assert!(other.is_authenticated());
    assert_eq!(other.session(), app.store.session());

    // Act - logout in the first window
    app.store.logout();
    other.sync();

    // Assert
    assert!(!other.is_authenticated());
    assert_eq!(
        app.storage.new_handle().get_item(STORAGE_SESSION_KEY).unwrap(),
        None
    );
}
