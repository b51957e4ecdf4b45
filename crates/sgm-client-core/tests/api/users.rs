use crate::helpers::{notifier, spawn_app, KNOWN_USER, VALID_TOKEN};
use sgm_client_core::{PanelState, PermissionTogglePanel};
use sgm_shared::{const_config::messages::MSG_USER_NOT_FOUND, id::ModuleId, uac::UserIdentifier};

#[tokio::test]
async fn find_user_sends_credential_and_seeds_permissions() {
    // Arrange
    let mut app = spawn_app().await;
    app.login("admin", "admin").await.unwrap();
    let mut panel = PermissionTogglePanel::new(app.core_client.clone());
    let (notify, done) = notifier();

    // Act
    panel.find_user(KNOWN_USER, notify).unwrap();
    done.await.unwrap();
    panel.poll();

    // Assert
    let user = panel.selected_user().expect("user should be found");
    assert_eq!(user.lookup().user_name, "Dickens Labán");
    assert!(user.permissions().contains(&ModuleId::from("1")));
    assert_eq!(user.permissions().len(), 1);
    assert_eq!(
        app.stub.authorization_headers.lock().unwrap().last(),
        Some(&Some(format!("Bearer {VALID_TOKEN}")))
    );
}

#[tokio::test]
async fn unknown_user_shows_server_message() {
    // Arrange
    let mut app = spawn_app().await;
    app.login("admin", "admin").await.unwrap();
    let mut panel = PermissionTogglePanel::new(app.core_client.clone());
    let (notify, done) = notifier();

    // Act
    panel.find_user("73974061", notify).unwrap();
    done.await.unwrap();
    panel.poll();

    // Assert
    assert!(panel.selected_user().is_none());
    assert!(matches!(panel.state(), PanelState::NotFound(msg) if msg == "DNI no registrado"));
}

#[tokio::test]
async fn unknown_user_without_message_uses_generic_text() {
    // Arrange
    let mut app = spawn_app().await;
    app.login("admin", "admin").await.unwrap();
    let identifier = UserIdentifier::try_from("silent").unwrap();
    let (notify, done) = notifier();

    // Act
    let rx = app.core_client.find_user(&identifier, notify);
    done.await.unwrap();
    let outcome = rx.await.unwrap();

    // Assert
    assert_eq!(outcome.unwrap_err().to_string(), MSG_USER_NOT_FOUND);
}

#[tokio::test]
async fn module_catalog_accepts_server_field_names() {
    // Arrange
    let mut app = spawn_app().await;
    app.login("admin", "admin").await.unwrap();
    let mut panel = PermissionTogglePanel::new(app.core_client.clone());
    let (notify, done) = notifier();

    // Act
    panel.load_module_catalog(notify);
    done.await.unwrap();
    panel.poll();

    // Assert
    let catalog = panel.modules().present().expect("catalog should load");
    assert_eq!(catalog.modules.len(), 3);
    assert_eq!(
        catalog.find(&ModuleId::from("3")).unwrap().name,
        "Defensa civil"
    );
}
