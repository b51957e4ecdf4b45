use crate::helpers::{notifier, spawn_app, FAILING_MODULE, KNOWN_USER};
use sgm_client_core::{Client, MessageKind, ModuleAccess, PermissionTogglePanel, ToggleOutcome};
use sgm_shared::{
    const_config::messages::MSG_PERMISSION_GRANTED, errors::ClientError, id::ModuleId,
    req_args::api::PermissionUpdateReqArgs,
};
use std::sync::atomic::Ordering;

async fn panel_with_known_user(client: &Client) -> PermissionTogglePanel<Client> {
    let mut panel = PermissionTogglePanel::new(client.clone());
    let (notify, done) = notifier();
    panel.find_user(KNOWN_USER, notify).unwrap();
    done.await.unwrap();
    panel.poll();
    assert!(panel.selected_user().is_some());
    panel
}

#[tokio::test]
async fn grant_permission_round_trip() {
    // Arrange
    let mut app = spawn_app().await;
    app.login("admin", "admin").await.unwrap();
    let mut panel = panel_with_known_user(&app.core_client).await;
    let module = ModuleId::from("3");
    let (notify, done) = notifier();

    // Act
    let outcome = panel.toggle_permission(&module, notify);
    done.await.unwrap();
    panel.poll();

    // Assert
    assert_eq!(outcome, ToggleOutcome::Sent { requested: true });
    assert_eq!(panel.module_access(&module), Some(ModuleAccess::Granted));
    let msg = panel.message().unwrap();
    assert_eq!(msg.kind, MessageKind::Success);
    assert_eq!(msg.text, MSG_PERMISSION_GRANTED);
    assert_eq!(
        app.stub.permission_updates.lock().unwrap().as_slice(),
        &[PermissionUpdateReqArgs {
            user_id: KNOWN_USER.into(),
            module_id: module,
            has_permission: true,
        }]
    );
}

#[tokio::test]
async fn server_failure_rolls_back() {
    // Arrange
    let mut app = spawn_app().await;
    app.login("admin", "admin").await.unwrap();
    let mut panel = panel_with_known_user(&app.core_client).await;
    let module = ModuleId::from(FAILING_MODULE);
    let (notify, done) = notifier();

    // Act
    let _ = panel.toggle_permission(&module, notify);
    assert_eq!(
        panel.module_access(&module),
        Some(ModuleAccess::Pending { requested: true })
    );
    done.await.unwrap();
    panel.poll();

    // Assert
    assert_eq!(panel.module_access(&module), Some(ModuleAccess::NotGranted));
    let msg = panel.message().unwrap();
    assert_eq!(msg.kind, MessageKind::Error);
    assert_eq!(msg.text, "No se pudo actualizar el permiso");
    assert!(app.stub.permission_updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_credential_tears_down_session() {
    // Arrange
    let mut app = spawn_app().await;
    app.login("admin", "admin").await.unwrap();
    let mut panel = panel_with_known_user(&app.core_client).await;
    app.stub
        .is_rejecting_credentials
        .store(true, Ordering::SeqCst);
    let (notify, done) = notifier();

    // Act
    let _ = panel.toggle_permission(&ModuleId::from("3"), notify);
    done.await.unwrap();
    panel.poll();

    // Assert
    assert_eq!(panel.module_access(&ModuleId::from("3")), Some(ModuleAccess::NotGranted));
    assert_eq!(
        panel.message().unwrap().text,
        ClientError::Unauthorized.to_string()
    );
    assert!(!app.store.is_authenticated());
    app.store.sync();
    assert!(app.store.session().is_empty());
}
