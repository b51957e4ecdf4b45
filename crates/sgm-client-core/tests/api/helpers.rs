use actix_web::{dev::Server, web, App, HttpRequest, HttpResponse, HttpServer};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use futures::channel::oneshot;
use sgm_client_core::{Client, CredentialHandle, MemoryStorage, SessionStore};
use sgm_shared::{
    const_config::path::{PATH_API_PERMISSION_UPDATE, PATH_API_USER, PATH_LOGIN, PATH_MODULES},
    req_args::api::PermissionUpdateReqArgs,
    telemetry::{self, get_subscriber, init_subscriber},
};
use std::net::TcpListener;
use std::ops::Deref;
use std::path::Path;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    LazyLock, Mutex,
};

/// The only credential the stub accepts
pub const VALID_TOKEN: &str = "tok";
/// Updating this module always fails on the stub
pub const FAILING_MODULE: &str = "13";
pub const KNOWN_USER: &str = "5";
/// Expiry in the claims of the signed credential handed out by the stub
pub const SIGNED_EXP_SECS: u64 = 4_000_000_000;

// Ensure that the `tracing` stack is only initialised once
pub static TRACING: LazyLock<String> = LazyLock::new(|| {
    const NAME: &str = "client_core_tests";
    if std::env::var("TEST_LOG").is_ok() {
        let path = telemetry::init_file_subscriber(Path::new("traces"), NAME, "info").unwrap();
        format!("Traces for tests being written to: {path:?}")
    } else {
        init_subscriber(get_subscriber(NAME, "info", std::io::sink)).unwrap();
        "Traces set to std::io::sink".to_string()
    }
});

/// What the stub server saw and how it should behave
#[derive(Debug, Default)]
pub struct StubState {
    pub permission_updates: Mutex<Vec<PermissionUpdateReqArgs>>,
    pub authorization_headers: Mutex<Vec<Option<String>>>,
    /// Rejects every credential when set, as if it had been revoked
    pub is_rejecting_credentials: AtomicBool,
}

pub struct TestApp {
    pub address: String,
    pub stub: web::Data<StubState>,
    pub storage: MemoryStorage,
    pub core_client: Client,
    pub store: SessionStore,
}

impl TestApp {
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<(), sgm_shared::errors::ClientError> {
        let client = self.core_client.clone();
        self.store
            .login(
                &client,
                sgm_shared::req_args::LoginReqArgs::new(username, password.to_string().into()),
            )
            .await
    }
}

/// Returns a callback and a receiver that resolves once the callback ran
pub fn notifier() -> (impl FnOnce() + Send + 'static, oneshot::Receiver<()>) {
    let (tx, rx) = oneshot::channel();
    (
        move || {
            let _ = tx.send(());
        },
        rx,
    )
}

pub async fn spawn_app() -> TestApp {
    start_tracing();
    let stub = web::Data::new(StubState::default());
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let server = run_stub(listener, stub.clone()).expect("failed to start stub server");
    // Leak the handle so the server lives as long as the runtime
    let _ = tokio::spawn(server);

    let address = format!("http://127.0.0.1:{port}");
    let storage = MemoryStorage::new();
    let credential = CredentialHandle::default();
    let store = SessionStore::initialize(Box::new(storage.new_handle()), credential.clone());
    let core_client =
        Client::with_credential(&address, credential).expect("failed to build client");
    TestApp {
        address,
        stub,
        storage,
        core_client,
        store,
    }
}

fn start_tracing() {
    // Accessing TRACING also forces the LazyLock to initialize
    let logging_msg = TRACING.deref();
    println!("{logging_msg}");
}

fn run_stub(listener: TcpListener, stub: web::Data<StubState>) -> std::io::Result<Server> {
    let user_path = format!("{}{{identifier}}", PATH_API_USER.path);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(stub.clone())
            .route(PATH_LOGIN.path, web::post().to(login))
            .route(PATH_MODULES.path, web::get().to(modules))
            .route(&user_path, web::get().to(find_user))
            .route(
                PATH_API_PERMISSION_UPDATE.path,
                web::post().to(update_permission),
            )
    })
    .workers(1)
    .listen(listener)?
    .run();
    Ok(server)
}

fn bearer(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn is_authorized(req: &HttpRequest, stub: &StubState) -> bool {
    let header = bearer(req);
    let expected = format!("Bearer {VALID_TOKEN}");
    let result = header.as_deref() == Some(expected.as_str())
        && !stub.is_rejecting_credentials.load(Ordering::SeqCst);
    stub.authorization_headers.lock().unwrap().push(header);
    result
}

async fn login(body: web::Json<serde_json::Value>) -> HttpResponse {
    let username = body["userName"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (username, password) {
        ("admin", "admin") => HttpResponse::Ok().json(serde_json::json!({
            "user": {
                "id": "1",
                "nombre": "Administrador",
                "role": "admin",
                "modules": ["mod1", "mod2"],
            },
            "token": VALID_TOKEN,
            "expiresIn": 3600,
        })),
        ("signed", "signed") => {
            let payload = URL_SAFE_NO_PAD.encode(
                serde_json::json!({"exp": SIGNED_EXP_SECS, "data": {"id": 42, "nombre": "Firmado"}})
                    .to_string(),
            );
            HttpResponse::Ok().json(format!("eyJhbGciOiJIUzI1NiJ9.{payload}.firma"))
        }
        ("garbled", "garbled") => HttpResponse::Ok().json("esto.no-es.valido"),
        _ => HttpResponse::Unauthorized()
            .json(serde_json::json!({"message": "Credenciales inválidas"})),
    }
}

async fn modules(req: HttpRequest, stub: web::Data<StubState>) -> HttpResponse {
    if !is_authorized(&req, &stub) {
        return HttpResponse::Unauthorized().finish();
    }
    HttpResponse::Ok().json(serde_json::json!({
        "modules": [
            {"id_modulo": "1", "nombre_modulo": "Recursos Humanos"},
            {"id_modulo": "3", "nombre_modulo": "Defensa civil"},
            {"id_modulo": FAILING_MODULE, "nombre_modulo": "Rentas"},
        ]
    }))
}

async fn find_user(
    req: HttpRequest,
    path: web::Path<String>,
    stub: web::Data<StubState>,
) -> HttpResponse {
    if !is_authorized(&req, &stub) {
        return HttpResponse::Unauthorized().json(serde_json::json!({"message": "Token inválido"}));
    }
    match path.as_str() {
        KNOWN_USER => HttpResponse::Ok().json(serde_json::json!({
            "userId": KNOWN_USER,
            "userName": "Dickens Labán",
            "roleId": "2",
            "roleName": "Desarrollador",
            "officeName": "OTIC",
            "modules": [{"moduleId": "1", "ModuleName": "Recursos Humanos"}],
        })),
        "silent" => HttpResponse::NotFound().finish(),
        _ => HttpResponse::NotFound().json(serde_json::json!({"message": "DNI no registrado"})),
    }
}

async fn update_permission(
    req: HttpRequest,
    body: web::Json<PermissionUpdateReqArgs>,
    stub: web::Data<StubState>,
) -> HttpResponse {
    if !is_authorized(&req, &stub) {
        return HttpResponse::Unauthorized().finish();
    }
    let args = body.into_inner();
    if args.module_id.as_ref() == FAILING_MODULE {
        return HttpResponse::InternalServerError()
            .json(serde_json::json!({"message": "No se pudo actualizar el permiso"}));
    }
    stub.permission_updates.lock().unwrap().push(args);
    HttpResponse::Ok().json(serde_json::json!({"success": true}))
}
