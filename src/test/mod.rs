
use std::path::PathBuf;
use std::sync::Arc;

use crate::modules::audit::service::AuditService;
use crate::modules::auth::service::AuthService;
use crate::modules::file::service::FileService;
use crate::modules::policy::Actor;
use crate::modules::setting::service::SettingService;
use crate::modules::user::schema::UserEntity;
use crate::modules::user::service::UserService;
use crate::utils::ClientMeta;

/// The full service graph wired onto one shared in-memory store, with a
/// throwaway upload directory.
pub struct TestHarness {
    pub store: Arc<fakes::InMemoryStore>,
    pub audit: AuditService,
    pub settings: SettingService,
    pub auth: AuthService,
    pub files: FileService,
    pub users: UserService,
    pub upload_root: PathBuf,
}

pub async fn harness() -> TestHarness {
    let store = Arc::new(fakes::InMemoryStore::default());
    let upload_root =
        std::env::temp_dir().join(format!("sharehub-test-{}", uuid::Uuid::now_v7()));
    tokio::fs::create_dir_all(&upload_root).await.unwrap();

    let audit = AuditService::with_dependencies(store.clone());
    let settings = SettingService::with_dependencies(store.clone(), audit.clone());
    let auth = AuthService::with_dependencies(
        store.clone(),
        store.clone(),
        settings.clone(),
        audit.clone(),
    );
    let files = FileService::with_dependencies(
        store.clone(),
        settings.clone(),
        audit.clone(),
        upload_root.clone(),
    );
    let users = UserService::with_dependencies(
        store.clone(),
        store.clone(),
        settings.clone(),
        audit.clone(),
    );

    TestHarness { store, audit, settings, auth, files, users, upload_root }
}

pub fn meta() -> ClientMeta {
    ClientMeta { ip: "203.0.113.9".to_string(), user_agent: "integration-tests".to_string() }
}

pub fn actor_of(user: &UserEntity) -> Actor {
    Actor { id: user.id, role: user.role }
}
