use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::IdentityResolver;
use crate::config::AppConfig;
use crate::database::models::TimeRecordKind;
use crate::database::{Backend, DatabaseManager, HealthCheck, Store};
use crate::handlers::protected::time_records::{Entries, RecordRoute, TimeBoxes};
use crate::handlers::{protected, public};
use crate::middleware::require_identity;
use crate::services::{FolderService, NoteService, ProjectService, TimeRecordService, UserService};

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub projects: ProjectService,
    pub folders: FolderService,
    pub notes: NoteService,
    pub time_entries: TimeRecordService,
    pub time_box_entries: TimeRecordService,
    pub identity: Arc<dyn IdentityResolver>,
    pub health: Arc<dyn HealthCheck>,
    pub backend_name: &'static str,
}

impl AppState {
    pub fn from_store<S: Store + 'static>(
        store: Arc<S>,
        backend_name: &'static str,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            users: UserService::new(store.clone()),
            projects: ProjectService::new(store.clone()),
            folders: FolderService::new(store.clone()),
            notes: NoteService::new(store.clone()),
            time_entries: TimeRecordService::new(TimeRecordKind::Entry, store.clone()),
            time_box_entries: TimeRecordService::new(TimeRecordKind::TimeBox, store.clone()),
            health: store,
            identity,
            backend_name,
        }
    }

    pub fn from_manager(manager: &DatabaseManager, identity: Arc<dyn IdentityResolver>) -> Self {
        let name = manager.backend().name();
        match manager.backend() {
            Backend::Postgres(store) => Self::from_store(store.clone(), name, identity),
            Backend::Memory(store) => Self::from_store(store.clone(), name, identity),
        }
    }

    pub fn time_records(&self, kind: TimeRecordKind) -> &TimeRecordService {
        match kind {
            TimeRecordKind::Entry => &self.time_entries,
            TimeRecordKind::TimeBox => &self.time_box_entries,
        }
    }
}

/// Build the full router: public routes, the authenticated API and global layers.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let protected = Router::new()
        .route("/auth/login", post(protected::auth::login))
        .route("/auth/me", get(protected::auth::me))
        .route("/folders", get(protected::folders::list).post(protected::folders::create))
        .route("/folders/by-parent", get(protected::folders::list_by_parent))
        .route(
            "/folders/:id",
            get(protected::folders::get)
                .put(protected::folders::update)
                .delete(protected::folders::delete),
        )
        .route("/notes", get(protected::notes::list).post(protected::notes::create))
        .route("/notes/by-folder", get(protected::notes::list_by_folder))
        .route(
            "/notes/:id",
            get(protected::notes::get)
                .put(protected::notes::update)
                .delete(protected::notes::delete),
        )
        .route(
            "/projects",
            get(protected::projects::list)
                .post(protected::projects::create)
                .put(protected::projects::update),
        )
        .route("/projects/:id", delete(protected::projects::delete))
        .merge(time_record_routes::<Entries>())
        .merge(time_record_routes::<TimeBoxes>())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_identity));

    let mut router = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(protected)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn time_record_routes<K: RecordRoute>() -> Router<AppState> {
    use protected::time_records;

    Router::new()
        .route(
            K::PATH,
            get(time_records::list::<K>)
                .post(time_records::create::<K>)
                .put(time_records::update::<K>),
        )
        .route(&format!("{}/:id", K::PATH), delete(time_records::delete::<K>))
        .route(
            &format!("{}/:id/assign-project", K::PATH),
            patch(time_records::assign_project::<K>),
        )
}

/// An empty list or `*` allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
