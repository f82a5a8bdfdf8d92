mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, password, use_cases};
pub use interfaces::{handlers, middlewares, repositories};
pub use infrastructure::{auth, db, storage};

use repositories::sqlx_repo::{SqlxArticleRepo, SqlxImageRepo, SqlxOwnerRepo, SqlxUserRepo};
use storage::disk::DiskStorage;
use auth::jwt::JwtService;
use use_cases::articles::ArticleHandler;
use use_cases::ingest::UploadIngestor;
use use_cases::reconcile::AttachmentReconciler;
use use_cases::users::UserHandler;

pub type AppArticleHandler = ArticleHandler<SqlxArticleRepo, SqlxImageRepo>;
pub type AppUserHandler = UserHandler<SqlxUserRepo, SqlxImageRepo>;
pub type AppReconciler = AttachmentReconciler<SqlxImageRepo, SqlxOwnerRepo>;
pub type AppIngestor = UploadIngestor<SqlxImageRepo, SqlxOwnerRepo>;

pub struct AppState {
    pub articles: AppArticleHandler,
    pub users: AppUserHandler,
    pub reconciler: AppReconciler,
    pub ingestor: AppIngestor,
    pub jwt: JwtService,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Self {
        let storage = DiskStorage::new(&config.upload_dir);
        let jwt = JwtService::new(config);

        AppState {
            articles: ArticleHandler::new(
                SqlxArticleRepo::new(pool.clone()),
                SqlxImageRepo::new(pool.clone()),
            ),
            users: UserHandler::new(
                SqlxUserRepo::new(pool.clone()),
                SqlxImageRepo::new(pool.clone()),
            ),
            reconciler: AttachmentReconciler::new(
                SqlxImageRepo::new(pool.clone()),
                SqlxOwnerRepo::new(pool.clone()),
            ),
            ingestor: UploadIngestor::new(
                SqlxImageRepo::new(pool.clone()),
                SqlxOwnerRepo::new(pool),
                storage,
            ),
            jwt,
        }
    }
}
