use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use diesel::result::Error as DieselError;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use error_chain::error_chain;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use rocket::tokio::task;

use crate::article::{Article, ArticleDetail, ArticleQuery, ArticleSummary};
use crate::comment::{Comment, NewComment};
use crate::config::AppConfig;
use crate::topic::Topic;
use crate::types::ApiError;
use crate::users::models::User;

pub mod memory;
pub mod pg;
pub mod schema;
pub mod seed;

pub use self::memory::MemoryStore;
pub use self::pg::PgStore;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

error_chain! {
    errors {
        ForeignKeyViolation(detail: String) {
            description("referenced row does not exist")
            display("referenced row does not exist: {}", detail)
        }
        OutOfRange(detail: String) {
            description("value out of range")
            display("value out of range: {}", detail)
        }
        Migration(detail: String) {
            description("migration failed")
            display("migration failed: {}", detail)
        }
    }

    foreign_links {
        Var(::std::env::VarError);
        R2D2(r2d2::Error);
        Diesel(DieselError);
        Io(::std::io::Error);
        Json(::serde_json::Error);
    }
}

/// Row-level access to the news tables.
///
/// Every method issues a single query (or its in-process equivalent) and
/// reports missing rows as `None`/`false`; deciding what a missing row means
/// is left to the domain operations.
pub trait NewsStore: Send + Sync {
    fn topics(&self) -> Result<Vec<Topic>>;
    fn topic_exists(&self, slug: &str) -> Result<bool>;

    fn article(&self, article_id: i32) -> Result<Option<ArticleDetail>>;
    fn article_exists(&self, article_id: i32) -> Result<bool>;
    fn articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleSummary>>;
    fn add_article_votes(&self, article_id: i32, inc_votes: i32) -> Result<Option<Article>>;

    /// Comments on one article, newest first.
    fn comments_for_article(&self, article_id: i32) -> Result<Vec<Comment>>;
    /// Fails with `ForeignKeyViolation` when the article or author is unknown.
    fn insert_comment(&self, comment: &NewComment) -> Result<Comment>;
    fn add_comment_votes(&self, comment_id: i32, inc_votes: i32) -> Result<Option<Comment>>;
    /// Returns whether a row was removed.
    fn delete_comment(&self, comment_id: i32) -> Result<bool>;

    fn users(&self) -> Result<Vec<User>>;
    fn user(&self, username: &str) -> Result<Option<User>>;
}

/// Shared handle to the store, managed by Rocket for the lifetime of the
/// server and dropped (closing the pool) on shutdown.
#[derive(Clone)]
pub struct Db(Arc<dyn NewsStore>);

impl Db {
    pub fn new<S: NewsStore + 'static>(store: S) -> Db {
        Db(Arc::new(store))
    }

    /// Runs a domain operation against the store on the blocking pool.
    pub async fn run<F, T>(&self, op: F) -> ::std::result::Result<T, ApiError>
    where
        F: FnOnce(&dyn NewsStore) -> ::std::result::Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.0);
        task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| ApiError::Internal(format!("store task failed: {}", e)))?
    }
}

/// Retrieves the store handle from managed state. If no store is managed,
/// fails with an `InternalServerError` status.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Db {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Db, ()> {
        match request.rocket().state::<Db>() {
            Some(db) => Outcome::Success(db.clone()),
            None => Outcome::Error((Status::InternalServerError, ())),
        }
    }
}

pub fn init_pool(config: &AppConfig) -> Result<Pool> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());
    let pool = Pool::builder().max_size(config.pool_size).build(manager)?;
    Ok(pool)
}

pub fn run_migrations(pool: &Pool) -> Result<()> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| ErrorKind::Migration(e.to_string()))?;
    for version in applied {
        tracing::info!(%version, "applied migration");
    }
    Ok(())
}
