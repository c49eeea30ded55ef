use std::process;

use nc_news::config::{self, AppConfig};
use nc_news::db::{self, Db, PgStore};
use nc_news::logging;

#[rocket::main]
async fn main() {
    logging::init();

    let figment = config::figment();
    let app_config = match AppConfig::from_figment(&figment) {
        Ok(app_config) => app_config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            process::exit(1);
        }
    };

    let pool = db::init_pool(&app_config).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run database migrations");
    tracing::info!(pool_size = app_config.pool_size, "database pool ready");

    if let Err(e) = nc_news::build(figment, Db::new(PgStore::new(pool)))
        .launch()
        .await
    {
        tracing::error!(error = %e, "server failed");
        process::exit(1);
    }
}
