//! Recreates the schema contents from a fixture directory.
//!
//! Usage: `seed [DIR]`, where `DIR` defaults to `data/test`.

use std::env;
use std::path::PathBuf;
use std::process;

use nc_news::config::{self, AppConfig};
use nc_news::db::seed::{self, SeedData};
use nc_news::db::{self, Error};
use nc_news::logging;

fn run(dir: PathBuf) -> db::Result<()> {
    let app_config =
        AppConfig::from_figment(&config::figment()).map_err(|e| Error::from(e.to_string()))?;
    let pool = db::init_pool(&app_config)?;
    db::run_migrations(&pool)?;
    let data = SeedData::load(&dir)?;
    let mut conn = pool.get()?;
    seed::seed(&mut conn, &data)
}

fn main() {
    logging::init();
    let dir = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/test"));

    if let Err(e) = run(dir) {
        tracing::error!(error = %e, "seeding failed");
        for cause in e.iter().skip(1) {
            tracing::error!(cause = %cause, "caused by");
        }
        process::exit(1);
    }
}
