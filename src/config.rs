use dotenv::dotenv;
use rocket::figment::providers::Env;
use rocket::figment::{self, Figment};
use serde_derive::Deserialize;

fn default_pool_size() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> Result<AppConfig, figment::Error> {
        figment.extract()
    }
}

/// Rocket's own configuration sources (`Rocket.toml`, `ROCKET_*`) plus the
/// plain `DATABASE_URL` variable, after loading `.env`.
pub fn figment() -> Figment {
    dotenv().ok();
    rocket::Config::figment().merge(Env::raw().only(&["database_url"]))
}
