pub mod article;
pub mod comment;
pub mod config;
pub mod db;
pub mod endpoints;
pub mod logging;
pub mod topic;
pub mod types;
pub mod users;
mod utils;

use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::http::Status;
use rocket::serde::json::{json, Json, Value};
use rocket::{catch, catchers, routes, Build, Request, Rocket};

use crate::db::Db;

#[catch(404)]
fn not_found(_req: &Request) -> Json<Value> {
    Json(json!({ "msg": "path not found" }))
}

#[catch(400)]
fn bad_request(_req: &Request) -> Json<Value> {
    Json(json!({ "msg": "bad request" }))
}

#[catch(500)]
fn internal_error(_req: &Request) -> Json<Value> {
    Json(json!({ "msg": "internal server error" }))
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> Json<Value> {
    let msg = status.reason().unwrap_or("unknown error").to_lowercase();
    Json(json!({ "msg": msg }))
}

/// Assembles the API around an already opened store.
pub fn build(figment: Figment, db: Db) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(db)
        .mount(
            "/api",
            routes![
                endpoints::describe,
                topic::list,
                article::get,
                article::list,
                article::update,
                comment::list,
                comment::add,
                comment::update,
                comment::delete,
                users::list,
                users::get,
            ],
        )
        .register(
            "/",
            catchers![not_found, bad_request, internal_error, default_catcher],
        )
        .attach(AdHoc::on_shutdown("Shutdown log", |_| {
            Box::pin(async {
                tracing::info!("shutting down");
            })
        }))
}
