use lazy_static::lazy_static;
use rocket::get;
use rocket::serde::json::{json, Json, Value};

lazy_static! {
    static ref ENDPOINTS: Value = serde_json::from_str(include_str!("../endpoints.json"))
        .expect("endpoints.json is valid json");
}

/// `GET /api`: the static description of every route.
#[get("/")]
pub fn describe() -> Json<Value> {
    Json(json!({ "endpoints": ENDPOINTS.clone() }))
}
