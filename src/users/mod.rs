use rocket::get;
use rocket::serde::json::Json;
use serde_derive::Serialize;

use crate::db::{Db, NewsStore};
use crate::types::{ApiError, ApiResult};

pub mod models;

use self::models::User;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    user: User,
}

pub fn select_users(store: &dyn NewsStore) -> Result<Vec<User>, ApiError> {
    Ok(store.users()?)
}

pub fn select_user_by_username(store: &dyn NewsStore, username: &str) -> Result<User, ApiError> {
    store
        .user(username)?
        .ok_or_else(|| ApiError::not_found("user not found"))
}

#[get("/users")]
pub async fn list(db: Db) -> ApiResult<UsersResponse> {
    let users = db.run(select_users).await?;
    Ok(Json(UsersResponse { users }))
}

#[get("/users/<username>")]
pub async fn get(db: Db, username: String) -> ApiResult<UserResponse> {
    let user = db
        .run(move |store| select_user_by_username(store, &username))
        .await?;
    Ok(Json(UserResponse { user }))
}
