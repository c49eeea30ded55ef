use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rocket::http::Status;
use rocket::serde::json::{self, Json};
use rocket::{delete, get, patch, post};
use serde_derive::{Deserialize, Serialize};

use crate::db::schema::comments;
use crate::db::{Db, NewsStore};
use crate::types::{ApiError, ApiResult, Validate, ValidationError, VotesUpdate};
use crate::utils::{parse_id, serialize_date};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub comment_id: i32,
    pub article_id: i32,
    pub author: String,
    pub body: String,
    pub votes: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub article_id: i32,
    pub author: String,
    pub body: String,
}

/// Body of `POST /api/articles/<article_id>/comments`.
#[derive(Debug, Deserialize)]
pub struct CommentDetails {
    pub username: String,
    pub body: String,
}

impl Validate for CommentDetails {
    fn validate(self) -> Result<Self, ValidationError> {
        let mut error = ValidationError::default();
        if self.username.trim().is_empty() {
            error.add_error("username", "empty username");
        }
        if self.body.trim().is_empty() {
            error.add_error("body", "empty body");
        }

        if error.empty() {
            Ok(self)
        } else {
            Err(error)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentContainer {
    comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct CommentsContainer {
    comments: Vec<Comment>,
}

pub fn select_comments_by_article(
    store: &dyn NewsStore,
    article_id: i32,
) -> Result<Vec<Comment>, ApiError> {
    if !store.article_exists(article_id)? {
        return Err(ApiError::not_found("page not found"));
    }
    Ok(store.comments_for_article(article_id)?)
}

pub fn insert_comment(
    store: &dyn NewsStore,
    article_id: i32,
    details: CommentDetails,
) -> Result<Comment, ApiError> {
    let new_comment = NewComment {
        article_id,
        author: details.username,
        body: details.body,
    };
    Ok(store.insert_comment(&new_comment)?)
}

pub fn update_comment_votes(
    store: &dyn NewsStore,
    comment_id: i32,
    inc_votes: i32,
) -> Result<Comment, ApiError> {
    store
        .add_comment_votes(comment_id, inc_votes)?
        .ok_or_else(|| ApiError::not_found("not found"))
}

pub fn remove_comment(store: &dyn NewsStore, comment_id: i32) -> Result<(), ApiError> {
    if store.delete_comment(comment_id)? {
        Ok(())
    } else {
        Err(ApiError::not_found("not found"))
    }
}

#[get("/articles/<article_id>/comments")]
pub async fn list(db: Db, article_id: Result<i32, &str>) -> ApiResult<CommentsContainer> {
    let article_id = parse_id("article_id", article_id)?;
    let comments = db
        .run(move |store| select_comments_by_article(store, article_id))
        .await?;
    Ok(Json(CommentsContainer { comments }))
}

#[post("/articles/<article_id>/comments", data = "<details>")]
pub async fn add(
    db: Db,
    article_id: Result<i32, &str>,
    details: Result<Json<CommentDetails>, json::Error<'_>>,
) -> Result<(Status, Json<CommentContainer>), ApiError> {
    let article_id = parse_id("article_id", article_id)?;
    let details = details
        .map_err(|e| ValidationError::from("comment", e.to_string()))?
        .validate()?
        .into_inner();
    let comment = db
        .run(move |store| insert_comment(store, article_id, details))
        .await?;
    tracing::info!(comment_id = comment.comment_id, article_id, "comment posted");
    Ok((Status::Created, Json(CommentContainer { comment })))
}

#[patch("/comments/<comment_id>", data = "<update>")]
pub async fn update(
    db: Db,
    comment_id: Result<i32, &str>,
    update: Result<Json<VotesUpdate>, json::Error<'_>>,
) -> ApiResult<CommentContainer> {
    let comment_id = parse_id("comment_id", comment_id)?;
    let inc_votes = update
        .map_err(|e| ValidationError::from("inc_votes", e.to_string()))?
        .into_inner()
        .inc_votes;
    let comment = db
        .run(move |store| update_comment_votes(store, comment_id, inc_votes))
        .await?;
    Ok(Json(CommentContainer { comment }))
}

#[delete("/comments/<comment_id>")]
pub async fn delete(db: Db, comment_id: Result<i32, &str>) -> Result<Status, ApiError> {
    let comment_id = parse_id("comment_id", comment_id)?;
    db.run(move |store| remove_comment(store, comment_id))
        .await?;
    tracing::info!(comment_id, "comment deleted");
    Ok(Status::NoContent)
}
