use diesel::prelude::*;
use rocket::get;
use rocket::serde::json::Json;
use serde_derive::{Deserialize, Serialize};

use crate::db::schema::topics;
use crate::db::{Db, NewsStore};
use crate::types::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = topics)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    topics: Vec<Topic>,
}

pub fn select_topics(store: &dyn NewsStore) -> Result<Vec<Topic>, ApiError> {
    Ok(store.topics()?)
}

#[get("/topics")]
pub async fn list(db: Db) -> ApiResult<TopicsResponse> {
    let topics = db.run(select_topics).await?;
    Ok(Json(TopicsResponse { topics }))
}
