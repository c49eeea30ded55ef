use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text, Timestamptz};
use rocket::serde::json::{self, Json};
use rocket::{get, patch};
use serde_derive::Serialize;

use crate::db::schema::articles;
use crate::db::{Db, NewsStore};
use crate::types::{ApiError, ApiResult, ValidationError, VotesUpdate};
use crate::utils::{parse_id, serialize_date};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = articles)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
    pub votes: i32,
    pub article_img_url: String,
}

/// A single article together with the number of comments posted on it.
#[derive(Debug, Clone, PartialEq, QueryableByName, Serialize)]
pub struct ArticleDetail {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Text)]
    pub body: String,
    #[diesel(sql_type = Timestamptz)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Text)]
    pub article_img_url: String,
    #[diesel(sql_type = Integer)]
    pub comment_count: i32,
}

/// Listing row: every article column but the body, plus the comment count.
#[derive(Debug, Clone, PartialEq, QueryableByName, Serialize)]
pub struct ArticleSummary {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Timestamptz)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Text)]
    pub article_img_url: String,
    #[diesel(sql_type = Integer)]
    pub comment_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    ArticleId,
    Title,
    Topic,
    Author,
    #[default]
    CreatedAt,
    Votes,
    ArticleImgUrl,
    CommentCount,
}

impl SortBy {
    /// Column expression used in the listing query's ORDER BY.
    pub fn column(self) -> &'static str {
        match self {
            SortBy::ArticleId => "a.article_id",
            SortBy::Title => "a.title",
            SortBy::Topic => "a.topic",
            SortBy::Author => "a.author",
            SortBy::CreatedAt => "a.created_at",
            SortBy::Votes => "a.votes",
            SortBy::ArticleImgUrl => "a.article_img_url",
            SortBy::CommentCount => "comment_count",
        }
    }
}

impl FromStr for SortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<SortBy, ValidationError> {
        match s {
            "article_id" => Ok(SortBy::ArticleId),
            "title" => Ok(SortBy::Title),
            "topic" => Ok(SortBy::Topic),
            "author" => Ok(SortBy::Author),
            "created_at" => Ok(SortBy::CreatedAt),
            "votes" => Ok(SortBy::Votes),
            "article_img_url" => Ok(SortBy::ArticleImgUrl),
            "comment_count" => Ok(SortBy::CommentCount),
            other => Err(ValidationError::from(
                "sort_by",
                format!("unknown column: {}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl FromStr for Order {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Order, ValidationError> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            _ => Err(ValidationError::from("order", format!("unknown order: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleQuery {
    pub topic: Option<String>,
    pub sort_by: SortBy,
    pub order: Order,
}

impl ArticleQuery {
    pub fn parse(
        topic: Option<String>,
        sort_by: Option<&str>,
        order: Option<&str>,
    ) -> Result<ArticleQuery, ValidationError> {
        let sort_by = sort_by.map(str::parse::<SortBy>).transpose()?.unwrap_or_default();
        let order = order.map(str::parse::<Order>).transpose()?.unwrap_or_default();
        Ok(ArticleQuery {
            topic,
            sort_by,
            order,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse<T> {
    article: T,
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    articles: Vec<ArticleSummary>,
}

pub fn select_article_by_id(
    store: &dyn NewsStore,
    article_id: i32,
) -> Result<ArticleDetail, ApiError> {
    store
        .article(article_id)?
        .ok_or_else(|| ApiError::not_found("page not found"))
}

/// Lists articles. A topic filter must name an existing topic, so an unknown
/// topic is distinguished from a known one without articles.
pub fn select_articles(
    store: &dyn NewsStore,
    query: &ArticleQuery,
) -> Result<Vec<ArticleSummary>, ApiError> {
    if let Some(topic) = &query.topic {
        if !store.topic_exists(topic)? {
            return Err(ApiError::not_found("not found"));
        }
    }
    Ok(store.articles(query)?)
}

pub fn update_article_votes(
    store: &dyn NewsStore,
    article_id: i32,
    inc_votes: i32,
) -> Result<Article, ApiError> {
    store
        .add_article_votes(article_id, inc_votes)?
        .ok_or_else(|| ApiError::not_found("not found"))
}

#[get("/articles/<article_id>")]
pub async fn get(db: Db, article_id: Result<i32, &str>) -> ApiResult<ArticleResponse<ArticleDetail>> {
    let article_id = parse_id("article_id", article_id)?;
    let article = db
        .run(move |store| select_article_by_id(store, article_id))
        .await?;
    Ok(Json(ArticleResponse { article }))
}

#[get("/articles?<topic>&<sort_by>&<order>")]
pub async fn list(
    db: Db,
    topic: Option<String>,
    sort_by: Option<&str>,
    order: Option<&str>,
) -> ApiResult<ArticlesResponse> {
    let query = ArticleQuery::parse(topic, sort_by, order)?;
    let articles = db.run(move |store| select_articles(store, &query)).await?;
    Ok(Json(ArticlesResponse { articles }))
}

#[patch("/articles/<article_id>", data = "<update>")]
pub async fn update(
    db: Db,
    article_id: Result<i32, &str>,
    update: Result<Json<VotesUpdate>, json::Error<'_>>,
) -> ApiResult<ArticleResponse<Article>> {
    let article_id = parse_id("article_id", article_id)?;
    let inc_votes = update
        .map_err(|e| ValidationError::from("inc_votes", e.to_string()))?
        .into_inner()
        .inc_votes;
    let article = db
        .run(move |store| update_article_votes(store, article_id, inc_votes))
        .await?;
    Ok(Json(ArticleResponse { article }))
}
