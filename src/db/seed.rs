use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::{insert_into, sql_query};
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;

use super::schema::{articles, comments, topics, users};
use super::{Error, Result, ResultExt};
use crate::topic::Topic;
use crate::users::models::User;

pub const DEFAULT_ARTICLE_IMG_URL: &str =
    "https://images.pexels.com/photos/97050/pexels-photo-97050.jpeg?w=700&h=700";

fn default_article_img_url() -> String {
    DEFAULT_ARTICLE_IMG_URL.to_owned()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Insertable)]
#[diesel(table_name = articles)]
pub struct ArticleSeed {
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub votes: i32,
    #[serde(default = "default_article_img_url")]
    pub article_img_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Insertable)]
#[diesel(table_name = comments)]
pub struct CommentSeed {
    pub article_id: i32,
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub votes: i32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Fixture rows for every table. Articles take ids 1..=n in file order, and
/// comments refer to them by that position.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedData {
    pub topics: Vec<Topic>,
    pub users: Vec<User>,
    pub articles: Vec<ArticleSeed>,
    pub comments: Vec<CommentSeed>,
}

impl SeedData {
    /// Reads `topics.json`, `users.json`, `articles.json` and
    /// `comments.json` from `dir`.
    pub fn load(dir: &Path) -> Result<SeedData> {
        Ok(SeedData {
            topics: read_fixture(&dir.join("topics.json"))?,
            users: read_fixture(&dir.join("users.json"))?,
            articles: read_fixture(&dir.join("articles.json"))?,
            comments: read_fixture(&dir.join("comments.json"))?,
        })
    }

    /// The fixture set under `data/test`, compiled into the binary.
    pub fn test_data() -> Result<SeedData> {
        Ok(SeedData {
            topics: serde_json::from_str(include_str!("../../data/test/topics.json"))?,
            users: serde_json::from_str(include_str!("../../data/test/users.json"))?,
            articles: serde_json::from_str(include_str!("../../data/test/articles.json"))?,
            comments: serde_json::from_str(include_str!("../../data/test/comments.json"))?,
        })
    }
}

fn read_fixture<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .chain_err(|| format!("could not read fixture {}", path.display()))?;
    let rows = serde_json::from_str(&raw)
        .chain_err(|| format!("could not parse fixture {}", path.display()))?;
    Ok(rows)
}

/// Replaces the contents of every table with `data`, restarting the id
/// sequences so that article and comment ids follow fixture order.
pub fn seed(conn: &mut PgConnection, data: &SeedData) -> Result<()> {
    conn.transaction::<_, Error, _>(|conn| {
        sql_query("TRUNCATE comments, articles, users, topics RESTART IDENTITY CASCADE")
            .execute(conn)?;
        insert_into(topics::table)
            .values(&data.topics)
            .execute(conn)?;
        insert_into(users::table).values(&data.users).execute(conn)?;
        insert_into(articles::table)
            .values(&data.articles)
            .execute(conn)?;
        insert_into(comments::table)
            .values(&data.comments)
            .execute(conn)?;
        Ok(())
    })?;
    tracing::info!(
        topics = data.topics.len(),
        users = data.users.len(),
        articles = data.articles.len(),
        comments = data.comments.len(),
        "database seeded"
    );
    Ok(())
}
