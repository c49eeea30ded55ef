use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Integer, Nullable, Text};
use diesel::{delete, insert_into, select, sql_query, update};

use super::schema::{articles, comments, topics, users};
use super::{ErrorKind, NewsStore, Pool, Result};
use crate::article::{Article, ArticleDetail, ArticleQuery, ArticleSummary};
use crate::comment::{Comment, NewComment};
use crate::topic::Topic;
use crate::users::models::User;

static SELECT_ARTICLE: &str = "SELECT a.article_id, a.title, a.topic, a.author, a.body,
       a.created_at, a.votes, a.article_img_url,
       COUNT(c.comment_id)::int AS comment_count
  FROM articles a
  LEFT JOIN comments c ON a.article_id = c.article_id
 WHERE a.article_id = $1
 GROUP BY a.article_id";

static SELECT_ARTICLES: &str = "SELECT a.article_id, a.title, a.topic, a.author,
       a.created_at, a.votes, a.article_img_url,
       COUNT(c.comment_id)::int AS comment_count
  FROM articles a
  LEFT JOIN comments c ON a.article_id = c.article_id
 WHERE ($1::varchar IS NULL OR a.topic = $1)
 GROUP BY a.article_id";

type PooledPg = PooledConnection<ConnectionManager<PgConnection>>;

// Postgres reports integer overflow (SQLSTATE 22003) without a dedicated
// diesel error kind, so it is recognised by its message.
fn out_of_range(e: DieselError) -> super::Error {
    match e {
        DieselError::DatabaseError(_, ref info) if info.message().contains("out of range") => {
            ErrorKind::OutOfRange(info.message().to_owned()).into()
        }
        other => other.into(),
    }
}

/// `NewsStore` over a pool of Postgres connections; each call checks out
/// one connection for the duration of its query.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> PgStore {
        PgStore { pool }
    }

    fn conn(&self) -> Result<PooledPg> {
        Ok(self.pool.get()?)
    }
}

impl NewsStore for PgStore {
    fn topics(&self) -> Result<Vec<Topic>> {
        let mut conn = self.conn()?;
        let rows = topics::table
            .order(topics::slug.asc())
            .load::<Topic>(&mut conn)?;
        Ok(rows)
    }

    fn topic_exists(&self, slug: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let found = select(exists(topics::table.find(slug))).get_result::<bool>(&mut conn)?;
        Ok(found)
    }

    fn article(&self, article_id: i32) -> Result<Option<ArticleDetail>> {
        let mut conn = self.conn()?;
        let article = sql_query(SELECT_ARTICLE)
            .bind::<Integer, _>(article_id)
            .get_result::<ArticleDetail>(&mut conn)
            .optional()?;
        Ok(article)
    }

    fn article_exists(&self, article_id: i32) -> Result<bool> {
        let mut conn = self.conn()?;
        let found =
            select(exists(articles::table.find(article_id))).get_result::<bool>(&mut conn)?;
        Ok(found)
    }

    fn articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleSummary>> {
        let mut conn = self.conn()?;
        // Column and direction come from closed enums, never from raw input.
        let sql = format!(
            "{} ORDER BY {} {dir}, a.article_id {dir}",
            SELECT_ARTICLES,
            query.sort_by.column(),
            dir = query.order.keyword()
        );
        tracing::debug!(topic = ?query.topic, sort_by = ?query.sort_by, order = ?query.order, "listing articles");
        let rows = sql_query(sql)
            .bind::<Nullable<Text>, _>(query.topic.clone())
            .load::<ArticleSummary>(&mut conn)?;
        Ok(rows)
    }

    fn add_article_votes(&self, article_id: i32, inc_votes: i32) -> Result<Option<Article>> {
        let mut conn = self.conn()?;
        update(articles::table.find(article_id))
            .set(articles::votes.eq(articles::votes + inc_votes))
            .get_result::<Article>(&mut conn)
            .optional()
            .map_err(out_of_range)
    }

    fn comments_for_article(&self, article_id: i32) -> Result<Vec<Comment>> {
        let mut conn = self.conn()?;
        let rows = comments::table
            .filter(comments::article_id.eq(article_id))
            .order((comments::created_at.desc(), comments::comment_id.desc()))
            .load::<Comment>(&mut conn)?;
        Ok(rows)
    }

    fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        let mut conn = self.conn()?;
        insert_into(comments::table)
            .values(comment)
            .get_result::<Comment>(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                    ErrorKind::ForeignKeyViolation(info.message().to_owned()).into()
                }
                other => other.into(),
            })
    }

    fn add_comment_votes(&self, comment_id: i32, inc_votes: i32) -> Result<Option<Comment>> {
        let mut conn = self.conn()?;
        update(comments::table.find(comment_id))
            .set(comments::votes.eq(comments::votes + inc_votes))
            .get_result::<Comment>(&mut conn)
            .optional()
            .map_err(out_of_range)
    }

    fn delete_comment(&self, comment_id: i32) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = delete(comments::table.find(comment_id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn users(&self) -> Result<Vec<User>> {
        let mut conn = self.conn()?;
        let rows = users::table
            .order(users::username.asc())
            .load::<User>(&mut conn)?;
        Ok(rows)
    }

    fn user(&self, username: &str) -> Result<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .find(username)
            .first::<User>(&mut conn)
            .optional()?;
        Ok(user)
    }
}
