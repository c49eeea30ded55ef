use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::seed::SeedData;
use super::{ErrorKind, NewsStore, Result};
use crate::article::{Article, ArticleDetail, ArticleQuery, ArticleSummary, Order, SortBy};
use crate::comment::{Comment, NewComment};
use crate::topic::Topic;
use crate::users::models::User;

#[derive(Debug, Default)]
struct Tables {
    topics: Vec<Topic>,
    users: Vec<User>,
    articles: Vec<Article>,
    comments: Vec<Comment>,
    next_article_id: i32,
    next_comment_id: i32,
}

impl Tables {
    fn comment_count(&self, article_id: i32) -> i32 {
        self.comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .count() as i32
    }

    fn summary(&self, article: &Article) -> ArticleSummary {
        ArticleSummary {
            article_id: article.article_id,
            title: article.title.clone(),
            topic: article.topic.clone(),
            author: article.author.clone(),
            created_at: article.created_at,
            votes: article.votes,
            article_img_url: article.article_img_url.clone(),
            comment_count: self.comment_count(article.article_id),
        }
    }
}

/// `NewsStore` kept entirely in process memory, with the same ordering,
/// id assignment and reference checks as the Postgres tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn seeded(data: &SeedData) -> MemoryStore {
        let mut tables = Tables {
            topics: data.topics.clone(),
            users: data.users.clone(),
            ..Tables::default()
        };
        for (id, seed) in (1..).zip(&data.articles) {
            tables.articles.push(Article {
                article_id: id,
                title: seed.title.clone(),
                topic: seed.topic.clone(),
                author: seed.author.clone(),
                body: seed.body.clone(),
                created_at: seed.created_at,
                votes: seed.votes,
                article_img_url: seed.article_img_url.clone(),
            });
            tables.next_article_id = id;
        }
        for (id, seed) in (1..).zip(&data.comments) {
            tables.comments.push(Comment {
                comment_id: id,
                article_id: seed.article_id,
                author: seed.author.clone(),
                body: seed.body.clone(),
                votes: seed.votes,
                created_at: seed.created_at,
            });
            tables.next_comment_id = id;
        }
        MemoryStore {
            tables: Mutex::new(tables),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| "memory store lock poisoned".into())
    }
}

/// Votes are an `integer` column, so a total outside `i32` fails the same way
/// the Postgres update does and leaves the row unchanged.
fn add_votes(votes: i32, inc_votes: i32) -> Result<i32> {
    votes
        .checked_add(inc_votes)
        .ok_or_else(|| ErrorKind::OutOfRange(format!("votes {} + {}", votes, inc_votes)).into())
}

fn compare(a: &ArticleSummary, b: &ArticleSummary, sort_by: SortBy) -> Ordering {
    let by_column = match sort_by {
        SortBy::ArticleId => Ordering::Equal,
        SortBy::Title => a.title.cmp(&b.title),
        SortBy::Topic => a.topic.cmp(&b.topic),
        SortBy::Author => a.author.cmp(&b.author),
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        SortBy::Votes => a.votes.cmp(&b.votes),
        SortBy::ArticleImgUrl => a.article_img_url.cmp(&b.article_img_url),
        SortBy::CommentCount => a.comment_count.cmp(&b.comment_count),
    };
    by_column.then(a.article_id.cmp(&b.article_id))
}

impl NewsStore for MemoryStore {
    fn topics(&self) -> Result<Vec<Topic>> {
        let mut topics = self.tables()?.topics.clone();
        topics.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(topics)
    }

    fn topic_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.tables()?.topics.iter().any(|t| t.slug == slug))
    }

    fn article(&self, article_id: i32) -> Result<Option<ArticleDetail>> {
        let tables = self.tables()?;
        let article = tables
            .articles
            .iter()
            .find(|a| a.article_id == article_id)
            .map(|a| ArticleDetail {
                article_id: a.article_id,
                title: a.title.clone(),
                topic: a.topic.clone(),
                author: a.author.clone(),
                body: a.body.clone(),
                created_at: a.created_at,
                votes: a.votes,
                article_img_url: a.article_img_url.clone(),
                comment_count: tables.comment_count(a.article_id),
            });
        Ok(article)
    }

    fn article_exists(&self, article_id: i32) -> Result<bool> {
        Ok(self
            .tables()?
            .articles
            .iter()
            .any(|a| a.article_id == article_id))
    }

    fn articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleSummary>> {
        let tables = self.tables()?;
        let mut rows: Vec<ArticleSummary> = tables
            .articles
            .iter()
            .filter(|a| query.topic.as_ref().map_or(true, |t| &a.topic == t))
            .map(|a| tables.summary(a))
            .collect();
        rows.sort_by(|a, b| match query.order {
            Order::Asc => compare(a, b, query.sort_by),
            Order::Desc => compare(b, a, query.sort_by),
        });
        Ok(rows)
    }

    fn add_article_votes(&self, article_id: i32, inc_votes: i32) -> Result<Option<Article>> {
        let mut tables = self.tables()?;
        match tables.articles.iter_mut().find(|a| a.article_id == article_id) {
            Some(a) => {
                a.votes = add_votes(a.votes, inc_votes)?;
                Ok(Some(a.clone()))
            }
            None => Ok(None),
        }
    }

    fn comments_for_article(&self, article_id: i32) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .tables()?
            .comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.comment_id.cmp(&a.comment_id))
        });
        Ok(comments)
    }

    fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        let mut tables = self.tables()?;
        if !tables
            .articles
            .iter()
            .any(|a| a.article_id == comment.article_id)
        {
            return Err(
                ErrorKind::ForeignKeyViolation(format!("article {}", comment.article_id)).into(),
            );
        }
        if !tables.users.iter().any(|u| u.username == comment.author) {
            return Err(ErrorKind::ForeignKeyViolation(format!("user {}", comment.author)).into());
        }

        tables.next_comment_id += 1;
        let inserted = Comment {
            comment_id: tables.next_comment_id,
            article_id: comment.article_id,
            author: comment.author.clone(),
            body: comment.body.clone(),
            votes: 0,
            created_at: Utc::now(),
        };
        tables.comments.push(inserted.clone());
        Ok(inserted)
    }

    fn add_comment_votes(&self, comment_id: i32, inc_votes: i32) -> Result<Option<Comment>> {
        let mut tables = self.tables()?;
        match tables.comments.iter_mut().find(|c| c.comment_id == comment_id) {
            Some(c) => {
                c.votes = add_votes(c.votes, inc_votes)?;
                Ok(Some(c.clone()))
            }
            None => Ok(None),
        }
    }

    fn delete_comment(&self, comment_id: i32) -> Result<bool> {
        let mut tables = self.tables()?;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.comment_id != comment_id);
        Ok(tables.comments.len() < before)
    }

    fn users(&self) -> Result<Vec<User>> {
        let mut users = self.tables()?.users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    fn user(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .tables()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}
