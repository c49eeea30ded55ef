use std::borrow::Cow;
use std::collections::HashMap;

use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::{json, Json};
use serde_derive::{Deserialize, Serialize};

use crate::db;
use crate::utils::try_respond;

pub trait Validate
where
    Self: Sized,
{
    fn validate(self) -> Result<Self, ValidationError>;
}

#[derive(Debug)]
pub enum ApiError {
    /// Malformed identifier, body or query value.
    Validation(ValidationError),
    /// Well-formed identifier with no matching row.
    NotFound(Cow<'static, str>),
    Internal(String),
}

impl ApiError {
    pub fn not_found<M: Into<Cow<'static, str>>>(msg: M) -> ApiError {
        ApiError::NotFound(msg.into())
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn msg(&self) -> &str {
        match self {
            ApiError::Validation(_) => "bad request",
            ApiError::NotFound(msg) => msg,
            ApiError::Internal(_) => "internal server error",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> ApiError {
        ApiError::Validation(err)
    }
}

impl From<db::Error> for ApiError {
    fn from(err: db::Error) -> ApiError {
        match err.kind() {
            db::ErrorKind::ForeignKeyViolation(detail) => {
                ApiError::Validation(ValidationError::from("reference", detail.clone()))
            }
            db::ErrorKind::OutOfRange(detail) => {
                ApiError::Validation(ValidationError::from("inc_votes", detail.clone()))
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct ValidationError(HashMap<String, Vec<String>>);

impl ValidationError {
    pub fn add_error<K: Into<String>, V: Into<String>>(&mut self, key: K, val: V) {
        self.0.entry(key.into()).or_default().push(val.into());
    }

    pub fn from<K: Into<String>, V: Into<String>>(key: K, val: V) -> Self {
        let mut error = ValidationError::default();
        error.add_error(key, val);
        error
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match &self {
            ApiError::Internal(detail) => {
                tracing::error!(uri = %req.uri(), %detail, "request failed")
            }
            ApiError::Validation(errors) => {
                tracing::debug!(uri = %req.uri(), ?errors, "rejected request")
            }
            ApiError::NotFound(msg) => tracing::debug!(uri = %req.uri(), %msg, "no matching row"),
        }
        try_respond(req, json!({ "msg": self.msg() }), self.status())
    }
}

impl<T> Validate for Json<T>
where
    T: Validate,
{
    fn validate(self) -> Result<Self, ValidationError> {
        let validated = self.into_inner().validate()?;
        Ok(Json(validated))
    }
}

/// `{inc_votes}` body shared by the article and comment vote endpoints.
#[derive(Debug, Deserialize)]
pub struct VotesUpdate {
    pub inc_votes: i32,
}
