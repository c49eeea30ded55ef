use chrono::{DateTime, SecondsFormat, Utc};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::{Json, Value};
use serde::Serializer;

use crate::types::ValidationError;

pub fn try_respond(req: &Request<'_>, json: Value, status: Status) -> response::Result<'static> {
    Response::build_from(Json(json).respond_to(req)?)
        .status(status)
        .ok()
}

pub fn serialize_date<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = date.to_rfc3339_opts(SecondsFormat::Millis, true);
    serializer.serialize_str(&s)
}

/// Turns a path segment that failed to parse as an integer into a validation
/// error naming the parameter.
pub fn parse_id(name: &str, raw: Result<i32, &str>) -> Result<i32, ValidationError> {
    raw.map_err(|segment| ValidationError::from(name, format!("not an integer: {}", segment)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_derive::Serialize;

    #[derive(Serialize)]
    struct Stamped {
        #[serde(serialize_with = "serialize_date")]
        created_at: DateTime<Utc>,
    }

    #[test]
    fn dates_serialize_as_utc_millis() {
        let stamped = Stamped {
            created_at: Utc.timestamp_millis_opt(1594329060000).unwrap(),
        };
        let json = serde_json::to_string(&stamped).unwrap();
        assert_eq!(json, r#"{"created_at":"2020-07-09T21:11:00.000Z"}"#);
    }

    #[test]
    fn unparsable_ids_name_the_parameter() {
        assert_eq!(parse_id("article_id", Ok(3)), Ok(3));
        let err = parse_id("article_id", Err("banana")).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["article_id"]);
    }
}
