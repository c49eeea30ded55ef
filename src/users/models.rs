use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};

use crate::db::schema::users;

#[derive(Debug, Clone, PartialEq, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = users)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
}
