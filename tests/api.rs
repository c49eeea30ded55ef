use nc_news::article::{Article, ArticleDetail, ArticleQuery, ArticleSummary};
use nc_news::comment::{Comment, NewComment};
use nc_news::db::seed::SeedData;
use nc_news::db::{self, Db, MemoryStore, NewsStore};
use nc_news::topic::Topic;
use nc_news::users::models::User;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::{Client, LocalResponse};
use rocket::serde::json::{json, Value};

fn client() -> Client {
    let data = SeedData::test_data().expect("test fixtures parse");
    let rocket = nc_news::build(
        rocket::Config::figment(),
        Db::new(MemoryStore::seeded(&data)),
    );
    Client::tracked(rocket).expect("valid rocket instance")
}

/// A store whose every query fails, as when the database is unreachable.
struct BrokenStore;

impl NewsStore for BrokenStore {
    fn topics(&self) -> db::Result<Vec<Topic>> {
        Err("connection refused".into())
    }
    fn topic_exists(&self, _: &str) -> db::Result<bool> {
        Err("connection refused".into())
    }
    fn article(&self, _: i32) -> db::Result<Option<ArticleDetail>> {
        Err("connection refused".into())
    }
    fn article_exists(&self, _: i32) -> db::Result<bool> {
        Err("connection refused".into())
    }
    fn articles(&self, _: &ArticleQuery) -> db::Result<Vec<ArticleSummary>> {
        Err("connection refused".into())
    }
    fn add_article_votes(&self, _: i32, _: i32) -> db::Result<Option<Article>> {
        Err("connection refused".into())
    }
    fn comments_for_article(&self, _: i32) -> db::Result<Vec<Comment>> {
        Err("connection refused".into())
    }
    fn insert_comment(&self, _: &NewComment) -> db::Result<Comment> {
        Err("connection refused".into())
    }
    fn add_comment_votes(&self, _: i32, _: i32) -> db::Result<Option<Comment>> {
        Err("connection refused".into())
    }
    fn delete_comment(&self, _: i32) -> db::Result<bool> {
        Err("connection refused".into())
    }
    fn users(&self) -> db::Result<Vec<User>> {
        Err("connection refused".into())
    }
    fn user(&self, _: &str) -> db::Result<Option<User>> {
        Err("connection refused".into())
    }
}

fn body(response: LocalResponse<'_>) -> Value {
    response.into_json::<Value>().expect("json body")
}

fn timestamps(rows: &[Value]) -> Vec<String> {
    rows.iter()
        .map(|row| row["created_at"].as_str().unwrap().to_owned())
        .collect()
}

fn is_sorted_desc(values: &[String]) -> bool {
    values.windows(2).all(|w| w[0] >= w[1])
}

#[test]
fn get_topics() {
    let client = client();
    let response = client.get("/api/topics").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let topics = body(response)["topics"].as_array().unwrap().clone();
    assert_eq!(topics.len(), 3);
    for topic in &topics {
        assert!(topic["slug"].is_string());
        assert!(topic["description"].is_string());
    }
}

#[test]
fn get_endpoints() {
    let client = client();
    let response = client.get("/api").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let endpoints = body(response)["endpoints"].clone();
    assert!(endpoints["GET /api/topics"]["description"].is_string());
    assert!(endpoints["GET /api/articles"]["queries"].is_array());
}

#[test]
fn unknown_path_is_404() {
    let client = client();
    let response = client.get("/api/not-a-route").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "path not found" }));

    let response = client.get("/api/articles/1/nonsense").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "path not found" }));
}

#[test]
fn get_article_by_id() {
    let client = client();
    let response = client.get("/api/articles/1").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        body(response)["article"],
        json!({
            "article_id": 1,
            "title": "Living in the shadow of a great man",
            "topic": "mitch",
            "author": "butter_bridge",
            "body": "I find this existence challenging",
            "created_at": "2020-07-09T21:11:00.000Z",
            "votes": 100,
            "article_img_url": "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700",
            "comment_count": 11
        })
    );
}

#[test]
fn get_article_without_comments_counts_zero() {
    let client = client();
    let response = client.get("/api/articles/2").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response)["article"]["comment_count"], 0);
}

#[test]
fn get_missing_article_is_404() {
    let client = client();
    let response = client.get("/api/articles/999").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "page not found" }));
}

#[test]
fn get_article_with_non_numeric_id_is_400() {
    let client = client();
    let response = client.get("/api/articles/banana").dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response), json!({ "msg": "bad request" }));
}

#[test]
fn get_articles_newest_first_with_counts() {
    let client = client();
    let response = client.get("/api/articles").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let articles = body(response)["articles"].as_array().unwrap().clone();
    assert_eq!(articles.len(), 13);
    assert!(is_sorted_desc(&timestamps(&articles)));
    assert_eq!(articles[0]["article_id"], 3);
    for article in &articles {
        assert!(article.get("body").is_none());
        assert!(article["comment_count"].is_i64());
    }
    let first = articles.iter().find(|a| a["article_id"] == 1).unwrap();
    assert_eq!(first["comment_count"], 11);
}

#[test]
fn get_articles_filtered_by_topic() {
    let client = client();
    let response = client.get("/api/articles?topic=cats").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let articles = body(response)["articles"].as_array().unwrap().clone();
    assert_eq!(articles.len(), 1);
    assert!(articles.iter().all(|a| a["topic"] == "cats"));

    let response = client.get("/api/articles?topic=mitch").dispatch();
    let articles = body(response)["articles"].as_array().unwrap().clone();
    assert_eq!(articles.len(), 12);
    assert!(articles.iter().all(|a| a["topic"] == "mitch"));
}

#[test]
fn get_articles_for_topic_without_articles_is_empty() {
    let client = client();
    let response = client.get("/api/articles?topic=paper").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response), json!({ "articles": [] }));
}

#[test]
fn get_articles_for_unknown_topic_is_404() {
    let client = client();
    let response = client.get("/api/articles?topic=dogs").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "not found" }));
}

#[test]
fn get_articles_sorted_by_votes_ascending() {
    let client = client();
    let response = client
        .get("/api/articles?sort_by=votes&order=asc")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let articles = body(response)["articles"].as_array().unwrap().clone();
    assert_eq!(articles[0]["article_id"], 2);
    assert_eq!(articles[12]["article_id"], 1);
}

#[test]
fn get_articles_sorted_by_comment_count() {
    let client = client();
    let response = client.get("/api/articles?sort_by=comment_count").dispatch();
    let articles = body(response)["articles"].as_array().unwrap().clone();
    let counts: Vec<i64> = articles
        .iter()
        .map(|a| a["comment_count"].as_i64().unwrap())
        .collect();
    assert_eq!(counts[0], 11);
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn get_articles_with_invalid_sort_is_400() {
    let client = client();
    for uri in &[
        "/api/articles?sort_by=banana",
        "/api/articles?sort_by=body",
        "/api/articles?order=sideways",
    ] {
        let response = client.get(*uri).dispatch();
        assert_eq!(response.status(), Status::BadRequest, "{}", uri);
        assert_eq!(body(response), json!({ "msg": "bad request" }));
    }
}

#[test]
fn patch_article_votes_accumulates() {
    let client = client();
    let patch = || {
        client
            .patch("/api/articles/2")
            .header(ContentType::JSON)
            .body(json!({ "inc_votes": 2 }).to_string())
            .dispatch()
    };

    let response = patch();
    assert_eq!(response.status(), Status::Ok);
    let article = body(response)["article"].clone();
    assert_eq!(article["article_id"], 2);
    assert_eq!(article["votes"], 2);
    assert_eq!(article["title"], "Sony Vaio; or, The Laptop");

    let response = patch();
    assert_eq!(body(response)["article"]["votes"], 4);
}

#[test]
fn patch_article_votes_can_decrement() {
    let client = client();
    let response = client
        .patch("/api/articles/1")
        .header(ContentType::JSON)
        .body(json!({ "inc_votes": -150 }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response)["article"]["votes"], -50);
}

#[test]
fn patch_missing_article_is_404() {
    let client = client();
    let response = client
        .patch("/api/articles/999")
        .header(ContentType::JSON)
        .body(json!({ "inc_votes": 1 }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "not found" }));
}

#[test]
fn patch_article_with_bad_input_is_400() {
    let client = client();
    let cases = vec![
        ("/api/articles/banana", json!({ "inc_votes": 1 }).to_string()),
        ("/api/articles/1", json!({ "inc_votes": "cat" }).to_string()),
        ("/api/articles/1", json!({}).to_string()),
        ("/api/articles/1", "not json".to_owned()),
    ];
    for (uri, payload) in cases {
        let response = client
            .patch(uri)
            .header(ContentType::JSON)
            .body(payload.clone())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest, "{} {}", uri, payload);
        assert_eq!(body(response), json!({ "msg": "bad request" }));
    }
}

#[test]
fn patch_article_vote_overflow_is_400_and_store_keeps_serving() {
    let client = client();
    let response = client
        .patch("/api/articles/1")
        .header(ContentType::JSON)
        .body(json!({ "inc_votes": i32::MAX }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response), json!({ "msg": "bad request" }));

    let response = client.get("/api/articles/1").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response)["article"]["votes"], 100);

    let response = client.get("/api/articles/2").dispatch();
    assert_eq!(response.status(), Status::Ok);
}

#[test]
fn get_article_comments_newest_first() {
    let client = client();
    let response = client.get("/api/articles/1/comments").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let comments = body(response)["comments"].as_array().unwrap().clone();
    assert_eq!(comments.len(), 11);
    assert!(is_sorted_desc(&timestamps(&comments)));
    assert_eq!(
        comments[0],
        json!({
            "comment_id": 5,
            "article_id": 1,
            "author": "icellusedkars",
            "body": "I hate streaming noses",
            "votes": 0,
            "created_at": "2020-11-03T21:00:00.000Z"
        })
    );
}

#[test]
fn get_comments_for_article_without_comments_is_empty() {
    let client = client();
    let response = client.get("/api/articles/2/comments").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response), json!({ "comments": [] }));
}

#[test]
fn get_comments_for_bad_article_id() {
    let client = client();
    let response = client.get("/api/articles/999/comments").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "page not found" }));

    let response = client.get("/api/articles/banana/comments").dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response), json!({ "msg": "bad request" }));
}

#[test]
fn post_comment_adds_exactly_one() {
    let client = client();
    let response = client
        .post("/api/articles/1/comments")
        .header(ContentType::JSON)
        .body(json!({ "username": "lurker", "body": "Mitch is everywhere" }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Created);
    let comment = body(response)["comment"].clone();
    assert_eq!(comment["comment_id"], 19);
    assert_eq!(comment["article_id"], 1);
    assert_eq!(comment["author"], "lurker");
    assert_eq!(comment["body"], "Mitch is everywhere");
    assert_eq!(comment["votes"], 0);
    assert!(comment["created_at"].is_string());

    let response = client.get("/api/articles/1/comments").dispatch();
    let comments = body(response)["comments"].as_array().unwrap().clone();
    assert_eq!(comments.len(), 12);
    assert_eq!(comments[0]["comment_id"], 19);
}

#[test]
fn post_comment_with_bad_input_is_400() {
    let client = client();
    let cases = vec![
        ("/api/articles/1/comments", json!({ "username": "lurker" })),
        ("/api/articles/1/comments", json!({ "body": "no author" })),
        ("/api/articles/1/comments", json!({ "username": "lurker", "body": "   " })),
        ("/api/articles/1/comments", json!({ "username": "nobody", "body": "hi" })),
        ("/api/articles/999/comments", json!({ "username": "lurker", "body": "hi" })),
        ("/api/articles/banana/comments", json!({ "username": "lurker", "body": "hi" })),
    ];
    for (uri, payload) in cases {
        let response = client
            .post(uri)
            .header(ContentType::JSON)
            .body(payload.to_string())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest, "{} {}", uri, payload);
        assert_eq!(body(response), json!({ "msg": "bad request" }));
    }

    let response = client.get("/api/articles/1/comments").dispatch();
    assert_eq!(body(response)["comments"].as_array().unwrap().len(), 11);
}

#[test]
fn patch_comment_votes() {
    let client = client();
    let response = client
        .patch("/api/comments/1")
        .header(ContentType::JSON)
        .body(json!({ "inc_votes": 1 }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response)["comment"]["votes"], 17);

    let response = client
        .patch("/api/comments/999")
        .header(ContentType::JSON)
        .body(json!({ "inc_votes": 1 }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "not found" }));
}

#[test]
fn patch_comment_with_bad_input_is_400() {
    let client = client();
    let cases = vec![
        ("/api/comments/banana", json!({ "inc_votes": 1 }).to_string()),
        ("/api/comments/1", json!({ "inc_votes": "cat" }).to_string()),
        ("/api/comments/1", json!({}).to_string()),
        ("/api/comments/1", "not json".to_owned()),
        ("/api/comments/1", json!({ "inc_votes": i32::MAX }).to_string()),
    ];
    for (uri, payload) in cases {
        let response = client
            .patch(uri)
            .header(ContentType::JSON)
            .body(payload.clone())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest, "{} {}", uri, payload);
        assert_eq!(body(response), json!({ "msg": "bad request" }));
    }

    let response = client.get("/api/articles/9/comments").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let comments = body(response)["comments"].as_array().unwrap().clone();
    let first = comments.iter().find(|c| c["comment_id"] == 1).unwrap();
    assert_eq!(first["votes"], 16);
}

#[test]
fn delete_comment_then_delete_again() {
    let client = client();
    let response = client.delete("/api/comments/1").dispatch();
    assert_eq!(response.status(), Status::NoContent);
    assert!(response.into_string().unwrap_or_default().is_empty());

    let response = client.get("/api/articles/9/comments").dispatch();
    let comments = body(response)["comments"].as_array().unwrap().clone();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["comment_id"], 17);

    let response = client.delete("/api/comments/1").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "not found" }));
}

#[test]
fn delete_comment_with_non_numeric_id_is_400() {
    let client = client();
    let response = client.delete("/api/comments/banana").dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response), json!({ "msg": "bad request" }));
}

#[test]
fn get_users() {
    let client = client();
    let response = client.get("/api/users").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let users = body(response)["users"].as_array().unwrap().clone();
    assert_eq!(users.len(), 4);
    for user in &users {
        assert!(user["username"].is_string());
        assert!(user["name"].is_string());
        assert!(user["avatar_url"].is_string());
    }
}

#[test]
fn get_user_by_username() {
    let client = client();
    let response = client.get("/api/users/lurker").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        body(response)["user"],
        json!({
            "username": "lurker",
            "name": "do_nothing",
            "avatar_url": "https://www.golenbock.com/wp-content/uploads/2015/01/placeholder-user.png"
        })
    );

    let response = client.get("/api/users/nobody").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "user not found" }));
}

#[test]
fn store_failures_are_500_without_detail() {
    let client = Client::tracked(nc_news::build(
        rocket::Config::figment(),
        Db::new(BrokenStore),
    ))
    .expect("valid rocket instance");
    for uri in &["/api/topics", "/api/articles", "/api/articles/1", "/api/users"] {
        let response = client.get(*uri).dispatch();
        assert_eq!(response.status(), Status::InternalServerError, "{}", uri);
        assert_eq!(body(response), json!({ "msg": "internal server error" }));
    }

    let response = client.delete("/api/comments/1").dispatch();
    assert_eq!(response.status(), Status::InternalServerError);
    assert_eq!(body(response), json!({ "msg": "internal server error" }));
}
