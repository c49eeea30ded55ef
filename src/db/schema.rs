diesel::table! {
    articles (article_id) {
        article_id -> Int4,
        title -> Varchar,
        topic -> Varchar,
        author -> Varchar,
        body -> Text,
        created_at -> Timestamptz,
        votes -> Int4,
        article_img_url -> Varchar,
    }
}

diesel::table! {
    comments (comment_id) {
        comment_id -> Int4,
        article_id -> Int4,
        author -> Varchar,
        body -> Text,
        votes -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    topics (slug) {
        slug -> Varchar,
        description -> Varchar,
    }
}

diesel::table! {
    users (username) {
        username -> Varchar,
        name -> Varchar,
        avatar_url -> Varchar,
    }
}

diesel::joinable!(articles -> topics (topic));
diesel::joinable!(articles -> users (author));
diesel::joinable!(comments -> articles (article_id));
diesel::joinable!(comments -> users (author));

diesel::allow_tables_to_appear_in_same_query!(articles, comments, topics, users);
