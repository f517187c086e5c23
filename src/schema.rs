table! {
    blogs (id) {
        id -> Int4,
        user_id -> Varchar,
        title -> Varchar,
        excerpt -> Varchar,
        content -> Text,
        cover_image -> Nullable<Varchar>,
        published -> Bool,
        created_at -> Timestamp,
    }
}

table! {
    comments (id) {
        id -> Int4,
        blog_id -> Int4,
        user_id -> Varchar,
        content -> Text,
        created_at -> Timestamp,
    }
}

table! {
    likes (id) {
        id -> Int4,
        blog_id -> Int4,
        user_id -> Varchar,
    }
}

table! {
    profiles (user_id) {
        user_id -> Varchar,
        username -> Varchar,
        bio -> Nullable<Text>,
        avatar_url -> Nullable<Varchar>,
    }
}

table! {
    users (id) {
        id -> Varchar,
        email -> Varchar,
        pass -> Varchar,
    }
}

joinable!(comments -> blogs (blog_id));
joinable!(likes -> blogs (blog_id));

allow_tables_to_appear_in_same_query!(
    blogs,
    comments,
    likes,
    profiles,
    users,
);
