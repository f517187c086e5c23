//! Behaviour every [Store] implementation has to show. The same checks run
//! against the in-memory store and, when `DATABASE_URL` points at a migrated
//! database, against Postgres (`cargo test -- --ignored`).

use sha256::digest;
use uuid::Uuid;

use crate::app::AppError;
use super::{
    db_utils::psql_connect_to_db,
    memory_store::MemoryStore,
    models::{blog::BlogFields, profile::ProfileChanges, user::User},
    pg_store::PgStore,
    store::Store,
};

fn account(store: &dyn Store, name: &str) -> String {
    let id = Uuid::new_v4().to_string();
    let user = User {
        id: id.clone(),
        email: format!("{}+{}@blogspace.test", name, id),
        pass: digest("password123".to_string()),
    };
    store.create_account(&user, name).unwrap();
    id
}

fn fields(title: &str, published: bool) -> BlogFields {
    BlogFields {
        title: title.to_string(),
        excerpt: format!("{} excerpt", title),
        content: format!("{} content", title),
        cover_image: None,
        published,
    }
}

fn check_published_filter(store: &dyn Store) {
    let author = account(store, "writer");
    let draft = store.create_blog(&author, &fields("Draft", false)).unwrap();
    let public = store.create_blog(&author, &fields("Public", true)).unwrap();

    let listed = store.fetch_published_blogs(100).unwrap();
    assert!(listed.iter().all(|b| b.published));
    assert!(listed.iter().any(|b| b.id == public.id));
    assert!(!listed.iter().any(|b| b.id == draft.id));

    let by_author = store.fetch_blogs_by_author(&author).unwrap();
    let ids: Vec<i32> = by_author.iter().map(|b| b.id).collect();
    pretty_assertions::assert_eq!(ids, vec![public.id]);
}

fn check_published_order_and_limit(store: &dyn Store) {
    let author = account(store, "prolific");
    let first = store.create_blog(&author, &fields("First", true)).unwrap();
    let second = store.create_blog(&author, &fields("Second", true)).unwrap();
    let third = store.create_blog(&author, &fields("Third", true)).unwrap();

    let latest = store.fetch_published_blogs(2).unwrap();
    let ids: Vec<i32> = latest.iter().map(|b| b.id).collect();
    pretty_assertions::assert_eq!(ids, vec![third.id, second.id]);

    let by_author: Vec<i32> = store.fetch_blogs_by_author(&author).unwrap().iter().map(|b| b.id).collect();
    pretty_assertions::assert_eq!(by_author, vec![third.id, second.id, first.id]);
}

fn check_like_toggle(store: &dyn Store) {
    let author = account(store, "liked");
    let reader = account(store, "reader");
    let blog = store.create_blog(&author, &fields("Likeable", true)).unwrap();

    let original = store.fetch_like_count(blog.id).unwrap();
    assert!(!store.fetch_is_liked(blog.id, &reader).unwrap());

    let state = store.toggle_like(blog.id, &reader).unwrap();
    assert!(state.liked);
    pretty_assertions::assert_eq!(state.like_count, original + 1);
    assert!(store.fetch_is_liked(blog.id, &reader).unwrap());

    let state = store.toggle_like(blog.id, &reader).unwrap();
    assert!(!state.liked);
    pretty_assertions::assert_eq!(state.like_count, original);
    pretty_assertions::assert_eq!(store.fetch_like_count(blog.id).unwrap(), original);
    assert!(!store.fetch_is_liked(blog.id, &reader).unwrap());

    pretty_assertions::assert_eq!(store.toggle_like(-1, &reader), Err(AppError::NotFound));
}

fn check_owner_only_mutations(store: &dyn Store) {
    let owner = account(store, "owner");
    let intruder = account(store, "intruder");
    let blog = store.create_blog(&owner, &fields("Mine", false)).unwrap();

    pretty_assertions::assert_eq!(
        store.update_blog(blog.id, &intruder, &fields("Stolen", true)),
        Err(AppError::Forbidden)
    );
    pretty_assertions::assert_eq!(store.delete_blog(blog.id, &intruder), Err(AppError::Forbidden));
    pretty_assertions::assert_eq!(store.fetch_blog(blog.id).unwrap().title, "Mine");

    let updated = store.update_blog(blog.id, &owner, &fields("Still mine", true)).unwrap();
    pretty_assertions::assert_eq!(updated.title, "Still mine");
    assert!(updated.published);

    let changes = ProfileChanges { username: Some("renamed".to_string()), bio: None };
    pretty_assertions::assert_eq!(store.update_profile(&owner, &intruder, &changes), Err(AppError::Forbidden));
    let profile = store.update_profile(&owner, &owner, &changes).unwrap();
    pretty_assertions::assert_eq!(profile.username, "renamed");
    pretty_assertions::assert_eq!(profile.bio, None);

    pretty_assertions::assert_eq!(store.update_blog(-1, &owner, &fields("Ghost", true)), Err(AppError::NotFound));
}

fn check_delete_cascades(store: &dyn Store) {
    let owner = account(store, "deleter");
    let reader = account(store, "commenter");
    let blog = store.create_blog(&owner, &fields("Short lived", true)).unwrap();
    store.post_comment(blog.id, &reader, "first").unwrap();
    store.toggle_like(blog.id, &reader).unwrap();

    store.delete_blog(blog.id, &owner).unwrap();

    pretty_assertions::assert_eq!(store.fetch_blog(blog.id), Err(AppError::NotFound));
    assert!(store.fetch_comments(blog.id).unwrap().is_empty());
    pretty_assertions::assert_eq!(store.fetch_like_count(blog.id).unwrap(), 0);
    pretty_assertions::assert_eq!(store.post_comment(blog.id, &reader, "late"), Err(AppError::NotFound));
}

fn check_batched_lookups(store: &dyn Store) {
    let author = account(store, "batched");
    let reader = account(store, "batch_reader");
    let busy = store.create_blog(&author, &fields("Busy", true)).unwrap();
    let quiet = store.create_blog(&author, &fields("Quiet", true)).unwrap();

    store.toggle_like(busy.id, &reader).unwrap();
    store.toggle_like(busy.id, &author).unwrap();
    store.post_comment(busy.id, &reader, "one").unwrap();
    let newest = store.post_comment(busy.id, &reader, "two").unwrap();

    let likes = store.fetch_like_counts(&[busy.id, quiet.id]).unwrap();
    pretty_assertions::assert_eq!(likes.get(&busy.id), Some(&2));
    pretty_assertions::assert_eq!(likes.get(&quiet.id), None);

    let comments = store.fetch_comment_counts(&[busy.id, quiet.id]).unwrap();
    pretty_assertions::assert_eq!(comments.get(&busy.id), Some(&2));

    pretty_assertions::assert_eq!(store.fetch_comments(busy.id).unwrap()[0].id, newest.id);

    let names = store.fetch_usernames(&[author.clone(), "nobody".to_string()]).unwrap();
    pretty_assertions::assert_eq!(names.get(&author).map(String::as_str), Some("batched"));
    assert!(!names.contains_key("nobody"));
}

fn check_drafts_hidden_from_strangers(store: &dyn Store) {
    let owner = account(store, "drafter");
    let stranger = account(store, "stranger");
    let draft = store.create_blog(&owner, &fields("Unfinished", false)).unwrap();

    pretty_assertions::assert_eq!(store.toggle_like(draft.id, &stranger), Err(AppError::NotFound));
    pretty_assertions::assert_eq!(store.post_comment(draft.id, &stranger, "hi"), Err(AppError::NotFound));
    pretty_assertions::assert_eq!(store.fetch_like_count(draft.id).unwrap(), 0);
    assert!(store.fetch_comments(draft.id).unwrap().is_empty());

    assert!(store.toggle_like(draft.id, &owner).unwrap().liked);
    store.post_comment(draft.id, &owner, "note to self").unwrap();
    pretty_assertions::assert_eq!(store.fetch_comments(draft.id).unwrap().len(), 1);
}

fn check_accounts(store: &dyn Store) {
    let id = account(store, "unique");
    let user = store.find_account_by_email(&format!("unique+{}@blogspace.test", id)).unwrap().unwrap();
    pretty_assertions::assert_eq!(user.id, id);
    pretty_assertions::assert_eq!(store.fetch_profile(&id).unwrap().username, "unique");

    let duplicate = User { id: Uuid::new_v4().to_string(), ..user };
    pretty_assertions::assert_eq!(
        store.create_account(&duplicate, "again"),
        Err(AppError::BadRequest("Already exists"))
    );
    pretty_assertions::assert_eq!(store.find_account_by_email("missing@blogspace.test").unwrap(), None);
}

fn check_all(store: &dyn Store) {
    check_published_filter(store);
    check_published_order_and_limit(store);
    check_like_toggle(store);
    check_owner_only_mutations(store);
    check_delete_cascades(store);
    check_batched_lookups(store);
    check_drafts_hidden_from_strangers(store);
    check_accounts(store);
}

#[test]
fn test_memory_published_filter() {
    check_published_filter(&MemoryStore::new());
}

#[test]
fn test_memory_published_order_and_limit() {
    check_published_order_and_limit(&MemoryStore::new());
}

#[test]
fn test_memory_like_toggle() {
    check_like_toggle(&MemoryStore::new());
}

#[test]
fn test_memory_owner_only_mutations() {
    check_owner_only_mutations(&MemoryStore::new());
}

#[test]
fn test_memory_delete_cascades() {
    check_delete_cascades(&MemoryStore::new());
}

#[test]
fn test_memory_batched_lookups() {
    check_batched_lookups(&MemoryStore::new());
}

#[test]
fn test_memory_drafts_hidden_from_strangers() {
    check_drafts_hidden_from_strangers(&MemoryStore::new());
}

#[test]
fn test_memory_accounts() {
    check_accounts(&MemoryStore::new());
}

#[test]
#[ignore]
fn test_postgres_contract() {
    dotenv::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let store = PgStore::new(psql_connect_to_db(&url).unwrap());
    check_all(&store);
}
