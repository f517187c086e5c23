use std::sync::Arc;
use log::info;
use serde::Serialize;

use crate::{
    app::AppError,
    auth::Identity,
    blogs::{aggregate::BlogCard, load_author_cards},
    database::{models::profile::{Profile, ProfileChanges}, store::{run, Store}},
};

/// Profile header plus the author's published blogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilePage {
    #[serde(flatten)]
    pub profile: Profile,
    pub blogs: Vec<BlogCard>,
}

pub async fn load_profile_page(store: &Arc<dyn Store>, user_id: String) -> Result<ProfilePage, AppError> {
    let lookup = user_id.clone();
    let (profile, blogs) = futures::try_join!(
        run(store, move |s| s.fetch_profile(&lookup)),
        load_author_cards(store, user_id),
    )?;

    Ok(ProfilePage { profile, blogs })
}

/// Trims the submitted fields. A username, when given, must not be blank.
pub fn normalize_changes(changes: &ProfileChanges) -> Result<ProfileChanges, AppError> {
    let username = changes.username.as_ref().map(|name| name.trim().to_string());
    if username.as_deref() == Some("") {
        return Err(AppError::BadRequest("Username cannot be empty"));
    }

    Ok(ProfileChanges {
        username,
        bio: changes.bio.as_ref().map(|bio| bio.trim().to_string()),
    })
}

pub async fn update_profile(
    store: &Arc<dyn Store>,
    identity: &Identity,
    user_id: String,
    changes: &ProfileChanges,
) -> Result<Profile, AppError> {
    let changes = normalize_changes(changes)?;
    let actor = identity.id.clone();

    let profile = run(store, move |s| s.update_profile(&user_id, &actor, &changes)).await?;
    info!("profile {} updated", profile.user_id);

    Ok(profile)
}
