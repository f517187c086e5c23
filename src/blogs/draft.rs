use serde::Deserialize;

use crate::{app::AppError, database::models::blog::BlogFields};

/// Characters of content used as excerpt when none is given
pub const EXCERPT_LEN: usize = 150;

/// Blog form as submitted by the editor, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    /// `false` saves a draft, `true` publishes
    #[serde(default)]
    pub published: bool,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl BlogDraft {
    /// Trims every field and fills in the excerpt.
    /// Fails when the title or the content is blank.
    pub fn validate(&self) -> Result<BlogFields, AppError> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(AppError::BadRequest("Title and content are required"));
        }

        let excerpt = non_empty(self.excerpt.as_ref())
            .unwrap_or_else(|| content.chars().take(EXCERPT_LEN).collect());

        Ok(BlogFields {
            title: title.to_string(),
            excerpt,
            content: content.to_string(),
            cover_image: non_empty(self.cover_image.as_ref()),
            published: self.published,
        })
    }
}
