use super::aggregate::BlogCard;

/// Keeps the cards whose title or excerpt contains `query`, ignoring case.
/// A blank query keeps everything.
pub fn filter_cards(cards: Vec<BlogCard>, query: &str) -> Vec<BlogCard> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return cards;
    }

    cards.into_iter()
        .filter(|card| {
            card.blog.title.to_lowercase().contains(&needle)
                || card.blog.excerpt.to_lowercase().contains(&needle)
        })
        .collect()
}
