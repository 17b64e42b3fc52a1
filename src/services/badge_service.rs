use crate::database::MongoDB;
use crate::models::{Badge, Requirement};
use crate::utils::error::AppError;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use std::collections::HashSet;

/// Escapes regex metacharacters so user-supplied search text is always a
/// literal substring match inside a `$regex` query.
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if ".^$*+?()[]{}|\\".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// AND semantics for the category filter: a badge matches only if its
/// category text contains every selected category as a case-insensitive
/// substring. An empty selection matches everything.
pub fn matches_categories(badge_categories: Option<&str>, selection: &[String]) -> bool {
    if selection.is_empty() {
        return true;
    }
    let haystack = match badge_categories {
        Some(text) => text.to_lowercase(),
        None => return false,
    };
    selection
        .iter()
        .all(|category| haystack.contains(&category.to_lowercase()))
}

/// Splits the `categories` query parameter into a cleaned selection list.
pub fn parse_selection(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn all_badges(db: &MongoDB) -> Result<Vec<Badge>, AppError> {
    let badges: Vec<Badge> = db
        .badges_collection::<Badge>()
        .find(doc! {})
        .await?
        .try_collect()
        .await?;
    log::info!("📚 {} badges found", badges.len());
    Ok(badges)
}

/// Case-insensitive substring search on the badge name. No match is a 404,
/// matching the behavior clients already depend on.
pub async fn search_by_name(db: &MongoDB, name: &str) -> Result<Badge, AppError> {
    let filter = doc! {
        "badge_name": { "$regex": escape_regex(name), "$options": "i" }
    };
    db.badges_collection::<Badge>()
        .find_one(filter)
        .await?
        .ok_or_else(|| AppError::BadgeNotFound(format!("no badge matching '{}'", name)))
}

/// Category filter with AND semantics over the comma-separated selection.
/// The catalog is small, so matching happens in process against the full
/// list rather than in a compound regex query.
pub async fn search_by_categories(db: &MongoDB, raw_selection: &str) -> Result<Vec<Badge>, AppError> {
    let selection = parse_selection(raw_selection);
    let badges = all_badges(db).await?;

    let matching: Vec<Badge> = badges
        .into_iter()
        .filter(|b| matches_categories(b.categories.as_deref(), &selection))
        .collect();

    if matching.is_empty() {
        return Err(AppError::BadgeNotFound(format!(
            "no badges found in categories '{}'",
            raw_selection
        )));
    }
    Ok(matching)
}

/// Badges whose requirement text matches the query. Empty results are a
/// 200 with an empty list.
pub async fn search_by_requirement(db: &MongoDB, query: &str) -> Result<Vec<Badge>, AppError> {
    let filter = doc! {
        "requirement_string": { "$regex": escape_regex(query), "$options": "i" }
    };
    let requirements: Vec<Requirement> = db
        .requirements_collection::<Requirement>()
        .find(filter)
        .await?
        .try_collect()
        .await?;

    let badge_ids: HashSet<i64> = requirements.iter().map(|r| r.badge_id).collect();
    if badge_ids.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<i64> = badge_ids.into_iter().collect();
    let badges: Vec<Badge> = db
        .badges_collection::<Badge>()
        .find(doc! { "badge_id": { "$in": ids } })
        .await?
        .try_collect()
        .await?;
    Ok(badges)
}

/// All requirements for one numeric badge id. Unknown ids yield an empty
/// list, not a 404; clients treat a badge with no requirements and an
/// unknown badge the same way here.
pub async fn requirements_for_badge(db: &MongoDB, badge_id: i64) -> Result<Vec<Requirement>, AppError> {
    let requirements: Vec<Requirement> = db
        .requirements_collection::<Requirement>()
        .find(doc! { "badge_id": badge_id })
        .await?
        .try_collect()
        .await?;
    log::info!(
        "📋 {} requirements found for badge ID: {}",
        requirements.len(),
        badge_id
    );
    Ok(requirements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_matches_everything() {
        assert!(matches_categories(Some("Outdoors, At Camp"), &[]));
        assert!(matches_categories(None, &[]));
    }

    #[test]
    fn all_selected_categories_must_match() {
        let categories = Some("Activity Badges, At Camp, Outdoors");
        let both = vec!["Outdoors".to_string(), "At Camp".to_string()];
        let one_missing = vec!["Outdoors".to_string(), "Indoors".to_string()];
        assert!(matches_categories(categories, &both));
        assert!(!matches_categories(categories, &one_missing));
    }

    #[test]
    fn category_match_is_case_insensitive() {
        let categories = Some("Activity Badges, At Camp, Outdoors");
        let selection = vec!["outdoors".to_string(), "at camp".to_string()];
        assert!(matches_categories(categories, &selection));
    }

    #[test]
    fn badge_without_categories_only_matches_empty_selection() {
        assert!(!matches_categories(None, &["Outdoors".to_string()]));
    }

    #[test]
    fn selection_parsing_trims_and_drops_empties() {
        assert_eq!(
            parse_selection(" Outdoors , At Camp ,,"),
            vec!["Outdoors".to_string(), "At Camp".to_string()]
        );
        assert!(parse_selection("").is_empty());
        assert!(parse_selection(" , ").is_empty());
    }

    #[test]
    fn regex_metacharacters_are_escaped() {
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
        assert_eq!(escape_regex("plain"), "plain");
        assert_eq!(escape_regex("(x|y)"), "\\(x\\|y\\)");
    }
}
