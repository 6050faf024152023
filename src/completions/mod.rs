//! Suggestion providers

mod inline;

pub use inline::{complete_inline, display_text};

use crate::config::Settings;
use crate::rules::{Rule, SourceType};
use crate::types::{PathContext, SuggestionItem};

/// Candidates for a rule, in declared order, before filtering
pub fn generate(rule: &Rule, existing: &[String]) -> Vec<SuggestionItem> {
    match rule.source {
        SourceType::Inline => complete_inline(rule, existing),
        // Declared sources without a provider yet
        SourceType::Tags | SourceType::Files | SourceType::Date | SourceType::Recent => {
            log::debug!("No provider for source '{}'", rule.source.as_str());
            Vec::new()
        }
    }
}

/// Get suggestions for the given context
pub fn get_suggestions(
    rule: &Rule,
    ctx: &PathContext,
    existing: &[String],
    settings: &Settings,
) -> Vec<SuggestionItem> {
    let mut items = generate(rule, existing);

    let query = ctx.query.trim();
    if ctx.depth() == rule.depth() && !query.is_empty() {
        items.retain(|item| matches_query(item, query, settings.case_sensitive));
    }

    // Limit results
    items.truncate(settings.max_suggestions);
    items
}

/// Substring match against the key or the description
pub fn matches_query(item: &SuggestionItem, query: &str, case_sensitive: bool) -> bool {
    let contains = |text: &str| {
        if case_sensitive {
            text.contains(query)
        } else {
            text.to_lowercase().contains(&query.to_lowercase())
        }
    };

    contains(item.key.as_str()) || item.description.as_deref().map_or(false, contains)
}
