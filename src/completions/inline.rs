//! Inline option completions

use crate::options::RuleOption;
use crate::rules::{DisplayFlags, Rule};
use crate::types::SuggestionItem;

/// Complete from the rule's declared options, skipping keys already present
pub fn complete_inline(rule: &Rule, existing: &[String]) -> Vec<SuggestionItem> {
    rule.options
        .iter()
        .filter(|option| !existing.iter().any(|k| k == &option.key))
        .map(|option| create_item(rule, option))
        .collect()
}

fn create_item(rule: &Rule, option: &RuleOption) -> SuggestionItem {
    SuggestionItem {
        rule_id: rule.id.clone(),
        key: option.key.clone(),
        display: display_text(option, &rule.display),
        insert_text: format!("{}: ", option.key),
        description: option.description.clone(),
    }
}

/// `icon key - description`, each part subject to the display flags
pub fn display_text(option: &RuleOption, flags: &DisplayFlags) -> String {
    let mut head = Vec::new();
    if flags.show_icon {
        if let Some(icon) = option.icon.as_deref().filter(|i| !i.is_empty()) {
            head.push(icon);
        }
    }
    if flags.show_key {
        head.push(option.key.as_str());
    }
    let head = head.join(" ");

    let description = option
        .description
        .as_deref()
        .filter(|d| flags.show_description && !d.is_empty());

    match description {
        Some(desc) if head.is_empty() => desc.to_string(),
        Some(desc) => format!("{} - {}", head, desc),
        None if head.is_empty() => option.key.clone(),
        None => head,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_option() -> RuleOption {
        RuleOption::new("hiking")
            .with_description("Outdoor walk")
            .with_icon("🥾")
    }

    #[test]
    fn test_deduplicates_existing() {
        let rule = Rule::new("Exercises").with_options(vec![
            RuleOption::new("hiking"),
            RuleOption::new("running"),
        ]);

        let items = complete_inline(&rule, &["hiking".to_string()]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, "running");
    }

    #[test]
    fn test_duplicate_options_unreachable_once_present() {
        let rule = Rule::new("Exercises").with_options(vec![
            RuleOption::new("hiking"),
            RuleOption::new("hiking").with_description("again"),
        ]);

        assert_eq!(complete_inline(&rule, &[]).len(), 2);
        assert!(complete_inline(&rule, &["hiking".to_string()]).is_empty());
    }

    #[test]
    fn test_insert_text() {
        let rule = Rule::new("Exercises").with_id("ex").with_options(vec![full_option()]);
        let items = complete_inline(&rule, &[]);

        assert_eq!(items[0].insert_text, "hiking: ");
        assert_eq!(items[0].rule_id, "ex");
    }

    #[test]
    fn test_display_all_parts() {
        assert_eq!(
            display_text(&full_option(), &DisplayFlags::default()),
            "🥾 hiking - Outdoor walk"
        );
    }

    #[test]
    fn test_display_flags() {
        let option = full_option();

        let no_icon = DisplayFlags {
            show_icon: false,
            ..DisplayFlags::default()
        };
        assert_eq!(display_text(&option, &no_icon), "hiking - Outdoor walk");

        let no_desc = DisplayFlags {
            show_description: false,
            ..DisplayFlags::default()
        };
        assert_eq!(display_text(&option, &no_desc), "🥾 hiking");

        let desc_only = DisplayFlags {
            show_icon: false,
            show_key: false,
            show_description: true,
        };
        assert_eq!(display_text(&option, &desc_only), "Outdoor walk");

        let nothing = DisplayFlags {
            show_icon: false,
            show_key: false,
            show_description: false,
        };
        assert_eq!(display_text(&option, &nothing), "hiking");
    }

    #[test]
    fn test_display_plain_option() {
        assert_eq!(
            display_text(&RuleOption::new("running"), &DisplayFlags::default()),
            "running"
        );
    }
}
