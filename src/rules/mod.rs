//! Rule engine / categorizer (spec.md §4.6): turns a transaction plus a
//! user's category tree into suggested (and sometimes auto-confirmed)
//! category assignments.

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::models::{Category, CategoryRule, RuleCondition, RuleField, RuleInheritanceMode, Transaction};

pub const AUTO_CONFIRM_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, Copy)]
pub enum SuggestionStrategy {
    AllMatches,
    TopNMatches(usize),
    ConfidenceThreshold(f64),
    /// Only matches whose rule has the highest priority among all matches,
    /// across every category, not just the highest per category.
    PriorityFiltered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub category_id: Uuid,
    pub rule_id: Uuid,
    pub confidence: f64,
    pub priority: i32,
}

impl From<crate::models::SuggestionStrategyConfig> for SuggestionStrategy {
    fn from(config: crate::models::SuggestionStrategyConfig) -> Self {
        use crate::models::SuggestionStrategyConfig as Cfg;
        match config {
            Cfg::AllMatches => SuggestionStrategy::AllMatches,
            Cfg::TopN { n } => SuggestionStrategy::TopNMatches(n),
            Cfg::ConfidenceThreshold { threshold } => SuggestionStrategy::ConfidenceThreshold(threshold),
            Cfg::PriorityFiltered => SuggestionStrategy::PriorityFiltered,
        }
    }
}

/// Walks a category's ancestor chain (while `inherit_parent_rules` holds) and
/// returns the effective, enabled, priority-then-rule_id-ordered rule set for
/// matching against a transaction.
///
/// - `additive`: the category's own rules plus every inherited rule.
/// - `override`: the category's own rules replace the parent's entirely (no
///   walk past a category whose own rules are non-empty).
/// - `disabled`: inheritance stops at this category; no ancestor rules apply.
pub fn effective_rules(category: &Category, by_id: &HashMap<Uuid, Category>) -> Vec<CategoryRule> {
    let mut rules = category.rules.0.clone();

    if category.inherit_parent_rules
        && category.rule_inheritance_mode != RuleInheritanceMode::Disabled
        && !(category.rule_inheritance_mode == RuleInheritanceMode::Override && !rules.is_empty())
    {
        if let Some(parent_id) = category.parent_category_id {
            if let Some(parent) = by_id.get(&parent_id) {
                let mut inherited = effective_rules(parent, by_id);
                rules.append(&mut inherited);
            }
        }
    }

    rules.retain(|r| r.enabled);
    rules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.rule_id.cmp(&b.rule_id)));
    rules
}

fn field_value<'a>(transaction: &'a Transaction, field: RuleField) -> Option<&'a str> {
    match field {
        RuleField::Description => Some(transaction.description.as_str()),
        RuleField::Payee => transaction.payee.as_deref(),
        RuleField::Memo => transaction.memo.as_deref(),
        RuleField::Amount => None,
    }
}

fn matches_string_condition(rule: &CategoryRule, haystack: &str) -> bool {
    let (haystack, needle) = if rule.case_sensitive {
        (haystack.to_string(), rule.value.clone())
    } else {
        (haystack.to_lowercase(), rule.value.to_lowercase())
    };

    match rule.condition {
        RuleCondition::Contains => haystack.contains(&needle),
        RuleCondition::StartsWith => haystack.starts_with(&needle),
        RuleCondition::EndsWith => haystack.ends_with(&needle),
        RuleCondition::Equals => haystack == needle,
        RuleCondition::Regex => regex::Regex::new(&rule.value)
            .map(|re| re.is_match(&haystack))
            .unwrap_or(false),
        RuleCondition::AmountGreater | RuleCondition::AmountLess | RuleCondition::AmountBetween => false,
    }
}

fn matches_amount_condition(rule: &CategoryRule, amount: &BigDecimal) -> bool {
    match rule.condition {
        RuleCondition::AmountGreater => rule
            .amount_min
            .as_ref()
            .map(|min| amount > min)
            .unwrap_or(false),
        RuleCondition::AmountLess => rule
            .amount_max
            .as_ref()
            .map(|max| amount < max)
            .unwrap_or(false),
        RuleCondition::AmountBetween => match (&rule.amount_min, &rule.amount_max) {
            (Some(min), Some(max)) => amount >= min && amount <= max,
            _ => false,
        },
        _ => false,
    }
}

fn rule_matches(rule: &CategoryRule, transaction: &Transaction) -> bool {
    if rule.field_to_match == RuleField::Amount {
        matches_amount_condition(rule, &transaction.amount)
    } else if let Some(value) = field_value(transaction, rule.field_to_match) {
        matches_string_condition(rule, value)
    } else {
        false
    }
}

/// Matches `transaction` against every user category's effective rule set
/// and applies `strategy` to shape the result, excluding rules with
/// `auto_suggest = false`.
pub fn suggest(
    transaction: &Transaction,
    categories: &[Category],
    strategy: SuggestionStrategy,
) -> Vec<Suggestion> {
    let by_id: HashMap<Uuid, Category> = categories
        .iter()
        .map(|c| (c.category_id, c.clone()))
        .collect();

    let mut matches: Vec<Suggestion> = Vec::new();
    for category in categories {
        let rules = effective_rules(category, &by_id);
        for rule in rules.iter().filter(|r| r.auto_suggest) {
            if rule_matches(rule, transaction) {
                matches.push(Suggestion {
                    category_id: category.category_id,
                    rule_id: rule.rule_id,
                    confidence: rule.confidence,
                    priority: rule.priority,
                });
                if !rule.allow_multiple_matches {
                    break;
                }
            }
        }
    }

    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap()
            .then(a.rule_id.cmp(&b.rule_id))
    });

    match strategy {
        SuggestionStrategy::AllMatches => matches,
        SuggestionStrategy::TopNMatches(n) => matches.into_iter().take(n).collect(),
        SuggestionStrategy::ConfidenceThreshold(t) => {
            matches.into_iter().filter(|m| m.confidence >= t).collect()
        }
        SuggestionStrategy::PriorityFiltered => {
            let max_priority = matches.iter().map(|m| m.priority).max();
            match max_priority {
                Some(max_priority) => matches
                    .into_iter()
                    .filter(|m| m.priority == max_priority)
                    .collect(),
                None => matches,
            }
        }
    }
}

/// A lone match at or above [`AUTO_CONFIRM_CONFIDENCE`] on a transaction with
/// no existing confirmed category is eligible for automatic confirmation.
pub fn should_auto_confirm(suggestions: &[Suggestion], transaction: &Transaction) -> Option<&Suggestion> {
    let already_confirmed = transaction
        .categories
        .0
        .iter()
        .any(|a| a.status == crate::models::AssignmentStatus::Confirmed);
    if already_confirmed || suggestions.len() != 1 {
        return None;
    }
    suggestions
        .first()
        .filter(|s| s.confidence >= AUTO_CONFIRM_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentStatus, CategoryAssignment, CategoryType, NewTransaction};
    use pretty_assertions::assert_eq;

    fn base_transaction(description: &str, amount: i64) -> Transaction {
        Transaction::from_new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NewTransaction {
                account_id: Uuid::new_v4(),
                date: chrono::Utc::now(),
                description: description.to_string(),
                amount: BigDecimal::from(amount),
                balance: BigDecimal::from(0),
                currency: "USD".into(),
                import_order: 1,
                transaction_type: None,
                payee: None,
                memo: None,
                check_number: None,
                reference: None,
                status: None,
                debit_or_credit: None,
                dedup_hash: vec![],
            },
        )
    }

    fn rule(value: &str, priority: i32, confidence: f64) -> CategoryRule {
        CategoryRule {
            rule_id: Uuid::new_v4(),
            field_to_match: RuleField::Description,
            condition: RuleCondition::Contains,
            value: value.to_string(),
            case_sensitive: false,
            priority,
            enabled: true,
            confidence,
            amount_min: None,
            amount_max: None,
            allow_multiple_matches: true,
            auto_suggest: true,
        }
    }

    fn category(name: &str, rules: Vec<CategoryRule>, parent: Option<Uuid>) -> Category {
        Category {
            category_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            category_type: CategoryType::Expense,
            parent_category_id: parent,
            inherit_parent_rules: true,
            rule_inheritance_mode: RuleInheritanceMode::Additive,
            rules: sqlx::types::Json(rules),
            icon: None,
            color: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn matching_rule_is_suggested() {
        let transaction = base_transaction("ACME COFFEE SHOP", -5);
        let cat = category("Coffee", vec![rule("coffee", 10, 0.9)], None);
        let suggestions = suggest(&transaction, &[cat], SuggestionStrategy::AllMatches);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].confidence, 0.9);
    }

    #[test]
    fn additive_inheritance_includes_parent_rules() {
        let parent = category("Food", vec![rule("acme", 5, 0.7)], None);
        let mut child = category("Coffee", vec![rule("coffee", 10, 0.9)], Some(parent.category_id));
        child.rule_inheritance_mode = RuleInheritanceMode::Additive;

        let transaction = base_transaction("ACME COFFEE SHOP", -5);
        let suggestions = suggest(
            &transaction,
            &[parent.clone(), child],
            SuggestionStrategy::AllMatches,
        );
        // Both the parent's "acme" rule and the child's own "coffee" rule match.
        assert_eq!(suggestions.len(), 2);
    }

    #[test]
    fn override_inheritance_ignores_parent_rules_when_own_rules_present() {
        let parent = category("Food", vec![rule("acme", 5, 0.7)], None);
        let mut child = category("Coffee", vec![rule("coffee", 10, 0.9)], Some(parent.category_id));
        child.rule_inheritance_mode = RuleInheritanceMode::Override;

        let transaction = base_transaction("ACME COFFEE SHOP", -5);
        let suggestions = suggest(&transaction, &[parent, child], SuggestionStrategy::AllMatches);
        assert_eq!(suggestions.len(), 1);
    }

    #[test]
    fn single_high_confidence_match_auto_confirms() {
        let transaction = base_transaction("ACME COFFEE SHOP", -5);
        let cat = category("Coffee", vec![rule("coffee", 10, 0.99)], None);
        let suggestions = suggest(&transaction, &[cat], SuggestionStrategy::AllMatches);
        assert!(should_auto_confirm(&suggestions, &transaction).is_some());
    }

    #[test]
    fn existing_confirmed_category_blocks_auto_confirm() {
        let mut transaction = base_transaction("ACME COFFEE SHOP", -5);
        transaction.categories = sqlx::types::Json(vec![CategoryAssignment {
            category_id: Uuid::new_v4(),
            confidence: 1.0,
            status: AssignmentStatus::Confirmed,
            is_manual: true,
            assigned_at: chrono::Utc::now(),
            confirmed_at: Some(chrono::Utc::now()),
            rule_id: None,
        }]);
        let cat = category("Coffee", vec![rule("coffee", 10, 0.99)], None);
        let suggestions = suggest(&transaction, &[cat], SuggestionStrategy::AllMatches);
        assert!(should_auto_confirm(&suggestions, &transaction).is_none());
    }

    #[test]
    fn top_n_strategy_limits_results() {
        let transaction = base_transaction("ACME COFFEE SHOP TRAVEL", -5);
        let cat1 = category("Coffee", vec![rule("coffee", 10, 0.9)], None);
        let cat2 = category("Travel", vec![rule("travel", 5, 0.8)], None);
        let suggestions = suggest(
            &transaction,
            &[cat1, cat2],
            SuggestionStrategy::TopNMatches(1),
        );
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].confidence, 0.9);
    }

    #[test]
    fn priority_filtered_keeps_only_highest_priority_matches_across_categories() {
        let transaction = base_transaction("ACME COFFEE SHOP TRAVEL", -5);
        let cat1 = category("Coffee", vec![rule("coffee", 10, 0.5)], None);
        let cat2 = category("Travel", vec![rule("travel", 5, 0.9)], None);
        let suggestions = suggest(&transaction, &[cat1, cat2], SuggestionStrategy::PriorityFiltered);
        // "coffee" has priority 10, higher than "travel"'s 5, even though
        // "travel" has the higher confidence.
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].priority, 10);
    }

    #[test]
    fn amount_between_condition_matches_range() {
        let transaction = base_transaction("subscription", -15);
        let mut r = rule("subscription", 1, 0.8);
        r.field_to_match = RuleField::Amount;
        r.condition = RuleCondition::AmountBetween;
        r.amount_min = Some(BigDecimal::from(-20));
        r.amount_max = Some(BigDecimal::from(-10));
        let cat = category("Subscriptions", vec![r], None);
        let suggestions = suggest(&transaction, &[cat], SuggestionStrategy::AllMatches);
        assert_eq!(suggestions.len(), 1);
    }
}
