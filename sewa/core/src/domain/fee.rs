// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Fee Calculation
//!
//! The official fee comes from the first rule matching the applicant's
//! `category` and `gender` answers, searched in four tiers from most to
//! least specific. A missing category answer yields an official fee of zero
//! regardless of the rule table.

use serde::{Deserialize, Serialize};

use crate::domain::form::FormAnswers;
use crate::domain::target::ApplicationTarget;

/// Wildcard accepted in either rule column.
pub const ANY: &str = "Any";

const CATEGORY_KEY: &str = "category";
const GENDER_KEY: &str = "gender";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRule {
    pub category: String,
    pub gender: String,
    pub amount: u64,
}

impl FeeRule {
    pub fn new(category: impl Into<String>, gender: impl Into<String>, amount: u64) -> Self {
        Self {
            category: category.into(),
            gender: gender.into(),
            amount,
        }
    }
}

/// Resolve the official fee for the current answers.
pub fn official_fee(rules: &[FeeRule], answers: &FormAnswers) -> u64 {
    let Some(category) = answers.lookup_loose(CATEGORY_KEY) else {
        return 0;
    };
    let gender = answers.lookup_loose(GENDER_KEY);

    let gender_is = |rule: &FeeRule| gender.is_some_and(|g| rule.gender == g);

    let tiers: [&dyn Fn(&FeeRule) -> bool; 4] = [
        &|r: &FeeRule| r.category == category && gender_is(r),
        &|r: &FeeRule| r.category == category && r.gender == ANY,
        &|r: &FeeRule| r.category == ANY && gender_is(r),
        &|r: &FeeRule| r.category == ANY && r.gender == ANY,
    ];

    tiers
        .iter()
        .find_map(|matches| rules.iter().find(|rule| matches(*rule)))
        .map(|rule| rule.amount)
        .unwrap_or(0)
}

/// Amounts shown to the applicant. Derived on demand and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub official_fee: u64,
    pub service_fee: u64,
    pub total_amount: u64,
}

impl FeeQuote {
    pub fn new(official_fee: u64, service_fee: u64) -> Self {
        Self {
            official_fee,
            service_fee,
            total_amount: official_fee.saturating_add(service_fee),
        }
    }

    pub fn compute(target: &ApplicationTarget, answers: &FormAnswers) -> Self {
        Self::new(
            official_fee(&target.fee_structure, answers),
            target.service_charge,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<FeeRule> {
        vec![
            FeeRule::new("Gen", "Any", 100),
            FeeRule::new("OBC", "Male", 50),
            FeeRule::new("OBC", "Any", 70),
        ]
    }

    fn answers(pairs: &[(&str, &str)]) -> FormAnswers {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_exact_match_beats_wildcards() {
        let fee = official_fee(&rules(), &answers(&[("category", "OBC"), ("gender", "Male")]));
        assert_eq!(fee, 50);
    }

    #[test]
    fn test_category_with_any_gender() {
        let fee = official_fee(&rules(), &answers(&[("category", "OBC"), ("gender", "Female")]));
        assert_eq!(fee, 70);
    }

    #[test]
    fn test_no_category_answer_is_zero() {
        assert_eq!(official_fee(&rules(), &answers(&[("gender", "Male")])), 0);
        assert_eq!(official_fee(&[FeeRule::new("Any", "Any", 300)], &FormAnswers::new()), 0);
    }

    #[test]
    fn test_answer_keys_are_matched_loosely() {
        let fee = official_fee(&rules(), &answers(&[(" Category", "OBC"), ("GENDER ", "Male")]));
        assert_eq!(fee, 50);
    }

    #[test]
    fn test_wildcard_tiers() {
        let rules = vec![
            FeeRule::new("Any", "Any", 10),
            FeeRule::new("Any", "Female", 20),
            FeeRule::new("SC", "Male", 30),
        ];
        assert_eq!(official_fee(&rules, &answers(&[("category", "SC"), ("gender", "Female")])), 20);
        assert_eq!(official_fee(&rules, &answers(&[("category", "ST"), ("gender", "Male")])), 10);
        assert_eq!(official_fee(&rules, &answers(&[("category", "SC")])), 10);
    }

    #[test]
    fn test_no_match_is_zero() {
        let fee = official_fee(&rules(), &answers(&[("category", "ST"), ("gender", "Male")]));
        assert_eq!(fee, 0);
    }

    #[test]
    fn test_first_rule_wins_within_a_tier() {
        let rules = vec![FeeRule::new("Gen", "Any", 100), FeeRule::new("Gen", "Any", 999)];
        assert_eq!(official_fee(&rules, &answers(&[("category", "Gen")])), 100);
    }

    #[test]
    fn test_quote_adds_service_charge() {
        let mut target = ApplicationTarget::new("svc", "Caste Certificate");
        target.fee_structure = rules();
        let quote = FeeQuote::compute(&target, &answers(&[("category", "Gen")]));
        assert_eq!(quote, FeeQuote { official_fee: 100, service_fee: 50, total_amount: 150 });
    }

    #[test]
    fn test_quote_total_saturates() {
        let quote = FeeQuote::new(u64::MAX, 50);
        assert_eq!(quote.total_amount, u64::MAX);
    }
}
