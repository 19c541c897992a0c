// persistence-rs/src/rules.rs
// Industry safety rules with a three-level lookup:
// (industry, department) -> (industry, "*") -> ("generic", "*").

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use shared_types::{SafetyRule, GENERIC_INDUSTRY, WILDCARD_DEPARTMENT};

use crate::cache::TtlCache;
use crate::error::StoreError;

#[async_trait]
pub trait SafetyRuleStore: Send + Sync {
    /// Most specific active rule for the pair, if any level of the chain has one.
    async fn get(&self, industry: &str, department: &str)
        -> Result<Option<SafetyRule>, StoreError>;

    /// Insert or replace the rule stored under its (industry, department).
    async fn set(&self, rule: SafetyRule) -> Result<(), StoreError>;
}

fn normalize(industry: &str, department: &str) -> (String, String) {
    let industry = industry.trim().to_lowercase();
    let department = department.trim().to_lowercase();
    (
        if industry.is_empty() {
            GENERIC_INDUSTRY.to_string()
        } else {
            industry
        },
        if department.is_empty() {
            WILDCARD_DEPARTMENT.to_string()
        } else {
            department
        },
    )
}

fn cache_key(industry: &str, department: &str) -> String {
    format!("{}:{}", industry, department)
}

pub struct InMemorySafetyRuleStore {
    rules: DashMap<(String, String), SafetyRule>,
    cache: TtlCache<Option<SafetyRule>>,
}

impl InMemorySafetyRuleStore {
    pub fn new(cache_ttl: Duration) -> Self {
        Self {
            rules: DashMap::new(),
            cache: TtlCache::new(cache_ttl),
        }
    }

    fn active(&self, industry: &str, department: &str) -> Option<SafetyRule> {
        self.rules
            .get(&(industry.to_string(), department.to_string()))
            .filter(|rule| rule.is_active)
            .map(|rule| rule.value().clone())
    }

    fn resolve(&self, industry: &str, department: &str) -> Option<SafetyRule> {
        self.active(industry, department)
            .or_else(|| self.active(industry, WILDCARD_DEPARTMENT))
            .or_else(|| self.active(GENERIC_INDUSTRY, WILDCARD_DEPARTMENT))
    }

    /// Insert rules that are not present yet; existing rows are left alone.
    pub fn seed(&self, rules: Vec<SafetyRule>) -> usize {
        let mut inserted = 0;
        for rule in rules {
            let (industry, department) = normalize(&rule.industry, &rule.department);
            let key = (industry.clone(), department.clone());
            if self.rules.contains_key(&key) {
                continue;
            }
            self.rules.insert(
                key,
                SafetyRule {
                    industry,
                    department,
                    ..rule
                },
            );
            inserted += 1;
        }
        if inserted > 0 {
            self.cache.clear();
        }
        tracing::info!(inserted, "safety_rules_seeded");
        inserted
    }
}

#[async_trait]
impl SafetyRuleStore for InMemorySafetyRuleStore {
    async fn get(
        &self,
        industry: &str,
        department: &str,
    ) -> Result<Option<SafetyRule>, StoreError> {
        let (industry, department) = normalize(industry, department);
        let key = cache_key(&industry, &department);

        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let rule = self.resolve(&industry, &department);
        if let Some(found) = &rule {
            tracing::debug!(
                requested_industry = %industry,
                requested_department = %department,
                resolved_industry = %found.industry,
                resolved_department = %found.department,
                "safety_rule_resolved"
            );
        }
        self.cache.insert(key, rule.clone());
        Ok(rule)
    }

    async fn set(&self, rule: SafetyRule) -> Result<(), StoreError> {
        let (industry, department) = normalize(&rule.industry, &rule.department);
        if rule.onboarded_by.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "onboarded_by must name who approved the rule".to_string(),
            ));
        }

        self.rules.insert(
            (industry.clone(), department.clone()),
            SafetyRule {
                industry: industry.clone(),
                department: department.clone(),
                ..rule
            },
        );

        // Generic rules back every lookup; industry rules only their own keys.
        if industry == GENERIC_INDUSTRY {
            self.cache.clear();
        } else {
            let prefix = format!("{}:", industry);
            self.cache.invalidate_where(|key| key.starts_with(&prefix));
        }

        tracing::info!(industry = %industry, department = %department, "safety_rule_updated");
        Ok(())
    }
}
