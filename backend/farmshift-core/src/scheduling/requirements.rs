// src/scheduling/requirements.rs
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::YearMonth;
use crate::error::StoreError;
use crate::model::{RequirementScope, RequirementSet};
use crate::repository::RequirementStore;

/// Headcounts used when nothing is configured at any level.
pub fn builtin_requirements() -> RequirementSet {
    [("milking", 2), ("feeding", 1), ("cleaning", 1), ("patrol", 1)]
        .into_iter()
        .map(|(task, count)| (task.to_string(), count))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementSource {
    Override,
    Date,
    Month,
    Global,
    BuiltIn,
}

impl fmt::Display for RequirementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequirementSource::Override => "run override",
            RequirementSource::Date => "daily",
            RequirementSource::Month => "monthly",
            RequirementSource::Global => "global default",
            RequirementSource::BuiltIn => "built-in",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequirements {
    pub source: RequirementSource,
    pub requirements: RequirementSet,
}

/// Picks exactly one whole requirement set per date:
/// override, then date, then month, then global, then built-in.
/// Sets are never merged across levels.
pub struct RequirementResolver {
    store: Arc<dyn RequirementStore>,
}

impl RequirementResolver {
    pub fn new(store: Arc<dyn RequirementStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(
        &self,
        date: NaiveDate,
        month: YearMonth,
        override_set: Option<&RequirementSet>,
    ) -> Result<ResolvedRequirements, StoreError> {
        if let Some(set) = override_set.filter(|s| !s.is_empty()) {
            return Ok(ResolvedRequirements {
                source: RequirementSource::Override,
                requirements: set.clone(),
            });
        }

        let tiers = [
            (RequirementScope::Date(date), RequirementSource::Date),
            (RequirementScope::Month(month), RequirementSource::Month),
            (RequirementScope::Global, RequirementSource::Global),
        ];
        for (scope, source) in tiers {
            // An empty stored set counts as absent.
            if let Some(set) = self.store.get(scope).await?.filter(|s| !s.is_empty()) {
                debug!("Requirements for {} resolved from {} set", date, source);
                return Ok(ResolvedRequirements {
                    source,
                    requirements: set,
                });
            }
        }

        Ok(ResolvedRequirements {
            source: RequirementSource::BuiltIn,
            requirements: builtin_requirements(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::repository::RequirementRepo;
    use crate::store::MemoryTable;

    fn set(entries: &[(&str, i64)]) -> RequirementSet {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    async fn setup() -> (Arc<RequirementRepo>, RequirementResolver, NaiveDate, YearMonth) {
        let clock = FixedClock::parse("2025-11-01 00:00:00").unwrap();
        let repo = Arc::new(RequirementRepo::new(Arc::new(MemoryTable::new()), Arc::new(clock)));
        let resolver = RequirementResolver::new(repo.clone());
        let date = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        (repo, resolver, date, YearMonth::of(date))
    }

    #[tokio::test]
    async fn date_set_wins_whole_without_merging() {
        let (repo, resolver, date, month) = setup().await;
        repo.put(RequirementScope::Global, set(&[("milking", 3), ("patrol", 1)]))
            .await
            .unwrap();
        repo.put(RequirementScope::Month(month), set(&[("milking", 2), ("feeding", 2)]))
            .await
            .unwrap();
        repo.put(RequirementScope::Date(date), set(&[("cleaning", 4)]))
            .await
            .unwrap();

        let resolved = resolver.resolve(date, month, None).await.unwrap();
        assert_eq!(resolved.source, RequirementSource::Date);
        assert_eq!(resolved.requirements, set(&[("cleaning", 4)]));

        let other_day = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        let resolved = resolver.resolve(other_day, month, None).await.unwrap();
        assert_eq!(resolved.source, RequirementSource::Month);
        assert_eq!(resolved.requirements, set(&[("milking", 2), ("feeding", 2)]));
    }

    #[tokio::test]
    async fn falls_through_to_global_then_builtin() {
        let (repo, resolver, date, month) = setup().await;
        let resolved = resolver.resolve(date, month, None).await.unwrap();
        assert_eq!(resolved.source, RequirementSource::BuiltIn);
        assert_eq!(resolved.requirements, builtin_requirements());

        repo.put(RequirementScope::Global, set(&[("patrol", 2)])).await.unwrap();
        repo.put(RequirementScope::Month(month), RequirementSet::new()).await.unwrap();
        let resolved = resolver.resolve(date, month, None).await.unwrap();
        assert_eq!(resolved.source, RequirementSource::Global);
    }

    #[test]
    fn builtin_set_lists_milking_first() {
        let builtin = builtin_requirements();
        let order: Vec<&str> = builtin.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["milking", "feeding", "cleaning", "patrol"]);
        assert_eq!(builtin.get("milking"), Some(&2));
    }

    #[tokio::test]
    async fn month_set_keeps_written_order() {
        let (repo, resolver, date, month) = setup().await;
        repo.put(RequirementScope::Month(month), set(&[("patrol", 1), ("cleaning", 1), ("milking", 2)]))
            .await
            .unwrap();
        let resolved = resolver.resolve(date, month, None).await.unwrap();
        let order: Vec<&str> = resolved.requirements.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["patrol", "cleaning", "milking"]);
    }

    #[tokio::test]
    async fn override_bypasses_stored_sets() {
        let (repo, resolver, date, month) = setup().await;
        repo.put(RequirementScope::Date(date), set(&[("cleaning", 4)])).await.unwrap();
        let run_override = set(&[("milking", 1)]);
        let resolved = resolver
            .resolve(date, month, Some(&run_override))
            .await
            .unwrap();
        assert_eq!(resolved.source, RequirementSource::Override);
        assert_eq!(resolved.requirements, run_override);
    }
}
