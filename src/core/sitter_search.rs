use crate::core::{SearchCriteria, SearchOutcome, SitterRecord, SitterStore};
use crate::utils::error::{AgentError, Result};

/// Upper bound on the number of records a search returns.
pub const MAX_RESULTS: usize = 5;

/// Stateless search and lookup over a [`SitterStore`] snapshot.
pub struct SitterSearch<S: SitterStore> {
    store: S,
}

impl<S: SitterStore> SitterSearch<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Result<SearchOutcome> {
        let records = self.store.load_sitters().await?;
        let total = records.len();
        let outcome = filter_and_rank(records, criteria);

        tracing::debug!(
            "Sitter search over {} records returned {} matches ({:?})",
            total,
            outcome.matches().len(),
            criteria
        );
        Ok(outcome)
    }

    /// Duplicate ids are not rejected; the first record in dataset order wins.
    pub async fn get_by_id(&self, id: i64) -> Result<SitterRecord> {
        let records = self.store.load_sitters().await?;
        records
            .into_iter()
            .find(|record| record.id == id)
            .ok_or(AgentError::NotFound { id })
    }
}

/// Applies every supplied criterion (logical AND), orders by
/// `(rating, review_count)` descending and keeps the first [`MAX_RESULTS`].
///
/// Sorting is stable, so equal keys keep dataset order.
pub fn filter_and_rank(records: Vec<SitterRecord>, criteria: &SearchCriteria) -> SearchOutcome {
    let mut matched: Vec<SitterRecord> = records
        .into_iter()
        .filter(|record| matches_criteria(record, criteria))
        .collect();

    matched.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then_with(|| b.review_count.cmp(&a.review_count))
    });
    matched.truncate(MAX_RESULTS);

    if matched.is_empty() {
        SearchOutcome::no_matches()
    } else {
        SearchOutcome::Matches(matched)
    }
}

pub fn matches_criteria(record: &SitterRecord, criteria: &SearchCriteria) -> bool {
    if let Some(location) = &criteria.location {
        if !record
            .location
            .to_lowercase()
            .contains(&location.to_lowercase())
        {
            return false;
        }
    }

    if let Some(pet_type) = &criteria.pet_type {
        if !contains_ignore_case(&record.type_of_pets, pet_type) {
            return false;
        }
    }

    if let Some(service) = &criteria.service {
        if !contains_ignore_case(&record.services, service) {
            return false;
        }
    }

    // 星期比對保留大小寫敏感
    if let Some(day) = &criteria.day_needed {
        if !record.days_available.iter().any(|d| d == day) {
            return false;
        }
    }

    if let Some(max_rate) = criteria.max_rate {
        if record.hourly_rate > max_rate {
            return false;
        }
    }

    if let Some(specialization) = &criteria.specialization {
        if !contains_ignore_case(&record.specializations, specialization) {
            return false;
        }
    }

    true
}

fn contains_ignore_case(values: &[String], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    values.iter().any(|value| value.to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct MemoryStore {
        records: Vec<SitterRecord>,
        loads: Arc<AtomicUsize>,
    }

    impl MemoryStore {
        fn new(records: Vec<SitterRecord>) -> Self {
            Self {
                records,
                loads: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl SitterStore for MemoryStore {
        async fn load_sitters(&self) -> Result<Vec<SitterRecord>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    struct BrokenStore;

    impl SitterStore for BrokenStore {
        async fn load_sitters(&self) -> Result<Vec<SitterRecord>> {
            Err(AgentError::DataUnavailable {
                path: "memory".to_string(),
                reason: "corrupt".to_string(),
            })
        }
    }

    fn sitter(id: i64, location: &str, rate: f64, rating: f64, reviews: u64) -> SitterRecord {
        SitterRecord {
            id,
            location: location.to_string(),
            type_of_pets: vec!["dogs".to_string()],
            services: vec!["dog_walking".to_string()],
            days_available: vec!["Monday".to_string(), "Saturday".to_string()],
            hourly_rate: rate,
            specializations: vec!["senior_pets".to_string()],
            rating,
            review_count: reviews,
            extra: serde_json::Map::new(),
        }
    }

    fn ids(outcome: &SearchOutcome) -> Vec<i64> {
        outcome.matches().iter().map(|r| r.id).collect()
    }

    fn ten_sitters() -> Vec<SitterRecord> {
        vec![
            sitter(1, "Seattle", 20.0, 4.2, 10),
            sitter(2, "Seattle", 20.0, 4.9, 5),
            sitter(3, "Miami", 20.0, 4.9, 50),
            sitter(4, "Miami", 20.0, 3.0, 99),
            sitter(5, "Chicago", 20.0, 4.7, 12),
            sitter(6, "Chicago", 20.0, 4.7, 12),
            sitter(7, "Chicago", 20.0, 4.7, 12),
            sitter(8, "Chicago", 20.0, 4.1, 80),
            sitter(9, "Chicago", 20.0, 4.7, 40),
            sitter(10, "Chicago", 20.0, 2.5, 1),
        ]
    }

    #[test]
    fn no_criteria_returns_top_five_stably() {
        let outcome = filter_and_rank(ten_sitters(), &SearchCriteria::default());
        // 4.9/50, 4.9/5, 4.7/40, then 4.7/12 ties in dataset order
        assert_eq!(ids(&outcome), vec![3, 2, 9, 5, 6]);
    }

    #[test]
    fn result_never_exceeds_five() {
        let many: Vec<SitterRecord> = (1..=40)
            .map(|i| sitter(i, "Seattle", 10.0, (i % 5) as f64, i as u64))
            .collect();
        let outcome = filter_and_rank(many, &SearchCriteria::default());
        assert_eq!(outcome.matches().len(), MAX_RESULTS);
    }

    #[test]
    fn location_and_max_rate_scenario() {
        let records = vec![
            sitter(1, "New York", 20.0, 4.0, 1),
            sitter(2, "New York", 35.0, 4.5, 1),
            sitter(3, "New York", 50.0, 5.0, 1),
            sitter(4, "Seattle", 10.0, 5.0, 1),
        ];
        let criteria = SearchCriteria {
            location: Some("new york".to_string()),
            max_rate: Some(30.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_rank(records, &criteria)), vec![1]);
    }

    #[test]
    fn location_matches_substring() {
        let records = vec![sitter(1, "Brooklyn, New York", 20.0, 4.0, 1)];
        let criteria = SearchCriteria {
            location: Some("YORK".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_rank(records, &criteria)), vec![1]);
    }

    #[test]
    fn max_rate_zero_is_a_real_constraint() {
        let mut records = ten_sitters();
        records[4].hourly_rate = 0.0;
        let criteria = SearchCriteria {
            max_rate: Some(0.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_rank(records, &criteria)), vec![5]);
    }

    #[test]
    fn max_rate_is_inclusive() {
        let records = vec![sitter(1, "Miami", 30.0, 4.0, 1)];
        let criteria = SearchCriteria {
            max_rate: Some(30.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_rank(records, &criteria)), vec![1]);
    }

    #[test]
    fn day_needed_is_case_sensitive() {
        let lower = SearchCriteria {
            day_needed: Some("monday".to_string()),
            ..Default::default()
        };
        assert!(filter_and_rank(ten_sitters(), &lower).is_no_matches());

        let exact = SearchCriteria {
            day_needed: Some("Monday".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_and_rank(ten_sitters(), &exact).matches().len(), 5);
    }

    #[test]
    fn membership_criteria_ignore_case() {
        let criteria = SearchCriteria {
            pet_type: Some("DOGS".to_string()),
            service: Some("Dog_Walking".to_string()),
            specialization: Some("SENIOR_PETS".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_and_rank(ten_sitters(), &criteria).matches().len(), 5);
    }

    #[test]
    fn membership_is_exact_not_substring() {
        let criteria = SearchCriteria {
            pet_type: Some("dog".to_string()),
            ..Default::default()
        };
        assert!(filter_and_rank(ten_sitters(), &criteria).is_no_matches());
    }

    #[test]
    fn empty_result_is_the_no_matches_sentinel() {
        let criteria = SearchCriteria {
            location: Some("Atlantis".to_string()),
            ..Default::default()
        };
        let outcome = filter_and_rank(ten_sitters(), &criteria);
        assert_eq!(outcome, SearchOutcome::no_matches());
    }

    #[test]
    fn short_result_is_not_the_sentinel() {
        let criteria = SearchCriteria {
            location: Some("miami".to_string()),
            ..Default::default()
        };
        let outcome = filter_and_rank(ten_sitters(), &criteria);
        assert!(!outcome.is_no_matches());
        assert_eq!(ids(&outcome), vec![3, 4]);
    }

    #[tokio::test]
    async fn search_reloads_store_on_every_call() {
        let store = MemoryStore::new(ten_sitters());
        let loads = store.loads.clone();
        let engine = SitterSearch::new(store);

        let first = engine.search(&SearchCriteria::default()).await.unwrap();
        let second = engine.search(&SearchCriteria::default()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn get_by_id_finds_record() {
        let engine = SitterSearch::new(MemoryStore::new(ten_sitters()));
        let record = engine.get_by_id(7).await.unwrap();
        assert_eq!(record.id, 7);
    }

    #[tokio::test]
    async fn get_by_id_returns_first_duplicate() {
        let mut records = ten_sitters();
        records.push(sitter(3, "Duplicate", 99.0, 1.0, 0));
        let engine = SitterSearch::new(MemoryStore::new(records));
        assert_eq!(engine.get_by_id(3).await.unwrap().location, "Miami");
    }

    #[tokio::test]
    async fn get_by_id_missing_is_not_found() {
        let engine = SitterSearch::new(MemoryStore::new(ten_sitters()));
        let err = engine.get_by_id(9999).await.unwrap_err();
        assert!(matches!(err, AgentError::NotFound { id: 9999 }));
    }

    #[tokio::test]
    async fn store_failure_is_propagated_not_swallowed() {
        let engine = SitterSearch::new(BrokenStore);
        let err = engine.search(&SearchCriteria::default()).await.unwrap_err();
        assert!(matches!(err, AgentError::DataUnavailable { .. }));
    }
}
