//! Record filtering and bucket aggregation.
//!
//! Every function here is pure: it takes the records it needs and
//! returns freshly computed values. Nothing is cached between calls.

use crate::analysis::classify::Classifier;
use crate::models::{BucketCount, FilterState, Kpis, Record, Selection};
use std::collections::{BTreeSet, HashSet};

/// Keep the records accepted by `filter`, in input order.
pub fn filter_records<'a, I>(records: I, filter: &FilterState) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|record| filter.accepts(record))
        .collect()
}

/// Count records per bucket of `classifier`.
///
/// Buckets come back in the classifier's own order. Unclassified records
/// and empty buckets are left out.
pub fn count_by_scheme<C>(records: &[&Record], classifier: &C) -> Vec<BucketCount>
where
    C: Classifier + ?Sized,
{
    let buckets = classifier.buckets();
    let mut counts = vec![0usize; buckets.len()];

    for record in records {
        let Some(label) = classifier.classify(record) else {
            continue;
        };
        if let Some(slot) = buckets.iter().position(|bucket| *bucket == label) {
            counts[slot] += 1;
        }
    }

    buckets
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| BucketCount::new(*label, count))
        .collect()
}

/// Total records and distinct non-empty bank names.
pub fn kpis(records: &[&Record]) -> Kpis {
    let banks: HashSet<&str> = records
        .iter()
        .map(|record| record.bank.as_str())
        .filter(|bank| !bank.is_empty())
        .collect();

    Kpis {
        total: records.len(),
        banks: banks.len(),
    }
}

/// Sorted distinct city names across the whole dataset.
pub fn city_options(records: &[Record]) -> Vec<String> {
    distinct_sorted(records.iter().map(|record| record.city.as_str()))
}

/// Sorted distinct bank names within the city scope.
pub fn bank_options(records: &[Record], city: &Selection) -> Vec<String> {
    distinct_sorted(
        records
            .iter()
            .filter(|record| city.matches(&record.city))
            .map(|record| record.bank.as_str()),
    )
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classify::{
        Accessibility, InstallType, ServiceHours, ACCESS_BOTH, ACCESS_NONE, ACCESS_WHEELCHAIR,
        INSTALL_INSIDE, SERVICE_24H, SERVICE_EXTENDED,
    };
    use crate::models::testing::{record, with_flags, with_install_type, with_service};

    fn sample() -> Vec<Record> {
        vec![
            with_service("台北市", "A銀行", "9"),
            with_service("台北市", "B銀行", "E"),
            with_service("新北市", "A銀行", "9"),
        ]
    }

    #[test]
    fn test_filter_by_city_counts_service_hours() {
        let records = sample();
        let filtered = filter_records(&records, &FilterState::new("台北市", "all"));

        assert_eq!(filtered.len(), 2);

        let counts = count_by_scheme(&filtered, &ServiceHours);
        assert_eq!(
            counts,
            vec![
                BucketCount::new(SERVICE_24H, 1),
                BucketCount::new(SERVICE_EXTENDED, 1),
            ]
        );
    }

    #[test]
    fn test_filter_by_city_and_bank() {
        let records = sample();

        let filtered = filter_records(&records, &FilterState::new("all", "A銀行"));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.bank == "A銀行"));

        let filtered = filter_records(&records, &FilterState::new("新北市", "A銀行"));
        assert_eq!(filtered.len(), 1);

        let filtered = filter_records(&records, &FilterState::new("新北市", "B銀行"));
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_all_keeps_everything_in_order() {
        let records = sample();
        let filtered = filter_records(&records, &FilterState::default());

        assert_eq!(filtered.len(), records.len());
        for (kept, original) in filtered.iter().zip(&records) {
            assert!(std::ptr::eq(*kept, original));
        }
    }

    #[test]
    fn test_filter_preserves_relative_order() {
        let records = vec![
            record("台北市", "C銀行"),
            record("新北市", "A銀行"),
            record("台北市", "A銀行"),
            record("台北市", "B銀行"),
        ];
        let filtered = filter_records(&records, &FilterState::new("台北市", "all"));

        let banks: Vec<&str> = filtered.iter().map(|r| r.bank.as_str()).collect();
        assert_eq!(banks, vec!["C銀行", "A銀行", "B銀行"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = sample();
        let filter = FilterState::new("台北市", "A銀行");

        let once = filter_records(&records, &filter);
        let twice = filter_records(once.iter().copied(), &filter);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_exact_match_only() {
        let records = vec![record("臺北市", "A銀行"), record("台北市", "A銀行")];
        let filtered = filter_records(&records, &FilterState::new("台北市", "all"));

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].city, "台北市");
    }

    #[test]
    fn test_zero_count_buckets_dropped() {
        let records = vec![with_service("台北市", "A銀行", "9")];
        let refs: Vec<&Record> = records.iter().collect();

        let counts = count_by_scheme(&refs, &ServiceHours);
        assert_eq!(counts, vec![BucketCount::new(SERVICE_24H, 1)]);
        assert!(counts.iter().all(|b| b.count > 0));
    }

    #[test]
    fn test_service_hours_drops_unknown_codes() {
        let records = vec![
            with_service("台北市", "A銀行", "9"),
            with_service("台北市", "A銀行", "X"),
            with_service("台北市", "A銀行", ""),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let counts = count_by_scheme(&refs, &ServiceHours);
        let total: usize = counts.iter().map(|b| b.count).sum();
        assert_eq!(total, 1);
        assert!(total < refs.len());
    }

    #[test]
    fn test_accessibility_total_equals_record_count() {
        let records = vec![
            with_flags("V", ""),
            with_flags("V", "V"),
            with_flags("", ""),
            with_flags("", "V"),
            with_flags("x", "y"),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let counts = count_by_scheme(&refs, &Accessibility);
        let total: usize = counts.iter().map(|b| b.count).sum();
        assert_eq!(total, refs.len());
        assert_eq!(
            counts,
            vec![
                BucketCount::new(ACCESS_WHEELCHAIR, 1),
                BucketCount::new(ACCESS_BOTH, 1),
                BucketCount::new(ACCESS_NONE, 3),
            ]
        );
    }

    #[test]
    fn test_install_type_may_drop_records() {
        let records = vec![
            with_install_type("1"),
            with_install_type("1"),
            with_install_type("9"),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let counts = count_by_scheme(&refs, &InstallType);
        assert_eq!(counts, vec![BucketCount::new(INSTALL_INSIDE, 2)]);
    }

    #[test]
    fn test_empty_input_yields_empty_buckets() {
        assert!(count_by_scheme(&[], &ServiceHours).is_empty());
        assert!(count_by_scheme(&[], &Accessibility).is_empty());
        assert!(count_by_scheme(&[], &InstallType).is_empty());
        assert_eq!(kpis(&[]), Kpis::default());
    }

    #[test]
    fn test_count_by_scheme_accepts_trait_objects() {
        let records = sample();
        let refs: Vec<&Record> = records.iter().collect();
        let classifier: &dyn Classifier = &ServiceHours;

        let counts = count_by_scheme(&refs, classifier);
        assert_eq!(counts[0], BucketCount::new(SERVICE_24H, 2));
    }

    #[test]
    fn test_kpis_count_distinct_non_empty_banks() {
        let records = vec![
            record("台北市", "A銀行"),
            record("台北市", "A銀行"),
            record("台北市", "B銀行"),
            record("台北市", ""),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        assert_eq!(kpis(&refs), Kpis { total: 4, banks: 2 });
    }

    #[test]
    fn test_city_options_sorted_and_distinct() {
        let records = vec![
            record("新北市", "A銀行"),
            record("台北市", "B銀行"),
            record("", "C銀行"),
            record("新北市", "D銀行"),
        ];

        assert_eq!(city_options(&records), vec!["台北市", "新北市"]);
    }

    #[test]
    fn test_bank_options_scoped_by_city() {
        let records = vec![
            record("台北市", "B銀行"),
            record("台北市", "A銀行"),
            record("新北市", "C銀行"),
            record("台北市", "A銀行"),
        ];

        assert_eq!(
            bank_options(&records, &Selection::All),
            vec!["A銀行", "B銀行", "C銀行"]
        );
        assert_eq!(
            bank_options(&records, &Selection::from("台北市")),
            vec!["A銀行", "B銀行"]
        );
        assert!(bank_options(&records, &Selection::from("高雄市")).is_empty());
    }
}
