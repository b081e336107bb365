//! Per-record classifiers backing the bar, pie and treemap charts.
//!
//! A classifier maps one record to one of a fixed set of bucket labels, or
//! to nothing when the record falls outside every tracked bucket. Records
//! that map to nothing are dropped from that chart, never reported as an
//! error.

use crate::models::Record;

/// Marker used by the dataset for a set accessibility flag.
const FLAG_SET: &str = "V";

/// Maps a record to one of a fixed list of chart buckets.
pub trait Classifier {
    /// Every label this classifier can produce, in chart order.
    fn buckets(&self) -> &'static [&'static str];

    /// The bucket `record` belongs to, or `None` when it is unclassified.
    fn classify(&self, record: &Record) -> Option<&'static str>;
}

/// Bucket for ATMs open around the clock.
pub const SERVICE_24H: &str = "24小時";
/// Bucket for ATMs open 9:00 to 22:00.
pub const SERVICE_EXTENDED: &str = "9:00–22:00";
/// Bucket for ATMs open during banking hours.
pub const SERVICE_BANKING_HOURS: &str = "9:00–15:30";

/// Service hours, from the `服務型態` code.
///
/// Only `9`, `E` and `N` are tracked. Every other code, blank included,
/// belongs to an implicit "other" group that this chart does not show.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceHours;

impl Classifier for ServiceHours {
    fn buckets(&self) -> &'static [&'static str] {
        &[SERVICE_24H, SERVICE_EXTENDED, SERVICE_BANKING_HOURS]
    }

    fn classify(&self, record: &Record) -> Option<&'static str> {
        match record.service_code.trim() {
            "9" => Some(SERVICE_24H),
            "E" => Some(SERVICE_EXTENDED),
            "N" => Some(SERVICE_BANKING_HOURS),
            _ => None,
        }
    }
}

/// Bucket for wheelchair access without voice guidance.
pub const ACCESS_WHEELCHAIR: &str = "輪椅友善";
/// Bucket for wheelchair access plus voice guidance.
pub const ACCESS_BOTH: &str = "輪椅+視障友善";
/// Bucket for everything else.
pub const ACCESS_NONE: &str = "無障礙皆無";

/// Accessibility combination of the two dataset flags.
///
/// The split is three-way and keyed on the wheelchair flag first: an ATM
/// with voice guidance but no wheelchair access lands in [`ACCESS_NONE`].
/// Every record is classified, so the bucket total always equals the
/// number of records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accessibility;

impl Accessibility {
    fn flag(value: &str) -> bool {
        value.trim() == FLAG_SET
    }
}

impl Classifier for Accessibility {
    fn buckets(&self) -> &'static [&'static str] {
        &[ACCESS_WHEELCHAIR, ACCESS_BOTH, ACCESS_NONE]
    }

    fn classify(&self, record: &Record) -> Option<&'static str> {
        let wheelchair = Self::flag(&record.wheelchair_flag);
        let blind = Self::flag(&record.blind_flag);

        match (wheelchair, blind) {
            (true, false) => Some(ACCESS_WHEELCHAIR),
            (true, true) => Some(ACCESS_BOTH),
            // Blind-only shares the "neither" bucket.
            (false, _) => Some(ACCESS_NONE),
        }
    }
}

/// Bucket for ATMs inside a bank branch.
pub const INSTALL_INSIDE: &str = "銀行內";
/// Bucket for ATMs outside a bank branch.
pub const INSTALL_OUTSIDE: &str = "銀行外";

/// Install type, from the `裝設型態` code (`1` inside, `2` outside).
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallType;

impl Classifier for InstallType {
    fn buckets(&self) -> &'static [&'static str] {
        &[INSTALL_INSIDE, INSTALL_OUTSIDE]
    }

    fn classify(&self, record: &Record) -> Option<&'static str> {
        match record.install_type.trim() {
            "1" => Some(INSTALL_INSIDE),
            "2" => Some(INSTALL_OUTSIDE),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::{with_flags, with_install_type, with_service};

    #[test]
    fn test_service_hours_codes() {
        let classifier = ServiceHours;
        let classify = |code: &str| classifier.classify(&with_service("台北市", "A銀行", code));

        assert_eq!(classify("9"), Some(SERVICE_24H));
        assert_eq!(classify("E"), Some(SERVICE_EXTENDED));
        assert_eq!(classify("N"), Some(SERVICE_BANKING_HOURS));
        assert_eq!(classify(" 9 "), Some(SERVICE_24H));
    }

    #[test]
    fn test_service_hours_other_codes_are_unclassified() {
        let classifier = ServiceHours;
        for code in ["", "X", "e", "24", "其他"] {
            assert_eq!(
                classifier.classify(&with_service("台北市", "A銀行", code)),
                None,
                "code {code:?} should be dropped"
            );
        }
    }

    #[test]
    fn test_accessibility_truth_table() {
        let classifier = Accessibility;

        assert_eq!(classifier.classify(&with_flags("V", "")), Some(ACCESS_WHEELCHAIR));
        assert_eq!(classifier.classify(&with_flags("V", "V")), Some(ACCESS_BOTH));
        assert_eq!(classifier.classify(&with_flags("", "")), Some(ACCESS_NONE));
    }

    #[test]
    fn test_accessibility_blind_only_shares_neither_bucket() {
        let classifier = Accessibility;

        let blind_only = classifier.classify(&with_flags("", "V"));
        let neither = classifier.classify(&with_flags("", ""));

        assert_eq!(blind_only, Some(ACCESS_NONE));
        assert_eq!(blind_only, neither);
    }

    #[test]
    fn test_accessibility_flag_must_be_v() {
        let classifier = Accessibility;

        assert_eq!(classifier.classify(&with_flags(" V ", "")), Some(ACCESS_WHEELCHAIR));
        assert_eq!(classifier.classify(&with_flags("v", "")), Some(ACCESS_NONE));
        assert_eq!(classifier.classify(&with_flags("Y", "V")), Some(ACCESS_NONE));
    }

    #[test]
    fn test_install_type_codes() {
        let classifier = InstallType;

        assert_eq!(classifier.classify(&with_install_type("1")), Some(INSTALL_INSIDE));
        assert_eq!(classifier.classify(&with_install_type("2")), Some(INSTALL_OUTSIDE));
        assert_eq!(classifier.classify(&with_install_type("3")), None);
        assert_eq!(classifier.classify(&with_install_type("")), None);
    }

    #[test]
    fn test_classifiers_only_produce_declared_buckets() {
        let records = [
            with_service("台北市", "A銀行", "9"),
            with_service("台北市", "A銀行", "N"),
            with_flags("V", "V"),
            with_flags("", "V"),
            with_install_type("1"),
            with_install_type("2"),
        ];

        for record in &records {
            if let Some(label) = ServiceHours.classify(record) {
                assert!(ServiceHours.buckets().contains(&label));
            }
            if let Some(label) = Accessibility.classify(record) {
                assert!(Accessibility.buckets().contains(&label));
            }
            if let Some(label) = InstallType.classify(record) {
                assert!(InstallType.buckets().contains(&label));
            }
        }
    }
}
