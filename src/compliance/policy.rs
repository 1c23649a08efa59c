use time::Date;

use super::dates::add_months;
use crate::db::TopicState;

/// Inclusive pass threshold. Applied once at record creation; the stored
/// flag is what the status engine reads afterwards, so the two must never
/// diverge.
pub fn is_pass(score_achieved: i32, pass_mark: i32) -> bool {
    score_achieved >= pass_mark
}

/// Expiry of a qualifying event after the module's refresher period.
pub fn expiry_after(event_date: Date, refresher_months: i32) -> Date {
    add_months(event_date, refresher_months)
}

/// Expiry snapshot for a scored attempt. Failed attempts never qualified,
/// so they carry no expiry.
pub fn assessment_expiry(
    assessment_date: Date,
    refresher_months: i32,
    passed: bool,
) -> Option<Date> {
    passed.then(|| expiry_after(assessment_date, refresher_months))
}

/// A session counts as complete when the checklist is non-empty and no
/// topic was left not-covered. Not-applicable entries satisfy the check.
pub fn all_topics_covered(topics: &[TopicState]) -> bool {
    !topics.is_empty() && topics.iter().all(|t| *t != TopicState::NotCovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn pass_mark_is_inclusive() {
        assert!(is_pass(7, 7));
        assert!(is_pass(10, 7));
        assert!(!is_pass(6, 7));
    }

    #[test]
    fn failed_attempts_have_no_expiry() {
        assert_eq!(assessment_expiry(date!(2024 - 01 - 15), 12, false), None);
        assert_eq!(
            assessment_expiry(date!(2024 - 01 - 15), 12, true),
            Some(date!(2025 - 01 - 15))
        );
    }

    #[test]
    fn not_applicable_topics_count_as_satisfied() {
        use TopicState::*;
        assert!(all_topics_covered(&[Covered, NotApplicable, Covered]));
        assert!(!all_topics_covered(&[Covered, NotCovered, NotApplicable]));
        assert!(all_topics_covered(&[NotApplicable, NotApplicable]));
    }

    #[test]
    fn empty_checklist_is_not_covered() {
        assert!(!all_topics_covered(&[]));
    }
}
