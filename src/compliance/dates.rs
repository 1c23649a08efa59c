use time::{Date, Duration, Month};

/// Window before expiry in which a qualification is reported as expiring.
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Calendar-month addition with end-of-month clamping: 31 Jan + 1 month
/// lands on the last day of February.
pub fn add_months(date: Date, months: i32) -> Date {
    let zero_based = date.year() * 12 + (date.month() as i32 - 1) + months;
    let year = zero_based.div_euclid(12);
    let month =
        Month::try_from((zero_based.rem_euclid(12) + 1) as u8).expect("month index is 1-12");
    let day = date.day().min(time::util::days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).expect("clamped day is valid for target month")
}

pub fn expiring_soon_horizon(today: Date) -> Date {
    today + Duration::days(EXPIRING_SOON_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn add_months_same_day_when_it_exists() {
        assert_eq!(add_months(date!(2024 - 01 - 15), 12), date!(2025 - 01 - 15));
        assert_eq!(add_months(date!(2024 - 03 - 01), 6), date!(2024 - 09 - 01));
    }

    #[test]
    fn add_months_clamps_to_end_of_month() {
        // 2024 is a leap year
        assert_eq!(add_months(date!(2024 - 01 - 31), 1), date!(2024 - 02 - 29));
        assert_eq!(add_months(date!(2023 - 01 - 31), 1), date!(2023 - 02 - 28));
        assert_eq!(add_months(date!(2024 - 08 - 31), 1), date!(2024 - 09 - 30));
    }

    #[test]
    fn add_months_crosses_year_boundary() {
        assert_eq!(add_months(date!(2024 - 11 - 30), 3), date!(2025 - 02 - 28));
        assert_eq!(add_months(date!(2023 - 12 - 01), 1), date!(2024 - 01 - 01));
    }

    #[test]
    fn horizon_is_thirty_days_out() {
        assert_eq!(
            expiring_soon_horizon(date!(2024 - 06 - 01)),
            date!(2024 - 07 - 01)
        );
    }
}
