use super::common::*;
use crate::determination::dates::{DiagnosisOrder, PartialDate, SixtyDayGap, YearsApart};
use crate::determination::domain::{Behavior, DiagnosisDate};

#[test]
fn years_apart_is_unknown_without_usable_years() {
    let dates = comparator();
    let unknown = DiagnosisDate::unknown().partial();

    assert_eq!(dates.years_apart(&unknown, &on(2010, 1, 1), 5), YearsApart::Unknown);
    assert_eq!(
        dates.years_apart(&on(2010, 1, 1), &on(REFERENCE_YEAR + 1, 1, 1), 5),
        YearsApart::Unknown
    );
}

#[test]
fn years_apart_compares_year_gap_first() {
    let dates = comparator();

    assert_eq!(
        dates.years_apart(&date(2008, None, None), &date(2014, None, None), 5),
        YearsApart::Yes
    );
    assert_eq!(
        dates.years_apart(&date(2010, None, None), &date(2014, None, None), 5),
        YearsApart::No
    );
}

#[test]
fn years_apart_uses_months_when_gap_equals_threshold() {
    let dates = comparator();

    assert_eq!(
        dates.years_apart(&date(2010, Some(3), None), &date(2015, Some(5), None), 5),
        YearsApart::Yes
    );
    assert_eq!(
        dates.years_apart(&date(2015, Some(5), None), &date(2010, Some(3), None), 5),
        YearsApart::Yes
    );
    assert_eq!(
        dates.years_apart(&date(2010, Some(5), None), &date(2015, Some(3), None), 5),
        YearsApart::No
    );
    assert_eq!(
        dates.years_apart(&date(2010, None, None), &date(2015, Some(3), None), 5),
        YearsApart::Unknown
    );
}

#[test]
fn years_apart_uses_full_years_when_months_tie() {
    let dates = comparator();

    assert_eq!(dates.years_apart(&on(2010, 3, 10), &on(2015, 3, 10), 5), YearsApart::Yes);
    assert_eq!(dates.years_apart(&on(2010, 3, 11), &on(2015, 3, 10), 5), YearsApart::No);
    assert_eq!(
        dates.years_apart(&date(2010, Some(3), None), &on(2015, 3, 10), 5),
        YearsApart::Unknown
    );
}

#[test]
fn invalid_day_degrades_to_unknown_component() {
    let dates = comparator();
    let impossible = DiagnosisDate::new("2015", "02", "30").partial();

    assert_eq!(impossible.day(), None);
    assert_eq!(
        dates.years_apart(&on(2010, 2, 10), &impossible, 5),
        YearsApart::Unknown
    );
}

#[test]
fn sixty_days_uses_exact_difference_for_complete_dates() {
    let dates = comparator();

    assert_eq!(
        dates.days_apart_60(&on(2010, 1, 1), &on(2010, 3, 2), None),
        SixtyDayGap::Within
    );
    assert_eq!(
        dates.days_apart_60(&on(2010, 1, 1), &on(2010, 3, 3), None),
        SixtyDayGap::SecondLater
    );
    assert_eq!(
        dates.days_apart_60(&on(2010, 4, 5), &on(2010, 1, 1), None),
        SixtyDayGap::FirstLater
    );
}

#[test]
fn sixty_days_short_circuits_on_two_year_gap() {
    let dates = comparator();

    assert_eq!(
        dates.days_apart_60(&date(2010, None, None), &date(2012, None, None), None),
        SixtyDayGap::SecondLater
    );
    assert_eq!(
        dates.days_apart_60(&date(2013, None, None), &date(2011, Some(12), None), None),
        SixtyDayGap::FirstLater
    );
}

#[test]
fn sixty_days_is_unknown_for_same_year_without_months() {
    let dates = comparator();

    assert_eq!(
        dates.days_apart_60(&date(2015, None, None), &date(2015, None, None), None),
        SixtyDayGap::Unknown
    );
    assert_eq!(
        dates.days_apart_60(&date(2015, Some(4), None), &date(2015, None, None), None),
        SixtyDayGap::Unknown
    );
}

#[test]
fn sixty_days_bounds_partial_months() {
    let dates = comparator();

    assert_eq!(
        dates.days_apart_60(&date(2010, Some(5), None), &date(2010, Some(5), Some(20)), None),
        SixtyDayGap::Within
    );
    assert_eq!(
        dates.days_apart_60(&date(2010, Some(1), None), &date(2010, Some(2), None), None),
        SixtyDayGap::Within
    );
    assert_eq!(
        dates.days_apart_60(&date(2010, Some(1), None), &date(2010, Some(3), None), None),
        SixtyDayGap::Unknown
    );
    assert_eq!(
        dates.days_apart_60(&date(2010, Some(1), None), &date(2010, Some(6), None), None),
        SixtyDayGap::SecondLater
    );
}

#[test]
fn sixty_days_across_adjacent_years() {
    let dates = comparator();

    assert_eq!(
        dates.days_apart_60(&date(2010, Some(12), None), &date(2011, Some(1), None), None),
        SixtyDayGap::Unknown
    );
    assert_eq!(
        dates.days_apart_60(&date(2010, Some(12), Some(31)), &date(2011, Some(1), None), None),
        SixtyDayGap::Within
    );
    assert_eq!(
        dates.days_apart_60(&date(2010, Some(6), None), &date(2011, Some(3), None), None),
        SixtyDayGap::SecondLater
    );
}

#[test]
fn invasive_before_in_situ_is_never_apart() {
    let dates = comparator();
    let behaviors = Some((Behavior::Invasive, Behavior::InSitu));

    assert_eq!(
        dates.days_apart_60(&on(2010, 1, 1), &on(2010, 6, 1), behaviors),
        SixtyDayGap::Within
    );
    assert_eq!(
        dates.days_apart_60(&date(2010, None, None), &date(2013, None, None), behaviors),
        SixtyDayGap::Within
    );
    assert_eq!(
        dates.days_apart_60(&on(2010, 6, 1), &on(2010, 1, 1), behaviors),
        SixtyDayGap::FirstLater
    );
}

#[test]
fn diagnosis_order_uses_known_components() {
    let dates = comparator();

    assert_eq!(
        dates.diagnosis_order(&date(2010, Some(5), None), &date(2010, Some(3), Some(9))),
        DiagnosisOrder::FirstLater
    );
    assert_eq!(
        dates.diagnosis_order(&date(2009, None, None), &date(2010, None, None)),
        DiagnosisOrder::SecondLater
    );
    assert_eq!(
        dates.diagnosis_order(&date(2010, None, None), &date(2010, Some(3), None)),
        DiagnosisOrder::Unknown
    );
    assert_eq!(
        dates.diagnosis_order(&on(2010, 3, 9), &on(2010, 3, 9)),
        DiagnosisOrder::SameDay
    );
    assert_eq!(
        dates.diagnosis_order(&PartialDate::default(), &on(2010, 3, 9)),
        DiagnosisOrder::Unknown
    );
}
