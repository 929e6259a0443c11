use super::*;

#[test]
fn rescale_keeps_fractional_values() {
    let t = RationalTime::new(1.0, 24.0).rescaled_to(48_000.0);
    assert_eq!(t.value(), 2000.0);

    let t = RationalTime::new(1.0, 30_000.0 / 1001.0).rescaled_to(24.0);
    assert!(t.value().fract() > 0.0);
}

#[test]
fn equality_and_ordering_compare_instants() {
    assert_eq!(
        RationalTime::new(1.0, 24.0),
        RationalTime::new(2000.0, 48_000.0)
    );
    assert!(RationalTime::new(25.0, 24.0) > RationalTime::new(1.0, 1.0));
    assert!(RationalTime::new(110.0, 24.0) > RationalTime::new(109.0, 24.0));
}

#[test]
fn addition_uses_the_finer_rate() {
    let t = RationalTime::new(1.0, 24.0) + RationalTime::new(1000.0, 48_000.0);
    assert_eq!(t.rate(), 48_000.0);
    assert_eq!(t.value(), 3000.0);
}

#[test]
fn inclusive_end_of_whole_frame_range() {
    let r = TimeRange::new(RationalTime::new(100.0, 24.0), RationalTime::new(10.0, 24.0));
    assert_eq!(r.end_time_exclusive(), RationalTime::new(110.0, 24.0));
    assert_eq!(r.end_time_inclusive(), RationalTime::new(109.0, 24.0));
    assert!(r.contains(RationalTime::new(109.0, 24.0)));
    assert!(!r.contains(RationalTime::new(110.0, 24.0)));
    assert!(!r.contains(RationalTime::new(99.0, 24.0)));
}

#[test]
fn single_frame_range_ends_at_its_start() {
    let r = TimeRange::new(RationalTime::new(7.0, 24.0), RationalTime::new(1.0, 24.0));
    assert_eq!(r.end_time_inclusive(), RationalTime::new(7.0, 24.0));
}

#[test]
fn from_start_end_inclusive_round_trips_the_end() {
    let r = TimeRange::from_start_end_inclusive(
        RationalTime::new(100.0, 24.0),
        RationalTime::new(109.0, 24.0),
    );
    assert_eq!(r.duration(), RationalTime::new(10.0, 24.0));
    assert_eq!(r.end_time_inclusive(), RationalTime::new(109.0, 24.0));
}

#[test]
fn timecode_is_non_drop_frame() {
    assert_eq!(
        RationalTime::new(86_400.0 + 25.0, 24.0).to_timecode().as_deref(),
        Some("01:00:01:01")
    );
    assert_eq!(RationalTime::new(-1.0, 24.0).to_timecode(), None);
    assert_eq!(RationalTime::new(1.0, 0.0).to_timecode(), None);
}
