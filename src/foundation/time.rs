use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A point in time expressed as `value / rate` seconds.
///
/// Both components are `f64` so that rescaling between a video frame rate and an audio sample
/// rate never truncates. Equality and ordering compare the represented instant, so `1@24` equals
/// `2000@48000`.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct RationalTime {
    value: f64,
    rate: f64,
}

impl RationalTime {
    /// Create a time of `value` units at `rate` units per second.
    pub const fn new(value: f64, rate: f64) -> Self {
        Self { value, rate }
    }

    /// Create a time at rate `1.0` from a number of seconds.
    pub const fn from_seconds(seconds: f64) -> Self {
        Self::new(seconds, 1.0)
    }

    /// Value in units of [`RationalTime::rate`].
    pub fn value(self) -> f64 {
        self.value
    }

    /// Units per second.
    pub fn rate(self) -> f64 {
        self.rate
    }

    /// `false` for non-positive or non-finite rates and non-finite values.
    pub fn is_valid(self) -> bool {
        self.rate.is_finite() && self.rate > 0.0 && self.value.is_finite()
    }

    /// Express the same instant at `rate`.
    pub fn rescaled_to(self, rate: f64) -> Self {
        Self::new(self.value_rescaled_to(rate), rate)
    }

    /// The value this instant would have at `rate`.
    pub fn value_rescaled_to(self, rate: f64) -> f64 {
        if rate == self.rate {
            self.value
        } else {
            self.value * rate / self.rate
        }
    }

    /// Seconds since zero.
    pub fn to_seconds(self) -> f64 {
        self.value / self.rate
    }

    /// Whole frames at the time's own rate (fractional part dropped).
    pub fn to_frames(self) -> i64 {
        self.value as i64
    }

    /// Whole frames at `rate` (fractional part dropped).
    pub fn to_frames_at(self, rate: f64) -> i64 {
        self.value_rescaled_to(rate) as i64
    }

    /// Non-drop-frame `HH:MM:SS:FF` timecode, or `None` for invalid or negative times.
    pub fn to_timecode(self) -> Option<String> {
        if !self.is_valid() || self.value < 0.0 {
            return None;
        }
        let nominal = self.rate.round() as i64;
        if nominal <= 0 {
            return None;
        }
        let frames = self.value.round() as i64;
        let ff = frames % nominal;
        let total_secs = frames / nominal;
        let ss = total_secs % 60;
        let mm = (total_secs / 60) % 60;
        let hh = total_secs / 3600;
        Some(format!("{hh:02}:{mm:02}:{ss:02}:{ff:02}"))
    }
}

impl PartialEq for RationalTime {
    fn eq(&self, other: &Self) -> bool {
        self.value_rescaled_to(other.rate) == other.value
    }
}

impl PartialOrd for RationalTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.rate == other.rate {
            self.value.partial_cmp(&other.value)
        } else {
            self.to_seconds().partial_cmp(&other.to_seconds())
        }
    }
}

impl Add for RationalTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        if self.rate >= rhs.rate {
            Self::new(self.value + rhs.value_rescaled_to(self.rate), self.rate)
        } else {
            Self::new(self.value_rescaled_to(rhs.rate) + rhs.value, rhs.rate)
        }
    }
}

impl AddAssign for RationalTime {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for RationalTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        if self.rate >= rhs.rate {
            Self::new(self.value - rhs.value_rescaled_to(self.rate), self.rate)
        } else {
            Self::new(self.value_rescaled_to(rhs.rate) - rhs.value, rhs.rate)
        }
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.value, self.rate)
    }
}

/// A span of time: `start` plus `duration`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    start: RationalTime,
    duration: RationalTime,
}

impl TimeRange {
    /// Create a range starting at `start` lasting `duration`.
    pub const fn new(start: RationalTime, duration: RationalTime) -> Self {
        Self { start, duration }
    }

    /// Create a range covering `start..=end_inclusive` at the end time's rate.
    pub fn from_start_end_inclusive(start: RationalTime, end_inclusive: RationalTime) -> Self {
        let duration = end_inclusive - start + RationalTime::new(1.0, end_inclusive.rate());
        Self::new(start, duration.rescaled_to(end_inclusive.rate()))
    }

    /// Inclusive start.
    pub fn start_time(self) -> RationalTime {
        self.start
    }

    /// Duration.
    pub fn duration(self) -> RationalTime {
        self.duration
    }

    /// First instant past the range, at the duration's rate.
    pub fn end_time_exclusive(self) -> RationalTime {
        RationalTime::new(
            self.start.value_rescaled_to(self.duration.rate()) + self.duration.value(),
            self.duration.rate(),
        )
    }

    /// Last whole unit inside the range.
    ///
    /// Ranges shorter than one unit collapse to their start.
    pub fn end_time_inclusive(self) -> RationalTime {
        let end = self.end_time_exclusive();
        let span = end.value() - self.start.value_rescaled_to(self.duration.rate());
        if span > 1.0 {
            if self.duration.value() != self.duration.value().floor() {
                RationalTime::new(end.value().floor(), end.rate())
            } else {
                end - RationalTime::new(1.0, self.duration.rate())
            }
        } else {
            self.start
        }
    }

    /// `true` when `start <= time < end_exclusive`.
    pub fn contains(self, time: RationalTime) -> bool {
        self.start <= time && time < self.end_time_exclusive()
    }

    /// Express the same span with start and duration at `rate`.
    pub fn rescaled_to(self, rate: f64) -> Self {
        Self::new(self.start.rescaled_to(rate), self.duration.rescaled_to(rate))
    }

    /// `false` when either bound is invalid or the duration is negative.
    pub fn is_valid(self) -> bool {
        self.start.is_valid() && self.duration.is_valid() && self.duration.value() >= 0.0
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} +{}]", self.start, self.duration)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/time.rs"]
mod tests;
