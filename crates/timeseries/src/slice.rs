//! Slicing helpers: snipping, grouping and ordering of time-series.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

use crate::event::Event;
use crate::series::TimeSeries;
use crate::window::TimeWindow;

/// Keeps the events of `series` that fall within `window`.
///
/// An event is kept when its valid time lies within the valid bounds. A series
/// with reference times is emptied unless its reference times lie within the
/// reference bounds. When the series has a `T0` reference time, the lead
/// duration `valid - T0` must also lie within the lead bounds.
pub fn snip_to_window<T>(series: TimeSeries<T>, window: &TimeWindow) -> TimeSeries<T> {
    let meta = series.metadata();
    if meta
        .reference_times()
        .values()
        .any(|&r| !window.contains_reference_time(r))
    {
        trace!(series = %meta, %window, "reference times outside window");
        return series.filter_events(|_| false);
    }

    let t0 = meta.t0();
    series.filter_events(|e| {
        let valid = e.time();
        if !window.contains_valid_time(valid) {
            return false;
        }
        match t0 {
            Some(t0) => window.contains_lead_duration(valid.signed_duration_since(t0)),
            None => true,
        }
    })
}

/// Keeps the events of `to_snip` within the span of `template`, widened by the
/// buffers: `[first - lower_buffer, last + upper_buffer]`.
///
/// An empty template returns `to_snip` unchanged.
pub fn snip_to_series<S, T>(
    to_snip: TimeSeries<S>,
    template: &TimeSeries<T>,
    lower_buffer: TimeDelta,
    upper_buffer: TimeDelta,
) -> TimeSeries<S> {
    let (Some(first), Some(last)) = (template.first_time(), template.last_time()) else {
        return to_snip;
    };
    let lower = first
        .checked_sub_signed(lower_buffer)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let upper = last
        .checked_add_signed(upper_buffer)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    to_snip.filter_events(|e| e.time() >= lower && e.time() <= upper)
}

/// Groups events into the right-closed intervals `(end - period, end]`.
///
/// Every end time appears in the result, with an empty group when no events
/// fall within its interval. Intervals may overlap, in which case an event is
/// placed in every interval that contains it.
pub fn group_events_by_interval<'a, T>(
    events: &'a [Event<T>],
    end_times: impl IntoIterator<Item = DateTime<Utc>>,
    period: TimeDelta,
) -> BTreeMap<DateTime<Utc>, &'a [Event<T>]> {
    let mut groups = BTreeMap::new();
    for end in end_times {
        let start = end
            .checked_sub_signed(period)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        // Events are sorted, so the interval is a contiguous slice.
        let lo = events.partition_point(|e| e.time() <= start);
        let hi = events.partition_point(|e| e.time() <= end);
        groups.insert(end, &events[lo..hi.max(lo)]);
    }
    groups
}

/// Sorts series by first reference time, then by first valid time.
///
/// Series without reference times sort before those with them.
pub fn sort_in_time_order<T>(series: &mut [TimeSeries<T>]) {
    series.sort_by(|a, b| {
        a.metadata()
            .first_reference_time()
            .cmp(&b.metadata().first_reference_time())
            .then_with(|| a.first_time().cmp(&b.first_time()))
            .then_with(|| a.metadata().feature().cmp(b.metadata().feature()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Feature;
    use crate::metadata::{ReferenceTimeType, TimeSeriesMetadata};
    use chrono::TimeZone;

    fn t(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + TimeDelta::hours(h)
    }

    fn hourly(from: i64, to: i64, meta: TimeSeriesMetadata) -> TimeSeries<f64> {
        let events = (from..=to).map(|h| Event::new(t(h), h as f64)).collect();
        TimeSeries::new(meta, events).unwrap()
    }

    fn meta() -> TimeSeriesMetadata {
        TimeSeriesMetadata::new("QINE", Feature::new("DRRC2"), "CMS")
    }

    #[test]
    fn snip_to_window_by_lead() {
        let forecast = hourly(1, 12, meta().with_reference_time(ReferenceTimeType::T0, t(0)));
        let window = TimeWindow::unbounded()
            .with_lead_durations(TimeDelta::hours(3), TimeDelta::hours(6));
        let snipped = snip_to_window(forecast, &window);
        let times: Vec<_> = snipped.valid_times().collect();
        assert_eq!(times, vec![t(4), t(5), t(6)]);
    }

    #[test]
    fn snip_to_window_by_valid_time() {
        let obs = hourly(0, 10, meta());
        let window = TimeWindow::unbounded().with_valid_times(t(2), t(4));
        let snipped = snip_to_window(obs, &window);
        assert_eq!(snipped.len(), 2);
    }

    #[test]
    fn snip_to_window_drops_out_of_bounds_reference_time() {
        let forecast = hourly(1, 3, meta().with_reference_time(ReferenceTimeType::T0, t(0)));
        let window = TimeWindow::unbounded().with_reference_times(t(0), t(6));
        assert!(snip_to_window(forecast, &window).is_empty());
    }

    #[test]
    fn snip_to_series_with_buffer() {
        let obs = hourly(0, 20, meta());
        let template = hourly(6, 9, meta());
        let snipped = snip_to_series(obs, &template, TimeDelta::hours(3), TimeDelta::zero());
        assert_eq!(snipped.first_time(), Some(t(3)));
        assert_eq!(snipped.last_time(), Some(t(9)));
    }

    #[test]
    fn snip_to_empty_template_is_identity() {
        let obs = hourly(0, 5, meta());
        let template: TimeSeries<f64> = TimeSeries::empty(meta());
        let snipped = snip_to_series(obs.clone(), &template, TimeDelta::zero(), TimeDelta::zero());
        assert_eq!(snipped, obs);
    }

    #[test]
    fn group_is_right_closed() {
        let obs = hourly(0, 6, meta());
        let groups = group_events_by_interval(obs.events(), [t(3), t(6)], TimeDelta::hours(3));
        let first: Vec<_> = groups[&t(3)].iter().map(Event::time).collect();
        let second: Vec<_> = groups[&t(6)].iter().map(Event::time).collect();
        assert_eq!(first, vec![t(1), t(2), t(3)]);
        assert_eq!(second, vec![t(4), t(5), t(6)]);
    }

    #[test]
    fn group_keeps_empty_intervals() {
        let obs = hourly(0, 2, meta());
        let groups = group_events_by_interval(obs.events(), [t(10)], TimeDelta::hours(1));
        assert!(groups[&t(10)].is_empty());
    }

    #[test]
    fn sort_orders_by_reference_time() {
        let late = hourly(25, 26, meta().with_reference_time(ReferenceTimeType::T0, t(24)));
        let early = hourly(1, 2, meta().with_reference_time(ReferenceTimeType::T0, t(0)));
        let mut all = vec![late, early];
        sort_in_time_order(&mut all);
        assert_eq!(all[0].first_time(), Some(t(1)));
    }
}
