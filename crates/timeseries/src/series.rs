//! Ordered time-series of events sharing one metadata instance.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::TimeSeriesError;
use crate::event::Event;
use crate::metadata::TimeSeriesMetadata;
use crate::scale::TimeScale;

/// An ordered set of events with one metadata instance.
///
/// Events are strictly ascending by valid time; no two events share a valid
/// time. A series with zero events is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    metadata: TimeSeriesMetadata,
    events: Vec<Event<T>>,
}

impl<T> TimeSeries<T> {
    /// Creates a series, sorting the events by valid time.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::DuplicateEvent`] if two events share a
    /// valid time.
    pub fn new(
        metadata: TimeSeriesMetadata,
        mut events: Vec<Event<T>>,
    ) -> Result<Self, TimeSeriesError> {
        events.sort_by_key(|e| e.time());
        if let Some(w) = events.windows(2).find(|w| w[0].time() == w[1].time()) {
            return Err(TimeSeriesError::DuplicateEvent { time: w[0].time() });
        }
        Ok(Self { metadata, events })
    }

    /// Creates an empty series.
    pub fn empty(metadata: TimeSeriesMetadata) -> Self {
        Self {
            metadata,
            events: Vec::new(),
        }
    }

    /// Builds a series from events already known to be strictly ascending.
    pub(crate) fn from_sorted(metadata: TimeSeriesMetadata, events: Vec<Event<T>>) -> Self {
        debug_assert!(events.windows(2).all(|w| w[0].time() < w[1].time()));
        Self { metadata, events }
    }

    /// Returns a builder for the given metadata.
    pub fn builder(metadata: TimeSeriesMetadata) -> TimeSeriesBuilder<T> {
        TimeSeriesBuilder {
            metadata,
            events: BTreeMap::new(),
        }
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &TimeSeriesMetadata {
        &self.metadata
    }

    /// Returns the events in ascending valid-time order.
    pub fn events(&self) -> &[Event<T>] {
        &self.events
    }

    /// Returns the declared time scale.
    pub fn time_scale(&self) -> Option<TimeScale> {
        self.metadata.time_scale()
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` when the series has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the valid times in ascending order.
    pub fn valid_times(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.events.iter().map(Event::time)
    }

    /// Returns the first valid time.
    pub fn first_time(&self) -> Option<DateTime<Utc>> {
        self.events.first().map(Event::time)
    }

    /// Returns the last valid time.
    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.events.last().map(Event::time)
    }

    /// Returns the event at exactly `time`.
    pub fn event_at(&self, time: DateTime<Utc>) -> Option<&Event<T>> {
        self.events
            .binary_search_by_key(&time, Event::time)
            .ok()
            .map(|i| &self.events[i])
    }

    /// Returns a copy with a replaced time scale.
    pub fn with_time_scale(self, time_scale: Option<TimeScale>) -> Self {
        Self {
            metadata: self.metadata.with_time_scale(time_scale),
            events: self.events,
        }
    }

    /// Returns a copy with replaced metadata.
    pub fn with_metadata(self, metadata: TimeSeriesMetadata) -> Self {
        Self {
            metadata,
            events: self.events,
        }
    }

    /// Keeps the events that satisfy `keep`.
    pub fn filter_events(self, mut keep: impl FnMut(&Event<T>) -> bool) -> Self {
        let events = self.events.into_iter().filter(|e| keep(e)).collect();
        Self {
            metadata: self.metadata,
            events,
        }
    }

    /// Maps every value, keeping valid times and metadata.
    pub fn map_values<U>(self, mut f: impl FnMut(T) -> U) -> TimeSeries<U> {
        TimeSeries {
            metadata: self.metadata,
            events: self.events.into_iter().map(|e| e.map(&mut f)).collect(),
        }
    }

    /// Splits the series into its parts.
    pub fn into_parts(self) -> (TimeSeriesMetadata, Vec<Event<T>>) {
        (self.metadata, self.events)
    }
}

/// Accumulates events for a [`TimeSeries`].
///
/// Adding an event at an existing valid time replaces nothing and is reported
/// as an error on [`build`](Self::build).
#[derive(Debug)]
pub struct TimeSeriesBuilder<T> {
    metadata: TimeSeriesMetadata,
    events: BTreeMap<DateTime<Utc>, Vec<T>>,
}

impl<T> TimeSeriesBuilder<T> {
    /// Adds an event.
    pub fn add_event(&mut self, event: Event<T>) -> &mut Self {
        let time = event.time();
        self.events.entry(time).or_default().push(event.into_value());
        self
    }

    /// Adds an event by parts.
    pub fn add(&mut self, time: DateTime<Utc>, value: T) -> &mut Self {
        self.add_event(Event::new(time, value))
    }

    /// Returns the number of distinct valid times added so far.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events were added.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Builds the series.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::DuplicateEvent`] if two events were added at
    /// the same valid time.
    pub fn build(self) -> Result<TimeSeries<T>, TimeSeriesError> {
        let mut events = Vec::with_capacity(self.events.len());
        for (time, mut values) in self.events {
            if values.len() > 1 {
                return Err(TimeSeriesError::DuplicateEvent { time });
            }
            if let Some(value) = values.pop() {
                events.push(Event::new(time, value));
            }
        }
        Ok(TimeSeries::from_sorted(self.metadata, events))
    }
}
