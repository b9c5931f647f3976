use chrono::{DateTime, Duration, Utc};

use crate::predict::types::PassRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationSample {
    pub time: DateTime<Utc>,
    pub elevation_deg: f64,
}

/// Running totals for a pass that has started but not yet ended.
#[derive(Debug, Clone, PartialEq)]
pub struct PassAccumulator {
    pub start: DateTime<Utc>,
    pub max_elevation_deg: f64,
    pub max_elevation_time: DateTime<Utc>,
    pub duration_seconds: f64,
}

impl PassAccumulator {
    fn into_record(self) -> PassRecord {
        PassRecord {
            start: self.start,
            max_elevation_time: self.max_elevation_time,
            max_elevation_deg: self.max_elevation_deg,
            duration_seconds: self.duration_seconds,
            start_azimuth_deg: None,
            end_azimuth_deg: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SegmenterState {
    #[default]
    NotVisible,
    Visible(PassAccumulator),
}

/// Turns a fixed-step elevation signal into discrete passes.
#[derive(Debug, Clone, Copy)]
pub struct PassSegmenter {
    step_seconds: f64,
    threshold_deg: f64,
}

impl PassSegmenter {
    pub fn new(step: Duration, threshold_deg: f64) -> Self {
        Self {
            step_seconds: step.num_milliseconds() as f64 / 1000.0,
            threshold_deg,
        }
    }

    /// Advance the state machine by one sample, returning the pass that just
    /// ended, if any.
    pub fn advance(
        &self,
        state: SegmenterState,
        sample: &ElevationSample,
    ) -> (SegmenterState, Option<PassRecord>) {
        let visible = sample.elevation_deg >= self.threshold_deg;

        match (state, visible) {
            (SegmenterState::NotVisible, false) => (SegmenterState::NotVisible, None),
            (SegmenterState::NotVisible, true) => (
                SegmenterState::Visible(PassAccumulator {
                    start: sample.time,
                    max_elevation_deg: sample.elevation_deg,
                    max_elevation_time: sample.time,
                    duration_seconds: self.step_seconds,
                }),
                None,
            ),
            (SegmenterState::Visible(mut acc), true) => {
                acc.duration_seconds += self.step_seconds;
                if sample.elevation_deg > acc.max_elevation_deg {
                    acc.max_elevation_deg = sample.elevation_deg;
                    acc.max_elevation_time = sample.time;
                }
                (SegmenterState::Visible(acc), None)
            }
            (SegmenterState::Visible(acc), false) => {
                (SegmenterState::NotVisible, Some(acc.into_record()))
            }
        }
    }

    /// Close out the signal. A pass still open here is truncated at the
    /// window boundary and emitted as-is.
    pub fn finish(&self, state: SegmenterState) -> Option<PassRecord> {
        match state {
            SegmenterState::NotVisible => None,
            SegmenterState::Visible(acc) => Some(acc.into_record()),
        }
    }

    pub fn segment<I>(&self, samples: I) -> Vec<PassRecord>
    where
        I: IntoIterator<Item = ElevationSample>,
    {
        let mut passes = Vec::new();
        let state = samples
            .into_iter()
            .fold(SegmenterState::NotVisible, |state, sample| {
                let (next, closed) = self.advance(state, &sample);
                passes.extend(closed);
                next
            });
        passes.extend(self.finish(state));
        passes
    }
}
