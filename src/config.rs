//! Transform configuration.
//!
//! Every transform takes a small config struct whose fields name the columns
//! it reads and writes plus its numeric knobs.  All fields have defaults that
//! match the column layout of the operant-box exports, so most callers only
//! override one or two fields with struct-update syntax:
//!
//! ```
//! use operant::AlignConfig;
//!
//! let cfg = AlignConfig {
//!     t_before: 1.0,
//!     t_after: 3.0,
//!     ..AlignConfig::default()
//! };
//! assert_eq!(cfg.time_col, "time");
//! ```

/// Columns used by [`demarcate_trials`](crate::demarcate::demarcate_trials).
#[derive(Debug, Clone, PartialEq)]
pub struct DemarcateConfig {
    /// Timestamp column of the time-series table.
    ///
    /// Default: `"time"`.
    pub ts_time_col: String,

    /// Trial start column of the trial table.
    ///
    /// Default: `"start_time"`.
    pub trials_start_col: String,

    /// Trial end column of the trial table.
    ///
    /// A trial ends when the reward is collected, so the default is
    /// `"reward_collection_time"`.
    pub trials_end_col: String,

    /// Trial index column of the trial table.  Values must be unique.
    ///
    /// Default: `"trial_idx"`.
    pub trials_idx_col: String,

    /// Name of the trial index column written to the output.
    ///
    /// `None` reuses [`trials_idx_col`](Self::trials_idx_col).
    pub created_trial_idx_col: Option<String>,
}

impl Default for DemarcateConfig {
    fn default() -> Self {
        Self {
            ts_time_col: "time".into(),
            trials_start_col: "start_time".into(),
            trials_end_col: "reward_collection_time".into(),
            trials_idx_col: "trial_idx".into(),
            created_trial_idx_col: None,
        }
    }
}

impl DemarcateConfig {
    /// Output column name for the assigned trial index.
    pub fn created_col(&self) -> &str {
        self.created_trial_idx_col
            .as_deref()
            .unwrap_or(&self.trials_idx_col)
    }
}

/// Which side of an anchor a sample is matched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Match each sample to the nearest anchor at or before it (window start
    /// `anchor - t_before`).  The usual peri-event alignment.
    #[default]
    Forward,
    /// Match each sample to the nearest anchor at or after it (window end
    /// `anchor + t_after`).  Used to look back in time from an anchor.
    Backward,
}

/// Parameters for event-triggered windowing
/// ([`align_to_events`](crate::align::align_to_events) and
/// [`latency_from_event`](crate::align::latency_from_event)).
#[derive(Debug, Clone, PartialEq)]
pub struct AlignConfig {
    /// Timestamp column of the time-series table.
    ///
    /// Default: `"time"`.
    pub time_col: String,

    /// Seconds before each anchor included in its window.  Must be `>= 0`.
    ///
    /// Default: `0.0`.
    pub t_before: f64,

    /// Seconds after each anchor included in its window.  Must be `>= 0`.
    ///
    /// Default: `f64::INFINITY` (window runs until the next anchor claims the
    /// sample).
    pub t_after: f64,

    /// Decimal places latencies are rounded to.  `None` disables rounding.
    ///
    /// Default: `Some(2)`, i.e. a 10 ms grid.
    pub precision: Option<u32>,

    /// Side of the anchor samples are matched from.
    ///
    /// Default: [`Direction::Forward`].
    pub direction: Direction,

    /// Name of the latency column written to the output.
    ///
    /// Default: `"latency"`.
    pub created_latency_col: String,

    /// Name of the anchor index column, or `None` to omit it.
    ///
    /// Default: `Some("event_idx")`.
    pub created_event_idx_col: Option<String>,

    /// Re-centre latencies on the sampling grid after alignment by
    /// subtracting the median successive latency difference.
    ///
    /// Only applied for [`Direction::Forward`].
    ///
    /// Default: `false`.
    pub backward_adjust: bool,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            time_col: "time".into(),
            t_before: 0.0,
            t_after: f64::INFINITY,
            precision: Some(2),
            direction: Direction::Forward,
            created_latency_col: "latency".into(),
            created_event_idx_col: Some("event_idx".into()),
            backward_adjust: false,
        }
    }
}

/// Parameters for [`events_to_time_series`](crate::raster::events_to_time_series).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterConfig {
    /// Output sampling interval in seconds.  Must be `> 0`.
    ///
    /// Default: `0.1` s.
    pub sampling_interval: f64,

    /// Optional kernel convolved (`"same"` mode) with the indicator series.
    pub kernel: Option<Vec<f64>>,

    /// Length of the series in seconds.  `None` uses the latest event time.
    pub total_duration: Option<f64>,

    /// Circular shift in samples; negative values rotate towards index 0.
    ///
    /// Default: `0`.
    pub shift: isize,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            sampling_interval: 0.1,
            kernel: None,
            total_duration: None,
            shift: 0,
        }
    }
}

/// Parameters for the lagged design table built by
/// [`events_to_time_series_table`](crate::raster::events_to_time_series_table).
#[derive(Debug, Clone, PartialEq)]
pub struct LaggedConfig {
    /// Number of positive shifts (`1..=n`).
    ///
    /// Default: `5`.
    pub num_shifts_forwards: usize,

    /// Number of negative shifts (`-n..=-1`).
    ///
    /// Default: `5`.
    pub num_shifts_backwards: usize,

    /// Default: `0.1` s.
    pub sampling_interval: f64,

    pub kernel: Option<Vec<f64>>,

    /// Name of the time column placed first in the output.
    ///
    /// Default: `"time"`.
    pub created_time_col: String,
}

impl Default for LaggedConfig {
    fn default() -> Self {
        Self {
            num_shifts_forwards: 5,
            num_shifts_backwards: 5,
            sampling_interval: 0.1,
            kernel: None,
            created_time_col: "time".into(),
        }
    }
}

impl LaggedConfig {
    /// Shifts covered by the table, from most negative to most positive.
    ///
    /// ```
    /// use operant::LaggedConfig;
    /// let cfg = LaggedConfig { num_shifts_forwards: 1, num_shifts_backwards: 2, ..Default::default() };
    /// assert_eq!(cfg.shifts().collect::<Vec<_>>(), vec![-2, -1, 0, 1]);
    /// ```
    pub fn shifts(&self) -> impl Iterator<Item = isize> {
        -(self.num_shifts_backwards as isize)..=self.num_shifts_forwards as isize
    }
}
