//! # Line centroid estimator
//!
//! Reads the eight reflectance channels, classifies each as dark or light and
//! reduces them to a signed steering error.
//!
//! Channels are weighted `15, 8, 4, 1, -1, -4, -8, -15` from left to right,
//! so a positive centroid means the line is to the left of the robot's
//! centre. Both outermost channels dark at once is taken as a solid line
//! across the whole array (the finish line), not a lane line.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::Serialize;

use crate::drivers::LineSensorArray;

pub use params::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of channels in the array.
pub const NUM_CHANNELS: usize = 8;

/// Centroid weight of each channel, left to right.
pub const CENTROID_WEIGHTS: [i32; NUM_CHANNELS] = [15, 8, 4, 1, -1, -4, -8, -15];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of one read of the whole array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CentroidSample {
    /// Per channel classification, true for dark.
    pub dark: [bool; NUM_CHANNELS],

    /// Weighted sum of the dark channels.
    pub centroid: f64,

    /// Both outermost channels are dark.
    pub line_detected: bool,
}

/// The line sensor array and its classification parameters.
pub struct LineSensor<A> {
    array: A,
    params: LineSensorParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CentroidSample {
    /// Compute the centroid and line flag from channel classifications.
    pub fn from_dark(dark: [bool; NUM_CHANNELS]) -> Self {
        let centroid: i32 = dark
            .iter()
            .zip(CENTROID_WEIGHTS.iter())
            .filter(|(d, _)| **d)
            .map(|(_, w)| w)
            .sum();

        Self {
            dark,
            centroid: centroid as f64,
            line_detected: dark[0] && dark[NUM_CHANNELS - 1],
        }
    }
}

impl<A: LineSensorArray> LineSensor<A> {
    pub fn new(array: A, params: LineSensorParams) -> Self {
        Self { array, params }
    }

    /// Read one channel's discharge time, limited to the timeout.
    ///
    /// A read that times out is an ordinary reading, not an error.
    pub fn read_channel(&mut self, channel: usize) -> u32 {
        let timeout = self.params.discharge_timeout_us;
        self.array.discharge_time_us(channel, timeout).min(timeout)
    }

    /// True if the discharge time indicates a dark surface.
    pub fn is_dark(&self, discharge_time_us: u32) -> bool {
        discharge_time_us >= self.params.dark_threshold_us
    }

    /// Read all channels and compute the centroid.
    pub fn sample(&mut self) -> CentroidSample {
        let mut times = [0u32; NUM_CHANNELS];
        let mut dark = [false; NUM_CHANNELS];

        for ch in 0..NUM_CHANNELS {
            times[ch] = self.read_channel(ch);
            dark[ch] = self.is_dark(times[ch]);
        }

        let sample = CentroidSample::from_dark(dark);

        trace!(
            "Line sensor times {:?} -> centroid {}, line {}",
            times,
            sample.centroid,
            sample.line_detected
        );

        sample
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
