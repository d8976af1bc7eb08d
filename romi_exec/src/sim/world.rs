//! Planar kinematics of the simulated robot and its course

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;
use std::f64::consts::PI;

use super::SimParams;
use crate::{line_sensor::NUM_CHANNELS, robot::RobotParams, wheel_ctrl::Side};
use util::{
    maths::{clamp, lin_map},
    time::MICROS_PER_SECOND,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Longest interval integrated in one go.
///
/// Units: microseconds
const MAX_SUBSTEP_US: u64 = 1000;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position and heading of the robot's axle centre in the world frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pose {
    /// Units: inches
    pub x_in: f64,

    /// Units: inches
    pub y_in: f64,

    /// Counter clockwise from +x.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// One motor, gearbox and encoder.
#[derive(Debug, Clone, Default)]
struct WheelPlant {
    enabled: bool,
    duty_pct: f64,
    gain: f64,

    /// Units: radians/second
    omega_rads: f64,

    /// Unwrapped encoder position, fractional.
    position_ticks: f64,
}

/// Everything the simulated drivers read and write.
pub struct SimWorld {
    params: SimParams,

    wheel_radius_in: f64,
    track_half_width_in: f64,
    omega_per_duty_pct: f64,
    ticks_per_rev: f64,
    counter_modulus: i64,

    pose: Pose,
    wheels: [WheelPlant; 2],
    bumpers: [bool; 2],

    /// Virtual time since start.
    micros: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    /// Transform a point from the robot frame (x forward, y left) into the
    /// world frame.
    pub fn to_world(&self, forward_in: f64, left_in: f64) -> (f64, f64) {
        let (s, c) = self.heading_rad.sin_cos();
        (
            self.x_in + forward_in * c - left_in * s,
            self.y_in + forward_in * s + left_in * c,
        )
    }
}

impl WheelPlant {
    fn step(&mut self, dt_s: f64, tau_s: f64, omega_per_duty_pct: f64, ticks_per_rev: f64) {
        let target = if self.enabled {
            self.gain * omega_per_duty_pct * self.duty_pct
        } else {
            0.0
        };

        let alpha = clamp(dt_s / tau_s, 0.0, 1.0);
        self.omega_rads += (target - self.omega_rads) * alpha;
        self.position_ticks += self.omega_rads * dt_s * ticks_per_rev / (2.0 * PI);
    }
}

impl SimWorld {
    pub fn new(params: SimParams, robot: &RobotParams) -> Self {
        let geom = &robot.nav_ctrl.geometry;

        let pose = Pose {
            x_in: params.start_x_in,
            y_in: params.start_y_in,
            heading_rad: params.start_heading_rad,
        };

        let wheels = [
            WheelPlant {
                gain: params.left_motor_gain,
                ..Default::default()
            },
            WheelPlant {
                gain: params.right_motor_gain,
                ..Default::default()
            },
        ];

        Self {
            wheel_radius_in: geom.wheel_radius_in,
            track_half_width_in: geom.track_half_width_in,
            omega_per_duty_pct: geom.omega_per_duty_pct,
            ticks_per_rev: robot.wheel_ctrl.ticks_per_rev,
            counter_modulus: robot.wheel_ctrl.counter_auto_reload as i64 + 1,
            params,
            pose,
            wheels,
            bumpers: [false; 2],
            micros: 0,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn micros(&self) -> u64 {
        self.micros
    }

    /// Advance virtual time, integrating the plants in substeps.
    pub fn advance_us(&mut self, us: u64) {
        let mut remaining = us;
        while remaining > 0 {
            let step = remaining.min(MAX_SUBSTEP_US);
            self.step(step as f64 / MICROS_PER_SECOND);
            self.micros += step;
            remaining -= step;
        }
    }

    pub fn set_duty(&mut self, side: Side, duty_pct: f64) {
        self.wheels[index(side)].duty_pct = clamp(duty_pct, -100.0, 100.0);
    }

    pub fn set_enabled(&mut self, side: Side, enabled: bool) {
        self.wheels[index(side)].enabled = enabled;
    }

    pub fn is_enabled(&self, side: Side) -> bool {
        self.wheels[index(side)].enabled
    }

    /// Units: radians/second
    pub fn wheel_speed(&self, side: Side) -> f64 {
        self.wheels[index(side)].omega_rads
    }

    /// Raw counter value, wrapped into `0..=auto_reload`.
    pub fn counter(&self, side: Side) -> u32 {
        let ticks = self.wheels[index(side)].position_ticks.floor() as i64;
        ticks.rem_euclid(self.counter_modulus) as u32
    }

    /// Discharge time of one channel, channel 0 being the leftmost.
    pub fn discharge_time_us(&self, channel: usize) -> u32 {
        let p = &self.params;
        let left_in = ((NUM_CHANNELS as f64 - 1.0) / 2.0 - channel as f64) * p.sensor_pitch_in;
        let (x, y) = self.pose.to_world(p.sensor_offset_in, left_in);

        let coverage = band_coverage(
            (y - self.course_line_y(x)).abs(),
            p.line_width_in,
            p.sensor_footprint_in,
        )
        .max(
            band_coverage(
                (x - p.finish_line_x_in).abs(),
                p.finish_line_width_in,
                p.sensor_footprint_in,
            ),
        );

        lin_map(
            (0.0, 1.0),
            (p.light_discharge_us, p.dark_discharge_us),
            coverage,
        ) as u32
    }

    /// Lateral position of the course line at `x_in`.
    ///
    /// Units: inches
    pub fn course_line_y(&self, x_in: f64) -> f64 {
        if x_in >= self.params.obstacle_x_in {
            -self.params.line_jog_in
        } else {
            0.0
        }
    }

    /// `[left, right]` bump switch states.
    pub fn bumpers(&self) -> [bool; 2] {
        self.bumpers
    }

    fn step(&mut self, dt_s: f64) {
        for w in self.wheels.iter_mut() {
            w.step(
                dt_s,
                self.params.wheel_tau_s,
                self.omega_per_duty_pct,
                self.ticks_per_rev,
            );
        }

        let r = self.wheel_radius_in;
        let (wl, wr) = (self.wheels[0].omega_rads, self.wheels[1].omega_rads);
        let speed_ins = r * (wl + wr) / 2.0;
        let yaw_rate_rads = r * (wr - wl) / (2.0 * self.track_half_width_in);

        let mid_heading = self.pose.heading_rad + yaw_rate_rads * dt_s / 2.0;
        let next = Pose {
            x_in: self.pose.x_in + speed_ins * mid_heading.cos() * dt_s,
            y_in: self.pose.y_in + speed_ins * mid_heading.sin() * dt_s,
            heading_rad: self.pose.heading_rad + yaw_rate_rads * dt_s,
        };

        // The obstacle stops the robot where the switches meet it
        let p = &self.params;
        let bumpers = [
            self.in_obstacle(next.to_world(p.bumper_offset_in, p.bumper_half_width_in)),
            self.in_obstacle(next.to_world(p.bumper_offset_in, -p.bumper_half_width_in)),
        ];
        self.bumpers = bumpers;

        if !(bumpers[0] || bumpers[1]) {
            self.pose = next;
        }
    }

    fn in_obstacle(&self, (x, y): (f64, f64)) -> bool {
        let h = self.params.obstacle_half_size_in;
        (x - self.params.obstacle_x_in).abs() <= h && y.abs() <= h
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn index(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

/// Fraction of a sensor footprint centred `dist_in` from the middle of a band
/// that lies on the band.
fn band_coverage(dist_in: f64, band_width_in: f64, footprint_in: f64) -> f64 {
    clamp(
        (band_width_in / 2.0 + footprint_in / 2.0 - dist_in) / footprint_in,
        0.0,
        1.0,
    )
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
