//! Core library for precision analysis of pose measurements.
//!
//! Measured poses are read as [`geometry::Point`]s, turned into rigid
//! transforms and fed to the `AX = YB` solvers in [`calibration`]. The
//! residuals of a solution are summarized by [`metrics`] and printed through
//! [`reporting`]. [`noise`] perturbs pose files for robustness studies.

pub mod calibration;
pub mod geometry;
pub mod io;
pub mod metrics;
pub mod noise;
pub mod reporting;

pub use geometry::{EulerZyx, Point, Transform};
pub use io::{parse_points, PoseRecord};
