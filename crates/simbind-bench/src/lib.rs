//! Benchmark profiles for simbind.
//!
//! Spaces and sample buffers sized like the observations and actions of
//! typical control and vision environments:
//!
//! - [`pixel_space`]: an 84x84x3 `uint8` image observation
//! - [`sensor_space`]: a 1024-element `float32` sensor vector with
//!   per-element bounds
//! - [`pixel_frame`] / [`sensor_reading`]: deterministic in-bounds samples

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use simbind_space::{BoxSpace, SpaceError};

/// Shape of [`pixel_space`].
pub const PIXEL_SHAPE: [usize; 3] = [84, 84, 3];

/// Length of [`sensor_space`].
pub const SENSOR_LEN: usize = 1024;

/// An 84x84 RGB image observation with the full `uint8` range.
pub fn pixel_space() -> Result<BoxSpace<u8>, SpaceError> {
    BoxSpace::uniform(0, 255, &PIXEL_SHAPE)
}

/// A sensor vector whose bounds widen with the element index.
pub fn sensor_space() -> Result<BoxSpace<f32>, SpaceError> {
    let high: Vec<f32> = (0..SENSOR_LEN).map(|i| 1.0 + i as f32 * 0.01).collect();
    let low = high.iter().map(|h| -h).collect::<Vec<_>>();
    BoxSpace::flat(low, high)
}

/// A deterministic image frame; `seed` shifts the pattern.
pub fn pixel_frame(seed: u64) -> Vec<u8> {
    let len: usize = PIXEL_SHAPE.iter().product();
    (0..len as u64)
        .map(|i| (i.wrapping_mul(2654435761).wrapping_add(seed) >> 7) as u8)
        .collect()
}

/// A deterministic reading inside [`sensor_space`]'s bounds.
pub fn sensor_reading(seed: u64) -> Vec<f32> {
    (0..SENSOR_LEN)
        .map(|i| {
            let bound = 1.0 + i as f32 * 0.01;
            let phase = ((i as u64).wrapping_add(seed) % 200) as f32 / 100.0 - 1.0;
            phase * bound
        })
        .collect()
}
