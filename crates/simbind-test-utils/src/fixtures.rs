//! Aggregates shaped like generated model structs.
//!
//! [`Controller`] mixes every field kind: plain scalars, a read-only
//! scalar, 1-D and 2-D arrays of different element types, and a nested
//! aggregate that can only be exposed as opaque bytes.

use bytemuck::{Pod, Zeroable};
use simbind_core::{array_field, opaque_field, scalar_field, AggregateLayout, FieldError};

/// A nested aggregate member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Setpoint {
    pub target: f64,
    pub tolerance: f64,
}

/// Parameters and signals of a small discrete-time controller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Controller {
    pub gain: f64,
    pub mode: i32,
    pub tick: u32,
    pub inputs: [f32; 4],
    pub weights: [[f64; 3]; 2],
    pub flags: [u8; 3],
    pub setpoint: Setpoint,
}

impl Controller {
    /// A controller with distinct, easily recognised values in every field.
    pub fn sample() -> Self {
        Self {
            gain: 0.5,
            mode: 2,
            tick: 17,
            inputs: [1.0, 2.0, 3.0, 4.0],
            weights: [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]],
            flags: [1, 0, 1],
            setpoint: Setpoint {
                target: 10.0,
                tolerance: 0.25,
            },
        }
    }
}

/// Layout binding every member of [`Controller`].
///
/// `tick` and `flags` are read-only, as an output port would be.
pub fn controller_layout() -> Result<AggregateLayout<Controller>, FieldError> {
    AggregateLayout::new()
        .with_scalar(scalar_field!(Controller, gain).with_doc("proportional gain"))?
        .with_scalar(scalar_field!(Controller, mode))?
        .with_scalar(scalar_field!(Controller, tick).read_only())?
        .with_array(array_field!(Controller, inputs)?)?
        .with_array(array_field!(Controller, weights)?.with_doc("mixing matrix"))?
        .with_array(array_field!(Controller, flags)?.read_only())?
        .with_opaque(opaque_field!(Controller, setpoint))
}
