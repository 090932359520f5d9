use crate::ext::ExtendVector3;
use nalgebra::{Vector2, Vector3};

/// The kart's forward axis on the ground plane, for a heading measured
/// counter-clockwise from +X.
pub fn kart_forward_axis_2d(heading: f32) -> Vector2<f32> {
    Vector2::new(heading.cos(), heading.sin())
}

/// The kart's right-hand axis on the ground plane.
pub fn kart_right_axis_2d(heading: f32) -> Vector2<f32> {
    Vector2::new(heading.sin(), -heading.cos())
}

pub fn forward_speed(heading: f32, velocity: &Vector3<f32>) -> f32 {
    kart_forward_axis_2d(heading).dot(&velocity.to_2d())
}
