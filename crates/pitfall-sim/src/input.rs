//! Server-side validation of client input.
//!
//! Clients only ever send intent. The speed clamp runs every tick on the
//! stored intent, right before it becomes a velocity, so a client can never
//! push a body faster than the configured bounds regardless of what it sends.
//! Profile edits are checked when the message arrives.

use pitfall_core::config::SpeedBounds;
use pitfall_core::constants::{MAX_COLOR_LEN, MAX_NAME_LEN};
use pitfall_core::error::Rejection;

/// Clamp a requested speed into `bounds`. Non-finite input yields 0.0.
pub fn clamp_speed(requested: f32, bounds: &SpeedBounds) -> f32 {
    if !requested.is_finite() {
        return 0.0;
    }
    // f32::clamp panics when min > max.
    bounds.min.max(bounds.max.min(requested))
}

/// Planar velocity `(vx, vz)` for a requested speed and facing.
///
/// `scale` is applied before clamping; a product that overflows saturates
/// toward the matching bound. Orientation is taken as-is (radians, 0 = +z).
/// Zero speed or any non-finite input gives a zero vector.
pub fn planar_velocity(speed: f32, orientation: f32, bounds: &SpeedBounds, scale: f32) -> (f32, f32) {
    if !speed.is_finite() || !orientation.is_finite() {
        return (0.0, 0.0);
    }
    let scaled = (speed * scale).clamp(-f32::MAX, f32::MAX);
    let speed = clamp_speed(scaled, bounds);
    if speed == 0.0 {
        return (0.0, 0.0);
    }
    (orientation.sin() * speed, orientation.cos() * speed)
}

/// A validated profile edit. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Trim and length-check a profile edit. Any bad field rejects the whole edit.
pub fn validate_profile(name: Option<&str>, color: Option<&str>) -> Result<ProfileEdit, Rejection> {
    Ok(ProfileEdit {
        name: name.map(|n| checked_field("name", n, MAX_NAME_LEN)).transpose()?,
        color: color.map(|c| checked_field("color", c, MAX_COLOR_LEN)).transpose()?,
    })
}

fn checked_field(field: &str, value: &str, max_len: usize) -> Result<String, Rejection> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(Rejection::InvalidProfile(format!("{field} is empty")));
    }
    if len > max_len {
        return Err(Rejection::InvalidProfile(format!(
            "{field} is longer than {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}
