//! Objects and scene logic shared by the basic demo server and nodes

use cavesync_shared::Vec3;

mod keys;

pub use keys::Keys;

/// Milliseconds since the server started, drives every animation
pub const CLOCK_ID: u16 = 1;
/// W/A/S/D state as `[bool; 4]`
pub const KEYS_ID: u16 = 2;

/// Camera travel per frame while a key is held
pub const CAMERA_STEP: f32 = 1.0;

/// Camera offset for one frame with `keys` held. W/S move along z, A/D
/// along x.
pub fn camera_step(keys: &Keys) -> Vec3 {
    let mut step = Vec3::ZERO;
    if keys.w() {
        step = step + Vec3::Z * -CAMERA_STEP;
    }
    if keys.a() {
        step = step + Vec3::X * -CAMERA_STEP;
    }
    if keys.s() {
        step = step + Vec3::Z * CAMERA_STEP;
    }
    if keys.d() {
        step = step + Vec3::X * CAMERA_STEP;
    }
    step
}

/// Red channel of the animated sphere at `time_ms`, one full pulse every
/// ten seconds
pub fn pulse(time_ms: i64) -> f32 {
    let phase = time_ms as f64 / 5000.0 * std::f64::consts::PI;
    ((phase.sin() + 1.0) / 2.0) as f32
}
