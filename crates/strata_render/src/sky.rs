//! Sky collaborator.
//!
//! The atmospheric model itself lives outside the render graph. The
//! renderer only advances it, reads back the sun direction for lighting
//! and shadows, and exposes its texture to passes as the `sky` input.

use glam::Vec3;

use crate::backend::TextureHandle;

/// Name under which the sky texture is bound as a pass input.
pub const SKY_INPUT: &str = "sky";

pub trait SkyModel {
    /// Advances simulated time by `dt` seconds.
    fn update(&mut self, dt: f32);

    /// Unit vector pointing towards the sun.
    fn sun_direction(&self) -> Vec3;

    /// Sets local time of day in hours.
    fn set_time(&mut self, hours: f32);

    /// Sets how fast simulated time runs relative to real time.
    fn set_time_speed(&mut self, speed: f32);

    fn texture(&self) -> TextureHandle;
}
