use glam::{Mat4, Quat, Vec3};

/// Resting place of the camera in ship space: behind and slightly above.
pub const FOLLOW_OFFSET: Vec3 = Vec3::new(0.0, 2.0, 10.0);
/// Fraction of the remaining distance covered per frame.
pub const FOLLOW_LERP: f32 = 0.1;

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: width as f32 / height as f32,
            z_near: 0.1,
            z_far: 2000.0,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    /// Ease toward the follow offset behind the ship and keep looking at it.
    pub fn follow(&mut self, ship_position: Vec3, ship_orientation: Quat) {
        let ideal = ship_position + ship_orientation * FOLLOW_OFFSET;
        self.eye = self.eye.lerp(ideal, FOLLOW_LERP);
        self.target = ship_position;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_eases_toward_the_offset_point() {
        let mut camera = Camera::new(800, 600);
        camera.eye = Vec3::ZERO;
        let ship_pos = Vec3::new(0.0, 0.0, -100.0);
        camera.follow(ship_pos, Quat::IDENTITY);

        let ideal = ship_pos + FOLLOW_OFFSET;
        assert!((camera.eye - ideal * FOLLOW_LERP).length() < 1e-4);
        assert_eq!(camera.target, ship_pos);

        // repeated follow converges onto the ideal offset
        for _ in 0..500 {
            camera.follow(ship_pos, Quat::IDENTITY);
        }
        assert!((camera.eye - ideal).length() < 1e-2);
    }

    #[test]
    fn offset_turns_with_the_ship() {
        let mut camera = Camera::new(800, 600);
        let turned = Quat::from_rotation_y(std::f32::consts::PI);
        for _ in 0..500 {
            camera.follow(Vec3::ZERO, turned);
        }
        // behind a turned-around ship means negative Z
        assert!(camera.eye.z < 0.0);
        assert!((camera.eye.y - FOLLOW_OFFSET.y).abs() < 1e-2);
    }
}
