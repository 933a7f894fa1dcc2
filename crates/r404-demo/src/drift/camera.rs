use glam::Vec3;

use r404_engine::input::Key;

/// Keys that move the camera.
pub const MOVE_KEYS: [Key; 6] = [Key::W, Key::A, Key::S, Key::D, Key::Space, Key::Shift];

/// Free-flying first-person camera.
#[derive(Debug, Clone)]
pub struct Camera {
    pub pos: Vec3,
    pub dir: Vec3,
    /// Degrees.
    yaw: f32,
    /// Degrees, clamped to `PITCH_LIMIT`.
    pitch: f32,
}

impl Camera {
    /// Units per second.
    pub const SPEED: f32 = 2.568;
    /// Degrees per pixel of mouse motion.
    pub const MOUSE_SENSITIVITY: f32 = 0.687;
    pub const PITCH_LIMIT: f32 = 89.9;

    pub fn new() -> Self {
        Self {
            pos: Vec3::new(0.0, 0.0, 1.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Direction `key` moves the camera in. Horizontal moves ignore pitch.
    pub fn move_dir(&self, key: Key) -> Vec3 {
        let forward = Vec3::new(self.dir.x, 0.0, self.dir.z).normalize_or_zero();
        match key {
            Key::W => forward,
            Key::S => -forward,
            Key::A => Vec3::Y.cross(forward),
            Key::D => -Vec3::Y.cross(forward),
            Key::Space => Vec3::Y,
            Key::Shift => Vec3::NEG_Y,
            _ => Vec3::ZERO,
        }
    }

    /// Advances the camera by `dt` seconds.
    ///
    /// `held` reports whether a key is down; `mouse` is the accumulated pointer
    /// motion in pixels since the last update.
    pub fn update(&mut self, dt: f32, held: impl Fn(Key) -> bool, mouse: (f32, f32)) {
        for key in MOVE_KEYS {
            if held(key) {
                self.pos += self.move_dir(key) * (dt * Self::SPEED);
            }
        }

        let (dx, dy) = mouse;
        if dx != 0.0 || dy != 0.0 {
            self.yaw += Self::MOUSE_SENSITIVITY * dx;
            self.pitch = (self.pitch + Self::MOUSE_SENSITIVITY * dy)
                .clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);

            let (pitch, yaw) = (self.pitch.to_radians(), self.yaw.to_radians());
            let xz = pitch.cos();
            self.dir = Vec3::new(xz * yaw.cos(), pitch.sin(), xz * yaw.sin());
        }
    }

    /// Straight RGB shade of the view: hue from the look direction, brightness
    /// from the height above the start plane.
    pub fn shade(&self) -> [f32; 3] {
        let lift = (0.5 + 0.1 * self.pos.y).clamp(0.15, 1.0);
        let tint = |c: f32| ((0.5 + 0.5 * c) * lift).clamp(0.0, 1.0);
        [tint(self.dir.x), tint(self.dir.y), tint(self.dir.z)]
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
