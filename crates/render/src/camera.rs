//! Camera and controller for first-person navigation
//!
//! The camera keeps an explicit right/up/look basis instead of yaw/pitch
//! angles. Incremental rotations accumulate floating point drift, so the
//! basis is re-orthonormalized every time the view matrix is rebuilt.

use glam::{Mat3, Mat4, Vec3, Vec4};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Pose the camera starts in and returns to on reset.
pub const HOME_POSITION: Vec3 = Vec3::new(-1.3084, 0.0610, -2.8699);
pub const HOME_RIGHT: Vec3 = Vec3::new(0.9063, 0.0, -0.4226);
pub const HOME_UP: Vec3 = Vec3::new(0.0221, 0.9986, 0.0474);
pub const HOME_LOOK: Vec3 = Vec3::new(0.422039, -0.052336, 0.905065);

/// Free-fly camera used by the fractal renderer
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Right basis vector
    pub right: Vec3,
    /// Up basis vector
    pub up: Vec3,
    /// Look (forward) basis vector
    pub look: Vec3,
    /// Render target aspect ratio
    pub aspect: f32,
    /// Vertical field of view in radians
    pub fovy: f32,
    /// Near clipping plane distance
    pub znear: f32,
    /// Far clipping plane distance
    pub zfar: f32,
}

impl Camera {
    /// Create a new camera at the home pose
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: HOME_POSITION,
            right: HOME_RIGHT,
            up: HOME_UP,
            look: HOME_LOOK,
            aspect: width as f32 / height as f32,
            fovy: std::f32::consts::FRAC_PI_4,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    /// Update aspect ratio when the window is resized
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Return the camera to the home pose
    pub fn reset(&mut self) {
        self.position = HOME_POSITION;
        self.right = HOME_RIGHT;
        self.up = HOME_UP;
        self.look = HOME_LOOK;
    }

    /// Move along the look vector
    pub fn walk(&mut self, d: f32) {
        self.position += self.look * d;
    }

    /// Move along the right vector
    pub fn strafe(&mut self, d: f32) {
        self.position += self.right * d;
    }

    /// Rotate the up and look vectors about the right vector
    pub fn pitch(&mut self, angle: f32) {
        let r = Mat3::from_axis_angle(self.right, angle);
        self.up = r * self.up;
        self.look = r * self.look;
    }

    /// Rotate the whole basis about the world y axis
    pub fn rotate_y(&mut self, angle: f32) {
        let r = Mat3::from_rotation_y(angle);
        self.right = r * self.right;
        self.up = r * self.up;
        self.look = r * self.look;
    }

    /// Re-orthonormalize the basis in place.
    ///
    /// `look` is normalized first, `up` is rebuilt perpendicular to it and
    /// `right` is the cross product of the two, so the corrected basis stays
    /// a left-handed frame with `right x up == look`.
    fn orthonormalize(&mut self) {
        let look = self.look.normalize();
        let up = look.cross(self.right).normalize();
        let right = up.cross(look);
        self.look = look;
        self.up = up;
        self.right = right;
    }

    /// Rebuild the world-to-view matrix from the (corrected) basis.
    pub fn view_matrix(&mut self) -> Mat4 {
        self.orthonormalize();
        let p = self.position;
        Mat4::from_cols(
            Vec4::new(self.right.x, self.up.x, self.look.x, 0.0),
            Vec4::new(self.right.y, self.up.y, self.look.y, 0.0),
            Vec4::new(self.right.z, self.up.z, self.look.z, 0.0),
            Vec4::new(-p.dot(self.right), -p.dot(self.up), -p.dot(self.look), 1.0),
        )
    }

    /// Projection matrix for the current lens parameters.
    ///
    /// Left-handed with the look vector mapping to +z, matching the view
    /// matrix construction above.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// First person camera controller for handling input
pub struct CameraController {
    /// Movement speed in world units per second
    speed: f32,
    /// Mouse look sensitivity in degrees per pixel of cursor travel
    sensitivity: f32,
    /// Movement state flags
    pub is_forward_pressed: bool,
    pub is_backward_pressed: bool,
    pub is_left_pressed: bool,
    pub is_right_pressed: bool,
}

impl CameraController {
    /// Create a new camera controller
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            is_forward_pressed: false,
            is_backward_pressed: false,
            is_left_pressed: false,
            is_right_pressed: false,
        }
    }

    /// Process keyboard events to update movement state
    ///
    /// Returns `true` when the key is one of the movement bindings.
    pub fn process_keyboard(&mut self, keycode: KeyCode, state: ElementState) -> bool {
        let is_pressed = state == ElementState::Pressed;
        match keycode {
            KeyCode::KeyW => {
                self.is_forward_pressed = is_pressed;
                true
            }
            KeyCode::KeyS => {
                self.is_backward_pressed = is_pressed;
                true
            }
            KeyCode::KeyA => {
                self.is_left_pressed = is_pressed;
                true
            }
            KeyCode::KeyD => {
                self.is_right_pressed = is_pressed;
                true
            }
            _ => false,
        }
    }

    /// Apply a mouse-look delta as pitch about right then yaw about world y
    pub fn process_mouse(&self, camera: &mut Camera, delta_x: f64, delta_y: f64) {
        let dx = (self.sensitivity * delta_x as f32).to_radians();
        let dy = (self.sensitivity * delta_y as f32).to_radians();
        camera.pitch(dy);
        camera.rotate_y(dx);
    }

    /// Update camera position based on current input state
    pub fn update_camera(&self, camera: &mut Camera, dt: f32) {
        let step = self.speed * dt;
        if self.is_forward_pressed {
            camera.walk(step);
        }
        if self.is_backward_pressed {
            camera.walk(-step);
        }
        if self.is_right_pressed {
            camera.strafe(step);
        }
        if self.is_left_pressed {
            camera.strafe(-step);
        }
    }
}
