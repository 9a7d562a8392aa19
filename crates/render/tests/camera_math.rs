use glam::{Vec3, Vec4};
use render::camera::{Camera, CameraController, HOME_LOOK, HOME_POSITION, HOME_RIGHT, HOME_UP};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

const EPS: f32 = 1e-4;

fn assert_vec3_near(a: Vec3, b: Vec3, eps: f32) {
    assert!(
        (a - b).length() < eps,
        "expected {a:?} to be within {eps} of {b:?}"
    );
}

fn assert_orthonormal(camera: &Camera) {
    assert!((camera.right.length() - 1.0).abs() < EPS);
    assert!((camera.up.length() - 1.0).abs() < EPS);
    assert!((camera.look.length() - 1.0).abs() < EPS);
    assert!(camera.right.dot(camera.up).abs() < EPS);
    assert!(camera.right.dot(camera.look).abs() < EPS);
    assert!(camera.up.dot(camera.look).abs() < EPS);
}

#[test]
fn home_basis_is_left_handed() {
    // right x up == look for the frame the view matrix assumes.
    assert_vec3_near(HOME_RIGHT.cross(HOME_UP), HOME_LOOK, 1e-2);
}

#[test]
fn view_matrix_orthonormalizes_drifted_basis() {
    let mut camera = Camera::new(1280, 720);
    // Accumulate drift through many small incremental rotations.
    for i in 0..500 {
        camera.pitch(0.013);
        camera.rotate_y(if i % 2 == 0 { 0.021 } else { -0.017 });
    }
    camera.view_matrix();
    assert_orthonormal(&camera);
}

#[test]
fn view_matrix_maps_position_to_origin() {
    let mut camera = Camera::new(1280, 720);
    camera.walk(3.0);
    camera.strafe(-1.5);
    let view = camera.view_matrix();
    let p = camera.position;
    let mapped = view * Vec4::new(p.x, p.y, p.z, 1.0);
    assert!(mapped.truncate().length() < EPS);
    assert!((mapped.w - 1.0).abs() < EPS);
}

#[test]
fn view_matrix_maps_look_to_plus_z() {
    let mut camera = Camera::new(1280, 720);
    let view = camera.view_matrix();
    let ahead = camera.position + camera.look;
    let mapped = view * Vec4::new(ahead.x, ahead.y, ahead.z, 1.0);
    assert_vec3_near(mapped.truncate(), Vec3::Z, EPS);
}

#[test]
fn view_matrix_inverse_recovers_camera_frame() {
    let mut camera = Camera::new(1280, 720);
    camera.rotate_y(0.7);
    camera.pitch(-0.2);
    camera.walk(2.0);
    let inv = camera.view_matrix().inverse();
    // Columns of the inverse are the world-space basis and position.
    assert_vec3_near(inv.x_axis.truncate(), camera.right, EPS);
    assert_vec3_near(inv.y_axis.truncate(), camera.up, EPS);
    assert_vec3_near(inv.z_axis.truncate(), camera.look, EPS);
    assert_vec3_near(inv.w_axis.truncate(), camera.position, EPS);
}

#[test]
fn walk_and_strafe_follow_the_basis() {
    let mut camera = Camera::new(1280, 720);
    let start = camera.position;
    camera.walk(2.0);
    assert_vec3_near(camera.position, start + HOME_LOOK * 2.0, EPS);
    camera.strafe(-0.5);
    assert_vec3_near(camera.position, start + HOME_LOOK * 2.0 - HOME_RIGHT * 0.5, EPS);
    // Translation never touches the basis.
    assert_vec3_near(camera.right, HOME_RIGHT, EPS);
    assert_vec3_near(camera.up, HOME_UP, EPS);
    assert_vec3_near(camera.look, HOME_LOOK, EPS);
}

#[test]
fn rotations_do_not_move_the_camera() {
    let mut camera = Camera::new(1280, 720);
    camera.pitch(0.4);
    camera.rotate_y(-1.1);
    assert_vec3_near(camera.position, HOME_POSITION, EPS);
}

#[test]
fn pitch_preserves_the_right_vector() {
    let mut camera = Camera::new(1280, 720);
    camera.pitch(0.8);
    assert_vec3_near(camera.right, HOME_RIGHT, EPS);
}

#[test]
fn rotate_y_spins_about_the_world_axis() {
    let mut camera = Camera::new(1280, 720);
    let angle = 0.6_f32;
    camera.rotate_y(angle);
    // A world-Y rotation preserves the y component of every basis vector.
    assert!((camera.right.y - HOME_RIGHT.y).abs() < EPS);
    assert!((camera.up.y - HOME_UP.y).abs() < EPS);
    assert!((camera.look.y - HOME_LOOK.y).abs() < EPS);
    // And the xz projection of look turns by exactly the requested angle.
    let before = Vec3::new(HOME_LOOK.x, 0.0, HOME_LOOK.z).normalize();
    let after = Vec3::new(camera.look.x, 0.0, camera.look.z).normalize();
    assert!((before.dot(after) - angle.cos()).abs() < 1e-3);
}

#[test]
fn reset_restores_the_home_pose() {
    let mut camera = Camera::new(1280, 720);
    camera.walk(5.0);
    camera.pitch(1.0);
    camera.rotate_y(2.0);
    camera.reset();
    assert_vec3_near(camera.position, HOME_POSITION, EPS);
    assert_vec3_near(camera.right, HOME_RIGHT, EPS);
    assert_vec3_near(camera.up, HOME_UP, EPS);
    assert_vec3_near(camera.look, HOME_LOOK, EPS);
}

#[test]
fn resize_ignores_zero_dimensions() {
    let mut camera = Camera::new(1280, 720);
    let aspect = camera.aspect;
    camera.resize(0, 0);
    assert_eq!(camera.aspect, aspect);
    camera.resize(640, 480);
    assert!((camera.aspect - 640.0 / 480.0).abs() < EPS);
}

#[test]
fn controller_tracks_movement_keys() {
    let mut controller = CameraController::new(10.0, 1.0);
    assert!(controller.process_keyboard(KeyCode::KeyW, ElementState::Pressed));
    assert!(controller.is_forward_pressed);
    assert!(controller.process_keyboard(KeyCode::KeyW, ElementState::Released));
    assert!(!controller.is_forward_pressed);
    // Non-movement keys are left for the action bindings.
    assert!(!controller.process_keyboard(KeyCode::KeyR, ElementState::Pressed));
}

#[test]
fn opposed_keys_cancel_out() {
    let mut camera = Camera::new(1280, 720);
    let mut controller = CameraController::new(10.0, 1.0);
    controller.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
    controller.process_keyboard(KeyCode::KeyS, ElementState::Pressed);
    controller.update_camera(&mut camera, 0.016);
    assert_vec3_near(camera.position, HOME_POSITION, EPS);
}

#[test]
fn forward_speed_scales_with_dt() {
    let mut camera = Camera::new(1280, 720);
    let mut controller = CameraController::new(10.0, 1.0);
    controller.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
    controller.update_camera(&mut camera, 0.5);
    assert_vec3_near(camera.position, HOME_POSITION + HOME_LOOK * 5.0, 1e-3);
}

#[test]
fn mouse_look_pitches_then_yaws() {
    let mut camera = Camera::new(1280, 720);
    let controller = CameraController::new(10.0, 1.0);
    // 90 pixels right at one degree per pixel is a quarter turn.
    controller.process_mouse(&mut camera, 90.0, 0.0);
    camera.view_matrix();
    let before = Vec3::new(HOME_LOOK.x, 0.0, HOME_LOOK.z).normalize();
    let after = Vec3::new(camera.look.x, 0.0, camera.look.z).normalize();
    assert!(before.dot(after).abs() < 1e-2);
}
