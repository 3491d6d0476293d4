use bevy::input::mouse::MouseWheel;
use bevy::math::vec3;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

/// Orbit camera around a pan target, z up as in the robot model space.
#[derive(Component)]
pub struct CameraController {
    pub speed: f32,
    pub sensitivity: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub distance: f32,
    pub last_mouse_position: Option<Vec2>,
    pub pan_target: Vec3, // Point the camera orbits around
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            speed: 1.0,
            sensitivity: 0.2,
            pitch: 25.0,
            yaw: -60.0,
            distance: 12.0,
            last_mouse_position: None,
            pan_target: vec3(2.0, 0.0, 1.0),
        }
    }
}

impl CameraController {
    /// Camera transform for the current yaw, pitch, distance and pan target.
    pub fn transform(&self) -> Transform {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();

        let x = self.distance * yaw.cos() * pitch.cos();
        let y = self.distance * yaw.sin() * pitch.cos();
        let z = self.distance * pitch.sin();

        Transform::from_translation(Vec3::new(x, y, z) + self.pan_target)
            .looking_at(self.pan_target, Vec3::Z)
    }
}

pub fn camera_controller_system(
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    mut wheel_events: EventReader<MouseWheel>,
    mut query: Query<(&mut Transform, &mut CameraController)>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut egui_contexts: EguiContexts,
) {
    let egui_ctx = egui_contexts.ctx_mut();
    if egui_ctx.wants_pointer_input() || egui_ctx.is_pointer_over_area() {
        // Dragging a slider must not rotate the scene
        wheel_events.clear();
        return;
    }

    let Ok(window) = windows.get_single() else {
        return;
    };

    let left = mouse_button_input.pressed(MouseButton::Left);
    let right = mouse_button_input.pressed(MouseButton::Right);

    for (mut transform, mut controller) in query.iter_mut() {
        if let Some(cursor_position) = window.cursor_position() {
            if let Some(last_position) = controller.last_mouse_position {
                let delta = cursor_position - last_position;
                let sensitivity = controller.sensitivity;

                if left && right {
                    // Pan in the camera plane
                    let rotation = transform.rotation;
                    let pan = rotation * Vec3::new(-delta.x, delta.y, 0.0) * sensitivity * 0.05;
                    controller.pan_target += pan;
                } else if left && delta.length_squared() > 0.001 {
                    controller.yaw -= delta.x * sensitivity;
                    controller.pitch = (controller.pitch + delta.y * sensitivity).clamp(-89.0, 89.0);
                }
            }
            controller.last_mouse_position = if left || right { Some(cursor_position) } else { None };
        }

        for event in wheel_events.read() {
            controller.distance = (controller.distance - event.y * controller.speed).clamp(0.5, 100.0);
        }

        *transform = controller.transform();
    }
}
