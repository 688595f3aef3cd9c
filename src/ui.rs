use egui::{Context, RichText};

use crate::controller::{FrameLoopContext, KeyAction, KeyBindings};

/// Crosshair (while captured) plus the debug window.
pub fn draw_hud(ctx: &Context, frame: &FrameLoopContext) {
    if frame.input.is_captured() {
        draw_crosshair(ctx);
    }
    draw_debug_window(ctx, frame);
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::TOP, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 8.0;
    let stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
    painter.line_segment([center - egui::vec2(size, 0.0), center + egui::vec2(size, 0.0)], stroke);
    painter.line_segment([center - egui::vec2(0.0, size), center + egui::vec2(0.0, size)], stroke);
}

fn draw_debug_window(ctx: &Context, frame: &FrameLoopContext) {
    let cam = &frame.camera;
    let pos = cam.position();
    let material = frame.active_material().map_or("none", |m| m.name());

    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(RichText::new(format!("FPS: {:.0}", frame.fps.fps())).small());
            ui.label(RichText::new(format!("Pos: {:.2}, {:.2}, {:.2}", pos.x, pos.y, pos.z)).small());
            ui.label(RichText::new(format!("Yaw: {:.1} Pitch: {:.1}", cam.yaw(), cam.pitch())).small());
            ui.label(RichText::new(format!("FOV: {:.1}", cam.fov())).small());
            ui.label(RichText::new(format!("Material: {material}")).small());
            ui.label(
                RichText::new(if frame.input.is_captured() { "Mouse: captured" } else { "Mouse: free" })
                    .small(),
            );
            ui.separator();
            ui.label(RichText::new("Controls:").small());
            for line in control_lines(frame.input.bindings()) {
                ui.label(RichText::new(line).small());
            }
        });
}

const HELP: [(KeyAction, &str); 12] = [
    (KeyAction::MoveForward, "Forward"),
    (KeyAction::MoveBackward, "Back"),
    (KeyAction::StrafeLeft, "Left"),
    (KeyAction::StrafeRight, "Right"),
    (KeyAction::Ascend, "Up"),
    (KeyAction::Descend, "Down"),
    (KeyAction::Sprint, "Sprint"),
    (KeyAction::ToggleCapture, "Capture mouse"),
    (KeyAction::LookAtOrigin, "Look at origin"),
    (KeyAction::CycleMaterial, "Next material"),
    (KeyAction::ShowFps, "Log FPS"),
    (KeyAction::Quit, "Quit"),
];

/// One "key - description" line per bound action.
pub fn control_lines(bindings: &KeyBindings) -> Vec<String> {
    HELP.iter()
        .filter_map(|(action, text)| bindings.key_for(*action).map(|key| format!("{key} - {text}")))
        .collect()
}
