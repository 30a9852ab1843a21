use egui::Context;

/// Build the complete overlay: score readout plus a small help panel.
/// Pure display, nothing here consumes input.
pub fn draw_hud(ctx: &Context, score: u32, fps: f32) {
    draw_score(ctx, score);
    draw_help(ctx, fps);
}

fn draw_score(ctx: &Context, score: u32) {
    egui::Area::new(egui::Id::new("score"))
        .anchor(egui::Align2::LEFT_TOP, [20.0, 20.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("Score: {score}"))
                    .size(24.0)
                    .color(egui::Color32::WHITE),
            );
        });
}

fn draw_help(ctx: &Context, fps: f32) {
    egui::Window::new("Controls")
        .default_pos([8.0, 64.0])
        .default_open(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {fps:.0}")).small());
            ui.separator();
            ui.label(egui::RichText::new("W/S - Thrust").small());
            ui.label(egui::RichText::new("A/D - Yaw").small());
            ui.label(egui::RichText::new("Q/E - Roll").small());
            ui.label(egui::RichText::new("Space/Shift - Climb/Dive").small());
            ui.label(egui::RichText::new("B - Boost").small());
            ui.label(egui::RichText::new("F - Fire").small());
        });
}
