//! Scan view - acquisition, submission, and the current result

use egui::RichText;

use crate::dashboard::state::{ScanViewState, UiAction};
use crate::dashboard::theme::ThemeColors;
use crate::dashboard::views::{render_error_banner, render_result};
use crate::scan::{ScanController, ScanPhase};

/// Render the scan view. Returns the action the user triggered, if any.
pub fn render_scan_view(
    ui: &mut egui::Ui,
    controller: &ScanController,
    state: &mut ScanViewState,
) -> Option<UiAction> {
    let mut action = None;

    ui.heading(RichText::new("Scan a food label").size(24.0).strong());
    ui.add_space(4.0);
    ui.label(
        RichText::new("Point your camera at the ingredient list or upload a photo")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY),
    );
    ui.add_space(12.0);

    if let Some(error) = controller.last_error() {
        render_error_banner(ui, error);
        ui.add_space(8.0);
    }

    let phase = controller.phase();

    // Acquisition controls
    ui.horizontal(|ui| {
        if controller.is_camera_active() {
            if ui
                .add(button("Capture", ThemeColors::ACCENT_PRIMARY))
                .clicked()
            {
                action = Some(UiAction::CapturePhoto);
            }
            if ui.add(button("Cancel", ThemeColors::BG_LIGHT)).clicked() {
                action = Some(UiAction::StopCamera);
            }
        } else {
            let idle = phase != ScanPhase::Scanning;
            if ui
                .add_enabled(idle, button("Use Camera", ThemeColors::ACCENT_PRIMARY))
                .clicked()
            {
                action = Some(UiAction::StartCamera);
            }
            if ui
                .add_enabled(idle, button("Upload Photo", ThemeColors::BG_LIGHT))
                .clicked()
            {
                action = Some(UiAction::PickFile);
            }
        }
    });

    ui.add_space(12.0);

    // Live viewfinder while the camera is open
    if controller.is_camera_active() {
        if let Some(texture) = &state.viewfinder_texture {
            ui.add(
                egui::Image::new(texture)
                    .max_height(360.0)
                    .rounding(egui::Rounding::same(8.0)),
            );
        } else {
            ui.spinner();
        }
        ui.add_space(12.0);
    }

    // Selected image preview and submission
    if let Some(image) = controller.selected_image() {
        if let Some(texture) = &state.preview_texture {
            ui.add(
                egui::Image::new(texture)
                    .max_height(300.0)
                    .rounding(egui::Rounding::same(8.0)),
            );
        }
        ui.label(
            RichText::new(format!(
                "{} ({:.1} KB)",
                image.file_name,
                image.len() as f64 / 1024.0
            ))
            .color(ThemeColors::TEXT_MUTED),
        );
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            let can_submit = !controller.is_scan_in_flight();
            if ui
                .add_enabled(can_submit, button("Analyze", ThemeColors::ACCENT_PRIMARY))
                .clicked()
            {
                action = Some(UiAction::StartScan);
            }
            if ui
                .add_enabled(can_submit, button("Clear", ThemeColors::BG_LIGHT))
                .clicked()
            {
                action = Some(UiAction::Reset);
            }
        });
    }

    if controller.is_scan_in_flight() {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new("Analyzing label...").color(ThemeColors::TEXT_SECONDARY));
        });
    }

    // Current result
    if let Some(result) = controller.current_result() {
        ui.add_space(16.0);
        ui.separator();
        ui.add_space(8.0);
        render_result(ui, result);
        ui.add_space(8.0);
        if ui
            .add(button("Scan Another", ThemeColors::ACCENT_PRIMARY))
            .clicked()
        {
            action = Some(UiAction::Reset);
        }
    }

    action
}

fn button(text: &str, fill: egui::Color32) -> egui::Button<'static> {
    let text_color = if fill == ThemeColors::ACCENT_PRIMARY {
        ThemeColors::BG_DARK
    } else {
        ThemeColors::TEXT_PRIMARY
    };
    egui::Button::new(RichText::new(text.to_owned()).color(text_color))
        .fill(fill)
        .min_size(egui::vec2(120.0, 36.0))
}
