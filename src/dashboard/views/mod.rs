//! Dashboard views

mod history;
mod ingredients;
mod scan;

pub use history::render_history_view;
pub use ingredients::render_ingredients_view;
pub use scan::render_scan_view;

use egui::RichText;

use crate::api::models::{Ingredient, RiskLevel, ScanResult};
use crate::dashboard::theme::{color_with_alpha, risk_color, ThemeColors};

/// Render one scan result: risk summary, ingredient list, nutrition facts,
/// and the raw OCR text. Shared between the scan and history views.
pub fn render_result(ui: &mut egui::Ui, result: &ScanResult) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("Scan {}", result.scan_id)).strong());
        ui.label(
            RichText::new(format!("{:.2}s", result.processing_time))
                .color(ThemeColors::TEXT_MUTED),
        );
    });

    // Risk distribution summary
    ui.horizontal(|ui| {
        for level in [RiskLevel::Safe, RiskLevel::Caution, RiskLevel::Banned] {
            let count = result.count_at(level);
            if count > 0 {
                ui.label(
                    RichText::new(format!("{} {}", count, level.label()))
                        .color(risk_color(level)),
                );
            }
        }
    });

    ui.add_space(6.0);

    for ingredient in &result.parsed_ingredients {
        render_ingredient(ui, ingredient);
    }

    if !result.nutritional_info.is_empty() {
        ui.add_space(6.0);
        ui.collapsing("Nutrition facts", |ui| {
            egui::Grid::new(format!("nutrition_{}", result.scan_id))
                .num_columns(2)
                .spacing([24.0, 4.0])
                .show(ui, |ui| {
                    for (key, value) in &result.nutritional_info {
                        ui.label(RichText::new(key).color(ThemeColors::TEXT_MUTED));
                        ui.label(display_json(value));
                        ui.end_row();
                    }
                });
        });
    }

    if !result.ocr_text.is_empty() {
        ui.collapsing("Label text", |ui| {
            ui.label(RichText::new(&result.ocr_text).color(ThemeColors::TEXT_SECONDARY));
        });
    }
}

/// Render one ingredient row with its risk badge and details.
pub fn render_ingredient(ui: &mut egui::Ui, ingredient: &Ingredient) {
    let color = risk_color(ingredient.risk_level);

    egui::Frame::none()
        .fill(color_with_alpha(color, 18))
        .rounding(egui::Rounding::same(6.0))
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(&ingredient.name).strong());
                ui.label(RichText::new(ingredient.risk_level.label()).color(color));
                if ingredient.confidence > 0.0 {
                    ui.label(
                        RichText::new(format!("{:.0}%", ingredient.confidence * 100.0))
                            .color(ThemeColors::TEXT_MUTED),
                    );
                }
            });

            if !ingredient.description.is_empty() {
                ui.label(
                    RichText::new(&ingredient.description).color(ThemeColors::TEXT_SECONDARY),
                );
            }

            if !ingredient.banned_in.is_empty() {
                for (jurisdiction, detail) in &ingredient.banned_in {
                    ui.label(
                        RichText::new(format!("{}: {}", jurisdiction, detail))
                            .color(ThemeColors::RISK_BANNED)
                            .small(),
                    );
                }
            }

            for source in &ingredient.sources {
                ui.label(RichText::new(source).color(ThemeColors::TEXT_MUTED).small());
            }
        });
    ui.add_space(4.0);
}

/// Render an error banner.
pub fn render_error_banner(ui: &mut egui::Ui, message: &str) {
    egui::Frame::none()
        .fill(color_with_alpha(ThemeColors::ACCENT_ERROR, 51))
        .rounding(egui::Rounding::same(6.0))
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("Error:")
                        .color(ThemeColors::ACCENT_ERROR)
                        .strong(),
                );
                ui.label(RichText::new(message).color(ThemeColors::TEXT_PRIMARY));
            });
        });
}

fn display_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
