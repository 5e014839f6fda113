//! Dashboard theme and styling
//!
//! Clean light-on-dark palette with risk-level accent colors.

use egui::{Color32, Rounding, Stroke, Visuals};

use crate::api::models::RiskLevel;

/// Color palette
pub struct ThemeColors;

impl ThemeColors {
    // Backgrounds
    pub const BG_DARK: Color32 = Color32::from_rgb(20, 24, 22);
    pub const BG_MEDIUM: Color32 = Color32::from_rgb(30, 36, 33);
    pub const BG_LIGHT: Color32 = Color32::from_rgb(42, 50, 46);
    pub const BG_HOVER: Color32 = Color32::from_rgb(54, 64, 59);

    // Accents
    pub const ACCENT_PRIMARY: Color32 = Color32::from_rgb(82, 196, 140);
    pub const ACCENT_ERROR: Color32 = Color32::from_rgb(231, 76, 60);

    // Text
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(238, 242, 240);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(158, 170, 164);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(104, 116, 110);

    // Risk levels
    pub const RISK_SAFE: Color32 = Color32::from_rgb(46, 204, 113);
    pub const RISK_CAUTION: Color32 = Color32::from_rgb(255, 193, 7);
    pub const RISK_BANNED: Color32 = Color32::from_rgb(231, 76, 60);
    pub const RISK_UNKNOWN: Color32 = Color32::from_rgb(158, 170, 164);
}

/// Accent color for a risk classification
pub fn risk_color(level: RiskLevel) -> Color32 {
    match level {
        RiskLevel::Safe => ThemeColors::RISK_SAFE,
        RiskLevel::Caution => ThemeColors::RISK_CAUTION,
        RiskLevel::Banned => ThemeColors::RISK_BANNED,
        RiskLevel::Unknown => ThemeColors::RISK_UNKNOWN,
    }
}

/// Blend a color with the given alpha (0-255)
pub fn color_with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Apply the theme to egui
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = Visuals::dark();

    visuals.window_fill = ThemeColors::BG_MEDIUM;
    visuals.panel_fill = ThemeColors::BG_DARK;
    visuals.faint_bg_color = ThemeColors::BG_LIGHT;
    visuals.extreme_bg_color = ThemeColors::BG_DARK;

    visuals.widgets.noninteractive.bg_fill = ThemeColors::BG_MEDIUM;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(6.0);

    visuals.widgets.inactive.bg_fill = ThemeColors::BG_LIGHT;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_PRIMARY);
    visuals.widgets.inactive.rounding = Rounding::same(6.0);

    visuals.widgets.hovered.bg_fill = ThemeColors::BG_HOVER;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_PRIMARY);
    visuals.widgets.hovered.rounding = Rounding::same(6.0);

    visuals.widgets.active.bg_fill = ThemeColors::ACCENT_PRIMARY;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, ThemeColors::BG_DARK);
    visuals.widgets.active.rounding = Rounding::same(6.0);

    visuals.selection.bg_fill = color_with_alpha(ThemeColors::ACCENT_PRIMARY, 77);
    visuals.selection.stroke = Stroke::new(1.0, ThemeColors::ACCENT_PRIMARY);
    visuals.hyperlink_color = ThemeColors::ACCENT_PRIMARY;

    style.visuals = visuals;
    ctx.set_style(style);
}
