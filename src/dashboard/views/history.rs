//! History view - recent results, local and server-side

use egui::RichText;

use crate::dashboard::state::{HistoryViewState, UiAction};
use crate::dashboard::theme::ThemeColors;
use crate::dashboard::views::{render_error_banner, render_result};
use crate::scan::history::{ScanHistory, HISTORY_CAPACITY};

/// Render the history view. Returns a refresh request, if any.
pub fn render_history_view(
    ui: &mut egui::Ui,
    history: &ScanHistory,
    state: &mut HistoryViewState,
) -> Option<UiAction> {
    let mut action = None;

    ui.heading(RichText::new("Recent scans").size(24.0).strong());
    ui.add_space(4.0);
    ui.label(
        RichText::new(format!(
            "The {} most recent results from this session, newest first",
            HISTORY_CAPACITY
        ))
        .size(14.0)
        .color(ThemeColors::TEXT_SECONDARY),
    );
    ui.add_space(12.0);

    egui::ScrollArea::vertical().show(ui, |ui| {
        if history.is_empty() {
            ui.label(RichText::new("No scans yet.").color(ThemeColors::TEXT_MUTED));
        } else {
            for (index, result) in history.iter().enumerate() {
                let title = format!("{}  -  {}", index + 1, result.scan_id);
                egui::CollapsingHeader::new(RichText::new(title).strong())
                    .default_open(index == 0)
                    .show(ui, |ui| {
                        render_result(ui, result);
                    });
                ui.add_space(6.0);
            }
        }

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(8.0);

        // Server-side scan feed
        ui.horizontal(|ui| {
            ui.heading(RichText::new("Server history").size(18.0));
            if ui
                .add_enabled(!state.loading, egui::Button::new("Refresh"))
                .clicked()
            {
                action = Some(UiAction::RefreshRemoteScans);
            }
            if state.loading {
                ui.spinner();
            }
        });
        ui.add_space(8.0);

        if let Some(error) = &state.error {
            render_error_banner(ui, error);
            ui.add_space(8.0);
        }

        // First visit triggers a fetch automatically.
        if !state.fetched_once && !state.loading {
            action = Some(UiAction::RefreshRemoteScans);
        }

        if state.remote.is_empty() && state.fetched_once && !state.loading {
            ui.label(RichText::new("No scans on the server.").color(ThemeColors::TEXT_MUTED));
        } else {
            for result in &state.remote {
                egui::CollapsingHeader::new(RichText::new(&result.scan_id).strong())
                    .id_salt(format!("remote_{}", result.scan_id))
                    .show(ui, |ui| {
                        render_result(ui, result);
                    });
                ui.add_space(6.0);
            }
        }
    });

    action
}
