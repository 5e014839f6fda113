//! Ingredients view - the backend's reference catalog

use egui::RichText;

use crate::dashboard::state::{IngredientsViewState, UiAction};
use crate::dashboard::theme::ThemeColors;
use crate::dashboard::views::{render_error_banner, render_ingredient};

/// Render the ingredient catalog view. Returns a refresh request, if any.
pub fn render_ingredients_view(
    ui: &mut egui::Ui,
    state: &mut IngredientsViewState,
) -> Option<UiAction> {
    let mut action = None;

    ui.heading(RichText::new("Known ingredients").size(24.0).strong());
    ui.add_space(4.0);
    ui.label(
        RichText::new("Risk reference data from the analysis service")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY),
    );
    ui.add_space(12.0);

    ui.horizontal(|ui| {
        if ui
            .add_enabled(!state.loading, egui::Button::new("Refresh"))
            .clicked()
        {
            action = Some(UiAction::RefreshCatalog);
        }
        if state.loading {
            ui.spinner();
        }
        ui.add_space(12.0);
        ui.label(RichText::new("Filter:").color(ThemeColors::TEXT_MUTED));
        ui.text_edit_singleline(&mut state.search);
    });
    ui.add_space(8.0);

    if let Some(error) = &state.error {
        render_error_banner(ui, error);
        ui.add_space(8.0);
    }

    // First visit triggers a fetch automatically.
    if !state.fetched_once && !state.loading {
        action = Some(UiAction::RefreshCatalog);
    }

    if state.entries.is_empty() && state.fetched_once && !state.loading {
        ui.label(RichText::new("No catalog entries.").color(ThemeColors::TEXT_MUTED));
        return action;
    }

    let filter = state.search.to_lowercase();
    egui::ScrollArea::vertical().show(ui, |ui| {
        for ingredient in state
            .entries
            .iter()
            .filter(|i| filter.is_empty() || i.name.to_lowercase().contains(&filter))
        {
            render_ingredient(ui, ingredient);
        }
    });

    action
}
