use eframe::egui::{self, Color32, Key, Response, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Side panel – linked selection lists
// ---------------------------------------------------------------------------

/// A list row fires on click, or on Enter while it has keyboard focus.
fn activated(ui: &Ui, response: &Response) -> bool {
    response.clicked() || (response.has_focus() && ui.input(|i| i.key_pressed(Key::Enter)))
}

/// Render the observation type and level selectors plus the Plot button.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Two lists share the height left over by headings and the button.
    let list_height = ((ui.available_height() - 140.0) / 2.0).max(80.0);

    // ---- Observation types ----
    ui.strong("Observation Type Selection");
    let mut picked_obs = None;
    ScrollArea::vertical()
        .id_salt("obs_list")
        .max_height(list_height)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for (i, label) in state.obs_types.iter().enumerate() {
                let response = ui.selectable_label(state.selected_obs == Some(i), label);
                if activated(ui, &response) {
                    picked_obs = Some(i);
                }
            }
        });
    if let Some(i) = picked_obs {
        let result = state.select_obs_type(i);
        state.report(result);
    }
    ui.separator();

    // ---- Levels ----
    let heading = match state.level_kind {
        Some(kind) => format!("Observation Level Selection ({})", kind.description()),
        None => "Observation Level Selection".to_string(),
    };
    ui.strong(heading);
    let mut picked_level = None;
    ScrollArea::vertical()
        .id_salt("level_list")
        .max_height(list_height)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for (i, entry) in state.levels.iter().enumerate() {
                let mut text = RichText::new(&entry.label);
                if !entry.has_data {
                    text = text.color(Color32::from_rgb(200, 120, 0));
                }
                let response = ui.selectable_label(state.selected_level == Some(i), text);
                if activated(ui, &response) {
                    picked_level = Some(i);
                }
            }
        });
    if let Some(i) = picked_level {
        let result = state.select_level(i);
        state.report(result);
    }
    ui.separator();

    if ui
        .add_sized([ui.available_width(), 24.0], egui::Button::new("Plot"))
        .clicked()
    {
        let result = state.plot();
        state.report(result);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} observation types, {} regions",
                ds.obs_types().len(),
                ds.region_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open diagnostic file")
        .add_filter("Diagnostic files", &["nc", "nc4", "cdf", "json"])
        .add_filter("netCDF", &["nc", "nc4", "cdf"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        let result = crate::data::loader::load_file(&path).and_then(|ds| state.set_dataset(ds));
        state.report(result);
    }
}
