//! Control panel forms for generating, fetching and storing matrices

use std::path::PathBuf;

use eframe::egui::{self, Ui};
use mv_client::{StorageFormat, TransferFormat};

use crate::config::AppConfig;

/// Largest shape the generate form lets through
const MAX_ROWS: usize = 1_000_000;
const MAX_COLUMNS: usize = 1_000;

/// Something the user asked for in the control panel
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Generate {
        columns: usize,
        rows: usize,
    },
    Sample {
        columns: usize,
        rows: usize,
    },
    Fetch {
        name: String,
        storage: StorageFormat,
        transfer: TransferFormat,
    },
    Store {
        name: String,
        storage: StorageFormat,
        transfer: TransferFormat,
    },
    ExportTsv(PathBuf),
    ImportTsv(PathBuf),
}

/// Form fields kept between frames
pub struct ControlPanel {
    rows: usize,
    columns: usize,

    fetch_name: String,
    fetch_storage: StorageFormat,
    fetch_transfer: TransferFormat,

    store_name: String,
    store_storage: StorageFormat,
    store_transfer: TransferFormat,

    tsv_path: String,
}

impl ControlPanel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            rows: config.default_rows.clamp(1, MAX_ROWS),
            columns: config.default_columns.clamp(1, MAX_COLUMNS),
            fetch_name: String::new(),
            fetch_storage: config.storage_format,
            fetch_transfer: config.transfer_format,
            store_name: String::new(),
            store_storage: config.storage_format,
            store_transfer: config.transfer_format,
            tsv_path: "matrix.tsv".to_string(),
        }
    }

    /// Draw the forms; `has_data` enables the actions that need a current matrix
    pub fn ui(&mut self, ui: &mut Ui, has_data: bool) -> Option<Action> {
        let mut action = None;

        ui.heading("Generate");
        egui::Grid::new("generate_grid").num_columns(2).show(ui, |ui| {
            ui.label("Rows:");
            ui.add(egui::DragValue::new(&mut self.rows).clamp_range(1..=MAX_ROWS));
            ui.end_row();

            ui.label("Columns:");
            ui.add(egui::DragValue::new(&mut self.columns).clamp_range(1..=MAX_COLUMNS));
            ui.end_row();
        });
        ui.horizontal(|ui| {
            if ui.button("Generate").on_hover_text("Ask the backend for a random matrix").clicked() {
                action = Some(Action::Generate {
                    columns: self.columns,
                    rows: self.rows,
                });
            }
            if ui.button("Sample").on_hover_text("Build a random matrix locally").clicked() {
                action = Some(Action::Sample {
                    columns: self.columns,
                    rows: self.rows,
                });
            }
        });

        ui.separator();
        ui.heading("Fetch");
        egui::Grid::new("fetch_grid").num_columns(2).show(ui, |ui| {
            ui.label("Name:");
            ui.text_edit_singleline(&mut self.fetch_name);
            ui.end_row();

            ui.label("Storage:");
            storage_combo(ui, "fetch_storage", &mut self.fetch_storage);
            ui.end_row();

            ui.label("Transfer:");
            transfer_combo(ui, "fetch_transfer", &mut self.fetch_transfer);
            ui.end_row();
        });
        let fetch_name = self.fetch_name.trim();
        if ui.add_enabled(!fetch_name.is_empty(), egui::Button::new("Fetch")).clicked() {
            action = Some(Action::Fetch {
                name: fetch_name.to_string(),
                storage: self.fetch_storage,
                transfer: self.fetch_transfer,
            });
        }

        ui.separator();
        ui.heading("Store");
        egui::Grid::new("store_grid").num_columns(2).show(ui, |ui| {
            ui.label("Name:");
            ui.text_edit_singleline(&mut self.store_name);
            ui.end_row();

            ui.label("Storage:");
            storage_combo(ui, "store_storage", &mut self.store_storage);
            ui.end_row();

            ui.label("Transfer:");
            transfer_combo(ui, "store_transfer", &mut self.store_transfer);
            ui.end_row();
        });
        let store_name = self.store_name.trim();
        if ui
            .add_enabled(has_data && !store_name.is_empty(), egui::Button::new("Store"))
            .clicked()
        {
            action = Some(Action::Store {
                name: store_name.to_string(),
                storage: self.store_storage,
                transfer: self.store_transfer,
            });
        }

        ui.separator();
        ui.heading("TSV file");
        ui.text_edit_singleline(&mut self.tsv_path);
        let tsv_path = self.tsv_path.trim();
        ui.horizontal(|ui| {
            if ui.add_enabled(!tsv_path.is_empty(), egui::Button::new("Import")).clicked() {
                action = Some(Action::ImportTsv(PathBuf::from(tsv_path)));
            }
            if ui
                .add_enabled(has_data && !tsv_path.is_empty(), egui::Button::new("Export"))
                .clicked()
            {
                action = Some(Action::ExportTsv(PathBuf::from(tsv_path)));
            }
        });

        action
    }
}

fn storage_combo(ui: &mut Ui, id: &str, value: &mut StorageFormat) {
    egui::ComboBox::from_id_source(id)
        .selected_text(value.as_str())
        .show_ui(ui, |ui| {
            for format in StorageFormat::ALL {
                ui.selectable_value(value, format, format.as_str());
            }
        });
}

fn transfer_combo(ui: &mut Ui, id: &str, value: &mut TransferFormat) {
    egui::ComboBox::from_id_source(id)
        .selected_text(value.as_str())
        .show_ui(ui, |ui| {
            for format in TransferFormat::ALL {
                ui.selectable_value(value, format, format.as_str());
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forms_start_from_config() {
        let config = AppConfig {
            default_rows: 0,
            default_columns: 25,
            storage_format: StorageFormat::Tsv,
            transfer_format: TransferFormat::Json,
            ..AppConfig::default()
        };
        let panel = ControlPanel::new(&config);

        assert_eq!(panel.rows, 1);
        assert_eq!(panel.columns, 25);
        assert_eq!(panel.fetch_storage, StorageFormat::Tsv);
        assert_eq!(panel.store_transfer, TransferFormat::Json);
        assert!(panel.fetch_name.is_empty());
    }
}
