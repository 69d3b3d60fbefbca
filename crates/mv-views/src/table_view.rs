//! Table view rendering a [`GridProps`]
//!
//! Only the rows scrolled into view are laid out, and their cells are pulled
//! from the grid getter on every frame.

use egui::{Align, Layout, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::grid::{CellKind, GridProps};

/// Configuration for table views
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub show_row_numbers: bool,
    pub striped_rows: bool,
    pub resizable_columns: bool,
    pub column_width: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            show_row_numbers: true,
            striped_rows: true,
            resizable_columns: true,
            column_width: 80.0,
        }
    }
}

/// Spreadsheet-like view over the current grid
pub struct MatrixTableView {
    pub config: TableConfig,
    grid: GridProps,
    /// Revision of the state value `grid` was built from
    revision: u64,
}

impl MatrixTableView {
    pub fn new() -> Self {
        Self {
            config: TableConfig::default(),
            grid: GridProps::empty(),
            revision: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn grid(&self) -> &GridProps {
        &self.grid
    }

    /// Swap in a new grid, built from state revision `revision`
    pub fn set_grid(&mut self, revision: u64, grid: GridProps) {
        tracing::debug!(
            "Table view now shows revision {} ({} rows, {} columns)",
            revision,
            grid.num_rows(),
            grid.columns().len()
        );
        self.grid = grid;
        self.revision = revision;
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        let grid = &self.grid;

        ui.horizontal(|ui| {
            ui.label(format!("Rows: {}", grid.num_rows()));
            ui.separator();
            ui.label(format!("Columns: {}", grid.columns().len()));
        });
        ui.add_space(4.0);

        if grid.columns().is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No data to display");
            });
            return;
        }

        ScrollArea::horizontal()
            .id_source("matrix_table_scroll")
            .show(ui, |ui| {
                Self::render_table(ui, grid, &self.config);
            });
    }

    fn render_table(ui: &mut Ui, grid: &GridProps, config: &TableConfig) {
        let text_height = egui::TextStyle::Body.resolve(ui.style()).size * 1.5;
        let missing_color = ui.style().visuals.weak_text_color();

        let mut builder = TableBuilder::new(ui)
            .striped(config.striped_rows)
            .resizable(config.resizable_columns)
            .cell_layout(Layout::right_to_left(Align::Center))
            .min_scrolled_height(0.0)
            .vscroll(true);

        if config.show_row_numbers {
            builder = builder.column(Column::initial(50.0).at_least(40.0));
        }
        builder = builder.columns(
            Column::initial(config.column_width)
                .at_least(40.0)
                .clip(true)
                .resizable(config.resizable_columns),
            grid.columns().len(),
        );

        builder
            .header(20.0, |mut header| {
                if config.show_row_numbers {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                }

                for column in grid.columns() {
                    header.col(|ui| {
                        let response = ui.strong(&column.title);
                        response.context_menu(|ui| {
                            ui.label(RichText::new(&column.title).strong());
                            ui.separator();

                            if ui.button("📋 Copy Column Name").clicked() {
                                ui.output_mut(|o| o.copied_text = column.id.clone());
                                ui.close_menu();
                            }
                        });
                    });
                }
            })
            .body(|body| {
                body.rows(text_height, grid.num_rows(), |row_index, mut row| {
                    if config.show_row_numbers {
                        row.col(|ui| {
                            ui.label(RichText::new(row_index.to_string()).weak());
                        });
                    }

                    for col_index in 0..grid.columns().len() {
                        row.col(|ui| {
                            let cell = grid.cell(col_index, row_index);
                            let response = match cell.kind {
                                CellKind::Number => ui.label(&cell.display_data),
                                CellKind::Missing => ui.colored_label(missing_color, "–"),
                            };

                            response.context_menu(|ui| {
                                if ui.button("📋 Copy Value").clicked() {
                                    ui.output_mut(|o| o.copied_text = cell.data.to_string());
                                    ui.close_menu();
                                }
                                ui.separator();
                                ui.label(format!("Column: {}", grid.columns()[col_index].title));
                                ui.label(format!("Row: {}", row_index));
                            });
                        });
                    }
                });
            });
    }
}

impl Default for MatrixTableView {
    fn default() -> Self {
        Self::new()
    }
}
