//! Matrix Viewer application entry point

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use eframe::egui::{self, Context, RichText};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mv_client::{HttpMatrixClient, MatrixService, StorageFormat, TransferFormat};
use mv_core::{NoticeLevel, ViewerState};
use mv_data::{sample_table, tsv, TableData};
use mv_views::{to_grid, MatrixTableView};

mod config;
mod panels;

use config::AppConfig;
use panels::{Action, ControlPanel};

/// Main application state
struct MatrixViewerApp {
    /// Matrix on screen plus pending loads and notices
    state: Arc<ViewerState<TableData>>,

    /// Backend the forms talk to
    service: Arc<dyn MatrixService>,

    table_view: MatrixTableView,
    controls: ControlPanel,
    show_log: bool,

    /// Tokio runtime
    runtime: tokio::runtime::Runtime,

    /// Egui context
    egui_ctx: egui::Context,
}

impl MatrixViewerApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: tokio::runtime::Runtime,
        service: Arc<dyn MatrixService>,
        config: &AppConfig,
    ) -> Self {
        Self {
            state: Arc::new(ViewerState::new()),
            service,
            table_view: MatrixTableView::new(),
            controls: ControlPanel::new(config),
            show_log: false,
            runtime,
            egui_ctx: cc.egui_ctx.clone(),
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Generate { columns, rows } => self.generate(columns, rows),
            Action::Sample { columns, rows } => self.sample(columns, rows),
            Action::Fetch {
                name,
                storage,
                transfer,
            } => self.fetch(name, storage, transfer),
            Action::Store {
                name,
                storage,
                transfer,
            } => self.store(name, storage, transfer),
            Action::ExportTsv(path) => self.export_tsv(path),
            Action::ImportTsv(path) => self.import_tsv(path),
        }
    }

    fn generate(&self, columns: usize, rows: usize) {
        let ticket = self
            .state
            .begin_load(format!("generated {}x{} matrix", rows, columns));

        let ctx = self.egui_ctx.clone();
        let state = self.state.clone();
        let service = self.service.clone();

        self.runtime.spawn(async move {
            let result = service.generate(columns, rows).await.map(TableData::Columnar);
            state.finish_load(ticket, result);
            ctx.request_repaint();
        });
    }

    fn sample(&self, columns: usize, rows: usize) {
        match sample_table(columns, rows, &mut rand::thread_rng()) {
            Ok(table) => self.state.replace(
                TableData::Columnar(table),
                format!("sample {}x{} matrix", rows, columns),
            ),
            Err(e) => self.state.report_error(format!("Failed to build sample matrix: {}", e)),
        }
    }

    fn fetch(&self, name: String, storage: StorageFormat, transfer: TransferFormat) {
        let ticket = self
            .state
            .begin_load(format!("'{}' ({}, via {})", name, storage, transfer));

        let ctx = self.egui_ctx.clone();
        let state = self.state.clone();
        let service = self.service.clone();

        self.runtime.spawn(async move {
            let result = service.fetch(&name, storage, transfer).await;
            state.finish_load(ticket, result);
            ctx.request_repaint();
        });
    }

    fn store(&self, name: String, storage: StorageFormat, transfer: TransferFormat) {
        let Some((_, payload)) = self.state.current() else {
            self.state.report_error("Nothing to store, load a matrix first");
            return;
        };

        let ctx = self.egui_ctx.clone();
        let state = self.state.clone();
        let service = self.service.clone();

        self.runtime.spawn(async move {
            match service.store(&name, storage, transfer, &payload).await {
                Ok(()) => state.info(format!(
                    "Stored '{}' ({}, via {}): {}",
                    name,
                    storage,
                    transfer,
                    payload.describe()
                )),
                Err(e) => state.report_error(format!("Failed to store '{}': {}", name, e)),
            }
            ctx.request_repaint();
        });
    }

    fn export_tsv(&self, path: PathBuf) {
        let Some((_, payload)) = self.state.current() else {
            self.state.report_error("Nothing to export, load a matrix first");
            return;
        };

        let ctx = self.egui_ctx.clone();
        let state = self.state.clone();

        self.runtime.spawn_blocking(move || {
            let result = payload
                .to_matrix()
                .context("Cannot convert table")
                .and_then(|matrix| {
                    let file = File::create(&path)
                        .with_context(|| format!("Cannot create {:?}", path))?;
                    tsv::write_tsv(&matrix, BufWriter::new(file))?;
                    Ok(matrix.num_rows())
                });

            match result {
                Ok(rows) => state.info(format!("Exported {} rows to {:?}", rows, path)),
                Err(e) => state.report_error(format!("Failed to export TSV: {:#}", e)),
            }
            ctx.request_repaint();
        });
    }

    fn import_tsv(&self, path: PathBuf) {
        let ticket = self.state.begin_load(format!("{:?}", path));

        let ctx = self.egui_ctx.clone();
        let state = self.state.clone();

        self.runtime.spawn_blocking(move || {
            let result = File::open(&path)
                .with_context(|| format!("Cannot open {:?}", path))
                .and_then(|file| Ok(tsv::read_tsv(BufReader::new(file))?))
                .map(TableData::Rows)
                .map_err(|e| format!("{:#}", e));
            state.finish_load(ticket, result);
            ctx.request_repaint();
        });
    }

    /// Rebuild the grid when the state moved on since the last frame
    fn sync_table_view(&mut self) {
        if let Some((revision, data)) = self.state.current() {
            if revision != self.table_view.revision() {
                self.table_view.set_grid(revision, to_grid(data));
            }
        }
    }

    fn show_status_bar(&mut self, ctx: &Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(ticket) = self.state.pending() {
                    ui.spinner();
                    ui.label(format!("Loading {}...", ticket.label()));
                    ui.separator();
                }

                if let Some(notice) = self.state.last_notice() {
                    let text = RichText::new(&notice.message);
                    match notice.level {
                        NoticeLevel::Info => ui.label(text),
                        NoticeLevel::Error => ui.label(text.color(ui.visuals().error_fg_color)),
                    };
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.toggle_value(&mut self.show_log, "Log");
                });
            });
        });
    }

    fn show_log_window(&mut self, ctx: &Context) {
        let state = self.state.clone();
        egui::Window::new("Log")
            .open(&mut self.show_log)
            .default_width(480.0)
            .show(ctx, |ui| {
                if ui.button("Clear").clicked() {
                    state.clear_notices();
                }
                ui.separator();

                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for notice in state.notices() {
                            let text = RichText::new(&notice.message);
                            match notice.level {
                                NoticeLevel::Info => ui.label(text),
                                NoticeLevel::Error => {
                                    ui.label(text.color(ui.visuals().error_fg_color))
                                }
                            };
                        }
                    });
            });
    }
}

impl eframe::App for MatrixViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.sync_table_view();

        let has_data = self.state.revision() > 0;
        let mut action = None;
        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    action = self.controls.ui(ui, has_data);
                });
            });
        if let Some(action) = action {
            self.handle_action(action);
        }

        self.show_status_bar(ctx);
        if self.show_log {
            self.show_log_window(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.table_view.ui(ui);
        });
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    info!("Starting Matrix Viewer against {}", config.backend_url);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let service: Arc<dyn MatrixService> = Arc::new(HttpMatrixClient::new(config.client_config())?);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        default_theme: eframe::Theme::Dark,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "Matrix Viewer",
        options,
        Box::new(move |cc| Box::new(MatrixViewerApp::new(cc, runtime, service, &config))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
