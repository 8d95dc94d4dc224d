use crate::dialog::{
    ConfigureDialog, FieldMarker, FolderPicker, INVALID_CONFIGURATION_MESSAGE,
    INVALID_CONFIGURATION_TITLE,
};
use crate::error::{StepError, StepResult};
use crate::step::DialogRunner;
use eframe::App;
use eframe::egui::{self, CentralPanel, Color32, Context, TextEdit, TopBottomPanel};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

const INVALID_FILL: Color32 = Color32::from_rgba_premultiplied(47, 0, 0, 50);

struct DialogSession {
    dialog: ConfigureDialog,
    accepted: bool,
}

/// Platform folder dialog.
#[derive(Debug, Default)]
pub struct NativeFolderPicker;

impl FolderPicker for NativeFolderPicker {
    fn pick_folder(&mut self, title: &str, start: &Path) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title(title)
            .set_directory(start)
            .pick_folder()
    }
}

struct ConfigureDialogApp {
    session: Arc<Mutex<DialogSession>>,
    picker: Box<dyn FolderPicker>,
    confirming: bool,
}

impl ConfigureDialogApp {
    fn new(session: Arc<Mutex<DialogSession>>, picker: Box<dyn FolderPicker>) -> Self {
        Self {
            session,
            picker,
            confirming: false,
        }
    }

    fn browse(&mut self, dialog: &mut ConfigureDialog) {
        if !dialog.choose_directory(self.picker.as_mut()) {
            debug!("directory selection cancelled");
        }
    }
}

fn marked_field(
    ui: &mut egui::Ui,
    marker: FieldMarker,
    add: impl FnOnce(&mut egui::Ui) -> egui::Response,
) -> egui::Response {
    ui.scope(|ui| {
        if marker == FieldMarker::Invalid {
            ui.visuals_mut().extreme_bg_color = INVALID_FILL;
        }
        add(ui)
    })
    .inner
}

impl App for ConfigureDialogApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let session = Arc::clone(&self.session);
        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
        let mut finished = None;

        TopBottomPanel::bottom("buttons").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    // The warning window asks the question on the next frames.
                    if session.dialog.accept(&mut |_: &str, _: &str| false) {
                        finished = Some(true);
                    } else {
                        self.confirming = true;
                    }
                }
                if ui.button("Cancel").clicked() {
                    finished = Some(false);
                }
            });
        });

        let mut browse = false;
        CentralPanel::default().show(ctx, |ui| {
            let mut changed = false;
            egui::Grid::new("configuration").num_columns(3).show(ui, |ui| {
                ui.label("Identifier:");
                let marker = session.dialog.identifier_marker();
                changed |= marked_field(ui, marker, |ui| {
                    ui.add(TextEdit::singleline(session.dialog.identifier_mut()).desired_width(300.0))
                })
                .changed();
                ui.end_row();

                ui.label("Location:");
                let marker = session.dialog.location_marker();
                changed |= marked_field(ui, marker, |ui| {
                    ui.add(TextEdit::singleline(session.dialog.location_mut()).desired_width(300.0))
                })
                .changed();
                if ui.button("...").clicked() {
                    browse = true;
                }
                ui.end_row();
            });
            ui.checkbox(session.dialog.recurse_mut(), "Recurse Directory Structure");
            if changed {
                session.dialog.validate();
            }
        });

        if browse {
            self.browse(&mut session.dialog);
        }

        if self.confirming {
            egui::Window::new(INVALID_CONFIGURATION_TITLE)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(INVALID_CONFIGURATION_MESSAGE);
                    ui.horizontal(|ui| {
                        if ui.button("Yes").clicked() {
                            finished = Some(true);
                        }
                        if ui.button("No").clicked() {
                            self.confirming = false;
                        }
                    });
                });
        }

        if let Some(accepted) = finished {
            session.accepted = accepted;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

/// Runs the dialog in its own native window, blocking until it closes.
#[derive(Debug, Default)]
pub struct EguiDialogRunner;

impl DialogRunner for EguiDialogRunner {
    fn run(&mut self, dialog: &mut ConfigureDialog) -> StepResult<bool> {
        let session = Arc::new(Mutex::new(DialogSession {
            dialog: dialog.clone(),
            accepted: false,
        }));
        let app = ConfigureDialogApp::new(Arc::clone(&session), Box::new(NativeFolderPicker));
        let native_options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size([520.0, 160.0]),
            ..Default::default()
        };
        eframe::run_native(
            "Configure Directory Copy",
            native_options,
            Box::new(|_| Box::new(app)),
        )
        .map_err(|err| StepError::Gui {
            message: err.to_string(),
        })?;

        let session = session.lock().unwrap_or_else(PoisonError::into_inner);
        *dialog = session.dialog.clone();
        Ok(session.accepted)
    }
}
