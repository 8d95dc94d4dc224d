//! A workflow step that copies the directory arriving on its input port to a
//! configured destination, recursively or top-level files only.
//!
//! [`DirectoryCopyStep`] implements the host lifecycle ([`WorkflowStep`]);
//! [`ConfigureDialog`] holds the dialog state and validation, drawn with egui
//! by [`EguiDialogRunner`] when the `gui` feature is enabled.

#[cfg(feature = "gui")]
mod app;
pub mod config;
pub mod copy;
pub mod dialog;
pub mod error;
pub mod host;
pub mod paths;
pub mod settings;
pub mod step;

#[cfg(feature = "gui")]
pub use app::{EguiDialogRunner, NativeFolderPicker};
pub use config::StepConfig;
pub use copy::CopyRequest;
pub use dialog::{ConfigureDialog, ConfirmPrompt, FieldMarker, FolderPicker, IdentifierOccursCount};
pub use error::{StepError, StepResult};
pub use host::WorkflowHost;
pub use settings::Settings;
pub use step::{DialogRunner, DirectoryCopyStep, Port, StepCategory, StepHost, WorkflowStep};
