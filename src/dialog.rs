//! Headless model of the step's configuration dialog.
//!
//! The model owns the field values, decides their validity and converts to
//! and from [`StepConfig`]. Drawing is left to a front end (see `app.rs`);
//! the folder picker and the "save anyway?" question are reached through
//! the [`FolderPicker`] and [`ConfirmPrompt`] traits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::StepConfig;
use crate::paths;

pub const CHOOSE_DIRECTORY_TITLE: &str = "Select Directory";
pub const INVALID_CONFIGURATION_TITLE: &str = "Invalid Configuration";
pub const INVALID_CONFIGURATION_MESSAGE: &str = "This configuration is invalid. Unpredictable behaviour may result if you choose 'Yes', are you sure you want to save this configuration?";

/// Counts how many steps in the workflow currently use an identifier.
pub type IdentifierOccursCount = Arc<dyn Fn(&str) -> usize + Send + Sync>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldMarker {
    #[default]
    Normal,
    Invalid,
}

impl FieldMarker {
    const fn from_valid(valid: bool) -> Self {
        if valid { Self::Normal } else { Self::Invalid }
    }
}

/// A native or in-app directory chooser.
pub trait FolderPicker {
    /// Returns the chosen directory, or `None` when the user cancelled.
    fn pick_folder(&mut self, title: &str, start: &Path) -> Option<PathBuf>;
}

impl<F> FolderPicker for F
where
    F: FnMut(&str, &Path) -> Option<PathBuf>,
{
    fn pick_folder(&mut self, title: &str, start: &Path) -> Option<PathBuf> {
        self(title, start)
    }
}

/// Yes/no question put to the user.
pub trait ConfirmPrompt {
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str, &str) -> bool,
{
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        self(title, message)
    }
}

#[derive(Clone)]
pub struct ConfigureDialog {
    identifier: String,
    recurse: bool,
    /// Destination as displayed, in native form.
    location: String,
    /// Last directory picked, absolute. Empty when nothing was picked yet.
    previous_location: PathBuf,
    /// Identifier at the last `set_config`/`get_config`; one occurrence of
    /// it in the workflow is this step itself.
    previous_identifier: String,
    workflow_location: Option<PathBuf>,
    identifier_occurs_count: IdentifierOccursCount,
    identifier_marker: FieldMarker,
    location_marker: FieldMarker,
}

impl ConfigureDialog {
    pub fn new(identifier_occurs_count: IdentifierOccursCount) -> Self {
        let defaults = StepConfig::default();
        Self {
            identifier: defaults.identifier,
            recurse: defaults.recurse,
            location: defaults.location,
            previous_location: PathBuf::new(),
            previous_identifier: String::new(),
            workflow_location: None,
            identifier_occurs_count,
            identifier_marker: FieldMarker::Normal,
            location_marker: FieldMarker::Normal,
        }
    }

    pub fn set_workflow_location(&mut self, location: impl Into<PathBuf>) {
        self.workflow_location = Some(location.into());
    }

    pub fn workflow_location(&self) -> Option<&Path> {
        self.workflow_location.as_deref()
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn identifier_mut(&mut self) -> &mut String {
        &mut self.identifier
    }

    pub fn recurse(&self) -> bool {
        self.recurse
    }

    pub fn recurse_mut(&mut self) -> &mut bool {
        &mut self.recurse
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut String {
        &mut self.location
    }

    pub fn previous_location(&self) -> &Path {
        &self.previous_location
    }

    pub fn identifier_marker(&self) -> FieldMarker {
        self.identifier_marker
    }

    pub fn location_marker(&self) -> FieldMarker {
        self.location_marker
    }

    /// Re-checks every field, updates the field markers and reports whether
    /// the whole configuration is valid.
    pub fn validate(&mut self) -> bool {
        let identifier_valid = self.identifier_is_valid();
        let location_valid = self.location_is_valid();
        self.identifier_marker = FieldMarker::from_valid(identifier_valid);
        self.location_marker = FieldMarker::from_valid(location_valid);
        debug!(
            identifier = %self.identifier,
            identifier_valid,
            location_valid,
            "validated configuration"
        );
        identifier_valid && location_valid
    }

    fn identifier_is_valid(&self) -> bool {
        if self.identifier.is_empty() {
            return false;
        }
        match (self.identifier_occurs_count)(&self.identifier) {
            0 => true,
            1 => self.previous_identifier == self.identifier,
            _ => false,
        }
    }

    fn location_is_valid(&self) -> bool {
        if self.location.is_empty() {
            return false;
        }
        let output = self.output_location(None);
        match &self.workflow_location {
            Some(root) => root.join(output).is_dir(),
            None => Path::new(&output).is_dir(),
        }
    }

    fn output_location(&self, location: Option<&Path>) -> String {
        let display = location.map_or_else(|| PathBuf::from(&self.location), Path::to_path_buf);
        match &self.workflow_location {
            Some(root) if display.is_absolute() => {
                paths::relative_to(&display, root).to_string_lossy().into_owned()
            }
            _ => display.to_string_lossy().into_owned(),
        }
    }

    pub fn chooser_start(&self) -> PathBuf {
        if !self.previous_location.as_os_str().is_empty() {
            self.previous_location.clone()
        } else if let Some(root) = &self.workflow_location {
            root.clone()
        } else {
            PathBuf::from(".")
        }
    }

    /// Shows `picker` and applies a non-empty selection.
    pub fn choose_directory(&mut self, picker: &mut dyn FolderPicker) -> bool {
        let start = self.chooser_start();
        match picker.pick_folder(CHOOSE_DIRECTORY_TITLE, &start) {
            Some(location) if !location.as_os_str().is_empty() => {
                self.directory_chosen(&location);
                true
            }
            _ => false,
        }
    }

    /// Records `location` as the previous pick and displays it, relative to
    /// the workflow root where possible.
    pub fn directory_chosen(&mut self, location: &Path) {
        self.previous_location = paths::absolute(location);
        self.location = self.output_location(Some(location));
        self.validate();
    }

    /// Accepts a valid configuration outright; an invalid one only when the
    /// user confirms saving it anyway.
    pub fn accept(&mut self, prompt: &mut dyn ConfirmPrompt) -> bool {
        if self.validate() {
            return true;
        }
        prompt.confirm(INVALID_CONFIGURATION_TITLE, INVALID_CONFIGURATION_MESSAGE)
    }

    /// The dialog's values as a portable record. The current identifier
    /// becomes the baseline for later uniqueness checks.
    pub fn get_config(&mut self) -> StepConfig {
        self.previous_identifier = self.identifier.clone();
        let previous_location = if self.previous_location.as_os_str().is_empty() {
            String::new()
        } else {
            paths::to_portable(&self.output_location(Some(&self.previous_location)))
        };
        StepConfig {
            identifier: self.identifier.clone(),
            recurse: self.recurse,
            location: paths::to_portable(&self.output_location(None)),
            previous_location,
            ..StepConfig::default()
        }
    }

    pub fn set_config(&mut self, config: &StepConfig) {
        self.previous_identifier = config.identifier.clone();
        self.identifier = config.identifier.clone();
        self.recurse = config.recurse;
        self.location = paths::to_native(&config.location);
        self.previous_location = if config.previous_location.is_empty() {
            PathBuf::new()
        } else {
            match &self.workflow_location {
                Some(root) => paths::resolve(root, &config.previous_location),
                None => paths::absolute(Path::new(&paths::to_native(&config.previous_location))),
            }
        };
    }
}
