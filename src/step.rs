use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::StepConfig;
use crate::copy::CopyRequest;
use crate::dialog::ConfigureDialog;
use crate::error::{StepError, StepResult};
use crate::paths;

pub const STEP_NAME: &str = "Directory Copy";

pub const PORT: &str = "http://physiomeproject.org/workflow/1.0/rdf-schema#port";
pub const USES: &str = "http://physiomeproject.org/workflow/1.0/rdf-schema#uses";
pub const DIRECTORY_LOCATION: &str =
    "http://physiomeproject.org/workflow/1.0/rdf-schema#directory_location";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepCategory {
    Sink,
}

/// A port declaration, as a (subject, predicate, object) triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Port {
    pub subject: &'static str,
    pub predicate: &'static str,
    pub object: &'static str,
}

impl Port {
    pub const fn uses(object: &'static str) -> Self {
        Self {
            subject: PORT,
            predicate: USES,
            object,
        }
    }
}

/// Callbacks a step makes into the workflow that hosts it.
pub trait StepHost: Send + Sync {
    /// Number of steps in the workflow whose identifier is `identifier`.
    fn identifier_occurs_count(&self, identifier: &str) -> usize;

    fn configured_changed(&self, _identifier: &str, _configured: bool) {}

    fn execution_done(&self, _identifier: &str) {}
}

/// Shows a [`ConfigureDialog`] modally.
pub trait DialogRunner {
    /// Returns `true` when the user accepted the dialog.
    fn run(&mut self, dialog: &mut ConfigureDialog) -> StepResult<bool>;
}

/// The lifecycle a host drives every workflow step through.
pub trait WorkflowStep {
    fn name(&self) -> &str;
    fn category(&self) -> StepCategory;
    fn ports(&self) -> &[Port];
    fn is_configured(&self) -> bool;
    fn set_port_data(&mut self, index: usize, data: PathBuf) -> StepResult<()>;
    fn configure(&mut self, runner: &mut dyn DialogRunner) -> StepResult<()>;
    fn set_configuration(&mut self, configuration: &Map<String, Value>);
    fn relocate_configuration(&mut self, to_location: &Path);
    fn identifier(&self) -> &str;
    fn set_identifier(&mut self, identifier: &str);
    fn serialize(&self) -> StepResult<String>;
    fn deserialize(&mut self, data: &str) -> StepResult<()>;
    fn execute(&mut self) -> StepResult<()>;
}

/// Sink step copying the directory on its input port to a configured
/// destination.
pub struct DirectoryCopyStep {
    location: PathBuf,
    host: Arc<dyn StepHost>,
    ports: [Port; 1],
    source: Option<PathBuf>,
    config: StepConfig,
    configured: bool,
}

impl DirectoryCopyStep {
    pub fn new(location: impl Into<PathBuf>, host: Arc<dyn StepHost>) -> Self {
        Self {
            location: location.into(),
            host,
            ports: [Port::uses(DIRECTORY_LOCATION)],
            source: None,
            config: StepConfig::default(),
            configured: false,
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    /// Absolute destination directory for the copy.
    pub fn output_location(&self) -> PathBuf {
        paths::resolve(&self.location, &self.config.location)
    }

    fn dialog(&self) -> ConfigureDialog {
        let host = Arc::clone(&self.host);
        let mut dialog = ConfigureDialog::new(Arc::new(move |identifier: &str| {
            host.identifier_occurs_count(identifier)
        }));
        dialog.set_workflow_location(&self.location);
        dialog.set_config(&self.config);
        dialog
    }
}

impl WorkflowStep for DirectoryCopyStep {
    fn name(&self) -> &str {
        STEP_NAME
    }

    fn category(&self) -> StepCategory {
        StepCategory::Sink
    }

    fn ports(&self) -> &[Port] {
        &self.ports
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn set_port_data(&mut self, index: usize, data: PathBuf) -> StepResult<()> {
        if index != 0 {
            return Err(StepError::UnknownPort { index });
        }
        self.source = Some(data);
        Ok(())
    }

    fn configure(&mut self, runner: &mut dyn DialogRunner) -> StepResult<()> {
        let mut dialog = self.dialog();
        dialog.validate();

        let outcome = runner.run(&mut dialog);
        if let Ok(true) = outcome {
            let extra = std::mem::take(&mut self.config.extra);
            self.config = dialog.get_config();
            self.config.extra = extra;
        }
        self.configured = dialog.validate();
        info!(
            identifier = %self.config.identifier,
            configured = self.configured,
            "configuration dialog closed"
        );
        self.host
            .configured_changed(&self.config.identifier, self.configured);
        outcome.map(|_| ())
    }

    fn set_configuration(&mut self, configuration: &Map<String, Value>) {
        let identifier = std::mem::take(&mut self.config.identifier);
        let extra = std::mem::take(&mut self.config.extra);
        self.config = StepConfig::from_host_configuration(configuration, &self.location);
        self.config.identifier = identifier;
        self.config.extra = extra;
    }

    fn relocate_configuration(&mut self, to_location: &Path) {
        for value in self.config.relative_paths_mut() {
            if value.is_empty() {
                continue;
            }
            let absolute = paths::resolve(&self.location, value);
            *value = paths::to_portable(&paths::relative_to(&absolute, to_location).to_string_lossy());
        }
        self.location = to_location.to_path_buf();
    }

    fn identifier(&self) -> &str {
        &self.config.identifier
    }

    fn set_identifier(&mut self, identifier: &str) {
        self.config.identifier = identifier.to_owned();
    }

    fn serialize(&self) -> StepResult<String> {
        self.config.to_json()
    }

    fn deserialize(&mut self, data: &str) -> StepResult<()> {
        let overlay: Map<String, Value> = serde_json::from_str(data)
            .map_err(|source| StepError::json("deserialize step", source))?;
        self.config = self.config.merged_with(overlay)?;
        self.configured = self.dialog().validate();
        if !self.configured {
            warn!(identifier = %self.config.identifier, "loaded configuration is not valid");
        }
        Ok(())
    }

    fn execute(&mut self) -> StepResult<()> {
        let source = self
            .source
            .clone()
            .ok_or(StepError::MissingPortData { index: 0 })?;
        let request = CopyRequest::new(source, self.output_location(), self.config.recurse);
        info!(
            identifier = %self.config.identifier,
            from = %request.src.display(),
            to = %request.dest.display(),
            recurse = request.recurse,
            "copying directory"
        );
        let bytes = request.run()?;
        info!(identifier = %self.config.identifier, bytes, "copy completed");
        self.host.execution_done(&self.config.identifier);
        Ok(())
    }
}
