use directory_copy_step::{
    ConfigureDialog, DialogRunner, DirectoryCopyStep, StepError, StepResult, WorkflowHost,
    WorkflowStep,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

/// Fills in the dialog the way a user would and presses OK.
struct PickDestination<'a> {
    identifier: &'a str,
    destination: &'a Path,
    recurse: bool,
}

impl DialogRunner for PickDestination<'_> {
    fn run(&mut self, dialog: &mut ConfigureDialog) -> StepResult<bool> {
        *dialog.identifier_mut() = self.identifier.to_owned();
        *dialog.recurse_mut() = self.recurse;
        let destination = self.destination.to_path_buf();
        dialog.choose_directory(&mut |_: &str, _: &Path| Some(destination.clone()));
        Ok(dialog.accept(&mut |_: &str, _: &str| false))
    }
}

struct Workflow {
    root: TempDir,
    host: Arc<WorkflowHost>,
}

impl Workflow {
    fn new() -> Result<Self, Box<dyn Error>> {
        let root = tempfile::Builder::new().prefix("workflow-").tempdir()?;
        let src = root.path().join("src");
        fs::create_dir_all(src.join("sub"))?;
        fs::write(src.join("a.txt"), "a")?;
        fs::write(src.join("sub").join("b.txt"), "b")?;
        fs::create_dir_all(root.path().join("steps"))?;
        fs::create_dir_all(root.path().join("out"))?;
        Ok(Self {
            root,
            host: WorkflowHost::new(),
        })
    }

    fn path(&self, relative: &str) -> std::path::PathBuf {
        self.root.path().join(relative)
    }

    fn step(&self) -> DirectoryCopyStep {
        DirectoryCopyStep::new(self.path("steps"), self.host.clone())
    }

    fn configured_step(&self, identifier: &str, recurse: bool) -> StepResult<DirectoryCopyStep> {
        let mut step = self.step();
        let destination = self.path("out");
        step.configure(&mut PickDestination {
            identifier,
            destination: &destination,
            recurse,
        })?;
        self.host.register(step.identifier());
        Ok(step)
    }
}

fn listing(root: &Path) -> BTreeSet<String> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeSet<String>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else if let Ok(relative) = path.strip_prefix(root) {
                out.insert(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    let mut out = BTreeSet::new();
    walk(root, root, &mut out);
    out
}

fn set_of(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|item| (*item).to_owned()).collect()
}

#[test]
fn recursive_run_copies_and_merges() -> TestResult {
    let workflow = Workflow::new()?;
    let mut step = workflow.configured_step("copy", true)?;
    assert!(step.is_configured());
    assert_eq!(workflow.host.is_configured("copy"), Some(true));

    step.set_port_data(0, workflow.path("src"))?;
    step.execute()?;
    assert_eq!(listing(&workflow.path("out")), set_of(&["a.txt", "sub/b.txt"]));

    fs::write(workflow.path("out").join("c.txt"), "c")?;
    step.execute()?;
    assert_eq!(
        listing(&workflow.path("out")),
        set_of(&["a.txt", "c.txt", "sub/b.txt"])
    );
    assert_eq!(workflow.host.completed(), vec!["copy".to_owned(), "copy".to_owned()]);
    Ok(())
}

#[test]
fn shallow_run_copies_top_level_files_only() -> TestResult {
    let workflow = Workflow::new()?;
    let mut step = workflow.configured_step("copy", false)?;

    step.set_port_data(0, workflow.path("src"))?;
    step.execute()?;

    assert_eq!(listing(&workflow.path("out")), set_of(&["a.txt"]));
    Ok(())
}

#[test]
fn second_step_cannot_reuse_an_identifier() -> TestResult {
    let workflow = Workflow::new()?;
    let first = workflow.configured_step("copy", true)?;
    assert!(first.is_configured());

    // The duplicate is refused at OK, so the step keeps its empty default.
    let second = workflow.configured_step("copy", true)?;
    assert!(!second.is_configured());
    assert_eq!(second.identifier(), "");
    Ok(())
}

#[test]
fn saved_state_reloads_in_a_fresh_step() -> TestResult {
    let workflow = Workflow::new()?;
    let step = workflow.configured_step("copy", false)?;
    let saved = step.serialize()?;
    assert!(saved.contains("\"location\": \"../out\""));

    let mut reloaded = workflow.step();
    reloaded.deserialize(&saved)?;
    assert!(reloaded.is_configured());
    assert_eq!(reloaded.config(), step.config());
    Ok(())
}

#[test]
fn partial_state_uses_defaults_for_missing_keys() -> TestResult {
    let workflow = Workflow::new()?;
    let mut step = workflow.step();

    step.deserialize(r#"{"identifier": "copy", "location": "../out"}"#)?;

    assert!(step.is_configured());
    assert!(step.config().recurse);
    assert_eq!(step.config().previous_location, "");
    Ok(())
}

#[test]
fn relocated_step_still_targets_the_same_directory() -> TestResult {
    let workflow = Workflow::new()?;
    let mut step = workflow.configured_step("copy", true)?;
    let before = step.output_location();

    let moved = workflow.path("steps").join("nested");
    fs::create_dir_all(&moved)?;
    step.relocate_configuration(&moved);

    assert_eq!(step.config().location, "../../out");
    assert_eq!(step.output_location(), before);

    let mut reloaded = DirectoryCopyStep::new(&moved, workflow.host.clone());
    reloaded.deserialize(&step.serialize()?)?;
    assert_eq!(reloaded.output_location(), before);
    Ok(())
}

#[test]
fn copy_failures_reach_the_host_as_errors() -> TestResult {
    let workflow = Workflow::new()?;
    let mut step = workflow.configured_step("copy", true)?;
    step.set_port_data(0, workflow.path("missing"))?;

    let result = step.execute();

    assert!(matches!(result, Err(StepError::Copy { .. })));
    assert!(workflow.host.completed().is_empty());
    Ok(())
}
