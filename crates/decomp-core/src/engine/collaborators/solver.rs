use super::command::{CommandOutcome, CommandSpec, Substitutions};
use crate::engine::config::ConfigError;
use std::io;
use std::path::Path;
use tracing::instrument;

pub const DEFAULT_DESCRIPTOR_NAME: &str = "solver.in";

/// Runs the electrostatics solver on one rendered input descriptor.
pub trait Solver: Sync {
    /// Returns the captured solver output and exit status. `Err` is reserved
    /// for scratch I/O failures.
    fn solve(&self, descriptor: &Path, workdir: &Path) -> io::Result<CommandOutcome>;
}

pub struct ExternalSolver {
    command: CommandSpec,
}

impl ExternalSolver {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }
}

impl Solver for ExternalSolver {
    #[instrument(skip_all, fields(descriptor = ?descriptor))]
    fn solve(&self, descriptor: &Path, workdir: &Path) -> io::Result<CommandOutcome> {
        let subs = Substitutions {
            input: Some(descriptor),
            ..Default::default()
        };
        self.command.run(workdir, &subs)
    }
}

/// Solver input descriptor with a placeholder for the structure file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverTemplate {
    content: String,
    placeholder: String,
    descriptor_name: String,
}

impl SolverTemplate {
    pub fn new(
        content: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let content = content.into();
        let placeholder = placeholder.into();
        if placeholder.is_empty() || !content.contains(&placeholder) {
            return Err(ConfigError::PlaceholderNotFound { placeholder });
        }
        Ok(Self {
            content,
            placeholder,
            descriptor_name: DEFAULT_DESCRIPTOR_NAME.to_string(),
        })
    }

    /// Loads the template; the rendered descriptor keeps the template's file name.
    pub fn load(path: &Path, placeholder: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Template {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut template = Self::new(content, placeholder)?;
        if let Some(name) = path.file_name() {
            template.descriptor_name = name.to_string_lossy().into_owned();
        }
        Ok(template)
    }

    pub fn render(&self, structure_file: &str) -> String {
        self.content.replace(&self.placeholder, structure_file)
    }

    pub fn descriptor_name(&self) -> &str {
        &self.descriptor_name
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const TEMPLATE: &str = "read\n    mol pqr {structure}\nend\nelec\n    mol 1\nend\nprint elecEnergy 1 end\nquit\n";

    #[test]
    fn render_substitutes_structure_file_name() {
        let template = SolverTemplate::new(TEMPLATE, "{structure}").unwrap();
        let rendered = template.render("isolated.pqr");
        assert!(rendered.contains("mol pqr isolated.pqr"));
        assert!(!rendered.contains("{structure}"));
        assert_eq!(template.descriptor_name(), DEFAULT_DESCRIPTOR_NAME);
    }

    #[test]
    fn new_rejects_template_without_placeholder() {
        let result = SolverTemplate::new("read mol pqr x.pqr end", "{structure}");
        assert_eq!(
            result,
            Err(ConfigError::PlaceholderNotFound {
                placeholder: "{structure}".to_string()
            })
        );
    }

    #[test]
    fn load_keeps_template_file_name_for_descriptor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("apbs.in");
        fs::write(&path, TEMPLATE).unwrap();

        let template = SolverTemplate::load(&path, "{structure}").unwrap();

        assert_eq!(template.descriptor_name(), "apbs.in");
        assert_eq!(template.placeholder(), "{structure}");
    }

    #[test]
    fn load_reports_unreadable_template() {
        let dir = tempdir().unwrap();
        let result = SolverTemplate::load(&dir.path().join("missing.in"), "{structure}");
        assert!(matches!(result, Err(ConfigError::Template { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn external_solver_passes_descriptor_as_input() {
        let dir = tempdir().unwrap();
        let descriptor = dir.path().join("apbs.in");
        fs::write(&descriptor, "content").unwrap();
        let solver = ExternalSolver::new(CommandSpec::new(
            "sh",
            ["-c", "echo '  Total electrostatic energy = -1.0E+02 kJ/mol'; cat {input}"],
        ));

        let outcome = solver.solve(&descriptor, dir.path()).unwrap();

        assert!(outcome.status.is_success());
        assert!(outcome.output.contains("Total electrostatic energy"));
        assert!(outcome.output.contains("content"));
    }
}
