use crate::core::models::selector::ResidueSelector;
use crate::core::models::snapshot::SnapshotPattern;
use crate::engine::collaborators::command::CommandSpec;
use crate::engine::collaborators::solver::SolverTemplate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Solver template does not contain the placeholder '{placeholder}'")]
    PlaceholderNotFound { placeholder: String },

    #[error("Cannot read solver template '{path}': {reason}", path = path.display())]
    Template { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparationConfig {
    pub convert: CommandSpec,
    pub extract_chain: Option<CommandSpec>,
    pub parameterize: CommandSpec,
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub command: CommandSpec,
    pub template: SolverTemplate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Receives the energy logs, diagnostic log, energy table and summary.
    pub directory: PathBuf,
    /// Parent of the per-frame scratch namespaces.
    pub scratch_directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub selector: ResidueSelector,
    pub snapshots: SnapshotPattern,
    pub preparation: PreparationConfig,
    pub solver: SolverConfig,
    pub output: OutputConfig,
    pub parallel_variants: bool,
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    selector: Option<ResidueSelector>,
    snapshots: Option<SnapshotPattern>,
    convert: Option<CommandSpec>,
    extract_chain: Option<CommandSpec>,
    parameterize: Option<CommandSpec>,
    chain_id: Option<String>,
    solver_command: Option<CommandSpec>,
    template: Option<SolverTemplate>,
    output_directory: Option<PathBuf>,
    scratch_directory: Option<PathBuf>,
    parallel_variants: bool,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selector(mut self, selector: ResidueSelector) -> Self {
        self.selector = Some(selector);
        self
    }
    pub fn snapshots(mut self, pattern: SnapshotPattern) -> Self {
        self.snapshots = Some(pattern);
        self
    }
    pub fn convert_command(mut self, command: CommandSpec) -> Self {
        self.convert = Some(command);
        self
    }
    pub fn extract_chain_command(mut self, command: Option<CommandSpec>) -> Self {
        self.extract_chain = command;
        self
    }
    pub fn parameterize_command(mut self, command: CommandSpec) -> Self {
        self.parameterize = Some(command);
        self
    }
    pub fn chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }
    pub fn solver_command(mut self, command: CommandSpec) -> Self {
        self.solver_command = Some(command);
        self
    }
    pub fn template(mut self, template: SolverTemplate) -> Self {
        self.template = Some(template);
        self
    }
    pub fn output_directory(mut self, path: PathBuf) -> Self {
        self.output_directory = Some(path);
        self
    }
    /// Defaults to the output directory when not set.
    pub fn scratch_directory(mut self, path: Option<PathBuf>) -> Self {
        self.scratch_directory = path;
        self
    }
    pub fn parallel_variants(mut self, enabled: bool) -> Self {
        self.parallel_variants = enabled;
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let preparation = PreparationConfig {
            convert: self
                .convert
                .ok_or(ConfigError::MissingParameter("convert_command"))?,
            extract_chain: self.extract_chain,
            parameterize: self
                .parameterize
                .ok_or(ConfigError::MissingParameter("parameterize_command"))?,
            chain_id: self
                .chain_id
                .ok_or(ConfigError::MissingParameter("chain_id"))?,
        };
        let solver = SolverConfig {
            command: self
                .solver_command
                .ok_or(ConfigError::MissingParameter("solver_command"))?,
            template: self
                .template
                .ok_or(ConfigError::MissingParameter("template"))?,
        };
        let directory = self
            .output_directory
            .ok_or(ConfigError::MissingParameter("output_directory"))?;
        let output = OutputConfig {
            scratch_directory: self.scratch_directory.unwrap_or_else(|| directory.clone()),
            directory,
        };
        Ok(PipelineConfig {
            selector: self
                .selector
                .ok_or(ConfigError::MissingParameter("selector"))?,
            snapshots: self
                .snapshots
                .ok_or(ConfigError::MissingParameter("snapshots"))?,
            preparation,
            solver,
            output,
            parallel_variants: self.parallel_variants,
        })
    }
}
