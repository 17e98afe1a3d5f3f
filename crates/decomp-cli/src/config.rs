mod defaults;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::utils::parser::{self, ParseError};
use defaults::DefaultsConfig;
use elecdecomp::core::models::selector::ResidueSelector;
use elecdecomp::core::models::snapshot::SnapshotPattern;
use elecdecomp::engine::collaborators::command::CommandSpec;
use elecdecomp::engine::collaborators::solver::SolverTemplate;
use elecdecomp::engine::config as core_config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "elecdecomp.toml";

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialCommandConfig {
    program: Option<String>,
    args: Option<Vec<String>>,
    stdout_to_output: Option<bool>,
    timeout_secs: Option<u64>,
}

impl PartialCommandConfig {
    fn resolve(
        self,
        default_program: &str,
        default_args: &[String],
        default_stdout_to_output: bool,
        default_timeout: Option<u64>,
    ) -> CommandSpec {
        CommandSpec::new(
            self.program.unwrap_or_else(|| default_program.to_string()),
            self.args.unwrap_or_else(|| default_args.to_vec()),
        )
        .with_stdout_to_output(self.stdout_to_output.unwrap_or(default_stdout_to_output))
        .with_timeout(self.timeout_secs.or(default_timeout).map(Duration::from_secs))
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSnapshotsConfig {
    directory: Option<PathBuf>,
    prefix: Option<String>,
    suffix: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialPreparationConfig {
    chain_id: Option<String>,
    select_chain: Option<bool>,
    convert: Option<PartialCommandConfig>,
    extract_chain: Option<PartialCommandConfig>,
    parameterize: Option<PartialCommandConfig>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSolverConfig {
    program: Option<String>,
    args: Option<Vec<String>>,
    timeout_secs: Option<u64>,
    template: Option<PathBuf>,
    placeholder: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutputConfig {
    directory: Option<PathBuf>,
    scratch_directory: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialRunConfig {
    snapshots: Option<PartialSnapshotsConfig>,
    preparation: Option<PartialPreparationConfig>,
    solver: Option<PartialSolverConfig>,
    output: Option<PartialOutputConfig>,
    parallel_variants: Option<bool>,
    timeout_secs: Option<u64>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// `--config` wins, then `elecdecomp.toml` in `working_dir`, then defaults.
    pub fn discover(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let candidate = working_dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            info!("Using configuration file {:?}", candidate);
            return Self::from_file(&candidate);
        }
        debug!("No configuration file found; using built-in defaults.");
        Ok(Self::default())
    }

    pub fn merge_with_cli(mut self, args: &Cli) -> Result<core_config::PipelineConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let snapshots = self.snapshots.take().unwrap_or_default();
        let preparation = self.preparation.take().unwrap_or_default();
        let solver = self.solver.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let timeout = args.timeout.or(self.timeout_secs);

        let pattern = SnapshotPattern::new(
            snapshots
                .directory
                .unwrap_or_else(|| PathBuf::from(&defaults.snapshot_directory)),
            snapshots
                .prefix
                .as_deref()
                .unwrap_or(&defaults.snapshot_prefix),
            snapshots
                .suffix
                .as_deref()
                .unwrap_or(&defaults.snapshot_suffix),
        );

        let convert = preparation.convert.unwrap_or_default().resolve(
            &defaults.convert_program,
            &defaults.convert_args,
            false,
            timeout,
        );
        let extract_chain = if preparation.select_chain.unwrap_or(defaults.select_chain) {
            Some(preparation.extract_chain.unwrap_or_default().resolve(
                &defaults.extract_chain_program,
                &defaults.extract_chain_args,
                true,
                timeout,
            ))
        } else {
            None
        };
        let parameterize = preparation.parameterize.unwrap_or_default().resolve(
            &defaults.parameterize_program,
            &defaults.parameterize_args,
            false,
            timeout,
        );

        let solver_command = CommandSpec::new(
            solver
                .program
                .unwrap_or_else(|| defaults.solver_program.clone()),
            solver
                .args
                .unwrap_or_else(|| defaults.solver_args.clone()),
        )
        .with_timeout(solver.timeout_secs.or(timeout).map(Duration::from_secs));

        let template_path = solver
            .template
            .unwrap_or_else(|| PathBuf::from(&defaults.solver_template));
        let placeholder = solver
            .placeholder
            .unwrap_or_else(|| defaults.solver_placeholder.clone());
        let template = SolverTemplate::load(&template_path, &placeholder)?;

        let output_directory = args
            .output_dir
            .clone()
            .or(output.directory)
            .unwrap_or_else(|| PathBuf::from(&defaults.output_directory));

        let config = core_config::PipelineConfigBuilder::new()
            .selector(ResidueSelector::new(
                args.residue_name.clone(),
                args.residue_number,
            ))
            .snapshots(pattern)
            .convert_command(convert)
            .extract_chain_command(extract_chain)
            .parameterize_command(parameterize)
            .chain_id(
                preparation
                    .chain_id
                    .unwrap_or_else(|| defaults.chain_id.clone()),
            )
            .solver_command(solver_command)
            .template(template)
            .output_directory(output_directory)
            .scratch_directory(output.scratch_directory)
            .parallel_variants(args.parallel_variants || self.parallel_variants.unwrap_or(false))
            .build()?;
        Ok(config)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for pair in set_values {
            let (key, value) =
                parser::parse_set_value(pair).map_err(|e| CliError::Config(e.to_string()))?;
            self.apply_set_value(key, value)
                .map_err(|e| CliError::Config(e.to_string()))?;
        }
        Ok(())
    }

    fn apply_set_value(&mut self, key: &str, value: &str) -> std::result::Result<(), SetError> {
        match key {
            "parallel-variants" => self.parallel_variants = Some(parser::parse_bool(key, value)?),
            "timeout-secs" => self.timeout_secs = Some(parser::parse_u64(key, value)?),

            "snapshots.directory" => {
                self.snapshots.get_or_insert_with(Default::default).directory =
                    Some(PathBuf::from(value))
            }
            "snapshots.prefix" => {
                self.snapshots.get_or_insert_with(Default::default).prefix =
                    Some(value.to_string())
            }
            "snapshots.suffix" => {
                self.snapshots.get_or_insert_with(Default::default).suffix =
                    Some(value.to_string())
            }

            "preparation.chain-id" => {
                self.preparation.get_or_insert_with(Default::default).chain_id =
                    Some(value.to_string())
            }
            "preparation.select-chain" => {
                self.preparation.get_or_insert_with(Default::default).select_chain =
                    Some(parser::parse_bool(key, value)?)
            }

            "solver.program" => {
                self.solver.get_or_insert_with(Default::default).program = Some(value.to_string())
            }
            "solver.args" => {
                self.solver.get_or_insert_with(Default::default).args =
                    Some(parser::parse_args(value))
            }
            "solver.timeout-secs" => {
                self.solver.get_or_insert_with(Default::default).timeout_secs =
                    Some(parser::parse_u64(key, value)?)
            }
            "solver.template" => {
                self.solver.get_or_insert_with(Default::default).template =
                    Some(PathBuf::from(value))
            }
            "solver.placeholder" => {
                self.solver.get_or_insert_with(Default::default).placeholder =
                    Some(value.to_string())
            }

            "output.directory" => {
                self.output.get_or_insert_with(Default::default).directory =
                    Some(PathBuf::from(value))
            }
            "output.scratch-directory" => {
                self.output
                    .get_or_insert_with(Default::default)
                    .scratch_directory = Some(PathBuf::from(value))
            }

            _ => {
                let Some((section, field)) = key
                    .strip_prefix("preparation.")
                    .and_then(|rest| rest.split_once('.'))
                else {
                    return Err(SetError::UnsupportedKey(key.to_string()));
                };
                let prep = self.preparation.get_or_insert_with(Default::default);
                let command = match section {
                    "convert" => &mut prep.convert,
                    "extract-chain" => &mut prep.extract_chain,
                    "parameterize" => &mut prep.parameterize,
                    _ => return Err(SetError::UnsupportedKey(key.to_string())),
                }
                .get_or_insert_with(Default::default);
                match field {
                    "program" => command.program = Some(value.to_string()),
                    "args" => command.args = Some(parser::parse_args(value)),
                    "stdout-to-output" => {
                        command.stdout_to_output = Some(parser::parse_bool(key, value)?)
                    }
                    "timeout-secs" => command.timeout_secs = Some(parser::parse_u64(key, value)?),
                    _ => return Err(SetError::UnsupportedKey(key.to_string())),
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
enum SetError {
    #[error("Unsupported configuration key for --set: '{0}'")]
    UnsupportedKey(String),
    #[error(transparent)]
    Value(#[from] ParseError),
}
