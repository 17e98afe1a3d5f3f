use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub const INPUT_PLACEHOLDER: &str = "{input}";
pub const OUTPUT_PLACEHOLDER: &str = "{output}";
pub const CHAIN_PLACEHOLDER: &str = "{chain}";

/// An external program invocation with placeholder arguments.
///
/// Arguments may contain `{input}`, `{output}` and `{chain}`, replaced at run
/// time. With `stdout_to_output` the program's standard output becomes the
/// `{output}` file (for tools that only write to stdout) and only standard
/// error is captured.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdout_to_output: bool,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new<S: Into<String>>(program: impl Into<String>, args: impl IntoIterator<Item = S>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            stdout_to_output: false,
            timeout: None,
        }
    }

    pub fn with_stdout_to_output(mut self, enabled: bool) -> Self {
        self.stdout_to_output = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn render_args(&self, subs: &Substitutions) -> Vec<String> {
        self.args.iter().map(|arg| subs.apply(arg)).collect()
    }

    pub fn command_line(&self, subs: &Substitutions) -> String {
        std::iter::once(self.program.clone())
            .chain(self.render_args(subs))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs the program in `workdir` and captures its combined output.
    ///
    /// Failing to launch, a non-zero exit and a timeout are all reported in the
    /// returned [`RunStatus`]. An `Err` means the capture file inside `workdir`
    /// could not be created or read.
    pub fn run(&self, workdir: &Path, subs: &Substitutions) -> io::Result<CommandOutcome> {
        let args = self.render_args(subs);
        let command_line = self.command_line(subs);
        debug!(command = %command_line, workdir = ?workdir, "Launching collaborator.");

        let capture = tempfile::Builder::new()
            .prefix(".capture-")
            .tempfile_in(workdir)?;
        let stderr = Stdio::from(capture.as_file().try_clone()?);
        let stdout = match (self.stdout_to_output, subs.output) {
            (true, Some(output)) => Stdio::from(File::create(output)?),
            _ => Stdio::from(capture.as_file().try_clone()?),
        };

        let spawned = Command::new(&self.program)
            .args(&args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn();

        let status = match spawned {
            Ok(child) => self.wait(child)?,
            Err(e) => {
                warn!(command = %command_line, "Failed to launch collaborator: {}", e);
                RunStatus::LaunchFailed {
                    reason: e.to_string(),
                }
            }
        };

        let output = String::from_utf8_lossy(&fs::read(capture.path())?).into_owned();
        trace!(command = %command_line, %status, bytes = output.len(), "Collaborator finished.");

        Ok(CommandOutcome {
            command_line,
            status,
            output,
        })
    }

    fn wait(&self, mut child: Child) -> io::Result<RunStatus> {
        let Some(limit) = self.timeout else {
            return Ok(RunStatus::from_exit(child.wait()?));
        };

        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(RunStatus::from_exit(status));
            }
            if Instant::now() >= deadline {
                warn!(program = %self.program, "Collaborator exceeded {:?}; killing it.", limit);
                if let Err(e) = child.kill() {
                    warn!("Failed to kill timed-out collaborator: {}", e);
                }
                child.wait()?;
                return Ok(RunStatus::TimedOut { after: limit });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Values substituted into [`CommandSpec`] arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Substitutions<'a> {
    pub input: Option<&'a Path>,
    pub output: Option<&'a Path>,
    pub chain: Option<&'a str>,
}

impl Substitutions<'_> {
    fn apply(&self, arg: &str) -> String {
        let mut rendered = arg.to_string();
        if let Some(input) = self.input {
            rendered = rendered.replace(INPUT_PLACEHOLDER, &input.to_string_lossy());
        }
        if let Some(output) = self.output {
            rendered = rendered.replace(OUTPUT_PLACEHOLDER, &output.to_string_lossy());
        }
        if let Some(chain) = self.chain {
            rendered = rendered.replace(CHAIN_PLACEHOLDER, chain);
        }
        rendered
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed { code: Option<i32> },
    TimedOut { after: Duration },
    LaunchFailed { reason: String },
}

impl RunStatus {
    fn from_exit(status: ExitStatus) -> Self {
        if status.success() {
            RunStatus::Success
        } else {
            RunStatus::Failed {
                code: status.code(),
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Success)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "exit status 0"),
            RunStatus::Failed { code: Some(code) } => write!(f, "exit status {}", code),
            RunStatus::Failed { code: None } => write!(f, "terminated by signal"),
            RunStatus::TimedOut { after } => write!(f, "timed out after {:.1}s", after.as_secs_f64()),
            RunStatus::LaunchFailed { reason } => write!(f, "failed to launch: {}", reason),
        }
    }
}

/// What one collaborator invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub command_line: String,
    pub status: RunStatus,
    pub output: String,
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn shell(script: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", script])
    }

    #[test]
    fn render_args_substitutes_all_placeholders() {
        let spec = CommandSpec::new("tool", ["-{chain}", "-f", "{input}", "-o={output}"]);
        let subs = Substitutions {
            input: Some(Path::new("in.gro")),
            output: Some(Path::new("out.pdb")),
            chain: Some("A"),
        };
        assert_eq!(spec.render_args(&subs), vec!["-A", "-f", "in.gro", "-o=out.pdb"]);
        assert_eq!(spec.command_line(&subs), "tool -A -f in.gro -o=out.pdb");
    }

    #[test]
    fn render_args_leaves_unset_placeholders_untouched() {
        let spec = CommandSpec::new("tool", ["{input}", "{output}"]);
        let subs = Substitutions {
            input: Some(Path::new("a")),
            ..Default::default()
        };
        assert_eq!(spec.render_args(&subs), vec!["a", "{output}"]);
    }

    #[test]
    fn run_captures_stdout_and_stderr_together() {
        let dir = tempdir().unwrap();
        let outcome = shell("echo to-stdout; echo to-stderr >&2")
            .run(dir.path(), &Substitutions::default())
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Success);
        assert!(outcome.output.contains("to-stdout"));
        assert!(outcome.output.contains("to-stderr"));
    }

    #[test]
    fn run_reports_non_zero_exit_without_error() {
        let dir = tempdir().unwrap();
        let outcome = shell("echo broken; exit 3")
            .run(dir.path(), &Substitutions::default())
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Failed { code: Some(3) });
        assert!(!outcome.status.is_success());
        assert!(outcome.output.contains("broken"));
    }

    #[test]
    fn run_kills_collaborator_after_timeout() {
        let dir = tempdir().unwrap();
        let spec = shell("sleep 5").with_timeout(Some(Duration::from_millis(100)));

        let started = Instant::now();
        let outcome = spec.run(dir.path(), &Substitutions::default()).unwrap();

        assert!(matches!(outcome.status, RunStatus::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn run_reports_missing_program_as_launch_failure() {
        let dir = tempdir().unwrap();
        let outcome = CommandSpec::new("elecdecomp-no-such-program", Vec::<String>::new())
            .run(dir.path(), &Substitutions::default())
            .unwrap();

        assert!(matches!(outcome.status, RunStatus::LaunchFailed { .. }));
    }

    #[test]
    fn run_redirects_stdout_into_output_file_when_requested() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("chain.pdb");
        let spec = shell("echo ATOM; echo note >&2").with_stdout_to_output(true);
        let subs = Substitutions {
            output: Some(&output),
            ..Default::default()
        };

        let outcome = spec.run(dir.path(), &subs).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "ATOM\n");
        assert!(outcome.output.contains("note"));
        assert!(!outcome.output.contains("ATOM"));
    }

    #[test]
    fn run_removes_its_capture_file() {
        let dir = tempdir().unwrap();
        shell("true").run(dir.path(), &Substitutions::default()).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn status_display_is_human_readable() {
        assert_eq!(RunStatus::Success.to_string(), "exit status 0");
        assert_eq!(RunStatus::Failed { code: Some(2) }.to_string(), "exit status 2");
        assert_eq!(
            RunStatus::TimedOut {
                after: Duration::from_millis(1500)
            }
            .to_string(),
            "timed out after 1.5s"
        );
    }
}
