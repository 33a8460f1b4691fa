use std::path::PathBuf;

/// A single parsed command line.
///
/// Built fresh by the parser for every input line and consumed by value by
/// the launcher, so redirect targets and the background flag can never leak
/// into the next line's command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Command {
    /// Program name followed by its arguments, in order.
    pub argv: Vec<String>,
    /// File to wire to the child's standard input, if any.
    pub stdin_redirect: Option<PathBuf>,
    /// File to wire to the child's standard output, if any.
    pub stdout_redirect: Option<PathBuf>,
    /// Launch without waiting; completion is observed by the reaper.
    pub background: bool,
}

impl Command {
    /// The program to execute, i.e. `argv[0]`.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }
}
