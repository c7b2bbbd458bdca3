use crate::{
    core::Detector,
    errors::Result,
    format::{render, OutputFormat},
    git::Git,
};
use clap::Args;
use std::io::Write;

#[derive(Debug, Args)]
pub struct Detect {
    /// Branch to start from, defaults to the current branch
    pub branch: Option<String>,

    /// Remote whose tracking refs are checked for rewritten branches
    #[arg(long)]
    pub remote: Option<String>,

    /// Number of reflog entries searched for a branch's old tips
    #[arg(long)]
    pub reflog_depth: Option<usize>,

    /// How to print the detected branches
    #[arg(long, value_enum, default_value_t = OutputFormat::Lines)]
    pub format: OutputFormat,
}

impl Detect {
    pub fn execute(&self, git: &Git) -> Result<()> {
        let config = git
            .config
            .clone()
            .with_overrides(self.remote.as_deref(), self.reflog_depth);

        let tree = Detector::new(git, config).detect(self.branch.as_deref())?;

        let output = render(&tree, self.format)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
