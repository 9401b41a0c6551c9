use std::process::{Command, Output};
use tempfile::TempDir;

/// Runs the binary against an isolated working directory, so every scenario
/// gets its own rule store and no `donotscan.toml` (defaults apply and
/// notifications are logged only).
pub struct TestWorkspace {
    pub dir: TempDir,
    pub binary_path: String,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let binary_path = env!("CARGO_BIN_EXE_donotscan").to_string();

        Self { dir, binary_path }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary_path)
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("Failed to run donotscan")
    }

    pub fn stdout(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn add_rule(&self, pattern: &str, extra: &[&str]) {
        let mut args = vec!["new", "--pattern", pattern];
        args.extend_from_slice(extra);
        self.stdout(&args);
    }
}
