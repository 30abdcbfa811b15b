//! Common test utilities for pagewright CLI tests.
//!
//! Provides `TestEnv`: an isolated project directory plus helpers to
//! populate it and run the binary against it.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Result of running a pagewright CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated project directory
pub struct TestEnv {
    pub project_root: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            project_root: tempfile::tempdir().expect("Failed to create project dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_pagewright")),
        }
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.project_path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.project_path(relative))
            .unwrap_or_else(|e| panic!("cannot read {relative}: {e}"))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.project_path(relative).exists()
    }

    /// Minimal site: package.json plus one stylesheet and one script
    pub fn with_site(self) -> Self {
        self.write(
            "package.json",
            r#"{
  "name": "startbootstrap-resume",
  "title": "Resume",
  "version": "5.0.7",
  "homepage": "https://startbootstrap.com/template-overviews/resume",
  "author": "Start Bootstrap",
  "license": "MIT"
}"#,
        );
        self.write("scss/_variables.scss", "$primary: #bd5d38;");
        self.write(
            "scss/resume.scss",
            "@import \"variables\";\nbody {\n  padding-top: 54px;\n  a { color: $primary; }\n}\n",
        );
        self.write(
            "js/resume.js",
            "(function() {\n  // collapse the navbar\n  var navbar = document.querySelector('nav');\n  navbar.className = 'collapsed';\n})();\n",
        );
        self.write("index.html", "<html><body>Resume</body></html>");
        self
    }

    /// Run pagewright from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env_remove("RUST_LOG");
        for (key, value) in env_vars {
            cmd.env(key, value);
        }
        to_result(cmd.output().expect("Failed to execute pagewright"))
    }
}

fn to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
