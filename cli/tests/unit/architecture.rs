//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layering stays
//! domain → application → infra, with commands and output on the outside.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

fn src_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

fn relative(file: &Path) -> String {
    file.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(file)
        .display()
        .to_string()
        .replace('\\', "/")
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    /// Process a line and return `true` if it's inside a `#[cfg(test)]` block.
    fn process_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// Non-test, non-comment lines of a file with their 1-based line numbers.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut tracker = CfgTestTracker::new();
    content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            let comment =
                trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*');
            (!in_test && !comment).then(|| (i + 1, line.to_string()))
        })
        .collect()
}

/// Every production line in `dir` containing one of `forbidden`.
fn find_forbidden(dir: &Path, forbidden: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        let rel = relative(&file);
        for (lineno, line) in production_lines(&file) {
            for pattern in forbidden {
                if line.contains(pattern) {
                    violations.push(format!("{rel}:{lineno}: `{pattern}`: {}", line.trim()));
                }
            }
        }
    }
    violations
}

// ── Layer boundaries ──────────────────────────────────────────────────────────

#[test]
fn domain_is_pure() {
    let violations = find_forbidden(
        &src_dir().join("domain"),
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "tokio",
            "std::fs",
            "std::process",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay free of I/O and outer layers:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_depends_only_on_domain() {
    let violations = find_forbidden(
        &src_dir().join("application"),
        &["crate::infra", "crate::commands", "crate::output"],
    );
    assert!(
        violations.is_empty(),
        "application/ must not import infra/, commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_has_no_blocking_io() {
    let violations = find_forbidden(
        &src_dir().join("application"),
        &["std::fs::", "std::process::Command", "std::net::TcpStream"],
    );
    assert!(
        violations.is_empty(),
        "application/ must reach the outside world through ports:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let violations = find_forbidden(
        &src_dir().join("infra"),
        &["crate::commands", "crate::output"],
    );
    assert!(
        violations.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_print_macros_outside_tests() {
    let violations = find_forbidden(&src_dir().join("infra"), &["println!", "eprintln!"]);
    assert!(
        violations.is_empty(),
        "infra/ must not use println!/eprintln! outside #[cfg(test)]:\n{}",
        violations.join("\n")
    );
}

// ── Process execution goes through the runner port ───────────────────────────

#[test]
fn no_tokio_command_runner_new_outside_infra() {
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir()) {
        let rel = relative(&file);
        if rel.contains("/infra/") || rel.ends_with("app.rs") {
            continue;
        }
        for (lineno, line) in production_lines(&file) {
            if line.contains("TokioCommandRunner::new") {
                violations.push(format!("{rel}:{lineno}: {}", line.trim()));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "TokioCommandRunner::new outside infra/; take a runner from AppContext:\n{}",
        violations.join("\n")
    );
}

#[test]
fn no_concrete_adapter_types_in_service_signatures() {
    let concrete = [
        "TokioCommandRunner",
        "SshExecutor<",
        "RsyncTransfer<",
        "GitRepository<",
        "UreqProbe",
    ];
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir().join("application").join("services")) {
        let rel = relative(&file);
        for (lineno, line) in production_lines(&file) {
            if !line.contains("fn ") {
                continue;
            }
            for ty in concrete {
                if line.contains(ty) {
                    violations.push(format!("{rel}:{lineno}: `{ty}`: {}", line.trim()));
                }
            }
        }
    }
    assert!(
        violations.is_empty(),
        "services must take port trait bounds, not adapters:\n{}",
        violations.join("\n")
    );
}

#[test]
fn ssh_is_only_spawned_by_the_transport_adapters() {
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir()) {
        let rel = relative(&file);
        if rel.ends_with("infra/ssh.rs") || rel.ends_with("infra/rsync.rs") {
            continue;
        }
        for (lineno, line) in production_lines(&file) {
            if line.contains("(\"ssh\"") || line.contains("(\"rsync\"") {
                violations.push(format!("{rel}:{lineno}: {}", line.trim()));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "only infra/ssh.rs and infra/rsync.rs may run ssh or rsync:\n{}",
        violations.join("\n")
    );
}

// ── Command handlers accept unified AppContext ───────────────────────────────

#[test]
fn command_handlers_accept_app_context() {
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir().join("commands")) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        if !content.contains("pub async fn run(") {
            continue;
        }
        if !content.contains("app: &AppContext") {
            violations.push(relative(&file));
        }
    }
    assert!(
        violations.is_empty(),
        "command handlers must receive &AppContext:\n{}",
        violations.join("\n")
    );
}

/// No module-level #![`allow(dead_code)`] in domain/, application/, or infra/ layers.
#[test]
fn no_module_level_dead_code_allows_in_layers() {
    let mut violations = Vec::new();
    for layer in ["domain", "application", "infra"] {
        for file in collect_rs_files(&src_dir().join(layer)) {
            let Ok(content) = std::fs::read_to_string(&file) else {
                continue;
            };
            for (i, line) in content.lines().enumerate() {
                if line.trim() == "#![allow(dead_code)]" {
                    violations.push(format!("{}:{}", relative(&file), i + 1));
                }
            }
        }
    }
    assert!(
        violations.is_empty(),
        "Module-level #![allow(dead_code)] found in architecture layers:\n{}",
        violations.join("\n")
    );
}
