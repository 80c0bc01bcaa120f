use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use interpreter::{CommandSet, Error};

const EXTENSION: &str = ".test.mcml";

#[derive(Debug, Default, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Expected command arrays by name (`setup`, ..., `commands`, `extra`).
    /// Only the arrays listed are compared, each exactly.
    #[serde(default)]
    pub expect: BTreeMap<String, Vec<String>>,

    /// Expected error: its message must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Expected error category: structural, semantic, binding or fatal.
    #[serde(default)]
    pub expect_category: Option<String>,

    /// Expected 1-based source line of the error.
    #[serde(default)]
    pub expect_line: Option<usize>,
}

/// Split a `.test.mcml` file into its TOML front matter and the source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');
    let after_open = content
        .strip_prefix("---")
        .ok_or("missing opening --- frontmatter delimiter")?;
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;
    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..];
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;
    Ok((config, source))
}

#[derive(Debug, PartialEq)]
pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_suffix(EXTENSION))
                .unwrap_or("?")
        })
    }
}

fn check_error(config: &TestConfig, error: &Error) -> Option<String> {
    if let Some(expected) = &config.expect_error {
        if !error.to_string().contains(expected.as_str()) {
            return Some(format!(
                "expected error containing \"{}\", got: {}",
                expected, error
            ));
        }
    }
    if let Some(expected) = &config.expect_category {
        let actual = error.category().to_string();
        if actual != *expected {
            return Some(format!(
                "expected {} error, got {} error: {}",
                expected, actual, error
            ));
        }
    }
    if let Some(expected) = config.expect_line {
        if error.line() != expected {
            return Some(format!(
                "expected error on line {}, got line {}: {}",
                expected,
                error.line(),
                error
            ));
        }
    }
    None
}

fn check_arrays(config: &TestConfig, set: &CommandSet) -> Option<String> {
    let actual: BTreeMap<&str, Vec<String>> = set.arrays().into_iter().collect();
    for (name, expected) in &config.expect {
        let Some(commands) = actual.get(name.as_str()) else {
            return Some(format!("unknown command array \"{}\"", name));
        };
        if commands != expected {
            return Some(format!(
                "{} mismatch\n  expected:\n    {}\n  actual:\n    {}",
                name,
                expected.join("\n    "),
                commands.join("\n    ")
            ));
        }
    }
    None
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };
    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };
    let description = config.description.clone();
    let expects_error = config.expect_error.is_some()
        || config.expect_category.is_some()
        || config.expect_line.is_some();

    let failure = match interpreter::interpret(source, 0) {
        Ok(_) if expects_error => Some("expected an error, but interpretation succeeded".into()),
        Ok(set) => check_arrays(&config, &set),
        Err(e) if expects_error => check_error(&config, &e),
        Err(e) => Some(format!("unexpected error: {}", e)),
    };

    match failure {
        Some(reason) => fail(description, reason),
        None => TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Pass,
        },
    }
}

/// Fixture files keyed by category: the directory a file sits in, relative
/// to the suite root, with `/` separators. Files in the root itself use "".
struct Suite {
    categories: BTreeMap<String, Vec<PathBuf>>,
}

fn is_fixture(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(EXTENSION))
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

impl Suite {
    /// A single file forms a suite of its own; a directory is walked
    /// depth-first. Unreadable directories are skipped.
    fn load(path: &Path) -> Suite {
        let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        if path.is_file() {
            categories.insert(String::new(), vec![path.to_path_buf()]);
            return Suite { categories };
        }

        let mut pending = vec![path.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let entry_path = entry.path();
                if entry_path.is_dir() {
                    pending.push(entry_path);
                } else if is_fixture(&entry_path) {
                    let category = dir
                        .strip_prefix(path)
                        .map(|rel| {
                            rel.components()
                                .map(|c| c.as_os_str().to_string_lossy())
                                .collect::<Vec<_>>()
                                .join("/")
                        })
                        .unwrap_or_default();
                    categories.entry(category).or_default().push(entry_path);
                }
            }
        }
        categories.values_mut().for_each(|files| files.sort());
        Suite { categories }
    }

    fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories matching any requested name, nested categories included.
    /// Everything when nothing is requested. Unknown names are reported.
    fn select(&self, requested: &[String]) -> Vec<(&str, &[PathBuf])> {
        for request in requested {
            if !self.categories.keys().any(|c| in_category(c, request)) {
                let available: Vec<&str> = self.categories.keys().map(|c| category_label(c)).collect();
                eprintln!(
                    "warning: category '{}' not found (available: {})",
                    request.trim_matches('/'),
                    available.join(", ")
                );
            }
        }

        self.categories
            .iter()
            .filter(|(category, _)| {
                requested.is_empty() || requested.iter().any(|r| in_category(category, r))
            })
            .map(|(category, files)| (category.as_str(), files.as_slice()))
            .collect()
    }
}

/// `category` is `request` itself or nested below it.
fn in_category(category: &str, request: &str) -> bool {
    let request = request.trim_matches('/');
    category
        .strip_prefix(request)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Print the categories found under `path` with their fixture counts.
pub fn list_categories(path: &Path) {
    let suite = Suite::load(path);
    if suite.is_empty() {
        eprintln!("no {} files found in {}", EXTENSION, path.display());
        return;
    }
    for (category, files) in &suite.categories {
        eprintln!("{:>4}  {}", files.len(), category_label(category));
    }
}

fn paint(text: &str, code: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

/// Run all `.test.mcml` files under `path` (or a single file).
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let suite = Suite::load(path);
    if suite.is_empty() {
        eprintln!("no {} files found in {}", EXTENSION, path.display());
        return 1;
    }

    let selected = suite.select(categories);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &selected {
        eprintln!();
        eprintln!("{}", paint(category_label(cat), "1", no_color));

        for file in *files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", paint("ok", "32", no_color), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
