use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use blockgraph::block::BlockId;
use generator::{Generation, TranslatorTable};

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Entry chain, selected by its root block id. Defaults to the first chain.
    #[serde(default)]
    pub entry: Option<String>,

    /// The block program. Either an inline program object, or a string of
    /// raw JSON source (which may be deliberately malformed).
    pub program: serde_json::Value,

    /// Expected generated code (trimmed comparison).
    #[serde(default)]
    pub expect_code: Option<String>,

    /// Expected generation error — the error's Display string must contain
    /// this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// If true, the test expects program loading to fail.
    #[serde(default)]
    pub expect_load_error: bool,

    /// Expected registry snapshot. If present (even empty), binding count
    /// and rendered values are checked.
    #[serde(default)]
    pub expect_bindings: Option<BTreeMap<String, String>>,
}

/// The program source text for a fixture: a string member is used verbatim,
/// anything else is re-serialized.
fn program_source(config: &TestConfig) -> String {
    match &config.program {
        serde_json::Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path) -> TestResult {
    // 1. Read file
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            return TestResult {
                path: path.to_path_buf(),
                description: None,
                outcome: TestOutcome::Fail(format!("cannot read file: {}", e)),
            };
        }
    };

    // 2. Parse fixture
    let config: TestConfig = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return TestResult {
                path: path.to_path_buf(),
                description: None,
                outcome: TestOutcome::Fail(format!("fixture error: {}", e)),
            };
        }
    };

    let description = config.description.clone();

    // 3. Load the block program
    let source = program_source(&config);
    let load_result = blockgraph::loader::from_json(&source, 0);

    // 4. Handle expect_load_error
    if config.expect_load_error {
        return TestResult {
            path: path.to_path_buf(),
            description,
            outcome: match load_result {
                Err(_) => TestOutcome::Pass,
                Ok(_) => TestOutcome::Fail("expected load error, but loading succeeded".into()),
            },
        };
    }

    let program = match load_result {
        Ok(p) => p,
        Err(e) => {
            return TestResult {
                path: path.to_path_buf(),
                description,
                outcome: TestOutcome::Fail(format!("unexpected load error: {}", e)),
            };
        }
    };

    // 5. Generate
    let table = TranslatorTable::standard();
    let result = match &config.entry {
        Some(entry) => generator::generate_entry(&program, &table, &BlockId::new(entry.clone())),
        None => generator::generate_program(&program, &table),
    };

    // 6. Split the outcome into generated code and error
    let (generation, error) = match result {
        Ok(generation) => {
            let error = generation.error.clone();
            (Some(generation), error)
        }
        Err(e) => (None, Some(e)),
    };
    let code = generation.as_ref().map(|g| g.code.as_str()).unwrap_or("");

    // 7. Check error/code expectations
    let outcome = match (&config.expect_error, &config.expect_code, &error) {
        (Some(expected_err), _, Some(actual_err)) => {
            let err_str = actual_err.to_string();
            if err_str.contains(expected_err.as_str()) {
                None
            } else {
                Some(format!(
                    "expected error containing \"{}\", got: {}",
                    expected_err, err_str
                ))
            }
        }
        (Some(expected_err), _, None) => Some(format!(
            "expected error containing \"{}\", but generation succeeded",
            expected_err
        )),
        (None, _, Some(actual_err)) => {
            Some(format!("unexpected generation error: {}", actual_err))
        }
        (None, Some(expected_code), None) => {
            let actual_trimmed = code.trim();
            let expected_trimmed = expected_code.trim();
            if actual_trimmed == expected_trimmed {
                None
            } else {
                Some(format!(
                    "code mismatch\n  expected: {}\n  actual:   {}",
                    expected_trimmed.replace('\n', "\\n"),
                    actual_trimmed.replace('\n', "\\n")
                ))
            }
        }
        (None, None, None) => None,
    };

    // Short-circuit if the error/code check already failed
    if let Some(reason) = outcome {
        return TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Fail(reason),
        };
    }

    // 8. When an error was expected, the partial code may still be pinned down
    if let (Some(expected_code), Some(generation)) = (&config.expect_code, &generation) {
        if error.is_some() && generation.code.trim() != expected_code.trim() {
            return TestResult {
                path: path.to_path_buf(),
                description,
                outcome: TestOutcome::Fail(format!(
                    "partial code mismatch\n  expected: {}\n  actual:   {}",
                    expected_code.trim().replace('\n', "\\n"),
                    generation.code.trim().replace('\n', "\\n")
                )),
            };
        }
    }

    // 9. Check binding expectations
    if let (Some(expected_bindings), Some(generation)) = (&config.expect_bindings, &generation) {
        if let Some(reason) = check_bindings(generation, expected_bindings) {
            return TestResult {
                path: path.to_path_buf(),
                description,
                outcome: TestOutcome::Fail(reason),
            };
        }
    }

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Pass,
    }
}

/// Check that the registry snapshot matches expectations. Returns
/// `Some(reason)` on mismatch.
fn check_bindings(
    generation: &Generation,
    expected: &BTreeMap<String, String>,
) -> Option<String> {
    if generation.bindings.len() != expected.len() {
        let actual: Vec<String> = generation
            .bindings
            .iter()
            .map(|(name, value)| format!("  - {} = {}", name, value))
            .collect();
        return Some(format!(
            "expected {} binding(s), got {}\n  actual bindings:\n{}",
            expected.len(),
            generation.bindings.len(),
            if actual.is_empty() {
                "    (none)".to_string()
            } else {
                actual.join("\n")
            }
        ));
    }

    for (name, value) in &generation.bindings {
        match expected.get(name) {
            Some(expected_value) if expected_value == &value.to_string() => {}
            Some(expected_value) => {
                return Some(format!(
                    "binding '{}': expected {}, got {}",
                    name, expected_value, value
                ));
            }
            None => {
                return Some(format!("unexpected binding '{}' = {}", name, value));
            }
        }
    }

    None
}

/// Discover `.test.json` files grouped by category (subfolder relative to
/// root). Files directly in `root` get category "" (uncategorized).
/// Returns a BTreeMap so categories are sorted alphabetically.
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    // Sort files within each category
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(".test.json") {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no .test.json files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{}\x1b[0m", s)
    }
}

/// Run all `.test.json` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    // Single file mode — ignore categories
    if path.is_file() {
        let result = run_single_test(path);
        let label = result
            .description
            .as_deref()
            .unwrap_or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("?")
            });
        return match &result.outcome {
            TestOutcome::Pass => {
                eprintln!("  {}  {}", pass_label(no_color), label);
                eprintln!();
                eprintln!("test result: {}. 1 passed, 0 failed", if no_color { "ok" } else { "\x1b[32mok\x1b[0m" });
                0
            }
            TestOutcome::Fail(reason) => {
                eprintln!("  {}  {}", fail_label(no_color), label);
                eprintln!();
                eprintln!("failures:");
                eprintln!();
                eprintln!("  --- {} ---", path.display());
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
                eprintln!();
                eprintln!("test result: {}. 0 passed, 1 failed (of 1)",
                    if no_color { "FAILED" } else { "\x1b[31mFAILED\x1b[0m" });
                1
            }
        };
    }

    let all_categories = discover_categorized(path);

    if all_categories.is_empty() {
        eprintln!("no .test.json files found in {}", path.display());
        return 1;
    }

    // Filter categories if specified
    let run_categories: BTreeMap<&str, &Vec<PathBuf>> = if categories.is_empty() {
        all_categories.iter().map(|(k, v)| (k.as_str(), v)).collect()
    } else {
        let mut filtered = BTreeMap::new();
        for requested in categories {
            let req = requested.trim_matches('/');
            let mut found = false;
            for (cat, files) in &all_categories {
                if cat == req || cat.starts_with(&format!("{}/", req)) {
                    filtered.insert(cat.as_str(), files);
                    found = true;
                }
            }
            if !found {
                eprintln!(
                    "warning: category '{}' not found (available: {})",
                    req,
                    all_categories
                        .keys()
                        .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
        filtered
    };

    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        // Print category header
        let header = if cat.is_empty() {
            "(root)".to_string()
        } else {
            cat.to_string()
        };
        eprintln!();
        eprintln!("{}", bold(&header, no_color));

        for file in *files {
            let result = run_single_test(file);
            let label = result
                .description
                .as_deref()
                .unwrap_or_else(|| {
                    file.file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("?")
                });

            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", pass_label(no_color), label);
                }
                TestOutcome::Fail(_) => {
                    failed += 1;
                    eprintln!("  {}  {}", fail_label(no_color), label);
                    failures.push(result);
                }
            }
        }
    }

    // Print failure details
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

    // Summary
    eprintln!();
    if failed == 0 {
        if no_color {
            eprintln!("test result: ok. {} passed, 0 failed", passed);
        } else {
            eprintln!("test result: \x1b[32mok\x1b[0m. {} passed, 0 failed", passed);
        }
        0
    } else {
        let total = passed + failed;
        if no_color {
            eprintln!(
                "test result: FAILED. {} passed, {} failed (of {})",
                passed, failed, total
            );
        } else {
            eprintln!(
                "test result: \x1b[31mFAILED\x1b[0m. {} passed, {} failed (of {})",
                passed, failed, total
            );
        }
        1
    }
}
