use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};

use colored::Colorize;
use log::{debug, trace};
use typesfix_core::{Warning, strip_bom, text_in_range, types_package_name};

use crate::host::TaskOutcome;

/// Relativize a path to the current working directory for clickable links
fn relativize_to_cwd(path: &Path) -> String {
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => {
            debug!("Failed to get current directory");
            return path.display().to_string();
        }
    };

    match make_relative(path, &cwd) {
        Some(rel_path) => {
            let result = rel_path.to_string_lossy().to_string();
            trace!("Relativized '{}' to '{}'", path.display(), result);
            result
        }
        None => path.display().to_string(),
    }
}

/// Create a relative path from `base` to `target`
fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    use std::path::Component;

    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    if target_parts.first() != base_parts.first() {
        return None;
    }

    let common = target_parts.iter().zip(&base_parts).take_while(|(t, b)| t == b).count();

    let mut result = PathBuf::new();
    for _ in &base_parts[common..] {
        result.push("..");
    }
    for component in &target_parts[common..] {
        match component {
            Component::Normal(p) => result.push(p),
            Component::ParentDir => result.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

/// Name of the dependency a warning points at, read back from the manifest
fn dependency_name(text: Option<&str>, warning: &Warning) -> String {
    text.and_then(|t| text_in_range(t, warning.range)).unwrap_or("?").to_string()
}

fn suggested_package(name: &str) -> String {
    types_package_name(name)
}

pub fn print_no_warnings_message<W: Write>(writer: &mut W, manifests: usize) -> io::Result<()> {
    writeln!(
        writer,
        "{} Every dependency ships type declarations ({} manifests checked).",
        "✓".green().bold(),
        manifests
    )?;
    writer.flush()?;
    Ok(())
}

/// Print diagnostics grouped by manifest, as `line:col  name  → @types/name`
pub fn print_warnings<W: Write>(
    writer: &mut W,
    diagnostics: &[(PathBuf, Vec<Warning>)],
) -> io::Result<()> {
    let total: usize = diagnostics.iter().map(|(_, w)| w.len()).sum();
    debug!("Printing {} warnings across {} manifests", total, diagnostics.len());

    writeln!(writer, "{} Dependencies without type declarations\n", "⚠".yellow().bold())?;

    for (manifest, warnings) in diagnostics.iter().filter(|(_, w)| !w.is_empty()) {
        // Best effort: the name column shows "?" if the file changed underneath us
        let text = std::fs::read_to_string(manifest).ok();
        let text = text.as_deref().map(strip_bom);
        writeln!(writer, "{}", relativize_to_cwd(manifest).bright_white().bold())?;

        for (idx, warning) in warnings.iter().enumerate() {
            let prefix = if idx == warnings.len() - 1 { "└──" } else { "├──" };
            let name = dependency_name(text, warning);
            let suggestion = if name == "?" { String::new() } else { suggested_package(&name) };
            writeln!(
                writer,
                "{}  {}  {} {} {}",
                prefix.dimmed(),
                warning.range.to_string().dimmed(),
                name.yellow(),
                "→".dimmed(),
                suggestion.cyan()
            )?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(writer, "  Missing types: {}", total.to_string().yellow().bold())?;
    writeln!(
        writer,
        "  Affected manifests: {}",
        diagnostics.iter().filter(|(_, w)| !w.is_empty()).count().to_string().yellow()
    )?;
    writeln!(writer, "  Run {} to install them.", "typesfix fix".cyan())?;

    writer.flush()?;
    Ok(())
}

pub fn print_outcome<W: Write>(writer: &mut W, outcome: &TaskOutcome) -> io::Result<()> {
    let cwd = relativize_to_cwd(&outcome.task.cwd);
    match outcome.status {
        None => writeln!(writer, "{} {}  ({})", "»".blue(), outcome.task.command, cwd.dimmed())?,
        Some(status) if status.success() => {
            writeln!(writer, "{} {}", "✓".green().bold(), outcome.task.command)?
        }
        Some(status) => writeln!(
            writer,
            "{} {} ({})",
            "✗".red().bold(),
            outcome.task.command,
            status.to_string().red()
        )?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use typesfix_core::{DIAGNOSTIC_CODE, Severity, TextRange};

    fn warning(range: TextRange) -> Warning {
        Warning {
            severity: Severity::Information,
            message: "missing types".to_string(),
            code: DIAGNOSTIC_CODE.to_string(),
            source: "test".to_string(),
            range,
        }
    }

    #[test]
    fn test_make_relative_same_dir() {
        let target = Path::new("/project/package.json");
        let base = Path::new("/project");
        assert_eq!(make_relative(target, base), Some(PathBuf::from("package.json")));
    }

    #[test]
    fn test_make_relative_child_dir() {
        let target = Path::new("/project/packages/api/package.json");
        let base = Path::new("/project");
        assert_eq!(make_relative(target, base), Some(PathBuf::from("packages/api/package.json")));
    }

    #[test]
    fn test_make_relative_sibling_dir() {
        let target = Path::new("/project/packages/web/package.json");
        let base = Path::new("/project/packages/api");
        assert_eq!(make_relative(target, base), Some(PathBuf::from("../web/package.json")));
    }

    #[test]
    fn test_make_relative_same_path() {
        let p = Path::new("/project");
        assert_eq!(make_relative(p, p), Some(PathBuf::from(".")));
    }

    #[test]
    fn test_make_relative_relative_vs_absolute() {
        assert_eq!(make_relative(Path::new("a/b"), Path::new("/project")), None);
    }

    #[test]
    fn test_dependency_name_and_suggestion() {
        let text = "{\n  \"dependencies\": {\n    \"lodash\": \"^4\"\n  }\n}";
        let w = warning(TextRange::on_line(2, 5, 11));
        assert_eq!(dependency_name(Some(text), &w), "lodash");
        assert_eq!(dependency_name(None, &w), "?");
        assert_eq!(suggested_package("lodash"), "@types/lodash");
    }

    #[test]
    fn test_suggestion_comes_from_manifest_name() {
        colored::control::set_override(false);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let manifest = temp_dir.path().join("package.json");
        std::fs::write(&manifest, "\u{feff}{ \"dependencies\": { \"@babel/core\": \"^7\" } }").unwrap();
        let w = Warning {
            message: "it's missing 'types'".to_string(),
            ..warning(TextRange::on_line(0, 21, 32))
        };

        let mut out = Vec::new();
        print_warnings(&mut out, &[(manifest, vec![w])]).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("@babel/core → @types/babel__core"));
    }

    #[test]
    fn test_print_warnings_lists_each_warning() {
        colored::control::set_override(false);
        let diagnostics = vec![(
            PathBuf::from("/nonexistent/package.json"),
            vec![warning(TextRange::on_line(2, 5, 11)), warning(TextRange::on_line(3, 5, 10))],
        )];

        let mut out = Vec::new();
        print_warnings(&mut out, &diagnostics).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("├──  3:6"));
        assert!(out.contains("└──  4:6"));
        assert!(out.contains("Missing types: 2"));
        assert!(out.contains("? →"));
    }
}
