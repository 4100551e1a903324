//! Text and JSON rendering of a plan for terminal display.

use crate::error::Result;
use crate::execute::{Disposition, Plan, PlanEntry, RootFailure};
use crate::plan::{Operation, Outcome};
use std::fmt::Write;
use std::path::{self, Path};

// ANSI color codes
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Short label for an outcome.
pub fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Ok => "ok",
        Outcome::Unchanged => "unchanged",
        Outcome::MissingTarget => "missing target",
        Outcome::EndingWithPeriod => "new path ends with a period",
        Outcome::EndingWithSpace => "new path ends with a space",
        Outcome::Existed => "new path existed",
        Outcome::OverwriteNewPath => "overwriting newly renamed path",
    }
}

fn tag(entry: &PlanEntry) -> (String, &'static str) {
    let label = outcome_label(entry.op.outcome);
    match entry.disposition {
        Disposition::Accepted if entry.op.outcome == Outcome::Ok => ("[OK]".to_string(), GREEN),
        Disposition::Accepted => (format!("[overwrite: {label}]"), YELLOW),
        Disposition::Dropped if entry.op.outcome == Outcome::Unchanged => {
            ("[unchanged]".to_string(), "")
        }
        Disposition::Dropped => (format!("[skipped: {label}]"), YELLOW),
        Disposition::Error => (format!("[ERR: {label}]"), RED),
        Disposition::Listed => (String::new(), ""),
    }
}

/// Renders one plan entry as a single line.
pub fn format_entry(entry: &PlanEntry, color: bool) -> String {
    let (tag, code) = tag(entry);
    let op = &entry.op;
    let body = if op.source == op.target {
        op.source.display().to_string()
    } else {
        format!("{} -> {}", op.source.display(), op.target.display())
    };

    if color && !code.is_empty() {
        format!("{code}{tag}{RESET} {body}")
    } else {
        format!("{tag} {body}")
    }
}

/// Renders a failed root.
pub fn format_failure(failure: &RootFailure, color: bool) -> String {
    let msg = format!("[ERR] {}: {}", failure.root.display(), failure.error);
    if color { format!("{RED}{msg}{RESET}") } else { msg }
}

/// Joins listed paths with `sep`, optionally as absolute paths.
pub fn format_listing<'a>(
    ops: impl IntoIterator<Item = &'a Operation>,
    absolute: bool,
    sep: &str,
) -> Result<String> {
    let mut parts = Vec::new();
    for op in ops {
        parts.push(display_path(&op.source, absolute)?);
    }
    Ok(parts.join(sep))
}

fn display_path(path: &Path, absolute: bool) -> Result<String> {
    if absolute {
        Ok(path::absolute(path)?.display().to_string())
    } else {
        Ok(path.display().to_string())
    }
}

/// One-paragraph summary of a plan and, if executed, how many paths were renamed.
pub fn format_summary(plan: &Plan, renamed: Option<usize>, color: bool) -> String {
    let mut out = String::new();
    let errors = plan.error_count();
    let (open, close) = if color { (CYAN, RESET) } else { ("", "") };

    writeln!(
        &mut out,
        "{open}{} path(s) checked, {} to rename, {} unchanged, {} skipped, {} error(s){close}",
        plan.entries().len(),
        plan.count(Disposition::Accepted),
        plan.count_outcome(Outcome::Unchanged),
        plan.count(Disposition::Dropped) - plan.count_outcome(Outcome::Unchanged),
        errors,
    )
    .unwrap();

    match renamed {
        Some(n) => write!(&mut out, "{n} path(s) renamed").unwrap(),
        None if errors > 0 => write!(&mut out, "{errors} error(s) found, nothing renamed").unwrap(),
        None => write!(
            &mut out,
            "{} path(s) would be renamed",
            plan.count(Disposition::Accepted)
        )
        .unwrap(),
    }

    out
}

/// The plan's entries as pretty JSON.
pub fn plan_json(plan: &Plan) -> Result<String> {
    Ok(serde_json::to_string_pretty(plan.entries())?)
}
