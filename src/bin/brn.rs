//! CLI for batch renaming files and directories.

use anyhow::{Context, Result};
use batch_rename::prelude::*;
use batch_rename::report;
use clap::{Parser, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "brn")]
#[command(
    author,
    version,
    about = "Recursively batch rename files and directories by regular expression",
    long_about = None,
    after_help = "Examples:\n  \
        a.jpeg -> a.jpg        brn -p '\\.jpeg$' -r '.jpg'\n  \
        ab.png -> abab.png     brn -p '([ab]+)' -r '$1$1'\n  \
        a.png -> img_001.png   brn -p '^\\w+' -r 'img_{nr}' --nr-width 3\n  \
        undo the last run      brn -u"
)]
struct Cli {
    /// Paths to rename (files or directories)
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Regular expression matched against entry names
    #[arg(short, long, required_unless_present = "undo")]
    pattern: Option<String>,

    /// Replacement; supports $1, ${name}, {nr} and {kv}
    #[arg(short, long)]
    replacement: Option<String>,

    /// Descend into subdirectories
    #[arg(short = 'R', long)]
    recursive: bool,

    /// Also rename directories
    #[arg(short = 'd', long)]
    including_dir: bool,

    /// Only rename directories
    #[arg(short = 'D', long)]
    only_dir: bool,

    /// Maximum depth to descend, 0 for no limit
    #[arg(long, default_value_t = 0)]
    max_depth: usize,

    /// Case-insensitive pattern, filters and kv keys
    #[arg(short, long)]
    ignore_case: bool,

    /// Case policy for conflict checks between paths
    #[arg(long, value_enum, default_value_t = PathCaseArg::Auto)]
    path_case: PathCaseArg,

    /// Keep file extensions out of matching and replacement
    #[arg(short = 'e', long)]
    ignore_ext: bool,

    /// Only consider names matching these regexes
    #[arg(short = 'f', long = "include-filters")]
    include: Vec<String>,

    /// Ignore names matching these regexes
    #[arg(short = 'F', long = "exclude-filters")]
    exclude: Vec<String>,

    /// Ignore names matching these regexes and do not descend into such directories
    #[arg(short = 'S', long = "skip-filters")]
    skip: Vec<String>,

    /// How to treat targets that already exist or are claimed twice
    #[arg(short, long, value_enum, default_value_t = OverwriteArg::Report)]
    overwrite_mode: OverwriteArg,

    /// Show what would be renamed without renaming
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// List matching paths only
    #[arg(short, long)]
    list: bool,

    /// List matching paths as absolute paths
    #[arg(short = 'a', long)]
    list_abs: bool,

    /// Separator between listed paths
    #[arg(short = 's', long, default_value = "\n")]
    list_sep: String,

    /// Natural ordering of listed names (file2 before file10)
    #[arg(short = 'N', long)]
    natural_sort: bool,

    /// Tab-delimited key-value file for {kv}
    #[arg(short, long)]
    kv_file: Option<PathBuf>,

    /// Capture group used as the {kv} key
    #[arg(short = 'I', long, default_value_t = 1)]
    key_capt_idx: usize,

    /// Keep the key when it is missing from the kv file
    #[arg(short = 'K', long)]
    keep_key: bool,

    /// Replacement for keys missing from the kv file
    #[arg(short = 'm', long)]
    key_miss_repl: Option<String>,

    /// Minimum width of {nr}
    #[arg(long, default_value_t = 1)]
    nr_width: usize,

    /// First value of {nr}
    #[arg(long, default_value_t = 1)]
    start_num: u64,

    /// Undo the last rename run
    #[arg(short, long)]
    undo: bool,

    /// Keep undoing past failures
    #[arg(long)]
    force_undo: bool,

    /// Undo log location
    #[arg(long, default_value = DEFAULT_UNDO_LOG)]
    undo_log: PathBuf,

    /// Fail a dry run when errors are found
    #[arg(long)]
    strict: bool,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,

    /// Only print the summary
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging, also show unchanged paths
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OverwriteArg {
    Report,
    Overwrite,
    Skip,
}

impl From<OverwriteArg> for OverwriteMode {
    fn from(arg: OverwriteArg) -> Self {
        match arg {
            OverwriteArg::Report => OverwriteMode::Report,
            OverwriteArg::Overwrite => OverwriteMode::Overwrite,
            OverwriteArg::Skip => OverwriteMode::Skip,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PathCaseArg {
    Auto,
    Sensitive,
    Insensitive,
}

impl From<PathCaseArg> for PathCase {
    fn from(arg: PathCaseArg) -> Self {
        match arg {
            PathCaseArg::Auto => PathCase::default(),
            PathCaseArg::Sensitive => PathCase::Sensitive,
            PathCaseArg::Insensitive => PathCase::Insensitive,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.undo {
        cmd_undo(&cli)
    } else {
        cmd_rename(cli)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "batch_rename=debug"
    } else {
        "batch_rename=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_undo(cli: &Cli) -> Result<()> {
    let report = undo::replay(&RealFs, &cli.undo_log, cli.force_undo)
        .with_context(|| format!("Undo from {} failed", cli.undo_log.display()))?;

    println!("{} path(s) restored", report.undone);
    if report.failed > 0 {
        println!("{} path(s) could not be restored", report.failed);
    }
    Ok(())
}

fn cmd_rename(cli: Cli) -> Result<()> {
    let mode = if cli.list || cli.list_abs {
        RunMode::List
    } else if cli.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Rename
    };
    let dir_mode = if cli.only_dir {
        DirMode::OnlyDirs
    } else if cli.including_dir {
        DirMode::IncludingDirs
    } else {
        DirMode::Files
    };

    let mut options = RenameOptions::new()
        .pattern(cli.pattern.unwrap_or_default())
        .ignore_case(cli.ignore_case)
        .path_case(cli.path_case.into())
        .recursive(cli.recursive)
        .max_depth(cli.max_depth)
        .dir_mode(dir_mode)
        .overwrite(cli.overwrite_mode.into())
        .start_num(cli.start_num)
        .nr_width(cli.nr_width)
        .key_capture(cli.key_capt_idx)
        .keep_key(cli.keep_key)
        .ignore_ext(cli.ignore_ext)
        .mode(mode)
        .list_abs(cli.list_abs)
        .list_sep(&cli.list_sep)
        .natural_sort(cli.natural_sort)
        .fail_on_warnings(cli.strict)
        .undo_log(&cli.undo_log);

    if let Some(replacement) = cli.replacement {
        options = options.replacement(replacement);
    }
    if let Some(path) = cli.kv_file {
        options = options.kv_file(path);
    }
    if let Some(repl) = cli.key_miss_repl {
        options = options.miss_replacement(repl);
    }
    for p in cli.skip {
        options = options.skip(p);
    }
    for p in cli.exclude {
        options = options.exclude(p);
    }
    for p in cli.include {
        options = options.include(p);
    }

    let config = options.build().context("Invalid options")?;
    let color = std::io::stdout().is_terminal();
    let (quiet, verbose, json) = (cli.quiet, cli.verbose, cli.json);

    let session = Rename::new(config).paths(cli.paths);
    let plan = session.plan_with(&RealFs, |item| match item {
        Observed::Failed(failure) => eprintln!("{}", report::format_failure(failure, color)),
        Observed::Entry(entry) => {
            let hidden = quiet
                || json
                || entry.disposition == Disposition::Listed
                || (entry.op.outcome == Outcome::Unchanged && !verbose);
            if !hidden {
                println!("{}", report::format_entry(entry, color));
            }
        }
    });

    if mode == RunMode::List {
        let listing = report::format_listing(
            plan.listed(),
            session.config().list_abs,
            &session.config().list_sep,
        )?;
        if !listing.is_empty() {
            println!("{listing}");
        }
        if !plan.failures().is_empty() {
            anyhow::bail!("{} path(s) could not be walked", plan.failures().len());
        }
        return Ok(());
    }

    if json {
        println!("{}", report::plan_json(&plan)?);
    }

    let committed = plan.commit(&RealFs, session.undo_log());
    if !json {
        let renamed = match (&committed, mode) {
            (Ok(n), RunMode::Rename) => Some(*n),
            _ => None,
        };
        println!("{}", report::format_summary(&plan, renamed, color));
    }
    committed.context("Rename aborted")?;

    Ok(())
}
