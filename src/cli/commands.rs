use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Build-graph extension for Qt toolkit sources
#[derive(Parser, Debug)]
#[command(
    name = "qtbuild",
    about = "Build-graph extension for Qt toolkit sources",
    version,
    author,
    long_about = "qtbuild locates a Qt toolkit installation, classifies C++ translation \
                  units by their companion artifacts (UI descriptors, headers carrying \
                  the meta-object marker) and drives the toolkit's code generators as \
                  declarative rules a host build engine can consume."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Locate the toolkit installation",
        long_about = "Resolves the toolkit installation directory (explicit flag, QTDIR, \
                      pkg-config prefix), the uic and moc executables and the header and \
                      library directories, and updates the detection cache.\n\n\
                      Examples:\n  \
                      qtbuild detect\n  \
                      qtbuild detect --qt-dir /usr/lib/qt3\n  \
                      qtbuild detect --reconfigure --format json"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Classify the translation units of a target",
        long_about = "Scans C++ translation units for companion UI descriptors and headers \
                      carrying the meta-object marker, and reports which generator has to \
                      run for each unit.\n\n\
                      Examples:\n  \
                      qtbuild scan src/\n  \
                      qtbuild scan src/widget.cpp src/dialog.cpp --format json"
    )]
    Scan(ScanArgs),

    #[command(about = "List the registered transformation rules")]
    Rules(RulesArgs),

    #[command(
        about = "Run the applicable rule recipes for inputs",
        long_about = "Picks a rule per input by suffix (or an explicit --rule) and runs \
                      its external-command recipe into the output directory.\n\n\
                      Examples:\n  \
                      qtbuild generate src/dialog.ui -o build/\n  \
                      qtbuild generate --rule moc-cpp src/widget.h -o build/\n  \
                      qtbuild generate --dry-run src/dialog.ui"
    )]
    Generate(GenerateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(long, value_name = "DIR", help = "Toolkit installation directory")]
    pub qt_dir: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Toolkit header directory")]
    pub qt_includes: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Toolkit library directory")]
    pub qt_libs: Option<PathBuf>,

    #[arg(long, help = "Ignore the detection cache and probe again")]
    pub reconfigure: bool,

    #[arg(long, help = "Disable the detection cache entirely")]
    pub no_cache: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    #[arg(
        value_name = "PATH",
        required = true,
        help = "Directory or translation units to scan"
    )]
    pub paths: Vec<PathBuf>,

    #[arg(long, help = "Disable companion artifact scanning (pass-through)")]
    pub no_autoscan: bool,

    #[arg(long, help = "Skip the generated-unit include scan")]
    pub no_moc_include_scan: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct RulesArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(value_name = "INPUT", required = true, help = "Input files")]
    pub inputs: Vec<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Output directory"
    )]
    pub out_dir: PathBuf,

    #[arg(long, value_name = "NAME", help = "Force a rule instead of suffix dispatch")]
    pub rule: Option<String>,

    #[arg(long, value_name = "DIR", help = "Toolkit installation directory")]
    pub qt_dir: Option<PathBuf>,

    #[arg(long, help = "Ignore the detection cache and probe again")]
    pub reconfigure: bool,

    #[arg(long, help = "Print the recipes without running them")]
    pub dry_run: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Human,
    Json,
}
