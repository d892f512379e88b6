pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, DetectArgs, GenerateArgs, RulesArgs, ScanArgs};
pub use output::{OutputFormat, OutputFormatter};
