use clap::ValueEnum;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Readable summary
    #[default]
    Human,
    /// Machine-readable JSON
    Json,
}
