//! Command-line surface of the translator.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tac,
    Yaml,
    Dot,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Tac => "tac",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Dot => "dot",
        }
    }
}

#[derive(Parser)]
#[command(name = "ctac", bin_name = "ctac")]
#[command(about = "Translate preprocessed C source into three-address code")]
pub struct Cli {
    /// Emit TAC in binary format (default)
    #[arg(long, overrides_with_all = ["yaml", "dot"])]
    pub tac: bool,

    /// Emit YAML format
    #[arg(long, overrides_with_all = ["tac", "dot"])]
    pub yaml: bool,

    /// Emit Graphviz DOT script
    #[arg(long, overrides_with_all = ["tac", "yaml"])]
    pub dot: bool,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Dump the AST, symbol table, and type table to stderr
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Input filename
    pub input: PathBuf,

    /// Output filename; `-` means standard output
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn format(&self) -> OutputFormat {
        if self.yaml {
            OutputFormat::Yaml
        } else if self.dot {
            OutputFormat::Dot
        } else {
            OutputFormat::Tac
        }
    }

    /// The explicit output path, or the input with its extension replaced
    /// by the format's.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let mut path = self.input.clone();
                path.set_extension(self.format().extension());
                path
            }
        }
    }
}
