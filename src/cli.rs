use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pytgen-rs",
    about = "Traced-JavaScript generator for block programs (PythonTutor trace convention)."
)]
pub struct Args {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Disable pyt.generate_trace instrumentation in the emitted source."
    )]
    pub no_trace: bool,

    #[arg(long, help = "Validate the block program without generating source.")]
    pub check: bool,

    #[arg(long, help = "Treat semantic warnings as errors.")]
    pub deny_warnings: bool,
}
