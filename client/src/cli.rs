use archive::Framing;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[clap(author, version)]
#[clap(name = "Go Training Data Client")]
#[clap(about = "Verifies, inspects and converts self-play archives", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Verify(VerifyCommand),
    Inspect(InspectCommand),
    Pack(PackCommand),
    Augment(AugmentCommand),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FramingArg {
    /// Entries delimited only by their magic byte, decoded eagerly.
    Stream,
    /// Entries carrying a length prefix, decoded lazily.
    Prefixed,
}

impl From<FramingArg> for Framing {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::Stream => Framing::Stream,
            FramingArg::Prefixed => Framing::LengthPrefixed,
        }
    }
}

impl std::fmt::Display for FramingArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FramingArg::Stream => write!(f, "stream"),
            FramingArg::Prefixed => write!(f, "prefixed"),
        }
    }
}

#[derive(Args)]
#[clap(about = "Replays every game of a move-log archive and reports totals")]
pub struct VerifyCommand {
    #[clap(short, long)]
    pub input: String,

    #[clap(long, value_enum, default_value_t = FramingArg::Prefixed)]
    pub framing: FramingArg,
}

#[derive(Args)]
#[clap(about = "Dumps one game of a move-log archive as JSON")]
pub struct InspectCommand {
    #[clap(short, long)]
    pub input: String,

    #[clap(long, value_enum, default_value_t = FramingArg::Prefixed)]
    pub framing: FramingArg,

    #[clap(short, long)]
    pub game: usize,

    /// Include the full step list in the output.
    #[clap(long)]
    pub steps: bool,
}

#[derive(Args)]
#[clap(about = "Encodes every sampleable position into a bit-packed sample archive")]
pub struct PackCommand {
    #[clap(short, long)]
    pub input: String,

    #[clap(short, long)]
    pub output: String,

    #[clap(long, value_enum, default_value_t = FramingArg::Prefixed)]
    pub framing: FramingArg,
}

#[derive(Args)]
#[clap(about = "Applies a random board symmetry to every record of a sample archive")]
pub struct AugmentCommand {
    #[clap(short, long)]
    pub input: String,

    #[clap(short, long)]
    pub output: String,

    /// Seed for the symmetry choice, for reproducible output.
    #[clap(long)]
    pub seed: Option<u64>,
}
