use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Dependencies that are chatty at info level.
const QUIET_TARGETS: &[&str] = &["hyper_util=warn", "wgpu_core=warn", "wgpu_hal=warn", "cosmic_text=warn"];

/// Logging flags shared by every subcommand.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct Log {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Log {
    pub fn level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }

    /// Install the global subscriber. `RUST_LOG` overrides the level.
    pub fn init(&self) {
        let filter = EnvFilter::builder()
            .with_default_directive(self.level().into())
            .from_env_lossy();
        let filter = QUIET_TARGETS
            .iter()
            .filter_map(|d| d.parse().ok())
            .fold(filter, EnvFilter::add_directive);

        let subscriber = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .finish();

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!("global subscriber already installed");
        }
    }
}
