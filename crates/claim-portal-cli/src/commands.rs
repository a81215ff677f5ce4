use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum ScheduleCommand {
    /// Print the stored schedule.
    Show,
    /// Switch between automatic rotation and a frozen manual schedule.
    SetMode {
        #[arg(value_parser = ["auto", "manual"])]
        mode: String,
    },
    /// Write a manual schedule. All five milestones are required and must
    /// not decrease.
    Set {
        #[arg(long)]
        snapshot_at: String,
        #[arg(long)]
        opens_at: String,
        #[arg(long)]
        closes_at: String,
        #[arg(long)]
        distribution_starts_at: String,
        #[arg(long)]
        distribution_done_at: String,
        /// Defaults to the stored round number plus one.
        #[arg(long)]
        round: Option<u64>,
    },
}
