use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Target directory for generated chunk files
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Optional path to config file (YAML)
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Target size, in MiB (overrides config when set)
    #[arg(long)]
    pub target_size_mib: Option<u64>,

    /// Chunk size, in MiB (overrides config when set)
    #[arg(long)]
    pub chunk_size_mib: Option<u64>,

    /// Sub-chunk write size, in MiB (overrides config when set)
    #[arg(long)]
    pub sub_chunk_mib: Option<u64>,

    /// Delete every file in the target directory and exit
    #[arg(long)]
    pub clear: bool,

    /// Seconds between logged progress snapshots
    #[arg(long, default_value_t = 1)]
    pub progress_interval_secs: u64,
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}

#[cfg(test)]
mod tests {
    use super::CliOptions;
    use clap::Parser;

    #[test]
    fn parses_clear_flag() {
        let opts = CliOptions::try_parse_from(["diskfill", "--dir", "/tmp/fill", "--clear"])
            .expect("parse");
        assert!(opts.clear);
    }

    #[test]
    fn parses_size_overrides() {
        let opts = CliOptions::try_parse_from([
            "diskfill",
            "--dir",
            "/tmp/fill",
            "--target-size-mib",
            "512",
            "--chunk-size-mib",
            "50",
        ])
        .expect("parse");
        assert_eq!(opts.target_size_mib, Some(512));
        assert_eq!(opts.chunk_size_mib, Some(50));
        assert_eq!(opts.sub_chunk_mib, None);
    }

    #[test]
    fn progress_interval_defaults_to_one_second() {
        let opts = CliOptions::try_parse_from(["diskfill", "--dir", "/tmp/fill"]).expect("parse");
        assert_eq!(opts.progress_interval_secs, 1);
    }
}
