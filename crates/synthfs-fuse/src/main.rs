//! synthfs binary.
//!
//! Mounts the built-in in-memory tree at a directory.
//!
//! Usage:
//!   synthfs /mnt/synth
//!   synthfs /mnt/synth --config synthfs.toml
//!   synthfs /mnt/synth --content /bar/baz/example=./example.bin --log-level debug

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use synthfs_kernel::{ContentSeed, SynthFs, apply_seeds, default_layout};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use synthfs_fuse::MountConfig;

/// Mount a synthetic in-memory directory tree.
#[derive(Parser, Debug)]
#[command(name = "synthfs")]
#[command(about = "Mount a synthetic in-memory directory tree over FUSE")]
struct Args {
    /// Directory to mount on
    mountpoint: PathBuf,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Owner uid of every node (default: current user)
    #[arg(long)]
    uid: Option<u32>,

    /// Owner gid of every node (default: current group)
    #[arg(long)]
    gid: Option<u32>,

    /// Let other users access the mount
    #[arg(long)]
    allow_other: bool,

    /// Unmount automatically when the process exits. Implies --allow-other
    /// unless run as root, which needs user_allow_other in /etc/fuse.conf
    #[arg(long)]
    auto_unmount: bool,

    /// Do not let the kernel cache file contents across opens
    #[arg(long)]
    no_kernel_cache: bool,

    /// How long the kernel may cache attributes and lookups
    #[arg(long)]
    attr_ttl_secs: Option<u64>,

    /// Mount source name
    #[arg(long)]
    fs_name: Option<String>,

    /// Seed a file from the host: VPATH=HOSTFILE (repeatable)
    #[arg(long = "content", value_name = "VPATH=HOSTFILE")]
    content: Vec<ContentSeed>,

    /// Log filter (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Layer command-line flags over the file config.
    fn apply(&self, config: &mut MountConfig) {
        if let Some(uid) = self.uid {
            config.uid = Some(uid);
        }
        if let Some(gid) = self.gid {
            config.gid = Some(gid);
        }
        if self.allow_other {
            config.allow_other = true;
        }
        if self.auto_unmount {
            config.auto_unmount = true;
        }
        if self.no_kernel_cache {
            config.kernel_cache = false;
        }
        if let Some(ttl) = self.attr_ttl_secs {
            config.attr_ttl_secs = ttl;
        }
        if let Some(name) = &self.fs_name {
            config.fs_name = name.clone();
        }
        config
            .content
            .extend(self.content.iter().cloned().map(Into::into));
    }
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => MountConfig::load(path)?,
        None => MountConfig::default(),
    };
    args.apply(&mut config);

    let mut root = default_layout();
    apply_seeds(&mut root, &config.seeds()).context("failed to seed content")?;

    let identity = config.identity();
    tracing::info!(uid = identity.uid, gid = identity.gid, "serving tree");
    let fs = Arc::new(SynthFs::new(root, identity));

    synthfs_fuse::mount(fs, &args.mountpoint, &config)
        .with_context(|| format!("failed to mount at {}", args.mountpoint.display()))
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.log_level.as_deref()) {
        eprintln!("synthfs: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
