//! `credtrust init`: Write a default node configuration.

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Keep everything in memory instead of RocksDB.
    #[arg(long)]
    pub in_memory: bool,

    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

fn default_config(backend: &str) -> String {
    format!(
        r#"# CredTrust Node Configuration

[api]
listen_addr = "127.0.0.1"
port = 9101

[storage]
backend = "{}"
data_dir = "./data"

[logging]
level = "info"
format = "text"

[policy]
unique_issuer_names = false
max_name_length = 256
"#,
        backend
    )
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let config_path = args.dir.join("credtrust.toml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "configuration file already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    std::fs::create_dir_all(&args.dir)?;

    let backend = if args.in_memory { "memory" } else { "rocksdb" };
    std::fs::write(&config_path, default_config(backend))?;
    println!("Initialized CredTrust node at {}", config_path.display());
    println!("Edit credtrust.toml to customize your configuration.");
    println!("Run 'credtrust-node -c {}' to start the node.", config_path.display());

    if !args.in_memory {
        std::fs::create_dir_all(args.dir.join("data"))?;
    }

    Ok(())
}
