//! `dxt-sign` — sign and verify DXT archives.

mod inspect;
mod keygen;
mod sign;
mod trust;
mod verify;

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::EnvFilter;

/// Sign and verify DXT archives with RSA keys.
#[derive(Parser)]
#[command(name = "dxt-sign", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign an archive and write the signed copy to a new path.
    Sign {
        /// Archive to sign.
        archive: PathBuf,
        /// PEM private key (PKCS#8 or PKCS#1).
        private_key: PathBuf,
        /// Key id recorded in the signature.
        key_id: String,
        /// Where to write the signed archive.
        output: PathBuf,
    },

    /// Verify an archive's signature against a trusted key.
    Verify {
        /// Archive to verify.
        archive: PathBuf,
        /// Key id to trust.
        key_id: String,
        /// PEM public key for `key_id`.
        public_key: PathBuf,
        /// Additionally trust every key in this trust store file.
        #[arg(long)]
        trust_store: Option<PathBuf>,
        /// Don't re-check the signed manifest digest.
        #[arg(long)]
        skip_manifest_check: bool,
    },

    /// Generate a new RSA keypair for archive signing.
    Keygen {
        /// Key id; the files are named `<key-id>.pem` and `<key-id>.pub.pem`.
        key_id: String,
        /// Output directory (defaults to the config directory).
        #[arg(long)]
        output: Option<PathBuf>,
        /// RSA modulus size in bits.
        #[arg(long, default_value_t = dxt_signing::keys::DEFAULT_KEY_BITS)]
        bits: usize,
    },

    /// Show the signature file embedded in an archive.
    Inspect {
        /// Archive to inspect.
        archive: PathBuf,
    },

    /// Manage the trust store.
    Trust {
        /// Trust store file (defaults to the config directory).
        #[arg(long, global = true)]
        store: Option<PathBuf>,

        #[command(subcommand)]
        command: TrustCommand,
    },
}

#[derive(Subcommand)]
enum TrustCommand {
    /// Trust a public key under a key id.
    Add {
        key_id: String,
        /// PEM public key.
        public_key: PathBuf,
        /// Human-readable name.
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Stop trusting a key id.
    Remove { key_id: String },
    /// List trusted key ids.
    List,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Sign {
            archive,
            private_key,
            key_id,
            output,
        } => sign::run(&archive, &private_key, &key_id, &output),
        Command::Verify {
            archive,
            key_id,
            public_key,
            trust_store,
            skip_manifest_check,
        } => verify::run(&archive, &key_id, &public_key, trust_store.as_deref(), skip_manifest_check),
        Command::Keygen { key_id, output, bits } => keygen::run(&key_id, output.as_deref(), bits),
        Command::Inspect { archive } => inspect::run(&archive),
        Command::Trust { store, command } => {
            let store = match store {
                Some(path) => path,
                None => dxt_signing::keys::TrustStore::default_path()?,
            };
            match command {
                TrustCommand::Add {
                    key_id,
                    public_key,
                    name,
                } => trust::add(&store, &key_id, &public_key, &name),
                TrustCommand::Remove { key_id } => trust::remove(&store, &key_id),
                TrustCommand::List => trust::list(&store),
            }
        }
    }
}
