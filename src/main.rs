use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use quantum_cipher::{CipherConfig, DecryptRequest, EncryptRequest, QuantumCipher};

#[derive(Parser)]
#[command(name = "qcipher")]
#[command(about = "BB84 key agreement and six-gate Clifford encryption on a stabilizer simulator")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, default_value = "qcipher.toml")]
    config: PathBuf,

    /// Fixed RNG seed, overriding the configuration
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Shots per encryption and decryption run
    #[arg(long, global = true)]
    shots: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable debug logs
    #[arg(long, global = true, env = "QCIPHER_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a message or raw bits, then decrypt them again
    Encrypt(EncryptArgs),
    /// Decrypt ciphertext bits
    Decrypt(DecryptArgs),
}

#[derive(Args)]
struct EncryptArgs {
    /// Text to Huffman-encode and encrypt
    #[arg(long, conflicts_with = "bits")]
    message: Option<String>,

    /// Pre-encoded bits to encrypt as-is
    #[arg(long)]
    bits: Option<String>,

    /// Shared key bits; generated with BB84 when omitted
    #[arg(long)]
    key: Option<String>,
}

#[derive(Args)]
struct DecryptArgs {
    /// Ciphertext bits
    #[arg(long)]
    ciphertext: String,

    /// Shared key bits
    #[arg(long)]
    key: String,

    /// Reference bits for error mitigation
    #[arg(long)]
    reference: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quantum_cipher=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quantum_cipher=info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = CipherConfig::load(&cli.config)
        .and_then(CipherConfig::apply_env_overrides)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(shots) = cli.shots {
        config.shots = shots;
    }

    let cipher = QuantumCipher::new(config).context("invalid configuration")?;
    let mut rng = cipher.config().rng();

    match cli.command {
        Commands::Encrypt(args) => {
            let request = EncryptRequest {
                message: args.message,
                pre_encoded_bits: args.bits,
                shared_key: args.key,
            };
            let response = cipher.encrypt(&request, &mut rng).context("encryption failed")?;
            print_json(&response, cli.pretty)
        }
        Commands::Decrypt(args) => {
            let request = DecryptRequest {
                ciphertext_bits: args.ciphertext,
                shared_key: args.key,
                reference_bits: args.reference,
            };
            let response = cipher.decrypt(&request, &mut rng).context("decryption failed")?;
            print_json(&response, cli.pretty)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
