//! Saltcrypt CLI - passphrase-based file encryption
//!
//! Encrypts a file to base64 text and back, using AES in CBC mode (with
//! `--iv`) or ECB mode (without), an optional password hash and an optional
//! random salt.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use saltcrypt::passphrase::{PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader};
use saltcrypt::{
    EncryptionOptions, KeySize, PaddingMode, PasswordHash, Result, SaltedCipher, file_ops,
};

#[derive(Parser)]
#[command(name = "saltcrypt")]
#[command(version)]
#[command(about = "Passphrase-based AES file encryption.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    #[command(flatten)]
    cipher: CipherArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CipherArgs {
    /// Initialization vector (16 bytes); selects CBC mode. Without it ECB is used
    #[arg(long, global = true, value_name = "TEXT")]
    iv: Option<String>,

    /// Fixed key size in bits (128, 192 or 256); inferred from the passphrase length if absent
    #[arg(long, global = true, value_name = "BITS")]
    key_size: Option<KeySize>,

    /// Password hash used to derive the key (none, md5, sha1, sha256, sha384, sha512)
    #[arg(long, global = true, default_value = "sha1")]
    hash: PasswordHash,

    /// Password hash iterations
    #[arg(long, global = true, default_value_t = 1)]
    iterations: u32,

    /// Password hash salt
    #[arg(long, global = true, default_value = "", value_name = "TEXT")]
    hash_salt: String,

    /// Minimum random salt length in bytes
    #[arg(long, global = true, default_value_t = 0)]
    min_salt: u32,

    /// Maximum random salt length in bytes (0 disables salting, at most 255)
    #[arg(long, global = true, default_value_t = 0)]
    max_salt: u32,

    /// Padding mode (none, pkcs7, zeros, ansix923, iso10126)
    #[arg(long, global = true, default_value = "pkcs7")]
    padding: PaddingMode,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file to base64 text
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the base64 ciphertext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt a file of base64 text
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file holding base64 ciphertext
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the decrypted contents to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = build_cipher(&cli).and_then(|cipher| match &cli.command {
        Commands::Encrypt { input, output } => file_ops::encrypt_file(input, output, &cipher),
        Commands::Decrypt { input, output } => file_ops::decrypt_file(input, output, &cipher),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", describe(&e));
        process::exit(1);
    }
}

fn build_cipher(cli: &Cli) -> Result<SaltedCipher> {
    let args = &cli.cipher;
    let mut builder = EncryptionOptions::builder()
        .password_hash(args.hash)
        .password_hash_iterations(args.iterations)
        .password_hash_salt(args.hash_salt.clone())
        .salt_length(args.min_salt, args.max_salt)
        .padding_mode(args.padding);
    if let Some(size) = args.key_size {
        builder = builder.fixed_key_size(size.bits());
    }
    let options = builder.build()?;

    let mut reader = get_passphrase_reader(cli.passphrase_stdin);
    let passphrase = reader.read_passphrase()?;
    SaltedCipher::new(&passphrase, args.iv.as_deref(), options)
}

fn get_passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalPassphraseReader)
    }
}

/// Join an error with its chain of sources: "outer: inner: root".
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
