#![forbid(unsafe_code)]
//! hexwarden CLI — encrypt and decrypt files with AES-256-GCM, Argon2id
//! key derivation, and Reed-Solomon error correction.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use hexwarden::{
    decrypt_file, default_decrypt_output_path, default_encrypt_output_path, encrypt_file,
    file::SECURE_DELETE_PASSES, secure_delete, HexWardenError,
};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;

#[derive(Parser, Debug)]
#[command(
    name = "hexwarden",
    version,
    about = "Encrypt/decrypt files with AES-256-GCM, Argon2id, and Reed-Solomon FEC"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a file
    Encrypt(EncryptArgs),
    /// Decrypt a file
    Decrypt(DecryptArgs),
}

#[derive(Args, Debug)]
struct EncryptArgs {
    /// Input file
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output file. If omitted, ".hex" is appended.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Password. If omitted, prompts interactively (with confirmation).
    #[arg(short = 'p', long = "password")]
    password: Option<String>,

    /// Remove the source file after successful encryption
    #[arg(long = "delete-source")]
    delete_source: bool,

    /// Overwrite the source with random data before removal
    /// (implies --delete-source)
    #[arg(long = "secure-delete")]
    secure_delete: bool,

    /// Overwrite the output if it exists
    #[arg(short = 'f', long = "force")]
    force: bool,
}

#[derive(Args, Debug)]
struct DecryptArgs {
    /// Input file
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output file. If omitted, a trailing ".hex" is stripped.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Password. If omitted, prompts interactively.
    #[arg(short = 'p', long = "password")]
    password: Option<String>,

    /// Remove the source file after successful decryption
    #[arg(long = "delete-source")]
    delete_source: bool,

    /// Overwrite the source with random data before removal
    /// (implies --delete-source)
    #[arg(long = "secure-delete")]
    secure_delete: bool,

    /// Overwrite the output if it exists
    #[arg(short = 'f', long = "force")]
    force: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            if is_user_cancel(&e) {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Encrypt(args) => cmd_encrypt(args),
        Command::Decrypt(args) => cmd_decrypt(args),
    }
}

fn cmd_encrypt(args: EncryptArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_encrypt_output_path(&args.input));
    let password = obtain_password(&args.password, true)?;

    prepare_output(&output, args.force)?;
    encrypt_file(&args.input, &output, &password, |_| {})
        .with_context(|| "encryption failed")?;
    eprintln!("Wrote {}", output.display());

    dispose_source(&args.input, args.delete_source, args.secure_delete)?;
    Ok(())
}

fn cmd_decrypt(args: DecryptArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_decrypt_output_path(&args.input));
    let password = obtain_password(&args.password, false)?;

    prepare_output(&output, args.force)?;
    decrypt_file(&args.input, &output, &password, |_| {})
        .with_context(|| "decryption failed")?;
    eprintln!("Wrote {}", output.display());

    dispose_source(&args.input, args.delete_source, args.secure_delete)?;
    Ok(())
}

/// Resolve the password from the flag or an interactive prompt. Encryption
/// prompts twice and requires both entries to match.
fn obtain_password(flag: &Option<String>, confirm: bool) -> Result<SecretString> {
    if let Some(p) = flag {
        if p.is_empty() {
            bail!("password must not be empty");
        }
        return Ok(SecretString::new(p.clone().into_boxed_str()));
    }

    let password = prompt_password("Password: ")?;
    if confirm {
        let repeat = prompt_password("Confirm password: ")?;
        if password.expose_secret() != repeat.expose_secret() {
            bail!("passwords do not match");
        }
    }
    if password.expose_secret().is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

fn prompt_password(prompt: &str) -> Result<SecretString> {
    let mut pw = rpassword::prompt_password(prompt).map_err(|e| match e.kind() {
        std::io::ErrorKind::Interrupted | std::io::ErrorKind::UnexpectedEof => {
            anyhow::Error::new(HexWardenError::Canceled)
        }
        _ => anyhow::Error::new(e),
    })?;
    let secret = SecretString::new(pw.clone().into_boxed_str());
    pw.zeroize();
    Ok(secret)
}

/// Enforce the overwrite policy before the core refuses an existing file.
fn prepare_output(output: &Path, force: bool) -> Result<()> {
    if output.exists() {
        if !force {
            bail!("output exists: {} (use --force to overwrite)", output.display());
        }
        fs::remove_file(output)
            .with_context(|| format!("failed to remove {}", output.display()))?;
    }
    Ok(())
}

fn dispose_source(input: &Path, delete: bool, secure: bool) -> Result<()> {
    if secure {
        secure_delete(input, SECURE_DELETE_PASSES)
            .with_context(|| format!("secure deletion of {} failed", input.display()))?;
    } else if delete {
        fs::remove_file(input)
            .with_context(|| format!("removal of {} failed", input.display()))?;
    }
    Ok(())
}

fn is_user_cancel(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<HexWardenError>(),
        Some(HexWardenError::Canceled)
    )
}
