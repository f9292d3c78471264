//! otpcrypt CLI - Passphrase-based OTP seed encryption
//!
//! Command-line interface for encrypting OTP seeds into storable tokens
//! and decrypting them again, directly or from an account file.

use clap::{Parser, Subcommand};
use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;
use zeroize::Zeroizing;

use otpcrypt::OtpcryptError;
use otpcrypt::error::{ErrorCategory, ErrorKind};
use otpcrypt::ops;
use otpcrypt::passphrase::{PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader};

#[derive(Parser)]
#[command(name = "otpcrypt")]
#[command(version)]
#[command(about = "Passphrase-based encryption of OTP seeds.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    /// Log more (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a token and print the encoded result
    #[command(alias = "e")]
    Encrypt {
        /// Token to encrypt; prompted for on the terminal when omitted
        #[arg(short, long, value_name = "TOKEN")]
        token: Option<String>,
    },

    /// Decrypt an encoded token and print the plaintext
    #[command(alias = "d")]
    Decrypt {
        /// Encoded token as printed by `encrypt`
        #[arg(short, long, value_name = "ENCODED")]
        encoded: String,
    },

    /// Decrypt the token stored for an account in an account file
    #[command(alias = "l")]
    Lookup {
        /// Account name
        #[arg(short, long, value_name = "NAME")]
        account: String,

        /// Account file with `<name> <encoded token>` lines
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encrypt { token } => run_encrypt(token, cli.passphrase_stdin),
        Commands::Decrypt { encoded } => {
            let mut reader = get_passphrase_reader(cli.passphrase_stdin);
            ops::decrypt(&encoded, &mut *reader).map(print_token)
        }
        Commands::Lookup { account, file } => {
            let mut reader = get_passphrase_reader(cli.passphrase_stdin);
            ops::lookup(&account, &file, &mut *reader).map(print_token)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", error_chain(&e));
        process::exit(1);
    }
}

fn run_encrypt(token: Option<String>, passphrase_stdin: bool) -> otpcrypt::Result<()> {
    let token = match token {
        Some(token) => Zeroizing::new(token),
        None if passphrase_stdin => {
            return Err(OtpcryptError::new(
                ErrorCategory::User,
                "--token is required with --passphrase-stdin",
            ));
        }
        None => read_token_from_terminal()?,
    };

    let encoded = if passphrase_stdin {
        let mut reader = get_passphrase_reader(true);
        ops::encrypt(&token, &mut *reader, None)?
    } else {
        let mut reader = TerminalPassphraseReader::new();
        let mut confirm = TerminalPassphraseReader::with_prompt("Confirm passphrase (otpcrypt): ");
        ops::encrypt(&token, &mut reader, Some(&mut confirm))?
    };

    println!("{}", encoded);
    Ok(())
}

fn read_token_from_terminal() -> otpcrypt::Result<Zeroizing<String>> {
    let mut reader = TerminalPassphraseReader::with_prompt("Token to encrypt (otpcrypt): ");
    let bytes = reader.read_passphrase()?;
    let token = std::str::from_utf8(&bytes).map_err(|e| {
        OtpcryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::UnsupportedToken,
            "token is not valid UTF-8",
            e,
        )
    })?;
    debug!(token_len = token.len(), "read token from terminal");
    Ok(Zeroizing::new(token.to_owned()))
}

fn print_token(token: Zeroizing<String>) {
    println!("{}", token.as_str());
}

fn get_passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(io::stdin()))
    } else {
        Box::new(TerminalPassphraseReader::new())
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: logging already initialized");
    }
}

fn error_chain(err: &OtpcryptError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
