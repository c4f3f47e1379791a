//! ditconfig CLI application.
//!
//! This binary sets up, inspects and unlocks the dit client's config record.

use clap::{Parser, Subcommand};
use ditconfig::crypto::secp256k1::{parse_secret_key, Secp256k1Provider};
use ditconfig::error::{DitConfigError, Result};
use ditconfig::storage::provider::{AccountSetup, PasswordPrompt, PasswordPurpose};
use ditconfig::storage::store::{
    default_config_path, read_confirmed_password, ConfigStore, CreateOptions, KdfChoice,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "ditconfig")]
#[command(about = "Password-protected account and config store for the dit client", long_about = None)]
struct Cli {
    /// Config file path (default: ~/.ditconfig)
    #[arg(long, global = true, env = "DITCONFIG_PATH")]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new config record
    Setup {
        /// Use the shared demo account instead of a real keypair
        #[arg(long, conflicts_with = "import")]
        demo: bool,

        /// Import an existing hex private key instead of sampling a new one
        #[arg(long)]
        import: bool,

        /// Derive the encryption key with salted Argon2id
        #[arg(long)]
        argon2: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the account and network settings
    Show,

    /// Decrypt and print the private key
    ExportKey,
}

/// Hidden terminal prompt.
struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn read_password(&mut self, purpose: PasswordPurpose) -> Result<Zeroizing<Vec<u8>>> {
        let message = match purpose {
            PasswordPurpose::New => "Please provide a password to encrypt your private key: ",
            PasswordPurpose::Confirm => "Please repeat your password: ",
            PasswordPurpose::Unlock => "Please provide your password to unlock your account: ",
        };
        let password = Zeroizing::new(rpassword::prompt_password(message)?);
        Ok(Zeroizing::new(password.as_bytes().to_vec()))
    }
}

/// Hands out a password that was already confirmed on the terminal.
struct ConfirmedPassword(Zeroizing<Vec<u8>>);

impl PasswordPrompt for ConfirmedPassword {
    fn read_password(&mut self, _purpose: PasswordPurpose) -> Result<Zeroizing<Vec<u8>>> {
        Ok(self.0.clone())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    match cli.command {
        Commands::Setup {
            demo,
            import,
            argon2,
            force,
        } => handle_setup(path, demo, import, argon2, force),
        Commands::Show => handle_show(path),
        Commands::ExportKey => handle_export_key(path),
    }
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_setup(path: PathBuf, demo: bool, import: bool, argon2: bool, force: bool) -> Result<()> {
    if ConfigStore::exists(&path) && !force {
        return Err(DitConfigError::ValidationError(format!(
            "Config file already exists at {} - use --force to overwrite it",
            path.display()
        )));
    }

    println!("Initializing the dit client...");

    let setup = if demo {
        println!("Pre-funded demo account was chosen due to demo mode being active");
        AccountSetup::Demo
    } else if import {
        let key = rpassword::prompt_password("Please provide a hex-formatted private key: ")?;
        import_setup(Zeroizing::new(key))?
    } else {
        println!("Hint: to try out dit without a real account, use 'setup --demo'");
        AccountSetup::Generate
    };

    let password = loop {
        match read_confirmed_password(&mut TerminalPrompt) {
            Ok(password) => break password,
            Err(DitConfigError::ValidationError(msg)) => eprintln!("{} - try again!", msg),
            Err(e) => return Err(e),
        }
    };

    let options = CreateOptions {
        kdf: if argon2 {
            KdfChoice::Argon2id
        } else {
            KdfChoice::Sha256
        },
    };

    let store = ConfigStore::create(
        path,
        setup,
        &Secp256k1Provider,
        &mut ConfirmedPassword(password),
        &options,
    )?;

    println!("Initialization successful");
    println!("Your address is: {}", store.record().address());
    println!("Config written to: {}", store.path().display());

    Ok(())
}

/// Reject a malformed key before any password is asked for.
fn import_setup(private_key_hex: Zeroizing<String>) -> Result<AccountSetup> {
    parse_secret_key(&private_key_hex)?;
    Ok(AccountSetup::Import(private_key_hex))
}

fn handle_show(path: PathBuf) -> Result<()> {
    let store = ConfigStore::load(path)?;
    let record = store.record();

    println!("{:<14} {}", "Address:", record.address());
    println!("{:<14} {}", "Currency:", record.currency);
    println!("{:<14} {}", "Demo mode:", record.demo_mode);
    println!("{:<14} {}", "Coordinator:", record.coordinator);
    println!("{:<14} {}", "KNW voting:", record.knw_voting);
    println!("{:<14} {}", "KNW token:", record.knw_token);
    println!("{:<14} {}", "Dit token:", record.dit_token);
    println!("{:<14} {}", "Repositories:", record.repositories.len());

    for repo in &record.repositories {
        println!(
            "  {} ({}) - {} label(s), {} pending vote(s)",
            repo.name,
            repo.provider,
            repo.knowledge_labels.len(),
            repo.pending_votes().count()
        );
    }

    Ok(())
}

fn handle_export_key(path: PathBuf) -> Result<()> {
    let store = ConfigStore::load(path)?;
    let private_key = store.unlock_with_prompt(&mut TerminalPrompt)?;

    let private_key = Zeroizing::new(String::from_utf8_lossy(&private_key).into_owned());
    println!("{}", private_key.as_str());

    Ok(())
}
