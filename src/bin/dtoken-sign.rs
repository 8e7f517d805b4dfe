//! Token minting and inspection.
//!
//! Signs with the local key (created on first use). Tokens minted here only
//! pass `dtoken-verify` when the local key is the trusted issuer key, or when
//! the verifier is pointed at the local public key with `--trusted-key`.

use std::io::{self, Read as _};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dtoken::codec;
use dtoken::sign::mint;
use dtoken::types::{DEFAULT_PRIVATE_KEY_PATH, DEFAULT_PUBLIC_KEY_PATH};
use dtoken::validate::{parse_expiration, uid_unverified};
use dtoken::{KeyProvider, Verifier};

#[derive(Parser)]
#[command(name = "dtoken-sign", about = "Mint and inspect signed identity tokens")]
struct Cli {
    /// Private key file; created together with the public key if absent.
    #[arg(long, env = "DTOKEN_PRIVATE_KEY", default_value = DEFAULT_PRIVATE_KEY_PATH, global = true)]
    private_key: PathBuf,

    /// Public key file written alongside a newly created private key.
    #[arg(long, env = "DTOKEN_PUBLIC_KEY", default_value = DEFAULT_PUBLIC_KEY_PATH, global = true)]
    public_key: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign a token for a user id.
    Sign {
        /// Numeric user id. -1 produces a sample token that never validates.
        #[arg(long, allow_hyphen_values = true)]
        uid: i64,

        /// Validity from now (e.g. "30d", "12h").
        #[arg(short, long, conflicts_with = "expires", required_unless_present = "expires")]
        duration: Option<String>,

        /// Absolute expiration as an ISO-8601 date/time (UTC if no offset).
        #[arg(short, long)]
        expires: Option<String>,
    },

    /// Decode a token and show its contents without trusting them.
    /// Reads the token from --token or stdin.
    Inspect {
        /// Token string. If omitted, reads from stdin.
        #[arg(short, long)]
        token: Option<String>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let keys = KeyProvider::new(cli.private_key, cli.public_key);

    let result = match cli.command {
        Command::Sign {
            uid,
            duration,
            expires,
        } => cmd_sign(&keys, uid, duration.as_deref(), expires.as_deref()),
        Command::Inspect { token } => cmd_inspect(&keys, token),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn cmd_sign(
    keys: &KeyProvider,
    uid: i64,
    duration: Option<&str>,
    expires: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let expiration = match (duration, expires) {
        (_, Some(raw)) => {
            parse_expiration(raw).ok_or_else(|| format!("invalid expiration '{raw}'"))?
        }
        (Some(raw), None) => expiration_after(raw, Utc::now())?,
        (None, None) => return Err("either --duration or --expires is required".into()),
    };

    let token = mint(keys, uid, expiration)?;
    println!("{token}");
    Ok(())
}

fn cmd_inspect(
    keys: &KeyProvider,
    token_arg: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = match token_arg {
        Some(s) => s,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let input = input.trim();
    let token = codec::decode(input)?;

    let trusted = Verifier::trusted()?.verify(&token);
    let local = keys
        .local_verify_key()
        .ok()
        .map(|key| Verifier::new(key).verify(&token));

    let output = serde_json::json!({
        "payload": String::from_utf8_lossy(token.payload()),
        "signature_hex": hex::encode(token.signature()),
        "uid": uid_unverified(input).ok(),
        "signature_valid_trusted_key": trusted,
        "signature_valid_local_key": local,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn expiration_after(
    duration_str: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    let duration: std::time::Duration = duration_str
        .parse::<humantime::Duration>()
        .map_err(|e| format!("invalid duration '{duration_str}': {e}"))?
        .into();
    let duration = chrono::Duration::from_std(duration)?;
    now.checked_add_signed(duration)
        .ok_or_else(|| "duration overflow".into())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_expiration_after() {
        let now = parse_expiration("2024-01-01T00:00:00").unwrap();
        let exp = expiration_after("30d", now).unwrap();
        assert_eq!(exp, parse_expiration("2024-01-31T00:00:00").unwrap());
        assert!(expiration_after("soon", now).is_err());
    }

    #[test]
    fn test_sign_requires_expiration() {
        assert!(Cli::try_parse_from(["dtoken-sign", "sign", "--uid", "5"]).is_err());
        assert!(Cli::try_parse_from([
            "dtoken-sign", "sign", "--uid", "5", "-d", "1h", "-e", "2099-01-01"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["dtoken-sign", "sign", "--uid", "-1", "-d", "1h"]).is_ok());
    }

    #[test]
    fn test_inspect_token_flag_is_optional() {
        let cli = Cli::try_parse_from(["dtoken-sign", "inspect", "-t", "dt1-abc-def"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Inspect { token: Some(ref t) } if t == "dt1-abc-def"
        ));
        let cli = Cli::try_parse_from(["dtoken-sign", "inspect"]).unwrap();
        assert!(matches!(cli.command, Command::Inspect { token: None }));
        assert!(Cli::try_parse_from(["dtoken-sign", "inspect", "dt1-abc-def"]).is_err());
    }
}
