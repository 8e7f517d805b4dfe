use std::io::{self, BufRead as _, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dtoken::keys::load_verifying_key;
use dtoken::{TokenError, TokenValidator, Verifier};

#[derive(Parser)]
#[command(name = "dtoken-verify", about = "Verify a signed identity token")]
struct Cli {
    /// Token string. If omitted, prompts for it on stdin.
    token: Option<String>,

    /// PEM public key to trust instead of the built-in issuer key.
    #[arg(long, env = "DTOKEN_TRUSTED_KEY")]
    trusted_key: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(exit_code(e.as_ref()))
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let input = match cli.token {
        Some(s) => s,
        None => prompt_for_token()?,
    };
    let token = input.trim();
    tracing::info!("verifying token {token:?}");

    let verifier = match cli.trusted_key {
        Some(path) => Verifier::new(load_verifying_key(&path)?),
        None => Verifier::trusted()?,
    };
    let claims = TokenValidator::new(verifier).validate(token)?;

    println!("{}", serde_json::to_string(&claims)?);
    Ok(())
}

fn prompt_for_token() -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "Please enter token:\n> ")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Process exit code for a failed verification. Anything that is not one of
/// the named validation failures counts as a malformed token, including a
/// field of the wrong type or an unparseable expiration.
fn exit_code(err: &(dyn std::error::Error + 'static)) -> u8 {
    match err.downcast_ref::<TokenError>() {
        Some(TokenError::Payload(_)) => 4,
        Some(TokenError::Signature) => 5,
        Some(TokenError::MissingField(_) | TokenError::Expired { .. }) => 6,
        Some(TokenError::SampleToken) => 7,
        Some(
            TokenError::Format(_)
            | TokenError::InvalidField { .. }
            | TokenError::KeyStorage { .. }
            | TokenError::SigningFailed(_),
        )
        | None => 3,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}
