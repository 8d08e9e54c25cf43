use clap::{Args, Parser, Subcommand};
use pushrelay::adapters::fcm::DEFAULT_FCM_URL;
use pushrelay::adapters::firestore::DEFAULT_FIRESTORE_URL;
use pushrelay::adapters::stripe::DEFAULT_STRIPE_URL;
use pushrelay::auth::AuthState;
use pushrelay::config::{
    AppConfig, AuthConfig, DEFAULT_LISTEN, FileConfig, GoogleConfig, PaymentsConfig, PushBackend,
    StoreBackend, StoreKind,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use time::Duration;

const DEFAULT_WEB_BASE_URL: &str = "http://localhost:5173";

#[allow(clippy::large_enum_variant)]
pub(crate) enum RunOutcome {
    Serve(AppConfig),
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();

    let file = match cli.config.as_deref() {
        Some(path) => match FileConfig::load(path) {
            Ok(file) => file,
            Err(err) => {
                eprintln!("error: {err}");
                return RunOutcome::Exit(2);
            }
        },
        None => FileConfig::default(),
    };

    match &cli.command {
        Some(Command::AuthKey) => return RunOutcome::Exit(run_auth_key()),
        Some(Command::Token(args)) => return RunOutcome::Exit(run_token(&cli, &file, args)),
        None => {}
    }

    match resolve_app_config(&cli, file) {
        Ok(config) => RunOutcome::Serve(config),
        Err(err) => {
            eprintln!("error: {err}");
            RunOutcome::Exit(2)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pushrelay",
    version,
    about = "Push notifications for chat messages and event applications"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// TOML file with defaults for every option below.
    #[arg(long, env = "PUSHRELAY_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "PUSHRELAY_LISTEN")]
    listen: Option<SocketAddr>,
    #[arg(long, env = "PUSHRELAY_WEB_BASE_URL")]
    web_base_url: Option<String>,
    #[arg(long, value_enum, env = "PUSHRELAY_STORE")]
    store: Option<StoreKind>,
    /// JSON documents for the in-memory store.
    #[arg(long, env = "PUSHRELAY_SEED")]
    seed: Option<PathBuf>,
    #[arg(long, value_enum, env = "PUSHRELAY_PUSH")]
    push: Option<PushBackend>,
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    project_id: Option<String>,
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    service_account: Option<PathBuf>,
    #[arg(long, env = "PUSHRELAY_GOOGLE_ACCESS_TOKEN")]
    google_access_token: Option<String>,
    #[arg(long, env = "PUSHRELAY_FIRESTORE_URL")]
    firestore_url: Option<String>,
    #[arg(long, env = "PUSHRELAY_FCM_URL")]
    fcm_url: Option<String>,
    #[arg(long, env = "PUSHRELAY_STRIPE_SECRET_KEY")]
    stripe_secret_key: Option<String>,
    #[arg(long, env = "PUSHRELAY_STRIPE_URL")]
    stripe_url: Option<String>,
    #[arg(long, env = "PUSHRELAY_AUTH_KEY")]
    auth_key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a new random key for signing trigger tokens.
    AuthKey,
    /// Issue a bearer token for a trigger caller.
    Token(TokenArgs),
}

#[derive(Args, Debug)]
struct TokenArgs {
    #[arg(long)]
    subject: String,
    #[arg(long, default_value = "30d")]
    ttl: String,
}

fn run_auth_key() -> i32 {
    let secret = match pushrelay::generate_auth_key() {
        Ok(secret) => secret,
        Err(err) => {
            eprintln!("failed to generate auth key: {err}");
            return 1;
        }
    };
    println!("{secret}");
    0
}

fn run_token(cli: &Cli, file: &FileConfig, args: &TokenArgs) -> i32 {
    let Some(key) = cli.auth_key.as_deref().or(file.auth.key.as_deref()) else {
        eprintln!("error: --auth-key is required to issue tokens");
        return 2;
    };
    let ttl = match parse_ttl(&args.ttl) {
        Ok(ttl) => ttl,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };
    let token = AuthState::from_key(key).and_then(|auth| auth.issue_token(&args.subject, ttl));
    match token {
        Ok(token) => {
            println!("{token}");
            0
        }
        Err(err) => {
            eprintln!("failed to issue token: {err}");
            1
        }
    }
}

fn resolve_app_config(cli: &Cli, file: FileConfig) -> Result<AppConfig, String> {
    let listen = match cli.listen.or(file.listen) {
        Some(listen) => listen,
        None => DEFAULT_LISTEN
            .parse()
            .map_err(|err| format!("invalid default listen address: {err}"))?,
    };
    let web_base_url = cli
        .web_base_url
        .clone()
        .or(file.web_base_url)
        .unwrap_or_else(|| DEFAULT_WEB_BASE_URL.to_string());
    let web_base_url = web_base_url.trim().trim_end_matches('/').to_string();
    if !web_base_url.starts_with("http://") && !web_base_url.starts_with("https://") {
        return Err(format!("web base url must be http(s): '{web_base_url}'"));
    }

    let store = match cli.store.or(file.store).unwrap_or(StoreKind::Firestore) {
        StoreKind::Firestore => StoreBackend::Firestore,
        StoreKind::Memory => StoreBackend::Memory {
            seed: cli.seed.clone().or(file.seed),
        },
    };
    let push = cli.push.or(file.push).unwrap_or(PushBackend::Fcm);

    let project_id = cli.project_id.clone().or(file.google.project_id);
    let service_account = cli.service_account.clone().or(file.google.service_account);
    let access_token = cli
        .google_access_token
        .clone()
        .or(file.google.access_token);
    let google = if project_id.is_some() || service_account.is_some() || access_token.is_some() {
        Some(GoogleConfig {
            project_id,
            service_account,
            access_token,
            firestore_url: cli
                .firestore_url
                .clone()
                .or(file.google.firestore_url)
                .unwrap_or_else(|| DEFAULT_FIRESTORE_URL.to_string()),
            fcm_url: cli
                .fcm_url
                .clone()
                .or(file.google.fcm_url)
                .unwrap_or_else(|| DEFAULT_FCM_URL.to_string()),
        })
    } else {
        None
    };

    let payments = match non_empty(cli.stripe_secret_key.clone().or(file.stripe.secret_key)) {
        Some(stripe_secret_key) => Some(PaymentsConfig {
            stripe_secret_key,
            stripe_url: cli
                .stripe_url
                .clone()
                .or(file.stripe.url)
                .unwrap_or_else(|| DEFAULT_STRIPE_URL.to_string()),
        }),
        None => None,
    };

    let auth = match cli.auth_key.clone().or(file.auth.key) {
        Some(key) if key.trim().is_empty() => return Err("auth key cannot be empty".to_string()),
        Some(key) => Some(AuthConfig {
            key: key.trim().to_string(),
        }),
        None => None,
    };

    Ok(AppConfig {
        listen,
        web_base_url,
        store,
        push,
        google,
        payments,
        auth,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_ttl(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("token ttl cannot be empty".to_string());
    }

    let (amount, unit) = match value.chars().last() {
        Some(ch) if ch.is_ascii_alphabetic() => {
            (&value[..value.len() - 1], ch.to_ascii_lowercase())
        }
        _ => (value, 's'),
    };

    let amount: i64 = amount
        .parse()
        .map_err(|_| format!("invalid token ttl '{value}'; expected <number>[s|m|h|d]"))?;

    if amount <= 0 {
        return Err("token ttl must be greater than 0".to_string());
    }

    match unit {
        's' => Ok(Duration::seconds(amount)),
        'm' => Ok(Duration::minutes(amount)),
        'h' => Ok(Duration::hours(amount)),
        'd' => Ok(Duration::days(amount)),
        _ => Err(format!(
            "invalid token ttl '{value}'; expected <number>[s|m|h|d]"
        )),
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            command: None,
            config: None,
            listen: None,
            web_base_url: None,
            store: None,
            seed: None,
            push: None,
            project_id: None,
            service_account: None,
            google_access_token: None,
            firestore_url: None,
            fcm_url: None,
            stripe_secret_key: None,
            stripe_url: None,
            auth_key: None,
        }
    }

    #[test]
    fn parse_ttl__should_parse_seconds_when_unit_missing() {
        // When
        let duration = parse_ttl("30").expect("parse ttl");

        // Then
        assert_eq!(duration, Duration::seconds(30));
    }

    #[test]
    fn parse_ttl__should_parse_units() {
        assert_eq!(parse_ttl("15m").expect("parse ttl"), Duration::minutes(15));
        assert_eq!(parse_ttl("30D").expect("parse ttl"), Duration::days(30));
    }

    #[test]
    fn parse_ttl__should_reject_invalid_values() {
        assert!(parse_ttl("").is_err());
        assert!(parse_ttl("0").is_err());
        assert!(parse_ttl("abc").is_err());
        assert!(parse_ttl("5w").is_err());
    }

    #[test]
    fn resolve_app_config__should_apply_defaults() {
        // When
        let config = resolve_app_config(&base_cli(), FileConfig::default()).expect("config");

        // Then
        assert_eq!(config.listen, DEFAULT_LISTEN.parse().expect("addr"));
        assert_eq!(config.web_base_url, DEFAULT_WEB_BASE_URL);
        assert_eq!(config.store, StoreBackend::Firestore);
        assert_eq!(config.push, PushBackend::Fcm);
        assert!(config.google.is_none());
        assert!(config.payments.is_none());
        assert!(config.auth.is_none());
    }

    #[test]
    fn resolve_app_config__should_prefer_cli_over_file() {
        // Given
        let mut cli = base_cli();
        cli.project_id = Some("from-cli".to_string());
        cli.web_base_url = Some("https://app.example/".to_string());
        let file = FileConfig::parse(
            r#"
            store = "memory"
            seed = "seed.json"
            push = "dry-run"

            [google]
            project_id = "from-file"
            access_token = "owner"
            firestore_url = "http://localhost:8080/v1"
            "#,
        )
        .expect("parse file");

        // When
        let config = resolve_app_config(&cli, file).expect("config");

        // Then
        assert_eq!(config.web_base_url, "https://app.example");
        assert_eq!(
            config.store,
            StoreBackend::Memory {
                seed: Some(PathBuf::from("seed.json"))
            }
        );
        assert_eq!(config.push, PushBackend::DryRun);
        let google = config.google.expect("google");
        assert_eq!(google.project_id.as_deref(), Some("from-cli"));
        assert_eq!(google.access_token.as_deref(), Some("owner"));
        assert_eq!(google.firestore_url, "http://localhost:8080/v1");
        assert_eq!(google.fcm_url, DEFAULT_FCM_URL);
    }

    #[test]
    fn resolve_app_config__should_enable_payments_with_secret_key() {
        let mut cli = base_cli();
        cli.stripe_secret_key = Some("sk_test_123".to_string());

        let config = resolve_app_config(&cli, FileConfig::default()).expect("config");

        let payments = config.payments.expect("payments");
        assert_eq!(payments.stripe_secret_key, "sk_test_123");
        assert_eq!(payments.stripe_url, DEFAULT_STRIPE_URL);
    }

    #[test]
    fn resolve_app_config__should_reject_blank_auth_key_and_bad_base_url() {
        let mut blank_key = base_cli();
        blank_key.auth_key = Some("  ".to_string());
        let mut bad_url = base_cli();
        bad_url.web_base_url = Some("app.example".to_string());

        assert!(resolve_app_config(&blank_key, FileConfig::default()).is_err());
        assert!(resolve_app_config(&bad_url, FileConfig::default()).is_err());
    }
}
