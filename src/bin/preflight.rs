use contacts_api::infra::config::{self, DatabaseSettings};
use contacts_api::{ContactRepository, PgContactRepository};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--apply-schema]\n\
         \n\
         Reads env vars (all optional, see .env):\n\
           DATABASE_URL, DB_MAX_CONNECTIONS, DB_CONN_MAX_LIFETIME_SECS, DB_ACQUIRE_TIMEOUT_SECS\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let apply_schema = args.iter().any(|a| a == "--apply-schema");

    let settings = DatabaseSettings::from_env();
    let using_default = std::env::var("DATABASE_URL").is_err();

    println!("> Preflight:");
    println!(
        "  DATABASE_URL={}{}",
        redact(&settings.url),
        if using_default { " (local-development default)" } else { "" }
    );
    println!("  DB_MAX_CONNECTIONS={}", settings.max_connections);
    println!("  BIND_ADDR={}", config::bind_addr());

    let repository = PgContactRepository::connect(&settings)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect: {}", e))?;
    repository.ping().await?;
    println!("  Database reachable: yes");

    if apply_schema {
        repository.ensure_schema().await?;
        println!("  Schema applied.");
    }

    if repository.schema_exists().await? {
        let rows = repository.count().await?;
        println!("  contacts table: present ({} rows)", rows);
    } else {
        println!("  contacts table: missing (run with --apply-schema, or start api_server)");
    }

    repository.close().await;
    println!("> Preflight OK");
    Ok(())
}

/// Hides the password component of a connection URL.
fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((creds, host)) => {
            let user = creds.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}
