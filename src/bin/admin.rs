use std::collections::VecDeque;

use chrono::Duration;
use sqlx::postgres::PgPoolOptions;

use careconnect::auth::JwtIdentityProvider;
use careconnect::domain::{Role, SubjectId};
use careconnect::infra::{PgProfileStore, ProfileStore};

fn print_help() {
    eprintln!(
        "\
careconnect-admin

USAGE:
  careconnect-admin <command> [options]

COMMANDS:
  migrate          Run database migrations
  issue-token      Issue a signed identity token (local/dev)
  set-role         Assign a role to a profile
  list-profiles    List all profiles

COMMON OPTIONS:
  --database-url <postgres_url>   (defaults to env DATABASE_URL)

issue-token OPTIONS:
  --subject <id>                  (required) Subject id for the token
  --email <email>                 (optional) Email claim
  --ttl-hours <n>                 (default: 1)

set-role OPTIONS:
  --subject <id>                  (required) Subject id of the profile
  --role <admin|staff|client>     (required)

ENV:
  AUTH_TOKEN_SECRET               HMAC secret (required for issue-token)
  AUTH_TOKEN_ISSUER / AUTH_TOKEN_AUDIENCE
"
    );
}

fn require_database_url(database_url: Option<String>) -> anyhow::Result<String> {
    database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required (or pass --database-url)"))
}

async fn connect(database_url: Option<String>) -> anyhow::Result<sqlx::PgPool> {
    let database_url = require_database_url(database_url)?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args: VecDeque<String> = std::env::args().skip(1).collect();
    let Some(command) = args.pop_front() else {
        print_help();
        return Ok(());
    };

    if matches!(command.as_str(), "-h" | "--help" | "help") {
        print_help();
        return Ok(());
    }

    match command.as_str() {
        "migrate" => {
            let mut database_url: Option<String> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--database-url" => {
                        database_url =
                            Some(args.pop_front().ok_or_else(|| {
                                anyhow::anyhow!("missing value for --database-url")
                            })?);
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let pool = connect(database_url).await?;
            careconnect::migrations::run_postgres(&pool).await?;
            println!("ok: migrations applied");
            Ok(())
        }
        "issue-token" => {
            let mut subject: Option<String> = None;
            let mut email: Option<String> = None;
            let mut ttl_hours: i64 = 1;

            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--subject" => {
                        subject = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --subject"))?,
                        );
                    }
                    "--email" => {
                        email = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --email"))?,
                        );
                    }
                    "--ttl-hours" => {
                        let raw = args
                            .pop_front()
                            .ok_or_else(|| anyhow::anyhow!("missing value for --ttl-hours"))?;
                        ttl_hours = raw.parse()?;
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let subject =
                subject.ok_or_else(|| anyhow::anyhow!("--subject is required"))?;
            let secret = std::env::var("AUTH_TOKEN_SECRET")
                .map_err(|_| anyhow::anyhow!("AUTH_TOKEN_SECRET is required"))?;
            let issuer = std::env::var("AUTH_TOKEN_ISSUER")
                .unwrap_or_else(|_| "careconnect-identity".to_string());
            let audience = std::env::var("AUTH_TOKEN_AUDIENCE")
                .unwrap_or_else(|_| "careconnect-api".to_string());

            let provider = JwtIdentityProvider::new(secret.as_bytes(), &issuer, &audience);
            let token = provider.issue(
                &SubjectId::new(subject),
                email.as_deref(),
                Duration::hours(ttl_hours),
            )?;
            println!("{token}");
            Ok(())
        }
        "set-role" => {
            let mut database_url: Option<String> = None;
            let mut subject: Option<String> = None;
            let mut role: Option<String> = None;

            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--database-url" => {
                        database_url =
                            Some(args.pop_front().ok_or_else(|| {
                                anyhow::anyhow!("missing value for --database-url")
                            })?);
                    }
                    "--subject" => {
                        subject = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --subject"))?,
                        );
                    }
                    "--role" => {
                        role = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --role"))?,
                        );
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let subject =
                subject.ok_or_else(|| anyhow::anyhow!("--subject is required"))?;
            let role = role.ok_or_else(|| anyhow::anyhow!("--role is required"))?;
            let role = match Role::parse(&role) {
                Role::Unknown(_) => anyhow::bail!("unknown role: {role}"),
                role => role,
            };

            let pool = connect(database_url).await?;
            let store = PgProfileStore::new(pool);

            let subject = SubjectId::new(subject);
            let mut matches = store.find_by_subject(&subject).await?;
            let mut profile = match matches.len() {
                0 => anyhow::bail!("no profile for subject {subject}"),
                1 => matches.remove(0),
                n => anyhow::bail!("{n} profiles for subject {subject}; fix the data first"),
            };

            profile.role = role;
            profile.touch();
            store.update(&profile).await?;
            println!("ok: {subject} is now {role}", role = profile.role);
            Ok(())
        }
        "list-profiles" => {
            let mut database_url: Option<String> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--database-url" => {
                        database_url =
                            Some(args.pop_front().ok_or_else(|| {
                                anyhow::anyhow!("missing value for --database-url")
                            })?);
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let pool = connect(database_url).await?;
            let store = PgProfileStore::new(pool);

            for profile in store.list().await? {
                println!(
                    "{}\t{}\t{}\tcompleted={}",
                    profile.subject_id, profile.email, profile.role, profile.completed
                );
            }
            Ok(())
        }
        other => {
            eprintln!("unknown command: {other}\n");
            print_help();
            std::process::exit(2);
        }
    }
}
