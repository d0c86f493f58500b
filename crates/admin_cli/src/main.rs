use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Amount, CategoryNode, Engine, EngineError, ForceUnlockCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "pettycash_admin")]
#[command(about = "Admin utilities for the petty-cash reconciliation service")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./pettycash.db?mode=rwc"
    )]
    database_url: String,

    /// Configured admin code (also read from `PETTYCASH_ADMIN_CODE`).
    /// Without one, force unlock is refused.
    #[arg(long, env = "PETTYCASH_ADMIN_CODE", hide_env_values = true)]
    admin_code: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the lock state and wallet balance.
    Status,
    /// Discard the open transaction and release the system lock.
    ForceUnlock(ForceUnlockArgs),
    /// Overwrite the wallet balance with the real M-Pesa balance.
    Sync(SyncArgs),
    /// Print the category tree.
    Categories,
    /// Print locked wallet movements, newest first.
    History(HistoryArgs),
}

#[derive(Args, Debug)]
struct ForceUnlockArgs {
    #[arg(long)]
    reason: String,
    /// Code to verify; prompted for when omitted.
    #[arg(long)]
    code: Option<String>,
}

#[derive(Args, Debug)]
struct SyncArgs {
    /// New balance, e.g. `1500.50`.
    #[arg(long)]
    balance: Amount,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    #[arg(long, default_value_t = 20)]
    limit: u64,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_secret(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn print_tree(nodes: &[CategoryNode]) {
    for node in nodes {
        let marker = if node.category.is_system { " (system)" } else { "" };
        println!("{:>3}  {}{marker}", node.category.id, node.category.name);
        for child in &node.children {
            println!("{:>3}    {}", child.id, child.name);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::Status => {
            let engine = Engine::builder().database(db).build().await?;
            let status = engine.status().await?;
            println!("wallet balance: {}", status.wallet.current_balance);
            println!("last updated:   {}", status.wallet.last_updated);
            match status.open_transaction {
                Some(open) => {
                    println!(
                        "LOCKED by transaction {} ({}), {} remaining",
                        open.transaction.id,
                        open.transaction.external_reference,
                        open.balance.remaining
                    );
                }
                None => println!("unlocked"),
            }
        }
        Command::ForceUnlock(args) => {
            let engine = Engine::builder()
                .database(db)
                .admin_code(cli.admin_code)
                .build()
                .await?;
            let code = match args.code {
                Some(code) => code,
                None => prompt_secret("Admin code: ")?,
            };

            match engine
                .force_unlock(ForceUnlockCmd::new(args.reason, code))
                .await
            {
                Ok(audit) => println!(
                    "unlocked: transaction {} ({}) discarded",
                    audit.transaction_id, audit.external_reference
                ),
                Err(EngineError::NothingToUnlock) => {
                    eprintln!("nothing to unlock");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Sync(args) => {
            let engine = Engine::builder().database(db).build().await?;
            let receipt = engine.manual_sync(args.balance).await?;
            println!(
                "wallet synced: {} -> {} ({})",
                receipt.previous_balance, receipt.new_balance, receipt.external_reference
            );
        }
        Command::Categories => {
            let engine = Engine::builder().database(db).build().await?;
            print_tree(&engine.list_categories().await?);
        }
        Command::History(args) => {
            let engine = Engine::builder().database(db).build().await?;
            for entry in engine.wallet_history(args.limit).await? {
                println!(
                    "{}  {:<8} {:<24} {:>14} -> {}",
                    entry.locked_at.unwrap_or(entry.occurred_at).format("%Y-%m-%d %H:%M"),
                    entry.source.as_str(),
                    entry.external_reference,
                    entry.delta,
                    entry.new_balance
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sync_parses_decimal_balance() {
        let cli = Cli::try_parse_from([
            "pettycash_admin",
            "--database-url",
            "sqlite::memory:",
            "sync",
            "--balance",
            "1500.50",
        ])
        .unwrap();
        match cli.command {
            Command::Sync(args) => assert_eq!(args.balance, Amount::from_minor(150_050)),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
