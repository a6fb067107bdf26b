//! pyre — hint, burn and query a ranked burn ledger kept in a data directory.

mod config;
mod ids;
mod local;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pyre_registry::{load_events_from_store, ItemHints};
use pyre_types::{AccountId, CreditId, Hint, ItemId};
use pyre_utils::LogFormat;
use serde_json::json;

use crate::config::CliConfig;
use crate::ids::{hint_arg, id_arg};
use crate::local::Session;

#[derive(Parser)]
#[command(name = "pyre", about = "Ranked burn ledger tool")]
struct Cli {
    /// Data directory for the snapshot and event log.
    /// Defaults to the config file's value, then "./pyre_data".
    #[arg(long, env = "PYRE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PYRE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output: "human" or "json".
    #[arg(long, env = "PYRE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "PYRE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the hint to submit for a token burn.
    HintToken {
        #[arg(long, value_parser = id_arg::<AccountId>)]
        account: AccountId,
        #[arg(long, value_parser = id_arg::<CreditId>)]
        credit: CreditId,
        #[arg(long)]
        amount: u128,
    },

    /// Print the token and item hints to submit for an item burn.
    HintItem {
        #[arg(long, value_parser = id_arg::<AccountId>)]
        account: AccountId,
        #[arg(long, value_parser = id_arg::<ItemId>)]
        item: ItemId,
        #[arg(long)]
        amount: u128,
    },

    /// Burn credit directly. Omitted hint accounts default to the sentinel.
    BurnToken {
        #[arg(long, value_parser = id_arg::<AccountId>)]
        account: AccountId,
        #[arg(long, value_parser = id_arg::<CreditId>)]
        credit: CreditId,
        #[arg(long)]
        amount: u128,
        #[arg(long, value_parser = hint_arg, conflicts_with = "auto_hint")]
        prev: Option<AccountId>,
        #[arg(long, value_parser = hint_arg, conflicts_with = "auto_hint")]
        old_prev: Option<AccountId>,
        /// Compute the hint from the current ledger instead.
        #[arg(long)]
        auto_hint: bool,
    },

    /// Burn credit for an item. Omitted hint accounts default to the sentinel.
    BurnItem {
        #[arg(long, value_parser = id_arg::<AccountId>)]
        account: AccountId,
        #[arg(long, value_parser = id_arg::<ItemId>)]
        item: ItemId,
        #[arg(long)]
        amount: u128,
        #[arg(long, value_parser = hint_arg, conflicts_with = "auto_hint")]
        token_prev: Option<AccountId>,
        #[arg(long, value_parser = hint_arg, conflicts_with = "auto_hint")]
        token_old_prev: Option<AccountId>,
        #[arg(long, value_parser = hint_arg, conflicts_with = "auto_hint")]
        item_prev: Option<AccountId>,
        #[arg(long, value_parser = hint_arg, conflicts_with = "auto_hint")]
        item_old_prev: Option<AccountId>,
        #[arg(long)]
        auto_hint: bool,
    },

    /// List a credit type's burners, largest first.
    TopToken {
        #[arg(long, value_parser = id_arg::<CreditId>)]
        credit: CreditId,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// List an item's burners, largest first.
    TopItem {
        #[arg(long, value_parser = id_arg::<ItemId>)]
        item: ItemId,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the credit types and items an account has burned for.
    /// A limit of 0 lists everything from the offset on.
    Account {
        #[arg(long, value_parser = id_arg::<AccountId>)]
        account: AccountId,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },

    /// Print the total burned for an item.
    ItemTotal {
        #[arg(long, value_parser = id_arg::<ItemId>)]
        item: ItemId,
    },

    /// Print an account's local bank balance.
    Balance {
        #[arg(long, value_parser = id_arg::<AccountId>)]
        account: AccountId,
        #[arg(long, value_parser = id_arg::<CreditId>)]
        credit: CreditId,
    },

    /// Replay recorded events from a sequence number on.
    Events {
        #[arg(long, default_value_t = 1)]
        from: u64,
    },

    /// Check the snapshot and event log for consistency.
    Verify,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    pyre_utils::init_tracing(&config.log_level, config.log_format);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    run(cli.command, &config)
}

fn run(command: Command, config: &CliConfig) -> anyhow::Result<()> {
    let mut session = Session::open(&config.data_dir, config)?;

    match command {
        Command::HintToken {
            account,
            credit,
            amount,
        } => {
            let hint = session
                .registry()
                .compute_token_hint(&account, &credit, amount)?;
            output::print(&output::hint(&hint))
        }

        Command::HintItem {
            account,
            item,
            amount,
        } => {
            let hints = session
                .registry()
                .compute_item_hints(&account, &item, amount)?;
            output::print(&output::item_hints(&hints))
        }

        Command::BurnToken {
            account,
            credit,
            amount,
            prev,
            old_prev,
            auto_hint,
        } => {
            let hint = if auto_hint {
                session
                    .registry()
                    .compute_token_hint(&account, &credit, amount)?
            } else {
                explicit_hint(prev, old_prev)
            };
            let event = session
                .registry_mut()
                .burn_token(&account, &credit, amount, &hint)
                .context("token burn failed")?;
            session.commit()?;
            output::print(&output::event(&event))
        }

        Command::BurnItem {
            account,
            item,
            amount,
            token_prev,
            token_old_prev,
            item_prev,
            item_old_prev,
            auto_hint,
        } => {
            let hints = if auto_hint {
                session
                    .registry()
                    .compute_item_hints(&account, &item, amount)?
            } else {
                ItemHints {
                    token: explicit_hint(token_prev, token_old_prev),
                    item: explicit_hint(item_prev, item_old_prev),
                }
            };
            let event = session
                .registry_mut()
                .burn_item(&account, &item, amount, &hints)
                .context("item burn failed")?;
            session.commit()?;
            output::print(&output::event(&event))
        }

        Command::TopToken {
            credit,
            offset,
            limit,
        } => {
            let page = session.registry().credit_burners(&credit, offset, limit);
            output::print(&output::burners(&page, offset))
        }

        Command::TopItem {
            item,
            offset,
            limit,
        } => {
            let page = session.registry().item_burners(&item, offset, limit);
            output::print(&output::burners(&page, offset))
        }

        Command::Account {
            account,
            offset,
            limit,
        } => {
            let registry = session.registry();
            let credits: Vec<_> = registry
                .account_credits(&account, offset, limit)
                .into_iter()
                .map(|credit| {
                    json!({
                        "credit": credit.to_string(),
                        "burned": registry.account_credit_burned(&account, &credit).to_string(),
                    })
                })
                .collect();
            let items: Vec<_> = registry
                .account_items(&account, offset, limit)
                .into_iter()
                .map(|item| {
                    json!({
                        "item": item.to_string(),
                        "burned": registry.account_item_burned(&account, &item).to_string(),
                    })
                })
                .collect();
            output::print(&json!({
                "account": account.to_string(),
                "credits_count": registry.account_credits_count(&account),
                "items_count": registry.account_items_count(&account),
                "credits": credits,
                "items": items,
            }))
        }

        Command::ItemTotal { item } => output::print(&json!({
            "item": item.to_string(),
            "total": session.registry().item_total(&item).to_string(),
        })),

        Command::Balance { account, credit } => output::print(&json!({
            "account": account.to_string(),
            "credit": credit.to_string(),
            "balance": session.registry().transfer().balance(&credit, &account).to_string(),
        })),

        Command::Events { from } => {
            for event in load_events_from_store(session.store(), from)? {
                output::print(&output::event(&event))?;
            }
            Ok(())
        }

        Command::Verify => {
            // Opening the session already integrity-checked the snapshot.
            let registry = session.registry();
            let last_seq = registry.state().last_seq;
            let events = load_events_from_store(session.store(), 1)?;
            for (expected, event) in (1..).zip(&events) {
                anyhow::ensure!(
                    event.seq == expected,
                    "event log gap: expected seq {}, found {}",
                    expected,
                    event.seq
                );
            }
            anyhow::ensure!(
                events.len() as u64 == last_seq,
                "event log holds {} events but the snapshot is at seq {}",
                events.len(),
                last_seq
            );
            tracing::info!(last_seq, "data directory verified");
            output::print(&json!({
                "ok": true,
                "last_seq": last_seq,
                "credits": registry.state().credits.scope_count(),
                "items": registry.state().items.scope_count(),
            }))
        }
    }
}

fn explicit_hint(prev: Option<AccountId>, old_prev: Option<AccountId>) -> Hint {
    Hint::new(
        prev.unwrap_or(AccountId::ZERO),
        old_prev.unwrap_or(AccountId::ZERO),
    )
}
