//! Token Ledger CLI Application
//!
//! A command-line interface for operating the ledger and serving its REST API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use token_ledger::api::{create_router, ApiState};
use token_ledger::cli::{self, AppState};
use token_ledger::ledger::SharedLedger;
use token_ledger::storage::{Storage, StorageConfig};

#[derive(Parser)]
#[command(name = "token-ledger")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A fungible-token ledger in Rust", long_about = None)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, default_value = ".ledger_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the token, giving the whole supply to the caller
    Init {
        /// Caller identity
        #[arg(short, long)]
        caller: String,

        /// Token name
        #[arg(short, long)]
        name: String,

        /// Ticker symbol
        #[arg(short, long)]
        ticker: String,

        /// Initial total supply
        #[arg(short, long)]
        supply: u64,
    },

    /// Transfer tokens from the caller
    Transfer {
        #[arg(short, long)]
        caller: String,

        /// Recipient address
        #[arg(short, long)]
        to: String,

        #[arg(short, long)]
        amount: u64,
    },

    /// Allow a spender to move the caller's tokens
    Approve {
        #[arg(short, long)]
        caller: String,

        /// Spender address
        #[arg(short, long)]
        spender: String,

        #[arg(short, long)]
        amount: u64,
    },

    /// Move tokens on behalf of an owner who approved the caller
    TransferFrom {
        #[arg(short, long)]
        caller: String,

        /// Owner address
        #[arg(short, long)]
        from: String,

        /// Recipient address
        #[arg(short, long)]
        to: String,

        #[arg(short, long)]
        amount: u64,
    },

    /// Mint new tokens (admin only)
    Mint {
        #[arg(short, long)]
        caller: String,

        #[arg(short, long)]
        to: String,

        #[arg(short, long)]
        amount: u64,
    },

    /// Burn tokens the owner approved to the caller (admin only)
    Burn {
        #[arg(short, long)]
        caller: String,

        #[arg(short, long)]
        from: String,

        #[arg(short, long)]
        amount: u64,
    },

    /// Show the balance of an address
    Balance {
        #[arg(short, long)]
        address: String,
    },

    /// Show an allowance
    Allowance {
        #[arg(short, long)]
        owner: String,

        #[arg(short, long)]
        spender: String,
    },

    /// Display token information
    Info,

    /// List all accounts
    Accounts,

    /// Show recent ledger events
    History {
        /// Number of events to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Admin management
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },

    /// Export the ledger to a file
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import the ledger from a file
    Import {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List saved backups
    Backups,

    /// Replace the ledger with a saved backup
    Restore {
        /// Backup index (0 is newest)
        #[arg(short, long)]
        index: usize,
    },

    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Grant admin rights (caller must be an admin)
    Add {
        #[arg(short, long)]
        caller: String,

        #[arg(short, long)]
        address: String,
    },

    /// Revoke admin rights (caller must be the creator)
    Remove {
        #[arg(short, long)]
        caller: String,

        #[arg(short, long)]
        address: String,
    },

    /// List admins
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => return run_server(port, &cli.data_dir),
        Commands::Restore { index } => return cli::cmd_restore(&cli.data_dir, index),
        _ => {}
    }

    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Serve { .. } | Commands::Restore { .. } => unreachable!(),

        Commands::Init {
            caller,
            name,
            ticker,
            supply,
        } => cli::cmd_init(&mut state, &caller, &name, &ticker, supply)?,

        Commands::Transfer { caller, to, amount } => {
            cli::cmd_transfer(&mut state, &caller, &to, amount)?
        }

        Commands::Approve {
            caller,
            spender,
            amount,
        } => cli::cmd_approve(&mut state, &caller, &spender, amount)?,

        Commands::TransferFrom {
            caller,
            from,
            to,
            amount,
        } => cli::cmd_transfer_from(&mut state, &caller, &from, &to, amount)?,

        Commands::Mint { caller, to, amount } => cli::cmd_mint(&mut state, &caller, &to, amount)?,

        Commands::Burn {
            caller,
            from,
            amount,
        } => cli::cmd_burn(&mut state, &caller, &from, amount)?,

        Commands::Balance { address } => cli::cmd_balance(&state, &address)?,

        Commands::Allowance { owner, spender } => cli::cmd_allowance(&state, &owner, &spender)?,

        Commands::Info => cli::cmd_info(&state)?,

        Commands::Accounts => cli::cmd_accounts(&state)?,

        Commands::History { count } => cli::cmd_history(&state, count)?,

        Commands::Admin { action } => match action {
            AdminCommands::Add { caller, address } => {
                cli::cmd_admin_add(&mut state, &caller, &address)?
            }
            AdminCommands::Remove { caller, address } => {
                cli::cmd_admin_remove(&mut state, &caller, &address)?
            }
            AdminCommands::List => cli::cmd_admin_list(&state)?,
        },

        Commands::Export { output } => cli::cmd_export(&state, &output)?,

        Commands::Import { input } => cli::cmd_import(&mut state, &input)?,

        Commands::Backups => cli::cmd_backups(&state)?,
    }

    Ok(())
}

fn run_server(port: u16, data_dir: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };
        let storage = Storage::new(storage_config)?;

        if storage.exists() {
            println!("📂 Loading existing ledger...");
        } else {
            println!("📂 Starting with an empty ledger...");
        }
        let ledger = SharedLedger::open(storage)?;

        let shutdown_ledger = ledger.clone();
        let app = create_router(ApiState { ledger });

        let addr = format!("0.0.0.0:{}", port);
        println!("🚀 REST API server starting on http://localhost:{}", port);
        println!();
        println!("📖 Available endpoints (caller identity in the x-caller header):");
        println!("   GET    /health                    - Health check");
        println!("   GET    /api/token                 - Token info");
        println!("   POST   /api/initialize            - Initialize token");
        println!("   GET    /api/balances/{{address}}    - Balance");
        println!("   GET    /api/allowance             - Allowance (owner, spender)");
        println!("   GET    /api/allowance/{{owner}}     - Allowance granted to caller");
        println!("   POST   /api/transfer              - Transfer");
        println!("   POST   /api/approve               - Approve spender");
        println!("   POST   /api/transfer-from         - Delegated transfer");
        println!("   POST   /api/mint                  - Mint (admin)");
        println!("   POST   /api/burn                  - Burn (admin)");
        println!("   GET    /api/admins                - List admins");
        println!("   POST   /api/admins                - Add admin");
        println!("   DELETE /api/admins/{{address}}      - Remove admin");
        println!("   GET    /api/accounts              - All accounts");
        println!("   GET    /api/history               - Recent events");
        println!();

        // Handle Ctrl+C with a final flush
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            println!("\n📴 Shutting down API server...");

            match shutdown_ledger.flush().await {
                Ok(()) => println!("✅ Ledger saved"),
                Err(e) => log::error!("Failed to save ledger on shutdown: {}", e),
            }
            std::process::exit(0);
        });

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
