//! MedCore CLI
//!
//! Command-line front end for the MedCore storefront API:
//! - Sign up, log in, log out
//! - Inspect and validate the stored session
//! - Manage products and users
//! - Show the distributor dashboard

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use medcore::config::generate_default_config;
use medcore::{
    load_dashboard, ApiClient, Config, Credentials, Product, ProductInput, Role, SessionStore,
    SignupRequest, UserProfile, UserUpdate,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medcore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the MedCore medical-device storefront")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: searched in standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base address, overriding the configuration
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Signup {
        /// Display name
        #[arg(long)]
        name: String,
        /// Handle (default: derived from the name)
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// customer or distributor
        #[arg(long, default_value = "customer")]
        role: Role,
    },

    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the current user (clears the session if it is no longer valid)
    Whoami,

    /// Check whether the stored session is still valid
    Status,

    /// Manage products
    #[command(subcommand)]
    Products(ProductCommands),

    /// Manage users
    #[command(subcommand)]
    Users(UserCommands),

    /// Show the distributor dashboard
    Dashboard,

    /// Print a default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List products
    List {
        /// Query parameters in key=value format
        #[arg(short, long)]
        query: Vec<String>,
    },
    /// Show one product
    Get { id: String },
    /// Create a product
    Create(ProductArgs),
    /// Replace a product's fields
    Update {
        id: String,
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Delete a product
    Delete { id: String },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, default_value = "0")]
    pub stock: i64,
    #[arg(long)]
    pub company_id: Option<String>,
    #[arg(long, default_value = "10")]
    pub limit: u32,
}

impl From<ProductArgs> for ProductInput {
    fn from(args: ProductArgs) -> Self {
        ProductInput {
            name: args.name,
            description: args.description,
            price: args.price,
            stock_quantity: args.stock,
            company_id: args.company_id,
            limit: args.limit,
        }
    }
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users
    List,
    /// Update a user
    Update {
        id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        /// Replacement role list (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = Some(url.clone());
    }

    medcore::logging::init(&config.logging);

    let session = SessionStore::file(&config.session.path);
    let client = ApiClient::new(&config.api, session)?;
    let json = cli.format == "json";

    match cli.command {
        Commands::Signup {
            name,
            username,
            email,
            password,
            role,
        } => {
            let request = SignupRequest {
                name,
                username,
                email,
                password,
                role,
            };
            let response = client.signup(&request).await?;
            if response.token().is_some() {
                println!("Signed up and logged in as {}", request.handle());
            } else {
                println!("Signed up as {}; log in to start a session", request.handle());
            }
        }

        Commands::Login { email, password } => {
            let response = client.login(&Credentials { email, password }).await?;
            match response.token() {
                Some(_) => {
                    let name = client
                        .cached_user()
                        .and_then(|u| u.display_name().map(str::to_string))
                        .unwrap_or_else(|| "unknown user".to_string());
                    println!("Logged in as {}", name);
                }
                None => bail!("Login succeeded but the server issued no token"),
            }
        }

        Commands::Logout => {
            client.logout()?;
            println!("Logged out");
        }

        Commands::Whoami => {
            if !client.is_authenticated() {
                bail!("Not logged in");
            }
            let user = client.get_current_user().await?;
            if json {
                print_json(&user)?;
            } else {
                print_users(&[user]);
            }
        }

        Commands::Status => {
            println!("MedCore v{}", env!("CARGO_PKG_VERSION"));
            println!("API: {}", client.base_url());
            if client.check_auth().await {
                println!("Session: valid");
                println!("Distributor: {}", client.is_distributor());
            } else {
                println!("Session: not authenticated");
            }
        }

        Commands::Products(command) => run_products(&client, command, json).await?,

        Commands::Users(command) => run_users(&client, command, json).await?,

        Commands::Dashboard => {
            let dashboard = load_dashboard(&client).await?;
            if json {
                print_json(&dashboard)?;
            } else {
                println!("{}", dashboard.title);
                println!();
                match &dashboard.inventory {
                    Some(inventory) => {
                        println!("Inventory value:  IQD {:.2}", inventory.total_value);
                        println!("Total products:   {}", inventory.total_products);
                        println!("Active products:  {}", inventory.active_products);
                        println!("Units in stock:   {}", inventory.total_units);
                    }
                    None => println!("Inventory unavailable"),
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

async fn run_products(client: &ApiClient, command: ProductCommands, json: bool) -> anyhow::Result<()> {
    match command {
        ProductCommands::List { query } => {
            let query = parse_pairs(&query)?;
            let products = client.get_products(&query).await?;
            if json {
                print_json(&products)?;
            } else {
                print_products(&products);
            }
        }
        ProductCommands::Get { id } => {
            let product = client.get_product(&id).await?;
            if json {
                print_json(&product)?;
            } else {
                print_products(&[product]);
            }
        }
        ProductCommands::Create(args) => {
            let product = client.create_product(&args.into()).await?;
            println!(
                "Created product {}",
                product.id.as_deref().unwrap_or(&product.name)
            );
        }
        ProductCommands::Update { id, product } => {
            client.update_product(&id, &product.into()).await?;
            println!("Updated product {}", id);
        }
        ProductCommands::Delete { id } => {
            client.delete_product(&id).await?;
            println!("Deleted product {}", id);
        }
    }
    Ok(())
}

async fn run_users(client: &ApiClient, command: UserCommands, json: bool) -> anyhow::Result<()> {
    match command {
        UserCommands::List => {
            let users = client.list_users().await?;
            if json {
                print_json(&users)?;
            } else {
                print_users(&users);
            }
        }
        UserCommands::Update {
            id,
            email,
            full_name,
            active,
            roles,
        } => {
            let update = UserUpdate {
                email,
                full_name,
                is_active: active,
                roles: (!roles.is_empty()).then_some(roles),
            };
            if update.is_empty() {
                bail!("Nothing to update");
            }
            let user = client.update_user(&id, &update).await?;
            if json {
                print_json(&user)?;
            } else {
                print_users(&[user]);
            }
        }
    }
    Ok(())
}

fn parse_pairs(pairs: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => Ok((k.to_string(), v.to_string())),
            None => bail!("Invalid query parameter '{}', expected key=value", pair),
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }

    println!(
        "{:<38} {:<30} {:>12} {:>8} {:>7}",
        "ID", "NAME", "PRICE", "STOCK", "ACTIVE"
    );
    println!("{}", "-".repeat(99));
    for p in products {
        println!(
            "{:<38} {:<30} {:>12.2} {:>8} {:>7}",
            p.id.as_deref().unwrap_or("-"),
            truncate(&p.name, 30),
            p.price,
            p.stock_quantity,
            if p.is_active { "yes" } else { "no" }
        );
    }
}

fn print_users(users: &[UserProfile]) {
    if users.is_empty() {
        println!("No users found");
        return;
    }

    println!("{:<38} {:<20} {:<30} {}", "ID", "USERNAME", "EMAIL", "ROLES");
    println!("{}", "-".repeat(100));
    for u in users {
        let mut roles = u.roles.clone();
        if let Some(role) = &u.role {
            if !roles.contains(role) {
                roles.insert(0, role.clone());
            }
        }
        println!(
            "{:<38} {:<20} {:<30} {}",
            u.id.as_deref().unwrap_or("-"),
            truncate(u.username.as_deref().unwrap_or("-"), 20),
            truncate(u.email.as_deref().unwrap_or("-"), 30),
            roles.join(",")
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
