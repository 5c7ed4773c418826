//! Storefront command-line client.

use std::process::ExitCode;

use catalog::CatalogFilter;
use checkout::CheckoutRequest;
use clap::{Args, Parser, Subcommand};
use common::{Money, ProductId};
use domain::models::{CardDetails, ProductDraft, ProfileUpdate, RegisterRequest};
use storefront::Storefront;
use storefront::config::Config;
use storefront::error::AppError;
use storefront::render;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Browse, shop and check out from the terminal")]
struct Cli {
    /// Gateway root URL (overrides STOREFRONT_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request deadline in milliseconds (overrides STOREFRONT_TIMEOUT_MS).
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Print Prometheus metrics after the command.
    #[arg(long, global = true)]
    print_metrics: bool,

    /// Print the final display state as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the catalog with live stock.
    Catalog {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Sign in.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign out.
    Logout,
    /// Show the profile, or update it when any field is given.
    Profile(ProfileArgs),
    #[command(subcommand)]
    Cart(CartCommand),
    /// Pay for the cart and place an order.
    Checkout(CheckoutArgs),
    #[command(subcommand)]
    Orders(OrdersCommand),
    #[command(subcommand)]
    Products(ProductsCommand),
}

#[derive(Debug, Args)]
struct ProfileArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Debug, Subcommand)]
enum CartCommand {
    /// Show the cart.
    Show,
    /// Add units of a product.
    Add { product_id: i64, quantity: String },
    /// Change a line's quantity.
    Set { product_id: i64, quantity: String },
    /// Remove a line.
    Remove { product_id: i64 },
    /// Empty the cart.
    Clear,
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    #[arg(long, env = "STOREFRONT_CARD_NUMBER", hide_env_values = true)]
    card_number: String,
    #[arg(long)]
    card_holder: String,
    /// MM/YY
    #[arg(long)]
    expiry: String,
    #[arg(long, env = "STOREFRONT_CARD_CVC", hide_env_values = true)]
    cvc: String,
    /// Contact email; the session email when omitted.
    #[arg(long)]
    email: Option<String>,
}

#[derive(Debug, Subcommand)]
enum OrdersCommand {
    /// List your orders, most recent first.
    List,
    /// Show one order.
    Track { order_id: String },
    /// Set an order's status.
    Status { order_id: String, status: String },
    /// Cancel an order.
    Cancel { order_id: String },
}

#[derive(Debug, Subcommand)]
enum ProductsCommand {
    /// Create a product.
    Create {
        #[command(flatten)]
        draft: DraftArgs,
        /// Initial stock.
        #[arg(long)]
        inventory: Option<u32>,
    },
    /// Replace a product's fields.
    Update {
        id: i64,
        #[command(flatten)]
        draft: DraftArgs,
        /// Stock adjustment.
        #[arg(long, allow_hyphen_values = true)]
        inventory_delta: Option<i32>,
    },
    /// Delete a product.
    Delete { id: i64 },
}

#[derive(Debug, Args)]
struct DraftArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    brand: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    category: String,
}

impl DraftArgs {
    fn into_draft(self) -> ProductDraft {
        ProductDraft {
            name: self.name,
            brand: self.brand,
            description: self.description,
            price: Money::from_decimal(self.price),
            category: self.category,
            inventory: None,
            inventory_delta: None,
        }
    }
}

fn product_id(raw: i64) -> Result<ProductId, AppError> {
    ProductId::try_from(raw).map_err(|e| AppError::Storefront(e.into()))
}

async fn run(storefront: &Storefront, command: Command) -> Result<String, AppError> {
    let output = match command {
        Command::Catalog {
            category,
            brand,
            search,
        } => {
            let loaded = storefront.load_catalog().await;
            let filter = CatalogFilter {
                category,
                brand,
                search,
            };
            let view = storefront.filter_catalog(&filter).await;
            let facets = storefront.catalog().facets().await;
            let rendered = render::catalog(storefront.catalog().status().await, &view, &facets);
            if let Err(e) = loaded {
                // The unavailable banner is shown before the error exit.
                print!("{rendered}");
                return Err(e.into());
            }
            rendered
        }
        Command::Login { email, password } => {
            let session = storefront.login(&email, &password).await?;
            format!("Signed in as {}.\n", session.email)
        }
        Command::Register {
            email,
            password,
            first_name,
            last_name,
            phone,
        } => {
            let session = storefront
                .register(RegisterRequest {
                    email,
                    password,
                    first_name,
                    last_name,
                    phone,
                })
                .await?;
            format!("Welcome, {}.\n", session.email)
        }
        Command::Logout => {
            storefront.sign_out().await?;
            "Signed out.\n".to_string()
        }
        Command::Profile(args) => {
            let update = ProfileUpdate {
                first_name: args.first_name,
                last_name: args.last_name,
                phone: args.phone,
                email: args.email,
            };
            let profile = if update.is_empty() {
                storefront.profile().await?
            } else {
                storefront.update_profile(update).await?
            };
            render::profile(&profile)
        }
        Command::Cart(command) => {
            let cart = match command {
                CartCommand::Show => match storefront.load_cart().await? {
                    checkout::CartView::Loaded(cart) => cart,
                    checkout::CartView::SignedOut => {
                        return Ok("Please sign in to view your cart.\n".to_string());
                    }
                },
                CartCommand::Add {
                    product_id: id,
                    quantity,
                } => storefront.add_to_cart(product_id(id)?, &quantity).await?,
                CartCommand::Set {
                    product_id: id,
                    quantity,
                } => {
                    storefront
                        .update_cart_quantity(product_id(id)?, &quantity)
                        .await?
                }
                CartCommand::Remove { product_id: id } => {
                    storefront.remove_from_cart(product_id(id)?).await?
                }
                CartCommand::Clear => storefront.clear_cart().await?,
            };
            render::cart(&cart)
        }
        Command::Checkout(args) => {
            let request = CheckoutRequest {
                card: CardDetails {
                    number: args.card_number,
                    holder: args.card_holder,
                    expiry: args.expiry,
                    cvc: args.cvc,
                },
                email: args.email,
            };
            let receipt = storefront.checkout(request).await?;
            render::receipt(&receipt)
        }
        Command::Orders(command) => match command {
            OrdersCommand::List => render::orders(&storefront.list_orders().await?),
            OrdersCommand::Track { order_id } => {
                render::order(&storefront.track_order(&order_id).await?)
            }
            OrdersCommand::Status { order_id, status } => {
                let change = storefront.set_order_status(&order_id, &status).await?;
                render::order(&change.order)
            }
            OrdersCommand::Cancel { order_id } => {
                let change = storefront.cancel_order(&order_id).await?;
                render::order(&change.order)
            }
        },
        Command::Products(command) => match command {
            ProductsCommand::Create { draft, inventory } => {
                let draft = ProductDraft {
                    inventory,
                    ..draft.into_draft()
                };
                let product = storefront.create_product(&draft).await?;
                format!("Created product #{}.\n", product.id)
            }
            ProductsCommand::Update {
                id,
                draft,
                inventory_delta,
            } => {
                let draft = ProductDraft {
                    inventory_delta,
                    ..draft.into_draft()
                };
                let product = storefront.update_product(product_id(id)?, &draft).await?;
                format!("Updated product #{}.\n", product.id)
            }
            ProductsCommand::Delete { id } => {
                storefront.delete_product(product_id(id)?).await?;
                format!("Deleted product #{id}.\n")
            }
        },
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env().with_overrides(cli.base_url, cli.timeout_ms);

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = match metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
    {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "failed to install Prometheus recorder");
            None
        }
    };

    // 3. Wire the storefront
    let storefront = match Storefront::open(&config) {
        Ok(storefront) => storefront,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(e.exit_code());
        }
    };

    // 4. Run the command
    let result = run(&storefront, cli.command).await;

    let code = match result {
        Ok(_) if cli.json => {
            let display = storefront.display().await;
            match serde_json::to_string_pretty(&display) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "failed to encode display state"),
            }
            ExitCode::SUCCESS
        }
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    };

    if cli.print_metrics {
        if let Some(handle) = metrics_handle {
            print!("{}", handle.render());
        }
    }
    code
}
