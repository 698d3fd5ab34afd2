use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use joanie::contract_archive::{
    ArchiveFilters, ContractArchiveService, ContractArchiveStore, JsonFileStore,
};
use joanie::model::{ContractResourceQuery, ContractState, OrderQuery};
use joanie::JoanieApi;
use lms::{ApiOptions, LmsApi, LmsDeps, RecordingNavigator, User};
use mimalloc::MiMalloc;
use richie_http::TracedClient;
use runtime::{AppConfig, CliArgs};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Richie CLI - talk to the configured LMS and Joanie backends
#[derive(Parser)]
#[command(name = "richie-cli")]
#[command(about = "Richie CLI - talk to the configured LMS and Joanie backends")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Redirect prefix for login/register (overrides config)
    #[arg(long)]
    site_name: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration
    Check,
    /// Show which LMS backend (or Joanie product) a course link belongs to
    Locate(LinkArgs),
    /// Print the current LMS user
    Whoami(LinkArgs),
    /// Print the LMS login redirect for a link
    Login(RedirectArgs),
    /// Print the LMS registration redirect for a link
    Register(RedirectArgs),
    /// Enrollment operations
    #[command(subcommand)]
    Enrollment(EnrollmentCommand),
    /// Commerce backend operations
    #[command(subcommand)]
    Joanie(JoanieCommand),
}

#[derive(Args)]
struct LinkArgs {
    /// Course run resource link
    #[arg(long)]
    resource_link: String,
}

#[derive(Args)]
struct RedirectArgs {
    #[command(flatten)]
    link: LinkArgs,

    /// Path the user comes back to after the redirect
    #[arg(long, default_value = "/")]
    path: String,
}

#[derive(Subcommand)]
enum EnrollmentCommand {
    /// Fetch the enrollment of a user (anonymous when no username)
    Get {
        #[command(flatten)]
        link: LinkArgs,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        token: Option<String>,
    },
    /// Enroll a user
    Set {
        #[command(flatten)]
        link: LinkArgs,
        #[arg(long)]
        username: String,
        #[arg(long)]
        token: Option<String>,
    },
}

#[derive(Args)]
struct TokenArgs {
    /// Joanie access token
    #[arg(long)]
    token: Option<String>,
}

#[derive(Args)]
struct ArchiveArgs {
    #[command(flatten)]
    auth: TokenArgs,
    #[arg(long)]
    organization: Option<String>,
    #[arg(long)]
    offering: Option<String>,
    /// JSON file remembering requested archive ids
    #[arg(long, default_value = "contract_archives.json")]
    store: PathBuf,
}

#[derive(Subcommand)]
enum JoanieCommand {
    /// List addresses
    Addresses(TokenArgs),
    /// List credit cards
    CreditCards(TokenArgs),
    /// List orders
    Orders {
        #[command(flatten)]
        auth: TokenArgs,
        #[arg(long)]
        product: Option<String>,
    },
    /// List contracts
    Contracts {
        #[command(flatten)]
        auth: TokenArgs,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        offering: Option<String>,
        /// unsigned, half_signed or signed
        #[arg(long)]
        state: Option<String>,
    },
    /// Status of the contract archive for a filter pair
    ArchiveStatus(ArchiveArgs),
    /// Request a new contract archive for a filter pair
    ArchiveRequest(ArchiveArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        site_name: cli.site_name.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    let log_dir = config.log_dir.clone().unwrap_or_else(|| ".".to_string());
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&log_dir));
    tracing::debug!(environment = %config.context.environment, "richie-cli starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let client = TracedClient::with_timeout(Duration::from_secs(config.http.timeout_sec))
        .context("Failed to build HTTP client")?;

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check_config(&config),
        Commands::Locate(link) => locate(&config, &link.resource_link),
        Commands::Whoami(link) => whoami(&config, client, &link.resource_link).await,
        Commands::Login(redirect) => redirect_to(&config, client, redirect, false),
        Commands::Register(redirect) => redirect_to(&config, client, redirect, true),
        Commands::Enrollment(cmd) => enrollment(&config, client, cmd).await,
        Commands::Joanie(cmd) => joanie_command(&config, client, cmd).await,
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    println!("Configuration check passed");
    println!("LMS backends: {}", config.context.lms_backends.len());
    for backend in &config.context.lms_backends {
        println!("  - {} {}", backend.backend.as_str(), backend.base_url());
    }
    match config.context.joanie_endpoint() {
        Some(endpoint) => println!("Joanie backend: {endpoint}"),
        None => println!("Joanie backend: none"),
    }
    Ok(())
}

fn locate(config: &AppConfig, resource_link: &str) -> Result<()> {
    if let Some(endpoint) = config.context.joanie_endpoint() {
        if let Some(product) = joanie::extract_product(resource_link, endpoint) {
            println!("joanie product {}", product.product_id);
            if let Some(course_code) = product.course_code {
                println!("course code: {course_code}");
            }
            return Ok(());
        }
    }

    match lms::find_lms_backend(resource_link, &config.context.lms_backends) {
        Some(backend) => {
            let course_id = lms::extract_course_id(resource_link, backend)?;
            println!("{} {}", backend.backend.as_str(), backend.base_url());
            println!("course id: {course_id}");
        }
        None => println!("no LMS backend matches {resource_link}"),
    }
    Ok(())
}

fn lms_client(
    config: &AppConfig,
    client: TracedClient,
    navigator: Arc<RecordingNavigator>,
    resource_link: &str,
) -> Result<Arc<dyn LmsApi>> {
    let options = config
        .site_name
        .as_ref()
        .map(|name| ApiOptions::default().with_site_name(name.clone()));
    let deps = LmsDeps::from_env(client, navigator);
    lms::build_for_resource_link(&config.context, resource_link, options, deps)?
        .ok_or_else(|| anyhow!("no LMS backend matches {resource_link}"))
}

async fn whoami(config: &AppConfig, client: TracedClient, resource_link: &str) -> Result<()> {
    let navigator = Arc::new(RecordingNavigator::default());
    let api = lms_client(config, client, navigator, resource_link)?;
    match api.user().me().await? {
        Some(user) => print_json(&user)?,
        None => println!("no LMS session"),
    }
    Ok(())
}

fn redirect_to(
    config: &AppConfig,
    client: TracedClient,
    redirect: RedirectArgs,
    register: bool,
) -> Result<()> {
    let navigator = Arc::new(RecordingNavigator::new(redirect.path));
    let api = lms_client(config, client, navigator.clone(), &redirect.link.resource_link)?;
    if register {
        api.user().register();
    } else {
        api.user().login();
    }
    let url = navigator
        .last_assigned()
        .ok_or_else(|| anyhow!("backend did not redirect"))?;
    println!("{url}");
    Ok(())
}

async fn enrollment(
    config: &AppConfig,
    client: TracedClient,
    cmd: EnrollmentCommand,
) -> Result<()> {
    let navigator = Arc::new(RecordingNavigator::default());
    match cmd {
        EnrollmentCommand::Get {
            link,
            username,
            token,
        } => {
            let api = lms_client(config, client, navigator, &link.resource_link)?;
            let user = username.map(|name| lms_user(name, token));
            let enrollment = api
                .enrollment()
                .get(&link.resource_link, user.as_ref())
                .await?;
            match enrollment {
                Some(e) => {
                    print_json(&e)?;
                    println!("enrolled: {}", api.enrollment().is_enrolled(Some(&e)));
                }
                None => println!("not enrolled"),
            }
        }
        EnrollmentCommand::Set {
            link,
            username,
            token,
        } => {
            let api = lms_client(config, client, navigator, &link.resource_link)?;
            let user = lms_user(username, token);
            let active = api.enrollment().set(&link.resource_link, &user).await?;
            println!("enrolled: {active}");
        }
    }
    Ok(())
}

fn lms_user(username: String, token: Option<String>) -> User {
    let user = User::new(username);
    match token {
        Some(token) => user.with_access_token(token),
        None => user,
    }
}

fn joanie_api(config: &AppConfig, client: TracedClient, auth: TokenArgs) -> Result<JoanieApi> {
    Ok(JoanieApi::from_context(client, &config.context)?.with_access_token(auth.token))
}

async fn joanie_command(
    config: &AppConfig,
    client: TracedClient,
    cmd: JoanieCommand,
) -> Result<()> {
    match cmd {
        JoanieCommand::Addresses(auth) => {
            let addresses = joanie_api(config, client, auth)?.addresses().list().await?;
            print_json(&addresses)
        }
        JoanieCommand::CreditCards(auth) => {
            let cards = joanie_api(config, client, auth)?.credit_cards().list().await?;
            print_json(&cards)
        }
        JoanieCommand::Orders { auth, product } => {
            let query = OrderQuery {
                product_id: product,
                ..Default::default()
            };
            let orders = joanie_api(config, client, auth)?.orders().list(&query).await?;
            print_json(&orders)
        }
        JoanieCommand::Contracts {
            auth,
            organization,
            offering,
            state,
        } => {
            let signature_state = state.as_deref().map(parse_contract_state).transpose()?;
            let query = ContractResourceQuery {
                organization_id: organization,
                offering_id: offering,
                signature_state,
                ..Default::default()
            };
            let contracts = joanie_api(config, client, auth)?.contracts().list(&query).await?;
            print_json(&contracts)
        }
        JoanieCommand::ArchiveStatus(args) => {
            let (service, filters) = archive_service(config, client, args)?;
            println!("{:?}", service.status(&filters).await?);
            Ok(())
        }
        JoanieCommand::ArchiveRequest(args) => {
            let (service, filters) = archive_service(config, client, args)?;
            println!("{:?}", service.request(&filters).await?);
            Ok(())
        }
    }
}

fn archive_service(
    config: &AppConfig,
    client: TracedClient,
    args: ArchiveArgs,
) -> Result<(ContractArchiveService, ArchiveFilters)> {
    let api = joanie_api(config, client, args.auth)?;
    let store = ContractArchiveStore::new(Arc::new(JsonFileStore::new(args.store)));
    let filters = ArchiveFilters::new(args.organization, args.offering);
    Ok((ContractArchiveService::new(api.contract_archives(), store), filters))
}

fn parse_contract_state(raw: &str) -> Result<ContractState> {
    serde_json::from_value(Value::String(raw.to_string()))
        .with_context(|| format!("unknown contract state '{raw}'"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
