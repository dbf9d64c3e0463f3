use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use ecogest::{
    auth::{AuthApi, FileTokenStore},
    config::{self, AppConfig},
    filters::{EntityType, FilterBar, FilterOption, PageState, END_DATE, START_DATE},
    kpi::KpiSummary,
    models::{
        Customer, EntityId, Entry, Expense, ListParams, Page, Payable, Product, Purchase,
        Receivable, Sale, Supplier,
    },
    notify::Notifications,
    reports::{save_receipt, CustomReceipt},
    resources::{BatchDeleteReport, Resource, ResourceApi},
    EcoGest,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize()?;

    match cli.command {
        Commands::Auth(command) => handle_auth_command(&context, command, cli.json).await?,
        Commands::List(args) => handle_list_command(&context, args, cli.json).await?,
        Commands::Get(args) => handle_get_command(&context, args, cli.json).await?,
        Commands::Delete(args) => handle_delete_command(&context, args, cli.json).await?,
        Commands::Search(args) => handle_search_command(&context, args, cli.json).await?,
        Commands::Kpi => handle_kpi_command(&context, cli.json).await?,
        Commands::Receipt(command) => handle_receipt_command(&context, command, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "ecogest", about = "EcoGest back-office client", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Auth(AuthCommands),
    /// List one page of records
    List(ListArgs),
    /// Fetch a record by id
    Get(GetArgs),
    /// Delete one or more records
    Delete(DeleteArgs),
    /// Search records by name
    Search(SearchArgs),
    /// Dashboard totals
    Kpi,
    #[command(subcommand)]
    Receipt(ReceiptCommands),
}

#[derive(Subcommand)]
enum AuthCommands {
    Login(AuthLoginArgs),
    Logout,
    Status,
}

#[derive(Args)]
struct AuthLoginArgs {
    #[arg(long, help = "Email address for the account")]
    email: String,
    #[arg(long, help = "Password for the account")]
    password: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Entity {
    Customers,
    Suppliers,
    Products,
    Purchases,
    Sales,
    Entries,
    Expenses,
    Payables,
    Receivables,
}

impl Entity {
    fn filter_table(self) -> Option<EntityType> {
        match self {
            Entity::Purchases => Some(EntityType::Purchase),
            Entity::Sales => Some(EntityType::Sale),
            Entity::Payables => Some(EntityType::Payable),
            Entity::Receivables => Some(EntityType::Receivable),
            Entity::Entries => Some(EntityType::Entry),
            Entity::Expenses => Some(EntityType::Expense),
            Entity::Customers | Entity::Suppliers | Entity::Products => None,
        }
    }
}

#[derive(Args)]
struct ListArgs {
    #[arg(value_enum)]
    entity: Entity,
    #[arg(long, default_value_t = 0, help = "Zero-based page index")]
    page: u64,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    supplier: Option<String>,
    #[arg(long)]
    customer: Option<String>,
    #[arg(long)]
    nfe: Option<String>,
    #[arg(long)]
    code: Option<String>,
    #[arg(long, requires = "to", help = "Period start (YYYY-MM-DD)")]
    from: Option<NaiveDate>,
    #[arg(long, requires = "from", help = "Period end (YYYY-MM-DD)")]
    to: Option<NaiveDate>,
    #[arg(long)]
    order: Option<String>,
}

#[derive(Args)]
struct GetArgs {
    #[arg(value_enum)]
    entity: Entity,
    #[arg(long)]
    id: EntityId,
}

#[derive(Args)]
struct DeleteArgs {
    #[arg(value_enum)]
    entity: Entity,
    #[arg(long = "id", required = true, num_args = 1.., help = "Ids to delete")]
    ids: Vec<EntityId>,
}

#[derive(Args)]
struct SearchArgs {
    #[arg(value_enum)]
    entity: Entity,
    #[arg(long)]
    name: String,
}

#[derive(Subcommand)]
enum ReceiptCommands {
    /// Download the receipt of a ledger entry
    Entry(EntryReceiptArgs),
    /// Render a free-form receipt
    Custom(CustomReceiptArgs),
}

#[derive(Args)]
struct EntryReceiptArgs {
    #[arg(long)]
    entry_id: EntityId,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args)]
struct CustomReceiptArgs {
    #[arg(long)]
    payer: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    value: Decimal,
    #[arg(long, help = "Receipt date (YYYY-MM-DD), defaults to today")]
    date: Option<NaiveDate>,
    #[arg(long)]
    out: PathBuf,
}

struct CliContext {
    config: AppConfig,
    tokens: FileTokenStore,
    client: EcoGest,
}

impl CliContext {
    fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load client config")?;
        config::init_tracing(&config.log_level, config.log_json);

        let token_path = config
            .token_path()
            .ok_or_else(|| anyhow!("no location for the session file; set token_file"))?;
        let tokens = FileTokenStore::new(token_path);
        let (client, notifications) = EcoGest::new(config.clone(), std::sync::Arc::new(tokens.clone()))
            .context("failed to build HTTP client")?;
        spawn_notification_printer(notifications);

        Ok(Self {
            config,
            tokens,
            client,
        })
    }

    fn auth(&self) -> AuthApi {
        self.client.auth()
    }
}

fn spawn_notification_printer(mut notifications: Notifications) {
    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            debug!(target: "ecogest_cli", ?notification, "notification");
        }
    });
}

async fn handle_auth_command(context: &CliContext, command: AuthCommands, json: bool) -> Result<()> {
    match command {
        AuthCommands::Login(args) => {
            context
                .auth()
                .login_to_file(&context.tokens, &args.email, &args.password)
                .await
                .context("failed to authenticate")?;
            if json {
                print_json(&serde_json::json!({
                    "email": args.email,
                    "session": context.tokens.path().display().to_string(),
                }))?;
            } else {
                println!("Logged in as {}", args.email);
                println!("Session saved to: {}", context.tokens.path().display());
            }
        }
        AuthCommands::Logout => {
            context.auth().logout().context("failed to clear session")?;
            if json {
                print_json(&logout_report(context.tokens.path()))?;
            } else {
                println!("Logged out");
            }
        }
        AuthCommands::Status => {
            let session = context
                .tokens
                .read_session()
                .context("failed to read session file")?;
            match (session, json) {
                (Some(session), true) => print_json(&serde_json::json!({
                    "email": session.email,
                    "savedAt": session.saved_at,
                    "backend": context.config.api_base_url,
                }))?,
                (Some(session), false) => println!(
                    "Logged in as {} since {} ({})",
                    session.email.as_deref().unwrap_or("<unknown>"),
                    session.saved_at,
                    context.config.api_base_url
                ),
                (None, true) => print_json(&serde_json::Value::Null)?,
                (None, false) => println!("Not logged in"),
            }
        }
    }
    Ok(())
}

fn logout_report(session: &std::path::Path) -> serde_json::Value {
    serde_json::json!({
        "loggedOut": true,
        "session": session.display().to_string(),
    })
}

fn build_params(args: &ListArgs, rows_per_page: u64) -> Result<ListParams> {
    let mut page = PageState::new(rows_per_page);
    page.go_to(args.page);

    let Some(table) = args.entity.filter_table() else {
        let filtered = args.status.is_some()
            || args.supplier.is_some()
            || args.customer.is_some()
            || args.nfe.is_some()
            || args.code.is_some()
            || args.from.is_some()
            || args.order.is_some();
        if filtered {
            bail!("this listing has no filters");
        }
        return Ok(ListParams::new(page.skip(), page.take()));
    };

    let mut bar = FilterBar::new(table);
    let mut apply = |option: FilterOption, field: &str, value: Option<String>| -> Result<()> {
        if let Some(value) = value {
            if bar.is_disabled(option) {
                bail!("--{} cannot be combined with the other filters given", option);
            }
            bar.activate(option)?;
            bar.set_value(field, value)?;
        }
        Ok(())
    };
    apply(FilterOption::Nfe, "nfe", args.nfe.clone())?;
    apply(FilterOption::Code, "code", args.code.clone())?;
    apply(FilterOption::Supplier, "supplier", args.supplier.clone())?;
    apply(FilterOption::Customer, "customer", args.customer.clone())?;
    apply(FilterOption::Status, "status", args.status.clone())?;
    apply(FilterOption::Order, "order", args.order.clone())?;
    if let (Some(from), Some(to)) = (args.from, args.to) {
        apply(FilterOption::Period, START_DATE, Some(from.to_string()))?;
        bar.set_value(END_DATE, to.to_string())?;
    }
    Ok(bar.query(&page))
}

async fn handle_list_command(context: &CliContext, args: ListArgs, json: bool) -> Result<()> {
    let params = build_params(&args, u64::from(context.config.rows_per_page))?;
    let client = &context.client;
    match args.entity {
        Entity::Customers => list(client.customers(), &params, json).await,
        Entity::Suppliers => list(client.suppliers(), &params, json).await,
        Entity::Products => list(client.products(), &params, json).await,
        Entity::Purchases => list(client.purchases(), &params, json).await,
        Entity::Sales => list(client.sales(), &params, json).await,
        Entity::Entries => list(client.entries(), &params, json).await,
        Entity::Expenses => list(client.expenses(), &params, json).await,
        Entity::Payables => list(client.payables(), &params, json).await,
        Entity::Receivables => list(client.receivables(), &params, json).await,
    }
}

async fn list<R: Resource>(api: ResourceApi<R>, params: &ListParams, json: bool) -> Result<()> {
    let page = api
        .list(params)
        .await
        .with_context(|| format!("failed to list {}", R::NAME))?;
    if json {
        print_json(&page)?;
    } else {
        render_page(&page, params);
    }
    Ok(())
}

async fn handle_get_command(context: &CliContext, args: GetArgs, json: bool) -> Result<()> {
    let client = &context.client;
    match args.entity {
        Entity::Customers => get(client.customers(), args.id, json).await,
        Entity::Suppliers => get(client.suppliers(), args.id, json).await,
        Entity::Products => get(client.products(), args.id, json).await,
        Entity::Purchases => get(client.purchases(), args.id, json).await,
        Entity::Sales => get(client.sales(), args.id, json).await,
        Entity::Entries => get(client.entries(), args.id, json).await,
        Entity::Expenses => get(client.expenses(), args.id, json).await,
        Entity::Payables => get(client.payables(), args.id, json).await,
        Entity::Receivables => get(client.receivables(), args.id, json).await,
    }
}

async fn get<R: Resource>(api: ResourceApi<R>, id: EntityId, json: bool) -> Result<()> {
    let record = api
        .get_by_id(id)
        .await
        .with_context(|| format!("failed to fetch {} {}", R::NAME, id))?
        .ok_or_else(|| anyhow!("{} {} not found", R::NAME, id))?;
    if json {
        print_json(&record)?;
    } else {
        render_record(&record);
    }
    Ok(())
}

async fn handle_delete_command(context: &CliContext, args: DeleteArgs, json: bool) -> Result<()> {
    let client = &context.client;
    let report = match args.entity {
        Entity::Customers => client.resource::<Customer>().delete_many(&args.ids).await,
        Entity::Suppliers => client.resource::<Supplier>().delete_many(&args.ids).await,
        Entity::Products => client.resource::<Product>().delete_many(&args.ids).await,
        Entity::Purchases => client.resource::<Purchase>().delete_many(&args.ids).await,
        Entity::Sales => client.resource::<Sale>().delete_many(&args.ids).await,
        Entity::Entries => client.resource::<Entry>().delete_many(&args.ids).await,
        Entity::Expenses => client.resource::<Expense>().delete_many(&args.ids).await,
        Entity::Payables => client.resource::<Payable>().delete_many(&args.ids).await,
        Entity::Receivables => client.resource::<Receivable>().delete_many(&args.ids).await,
    };
    render_delete_report(&report, json)?;
    if !report.is_complete() {
        bail!("{} of {} deletions failed", report.failed.len(), report.attempted());
    }
    Ok(())
}

async fn handle_search_command(context: &CliContext, args: SearchArgs, json: bool) -> Result<()> {
    let client = &context.client;
    match args.entity {
        Entity::Customers => search(client.customers(), &args.name, json).await,
        Entity::Suppliers => search(client.suppliers(), &args.name, json).await,
        Entity::Products => search(client.products(), &args.name, json).await,
        Entity::Purchases => search(client.purchases(), &args.name, json).await,
        Entity::Sales => search(client.sales(), &args.name, json).await,
        Entity::Entries => search(client.entries(), &args.name, json).await,
        Entity::Expenses => search(client.expenses(), &args.name, json).await,
        Entity::Payables => search(client.payables(), &args.name, json).await,
        Entity::Receivables => search(client.receivables(), &args.name, json).await,
    }
}

async fn search<R: Resource>(api: ResourceApi<R>, name: &str, json: bool) -> Result<()> {
    let Some(found) = api
        .search_by_name(name)
        .await
        .with_context(|| format!("failed to search {}", R::NAME))?
    else {
        bail!(
            "search terms need at least {} characters",
            api.search_min_chars()
        );
    };
    if json {
        print_json(&found)?;
    } else {
        println!("{} result(s)", found.len());
        for record in &found {
            render_record(record);
        }
    }
    Ok(())
}

async fn handle_kpi_command(context: &CliContext, json: bool) -> Result<()> {
    let summary = context
        .client
        .dashboard()
        .load()
        .await
        .context("failed to load dashboard figures")?;
    if json {
        print_json(&summary)?;
    } else {
        render_summary(&summary);
    }
    Ok(())
}

async fn handle_receipt_command(
    context: &CliContext,
    command: ReceiptCommands,
    json: bool,
) -> Result<()> {
    let entries = context.client.entries();
    let (pdf, out) = match command {
        ReceiptCommands::Entry(args) => {
            let pdf = entries
                .receipt(args.entry_id)
                .await
                .with_context(|| format!("failed to fetch receipt for entry {}", args.entry_id))?;
            (pdf, args.out)
        }
        ReceiptCommands::Custom(args) => {
            let receipt = CustomReceipt {
                payer: args.payer,
                description: args.description,
                value: args.value,
                date: args
                    .date
                    .unwrap_or_else(|| chrono::Local::now().date_naive()),
                items: Vec::new(),
            };
            let pdf = entries
                .custom_receipt(&receipt)
                .await
                .context("failed to render receipt")?;
            (pdf, args.out)
        }
    };
    save_receipt(&pdf, &out)
        .await
        .with_context(|| format!("failed to write {}", out.display()))?;
    if json {
        print_json(&serde_json::json!({
            "saved": out.display().to_string(),
            "bytes": pdf.len(),
        }))?;
    } else {
        println!("Receipt saved to: {}", out.display());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_page<R: Resource>(page: &Page<R>, params: &ListParams) {
    let state = PageState::new(params.take);
    println!(
        "{} • page {} of {} • {} total",
        R::NAME,
        params.skip / params.take.max(1) + 1,
        state.total_pages(page.total_items()).max(1),
        page.total_items()
    );
    for record in &page.data {
        render_record(record);
    }
}

fn render_record<R: Resource>(record: &R) {
    println!("- #{} • {}", record.id(), record.label());
}

fn render_delete_report(report: &BatchDeleteReport, json: bool) -> Result<()> {
    if json {
        let failed: Vec<_> = report
            .failed
            .iter()
            .map(|(id, err)| serde_json::json!({ "id": id, "error": err.to_string() }))
            .collect();
        return print_json(&serde_json::json!({
            "deleted": report.deleted,
            "failed": failed,
        }));
    }
    for id in &report.deleted {
        println!("Deleted #{}", id);
    }
    for (id, err) in &report.failed {
        eprintln!("Failed to delete #{}: {}", id, err);
    }
    Ok(())
}

fn render_summary(summary: &KpiSummary) {
    println!("Sales:               {}", summary.sales_total);
    println!("Purchases:           {}", summary.purchases_total);
    println!(
        "Payables open:       {} ({} overdue)",
        summary.payables_open, summary.overdue_payables
    );
    println!(
        "Receivables open:    {} ({} overdue)",
        summary.receivables_open, summary.overdue_receivables
    );
    println!("Income:              {}", summary.income);
    println!("Expense entries:     {}", summary.entry_expenses);
    println!("Expenses:            {}", summary.expenses_total);
    println!("Balance:             {}", summary.balance);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_args(argv: &[&str]) -> ListArgs {
        let cli = Cli::try_parse_from(["ecogest", "list"].iter().chain(argv.iter()).copied()).unwrap();
        match cli.command {
            Commands::List(args) => args,
            _ => unreachable!("parsed a list command"),
        }
    }

    #[test]
    fn page_and_status_become_query_params() {
        let args = list_args(&["purchases", "--page", "2", "--status", "approved"]);
        let params = build_params(&args, 5).unwrap();
        assert_eq!(params.skip, 10);
        assert_eq!(params.take, 5);
        assert_eq!(params.filters.get("status").map(String::as_str), Some("approved"));
    }

    #[test]
    fn receipt_commands_parse() {
        let cli = Cli::try_parse_from([
            "ecogest", "--json", "receipt", "entry", "--entry-id", "12", "--out", "r.pdf",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Receipt(ReceiptCommands::Entry(args)) => {
                assert_eq!(args.entry_id, 12);
                assert_eq!(args.out, PathBuf::from("r.pdf"));
            }
            _ => unreachable!("parsed an entry receipt"),
        }
        assert!(Cli::try_parse_from(["ecogest", "receipt", "--entry-id", "12"]).is_err());
    }

    #[test]
    fn logout_renders_json() {
        let report = logout_report(std::path::Path::new("/tmp/ecogest/session.json"));
        assert_eq!(report["loggedOut"], true);
        assert_eq!(report["session"], "/tmp/ecogest/session.json");
    }

    #[test]
    fn page_index_at_the_top_of_the_range() {
        let args = list_args(&["purchases", "--page", "18446744073709551615"]);
        let params = build_params(&args, 5).unwrap();
        assert_eq!(params.skip, u64::MAX);
        assert_eq!(params.take, 5);
    }

    #[test]
    fn period_needs_both_dates() {
        assert!(Cli::try_parse_from(["ecogest", "list", "sales", "--from", "2024-01-01"]).is_err());

        let args = list_args(&["sales", "--from", "2024-01-01", "--to", "2024-01-31"]);
        let params = build_params(&args, 5).unwrap();
        assert_eq!(params.filters.get(START_DATE).map(String::as_str), Some("2024-01-01"));
        assert_eq!(params.filters.get(END_DATE).map(String::as_str), Some("2024-01-31"));
    }

    #[test]
    fn exclusive_filters_are_refused() {
        let args = list_args(&["purchases", "--nfe", "123", "--supplier", "4"]);
        assert!(build_params(&args, 5).is_err());
    }

    #[test]
    fn unfiltered_listings_reject_filters() {
        let args = list_args(&["customers", "--status", "approved"]);
        assert!(build_params(&args, 5).is_err());

        let args = list_args(&["customers", "--page", "1"]);
        let params = build_params(&args, 5).unwrap();
        assert_eq!(params, ListParams::new(5, 5));
    }
}
