use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use common::cache::{RedisConfig, RedisStorage};
use common::{FileStorage, KeyValueStorage};
use dashboard::format::{format_compact_currency, format_number, format_percentage};
use dashboard::models::{Language, ReportFilter};
use dashboard::navigation::{HOME_PATH, LOGIN_PATH};
use dashboard::reports::{Facet, render_report};
use dashboard::{
    ApiGateway, AuthCoordinator, DashboardConfig, DocumentRoot, FacetSelection, Navigator,
    PreferenceStore, Queries, QueryClient, ReportType, Route, SessionStore, handle_api_error,
};

/// Usage:
/// - `dashboard login <email> <password>` / `dashboard logout`
/// - `dashboard [report-slug [facet=value ...]]`
///
/// With a report slug the report page is printed; with no arguments the
/// dashboard KPIs are fetched and logged.
#[tokio::main]
async fn main() -> Result<()> {
    let config = DashboardConfig::from_env()?;

    // Initialize logging
    let level = if config.enable_devtools {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting {} v{}", config.app_name, config.app_version);

    let storage = open_storage(&config)?;
    let session = Arc::new(SessionStore::hydrate(Arc::clone(&storage)));
    let preferences = PreferenceStore::hydrate(
        Arc::clone(&storage),
        Arc::new(DocumentRoot::new()),
        config.default_language,
    );
    let gateway = Arc::new(ApiGateway::new(&config, Arc::clone(&storage))?);
    let queries = Queries::new(Arc::clone(&gateway), Arc::new(QueryClient::new()));

    let navigator = Arc::new(Navigator::default());
    let coordinator =
        AuthCoordinator::spawn(gateway.subscribe(), Arc::clone(&navigator), Arc::clone(&session));

    let language = preferences.language();
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("login") => {
            let (Some(email), Some(password)) = (args.next(), args.next()) else {
                bail!("Usage: dashboard login <email> <password>");
            };
            let user = session.login(&email, &password)?;
            let route = navigator.navigate(HOME_PATH, session.is_authenticated());
            info!("Logged in as {} ({:?}), now at {}", user.name, user.role, route.path());
        }
        Some("logout") => {
            session.logout();
            navigator.navigate(LOGIN_PATH, false);
        }
        Some(slug) => {
            let kind: ReportType = slug.parse()?;
            let selection = parse_selection(args)?;
            show_report(&queries, &navigator, &session, kind, &selection, language).await?;
        }
        None => show_kpis(&queries, language).await,
    }

    coordinator.abort();
    Ok(())
}

fn open_storage(config: &DashboardConfig) -> Result<Arc<dyn KeyValueStorage>> {
    if let Some(url) = &config.redis_url {
        let storage = RedisStorage::new(&RedisConfig::with_url(url.clone()))?;
        if storage.health_check()? {
            info!("Using redis storage");
        }
        return Ok(Arc::new(storage));
    }

    let storage = FileStorage::open(&config.storage_path)?;
    info!("Using file storage at {}", storage.path().display());
    Ok(Arc::new(storage))
}

fn parse_selection(args: impl Iterator<Item = String>) -> Result<FacetSelection> {
    let mut selection = FacetSelection::new();
    for arg in args {
        let Some((facet, value)) = arg.split_once('=') else {
            bail!("Expected facet=value, got {}", arg);
        };
        let facet: Facet = facet.parse().map_err(anyhow::Error::msg)?;
        selection.select(facet, value);
    }
    Ok(selection)
}

async fn show_report(
    queries: &Queries,
    navigator: &Navigator,
    session: &SessionStore,
    kind: ReportType,
    selection: &FacetSelection,
    language: Language,
) -> Result<()> {
    let route = navigator.navigate(&Route::Report(kind).path(), session.is_authenticated());

    let report = if route == Route::Login {
        warn!("Not logged in, showing bundled {} data", kind);
        None
    } else {
        match queries.report_of(kind, &ReportFilter::new()).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Showing bundled {} data: {}", kind, handle_api_error(&e));
                None
            }
        }
    };

    println!("{}", render_report(kind, report.as_ref(), selection, language)?);
    Ok(())
}

async fn show_kpis(queries: &Queries, language: Language) {
    match queries.kpis(None).await {
        Ok(kpis) => {
            info!("Executed value: {}", format_compact_currency(kpis.executed_value));
            info!(
                "Outstanding QS value: {}",
                format_compact_currency(kpis.outstanding_qs_value)
            );
            info!("Open items: {}", kpis.open_items_count);
            info!(
                "Monthly fuel consumption: {}",
                format_number(kpis.fuel_consumption_monthly, 0)
            );
            info!(
                "Equipment utilization: {}",
                format_percentage(kpis.equipment_utilization, 1)
            );
            info!("Net profit: {}", format_compact_currency(kpis.net_profit));
        }
        Err(e) => error!("Failed to load KPIs: {}", e.user_message(language)),
    }
}
