use solotto::datasource::{
    CoinGeckoDataSource, LedgerDataSource, PriceDataSource, RpcDataSource,
};
use solotto::engine::DrawAssembler;
use solotto::oracle::{OraclePacing, PriceOracle};
use solotto::scan::{Pacing, ScanOrchestrator, SignatureScanner, TransactionEnricher};
use solotto::{api, config::Config, db::init_db, ExclusionRegistry, Repository};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize database and dependencies
    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));

    // Hydrate the exclusion registry from the persisted blocklist
    let exclusions = match repo.list_exclusions().await {
        Ok(entries) => Arc::new(ExclusionRegistry::from_entries(entries)),
        Err(e) => {
            eprintln!("Failed to load exclusions: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Loaded {} excluded wallet(s)", exclusions.len());

    let ledger: Arc<dyn LedgerDataSource> = Arc::new(RpcDataSource::new(config.rpc_url.clone()));
    let prices: Arc<dyn PriceDataSource> =
        Arc::new(CoinGeckoDataSource::new(config.price_api_url.clone()));
    let oracle = Arc::new(PriceOracle::new(prices, OraclePacing::standard()));

    let pacing = Pacing::standard();
    let scanner = SignatureScanner::new(ledger.clone(), pacing);
    let enricher = TransactionEnricher::new(ledger, pacing.transaction_fetch);
    let assembler = DrawAssembler::new(oracle, pacing.price_lookup);
    let orchestrator = Arc::new(ScanOrchestrator::new(
        scanner,
        enricher,
        assembler,
        exclusions.clone(),
    ));

    // Create router
    let app = api::create_router(api::AppState {
        repo,
        exclusions,
        orchestrator,
    });

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
