pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod exclusions;
pub mod oracle;
pub mod scan;

pub use config::Config;
pub use datasource::{
    CoinGeckoDataSource, DataSourceError, LedgerDataSource, MockLedgerDataSource,
    MockPriceDataSource, PriceDataSource, RpcDataSource,
};
pub use db::{init_db, Repository};
pub use domain::{
    ClassifiedBuy, EnrichedTransaction, Mint, NumberedBuy, PricedBuy, SavedDraw, Signature,
    SignatureRecord, TimeS, Wallet,
};
pub use error::AppError;
pub use exclusions::ExclusionRegistry;
pub use oracle::{OraclePacing, PriceOracle};
pub use scan::{ScanError, ScanOrchestrator, ScanRequest};
