pub mod canonical;
pub mod category_router;
pub mod config;
pub mod dates;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod sources;
pub mod spreadsheet;

pub use canonical::models::PlayerRecord;
pub use canonical::transformer::{ExistingFilePolicy, FileImport, ImportStats, RatingImporter};
pub use category_router::{CategoryRouter, KnownSheetNames};
pub use config::FetchConfig;
pub use error::{ImporterError, Result};
pub use pipeline::{DirectoryImportOptions, RemoteFetchOptions, fetch_remote, import_directory};
pub use report::{Diagnostic, FileOutcome, FileReport, RunMode, RunReport};
pub use sources::catalog::{CatalogEntry, CatalogFetcher};
pub use sources::download::FileDownloader;
