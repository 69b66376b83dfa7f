pub mod credential_provider;
pub mod sheet_fetcher;
