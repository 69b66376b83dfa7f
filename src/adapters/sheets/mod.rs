pub mod auth;
pub mod http_client;
pub mod spreadsheet_read;
pub mod token_refresh;

#[cfg(test)]
pub(crate) mod test_server;
