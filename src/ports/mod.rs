pub mod authorizer;
pub mod credential_store;
pub mod sheet_values;
pub mod token_refresher;
