pub mod cli_adapter;
pub mod service_factory;
