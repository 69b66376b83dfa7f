pub mod private_fs;
pub mod token_cache;
