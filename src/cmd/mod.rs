pub mod crawl;
pub mod enrich;
pub mod server;
