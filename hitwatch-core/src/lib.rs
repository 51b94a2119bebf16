pub mod cli;
pub mod conf;
pub mod ingest;
pub mod logging;
pub mod pipeline;
