pub mod backend;
pub mod engine;
pub mod failure;
pub mod files;
pub mod junit;
pub mod report;
pub mod spec;
pub mod types;
pub mod workdir;
