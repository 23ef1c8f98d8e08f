pub mod config;
pub mod output;
pub mod prompt;
pub mod roster;
pub mod scanner;
pub mod server;
pub mod workbook;
