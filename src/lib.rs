//! Keeps the club's records in step across their two homes: events flow from
//! the Notion workspace into the MySQL mirror the website reads, and members
//! flow from MySQL into the Notion workspace the execs work in.

pub mod config;
pub mod error;
pub mod models;
pub mod notion;
pub mod sync;
pub mod util;

#[cfg(test)]
pub mod tests;
