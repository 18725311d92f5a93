//! # diskfill
//!
//! Fills a target directory with generated chunk files up to a configured
//! size. A background write loop produces `data_chunk_<n>.dat` files in
//! bounded sub-writes, publishing progress derived from filesystem truth
//! after every flush, and can be stopped cooperatively at any sub-chunk
//! boundary.

pub mod cli;
pub mod config;
pub mod constants;
pub mod controller;
pub mod generator;
pub mod inventory;
pub mod logging;
pub mod util;
pub mod writer;
