//! Terminal front-end for browsing the Spotify catalog and managing a local
//! play queue.

pub mod auth;
pub mod config;
pub mod controller;
pub mod logging;
pub mod model;
pub mod search;
pub mod storage;
pub mod view;
