// REFCUE Core Library
// Copyright (c) 2026 Xing_The_Creator | REFCUE

pub mod config;
pub mod practice;
pub mod server;
pub mod state;
pub mod store;
