//! HTTP request handlers

pub mod proxy;
