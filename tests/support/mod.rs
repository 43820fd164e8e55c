#![allow(dead_code)]

pub mod config;
pub mod nomad;
pub mod temp_db;
