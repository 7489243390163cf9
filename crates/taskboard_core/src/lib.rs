pub mod config;
pub mod error;
pub mod feed;
pub mod model;
pub mod storage;
pub mod task_api;
pub mod theme;
pub mod view;
