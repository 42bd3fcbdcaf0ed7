pub mod app;
pub mod config;
pub mod error;
pub mod models {
    pub mod case_study;
    pub mod entity;
    pub mod lead;
    pub mod news_item;
    pub mod service;
    pub mod validation;
}
pub mod db {
    pub mod memory;
    pub mod mongo;
    pub mod repository;
    pub mod store;
}
pub mod api {
    pub mod content;
    pub mod errors;
    pub mod health;
    pub mod leads;
    pub mod seed;
}
