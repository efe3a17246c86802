pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod dispatcher;
pub mod entity_source;
pub mod input_controller;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod runtime;
pub mod search;
pub mod transport;

