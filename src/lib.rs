//! Theatre utilisation dashboard: data loading, filtering and aggregation
//! over the NHS theatre workbook, plus the chart descriptions and contact
//! relay the egui front end uses.

pub mod catalog;
pub mod chart;
pub mod color;
pub mod config;
pub mod contact;
pub mod data;
pub mod engine;
pub mod format;
pub mod view;
