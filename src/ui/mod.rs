pub mod dashboard;
pub mod pages;
pub mod panels;
pub mod plot;
pub mod table;
