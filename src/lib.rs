//! gaptrends: Gapminder trend library
//!
//! Loads the child mortality, income and life expectancy tables, merges them
//! into one country/year table, computes rolling averages and renders plots
//! and correlation statistics.

pub mod cli;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod utils;
