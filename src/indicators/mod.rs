//! Indicator calculations.
//!
//! - `monthly_vwap`: calendar-month VWAP aggregation

pub mod monthly_vwap;
