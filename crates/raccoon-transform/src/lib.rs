//! Field normalization and table utilities for record linkage.
//!
//! This crate provides the transformation layer the matcher is built on:
//!
//! - **normalization**: name cleaning, heterogeneous date parsing and
//!   date distances
//! - **polars_utils**: `AnyValue` conversions
//! - **frame**: derived-column construction, frame alignment and
//!   raw-value stamping

pub mod frame;
pub mod normalization;
pub mod polars_utils;

pub use frame::{
    CleanDemographics, align_frames, cell_string, clean_name_column, date_column,
    demographic_columns, extract_demographics, normalize_demographics, parse_date_column,
    save_raw_values, suffix_collisions,
};
pub use normalization::date::{any_to_date, business_day_diff, calendar_day_diff, parse_date};
pub use normalization::name::clean_name;
pub use polars_utils::{any_to_string, any_to_string_non_empty};
