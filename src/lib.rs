//! bizmap - Search HERE and Yelp for businesses, classify and filter them,
//! and render the results on a map

pub mod api;
pub mod classify;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod geometry;
pub mod render;
