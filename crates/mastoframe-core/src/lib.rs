//! Core mastoframe library (layout, compositing, pagination, rendering, config).

pub mod caption;
pub mod compose;
pub mod config;
pub mod display;
pub mod error;
pub mod feed;
pub mod font;
pub mod images;
pub mod layout;
pub mod pagination;
pub mod render;
pub mod theme;

#[cfg(test)]
mod testing;
