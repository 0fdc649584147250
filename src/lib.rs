//! # minilex
//!
//! Single-pass tokenizing minifiers for CSS, JavaScript, JSON, XML and
//! HTML, plus the inline-body pipeline that lets `<script>`/`<style>`
//! content inside XML/HTML run through the matching child minifier.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod common;
pub mod css;
pub mod entities;
pub mod error;
pub mod inline;
pub mod js;
pub mod json;
pub mod xml;

pub use css::minify_css;
pub use error::{MinifyError, MinifyResult};
pub use js::minify_js;
pub use json::minify_json;
pub use xml::{minify_html, minify_xml};
