#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classification;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod observability;
pub mod pipeline;
pub mod util;
