pub mod build_info;
pub mod cli;
pub mod comm;
pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod par_slice;
pub mod solver;
pub mod stencil;
pub mod util;
