#![allow(dead_code)]

mod fakes;
mod given;
mod test_context;

pub use fakes::*;
pub use given::*;
pub use test_context::*;
