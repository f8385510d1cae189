#![allow(dead_code)]

pub mod builders;
pub mod navigation;
pub mod strategies;

pub use builders::*;
pub use navigation::*;
pub use strategies::*;
