mod container;
mod injectable;
mod injector;

pub use container::Container;
pub use injectable::{Controller, Injectable, Routes};
pub use injector::Injector;
