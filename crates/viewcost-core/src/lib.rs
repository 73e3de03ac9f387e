pub mod consts;
pub mod cost;
pub mod diff;
pub mod error;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod sat;
pub mod sphere;
pub mod viewport;
