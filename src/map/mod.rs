//! Map rendering: the surface abstraction, a headless surface, the adapter
//! that keeps markers in step with the place list, and device geolocation.

mod adapter;
mod geolocation;
mod memory;
mod surface;

pub use adapter::*;
pub use geolocation::*;
pub use memory::*;
pub use surface::*;
