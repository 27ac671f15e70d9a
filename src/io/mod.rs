//! On-disk interchange formats. Each encoder is stateless; the engine picks
//! which ones run and where their output lands.

pub mod dxf;
pub mod glb;
pub mod step;
pub mod stl;
