//! Geometry kernel for the smallest-enclosing-circle workbench.
//!
//! This crate owns everything that carries real weight in the application:
//! the mapping between integer window pixels and the real plane, the scene
//! of labeled points and its on-disk format, the enclosing-circle solver,
//! and the layered renderer. The desktop shell in the root crate only wires
//! window events into [`engine::EngineCore`] and presents the pixels it
//! paints.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Event dispatch, shortcuts, and the owned scene |
//! | [`vector`] | Integer and real 2D vectors |
//! | [`camera`] | Window/real coordinate systems and the pixel mapping |
//! | [`scene`] | Labeled points and the mutable scene document |
//! | [`store`] | JSON scene file load/save |
//! | [`solver`] | Welzl's smallest enclosing circle |
//! | [`render`] | `Painter` abstraction and the layered scene renderer |
//! | [`raster`] | Software `Painter` over a `u32` pixel buffer |
//! | [`input`] | Input event types and application modes |
//! | [`log`] | Bounded log panel mirrored to `tracing` |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod consts;
pub mod engine;
pub mod input;
pub mod log;
pub mod raster;
pub mod render;
pub mod scene;
pub mod solver;
pub mod store;
pub mod vector;
