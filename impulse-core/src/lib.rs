//! # Impulse Core
//!
//! A 2D rigid body physics engine for circles and convex polygons.
//!
//! ## Architecture
//!
//! - `types`: Core math (Vec2, Mat2, Aabb) and engine constants
//! - `shape`: Circle and convex polygon geometry, hulls, mass properties
//! - `body`: Rigid bodies and surface materials
//! - `collision`: Narrow-phase detection, contact manifolds, impulse solver
//! - `integrator`: Semi-implicit Euler time integration
//! - `config`: YAML world configuration and material presets
//! - `world`: Body ownership and the fixed-step pipeline
//!
//! ## Usage
//!
//! ```
//! use impulse_core::{Shape, World};
//!
//! let mut world = World::new(1.0 / 60.0, 10).unwrap();
//! world.add(Shape::rect(300.0, 20.0), 400.0, 320.0).unwrap().set_static().set_orient(0.0);
//! world.add(Shape::circle(20.0), 400.0, 40.0).unwrap();
//!
//! for _ in 0..120 {
//!     world.step();
//! }
//! assert!(world.bodies()[1].position.y > 40.0);
//! ```

pub mod body;
pub mod collision;
pub mod config;
pub mod error;
pub mod integrator;
pub mod shape;
pub mod types;
pub mod world;

pub use body::{Body, Material};
pub use collision::Manifold;
pub use config::{MaterialLoader, WorldConfig};
pub use error::{ConfigError, PhysicsError};
pub use shape::{Circle, MassData, Polygon, Shape, ShapeType};
pub use types::{Aabb, Mat2, Vec2};
pub use world::World;
