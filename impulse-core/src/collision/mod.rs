//! Contact generation and resolution.
//!
//! - **Detection**: pairwise narrow phase, one routine per pair of shape
//!   types, selected through [`dispatch`]
//! - **Manifold**: the contact record one pair produces per step
//! - **Resolution**: sequential impulses with friction, then positional
//!   correction
//!
//! ## Polygon contact
//!
//! Overlap is found with the separating-axis test over face normals. When no
//! axis separates the pair, the face that is least penetrated becomes the
//! reference face and the other polygon's edge is clipped against it:
//!
//! ```text
//!        incident edge
//!       *-----------*
//!   ====|===========|====  reference face
//!       |  contacts |
//!       side planes
//! ```
//!
//! This yields one or two contact points per pair.

pub mod detection;
pub mod manifold;
pub mod resolution;

pub use detection::{dispatch, CollisionHandler};
pub use manifold::Manifold;
