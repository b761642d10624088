//! Python bindings for the impulse-core 2D physics engine.
//!
//! Provides a simple Python API:
//!
//! ```python
//! from impulse_physics import World
//!
//! world = World(1.0 / 60.0, 10)
//! floor = world.add_box(300.0, 20.0, 400.0, 320.0)
//! world.set_static(floor)
//! world.set_orient(floor, 0.0)
//! ball = world.add_circle(20.0, 400.0, 40.0)
//!
//! for _ in range(120):
//!     world.step()
//!     pos = world.body_position(ball)
//!     print(f"Ball at ({pos.x}, {pos.y})")
//! ```
//!
//! Bodies are addressed by the index `add_*` returned. Indices shift when
//! bodies are removed with `remove_outside`.

use pyo3::exceptions::{PyIndexError, PyValueError};
use pyo3::prelude::*;

use impulse_core::{
    Aabb, Body, Material, Shape, Vec2 as CoreVec2, World as CoreWorld, WorldConfig,
};

/// 2D vector for positions and velocities.
#[pyclass]
#[derive(Clone, Copy)]
pub struct Vec2 {
    #[pyo3(get, set)]
    pub x: f64,
    #[pyo3(get, set)]
    pub y: f64,
}

#[pymethods]
impl Vec2 {
    #[new]
    fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn __repr__(&self) -> String {
        format!("Vec2({:.4}, {:.4})", self.x, self.y)
    }

    fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    fn to_tuple(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl From<CoreVec2> for Vec2 {
    fn from(v: CoreVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// A simulation world. The host owns the loop and calls `step()` once per
/// tick.
#[pyclass]
pub struct World {
    inner: CoreWorld,
}

impl World {
    fn get(&self, index: usize) -> PyResult<&Body> {
        self.inner
            .body(index)
            .ok_or_else(|| PyIndexError::new_err(format!("no body at index {index}")))
    }

    fn get_mut(&mut self, index: usize) -> PyResult<&mut Body> {
        self.inner
            .body_mut(index)
            .ok_or_else(|| PyIndexError::new_err(format!("no body at index {index}")))
    }

    fn add_shape(&mut self, shape: Shape, x: f64, y: f64) -> PyResult<usize> {
        self.inner
            .add(shape, x, y)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(self.inner.len() - 1)
    }
}

#[pymethods]
impl World {
    #[new]
    #[pyo3(signature = (dt = 1.0 / 60.0, iterations = 10))]
    fn new(dt: f64, iterations: usize) -> PyResult<Self> {
        let inner = CoreWorld::new(dt, iterations).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Build a world from a YAML configuration file.
    #[staticmethod]
    fn from_config(path: &str) -> PyResult<Self> {
        let inner = WorldConfig::load(path)
            .and_then(CoreWorld::with_config)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Add a circle and return its body index.
    fn add_circle(&mut self, radius: f64, x: f64, y: f64) -> PyResult<usize> {
        self.add_shape(Shape::circle(radius), x, y)
    }

    /// Add an axis-aligned box (before the random initial rotation).
    fn add_box(&mut self, half_width: f64, half_height: f64, x: f64, y: f64) -> PyResult<usize> {
        self.add_shape(Shape::rect(half_width, half_height), x, y)
    }

    /// Add the convex hull of `points`.
    fn add_polygon(&mut self, points: Vec<(f64, f64)>, x: f64, y: f64) -> PyResult<usize> {
        let points: Vec<CoreVec2> = points.into_iter().map(CoreVec2::from).collect();
        let shape = Shape::polygon(&points).map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.add_shape(shape, x, y)
    }

    fn set_static(&mut self, index: usize) -> PyResult<()> {
        self.get_mut(index)?.set_static();
        Ok(())
    }

    /// Set the absolute orientation in radians.
    fn set_orient(&mut self, index: usize, radians: f64) -> PyResult<()> {
        self.get_mut(index)?.set_orient(radians);
        Ok(())
    }

    fn set_material(
        &mut self,
        index: usize,
        static_friction: f64,
        dynamic_friction: f64,
        restitution: f64,
    ) -> PyResult<()> {
        let material = Material::new(static_friction, dynamic_friction, restitution);
        material
            .validate()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.get_mut(index)?.set_material(material);
        Ok(())
    }

    fn set_velocity(&mut self, index: usize, vx: f64, vy: f64) -> PyResult<()> {
        self.get_mut(index)?.velocity = CoreVec2::new(vx, vy);
        Ok(())
    }

    /// Accumulate a force for the next step.
    fn apply_force(&mut self, index: usize, fx: f64, fy: f64) -> PyResult<()> {
        self.get_mut(index)?.apply_force(CoreVec2::new(fx, fy));
        Ok(())
    }

    /// Advance one fixed tick.
    fn step(&mut self) {
        self.inner.step();
    }

    /// Run multiple steps at once.
    fn step_n(&mut self, steps: usize) {
        for _ in 0..steps {
            self.inner.step();
        }
    }

    fn body_count(&self) -> usize {
        self.inner.len()
    }

    fn body_position(&self, index: usize) -> PyResult<Vec2> {
        Ok(self.get(index)?.position.into())
    }

    fn body_velocity(&self, index: usize) -> PyResult<Vec2> {
        Ok(self.get(index)?.velocity.into())
    }

    fn body_orient(&self, index: usize) -> PyResult<f64> {
        Ok(self.get(index)?.orient())
    }

    /// Bounds as `(min_x, min_y, max_x, max_y)`.
    fn body_aabb(&self, index: usize) -> PyResult<(f64, f64, f64, f64)> {
        let aabb = self.get(index)?.aabb();
        Ok((aabb.min.x, aabb.min.y, aabb.max.x, aabb.max.y))
    }

    /// Radius for circles, `None` for polygons.
    fn circle_radius(&self, index: usize) -> PyResult<Option<f64>> {
        Ok(self.get(index)?.shape().as_circle().map(|c| c.radius))
    }

    /// World-space outline; empty for circles.
    fn polygon_vertices(&self, index: usize) -> PyResult<Vec<(f64, f64)>> {
        Ok(self
            .get(index)?
            .world_vertices()
            .into_iter()
            .map(|v| (v.x, v.y))
            .collect())
    }

    /// Contact points and normals from the last step, as
    /// `((px, py), (nx, ny))`.
    fn contacts(&self) -> Vec<((f64, f64), (f64, f64))> {
        self.inner
            .contacts()
            .iter()
            .flat_map(|m| {
                let n = (m.normal.x, m.normal.y);
                m.active_contacts().iter().map(move |p| ((p.x, p.y), n))
            })
            .collect()
    }

    /// Drop every body whose center has left the given rectangle. Returns
    /// how many were removed.
    fn remove_outside(&mut self, x: f64, y: f64, width: f64, height: f64) -> usize {
        let bounds = Aabb::from_rect(x, y, width, height);
        let before = self.inner.len();
        self.inner.retain(|body| body.is_within(&bounds));
        before - self.inner.len()
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn __repr__(&self) -> String {
        format!(
            "World(bodies={}, contacts={})",
            self.inner.len(),
            self.inner.contacts().len()
        )
    }
}

/// Python module definition.
#[pymodule]
fn impulse_physics(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Vec2>()?;
    m.add_class::<World>()?;
    Ok(())
}
