use nalgebra::Vector3;
use precision_analysis::geometry::{EulerZyx, Point as CorePoint};
use precision_analysis::io::parse_points;
use pyo3::prelude::*;

/// Measured pose: position plus Z-Y-X Euler angles in radians.
#[pyclass]
#[derive(Clone)]
struct Point {
    inner: CorePoint,
}

#[pymethods]
impl Point {
    #[new]
    fn new(position: [f64; 3], angles: [f64; 3]) -> Self {
        Self {
            inner: CorePoint::new(Vector3::from(position), Vector3::from(angles)),
        }
    }

    #[getter]
    fn m_position(&self) -> [f64; 3] {
        self.inner.position.into()
    }

    #[setter]
    fn set_m_position(&mut self, value: [f64; 3]) {
        self.inner.position = Vector3::from(value);
    }

    /// Angles as `[z, y, x]`.
    #[getter]
    fn m_angles(&self) -> [f64; 3] {
        self.inner.orientation.to_vector().into()
    }

    #[setter]
    fn set_m_angles(&mut self, value: [f64; 3]) {
        self.inner.orientation = EulerZyx::from_vector(Vector3::from(value));
    }

    fn __repr__(&self) -> String {
        let p = self.inner.position;
        let a = self.inner.orientation;
        format!(
            "Point(m_position=[{}, {}, {}], m_angles=[{}, {}, {}])",
            p.x, p.y, p.z, a.z, a.y, a.x
        )
    }
}

/// parse data (num, position, angles)
#[pyfunction]
fn parser(data: &str) -> Vec<Point> {
    parse_points(data)
        .into_iter()
        .map(|inner| Point { inner })
        .collect()
}

#[pymodule]
fn precision_analysis_python(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Point>()?;
    m.add_function(wrap_pyfunction!(parser, m)?)?;
    Ok(())
}
