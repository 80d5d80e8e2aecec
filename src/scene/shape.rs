use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn y(y: f64) -> Self {
        Self::new(0.0, y, 0.0)
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Applies a z, then y, then x rotation.
    pub fn rotate(self, rotation: Vector) -> Self {
        self.rotate_z(rotation.z).rotate_y(rotation.y).rotate_x(rotation.x)
    }

    pub fn rotate_x(self, angle: f64) -> Self {
        let (y, z) = rotate_pair(self.y, self.z, angle);
        Self::new(self.x, y, z)
    }

    pub fn rotate_y(self, angle: f64) -> Self {
        let (x, z) = rotate_pair(self.x, self.z, angle);
        Self::new(x, self.y, z)
    }

    pub fn rotate_z(self, angle: f64) -> Self {
        let (x, y) = rotate_pair(self.x, self.y, angle);
        Self::new(x, y, self.z)
    }
}

fn rotate_pair(a: f64, b: f64, angle: f64) -> (f64, f64) {
    if angle % std::f64::consts::TAU == 0.0 {
        return (a, b);
    }
    let (sin, cos) = angle.sin_cos();
    (a * cos - b * sin, b * cos + a * sin)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Anchor {
    pub rotate: Vector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hemisphere {
    pub diameter: f64,
    pub stroke: Option<f64>,
    pub color: &'static str,
    pub backface: Option<&'static str>,
    pub translate: Vector,
    pub rotate: Vector,
}

impl Hemisphere {
    /// Color seen from the viewer: the dome color while the dome faces +z,
    /// the backface color otherwise.
    pub fn visible_color(&self, parent: &Anchor) -> &'static str {
        let normal = Vector::new(0.0, 0.0, 1.0).rotate(self.rotate).rotate(parent.rotate);
        if normal.z >= 0.0 {
            self.color
        } else {
            self.backface.unwrap_or(self.color)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ellipse {
    pub diameter: f64,
    pub stroke: f64,
    pub fill: bool,
    pub backface: bool,
    pub color: &'static str,
    pub translate: Vector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Planet,
    Moon,
    Star,
}

/// One projected shape of the render graph, in draw order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub kind: ShapeKind,
    pub position: Vector,
    pub size: f64,
    pub color: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn close(a: Vector, b: Vector) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9 && (a.z - b.z).abs() < 1e-9
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        let v = Vector::new(10.0, 5.0, 0.0).rotate_y(TAU / 4.0);
        assert!(close(v, Vector::new(0.0, 5.0, 10.0)));
    }

    #[test]
    fn test_rotate_full_turn_is_identity() {
        let v = Vector::new(80.0, -20.0, -80.0);
        assert_eq!(v.rotate(Vector::y(TAU)), v);
        assert!(close(v.rotate(Vector::new(0.3, 1.2, -0.7)).rotate_x(-0.3).rotate_y(-1.2).rotate_z(0.7), v));
    }

    #[test]
    fn test_hemisphere_backface() {
        let front = Hemisphere {
            diameter: 140.0,
            stroke: None,
            color: "#3730a3",
            backface: Some("#4338ca"),
            translate: Vector::default(),
            rotate: Vector::default(),
        };
        let anchor = Anchor::default();
        assert_eq!(front.visible_color(&anchor), "#3730a3");

        let turned = Anchor {
            rotate: Vector::y(TAU / 2.0),
        };
        assert_eq!(front.visible_color(&turned), "#4338ca");
    }
}
