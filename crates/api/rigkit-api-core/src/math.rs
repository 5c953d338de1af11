//! Small 3D vector utility used by pivot and pole-vector placement.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{Result, RigError};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f64 {
        (other - self).length()
    }

    /// Unit vector, or `None` for (near-)zero input.
    pub fn try_normalize(self) -> Option<Vec3> {
        let len = self.length();
        if len <= f64::EPSILON {
            None
        } else {
            Some(self * (1.0 / len))
        }
    }

    pub fn normalize(self) -> Vec3 {
        self.try_normalize().unwrap_or(Vec3::ZERO)
    }

    /// Component of `self` orthogonal to `axis`.
    pub fn reject(self, axis: Vec3) -> Vec3 {
        match axis.try_normalize() {
            Some(unit) => self - unit * self.dot(unit),
            None => self,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Vec3::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

/// Signed cardinal axis, parsed from tokens like `"x+"` or `"z-"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[serde(rename = "x+")]
    XPos,
    #[serde(rename = "x-")]
    XNeg,
    #[serde(rename = "y+")]
    YPos,
    #[serde(rename = "y-")]
    YNeg,
    #[serde(rename = "z+")]
    ZPos,
    #[serde(rename = "z-")]
    ZNeg,
}

impl Axis {
    /// Parse an axis token. The sign defaults to positive (`"x"` == `"x+"`).
    pub fn parse(token: &str) -> Result<Axis> {
        let token = token.trim().to_ascii_lowercase();
        let negative = token.contains('-');
        let axis = match token.chars().next() {
            Some('x') => {
                if negative {
                    Axis::XNeg
                } else {
                    Axis::XPos
                }
            }
            Some('y') => {
                if negative {
                    Axis::YNeg
                } else {
                    Axis::YPos
                }
            }
            Some('z') => {
                if negative {
                    Axis::ZNeg
                } else {
                    Axis::ZPos
                }
            }
            _ => {
                return Err(RigError::UnsupportedConfiguration(format!(
                    "unknown axis token `{token}`"
                )))
            }
        };
        Ok(axis)
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::XPos => Vec3::new(1.0, 0.0, 0.0),
            Axis::XNeg => Vec3::new(-1.0, 0.0, 0.0),
            Axis::YPos => Vec3::new(0.0, 1.0, 0.0),
            Axis::YNeg => Vec3::new(0.0, -1.0, 0.0),
            Axis::ZPos => Vec3::new(0.0, 0.0, 1.0),
            Axis::ZNeg => Vec3::new(0.0, 0.0, -1.0),
        }
    }
}

/// Either a signed-axis token or an already-resolved direction.
/// Aim constraints accept both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSpec {
    Axis(Axis),
    Vector(Vec3),
}

impl AxisSpec {
    pub fn resolve(self) -> Vec3 {
        match self {
            AxisSpec::Axis(axis) => axis.unit(),
            AxisSpec::Vector(v) => v,
        }
    }
}

impl From<Axis> for AxisSpec {
    fn from(a: Axis) -> Self {
        AxisSpec::Axis(a)
    }
}

impl From<Vec3> for AxisSpec {
    fn from(v: Vec3) -> Self {
        AxisSpec::Vector(v)
    }
}

/// Unsigned channel axis, used to name rotate/translate channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelAxis {
    X,
    Y,
    Z,
}

impl ChannelAxis {
    pub fn rotate_attr(self) -> &'static str {
        match self {
            ChannelAxis::X => "rotateX",
            ChannelAxis::Y => "rotateY",
            ChannelAxis::Z => "rotateZ",
        }
    }

    pub fn translate_attr(self) -> &'static str {
        match self {
            ChannelAxis::X => "translateX",
            ChannelAxis::Y => "translateY",
            ChannelAxis::Z => "translateZ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "left={a} right={b}");
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Axis::XPos.unit();
        let y = Axis::YPos.unit();
        assert_eq!(x.cross(y), Axis::ZPos.unit());
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
        assert!(Vec3::ZERO.try_normalize().is_none());
    }

    #[test]
    fn reject_is_orthogonal() {
        let v = Vec3::new(3.0, 4.0, 5.0);
        let axis = Vec3::new(0.0, 2.0, 0.0);
        let r = v.reject(axis);
        approx(r.dot(axis), 0.0);
        approx(r.x, 3.0);
        approx(r.z, 5.0);
    }

    #[test]
    fn axis_tokens_parse() {
        assert_eq!(Axis::parse("x+").unwrap(), Axis::XPos);
        assert_eq!(Axis::parse("Y-").unwrap(), Axis::YNeg);
        assert_eq!(Axis::parse("z").unwrap(), Axis::ZPos);
        assert!(Axis::parse("w").is_err());
    }
}
