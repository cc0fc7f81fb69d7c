//! Scene entities: points placed on the globe with optional labels.
//!
//! Styling is plain data; the rendering backend interprets it.

use crate::core::geo::{Cartesian3, Cartographic};
use serde::{Deserialize, Serialize};

/// RGBA color with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// A geodetic-or-cartesian point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Position {
    Cartographic(Cartographic),
    Cartesian(Cartesian3),
}

impl Position {
    pub fn from_degrees(longitude: f64, latitude: f64) -> Self {
        Self::Cartographic(Cartographic::from_degrees(longitude, latitude))
    }

    pub fn to_cartesian(&self) -> Cartesian3 {
        match self {
            Self::Cartographic(carto) => carto.to_cartesian(),
            Self::Cartesian(cartesian) => *cartesian,
        }
    }
}

/// Point-marker styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    pub pixel_size: f64,
    pub color: Color,
    pub outline_color: Color,
    pub outline_width: f64,
    pub clamp_to_ground: bool,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            pixel_size: 10.0,
            color: Color::YELLOW,
            outline_color: Color::BLACK,
            outline_width: 2.0,
            clamp_to_ground: false,
        }
    }
}

/// Text-label styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub text: String,
    pub font: String,
    pub pixel_offset: (f64, f64),
    pub fill_color: Color,
    pub outline_color: Color,
    pub outline_width: f64,
}

impl LabelStyle {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: "12pt sans-serif".to_string(),
            pixel_offset: (0.0, -40.0),
            fill_color: Color::WHITE,
            outline_color: Color::BLACK,
            outline_width: 2.0,
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    pub fn with_pixel_offset(mut self, x: f64, y: f64) -> Self {
        self.pixel_offset = (x, y);
        self
    }
}

/// Entity creation payload: a position plus optional point/label styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub position: Position,
    pub point: Option<PointStyle>,
    pub label: Option<LabelStyle>,
}

impl EntitySpec {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            point: None,
            label: None,
        }
    }

    pub fn at_degrees(longitude: f64, latitude: f64) -> Self {
        Self::at(Position::from_degrees(longitude, latitude))
    }

    pub fn with_point(mut self, style: PointStyle) -> Self {
        self.point = Some(style);
        self
    }

    pub fn with_label(mut self, label: LabelStyle) -> Self {
        self.label = Some(label);
        self
    }
}

/// Collection-assigned entity reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub(crate) u64);

/// An entity that lives in a handle's collection
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    pub id: EntityId,
    pub spec: EntitySpec,
}

/// Entities owned by one viewer handle. They exist only between the
/// handle's creation and its destruction.
#[derive(Debug)]
pub struct EntityCollection {
    entities: Vec<SceneEntity>,
    next_id: u64,
}

impl Default for EntityCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityCollection {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, spec: EntitySpec) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(SceneEntity { id, spec });
        id
    }

    /// Removes an entity; returns whether it was present
    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|entity| entity.id != id);
        self.entities.len() != before
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_round_trip() {
        let mut collection = EntityCollection::new();
        let id = collection.add(EntitySpec::at_degrees(-74.0060, 40.7128));
        assert_eq!(collection.len(), 1);
        assert!(collection.get(id).is_some());

        assert!(collection.remove(id));
        assert!(collection.is_empty());
        assert!(!collection.remove(id));
    }

    #[test]
    fn test_clear() {
        let mut collection = EntityCollection::new();
        collection.add(EntitySpec::at_degrees(0.0, 0.0));
        collection.add(
            EntitySpec::at_degrees(-0.1276, 51.5074)
                .with_point(PointStyle::default())
                .with_label(LabelStyle::new("London")),
        );
        assert_eq!(collection.len(), 2);

        collection.clear();
        assert!(collection.is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut collection = EntityCollection::new();
        let first = collection.add(EntitySpec::at_degrees(0.0, 0.0));
        collection.remove(first);
        let second = collection.add(EntitySpec::at_degrees(0.0, 0.0));
        assert_ne!(first, second);
    }

    #[test]
    fn test_position_to_cartesian() {
        let geodetic = Position::from_degrees(-74.0060, 40.7128);
        let cartesian = Position::Cartesian(geodetic.to_cartesian());
        assert_eq!(geodetic.to_cartesian(), cartesian.to_cartesian());
    }
}
