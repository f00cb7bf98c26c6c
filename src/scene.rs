//! Retained scene graph: table nodes and connector edges derived from a
//! schema and its table positions.
//!
//! Nothing here touches drawing primitives. The renderer turns a [`Scene`]
//! into SVG; interaction only ever changes the position map and asks for
//! the affected edges to be recomputed.

use crate::layout::{LayoutConfig, Positions, TablePosition};
use crate::schema::{Relationship, Schema, Table, distinct_tables};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which side of the source box a connector leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Source is left of the target: leave right, enter target's left
    Right,
    /// Source is right of the target: leave left, enter target's right
    Left,
    /// Source is above the target: leave bottom, enter target's top
    Bottom,
    /// Source is below (or on top of) the target: leave top, enter target's bottom
    Top,
}

/// Curve and label placement of one relationship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    pub start: Point,
    pub end: Point,
    pub control1: Point,
    pub control2: Point,
    pub label: Point,
    pub side: Side,
}

impl EdgeGeometry {
    /// Geometry for `rel`, or `None` when either table has no position.
    pub fn between(
        schema: &Schema,
        rel: &Relationship,
        positions: &Positions,
        config: &LayoutConfig,
    ) -> Option<Self> {
        let from = positions.get(&rel.from)?;
        let to = positions.get(&rel.to)?;

        let from_y = row_anchor_y(schema, &rel.from, &rel.from_column, from, config);
        let to_y = row_anchor_y(schema, &rel.to, &rel.to_column, to, config);

        let (side, start, end) = if from.x < to.x {
            (
                Side::Right,
                Point::new(from.x + from.width, from_y),
                Point::new(to.x, to_y),
            )
        } else if from.x > to.x {
            (
                Side::Left,
                Point::new(from.x, from_y),
                Point::new(to.x + to.width, to_y),
            )
        } else if from.y < to.y {
            (
                Side::Bottom,
                Point::new(from.x + from.width / 2.0, from.y + from.height),
                Point::new(to.x + to.width / 2.0, to.y),
            )
        } else {
            (
                Side::Top,
                Point::new(from.x + from.width / 2.0, from.y),
                Point::new(to.x + to.width / 2.0, to.y + to.height),
            )
        };

        let dx = (end.x - start.x).abs() / 2.0;
        let (control1, control2) = if start.x < end.x {
            (Point::new(start.x + dx, start.y), Point::new(end.x - dx, end.y))
        } else {
            (Point::new(start.x - dx, start.y), Point::new(end.x + dx, end.y))
        };

        Some(Self {
            start,
            end,
            control1,
            control2,
            label: Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0 - 10.0),
            side,
        })
    }

    /// SVG path data for the cubic bezier.
    pub fn path_data(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }
}

/// Vertical centre of a column's row; unknown tables or columns use row 0.
fn row_anchor_y(
    schema: &Schema,
    table: &str,
    column: &str,
    bounds: &TablePosition,
    config: &LayoutConfig,
) -> f64 {
    let row = schema
        .table(table)
        .and_then(|t| t.column_index(column))
        .unwrap_or(0);
    bounds.y + config.header_height + row as f64 * config.row_height + config.row_height / 2.0
}

/// Geometry for every relationship, indexed like `schema.relationships`.
pub fn edge_geometries(
    schema: &Schema,
    positions: &Positions,
    config: &LayoutConfig,
) -> Vec<Option<EdgeGeometry>> {
    schema
        .relationships
        .iter()
        .map(|rel| {
            let geometry = EdgeGeometry::between(schema, rel, positions, config);
            if geometry.is_none() {
                tracing::debug!(from = %rel.from, to = %rel.to, "skipping edge to unplaced table");
            }
            geometry
        })
        .collect()
}

/// Recompute only the edges touching `table`. Returns how many were updated.
pub fn update_edges_for(
    schema: &Schema,
    positions: &Positions,
    config: &LayoutConfig,
    table: &str,
    geometries: &mut [Option<EdgeGeometry>],
) -> usize {
    let mut updated = 0;
    for (rel, slot) in schema.relationships.iter().zip(geometries.iter_mut()) {
        if rel.touches(table) {
            *slot = EdgeGeometry::between(schema, rel, positions, config);
            updated += 1;
        }
    }
    updated
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStyle {
    #[default]
    Normal,
    Hovered,
    Selected,
}

/// Which tables are hovered or selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Highlight<'a> {
    pub selected: Option<&'a str>,
    pub hovered: Option<&'a str>,
}

impl Highlight<'_> {
    fn style_of(&self, table: &str) -> NodeStyle {
        if self.selected == Some(table) {
            NodeStyle::Selected
        } else if self.hovered == Some(table) {
            NodeStyle::Hovered
        } else {
            NodeStyle::Normal
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode<'a> {
    pub table: &'a Table,
    pub bounds: TablePosition,
    pub style: NodeStyle,
}

#[derive(Debug, Clone)]
pub struct SceneEdge<'a> {
    /// Index into `Schema::relationships`
    pub index: usize,
    pub relationship: &'a Relationship,
    pub geometry: EdgeGeometry,
}

#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub nodes: Vec<SceneNode<'a>>,
    pub edges: Vec<SceneEdge<'a>>,
}

impl<'a> Scene<'a> {
    pub fn build(
        schema: &'a Schema,
        positions: &Positions,
        config: &LayoutConfig,
        highlight: Highlight<'_>,
    ) -> Self {
        let geometries = edge_geometries(schema, positions, config);
        Self::with_geometry(schema, positions, &geometries, highlight)
    }

    /// Assemble a scene from already computed edge geometry.
    pub fn with_geometry(
        schema: &'a Schema,
        positions: &Positions,
        geometries: &[Option<EdgeGeometry>],
        highlight: Highlight<'_>,
    ) -> Self {
        let nodes = distinct_tables(&schema.tables)
            .filter_map(|table| {
                positions.get(&table.name).map(|bounds| SceneNode {
                    table,
                    bounds: *bounds,
                    style: highlight.style_of(&table.name),
                })
            })
            .collect();

        let edges = schema
            .relationships
            .iter()
            .zip(geometries)
            .enumerate()
            .filter_map(|(index, (relationship, geometry))| {
                geometry.as_ref().map(|geometry| SceneEdge {
                    index,
                    relationship,
                    geometry: *geometry,
                })
            })
            .collect();

        Self { nodes, edges }
    }

    /// Topmost node under the point. Later nodes are drawn over earlier ones.
    pub fn node_at(&self, point: Point) -> Option<&SceneNode<'a>> {
        self.nodes
            .iter()
            .rev()
            .find(|n| n.bounds.contains(point.x, point.y))
    }
}
