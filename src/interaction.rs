//! Edit-mode session: dragging table boxes, hover highlighting and zoom.

use std::borrow::Cow;

use crate::layout::{LayoutEngine, Positions, TablePosition, Viewport};
use crate::scene::{EdgeGeometry, Highlight, Point, Scene, edge_geometries, update_edges_for};
use crate::schema::Schema;
use crate::svg::{Frame, SvgRenderer};

/// Visual scale, kept in tenths so repeated steps never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom {
    tenths: u8,
}

impl Zoom {
    const MIN: u8 = 5;
    const MAX: u8 = 20;
    const DEFAULT: u8 = 10;

    /// Nearest step to `scale`, clamped to 0.5..=2.0.
    pub fn from_scale(scale: f64) -> Self {
        let tenths = if scale.is_finite() {
            (scale * 10.0)
                .round()
                .clamp(Self::MIN as f64, Self::MAX as f64) as u8
        } else {
            Self::DEFAULT
        };
        Self { tenths }
    }

    pub fn scale(&self) -> f64 {
        self.tenths as f64 / 10.0
    }

    pub fn zoom_in(self) -> Self {
        Self {
            tenths: (self.tenths + 1).min(Self::MAX),
        }
    }

    pub fn zoom_out(self) -> Self {
        Self {
            tenths: self.tenths.saturating_sub(1).max(Self::MIN),
        }
    }

    pub fn reset(self) -> Self {
        Self::default()
    }

    /// Map a point on the scaled surface back to diagram coordinates.
    ///
    /// The scale is applied around the viewport centre.
    pub fn to_logical(&self, point: Point, viewport: Viewport) -> Point {
        let (cx, cy) = viewport.center();
        let s = self.scale();
        Point::new(cx + (point.x - cx) / s, cy + (point.y - cy) / s)
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            tenths: Self::DEFAULT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    View,
    Edit,
}

/// At most one table is dragged at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        table: String,
        /// Pointer position relative to the box origin when the drag began
        offset: Point,
    },
}

impl DragState {
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Dragging { table, .. } => Some(table),
        }
    }
}

/// A schema on screen: positions, cached connector geometry and pointer state.
pub struct Diagram {
    schema: Schema,
    engine: LayoutEngine,
    renderer: SvgRenderer,
    viewport: Viewport,
    positions: Positions,
    edges: Vec<Option<EdgeGeometry>>,
    mode: Mode,
    hovered: Option<String>,
    drag: DragState,
    zoom: Zoom,
}

impl Diagram {
    pub fn new(schema: Schema, viewport: Viewport) -> Self {
        Self::with_engine(schema, viewport, LayoutEngine::default())
    }

    pub fn with_engine(schema: Schema, viewport: Viewport, engine: LayoutEngine) -> Self {
        let mut diagram = Self {
            schema,
            engine,
            renderer: SvgRenderer::default(),
            viewport,
            positions: Positions::new(),
            edges: Vec::new(),
            mode: Mode::default(),
            hovered: None,
            drag: DragState::Idle,
            zoom: Zoom::default(),
        };
        diagram.relayout();
        diagram
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    pub fn position(&self, table: &str) -> Option<&TablePosition> {
        self.positions.get(table)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replace the schema. Positions are recomputed from scratch.
    pub fn set_schema(&mut self, schema: Schema) {
        self.schema = schema;
        self.drag = DragState::Idle;
        self.hovered = None;
        self.relayout();
    }

    /// Change the drawing area. Existing positions are kept.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn relayout(&mut self) {
        self.positions = self.engine.layout(&self.schema.tables, self.viewport);
        self.edges = edge_geometries(&self.schema, &self.positions, &self.engine.config);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode == Mode::View {
            self.drag = DragState::Idle;
            self.hovered = None;
        }
        self.mode = mode;
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = self.zoom.reset();
    }

    pub fn set_zoom(&mut self, zoom: Zoom) {
        self.zoom = zoom;
    }

    fn table_at(&self, point: Point) -> Option<String> {
        self.scene()
            .node_at(point)
            .map(|node| node.table.name.clone())
    }

    /// Start dragging the table under `point` (diagram coordinates).
    ///
    /// Returns true when a drag began.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        if self.mode != Mode::Edit {
            return false;
        }
        let Some(table) = self.table_at(point) else {
            return false;
        };
        let Some(bounds) = self.positions.get(&table) else {
            return false;
        };

        let offset = Point::new(point.x - bounds.x, point.y - bounds.y);
        tracing::trace!(%table, "drag start");
        self.drag = DragState::Dragging { table, offset };
        true
    }

    /// Move the dragged table, or track hover when idle.
    ///
    /// Returns true when anything visible changed.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        if self.mode != Mode::Edit {
            return false;
        }

        match &self.drag {
            DragState::Dragging { table, offset } => {
                let Some(bounds) = self.positions.get_mut(table) else {
                    return false;
                };
                bounds.x = point.x - offset.x;
                bounds.y = point.y - offset.y;

                update_edges_for(
                    &self.schema,
                    &self.positions,
                    &self.engine.config,
                    table,
                    &mut self.edges,
                );
                true
            }
            DragState::Idle => {
                let hovered = self.table_at(point);
                if hovered != self.hovered {
                    self.hovered = hovered;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// End the drag and clear the selection.
    pub fn pointer_up(&mut self) -> bool {
        match std::mem::take(&mut self.drag) {
            DragState::Dragging { table, .. } => {
                tracing::trace!(%table, "drag end");
                true
            }
            DragState::Idle => false,
        }
    }

    /// The pointer left the drawing area: same as releasing it, and nothing is hovered.
    pub fn pointer_leave(&mut self) -> bool {
        let ended = self.pointer_up();
        let unhovered = self.hovered.take().is_some();
        ended || unhovered
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene::with_geometry(
            &self.schema,
            &self.positions,
            &self.edges,
            Highlight {
                selected: self.drag.table(),
                hovered: self.hovered.as_deref(),
            },
        )
    }

    pub fn frame(&self) -> Frame {
        Frame {
            viewport: self.viewport,
            zoom: self.zoom,
            interactive: self.mode == Mode::Edit,
        }
    }

    pub fn render(&self) -> String {
        self.renderer.render(&self.scene(), &self.frame())
    }

    /// DDL offered for copy/download: the original text when there is one,
    /// regenerated from the tables otherwise.
    pub fn export_ddl(&self) -> Cow<'_, str> {
        if self.schema.ddl.trim().is_empty() {
            Cow::Owned(self.schema.to_ddl())
        } else {
            Cow::Borrowed(&self.schema.ddl)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::RegexDdlParser;

    const DDL: &str = "CREATE TABLE users (id INT PRIMARY KEY, name TEXT);\nCREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users(id));\nCREATE TABLE tags (id INT PRIMARY KEY);";

    fn diagram() -> Diagram {
        let schema = Schema::from_ddl("Shop", "", DDL, &RegexDdlParser::default());
        Diagram::new(schema, Viewport::new(1200.0, 800.0))
    }

    #[test]
    fn test_zoom_steps_and_clamp() {
        let mut z = Zoom::default();
        assert_eq!(z.scale(), 1.0);

        for _ in 0..20 {
            z = z.zoom_in();
        }
        assert_eq!(z.scale(), 2.0);

        for _ in 0..30 {
            z = z.zoom_out();
        }
        assert_eq!(z.scale(), 0.5);

        assert_eq!(z.reset().scale(), 1.0);
        assert_eq!(Zoom::default().zoom_in().zoom_in().zoom_in().scale(), 1.3);
    }

    #[test]
    fn test_zoom_from_scale() {
        assert_eq!(Zoom::from_scale(0.1).scale(), 0.5);
        assert_eq!(Zoom::from_scale(3.0).scale(), 2.0);
        assert_eq!(Zoom::from_scale(1.26).scale(), 1.3);
        assert_eq!(Zoom::from_scale(f64::NAN).scale(), 1.0);
    }

    #[test]
    fn test_zoom_to_logical() {
        let vp = Viewport::new(1000.0, 800.0);
        let z = Zoom::from_scale(2.0);
        assert_eq!(z.to_logical(Point::new(500.0, 400.0), vp), Point::new(500.0, 400.0));
        assert_eq!(z.to_logical(Point::new(700.0, 400.0), vp), Point::new(600.0, 400.0));
    }

    #[test]
    fn test_view_mode_ignores_pointer() {
        let mut d = diagram();
        assert!(!d.pointer_down(Point::new(60.0, 60.0)));
        assert_eq!(d.drag_state(), &DragState::Idle);
        assert!(!d.pointer_move(Point::new(100.0, 100.0)));
    }

    #[test]
    fn test_drag_moves_only_dragged_table() {
        let mut d = diagram();
        d.set_mode(Mode::Edit);

        let users_before = *d.position("users").unwrap();
        let tags_before = *d.position("tags").unwrap();
        let orders_before = *d.position("orders").unwrap();

        // orders sits at (310, 50); grab it 20/10 inside its origin
        assert!(d.pointer_down(Point::new(330.0, 60.0)));
        assert_eq!(
            d.drag_state(),
            &DragState::Dragging {
                table: "orders".into(),
                offset: Point::new(20.0, 10.0)
            }
        );

        assert!(d.pointer_move(Point::new(520.0, 460.0)));
        let orders = d.position("orders").unwrap();
        assert_eq!((orders.x, orders.y), (500.0, 450.0));
        assert_eq!((orders.width, orders.height), (orders_before.width, orders_before.height));

        assert_eq!(d.position("users").unwrap(), &users_before);
        assert_eq!(d.position("tags").unwrap(), &tags_before);

        assert!(d.pointer_up());
        assert_eq!(d.drag_state(), &DragState::Idle);
        assert!(!d.pointer_up());
    }

    #[test]
    fn test_drag_updates_connector() {
        let mut d = diagram();
        d.set_mode(Mode::Edit);
        let before = d.scene().edges[0].geometry;

        d.pointer_down(Point::new(330.0, 60.0));
        d.pointer_move(Point::new(70.0, 560.0));

        let after = d.scene().edges[0].geometry;
        assert_ne!(before, after);
        // orders is now directly below users
        assert_eq!(after.side, crate::scene::Side::Top);
        let expected = EdgeGeometry::between(
            d.schema(),
            &d.schema().relationships[0],
            d.positions(),
            &crate::layout::LayoutConfig::default(),
        );
        assert_eq!(Some(after), expected);
    }

    #[test]
    fn test_selected_style_while_dragging() {
        let mut d = diagram();
        d.set_mode(Mode::Edit);
        d.pointer_down(Point::new(60.0, 60.0));

        let scene = d.scene();
        let users = scene.nodes.iter().find(|n| n.table.name == "users").unwrap();
        assert_eq!(users.style, crate::scene::NodeStyle::Selected);
        assert!(d.render().contains(r##"stroke="#6366f1" stroke-width="3""##));
    }

    #[test]
    fn test_hover_tracking() {
        let mut d = diagram();
        d.set_mode(Mode::Edit);

        assert!(d.pointer_move(Point::new(60.0, 60.0)));
        assert_eq!(d.hovered(), Some("users"));
        assert!(!d.pointer_move(Point::new(70.0, 70.0)));

        assert!(d.pointer_move(Point::new(5.0, 5.0)));
        assert_eq!(d.hovered(), None);

        d.pointer_move(Point::new(60.0, 60.0));
        assert!(d.pointer_leave());
        assert_eq!(d.hovered(), None);
    }

    #[test]
    fn test_leave_ends_drag() {
        let mut d = diagram();
        d.set_mode(Mode::Edit);
        d.pointer_down(Point::new(60.0, 60.0));
        assert!(d.pointer_leave());
        assert_eq!(d.drag_state(), &DragState::Idle);
    }

    #[test]
    fn test_leaving_edit_mode_resets() {
        let mut d = diagram();
        d.set_mode(Mode::Edit);
        d.pointer_down(Point::new(60.0, 60.0));
        d.set_mode(Mode::View);
        assert_eq!(d.drag_state(), &DragState::Idle);
        assert!(!d.render().contains("cursor: move"));
    }

    #[test]
    fn test_set_schema_relayouts() {
        let mut d = diagram();
        d.set_mode(Mode::Edit);
        d.pointer_down(Point::new(60.0, 60.0));
        d.pointer_move(Point::new(600.0, 600.0));

        let schema = d.schema().clone();
        d.set_schema(schema);
        assert_eq!(d.position("users").map(|p| (p.x, p.y)), Some((50.0, 50.0)));
        assert_eq!(d.drag_state(), &DragState::Idle);
    }

    #[test]
    fn test_zoom_does_not_move_tables() {
        let mut d = diagram();
        let before = d.positions().clone();
        d.zoom_in();
        d.zoom_in();
        assert_eq!(d.positions(), &before);
        assert!(d.render().contains("scale(1.2)"));
        d.reset_zoom();
        assert_eq!(d.zoom().scale(), 1.0);
    }

    #[test]
    fn test_export_ddl() {
        let d = diagram();
        assert_eq!(d.export_ddl(), DDL);

        let mut schema = d.schema().clone();
        schema.ddl.clear();
        let d = Diagram::new(schema, Viewport::default());
        assert!(d.export_ddl().starts_with("CREATE TABLE users (\n  id INT PRIMARY KEY,"));
    }
}
