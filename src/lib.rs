pub mod ddl;
pub mod interaction;
pub mod layout;
pub mod measure;
pub mod scene;
pub mod schema;
pub mod store;
pub mod svg;

use wasm_bindgen::prelude::*;

use ddl::{DdlParser, RegexDdlParser, parse_ddl};
use interaction::{Diagram, Mode, Zoom};
use layout::{LayoutConfig, LayoutEngine, Viewport};
use scene::{Highlight, Point, Scene};
use schema::Schema;
use svg::{Frame, SvgRenderer};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Parse DDL into `{ tables, relationships }` JSON
#[wasm_bindgen(js_name = "parseDdl")]
pub fn parse_ddl_json(ddl: &str) -> Result<String, String> {
    serde_json::to_string(&parse_ddl(ddl)).map_err(|e| e.to_string())
}

/// Render DDL straight to a static SVG diagram
#[wasm_bindgen(js_name = "ddlToSvg")]
pub fn render_ddl(ddl: &str, width: f64, height: f64, zoom: Option<f64>) -> String {
    let schema = Schema::from_ddl("", "", ddl, &RegexDdlParser::default());
    render_schema(&schema, Viewport::new(width, height), Zoom::from_scale(zoom.unwrap_or(1.0)))
}

/// Lay out and render a schema without any interaction state.
pub fn render_schema(schema: &Schema, viewport: Viewport, zoom: Zoom) -> String {
    let engine = LayoutEngine::default();
    let positions = engine.layout(&schema.tables, viewport);
    let scene = Scene::build(schema, &positions, &LayoutConfig::default(), Highlight::default());
    let frame = Frame {
        viewport,
        zoom,
        interactive: false,
    };
    SvgRenderer::default().render(&scene, &frame)
}

fn js_error(message: impl std::fmt::Display) -> js_sys::Error {
    js_sys::Error::new(&message.to_string())
}

/// Interactive diagram handle for the schema visualizer page
#[wasm_bindgen]
pub struct SchemaDiagram {
    inner: Diagram,
}

#[wasm_bindgen]
impl SchemaDiagram {
    /// Build from the stored schema JSON
    #[wasm_bindgen(constructor)]
    pub fn new(schema_json: &str, width: f64, height: f64) -> Result<SchemaDiagram, js_sys::Error> {
        let schema: Schema = serde_json::from_str(schema_json).map_err(js_error)?;
        Ok(Self {
            inner: Diagram::new(schema, Viewport::new(width, height)),
        })
    }

    /// Build by parsing DDL text
    #[wasm_bindgen(js_name = "fromDdl")]
    pub fn from_ddl(name: &str, ddl: &str, width: f64, height: f64) -> SchemaDiagram {
        let schema = Schema::from_ddl(name, "", ddl, &RegexDdlParser::default());
        Self {
            inner: Diagram::new(schema, Viewport::new(width, height)),
        }
    }

    #[wasm_bindgen(js_name = "setEditMode")]
    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.inner
            .set_mode(if enabled { Mode::Edit } else { Mode::View });
    }

    #[wasm_bindgen(js_name = "setDdl")]
    pub fn set_ddl(&mut self, ddl: &str) {
        let current = self.inner.schema();
        let parsed = RegexDdlParser::default().parse(ddl);
        let schema = Schema {
            name: current.name.clone(),
            description: current.description.clone(),
            tables: parsed.tables,
            relationships: parsed.relationships,
            ddl: ddl.to_string(),
        };
        self.inner.set_schema(schema);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.inner.resize(Viewport::new(width, height));
    }

    /// Pointer coordinates are relative to the container; zoom is undone here.
    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        let p = self.logical(x, y);
        self.inner.pointer_down(p)
    }

    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let p = self.logical(x, y);
        self.inner.pointer_move(p)
    }

    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&mut self) -> bool {
        self.inner.pointer_up()
    }

    #[wasm_bindgen(js_name = "pointerLeave")]
    pub fn pointer_leave(&mut self) -> bool {
        self.inner.pointer_leave()
    }

    #[wasm_bindgen(js_name = "zoomIn")]
    pub fn zoom_in(&mut self) -> f64 {
        self.inner.zoom_in();
        self.inner.zoom().scale()
    }

    #[wasm_bindgen(js_name = "zoomOut")]
    pub fn zoom_out(&mut self) -> f64 {
        self.inner.zoom_out();
        self.inner.zoom().scale()
    }

    #[wasm_bindgen(js_name = "resetZoom")]
    pub fn reset_zoom(&mut self) -> f64 {
        self.inner.reset_zoom();
        self.inner.zoom().scale()
    }

    pub fn render(&self) -> String {
        self.inner.render()
    }

    #[wasm_bindgen(js_name = "positionsJson")]
    pub fn positions_json(&self) -> Result<String, js_sys::Error> {
        serde_json::to_string(self.inner.positions()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "schemaJson")]
    pub fn schema_json(&self) -> Result<String, js_sys::Error> {
        serde_json::to_string(self.inner.schema()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "exportDdl")]
    pub fn export_ddl(&self) -> String {
        self.inner.export_ddl().into_owned()
    }

    #[wasm_bindgen(js_name = "exportFileName")]
    pub fn export_file_name(&self) -> String {
        self.inner.schema().export_file_name()
    }
}

impl SchemaDiagram {
    fn logical(&self, x: f64, y: f64) -> Point {
        self.inner
            .zoom()
            .to_logical(Point::new(x, y), self.inner.viewport())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ddl_json() {
        let json = parse_ddl_json("CREATE TABLE t (id INT PRIMARY KEY);").unwrap();
        assert!(json.contains("\"isPrimary\":true"));
        assert!(json.contains("\"relationships\":[]"));
    }

    #[test]
    fn test_render_ddl() {
        let svg = render_ddl(
            "CREATE TABLE a (id INT);\nCREATE TABLE b (a_id INT REFERENCES a(id));",
            800.0,
            600.0,
            Some(0.3),
        );
        assert!(svg.contains("scale(0.5)"));
        assert!(svg.contains("data-from=\"b\" data-to=\"a\""));
    }

    #[test]
    fn test_diagram_handle_drag_under_zoom() {
        let mut d = SchemaDiagram::from_ddl("Shop", "CREATE TABLE a (id INT);", 1000.0, 800.0);
        d.set_edit_mode(true);
        assert_eq!(d.zoom_in(), 1.1);
        assert_eq!(d.reset_zoom(), 1.0);
        d.zoom_out();
        d.zoom_out();
        d.zoom_out();
        d.zoom_out();
        d.zoom_out();
        // At 0.5 the box at (50, 50) shows at centre + (50 - centre) * 0.5
        assert!(d.pointer_down(275.0 + 10.0, 225.0 + 10.0));
        assert!(d.pointer_up());
        assert_eq!(d.export_file_name(), "shop_schema.sql");
    }

    #[test]
    fn test_set_ddl_keeps_name() {
        let mut d = SchemaDiagram::from_ddl("Shop", "CREATE TABLE a (id INT);", 1000.0, 800.0);
        d.set_ddl("CREATE TABLE b (id INT);\nCREATE TABLE c (id INT);");
        assert_eq!(d.inner.schema().name, "Shop");
        assert_eq!(d.inner.schema().tables.len(), 2);
        assert!(d.render().contains("data-table=\"c\""));
    }
}
