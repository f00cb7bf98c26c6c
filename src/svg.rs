use crate::interaction::Zoom;
use crate::layout::Viewport;
use crate::measure::TextMetrics;
use crate::scene::{NodeStyle, Scene, SceneEdge, SceneNode};
use std::fmt;

/// Diagram colours. Defaults follow the dark palette of the web front end.
#[derive(Debug, Clone)]
pub struct Theme {
    pub table_fill: &'static str,
    pub border: &'static str,
    pub border_hovered: &'static str,
    pub border_selected: &'static str,
    pub title: &'static str,
    pub column: &'static str,
    pub primary: &'static str,
    pub column_type: &'static str,
    pub edge_start: &'static str,
    pub edge_end: &'static str,
    pub label_fill: &'static str,
    pub label_text: &'static str,
    pub hint_fill: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            table_fill: "#1f2937",
            border: "#374151",
            border_hovered: "#4b5563",
            border_selected: "#6366f1",
            title: "#ffffff",
            column: "#d1d5db",
            primary: "#8b5cf6",
            column_type: "#9ca3af",
            edge_start: "#6366f1",
            edge_end: "#8b5cf6",
            label_fill: "#1f2937",
            label_text: "#9ca3af",
            hint_fill: "#1f2937",
        }
    }
}

/// How a scene is presented: drawing area, zoom, and whether boxes are draggable.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub viewport: Viewport,
    pub zoom: Zoom,
    pub interactive: bool,
}

impl Frame {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            zoom: Zoom::default(),
            interactive: false,
        }
    }
}

#[derive(Default)]
pub struct SvgRenderer {
    metrics: TextMetrics,
    theme: Theme,
}

impl SvgRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            metrics: TextMetrics::default(),
            theme,
        }
    }

    pub fn render(&self, scene: &Scene, frame: &Frame) -> String {
        SvgDocument {
            renderer: self,
            scene,
            frame,
        }
        .to_string()
    }

    fn write_defs(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.theme;
        writeln!(f, "<defs>")?;
        writeln!(
            f,
            r#"<marker id="arrowhead" markerWidth="10" markerHeight="7" refX="10" refY="3.5" orient="auto"><polygon points="0 0, 10 3.5, 0 7" fill="{}" /></marker>"#,
            t.edge_start
        )?;
        writeln!(
            f,
            r#"<linearGradient id="relationGradient" x1="0%" y1="0%" x2="100%" y2="0%"><stop offset="0%" stop-color="{}" /><stop offset="100%" stop-color="{}" /></linearGradient>"#,
            t.edge_start, t.edge_end
        )?;
        writeln!(f, "</defs>")
    }

    fn write_edge(&self, f: &mut fmt::Formatter<'_>, edge: &SceneEdge) -> fmt::Result {
        let g = &edge.geometry;
        let rel = edge.relationship;
        let t = &self.theme;

        writeln!(
            f,
            r#"<g class="relationship" data-from="{}" data-to="{}">"#,
            escape_xml(&rel.from),
            escape_xml(&rel.to)
        )?;
        // Dash offset animates 0 -> 10 forever so the line appears to flow
        writeln!(
            f,
            r#"<path d="{}" fill="none" stroke="url(#relationGradient)" stroke-width="2" marker-end="url(#arrowhead)" stroke-dasharray="5,5" stroke-dashoffset="0"><animate attributeName="stroke-dashoffset" from="0" to="10" dur="1s" repeatCount="indefinite" /></path>"#,
            g.path_data()
        )?;
        writeln!(
            f,
            r#"<rect x="{}" y="{}" width="60" height="14" fill="{}" rx="3" />"#,
            g.label.x - 30.0,
            g.label.y - 10.0,
            t.label_fill
        )?;
        writeln!(
            f,
            r#"<text x="{}" y="{}" text-anchor="middle" fill="{}" font-size="10">{}</text>"#,
            g.label.x,
            g.label.y,
            t.label_text,
            rel.kind.as_str()
        )?;
        writeln!(f, "</g>")
    }

    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &SceneNode,
        interactive: bool,
    ) -> fmt::Result {
        let t = &self.theme;
        let b = &node.bounds;
        let w = b.width;

        let cursor = if interactive { r#" style="cursor: move""# } else { "" };
        writeln!(
            f,
            r#"<g class="table" data-table="{}" transform="translate({}, {})"{}>"#,
            escape_xml(&node.table.name),
            b.x,
            b.y,
            cursor
        )?;

        let (stroke, stroke_width) = match node.style {
            NodeStyle::Selected => (t.border_selected, 3),
            NodeStyle::Hovered => (t.border_hovered, 2),
            NodeStyle::Normal => (t.border, 2),
        };
        writeln!(
            f,
            r#"<rect width="{}" height="{}" rx="6" ry="6" fill="{}" stroke="{}" stroke-width="{}" />"#,
            w, b.height, t.table_fill, stroke, stroke_width
        )?;

        let title = self.metrics.fit_title(&node.table.name, w - 20.0);
        writeln!(
            f,
            r#"<text x="{}" y="25" text-anchor="middle" fill="{}" font-weight="bold" font-size="14">{}</text>"#,
            w / 2.0,
            t.title,
            escape_xml(&title)
        )?;
        writeln!(
            f,
            r#"<line x1="0" y1="40" x2="{}" y2="40" stroke="{}" stroke-width="2" />"#,
            w, t.border
        )?;

        for (i, col) in node.table.columns.iter().enumerate() {
            let y = 40 + i * 30 + 20;

            let typ = self.metrics.fit(&col.typ, w / 2.0 - 10.0);
            let type_width = self.metrics.text_width(&typ);
            // Badge sits just left of the type
            let badge_x = w - 10.0 - type_width - 6.0;
            let badge_width = if col.is_primary { 20.0 } else { 0.0 };
            let name = self
                .metrics
                .fit(&col.name, badge_x - badge_width - 6.0 - 10.0);

            writeln!(f, "<g>")?;
            writeln!(
                f,
                r#"<text x="10" y="{}" fill="{}" font-size="12">{}</text>"#,
                y,
                if col.is_primary { t.primary } else { t.column },
                escape_xml(&name)
            )?;
            writeln!(
                f,
                r#"<text x="{}" y="{}" text-anchor="end" fill="{}" font-size="12">{}</text>"#,
                w - 10.0,
                y,
                t.column_type,
                escape_xml(&typ)
            )?;
            if col.is_primary {
                writeln!(
                    f,
                    r#"<text x="{}" y="{}" text-anchor="end" fill="{}" font-size="10">PK</text>"#,
                    badge_x, y, t.primary
                )?;
            }
            writeln!(f, "</g>")?;
        }

        writeln!(f, "</g>")
    }

    fn write_hint(&self, f: &mut fmt::Formatter<'_>, viewport: &Viewport) -> fmt::Result {
        let y = viewport.height - 16.0 - 24.0;
        writeln!(
            f,
            r#"<g class="hint"><rect x="16" y="{}" width="210" height="24" rx="4" fill="{}" /><text x="24" y="{}" fill="{}" font-size="11">Drag tables to reposition them</text></g>"#,
            y,
            self.theme.hint_fill,
            y + 16.0,
            self.theme.column
        )
    }
}

struct SvgDocument<'a> {
    renderer: &'a SvgRenderer,
    scene: &'a Scene<'a>,
    frame: &'a Frame,
}

impl fmt::Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vp = &self.frame.viewport;

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100%" height="100%" viewBox="0 0 {} {}" style="transform: scale({}); transform-origin: center; transition: transform 0.3s ease">"#,
            vp.width,
            vp.height,
            self.frame.zoom.scale()
        )?;
        self.renderer.write_defs(f)?;

        // Connectors first so boxes paint over them
        for edge in &self.scene.edges {
            self.renderer.write_edge(f, edge)?;
        }
        for node in &self.scene.nodes {
            self.renderer.write_node(f, node, self.frame.interactive)?;
        }

        if self.frame.interactive {
            self.renderer.write_hint(f, vp)?;
        }

        f.write_str("</svg>\n")
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
