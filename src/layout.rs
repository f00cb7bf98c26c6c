//! Row-packing layout of table boxes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::schema::{Table, distinct_tables};

/// Box of one table in diagram space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TablePosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TablePosition {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Table name -> box.
pub type Positions = HashMap<String, TablePosition>;

/// Size of the drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub start_x: f64,
    pub start_y: f64,
    pub table_width: f64,
    /// Gap between boxes, both horizontally and between rows
    pub spacing: f64,
    /// Right-hand margin kept free before wrapping
    pub margin: f64,
    pub header_height: f64,
    pub row_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            start_x: 50.0,
            start_y: 50.0,
            table_width: 220.0,
            spacing: 40.0,
            margin: 50.0,
            header_height: 40.0,
            row_height: 30.0,
        }
    }
}

impl LayoutConfig {
    pub fn table_height(&self, column_count: usize) -> f64 {
        self.header_height + self.row_height * column_count as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    pub config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Place tables left to right, wrapping to a new row before a box would
    /// cross the right margin. A redefined table only takes the slot of its
    /// last definition.
    pub fn layout(&self, tables: &[Table], viewport: Viewport) -> Positions {
        let c = &self.config;
        let mut positions = Positions::with_capacity(tables.len());

        let mut x = c.start_x;
        let mut y = c.start_y;
        let mut row_height: f64 = 0.0;
        let mut row_len = 0usize;

        for table in distinct_tables(tables) {
            let height = c.table_height(table.columns.len());

            // A box wider than the viewport still gets a row of its own
            if row_len > 0 && x + c.table_width > viewport.width - c.margin {
                x = c.start_x;
                y += row_height + c.spacing;
                row_height = 0.0;
                row_len = 0;
            }

            positions.insert(
                table.name.clone(),
                TablePosition {
                    x,
                    y,
                    width: c.table_width,
                    height,
                },
            );

            x += c.table_width + c.spacing;
            row_height = row_height.max(height);
            row_len += 1;
        }

        tracing::debug!(tables = tables.len(), "laid out tables");
        positions
    }

    /// Extent covering every box plus the start margin on the far sides.
    pub fn bounds(&self, positions: &Positions) -> Viewport {
        let (w, h) = positions.values().fold((0.0f64, 0.0f64), |(w, h), p| {
            (w.max(p.x + p.width), h.max(p.y + p.height))
        });
        Viewport::new(w + self.config.start_x, h + self.config.start_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn table(name: &str, columns: usize) -> Table {
        Table {
            name: name.to_string(),
            columns: (0..columns)
                .map(|i| Column {
                    name: format!("c{}", i),
                    typ: "INT".to_string(),
                    is_primary: i == 0,
                    is_nullable: i != 0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_basic_layout() {
        let tables = vec![table("a", 2), table("b", 3)];
        let positions = LayoutEngine::default().layout(&tables, Viewport::new(1200.0, 800.0));

        assert_eq!(
            positions["a"],
            TablePosition {
                x: 50.0,
                y: 50.0,
                width: 220.0,
                height: 100.0
            }
        );
        assert_eq!(positions["b"].x, 310.0);
        assert_eq!(positions["b"].y, 50.0);
        assert_eq!(positions["b"].height, 130.0);
    }

    #[test]
    fn test_redefined_table_keeps_last_slot() {
        let tables = vec![table("a", 1), table("b", 1), table("a", 3)];
        let positions = LayoutEngine::default().layout(&tables, Viewport::new(1200.0, 800.0));

        assert_eq!(positions.len(), 2);
        assert_eq!(positions["b"].x, 50.0);
        assert_eq!(positions["a"].x, 310.0);
        assert_eq!(positions["a"].height, 130.0);
    }

    #[test]
    fn test_layout_idempotent() {
        let tables = vec![table("a", 1), table("b", 4), table("c", 2), table("d", 0)];
        let engine = LayoutEngine::default();
        let viewport = Viewport::new(600.0, 400.0);
        assert_eq!(engine.layout(&tables, viewport), engine.layout(&tables, viewport));
    }

    #[test]
    fn test_layout_wraps_rows() {
        // 50 + 220 + 40 + 220 = 530 fits in 600 - 50; the third box does not
        let tables = vec![table("a", 1), table("b", 4), table("c", 2)];
        let positions = LayoutEngine::default().layout(&tables, Viewport::new(600.0, 400.0));

        assert_eq!(positions["a"].y, 50.0);
        assert_eq!(positions["b"].y, 50.0);
        let c = positions["c"];
        assert_eq!(c.x, 50.0);
        // Tallest box in the first row is b: 40 + 4 * 30 = 160
        assert_eq!(c.y, 50.0 + 160.0 + 40.0);
        assert!(c.y > positions["a"].y);
    }

    #[test]
    fn test_narrow_viewport_keeps_first_box() {
        let tables = vec![table("a", 1), table("b", 1)];
        let positions = LayoutEngine::default().layout(&tables, Viewport::new(100.0, 100.0));

        assert_eq!((positions["a"].x, positions["a"].y), (50.0, 50.0));
        assert_eq!((positions["b"].x, positions["b"].y), (50.0, 50.0 + 70.0 + 40.0));
    }

    #[test]
    fn test_empty_table_height() {
        let positions =
            LayoutEngine::default().layout(&[table("empty", 0)], Viewport::default());
        assert_eq!(positions["empty"].height, 40.0);
    }

    #[test]
    fn test_bounds() {
        let engine = LayoutEngine::default();
        let positions = engine.layout(&[table("a", 2)], Viewport::default());
        assert_eq!(engine.bounds(&positions), Viewport::new(320.0, 200.0));
    }

    #[test]
    fn test_contains() {
        let p = TablePosition {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
        };
        assert!(p.contains(10.0, 30.0));
        assert!(!p.contains(31.0, 15.0));
    }
}
