//! Debug export of a finished layout as SVG.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use tracing::{debug, error};

use crate::{BoundingBox, Result, Vector2D, VertexId};

const MARGIN: f64 = 20.0;
const RADIUS: f64 = 4.0;
const EDGE_COLOR: &str = "#4a5568";
const NODE_COLOR: &str = "#3182ce";

/// Render vertices as circles and edges as lines.
///
/// `tooltip` supplies the `<title>` text of each vertex. Edges with an
/// endpoint missing from `positions` are skipped.
pub fn render_svg<'a, V, I, F>(edges: I, positions: &HashMap<V, Vector2D>, tooltip: F) -> String
where
    V: VertexId + 'a,
    I: IntoIterator<Item = (&'a V, &'a V)>,
    F: Fn(&V) -> String,
{
    let bbox = BoundingBox::from_positions(positions.values().copied())
        .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
        .expanded(MARGIN);

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.1} {:.1} {:.1} {:.1}">"#,
        bbox.left,
        bbox.top,
        bbox.width(),
        bbox.height()
    );

    let mut skipped = 0usize;
    for (a, b) in edges {
        let (Some(pa), Some(pb)) = (positions.get(a), positions.get(b)) else {
            error!(source = ?a, target = ?b, "edge endpoint has no position, skipped");
            skipped += 1;
            continue;
        };
        let _ = writeln!(
            svg,
            r##"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{EDGE_COLOR}" />"##,
            pa.x, pa.y, pb.x, pb.y
        );
    }

    // Sorted by tooltip so the output is stable across runs.
    let mut vertices: Vec<(String, Vector2D)> = positions
        .iter()
        .map(|(v, p)| (tooltip(v), *p))
        .collect();
    vertices.sort_by(|a, b| a.0.cmp(&b.0));
    for (title, p) in &vertices {
        let _ = writeln!(
            svg,
            r#"  <circle cx="{:.1}" cy="{:.1}" r="{RADIUS}" fill="{NODE_COLOR}"><title>{}</title></circle>"#,
            p.x,
            p.y,
            escape_xml(title)
        );
    }

    svg.push_str("</svg>\n");
    debug!(vertices = vertices.len(), skipped, "rendered svg");
    svg
}

/// [`render_svg`] straight to a file.
pub fn write_svg<'a, V, I, F>(
    path: impl AsRef<Path>,
    edges: I,
    positions: &HashMap<V, Vector2D>,
    tooltip: F,
) -> Result<()>
where
    V: VertexId + 'a,
    I: IntoIterator<Item = (&'a V, &'a V)>,
    F: Fn(&V) -> String,
{
    std::fs::write(path, render_svg(edges, positions, tooltip))?;
    Ok(())
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
