//! Sankey diagrams, written as SVG
//!
//! Columns are laid out left to right, nodes stacked top to bottom in each
//! column with a height proportional to their amount. Every link is a band
//! leaving its source below the previous outgoing bands and entering its
//! target below the previous incoming ones.

use std::path::Path;
use svg::{
    node::element::{path::Data, Path as SvgPath, Rectangle},
    Document,
};

use crate::cli::{plot::label, table::format_currency};
use crate::lib::sankey::Diagram;
use crate::load::error::{Error, Result};

const FWIDTH: f64 = 1000.0;
const FHEIGHT: f64 = 600.0;
const MARGIN: f64 = 70.0;
const NODE_WIDTH: f64 = 16.0;
const GAP: f64 = 14.0;

/// Position of a node box
#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    x: f64,
    y: f64,
    height: f64,
}

/// Box of every node, indexed like `diagram.nodes`
fn layout(diagram: &Diagram) -> Vec<Slot> {
    let ncols = diagram.columns.len();
    let tallest = diagram
        .columns
        .iter()
        .map(|col| {
            let amount = col.iter().map(|&i| diagram.nodes[i].amount.abs()).sum::<f64>();
            (amount, col.len())
        })
        .fold((0.0_f64, 0), |(a, n), (b, m)| (a.max(b), n.max(m)));
    let usable = FHEIGHT - GAP * tallest.1.saturating_sub(1) as f64;
    let scale = if tallest.0 > 0.0 { usable / tallest.0 } else { 0.0 };

    let mut slots = vec![Slot { x: 0.0, y: 0.0, height: 0.0 }; diagram.nodes.len()];
    for (c, col) in diagram.columns.iter().enumerate() {
        let x = if ncols > 1 {
            c as f64 * (FWIDTH - NODE_WIDTH) / (ncols - 1) as f64
        } else {
            0.0
        };
        let mut y = 0.0;
        for &i in col {
            let height = diagram.nodes[i].amount.abs() * scale;
            slots[i] = Slot { x, y, height };
            y += height + GAP;
        }
    }
    slots
}

/// Vertical extent `(top, bottom)` of every link at its source and its target
fn bands(diagram: &Diagram, slots: &[Slot]) -> Vec<((f64, f64), (f64, f64))> {
    let mut out_offset = vec![0.0; slots.len()];
    let mut in_offset = vec![0.0; slots.len()];
    diagram
        .links
        .iter()
        .map(|l| {
            // part of node `i` taken by this link
            let share = |i: usize| {
                let whole = diagram.nodes[i].amount.abs();
                if whole > 0.0 {
                    l.amount.abs() / whole * slots[i].height
                } else {
                    0.0
                }
            };
            let thick_src = share(l.source);
            let thick_tgt = share(l.target);
            let s0 = slots[l.source].y + out_offset[l.source];
            let t0 = slots[l.target].y + in_offset[l.target];
            out_offset[l.source] += thick_src;
            in_offset[l.target] += thick_tgt;
            ((s0, s0 + thick_src), (t0, t0 + thick_tgt))
        })
        .collect()
}

pub fn to_document(diagram: &Diagram, title: &str) -> Document {
    let slots = layout(diagram);
    let mut doc = Document::new()
        .set("viewBox", (-MARGIN * 2.0, -MARGIN, FWIDTH + 4.0 * MARGIN, FHEIGHT + 2.0 * MARGIN))
        .set("font-family", "sans-serif")
        .add(label(FWIDTH / 2.0, -MARGIN / 2.0, title, "middle").set("font-size", 22));

    for (link, ((s0, s1), (t0, t1))) in diagram.links.iter().zip(bands(diagram, &slots)) {
        let sx = slots[link.source].x + NODE_WIDTH;
        let tx = slots[link.target].x;
        let mx = (sx + tx) / 2.0;
        let data = Data::new()
            .move_to((sx, s0))
            .cubic_curve_to((mx, s0, mx, t0, tx, t0))
            .line_to((tx, t1))
            .cubic_curve_to((mx, t1, mx, s1, sx, s1))
            .close();
        let color = if link.amount < 0.0 { "red" } else { "steelblue" };
        doc = doc.add(
            SvgPath::new()
                .set("fill", color)
                .set("fill-opacity", 0.35)
                .set("stroke", "none")
                .set("d", data),
        );
    }

    let last = diagram.columns.len().saturating_sub(1);
    for (c, col) in diagram.columns.iter().enumerate() {
        for &i in col {
            let node = &diagram.nodes[i];
            let slot = slots[i];
            let color = if node.amount < 0.0 { "firebrick" } else { "dimgray" };
            doc = doc.add(
                Rectangle::new()
                    .set("x", slot.x)
                    .set("y", slot.y)
                    .set("width", NODE_WIDTH)
                    .set("height", slot.height.max(1.0))
                    .set("fill", color),
            );
            let text = format!("{} {}", node.label, format_currency(node.amount));
            let y = slot.y + slot.height / 2.0 + 4.0;
            doc = doc.add(if c == last {
                label(slot.x + NODE_WIDTH + 6.0, y, &text, "start")
            } else {
                label(slot.x - 6.0, y, &text, "end")
            });
        }
    }
    doc
}

/// Draw `diagram` under `title` into `file`
pub fn sankey(diagram: &Diagram, title: &str, file: &Path) -> Result<()> {
    tracing::debug!("writing sankey '{}' to {}", title, file.display());
    svg::save(file, &to_document(diagram, title)).map_err(Error::io(file))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::sankey::{Link, Node};

    fn node(label: &str, amount: f64) -> Node {
        Node { label: label.to_string(), amount }
    }

    macro_rules! link {
        ( $s:expr => $t:expr, $a:expr ) => {
            Link { source: $s, target: $t, amount: $a }
        };
    }

    fn small() -> Diagram {
        Diagram {
            nodes: vec![
                node("Income", 1000.0),
                node("Saved", 400.0),
                node("Spent", 600.0),
                node("Rent", 600.0),
            ],
            columns: vec![vec![0], vec![1, 2], vec![3]],
            links: vec![link!(0 => 1, 400.0), link!(0 => 2, 600.0), link!(2 => 3, 600.0)],
        }
    }

    #[test]
    fn nodes_stack_in_columns() {
        let d = small();
        let slots = layout(&d);
        // column 1 is the tallest: 1000 spread over the height minus one gap
        let scale = (FHEIGHT - GAP) / 1000.0;
        assert_eq!(slots[0].x, 0.0);
        assert_eq!(slots[3].x, FWIDTH - NODE_WIDTH);
        assert!((slots[1].height - 400.0 * scale).abs() < 1e-9);
        assert!((slots[2].y - (400.0 * scale + GAP)).abs() < 1e-9);
        assert!((slots[0].height - (slots[1].height + slots[2].height)).abs() < 1e-9);
    }

    #[test]
    fn bands_fill_their_nodes() {
        let d = small();
        let slots = layout(&d);
        let b = bands(&d, &slots);
        // the two links out of Income split it exactly
        assert_eq!((b[0].0).0, slots[0].y);
        assert!(((b[0].0).1 - (b[1].0).0).abs() < 1e-9);
        assert!(((b[1].0).1 - (slots[0].y + slots[0].height)).abs() < 1e-9);
        // and enter their targets at the top
        assert_eq!((b[1].1).0, slots[2].y);
    }

    #[test]
    fn writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sankey.svg");
        sankey(&small(), "Spending Flow for 2024", &file).unwrap();
        let text = std::fs::read_to_string(&file).unwrap();
        assert!(text.contains("Spending Flow for 2024"));
        assert!(text.contains("Rent $600.00"));
        assert_eq!(text.matches("<rect").count(), 4);
    }
}
