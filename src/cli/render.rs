//! Text rendering of nodes, shared by one-shot commands and the shell

use std::io::{self, Write};

use chrono::SecondsFormat;

use super::output::Palette;
use crate::domain::Node;

const TABLE_WIDTH: usize = 90;
const DETAILS_WIDTH: usize = 60;

/// Shortens `s` to at most `max` characters, marking the cut with `...`
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Writes the node list as a table
pub fn write_table<W: Write>(w: &mut W, nodes: &[Node], palette: Palette) -> io::Result<()> {
    writeln!(w)?;
    if nodes.is_empty() {
        writeln!(w, "No nodes found. Create some nodes first!")?;
        return writeln!(w);
    }

    writeln!(w, "{}", palette.header("Manufacturing Nodes:"))?;
    writeln!(w, "{}", "-".repeat(TABLE_WIDTH))?;
    writeln!(w, "{:<20} {:<30} {:<35}", "ID", "Title", "UNS Address")?;
    writeln!(w, "{}", "-".repeat(TABLE_WIDTH))?;

    for node in nodes {
        writeln!(
            w,
            "{:<20} {:<30} {:<35}",
            node.id.as_str(),
            truncate(&node.title, 28),
            truncate(&node.address, 33)
        )?;
    }
    writeln!(w)
}

/// Writes every field of one node
pub fn write_details<W: Write>(w: &mut W, node: &Node, palette: Palette) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{}", palette.header("Node Details:"))?;
    writeln!(w, "{}", "-".repeat(DETAILS_WIDTH))?;
    writeln!(w, "ID:          {}", node.id)?;
    writeln!(w, "Title:       {}", node.title)?;
    writeln!(w, "Description: {}", node.description)?;
    writeln!(w, "UNS Address: {}", node.address)?;
    writeln!(w, "Operations:  {}", node.operations.join(", "))?;
    writeln!(
        w,
        "Created:     {}",
        node.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )?;
    writeln!(
        w,
        "Updated:     {}",
        node.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )?;
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn truncate_short_and_long() {
        assert_eq!(truncate("Pump", 10), "Pump");
        assert_eq!(truncate("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate("abcdefghijk", 10), "abcdefg...");
        assert_eq!(truncate("ÄÖÜäöüßÄÖÜ!", 10), "ÄÖÜäöüß...");
    }

    #[test]
    fn empty_table_hint() {
        let text = render(|w| write_table(w, &[], Palette::plain()));
        assert!(text.contains("No nodes found. Create some nodes first!"));
        assert!(!text.contains("Manufacturing Nodes:"));
    }

    #[test]
    fn table_lists_nodes() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let nodes = vec![
            Node::create_at("Pump A", "", Vec::<String>::new(), "Site/Area", at),
            Node::create_at(
                "A very long title that will not fit in the column",
                "",
                Vec::<String>::new(),
                "",
                at,
            ),
        ];

        let text = render(|w| write_table(w, &nodes, Palette::plain()));
        assert!(text.contains("Manufacturing Nodes:"));
        assert!(text.contains("20250101000000       Pump A"));
        assert!(text.contains("Site/Area"));
        assert!(text.contains("A very long title that wi..."));
    }

    #[test]
    fn details_show_all_fields() {
        let at = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        let node = Node::create_at("Pump A", "Feed pump", ["prime", "pump"], "S/A/L", at);

        let text = render(|w| write_details(w, &node, Palette::plain()));
        assert!(text.contains("ID:          20250203040506"));
        assert!(text.contains("Description: Feed pump"));
        assert!(text.contains("Operations:  prime, pump"));
        assert!(text.contains("Created:     2025-02-03T04:05:06Z"));
    }
}
