//! Route block locator.
//!
//! Route dumps have no record delimiters: a route ends where the next one
//! begins. Location is done in two passes. The first finds every confirmed
//! header with the format's anchored grammar; the second slices the
//! next-hop lines between the target header and the header after it.
//! Because headers are matched structurally on their parsed prefix, a target
//! such as `10.0.0.1` never latches onto `10.0.0.10/32` or a line that
//! merely mentions the address.

use sonic_types::IpPrefix;

/// A confirmed route header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteHeader {
    /// Prefix the header introduces.
    pub prefix: IpPrefix,
    /// Next-hop count printed by the header, when the format has one.
    pub declared_nexthops: Option<usize>,
}

impl RouteHeader {
    /// Header without a declared count.
    pub fn new(prefix: IpPrefix) -> Self {
        Self {
            prefix,
            declared_nexthops: None,
        }
    }
}

/// Line grammar of one dump format.
pub trait BlockGrammar {
    /// Parses `line` as a route header.
    fn header(&self, line: &str) -> Option<RouteHeader>;

    /// Returns true if `line` is a next-hop line.
    fn is_nexthop_line(&self, line: &str) -> bool;
}

/// The lines describing one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBlock<'a> {
    /// Index of the header line in the scanned output.
    pub start: usize,
    /// Parsed header.
    pub header: RouteHeader,
    /// Raw header line.
    pub header_line: &'a str,
    /// Next-hop lines in output order.
    pub nexthop_lines: Vec<&'a str>,
}

impl<'a> RouteBlock<'a> {
    /// Header line followed by the next-hop lines.
    pub fn lines(&self) -> Vec<&'a str> {
        std::iter::once(self.header_line)
            .chain(self.nexthop_lines.iter().copied())
            .collect()
    }
}

/// First pass: index and parse every header line.
pub fn locate_headers<G>(lines: &[&str], grammar: &G) -> Vec<(usize, RouteHeader)>
where
    G: BlockGrammar + ?Sized,
{
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| grammar.header(line).map(|header| (idx, header)))
        .collect()
}

/// Slices the block of `headers[pos]`.
fn block_at<'a, G>(
    lines: &[&'a str],
    grammar: &G,
    headers: &[(usize, RouteHeader)],
    pos: usize,
) -> RouteBlock<'a>
where
    G: BlockGrammar + ?Sized,
{
    let (start, header) = headers[pos].clone();
    let end = headers
        .get(pos + 1)
        .map(|(idx, _)| *idx)
        .unwrap_or(lines.len());

    let nexthop_lines = lines[start + 1..end]
        .iter()
        .copied()
        .filter(|line| grammar.is_nexthop_line(line))
        .collect();

    RouteBlock {
        start,
        header,
        header_line: lines[start],
        nexthop_lines,
    }
}

/// Second pass: the block of the first header whose prefix is `target`.
///
/// Lines between the header and the next header that are not next-hop lines
/// (blank lines, banners) are skipped.
pub fn locate_block<'a, G>(lines: &[&'a str], grammar: &G, target: &IpPrefix) -> Option<RouteBlock<'a>>
where
    G: BlockGrammar + ?Sized,
{
    let headers = locate_headers(lines, grammar);
    let pos = headers.iter().position(|(_, header)| &header.prefix == target)?;
    Some(block_at(lines, grammar, &headers, pos))
}

/// Every block whose header prefix is `target`, in output order.
///
/// Some dumps repeat the header once per next-hop instead of nesting them.
pub fn locate_blocks<'a, G>(lines: &[&'a str], grammar: &G, target: &IpPrefix) -> Vec<RouteBlock<'a>>
where
    G: BlockGrammar + ?Sized,
{
    let headers = locate_headers(lines, grammar);
    (0..headers.len())
        .filter(|pos| &headers[*pos].1.prefix == target)
        .map(|pos| block_at(lines, grammar, &headers, pos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Minimal grammar: unindented prefix lines are headers, `-` lines are next-hops.
    struct DashGrammar;

    impl BlockGrammar for DashGrammar {
        fn header(&self, line: &str) -> Option<RouteHeader> {
            if line.starts_with(char::is_whitespace) {
                return None;
            }
            line.trim().parse().ok().map(RouteHeader::new)
        }

        fn is_nexthop_line(&self, line: &str) -> bool {
            line.trim_start().starts_with('-')
        }
    }

    fn prefix(s: &str) -> IpPrefix {
        s.parse().unwrap()
    }

    #[test]
    fn test_locate_headers() {
        let lines = vec!["banner text", "10.0.0.0/24", "  - a", "10.0.0.1", "  - b"];
        let headers = locate_headers(&lines, &DashGrammar);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].0, 1);
        assert_eq!(headers[1].1.prefix, prefix("10.0.0.1/32"));
    }

    #[test]
    fn test_block_stops_at_next_header() {
        let lines = vec![
            "10.0.0.0/24",
            "  - a",
            "  - b",
            "",
            "10.0.0.1/32",
            "  - c",
        ];
        let block = locate_block(&lines, &DashGrammar, &prefix("10.0.0.0/24")).unwrap();
        assert_eq!(block.start, 0);
        assert_eq!(block.lines(), vec!["10.0.0.0/24", "  - a", "  - b"]);

        let last = locate_block(&lines, &DashGrammar, &prefix("10.0.0.1")).unwrap();
        assert_eq!(last.lines(), vec!["10.0.0.1/32", "  - c"]);
    }

    #[test]
    fn test_substring_collision_is_not_a_header_match() {
        // "10.0.0.1" is a substring of "10.0.0.10/32" but a different route.
        let lines = vec!["10.0.0.10/32", "  - x", "10.0.0.1/32", "  - y"];
        let block = locate_block(&lines, &DashGrammar, &prefix("10.0.0.1")).unwrap();
        assert_eq!(block.start, 2);
        assert_eq!(block.nexthop_lines, vec!["  - y"]);
    }

    #[test]
    fn test_missing_target() {
        let lines = vec!["10.0.0.0/24", "  - a"];
        assert!(locate_block(&lines, &DashGrammar, &prefix("20.0.0.0/24")).is_none());
    }

    #[test]
    fn test_header_without_nexthops() {
        let lines = vec!["10.0.0.0/24", "20.0.0.0/24", "  - a"];
        let block = locate_block(&lines, &DashGrammar, &prefix("10.0.0.0/24")).unwrap();
        assert!(block.nexthop_lines.is_empty());
    }

    #[test]
    fn test_locate_blocks_collects_repeated_headers() {
        let lines = vec!["10.0.0.0/24", "  - a", "10.0.0.10/32", "  - x", "10.0.0.0/24", "  - b"];
        let blocks = locate_blocks(&lines, &DashGrammar, &prefix("10.0.0.0/24"));
        let starts: Vec<usize> = blocks.iter().map(|b| b.start).collect();
        assert_eq!(starts, vec![0, 4]);
        assert_eq!(blocks[1].nexthop_lines, vec!["  - b"]);

        assert!(locate_blocks(&lines, &DashGrammar, &prefix("20.0.0.0/24")).is_empty());
    }
}
