//! Affected-region analysis
//!
//! Widens an edited line range to declaration boundaries so a bounded parse
//! of the result never starts or ends in the middle of a declaration,
//! a block comment or a brace block. Results always begin and end on unit
//! boundaries (see [`LineScan::is_unit_start`]).

use super::lines::{LineScan, scan_lines};
use crate::base::{LineIndex, LineRange};

/// Lines searched in each direction before falling back to a blank line
pub const DEFAULT_REGION_WINDOW: usize = 40;

/// Widen `edit` over `text` to the smallest range of complete top-level
/// declarations, searching at most `window` lines each way.
pub fn analyze_affected_region(text: &str, edit: LineRange, window: usize) -> LineRange {
    let index = LineIndex::new(text);
    let scan = scan_lines(text, &index);
    affected_region(&scan, edit, window)
}

/// [`analyze_affected_region`] over a precomputed scan
pub fn affected_region(scan: &LineScan, edit: LineRange, window: usize) -> LineRange {
    let count = scan.line_count();
    if count == 0 {
        return LineRange::line(0);
    }
    let edit = edit.clamp_to(count);
    let start = find_start(scan, edit.start, window);
    let end = find_end(scan, edit.end, window).max(start);
    snap_to_units(scan, LineRange::new(start, end))
}

/// Grow `region` until both ends sit on unit starts: the first line starts a
/// unit and so does the line after the last.
pub fn snap_to_units(scan: &LineScan, region: LineRange) -> LineRange {
    let count = scan.line_count();
    if count == 0 {
        return LineRange::line(0);
    }
    let region = region.clamp_to(count);
    let start = (0..=region.start)
        .rev()
        .find(|&line| scan.is_unit_start(line))
        .unwrap_or(0);
    let end = (region.end + 1..=count)
        .find(|&line| scan.is_unit_start(line))
        .unwrap_or(count)
        - 1;
    LineRange::new(start, end)
}

fn find_start(scan: &LineScan, line: usize, window: usize) -> usize {
    let lower = line.saturating_sub(window);
    let mut l = line;
    loop {
        let info = &scan[l];
        if !info.starts_in_comment {
            if info.is_top_level_declaration() {
                return l;
            }
            if info.is_top_level_blank() {
                return if l == line { l } else { l + 1 };
            }
            // Closing line of an earlier block
            if l < line && info.depth_before > 0 && info.depth_after == 0 {
                return l + 1;
            }
        }
        if l == 0 {
            return 0;
        }
        if l == lower {
            break;
        }
        l -= 1;
    }
    (0..lower)
        .rev()
        .find(|&l| scan[l].is_top_level_blank())
        .unwrap_or(0)
}

fn find_end(scan: &LineScan, line: usize, window: usize) -> usize {
    let last = scan.line_count() - 1;
    let upper = (line + window).min(last);
    for l in line..=upper {
        let info = &scan[l];
        if info.depth_after != 0 || info.ends_in_comment {
            continue;
        }
        match scan.get(l + 1) {
            None => return l,
            Some(next)
                if next.is_top_level_declaration()
                    || next.blank
                    || (next.comment_only && !next.starts_in_comment) =>
            {
                return l;
            }
            _ => {}
        }
    }
    (line + 1..=last)
        .find(|&l| scan[l].is_top_level_blank())
        .unwrap_or(last)
}
