//! Iso-contour counting with marching squares.
//!
//! Every 2×2 cell of the mask contributes up to two line segments between
//! the midpoints of its crossed edges. Neighbouring cells share those
//! midpoints, so contours are the connected components of the segment
//! graph. Each component is one closed loop or one path ending on the image
//! border.

use crate::edge_map::EdgeMap;

struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
        }
    }

    fn find(&mut self, mut i: u32) -> u32 {
        while self.parent[i as usize] != i {
            let grand = self.parent[self.parent[i as usize] as usize];
            self.parent[i as usize] = grand;
            i = grand;
        }
        i
    }

    fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra as usize] = rb;
        }
    }
}

/// Number of iso-contours of `map` at `level`.
pub fn count_contours(map: &EdgeMap, level: f32) -> usize {
    let (w, h) = (map.width, map.height);
    if w < 2 || h < 2 {
        return 0;
    }

    // Edge midpoints: horizontal edges (x,y)-(x+1,y) first, then vertical
    // edges (x,y)-(x,y+1).
    let horizontal = (w - 1) * h;
    let h_edge = |x: usize, y: usize| (y * (w - 1) + x) as u32;
    let v_edge = |x: usize, y: usize| (horizontal + y * w + x) as u32;

    let above = |x: usize, y: usize| map.get(x, y) as f32 >= level;
    let mut set = DisjointSet::new(horizontal + w * (h - 1));
    let mut used = vec![false; horizontal + w * (h - 1)];

    for y in 0..h - 1 {
        for x in 0..w - 1 {
            let tl = above(x, y);
            let tr = above(x + 1, y);
            let br = above(x + 1, y + 1);
            let bl = above(x, y + 1);

            let top = h_edge(x, y);
            let bottom = h_edge(x, y + 1);
            let left = v_edge(x, y);
            let right = v_edge(x + 1, y);

            let mut crossed = [0u32; 4];
            let mut n = 0;
            let sides = [
                (tl != tr, top),
                (tr != br, right),
                (br != bl, bottom),
                (bl != tl, left),
            ];
            for (is_crossed, id) in sides {
                if is_crossed {
                    crossed[n] = id;
                    n += 1;
                }
            }

            match n {
                2 => {
                    set.union(crossed[0], crossed[1]);
                }
                4 => {
                    // Saddle: the cell centre decides which diagonal pair
                    // is joined.
                    let centre = (map.get(x, y) as f32
                        + map.get(x + 1, y) as f32
                        + map.get(x + 1, y + 1) as f32
                        + map.get(x, y + 1) as f32)
                        / 4.0;
                    if (centre >= level) == tl {
                        set.union(top, right);
                        set.union(bottom, left);
                    } else {
                        set.union(top, left);
                        set.union(right, bottom);
                    }
                }
                _ => continue,
            }
            for id in &crossed[..n] {
                used[*id as usize] = true;
            }
        }
    }

    let mut roots: Vec<u32> = (0..used.len() as u32)
        .filter(|&id| used[id as usize])
        .map(|id| set.find(id))
        .collect();
    roots.sort_unstable();
    roots.dedup();
    roots.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge_map::ON;

    fn map_from(rows: &[&str]) -> EdgeMap {
        let height = rows.len();
        let width = rows[0].len();
        let data = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| if b == b'#' { ON } else { 0 }))
            .collect();
        EdgeMap {
            width,
            height,
            data,
        }
    }

    #[test]
    fn test_uniform_has_no_contours() {
        assert_eq!(count_contours(&EdgeMap::empty(8, 8), 10.0), 0);
        assert_eq!(count_contours(&EdgeMap::empty(8, 8).invert(), 10.0), 0);
    }

    #[test]
    fn test_single_blob_is_one_loop() {
        let map = map_from(&["......", "..##..", "..##..", "......"]);
        assert_eq!(count_contours(&map, 10.0), 1);
    }

    #[test]
    fn test_ring_has_inner_and_outer_contour() {
        let map = map_from(&[
            ".......",
            ".#####.",
            ".#...#.",
            ".#...#.",
            ".#####.",
            ".......",
        ]);
        assert_eq!(count_contours(&map, 10.0), 2);
        assert_eq!(count_contours(&map.invert(), 10.0), 2);
    }

    #[test]
    fn test_separate_blobs() {
        let map = map_from(&["#....#", "......", "..#...", "......"]);
        // Two open paths around the corner blobs plus one closed loop.
        assert_eq!(count_contours(&map, 10.0), 3);
    }

    #[test]
    fn test_line_across_image_is_two_open_paths() {
        let map = map_from(&["..#..", "..#..", "..#..", "..#.."]);
        assert_eq!(count_contours(&map, 10.0), 2);
    }

    #[test]
    fn test_diagonal_saddle() {
        let map = map_from(&["....", ".#..", "..#.", "...."]);
        // Centre of the saddle cell averages to 127.5, which joins the two
        // set pixels into one region.
        assert_eq!(count_contours(&map, 10.0), 1);
        // At a level above the centre average they are separate.
        assert_eq!(count_contours(&map, 200.0), 2);
    }
}
