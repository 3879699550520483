use tracing::debug;

use crate::generator::add_format_info;
use crate::matrix::Grid;
use crate::types::{ErrorCorrection, MaskPattern};

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

/// Whether `pattern` inverts the module at (`row`, `col`).
pub fn mask_bit(pattern: MaskPattern, row: usize, col: usize) -> bool {
    match pattern {
        MaskPattern::Pattern0 => (row + col) % 2 == 0,
        MaskPattern::Pattern1 => row % 2 == 0,
        MaskPattern::Pattern2 => col % 3 == 0,
        MaskPattern::Pattern3 => (row + col) % 3 == 0,
        MaskPattern::Pattern4 => ((row / 2) + (col / 3)) % 2 == 0,
        MaskPattern::Pattern5 => ((row * col) % 2) + ((row * col) % 3) == 0,
        MaskPattern::Pattern6 => (((row * col) % 2) + ((row * col) % 3)) % 2 == 0,
        MaskPattern::Pattern7 => (((row + col) % 2) + ((row * col) % 3)) % 2 == 0,
    }
}

/// XORs `pattern` into the data modules. Function and reserved modules
/// are left alone. Applying the same pattern twice undoes it.
pub(crate) fn apply_mask(grid: &mut Grid, pattern: MaskPattern) {
    let size = grid.size();
    for row in 0..size {
        for col in 0..size {
            if grid.is_data(row, col) && mask_bit(pattern, row, col) {
                grid.flip(row, col);
            }
        }
    }
}

/// Tries all eight masks on `grid` (which must be unmasked) and keeps
/// the one with the lowest penalty; ties go to the lowest index. The
/// returned grid has the mask and its format information applied.
pub(crate) fn select_mask(grid: &Grid, error_correction: ErrorCorrection) -> (MaskPattern, u32, Grid) {
    let mut best: Option<(MaskPattern, u32, Grid)> = None;
    for pattern in MaskPattern::ALL {
        let mut candidate = grid.clone();
        apply_mask(&mut candidate, pattern);
        add_format_info(&mut candidate, error_correction, pattern);
        let penalty = penalty_score(&candidate);
        debug!(mask = pattern.index(), penalty, "mask candidate");

        if best.as_ref().is_none_or(|(_, lowest, _)| penalty < *lowest) {
            best = Some((pattern, penalty, candidate));
        }
    }
    best.unwrap_or_else(|| unreachable!("MaskPattern::ALL is not empty"))
}

/// Total penalty of the four scoring rules over the whole symbol.
pub(crate) fn penalty_score(grid: &Grid) -> u32 {
    let size = grid.size();
    let rows: Vec<Vec<bool>> = (0..size)
        .map(|r| (0..size).map(|c| grid.get(r, c)).collect())
        .collect();
    let cols: Vec<Vec<bool>> = (0..size)
        .map(|c| (0..size).map(|r| grid.get(r, c)).collect())
        .collect();

    let lines = || rows.iter().chain(cols.iter());
    let runs: u32 = lines().map(|line| run_penalty(line)).sum();
    let finders: u32 = lines().map(|line| finder_penalty(line)).sum();
    runs + block_penalty(grid) + finders + balance_penalty(grid.dark_count(), size * size)
}

/// N1: each run of five or more same-coloured modules.
fn run_penalty(line: &[bool]) -> u32 {
    let mut penalty = 0;
    let mut run = 0;
    let mut color = None;
    for &module in line {
        if Some(module) == color {
            run += 1;
        } else {
            color = Some(module);
            run = 1;
        }
        if run == 5 {
            penalty += PENALTY_N1;
        } else if run > 5 {
            penalty += 1;
        }
    }
    penalty
}

/// N2: each 2x2 block of one colour. Overlapping blocks all count.
fn block_penalty(grid: &Grid) -> u32 {
    let size = grid.size();
    let mut penalty = 0;
    for row in 0..size - 1 {
        for col in 0..size - 1 {
            let color = grid.get(row, col);
            if color == grid.get(row, col + 1)
                && color == grid.get(row + 1, col)
                && color == grid.get(row + 1, col + 1)
            {
                penalty += PENALTY_N2;
            }
        }
    }
    penalty
}

/// N3: each dark-light-dark-light-dark run sequence in 1:1:3:1:1 ratio
/// with a light run at least four times the unit on one side. Both sides
/// are checked separately, so a core light on both sides scores twice.
/// Modules past the edge count as light.
fn finder_penalty(line: &[bool]) -> u32 {
    let size = line.len();
    let mut runs = run_lengths(line);
    // Edge padding: the line always starts and ends with a light run
    match runs.first_mut() {
        Some((false, len)) => *len += size,
        _ => runs.insert(0, (false, size)),
    }
    match runs.last_mut() {
        Some((false, len)) => *len += size,
        _ => runs.push((false, size)),
    }

    let mut matches = 0;
    for i in 1..runs.len().saturating_sub(5) {
        let (dark, unit) = runs[i];
        if !dark {
            continue;
        }
        let core = [runs[i + 1].1, runs[i + 2].1, runs[i + 3].1, runs[i + 4].1];
        if core != [unit, unit * 3, unit, unit] {
            continue;
        }
        let before = runs[i - 1].1;
        let after = runs[i + 5].1;
        matches += u32::from(before >= unit * 4 && after >= unit);
        matches += u32::from(after >= unit * 4 && before >= unit);
    }
    matches * PENALTY_N3
}

/// Consecutive same-colour runs as (dark, length).
fn run_lengths(line: &[bool]) -> Vec<(bool, usize)> {
    let mut runs: Vec<(bool, usize)> = Vec::new();
    for &module in line {
        match runs.last_mut() {
            Some((color, len)) if *color == module => *len += 1,
            _ => runs.push((module, 1)),
        }
    }
    runs
}

/// N4: ten points per full 5% the dark share deviates from 50%.
fn balance_penalty(dark: usize, total: usize) -> u32 {
    let deviation = (dark * 20).abs_diff(total * 10);
    (deviation / total) as u32 * PENALTY_N4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::function_grid;
    use crate::types::Version;

    fn grid_from(rows: &[&str]) -> Grid {
        let modules: Vec<Vec<bool>> = rows
            .iter()
            .map(|r| r.chars().map(|c| c == '#').collect())
            .collect();
        Grid::new(rows.len()).with_modules(&modules)
    }

    #[test]
    fn test_mask_formulas() {
        assert!(mask_bit(MaskPattern::Pattern0, 0, 0));
        assert!(!mask_bit(MaskPattern::Pattern0, 0, 1));
        assert!(mask_bit(MaskPattern::Pattern1, 2, 5));
        assert!(mask_bit(MaskPattern::Pattern2, 7, 3));
        assert!(!mask_bit(MaskPattern::Pattern2, 7, 4));
        assert!(mask_bit(MaskPattern::Pattern3, 1, 2));
        assert!(mask_bit(MaskPattern::Pattern4, 1, 2));
        assert!(!mask_bit(MaskPattern::Pattern4, 2, 0));
        assert!(mask_bit(MaskPattern::Pattern5, 0, 9));
        assert!(!mask_bit(MaskPattern::Pattern5, 1, 1));
        assert!(mask_bit(MaskPattern::Pattern6, 1, 1));
        assert!(!mask_bit(MaskPattern::Pattern7, 1, 1));
    }

    #[test]
    fn test_masking_leaves_function_modules() {
        let base = function_grid(Version::V8);
        for pattern in MaskPattern::ALL {
            let mut masked = base.clone();
            apply_mask(&mut masked, pattern);
            for row in 0..base.size() {
                for col in 0..base.size() {
                    if !base.is_data(row, col) {
                        assert_eq!(masked.get(row, col), base.get(row, col));
                    }
                }
            }
            apply_mask(&mut masked, pattern);
            assert_eq!(masked, base);
        }
    }

    #[test]
    fn test_run_penalty() {
        assert_eq!(run_penalty(&[true; 4]), 0);
        assert_eq!(run_penalty(&[true; 5]), 3);
        assert_eq!(run_penalty(&[false; 7]), 5);
        let mixed = [true, true, true, true, true, false, true, true, true, true, true, true];
        assert_eq!(run_penalty(&mixed), 3 + 4);
    }

    #[test]
    fn test_block_penalty() {
        let grid = grid_from(&["###", "###", "..#"]);
        // Top two blocks are dark; bottom-left block mixes colours
        assert_eq!(block_penalty(&grid), 6);
    }

    fn line(modules: &str) -> Vec<bool> {
        modules.chars().map(|c| c == '#').collect()
    }

    #[test]
    fn test_finder_penalty() {
        // Once for the trailing light run, once for the leading edge
        assert_eq!(finder_penalty(&line("#.###.#....#")), 80);
        assert_eq!(finder_penalty(&line("##.##.##.##.")), 0);
        // Core has one light module before it and three after
        assert_eq!(finder_penalty(&line("#.#.###.#...#")), 0);
    }

    #[test]
    fn test_finder_penalty_requires_exact_ratio() {
        // First dark run is two modules wide
        assert_eq!(finder_penalty(&line(".##.###.#....##.#.##")), 0);
        // Last dark run is two modules wide
        assert_eq!(finder_penalty(&line("#.#....#.###.##.#.#")), 0);
        // 2:1:3:1:1 flanked by light on both sides
        assert_eq!(finder_penalty(&line("....##.###.#....")), 0);
    }

    #[test]
    fn test_finder_penalty_scaled_pattern() {
        // 2:2:6:2:2 with the edges on both sides
        assert_eq!(finder_penalty(&line("##..######..##")), 80);
    }

    #[test]
    fn test_run_lengths() {
        assert_eq!(
            run_lengths(&line("##.###")),
            vec![(true, 2), (false, 1), (true, 3)]
        );
        assert!(run_lengths(&[]).is_empty());
    }

    #[test]
    fn test_balance_penalty() {
        assert_eq!(balance_penalty(50, 100), 0);
        assert_eq!(balance_penalty(54, 100), 0);
        assert_eq!(balance_penalty(55, 100), 10);
        assert_eq!(balance_penalty(39, 100), 20);
        assert_eq!(balance_penalty(0, 100), 100);
    }

    #[test]
    fn test_uniform_grid_penalty() {
        // 5x5 all light: runs 5 lines x2 x3, 16 blocks x3, balance 100
        let grid = grid_from(&["....."; 5]);
        assert_eq!(penalty_score(&grid), 30 + 48 + 100);
    }

    #[test]
    fn test_selected_mask_has_lowest_penalty() {
        let base = function_grid(Version::V2);
        let (chosen, penalty, _) = select_mask(&base, ErrorCorrection::M);
        for pattern in MaskPattern::ALL {
            let mut candidate = base.clone();
            apply_mask(&mut candidate, pattern);
            add_format_info(&mut candidate, ErrorCorrection::M, pattern);
            let score = penalty_score(&candidate);
            assert!(score >= penalty);
            if score == penalty {
                assert!(pattern.index() >= chosen.index());
            }
        }
    }
}
