use crate::types::Version;

/// Row/column coordinates of alignment pattern centres.
pub fn get_alignment_positions(version: Version) -> &'static [usize] {
    match version {
        Version::V1 => &[],
        Version::V2 => &[6, 18],
        Version::V3 => &[6, 22],
        Version::V4 => &[6, 26],
        Version::V5 => &[6, 30],
        Version::V6 => &[6, 34],
        Version::V7 => &[6, 22, 38],
        Version::V8 => &[6, 24, 42],
        Version::V9 => &[6, 26, 46],
        Version::V10 => &[6, 28, 50],
        Version::V11 => &[6, 30, 54],
        Version::V12 => &[6, 32, 58],
        Version::V13 => &[6, 34, 62],
        Version::V14 => &[6, 26, 46, 66],
        Version::V15 => &[6, 26, 48, 70],
        Version::V16 => &[6, 26, 50, 74],
        Version::V17 => &[6, 30, 54, 78],
        Version::V18 => &[6, 30, 56, 82],
        Version::V19 => &[6, 30, 58, 86],
        Version::V20 => &[6, 34, 62, 90],
        Version::V21 => &[6, 28, 50, 72, 94],
        Version::V22 => &[6, 26, 50, 74, 98],
        Version::V23 => &[6, 30, 54, 78, 102],
        Version::V24 => &[6, 28, 54, 80, 106],
        Version::V25 => &[6, 32, 58, 84, 110],
        Version::V26 => &[6, 30, 58, 86, 114],
        Version::V27 => &[6, 34, 62, 90, 118],
        Version::V28 => &[6, 26, 50, 74, 98, 122],
        Version::V29 => &[6, 30, 54, 78, 102, 126],
        Version::V30 => &[6, 26, 52, 78, 104, 130],
        Version::V31 => &[6, 30, 56, 82, 108, 134],
        Version::V32 => &[6, 34, 60, 86, 112, 138],
        Version::V33 => &[6, 30, 58, 86, 114, 142],
        Version::V34 => &[6, 34, 62, 90, 118, 146],
        Version::V35 => &[6, 30, 54, 78, 102, 126, 150],
        Version::V36 => &[6, 24, 50, 76, 102, 128, 154],
        Version::V37 => &[6, 28, 54, 80, 106, 132, 158],
        Version::V38 => &[6, 32, 58, 84, 110, 136, 162],
        Version::V39 => &[6, 26, 54, 82, 110, 138, 166],
        Version::V40 => &[6, 30, 58, 86, 114, 142, 170],
    }
}

/// Centres of every alignment pattern drawn for `version`, as
/// `(row, col)`. The three combinations that would land on a finder
/// pattern are skipped.
pub fn alignment_centers(version: Version) -> Vec<(usize, usize)> {
    let positions = get_alignment_positions(version);
    let Some(last) = positions.len().checked_sub(1) else {
        return Vec::new();
    };

    let mut centers = Vec::with_capacity(positions.len() * positions.len());
    for (i, &row) in positions.iter().enumerate() {
        for (j, &col) in positions.iter().enumerate() {
            let on_finder = (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0);
            if !on_finder {
                centers.push((row, col));
            }
        }
    }
    centers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_1_has_no_alignment_patterns() {
        assert!(alignment_centers(Version::V1).is_empty());
    }

    #[test]
    fn test_alignment_counts() {
        assert_eq!(alignment_centers(Version::V2), vec![(18, 18)]);
        assert_eq!(alignment_centers(Version::V7).len(), 6);
        assert_eq!(alignment_centers(Version::V40).len(), 46);
    }

    #[test]
    fn test_last_position_is_size_minus_seven() {
        for version in Version::all().skip(1) {
            let positions = get_alignment_positions(version);
            assert_eq!(positions[0], 6);
            assert_eq!(*positions.last().unwrap(), version.size() - 7, "version {version}");
        }
    }
}
