use pretty_assertions::assert_eq;

use qr_tools::{encode, ErrorCorrection, MaskPattern, QrMatrix, Version};

fn render_rows(matrix: &QrMatrix) -> Vec<String> {
    matrix
        .rows()
        .iter()
        .map(|row| row.iter().map(|&dark| if dark { '#' } else { '.' }).collect())
        .collect()
}

#[test]
fn test_worked_examples_select_mask_and_penalty() {
    let cases = [
        ("01234567", ErrorCorrection::M, MaskPattern::Pattern0, 1057),
        ("HELLO WORLD", ErrorCorrection::M, MaskPattern::Pattern0, 1071),
        ("HELLO WORLD", ErrorCorrection::Q, MaskPattern::Pattern0, 1067),
    ];
    for (text, ec, mask, penalty) in cases {
        let matrix = encode(text, ec).unwrap();
        assert_eq!(matrix.version(), Version::V1, "{text} {ec}");
        assert_eq!(matrix.mask(), mask, "{text} {ec}");
        assert_eq!(matrix.penalty(), penalty, "{text} {ec}");
    }
}

#[test]
fn test_hello_world_1m_modules() {
    let matrix = encode("HELLO WORLD", ErrorCorrection::M).unwrap();
    let expected = [
        "#######...#.#.#######",
        "#.....#.###...#.....#",
        "#.###.#...#.#.#.###.#",
        "#.###.#...#.#.#.###.#",
        "#.###.#.#.###.#.###.#",
        "#.....#..###..#.....#",
        "#######.#.#.#.#######",
        ".....................",
        "#.#.#.#..#..#...#..#.",
        ".####...#..#....#...#",
        "...#######.#..#.##...",
        "####.#.##..###.#.###.",
        ".#..####.#.#..###.#.#",
        "........#.#...#...#.#",
        "#######.....#..#.##..",
        "#.....#..##...##.#...",
        "#.###.#.##..#.#######",
        "#.###.#...##.#.#...#.",
        "#.###.#.####.###.#..#",
        "#.....#....###...#.##",
        "#######.##.#.###....#",
    ];
    assert_eq!(render_rows(&matrix), expected.map(String::from).to_vec());
}
