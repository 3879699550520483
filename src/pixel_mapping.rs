use crate::generator::function_grid;
use crate::matrix::Grid;
use crate::types::Version;

/// Data and ECC module positions, as `(row, col)`, in the order
/// codeword bits are placed.
///
/// Column pairs are walked right to left starting at the bottom-right
/// corner, alternating upward and downward; column 6 (vertical timing)
/// is skipped entirely. Function and reserved modules are passed over.
pub(crate) fn data_positions(grid: &Grid) -> Vec<(usize, usize)> {
    let size = grid.size();
    let mut positions = Vec::with_capacity(size * size);

    let mut right = size - 1;
    let mut upward = true;
    loop {
        for step in 0..size {
            let row = if upward { size - 1 - step } else { step };
            for col in [right, right - 1] {
                if grid.is_data(row, col) {
                    positions.push((row, col));
                }
            }
        }
        upward = !upward;

        if right < 3 {
            break;
        }
        right -= 2;
        if right == 6 {
            right = 5;
        }
    }
    positions
}

/// Get all data and ECC pixel positions for a given QR code version
pub fn get_data_ecc_positions(version: Version) -> Vec<(usize, usize)> {
    data_positions(&function_grid(version))
}
