use crate::types::{DataMode, ErrorCorrection, MaskPattern, Version};

/// Light border, in modules, a reader needs around the symbol.
pub const QUIET_ZONE: usize = 4;

/// What a module is used for. Only `Data` modules carry codeword bits
/// and only they are touched by masking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ModuleKind {
    /// Finder, separator, timing, alignment and the dark module.
    Function,
    /// Format and version information areas.
    Reserved,
    Data,
}

/// Square grid of modules plus the role of each one. `true` is dark.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Grid {
    size: usize,
    modules: Vec<bool>,
    kinds: Vec<ModuleKind>,
}

impl Grid {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            size,
            modules: vec![false; size * size],
            kinds: vec![ModuleKind::Data; size * size],
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> bool {
        self.modules[row * self.size + col]
    }

    pub(crate) fn kind(&self, row: usize, col: usize) -> ModuleKind {
        self.kinds[row * self.size + col]
    }

    pub(crate) fn is_data(&self, row: usize, col: usize) -> bool {
        self.kind(row, col) == ModuleKind::Data
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, dark: bool) {
        self.modules[row * self.size + col] = dark;
    }

    pub(crate) fn flip(&mut self, row: usize, col: usize) {
        self.modules[row * self.size + col] ^= true;
    }

    pub(crate) fn set_function(&mut self, row: usize, col: usize, dark: bool) {
        let i = row * self.size + col;
        self.modules[i] = dark;
        self.kinds[i] = ModuleKind::Function;
    }

    pub(crate) fn set_reserved(&mut self, row: usize, col: usize, dark: bool) {
        let i = row * self.size + col;
        self.modules[i] = dark;
        self.kinds[i] = ModuleKind::Reserved;
    }

    pub(crate) fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }

    /// Copies module values from `rows`, keeping the roles of `self`.
    pub(crate) fn with_modules(mut self, rows: &[Vec<bool>]) -> Self {
        for (r, row) in rows.iter().enumerate().take(self.size) {
            for (c, &dark) in row.iter().enumerate().take(self.size) {
                self.modules[r * self.size + c] = dark;
            }
        }
        self
    }
}

/// A finished QR symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrMatrix {
    grid: Grid,
    version: Version,
    error_correction: ErrorCorrection,
    data_mode: DataMode,
    mask: MaskPattern,
    penalty: u32,
}

impl QrMatrix {
    pub(crate) fn new(
        grid: Grid,
        version: Version,
        error_correction: ErrorCorrection,
        data_mode: DataMode,
        mask: MaskPattern,
        penalty: u32,
    ) -> Self {
        Self {
            grid,
            version,
            error_correction,
            data_mode,
            mask,
            penalty,
        }
    }

    /// Side length in modules, excluding the quiet zone.
    pub fn dimension(&self) -> usize {
        self.grid.size()
    }

    /// Whether the module at (`row`, `col`) is dark.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.grid.get(row, col)
    }

    pub fn module_kind(&self, row: usize, col: usize) -> ModuleKind {
        self.grid.kind(row, col)
    }

    pub fn rows(&self) -> Vec<Vec<bool>> {
        let size = self.dimension();
        (0..size)
            .map(|r| (0..size).map(|c| self.get(r, c)).collect())
            .collect()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn error_correction(&self) -> ErrorCorrection {
        self.error_correction
    }

    pub fn data_mode(&self) -> DataMode {
        self.data_mode
    }

    pub fn mask(&self) -> MaskPattern {
        self.mask
    }

    /// Penalty score of the applied mask.
    pub fn penalty(&self) -> u32 {
        self.penalty
    }

    pub fn quiet_zone(&self) -> usize {
        QUIET_ZONE
    }

    pub(crate) fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}
