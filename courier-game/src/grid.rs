//! Map grid: cell alphabet, coordinates and the per-map lookup tables.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::SUPPLY_STATION_WIDTH;

/// Index of a package on the current map (0-based; shown to the player as 1-based).
pub type PackageId = u8;

/// Row/column coordinate. Row 0 is the top border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbor in `dir`, or `None` when it would underflow the grid origin.
    #[must_use]
    pub fn step(self, dir: Direction) -> Option<Self> {
        let (dr, dc) = dir.offset();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Self { row, col })
    }

    #[must_use]
    pub const fn as_tuple(self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// The eight surrounding coordinates that do not underflow.
    pub fn neighbors8(self) -> impl Iterator<Item = Self> {
        const OFFSETS: [(isize, isize); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        OFFSETS.into_iter().filter_map(move |(dr, dc)| {
            Some(Self {
                row: self.row.checked_add_signed(dr)?,
                col: self.col.checked_add_signed(dc)?,
            })
        })
    }

    /// The four orthogonal neighbors that do not underflow.
    pub fn neighbors4(self) -> impl Iterator<Item = Self> {
        Direction::ALL.into_iter().filter_map(move |dir| self.step(dir))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    #[must_use]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// A single map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Cell {
    #[default]
    Floor,
    BorderHorizontal,
    BorderVertical,
    Corner,
    Obstacle,
    Exit,
    Pickup(PackageId),
    Destination(PackageId),
    SupplyLeft,
    SupplyMid,
    SupplyRight,
    SpeedBump,
}

impl Cell {
    #[must_use]
    pub fn glyph(self) -> char {
        match self {
            Self::Floor => ' ',
            Self::BorderHorizontal => '-',
            Self::BorderVertical => '|',
            Self::Corner => '+',
            Self::Obstacle => '#',
            Self::Exit => 'E',
            Self::Pickup(id) => char::from(b'1'.saturating_add(id)),
            Self::Destination(id) => char::from(b'a'.saturating_add(id)),
            Self::SupplyLeft => '[',
            Self::SupplyMid => '$',
            Self::SupplyRight => ']',
            Self::SpeedBump => '~',
        }
    }

    #[must_use]
    pub const fn is_border(self) -> bool {
        matches!(
            self,
            Self::BorderHorizontal | Self::BorderVertical | Self::Corner
        )
    }

    /// Whether the player may stand on this cell.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(
            self,
            Self::BorderHorizontal | Self::BorderVertical | Self::Corner | Self::Obstacle
        )
    }
}

/// Where a package currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageStatus {
    /// Lying on the map, ready to be collected.
    Waiting(Pos),
    Held,
    Delivered,
}

/// Pickup/destination record for one package index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSlot {
    pub status: PackageStatus,
    pub destination: Pos,
}

impl PackageSlot {
    #[must_use]
    pub const fn pickup(&self) -> Option<Pos> {
        match self.status {
            PackageStatus::Waiting(pos) => Some(pos),
            PackageStatus::Held | PackageStatus::Delivered => None,
        }
    }
}

/// A three-cell `[ $ ]` run granting a one-time stamina bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyStation {
    pub left: Pos,
    pub active: bool,
}

impl SupplyStation {
    #[must_use]
    pub fn covers(&self, pos: Pos) -> bool {
        pos.row == self.left.row
            && pos.col >= self.left.col
            && pos.col < self.left.col + SUPPLY_STATION_WIDTH
    }

    pub fn cells(self) -> impl Iterator<Item = Pos> {
        let left = self.left;
        (0..SUPPLY_STATION_WIDTH).map(move |offset| Pos::new(left.row, left.col + offset))
    }
}

/// Square matrix of cells plus the pickup/destination/station/bump tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapGrid {
    size: usize,
    cells: Vec<Cell>,
    exit: Pos,
    packages: Vec<PackageSlot>,
    stations: Vec<SupplyStation>,
    speed_bumps: Vec<Pos>,
}

impl MapGrid {
    /// Empty map: border ring, floor interior, and the exit cell.
    ///
    /// `exit` must be an interior cell; it is clamped into the interior otherwise.
    #[must_use]
    pub fn bordered(size: usize, exit: Pos) -> Self {
        let size = size.max(3);
        let mut cells = vec![Cell::Floor; size * size];
        let last = size - 1;
        for row in 0..size {
            for col in 0..size {
                let cell = match (row == 0 || row == last, col == 0 || col == last) {
                    (true, true) => Cell::Corner,
                    (true, false) => Cell::BorderHorizontal,
                    (false, true) => Cell::BorderVertical,
                    (false, false) => Cell::Floor,
                };
                cells[row * size + col] = cell;
            }
        }
        let exit = Pos::new(exit.row.clamp(1, last - 1), exit.col.clamp(1, last - 1));
        cells[exit.row * size + exit.col] = Cell::Exit;
        Self {
            size,
            cells,
            exit,
            packages: Vec::new(),
            stations: Vec::new(),
            speed_bumps: Vec::new(),
        }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn exit(&self) -> Pos {
        self.exit
    }

    #[must_use]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    /// Inside the border ring.
    #[must_use]
    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.row >= 1 && pos.col >= 1 && pos.row + 1 < self.size && pos.col + 1 < self.size
    }

    #[must_use]
    pub fn cell(&self, pos: Pos) -> Option<Cell> {
        self.in_bounds(pos)
            .then(|| self.cells[pos.row * self.size + pos.col])
    }

    /// Overwrite a cell. Out-of-bounds writes are ignored.
    pub fn set_cell(&mut self, pos: Pos, cell: Cell) {
        if self.in_bounds(pos) {
            self.cells[pos.row * self.size + pos.col] = cell;
        }
    }

    #[must_use]
    pub fn is_floor(&self, pos: Pos) -> bool {
        self.is_interior(pos) && self.cell(pos) == Some(Cell::Floor)
    }

    pub fn interior_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        let last = self.size - 1;
        (1..last).flat_map(move |row| (1..last).map(move |col| Pos::new(row, col)))
    }

    /// Row-major view for renderers.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size)
    }

    #[must_use]
    pub fn packages(&self) -> &[PackageSlot] {
        &self.packages
    }

    #[must_use]
    pub fn package(&self, id: PackageId) -> Option<&PackageSlot> {
        self.packages.get(usize::from(id))
    }

    #[must_use]
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn stations(&self) -> &[SupplyStation] {
        &self.stations
    }

    #[must_use]
    pub fn speed_bumps(&self) -> &[Pos] {
        &self.speed_bumps
    }

    /// Register the next package with its pickup and destination cells.
    pub fn add_package(&mut self, pickup: Pos, destination: Pos) -> PackageId {
        let id = PackageId::try_from(self.packages.len()).unwrap_or(PackageId::MAX);
        self.set_cell(pickup, Cell::Pickup(id));
        self.set_cell(destination, Cell::Destination(id));
        self.packages.push(PackageSlot {
            status: PackageStatus::Waiting(pickup),
            destination,
        });
        id
    }

    /// Lay a `[ $ ]` run starting at `left`.
    pub fn add_station(&mut self, left: Pos) {
        let station = SupplyStation { left, active: true };
        for (pos, cell) in station
            .cells()
            .zip([Cell::SupplyLeft, Cell::SupplyMid, Cell::SupplyRight])
        {
            self.set_cell(pos, cell);
        }
        self.stations.push(station);
    }

    pub fn add_speed_bump(&mut self, pos: Pos) {
        self.set_cell(pos, Cell::SpeedBump);
        self.speed_bumps.push(pos);
    }

    /// Index of the active station whose span contains `pos`.
    #[must_use]
    pub fn active_station_at(&self, pos: Pos) -> Option<usize> {
        self.stations
            .iter()
            .position(|station| station.active && station.covers(pos))
    }

    /// Deactivate a station and clear its cells back to floor.
    pub fn consume_station(&mut self, index: usize) {
        let Some(station) = self.stations.get_mut(index) else {
            return;
        };
        station.active = false;
        let station = *station;
        for pos in station.cells() {
            self.set_cell(pos, Cell::Floor);
        }
    }

    #[must_use]
    pub fn is_speed_bump(&self, pos: Pos) -> bool {
        self.cell(pos) == Some(Cell::SpeedBump)
    }

    /// Waiting package whose pickup cell is `pos`.
    #[must_use]
    pub fn waiting_package_at(&self, pos: Pos) -> Option<PackageId> {
        match self.cell(pos)? {
            Cell::Pickup(id) => {
                let slot = self.package(id)?;
                (slot.pickup() == Some(pos)).then_some(id)
            }
            _ => None,
        }
    }

    /// Package picked up: clear its pickup cell.
    pub fn take_package(&mut self, id: PackageId) {
        let Some(slot) = self.packages.get_mut(usize::from(id)) else {
            return;
        };
        if let PackageStatus::Waiting(at) = slot.status {
            slot.status = PackageStatus::Held;
            self.set_cell(at, Cell::Floor);
        }
    }

    /// Package dropped on floor: `at` becomes its pickup cell, replacing the old record.
    pub fn release_package(&mut self, id: PackageId, at: Pos) {
        let Some(slot) = self.packages.get_mut(usize::from(id)) else {
            return;
        };
        if let PackageStatus::Waiting(old) = slot.status {
            self.cells[old.row * self.size + old.col] = Cell::Floor;
        }
        slot.status = PackageStatus::Waiting(at);
        self.set_cell(at, Cell::Pickup(id));
    }

    /// Package delivered: its destination reverts to floor.
    pub fn deliver_package(&mut self, id: PackageId) {
        let Some(slot) = self.packages.get_mut(usize::from(id)) else {
            return;
        };
        slot.status = PackageStatus::Delivered;
        let destination = slot.destination;
        self.set_cell(destination, Cell::Floor);
    }

    /// Number of grid cells currently showing `id` as a pickup.
    #[must_use]
    pub fn live_pickups(&self, id: PackageId) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Cell::Pickup(id))
            .count()
    }

    #[must_use]
    pub fn count_cells(&self, target: Cell) -> usize {
        self.cells.iter().filter(|cell| **cell == target).count()
    }
}

impl fmt::Display for MapGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|cell| cell.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
