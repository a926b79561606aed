//! Fluid boxes and the local diffusion step between adjacent fluid
//! structures.
//!
//! Diffusion runs inside each structure's per-tick update, so it mutates
//! neighbor boxes in place while the raster scan is still in progress. A box
//! visited later in the scan therefore sees amounts already changed earlier
//! in the same tick. Results depend on scan order and must stay that way for
//! saved worlds to keep behaving the same.

use crate::fixed::Fixed64;
use crate::grid::{Grid, Rotation, TilePos};
use crate::id::FluidType;

/// Port mask with all four directions connected.
pub const ALL_PORTS: u8 = 0b1111;

/// A bounded fluid reservoir with directional ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluidBox {
    /// `None` while the box has never held anything.
    pub fluid: Option<FluidType>,
    pub amount: Fixed64,
    pub max_amount: Fixed64,
    pub input_enable: bool,
    pub output_enable: bool,
    /// Only this fluid may flow in.
    pub filter: Option<FluidType>,
    /// Connected directions in the owner's local frame, one bit per
    /// [`Rotation`] index.
    pub connect_to: u8,
}

impl FluidBox {
    /// An empty box open in every direction.
    pub fn new(max_amount: Fixed64) -> Self {
        Self {
            fluid: None,
            amount: Fixed64::ZERO,
            max_amount,
            input_enable: true,
            output_enable: true,
            filter: None,
            connect_to: ALL_PORTS,
        }
    }

    pub fn with_valves(mut self, input_enable: bool, output_enable: bool) -> Self {
        self.input_enable = input_enable;
        self.output_enable = output_enable;
        self
    }

    pub fn with_filter(mut self, filter: FluidType) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn free_capacity(&self) -> Fixed64 {
        (self.max_amount - self.amount).max(Fixed64::ZERO)
    }

    /// Whether the filter lets `fluid` in.
    pub fn admits(&self, fluid: Option<FluidType>) -> bool {
        self.filter.is_none() || self.filter == fluid
    }

    /// Connected directions, rotated into world space.
    pub fn ports(&self, rotation: Rotation) -> impl Iterator<Item = Rotation> + use<> {
        let mask = self.connect_to;
        Rotation::ALL
            .into_iter()
            .filter(move |local| mask & local.bit() != 0)
            .map(move |local| local.rotated_by(rotation))
    }

    /// Add `amount` of `fluid`, capped at capacity.
    pub fn fill(&mut self, fluid: FluidType, amount: Fixed64) {
        if self.fluid != Some(fluid) {
            self.fluid = Some(fluid);
            self.amount = Fixed64::ZERO;
        }
        self.amount = (self.amount + amount).min(self.max_amount);
    }
}

/// Relax the pressure difference between `this` and one neighbor box by
/// moving `rate` of it. Returns the amount moved into `this` (negative when
/// `this` gave fluid away).
pub fn exchange(this: &mut FluidBox, next: &mut FluidBox, rate: Fixed64) -> Fixed64 {
    if next.amount > Fixed64::ZERO && next.fluid != this.fluid {
        return Fixed64::ZERO;
    }
    let flow = (next.amount - this.amount) * rate;
    if flow < Fixed64::ZERO {
        if !this.output_enable || !next.input_enable || !next.admits(this.fluid) {
            return Fixed64::ZERO;
        }
        let moved = (-flow).min(next.free_capacity()).min(this.amount);
        this.amount -= moved;
        next.amount += moved;
        next.fluid = this.fluid;
        -moved
    } else if flow > Fixed64::ZERO {
        if !this.input_enable || !next.output_enable || !this.admits(next.fluid) {
            return Fixed64::ZERO;
        }
        let moved = flow.min(this.free_capacity()).min(next.amount);
        next.amount -= moved;
        this.amount += moved;
        this.fluid = next.fluid;
        moved
    } else {
        Fixed64::ZERO
    }
}

/// One diffusion pass for the fluid boxes of the structure at `pos`, which
/// the caller has taken out of the grid.
pub(crate) fn diffuse(boxes: &mut [FluidBox], pos: TilePos, rotation: Rotation, grid: &mut Grid, rate: Fixed64) {
    for this in boxes.iter_mut() {
        if this.amount == Fixed64::ZERO || (!this.input_enable && !this.output_enable) {
            continue;
        }
        for direction in this.ports(rotation) {
            let Some(neighbor) = grid.structure_mut(pos.step(direction)) else {
                continue;
            };
            for next in neighbor.fluid_boxes_mut() {
                exchange(this, next, rate);
            }
        }
    }
}

/// Neighbor mask (bit per [`Rotation`]) of tiles around `pos` whose
/// structures hold fluid boxes.
pub fn connection_mask(grid: &Grid, pos: TilePos) -> u8 {
    Rotation::ALL
        .into_iter()
        .filter(|&dir| grid.structure(pos.step(dir)).is_some_and(|s| !s.fluid_boxes().is_empty()))
        .fold(0, |mask, dir| mask | dir.bit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::ratio;

    fn tank(fluid: Option<FluidType>, amount: i32) -> FluidBox {
        let mut b = FluidBox::new(Fixed64::from_num(10));
        b.fluid = fluid;
        b.amount = Fixed64::from_num(amount);
        b
    }

    #[test]
    fn flows_downhill_and_conserves() {
        let mut a = tank(Some(FluidType::Water), 10);
        let mut b = tank(None, 0);
        let moved = exchange(&mut a, &mut b, ratio(1, 4));
        assert_eq!(moved, -ratio(5, 2));
        assert_eq!(a.amount + b.amount, Fixed64::from_num(10));
        assert_eq!(b.fluid, Some(FluidType::Water));

        let moved = exchange(&mut b, &mut a, ratio(1, 4));
        assert!(moved > Fixed64::ZERO);
        assert_eq!(a.amount + b.amount, Fixed64::from_num(10));
    }

    #[test]
    fn different_fluids_do_not_mix() {
        let mut a = tank(Some(FluidType::Water), 10);
        let mut b = tank(Some(FluidType::Steam), 1);
        assert_eq!(exchange(&mut a, &mut b, ratio(1, 10)), Fixed64::ZERO);
        assert_eq!(b.fluid, Some(FluidType::Steam));
    }

    #[test]
    fn valves_and_filters_block() {
        let mut a = tank(Some(FluidType::Water), 10);
        let mut b = tank(None, 0).with_valves(false, true);
        assert_eq!(exchange(&mut a, &mut b, ratio(1, 10)), Fixed64::ZERO);

        let mut b = tank(None, 0).with_filter(FluidType::Steam);
        assert_eq!(exchange(&mut a, &mut b, ratio(1, 10)), Fixed64::ZERO);

        let mut b = tank(None, 0).with_filter(FluidType::Water);
        assert!(exchange(&mut a, &mut b, ratio(1, 10)) < Fixed64::ZERO);
    }

    #[test]
    fn receiver_capacity_caps_flow() {
        let mut a = tank(Some(FluidType::Water), 10);
        a.max_amount = Fixed64::from_num(100);
        a.amount = Fixed64::from_num(100);
        let mut b = tank(Some(FluidType::Water), 9);
        let moved = exchange(&mut a, &mut b, ratio(1, 10));
        assert_eq!(moved, -Fixed64::ONE);
        assert_eq!(b.amount, b.max_amount);
    }

    #[test]
    fn ports_rotate_with_owner() {
        let mut b = FluidBox::new(Fixed64::ONE);
        b.connect_to = Rotation::Left.bit();
        let ports: Vec<_> = b.ports(Rotation::Top).collect();
        assert_eq!(ports, vec![Rotation::Top]);
    }

    #[test]
    fn fill_resets_foreign_fluid() {
        let mut b = tank(Some(FluidType::Steam), 5);
        b.fill(FluidType::Water, ratio(1, 10));
        assert_eq!(b.fluid, Some(FluidType::Water));
        assert_eq!(b.amount, ratio(1, 10));
        b.fill(FluidType::Water, Fixed64::from_num(20));
        assert_eq!(b.amount, b.max_amount);
    }
}
