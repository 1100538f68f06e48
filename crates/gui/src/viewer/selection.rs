//! Selection state: the current item list, the granularity cycle and the
//! solid-only toggle.

use shared::ObjectId;

/// What level of topology clicks resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Vertex,
    Edge,
    Face,
    Solid,
}

impl Granularity {
    /// Next mode in the fixed activation cycle
    pub fn next(self) -> Granularity {
        match self {
            Granularity::Vertex => Granularity::Edge,
            Granularity::Edge => Granularity::Face,
            Granularity::Face => Granularity::Solid,
            Granularity::Solid => Granularity::Vertex,
        }
    }
}

/// A picked sub-entity of a display object. Indices refer to the object's
/// topological vertex/edge/face lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickedPart {
    Whole,
    Vertex(usize),
    Edge(usize),
    Face(usize),
}

/// One entry of the selection list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedItem {
    pub object_id: ObjectId,
    pub part: PickedPart,
}

/// Selection list plus active granularity modes
pub struct SelectionState {
    items: Vec<PickedItem>,
    /// Active granularities, most specific first. Empty means selection
    /// is deactivated (neutral).
    active: Vec<Granularity>,
    /// Position of the activation cycle
    cycle_at: Option<Granularity>,
    solid_only: bool,
}

impl Default for SelectionState {
    fn default() -> Self {
        // Whole-object picking until a granularity is chosen
        Self {
            items: Vec::new(),
            active: vec![Granularity::Solid],
            cycle_at: None,
            solid_only: false,
        }
    }
}

impl SelectionState {
    /// Current selection, in pick order
    pub fn items(&self) -> &[PickedItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_selected(&self, item: &PickedItem) -> bool {
        self.items.contains(item)
    }

    /// True if any part of the object is selected
    pub fn has_object(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.object_id == id)
    }

    /// Replace the selection with at most one item (plain click)
    pub fn set_single(&mut self, item: Option<PickedItem>) {
        self.items.clear();
        self.items.extend(item);
    }

    /// Toggle one item in or out of the selection (shift click)
    pub fn toggle(&mut self, item: PickedItem) {
        if let Some(pos) = self.items.iter().position(|i| *i == item) {
            self.items.remove(pos);
        } else {
            self.items.push(item);
        }
    }

    /// Replace the whole selection (rectangle select)
    pub fn set_items(&mut self, items: Vec<PickedItem>) {
        self.items = items;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Active granularities, most specific first
    pub fn active_granularities(&self) -> &[Granularity] {
        &self.active
    }

    /// Activate exactly one granularity, deactivating the rest
    pub fn set_granularity(&mut self, g: Granularity) {
        self.active = vec![g];
        self.cycle_at = Some(g);
    }

    /// Deactivate all sub-shape selection
    pub fn set_neutral(&mut self) {
        self.active.clear();
    }

    /// Advance the granularity cycle: vertex, edge, face, solid
    pub fn cycle_granularity(&mut self) -> Granularity {
        let next = self
            .cycle_at
            .map(Granularity::next)
            .unwrap_or(Granularity::Vertex);
        self.set_granularity(next);
        next
    }

    pub fn solid_only(&self) -> bool {
        self.solid_only
    }

    /// Toggle solid-only picking. Arming requires a non-empty selection;
    /// disarming always restores the full sub-shape granularity set.
    pub fn toggle_solid_only(&mut self) {
        if !self.solid_only && !self.items.is_empty() {
            self.active = vec![Granularity::Solid];
            self.solid_only = true;
        } else {
            self.active = vec![Granularity::Vertex, Granularity::Edge, Granularity::Face];
            self.solid_only = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> PickedItem {
        PickedItem { object_id: id.to_string(), part: PickedPart::Whole }
    }

    #[test]
    fn test_cycle_order() {
        let mut s = SelectionState::default();
        assert_eq!(s.cycle_granularity(), Granularity::Vertex);
        assert_eq!(s.cycle_granularity(), Granularity::Edge);
        assert_eq!(s.cycle_granularity(), Granularity::Face);
        assert_eq!(s.cycle_granularity(), Granularity::Solid);
        assert_eq!(s.cycle_granularity(), Granularity::Vertex);
    }

    #[test]
    fn test_default_picks_whole_objects() {
        let s = SelectionState::default();
        assert_eq!(s.active_granularities(), &[Granularity::Solid]);
    }

    #[test]
    fn test_set_single_replaces() {
        let mut s = SelectionState::default();
        s.set_single(Some(item("a")));
        s.set_single(Some(item("b")));
        assert_eq!(s.items(), &[item("b")]);
        s.set_single(None);
        assert!(s.is_empty());
    }

    #[test]
    fn test_toggle_accumulates_and_removes() {
        let mut s = SelectionState::default();
        s.toggle(item("a"));
        s.toggle(item("b"));
        assert_eq!(s.items().len(), 2);
        s.toggle(item("a"));
        assert_eq!(s.items(), &[item("b")]);
    }

    #[test]
    fn test_solid_only_requires_selection() {
        let mut s = SelectionState::default();
        s.toggle_solid_only();
        assert!(!s.solid_only());
        // Disarming path activated the sub-shape set
        assert_eq!(
            s.active_granularities(),
            &[Granularity::Vertex, Granularity::Edge, Granularity::Face]
        );
    }

    #[test]
    fn test_solid_only_arms_and_disarms() {
        let mut s = SelectionState::default();
        s.set_single(Some(item("a")));
        s.toggle_solid_only();
        assert!(s.solid_only());
        assert_eq!(s.active_granularities(), &[Granularity::Solid]);

        s.toggle_solid_only();
        assert!(!s.solid_only());
        assert_eq!(
            s.active_granularities(),
            &[Granularity::Vertex, Granularity::Edge, Granularity::Face]
        );
    }

    #[test]
    fn test_neutral_deactivates() {
        let mut s = SelectionState::default();
        s.set_neutral();
        assert!(s.active_granularities().is_empty());
    }
}
