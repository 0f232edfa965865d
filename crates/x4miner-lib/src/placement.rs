//! Resolution of world positions from a component containment tree.
//!
//! Every component in a snapshot stores its offset relative to its parent
//! (station inside zone, zone inside sector, sector inside cluster, and so
//! on). Zone and sector macros may additionally carry a fixed offset that is
//! not repeated on the component itself; those live in a separate
//! `zone_offsets` table keyed by lower-cased macro name.
//!
//! The world position of a component is the sum of the local and macro
//! offsets of every component on the path to the root. Walking stops at the
//! first component of class `galaxy`, at which point the accumulated
//! coordinates are truncated toward zero.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::universe::Position;

const GALAXY_CLASS: &str = "galaxy";

/// A node in the containment tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: String,
    pub parent: Option<String>,
    pub class: Option<String>,
    pub macro_name: Option<String>,
    pub offset: Position,
}

/// Arena of components indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ComponentTree {
    components: Vec<Component>,
    id_to_index: HashMap<String, usize>,
    zone_offsets: HashMap<String, Position>,
}

impl ComponentTree {
    /// Build a tree from components and macro offsets.
    ///
    /// Later components with a duplicate id shadow earlier ones.
    pub fn new(components: Vec<Component>, zone_offsets: HashMap<String, Position>) -> Self {
        let id_to_index = components
            .iter()
            .enumerate()
            .map(|(index, component)| (component.id.clone(), index))
            .collect();
        let zone_offsets = zone_offsets
            .into_iter()
            .map(|(name, offset)| (name.to_lowercase(), offset))
            .collect();

        Self {
            components,
            id_to_index,
            zone_offsets,
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.id_to_index.get(id).map(|&index| &self.components[index])
    }

    /// Resolve the world position of `id` by summing offsets up the parent chain.
    pub fn resolve(&self, id: &str) -> Result<Position> {
        let mut position = Position::default();
        let mut current = Some(id);
        let mut steps = 0usize;

        while let Some(component_id) = current {
            if steps > self.components.len() {
                return Err(Error::PlacementCycle { id: id.to_string() });
            }
            steps += 1;

            let component = self.get(component_id).ok_or_else(|| Error::UnknownComponent {
                id: component_id.to_string(),
            })?;

            if let Some(offset) = self.macro_offset(component) {
                position = position.offset_by(offset);
            }
            position = position.offset_by(&component.offset);

            if component.class.as_deref() == Some(GALAXY_CLASS) {
                return Ok(position.truncated());
            }
            current = component.parent.as_deref();
        }

        Ok(position)
    }

    /// Ids of every component on the path from `id` to the root, starting with `id`.
    pub fn ancestry(&self, id: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        let mut current = Some(id);

        while let Some(component_id) = current {
            if chain.len() > self.components.len() {
                return Err(Error::PlacementCycle { id: id.to_string() });
            }
            let component = self.get(component_id).ok_or_else(|| Error::UnknownComponent {
                id: component_id.to_string(),
            })?;
            chain.push(component.id.clone());
            if component.class.as_deref() == Some(GALAXY_CLASS) {
                break;
            }
            current = component.parent.as_deref();
        }

        Ok(chain)
    }

    fn macro_offset(&self, component: &Component) -> Option<&Position> {
        component
            .macro_name
            .as_deref()
            .and_then(|name| self.zone_offsets.get(&name.to_lowercase()))
    }
}
