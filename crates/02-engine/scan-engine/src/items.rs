//! Memoised item-to-place lists.

use scan_abi::{ItemStack, PrototypeCatalog, PrototypeKind};
use std::collections::HashMap;

/// Cache of item-to-place lists keyed by prototype.
///
/// With `show_hidden` off, hidden or unknown items are dropped from each list.
/// The cache must be cleared whenever that flag changes.
#[derive(Debug, Default)]
pub struct ItemsToPlaceCache {
    lists: HashMap<(PrototypeKind, String), Vec<ItemStack>>,
}

impl ItemsToPlaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the items needed to place `name`, consulting the catalog on a miss.
    pub fn lookup<C>(
        &mut self,
        catalog: &C,
        kind: PrototypeKind,
        name: &str,
        show_hidden: bool,
    ) -> &[ItemStack]
    where
        C: PrototypeCatalog + ?Sized,
    {
        self.lists
            .entry((kind, name.to_owned()))
            .or_insert_with(|| {
                let items = catalog.items_to_place(kind, name).unwrap_or_default();
                if show_hidden {
                    items
                } else {
                    items
                        .into_iter()
                        .filter(|stack| {
                            catalog
                                .item(&stack.name)
                                .is_some_and(|proto| !proto.hidden)
                        })
                        .collect()
                }
            })
    }

    pub fn clear(&mut self) {
        self.lists.clear();
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
