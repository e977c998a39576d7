//! # Column Operations
//!
//! Pure operations over [`ColumnContainer`]s. Every operation takes its
//! inputs by reference and returns new containers; the caller decides when
//! to swap them in, so no partially applied state is ever observable.
//!
//! These work on one or two containers in isolation. Document-wide edits
//! (where the containers live inside layouts on a page) go through
//! [`crate::Mutation`] and the [`crate::BlockArena`].

use crate::errors::{MutationError, MutationResult};
use tessera_blocks::{merge_data, BlockData, BlockId, BlockInstance, ColumnContainer};
use tessera_evaluator::{BlockRegistry, RegistryError};

impl From<RegistryError> for MutationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownBlockType(block_type) => MutationError::UnknownBlockType(block_type),
        }
    }
}

/// Append a fresh instance of `block_type` to `container`.
pub fn add_block(
    container: &ColumnContainer,
    registry: &BlockRegistry,
    block_type: &str,
) -> MutationResult<(ColumnContainer, BlockInstance)> {
    let instance = registry.instantiate(block_type, None)?;

    let mut next = container.clone();
    next.blocks.push(instance.clone());
    Ok((next, instance))
}

/// Remove `id` from `container`. Removing an absent id returns an unchanged copy.
pub fn remove_block(container: &ColumnContainer, id: &BlockId) -> ColumnContainer {
    let mut next = container.clone();
    next.blocks.retain(|block| &block.id != id);
    next
}

/// Shallow-merge `patch` into the data of `id`
pub fn update_block_data(
    container: &ColumnContainer,
    id: &BlockId,
    patch: &BlockData,
) -> MutationResult<ColumnContainer> {
    let mut next = container.clone();
    let block = find_in(&mut next, id)?;
    block.data = merge_data(&block.data, patch);
    Ok(next)
}

pub fn toggle_visibility(container: &ColumnContainer, id: &BlockId) -> MutationResult<ColumnContainer> {
    let mut next = container.clone();
    let block = find_in(&mut next, id)?;
    block.hidden = !block.hidden;
    Ok(next)
}

/// Move the block at `from` so that it ends up at `to`.
///
/// `move_within(c, to, from)` undoes `move_within(c, from, to)`.
pub fn move_within(container: &ColumnContainer, from: usize, to: usize) -> MutationResult<ColumnContainer> {
    let len = container.len();
    check_index(from, len)?;
    check_index(to, len)?;

    let mut next = container.clone();
    if from != to {
        let block = next.blocks.remove(from);
        next.blocks.insert(to, block);
    }
    Ok(next)
}

/// Move `id` out of `source` and into `dest` at `dest_index`.
///
/// All-or-nothing: when `id` is not in `source` or `dest_index` is past the
/// end of `dest`, neither container changes.
pub fn move_across(
    source: &ColumnContainer,
    dest: &ColumnContainer,
    id: &BlockId,
    dest_index: usize,
) -> MutationResult<(ColumnContainer, ColumnContainer)> {
    let from = source
        .position(id)
        .ok_or_else(|| MutationError::BlockNotFound(id.to_string()))?;
    if dest_index > dest.len() {
        return Err(MutationError::IndexOutOfRange {
            index: dest_index,
            len: dest.len(),
        });
    }
    if dest.contains(id) {
        return Err(MutationError::DuplicateBlockId(id.to_string()));
    }

    let mut next_source = source.clone();
    let mut next_dest = dest.clone();
    let block = next_source.blocks.remove(from);
    next_dest.blocks.insert(dest_index, block);

    Ok((next_source, next_dest))
}

fn check_index(index: usize, len: usize) -> MutationResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(MutationError::IndexOutOfRange { index, len })
    }
}

fn find_in<'a>(container: &'a mut ColumnContainer, id: &BlockId) -> MutationResult<&'a mut BlockInstance> {
    container
        .blocks
        .iter_mut()
        .find(|block| &block.id == id)
        .ok_or_else(|| MutationError::BlockNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_evaluator::standard_registry;

    fn block(id: &str) -> BlockInstance {
        BlockInstance::new(BlockId::new(id), "content", BlockData::new())
    }

    fn column(slot: &str, ids: &[&str]) -> ColumnContainer {
        ColumnContainer::new(slot).with_blocks(ids.iter().map(|id| block(id)).collect())
    }

    fn ids(container: &ColumnContainer) -> Vec<&str> {
        container.blocks.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_add_block_appends_fresh_instance() {
        let registry = standard_registry();
        let left = column("left", &["a"]);

        let (next, instance) = add_block(&left, &registry, "h2").unwrap();

        assert_eq!(next.len(), 2);
        assert_eq!(next.blocks[1], instance);
        assert_eq!(instance.block_type, "h2");
        assert_ne!(instance.id, BlockId::new("a"));
        // input untouched
        assert_eq!(ids(&left), vec!["a"]);
    }

    #[test]
    fn test_add_layout_block_gets_empty_slots() {
        let registry = standard_registry();
        let (_, instance) = add_block(&ColumnContainer::new("body"), &registry, "three-column").unwrap();

        let slots: Vec<_> = instance.columns.iter().map(|c| c.slot.as_str()).collect();
        assert_eq!(slots, vec!["column1", "column2", "column3"]);
        assert!(instance.columns.iter().all(ColumnContainer::is_empty));
    }

    #[test]
    fn test_add_unknown_type_fails() {
        let registry = standard_registry();
        let result = add_block(&ColumnContainer::new("left"), &registry, "quote");
        assert_eq!(result, Err(MutationError::UnknownBlockType("quote".to_string())));
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let left = column("left", &["a", "b", "c"]);

        let once = remove_block(&left, &BlockId::new("b"));
        let twice = remove_block(&once, &BlockId::new("b"));

        assert_eq!(ids(&once), vec!["a", "c"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_update_merges_shallow() {
        let mut left = column("left", &["a"]);
        left.blocks[0].data = json!({ "text": "Old", "level": 2 }).as_object().cloned().unwrap();
        let patch = json!({ "text": "New" }).as_object().cloned().unwrap();

        let next = update_block_data(&left, &BlockId::new("a"), &patch).unwrap();

        assert_eq!(next.blocks[0].data["text"], json!("New"));
        assert_eq!(next.blocks[0].data["level"], json!(2));
        assert_eq!(next.blocks[0].id, BlockId::new("a"));
        assert_eq!(next.blocks[0].block_type, "content");
    }

    #[test]
    fn test_update_missing_block() {
        let left = column("left", &["a"]);
        let result = update_block_data(&left, &BlockId::new("zz"), &BlockData::new());
        assert_eq!(result, Err(MutationError::BlockNotFound("zz".to_string())));
    }

    #[test]
    fn test_toggle_twice_restores() {
        let left = column("left", &["a"]);

        let hidden = toggle_visibility(&left, &BlockId::new("a")).unwrap();
        assert!(hidden.blocks[0].hidden);
        assert_eq!(hidden.visible().count(), 0);

        let shown = toggle_visibility(&hidden, &BlockId::new("a")).unwrap();
        assert_eq!(shown, left);
    }

    #[test]
    fn test_move_within_and_back() {
        let original = column("left", &["a", "b", "c", "d"]);

        for from in 0..4 {
            for to in 0..4 {
                let moved = move_within(&original, from, to).unwrap();
                assert_eq!(moved.len(), 4);
                let restored = move_within(&moved, to, from).unwrap();
                assert_eq!(restored, original, "from {} to {}", from, to);
            }
        }
    }

    #[test]
    fn test_move_within_same_index_is_noop() {
        let original = column("left", &["a", "b"]);
        assert_eq!(move_within(&original, 1, 1).unwrap(), original);
    }

    #[test]
    fn test_move_within_out_of_range() {
        let original = column("left", &["a", "b"]);
        assert_eq!(
            move_within(&original, 0, 2),
            Err(MutationError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            move_within(&original, 5, 0),
            Err(MutationError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_move_across_columns() {
        let left = column("left", &["b2", "b1", "b3"]);
        let right = column("right", &["b4", "b5"]);

        let (left, right) = move_across(&left, &right, &BlockId::new("b2"), 1).unwrap();

        assert_eq!(ids(&left), vec!["b1", "b3"]);
        assert_eq!(ids(&right), vec!["b4", "b2", "b5"]);
    }

    #[test]
    fn test_move_across_and_back() {
        let left = column("left", &["a", "b", "c"]);
        let right = column("right", &["x", "y"]);

        let (moved_left, moved_right) = move_across(&left, &right, &BlockId::new("b"), 2).unwrap();
        let (back_right, back_left) =
            move_across(&moved_right, &moved_left, &BlockId::new("b"), 1).unwrap();

        assert_eq!(back_left, left);
        assert_eq!(back_right, right);
    }

    #[test]
    fn test_move_across_to_end_and_empty() {
        let left = column("left", &["a"]);
        let right = ColumnContainer::new("right");

        let (left, right) = move_across(&left, &right, &BlockId::new("a"), 0).unwrap();

        assert!(left.is_empty());
        assert_eq!(ids(&right), vec!["a"]);
    }

    #[test]
    fn test_move_across_invalid_index_changes_nothing() {
        let left = column("left", &["a", "b"]);
        let right = column("right", &["x"]);

        let result = move_across(&left, &right, &BlockId::new("a"), 3);

        assert_eq!(result, Err(MutationError::IndexOutOfRange { index: 3, len: 1 }));
        assert_eq!(ids(&left), vec!["a", "b"]);
        assert_eq!(ids(&right), vec!["x"]);
    }

    #[test]
    fn test_move_across_missing_block() {
        let left = column("left", &["a"]);
        let right = column("right", &["x"]);

        let result = move_across(&left, &right, &BlockId::new("x"), 0);
        assert_eq!(result, Err(MutationError::BlockNotFound("x".to_string())));
    }
}
