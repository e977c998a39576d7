//! Stock data adapters.

use crate::registry::{DataAdapter, ParentScope};
use serde_json::Value;
use std::borrow::Cow;
use tessera_blocks::BlockData;

/// Copies the enclosing layout's theme into blocks that have none
#[derive(Debug, Clone, Copy, Default)]
pub struct InheritTheme;

impl DataAdapter for InheritTheme {
    fn adapt<'d>(&self, parent: &ParentScope, data: &'d BlockData) -> Cow<'d, BlockData> {
        let has_theme = match data.get("theme") {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };

        match (&parent.theme, has_theme) {
            (Some(theme), false) => {
                let mut adapted = data.clone();
                adapted.insert("theme".to_string(), Value::String(theme.clone()));
                Cow::Owned(adapted)
            }
            _ => Cow::Borrowed(data),
        }
    }
}

/// Lifts `image.src` / `image.alt` to top-level `src` / `alt` unless those
/// are already set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenImage;

impl DataAdapter for FlattenImage {
    fn adapt<'d>(&self, _parent: &ParentScope, data: &'d BlockData) -> Cow<'d, BlockData> {
        let Some(Value::Object(image)) = data.get("image") else {
            return Cow::Borrowed(data);
        };

        let mut adapted: Option<BlockData> = None;
        for key in ["src", "alt"] {
            if data.contains_key(key) {
                continue;
            }
            if let Some(value) = image.get(key) {
                adapted
                    .get_or_insert_with(|| data.clone())
                    .insert(key.to_string(), value.clone());
            }
        }

        match adapted {
            Some(adapted) => Cow::Owned(adapted),
            None => Cow::Borrowed(data),
        }
    }
}
