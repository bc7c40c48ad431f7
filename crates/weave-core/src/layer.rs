//! Transformation layers and their externally supplied total order.

use std::fmt;

/// One ordered unit of generated code contributing a version of a declaration.
///
/// Identity is the owning aspect name plus an optional part name, so
/// `Cache` and `Cache.Read` are distinct layers of the same aspect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformationLayer {
    pub aspect: String,
    pub part: Option<String>,
}

impl TransformationLayer {
    #[must_use]
    pub fn new(aspect: impl Into<String>, part: Option<String>) -> Self {
        Self {
            aspect: aspect.into(),
            part,
        }
    }

    /// Returns the suffix used when naming helper members of this layer,
    /// e.g. `Cache_Read`.
    #[must_use]
    pub fn member_suffix(&self) -> String {
        match &self.part {
            Some(part) => format!("{}_{}", self.aspect, part),
            None => self.aspect.clone(),
        }
    }
}

impl fmt::Display for TransformationLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.part {
            Some(part) => write!(f, "{}.{}", self.aspect, part),
            None => write!(f, "{}", self.aspect),
        }
    }
}

/// Position of a layer inside the [`LayerOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerIndex(u32);

impl LayerIndex {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The total order of transformation layers. The linker never reorders it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerOrder {
    layers: Vec<TransformationLayer>,
}

impl LayerOrder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer, returning `None` if it is already present.
    pub fn push(&mut self, layer: TransformationLayer) -> Option<LayerIndex> {
        if self.index_of(&layer).is_some() {
            return None;
        }
        let index = LayerIndex::new(self.layers.len() as u32);
        self.layers.push(layer);
        Some(index)
    }

    #[must_use]
    pub fn index_of(&self, layer: &TransformationLayer) -> Option<LayerIndex> {
        self.layers
            .iter()
            .position(|l| l == layer)
            .map(|i| LayerIndex::new(i as u32))
    }

    #[must_use]
    pub fn get(&self, index: LayerIndex) -> Option<&TransformationLayer> {
        self.layers.get(index.as_usize())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerIndex, &TransformationLayer)> {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, layer)| (LayerIndex::new(i as u32), layer))
    }
}

impl FromIterator<TransformationLayer> for LayerOrder {
    fn from_iter<I: IntoIterator<Item = TransformationLayer>>(iter: I) -> Self {
        let mut order = Self::new();
        for layer in iter {
            order.push(layer);
        }
        order
    }
}
