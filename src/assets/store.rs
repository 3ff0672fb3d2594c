use std::{collections::HashMap, sync::Arc};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// Encoded sound clip; decoding is left to the mixer.
pub struct PreparedSound {
    /// URL the clip was fetched from.
    pub url: String,
    pub bytes: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
pub enum PreparedAsset {
    Image(PreparedImage),
    Sound(PreparedSound),
}

/// Asset namespaces. Keys are `"{kind}:{name}"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Background,
    Bgm,
    Se,
    Voice,
}

impl AssetKind {
    fn prefix(self) -> &'static str {
        match self {
            AssetKind::Background => "bg",
            AssetKind::Bgm => "bgm",
            AssetKind::Se => "se",
            AssetKind::Voice => "voice",
        }
    }

    pub fn key(self, name: &str) -> String {
        format!("{}:{name}", self.prefix())
    }
}

/// Named in-memory assets of one scenario load.
#[derive(Clone, Debug, Default)]
pub struct AssetStore {
    assets: HashMap<String, PreparedAsset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, asset: PreparedAsset) {
        self.assets.insert(key.into(), asset);
    }

    pub fn get(&self, key: &str) -> Option<&PreparedAsset> {
        self.assets.get(key)
    }

    pub fn contains(&self, kind: AssetKind, name: &str) -> bool {
        self.assets.contains_key(&kind.key(name))
    }

    pub fn image(&self, kind: AssetKind, name: &str) -> Option<&PreparedImage> {
        match self.assets.get(&kind.key(name)) {
            Some(PreparedAsset::Image(img)) => Some(img),
            _ => None,
        }
    }

    pub fn sound(&self, kind: AssetKind, name: &str) -> Option<&PreparedSound> {
        match self.assets.get(&kind.key(name)) {
            Some(PreparedAsset::Sound(snd)) => Some(snd),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
